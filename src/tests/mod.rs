mod grammar_properties;
