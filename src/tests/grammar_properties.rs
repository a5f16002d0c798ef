use crate::config::CompressorConfig;
use crate::expand::GrammarExpander;
use crate::grammar::GrammarBuilder;
use crate::miner::find_best_pattern;
use crate::symbol::{Symbol, Token};
use proptest::prelude::*;

/// Maps bytes onto a four-letter alphabet plus markers so patterns repeat.
fn to_tokens(input: &[u8]) -> Vec<Token> {
    input
        .iter()
        .map(|b| match b % 6 {
            0 => Token::terminal("a"),
            1 => Token::terminal("b"),
            2 => Token::terminal("c"),
            3 => Token::terminal("d"),
            4 => Token::Separator,
            _ => Token::End,
        })
        .collect()
}

proptest! {
    /// Property 1: Iterating the grammar reproduces the input
    #[test]
    fn prop_iter_roundtrip(input: Vec<u8>) {
        let tokens = to_tokens(&input);
        let grammar = GrammarBuilder::new(CompressorConfig::default()).build(&tokens).unwrap();
        let expanded: Vec<Token> = grammar.iter().collect();
        prop_assert_eq!(expanded, tokens);
        prop_assert_eq!(grammar.input_len(), input.len());
    }

    /// Property 2: Expanding the serialized rules reproduces the input
    #[test]
    fn prop_expander_roundtrip(input: Vec<u8>) {
        let tokens = to_tokens(&input);
        let grammar = GrammarBuilder::new(CompressorConfig::digrams()).build(&tokens).unwrap();
        let expander = GrammarExpander::new(grammar.rule_tokens());
        prop_assert_eq!(expander.expand(&grammar.sequence_tokens()).unwrap(), tokens);
    }

    /// Property 3: Rules have at least two symbols and reference only earlier rules
    #[test]
    fn prop_rules_well_formed(input: Vec<u8>, max_len in 2usize..8) {
        let config = CompressorConfig::default().with_pattern_lengths(2, max_len);
        let grammar = GrammarBuilder::new(config).build(&to_tokens(&input)).unwrap();
        for (index, rule) in grammar.rules.iter().enumerate() {
            prop_assert_eq!(rule.id as usize, index);
            prop_assert!(rule.expansion.len() >= 2);
            prop_assert!(rule.expansion.len() <= max_len);
            prop_assert!(rule.frequency >= 2);
            for symbol in &rule.expansion {
                if let Symbol::Rule(child) = symbol {
                    prop_assert!(*child < rule.id);
                }
            }
        }
    }

    /// Property 4: Compression converges
    /// After building, no pattern in the final sequence still qualifies.
    #[test]
    fn prop_converged(input: Vec<u8>) {
        let config = CompressorConfig::default();
        let grammar = GrammarBuilder::new(config.clone()).build(&to_tokens(&input)).unwrap();
        let leftover = find_best_pattern(
            &grammar.sequence,
            config.min_len,
            config.max_len,
            config.min_frequency,
        );
        prop_assert!(leftover.is_none());
    }

    /// Property 5: Selected occurrences never overlap and are literal matches
    #[test]
    fn prop_pattern_occurrences(input: Vec<u8>) {
        let raw: Vec<Symbol> = to_tokens(&input)
            .iter()
            .map(|token| match token {
                Token::Separator => Symbol::Separator,
                Token::End => Symbol::End,
                Token::Terminal(value) => Symbol::Terminal(u32::from(value.as_bytes()[0])),
                Token::Nonterminal(id) => Symbol::Rule(*id),
            })
            .collect();
        if let Some(pattern) = find_best_pattern(&raw, 2, 10, 2) {
            prop_assert!(pattern.frequency() >= 2);
            for pair in pattern.positions.windows(2) {
                prop_assert!(pair[0] + pattern.length <= pair[1]);
            }
            for &start in &pattern.positions {
                prop_assert_eq!(&raw[start..start + pattern.length], pattern.symbols.as_slice());
            }
        }
    }
}

/// Bolero fuzz test: arbitrary sequences survive build and expansion
#[cfg(test)]
#[test]
fn fuzz_grammar_roundtrip() {
    bolero::check!().with_type::<Vec<u8>>().for_each(|input| {
        let tokens = to_tokens(input);
        let grammar = GrammarBuilder::new(CompressorConfig::default())
            .build(&tokens)
            .unwrap();
        let expanded: Vec<Token> = grammar.iter().collect();
        assert_eq!(expanded, tokens);
    });
}
