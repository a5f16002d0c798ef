//! Iterator for reconstructing sequences from a [`Grammar`].

use crate::grammar::Grammar;
use crate::symbol::{Symbol, Token};

/// Iterator that lazily expands a grammar back to its original tokens.
///
/// Uses a stack of partially consumed rule bodies instead of recursion, so
/// deeply nested grammars cannot overflow the call stack.
pub struct GrammarIter<'a> {
    grammar: &'a Grammar,
    stack: Vec<(&'a [Symbol], usize)>,
}

impl<'a> GrammarIter<'a> {
    pub(crate) fn new(grammar: &'a Grammar) -> Self {
        Self {
            grammar,
            stack: vec![(grammar.sequence.as_slice(), 0)],
        }
    }
}

impl<'a> Iterator for GrammarIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let grammar = self.grammar;
        loop {
            let top = self.stack.last_mut()?;
            let Some(&symbol) = top.0.get(top.1) else {
                // End of rule, resume the parent
                self.stack.pop();
                continue;
            };
            top.1 += 1;

            match symbol {
                Symbol::Rule(id) => {
                    // Rules are indexed by id and only the builder creates them
                    debug_assert!((id as usize) < grammar.rules.len(), "R{} has no rule", id);
                    let rule = &grammar.rules[id as usize];
                    debug_assert_eq!(rule.id, id);
                    self.stack.push((rule.expansion.as_slice(), 0));
                }
                other => return Some(grammar.terminals.token_for(other)),
            }
        }
    }
}

impl Grammar {
    /// Returns an iterator over the fully expanded sequence.
    pub fn iter(&self) -> GrammarIter<'_> {
        GrammarIter::new(self)
    }
}

impl<'a> IntoIterator for &'a Grammar {
    type Item = Token;
    type IntoIter = GrammarIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
