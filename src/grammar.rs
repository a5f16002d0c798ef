//! Grammar construction by repeated pattern replacement.
//!
//! [`GrammarBuilder`] interns the input tokens, then repeatedly asks the miner
//! for the best repeated pattern, records it as a new rule and rewrites every
//! selected occurrence as a single rule reference. Each round removes at least
//! `min_frequency * (length - 1)` symbols, so the number of rounds is bounded
//! by the input length.
//!
//! A builder is consumed by [`GrammarBuilder::build`]; rule counters and the
//! dictionary therefore never leak from one compression into the next.

use crate::compressed::CompressedTree;
use crate::config::CompressorConfig;
use crate::error::{CompressionError, Result};
use crate::id_gen::IdGenerator;
use crate::miner::{find_best_pattern, Pattern};
use crate::symbol::{Symbol, TerminalTable, Token};
use std::collections::BTreeMap;

/// A production `R<id> -> expansion`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rule {
    pub id: u32,
    pub expansion: Vec<Symbol>,
    /// Occurrences replaced when the rule was created
    pub frequency: usize,
}

/// The result of compressing one token sequence.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) sequence: Vec<Symbol>,
    /// Indexed by rule id
    pub(crate) rules: Vec<Rule>,
    pub(crate) terminals: TerminalTable,
    input_len: usize,
}

impl Grammar {
    /// Length of the final (compressed) sequence.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Length of the sequence before compression.
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    /// Total number of symbols on all rule right-hand sides.
    pub fn rule_symbols(&self) -> usize {
        self.rules.iter().map(|rule| rule.expansion.len()).sum()
    }

    /// Number of distinct terminal values.
    pub fn num_terminals(&self) -> usize {
        self.terminals.len()
    }

    /// The final sequence as tokens, with rule references as nonterminals.
    pub fn sequence_tokens(&self) -> Vec<Token> {
        self.sequence
            .iter()
            .map(|&symbol| self.terminals.token_for(symbol))
            .collect()
    }

    /// The rules as tokens, keyed by rule id.
    pub fn rule_tokens(&self) -> BTreeMap<u32, Vec<Token>> {
        self.rules
            .iter()
            .map(|rule| {
                let expansion = rule
                    .expansion
                    .iter()
                    .map(|&symbol| self.terminals.token_for(symbol))
                    .collect();
                (rule.id, expansion)
            })
            .collect()
    }

    /// Serializes this grammar into the persisted artifact.
    pub fn to_compressed(&self) -> CompressedTree {
        let structure = crate::linearize::to_wire_text(&self.sequence_tokens());
        let rules = self
            .rule_tokens()
            .into_iter()
            .map(|(id, expansion)| {
                (
                    Token::Nonterminal(id).to_wire().into_owned(),
                    crate::linearize::to_wire_text(&expansion),
                )
            })
            .collect();
        CompressedTree::new(structure.into_bytes(), rules)
    }
}

/// Builds a [`Grammar`] from a token sequence.
pub struct GrammarBuilder {
    config: CompressorConfig,
    id_gen: IdGenerator,
    terminals: TerminalTable,
    rules: Vec<Rule>,
}

impl GrammarBuilder {
    pub fn new(config: CompressorConfig) -> Self {
        Self {
            config,
            id_gen: IdGenerator::new(),
            terminals: TerminalTable::new(),
            rules: Vec::new(),
        }
    }

    /// Compresses `tokens`, which must not already contain nonterminals.
    pub fn build(mut self, tokens: &[Token]) -> Result<Grammar> {
        self.config.validate()?;

        let mut sequence = Vec::with_capacity(tokens.len());
        for token in tokens {
            if let Token::Nonterminal(id) = token {
                return Err(CompressionError::InvalidArgument(format!(
                    "input already contains nonterminal R{}",
                    id
                )));
            }
            sequence.push(self.terminals.symbol_for(token));
        }

        loop {
            let Some(pattern) = find_best_pattern(
                &sequence,
                self.config.min_len,
                self.config.max_len,
                self.config.min_frequency,
            ) else {
                break;
            };

            if self
                .config
                .max_rules
                .is_some_and(|max| self.rules.len() >= max)
            {
                tracing::warn!(
                    rules = self.rules.len(),
                    "rule budget exhausted before compression converged"
                );
                break;
            }
            let Some(id) = self.id_gen.get() else {
                tracing::warn!("rule id space exhausted");
                break;
            };

            sequence = replace_occurrences(&sequence, &pattern, Symbol::Rule(id));
            tracing::debug!(
                rule = id,
                length = pattern.length,
                frequency = pattern.frequency(),
                remaining = sequence.len(),
                "created rule"
            );
            self.rules.push(Rule {
                id,
                frequency: pattern.frequency(),
                expansion: pattern.symbols,
            });
        }

        debug_assert_eq!(self.id_gen.issued() as usize, self.rules.len());
        Ok(Grammar {
            sequence,
            rules: self.rules,
            terminals: self.terminals,
            input_len: tokens.len(),
        })
    }
}

/// Rebuilds the sequence in one pass, replacing each selected occurrence.
fn replace_occurrences(sequence: &[Symbol], pattern: &Pattern, replacement: Symbol) -> Vec<Symbol> {
    let removed = pattern.frequency() * (pattern.length - 1);
    let mut out = Vec::with_capacity(sequence.len().saturating_sub(removed));
    let mut positions = pattern.positions.iter().copied().peekable();
    let mut i = 0;
    while i < sequence.len() {
        if positions.peek() == Some(&i) {
            positions.next();
            out.push(replacement);
            i += pattern.length;
        } else {
            out.push(sequence[i]);
            i += 1;
        }
    }
    out
}
