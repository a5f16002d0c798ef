//! Grammar expansion for decompression.
//!
//! Rules are ordered so that every rule comes after the rules it references,
//! and expanded sizes are computed in that order before anything is
//! materialized. The ordering step is an iterative depth-first search that
//! rejects cycles.
//!
//! The structure is then expanded in one pass with an explicit stack. A rule
//! is expanded the first time it is met and its span of the output is
//! memoized; later occurrences copy that span. Rules the structure never
//! reaches are never expanded, so the only large allocation is the output,
//! whose size has already been checked against the limit.

use crate::error::{CompressionError, Result};
use crate::symbol::Token;
use ahash::AHashMap as HashMap;
use std::collections::BTreeMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// A rule body (or the structure) being copied to the output.
struct Frame<'a> {
    /// `None` for the structure itself
    rule: Option<u32>,
    /// Output length when the frame was entered
    start: usize,
    body: &'a [Token],
    next: usize,
}

/// Expands nonterminals using a rule table.
pub struct GrammarExpander {
    rules: BTreeMap<u32, Vec<Token>>,
    limit: usize,
}

impl GrammarExpander {
    pub fn new(rules: BTreeMap<u32, Vec<Token>>) -> Self {
        Self {
            rules,
            limit: usize::MAX,
        }
    }

    /// Caps the number of tokens any expansion may produce.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Returns rule ids ordered so that dependencies come first.
    pub fn topological_order(&self) -> Result<Vec<u32>> {
        let mut marks: HashMap<u32, Mark> = HashMap::default();
        let mut order = Vec::with_capacity(self.rules.len());

        for (&root, expansion) in &self.rules {
            if expansion.len() < 2 {
                return Err(CompressionError::malformed(
                    0,
                    format!("rule R{} expands to fewer than two tokens", root),
                ));
            }
            if marks.contains_key(&root) {
                continue;
            }
            marks.insert(root, Mark::InProgress);
            // (rule, index of the next token to inspect)
            let mut stack: Vec<(u32, usize)> = vec![(root, 0)];

            while let Some(frame) = stack.last_mut() {
                let id = frame.0;
                let expansion = &self.rules[&id];
                let mut child = None;
                while frame.1 < expansion.len() {
                    let token = &expansion[frame.1];
                    frame.1 += 1;
                    if let Token::Nonterminal(c) = token {
                        child = Some(*c);
                        break;
                    }
                }

                let Some(child) = child else {
                    stack.pop();
                    marks.insert(id, Mark::Done);
                    order.push(id);
                    continue;
                };
                match marks.get(&child) {
                    Some(Mark::InProgress) => {
                        return Err(CompressionError::GrammarCycle { rule: child });
                    }
                    Some(Mark::Done) => {}
                    None => {
                        if !self.rules.contains_key(&child) {
                            return Err(CompressionError::UnknownNonterminal { rule: child });
                        }
                        marks.insert(child, Mark::InProgress);
                        stack.push((child, 0));
                    }
                }
            }
        }

        Ok(order)
    }

    /// Fully expands `structure` into terminal and marker tokens.
    pub fn expand(&self, structure: &[Token]) -> Result<Vec<Token>> {
        let order = self.topological_order()?;

        // Sizes first, saturating, so oversized grammars fail before allocating
        let mut sizes: HashMap<u32, usize> = HashMap::default();
        for &id in &order {
            let size = expanded_size(&self.rules[&id], &sizes)?;
            sizes.insert(id, size);
        }
        let total = expanded_size(structure, &sizes)?;
        if total > self.limit {
            return Err(CompressionError::ExpansionLimit { limit: self.limit });
        }

        let mut out: Vec<Token> = Vec::with_capacity(total);
        // Output span of every rule expanded so far
        let mut spans: HashMap<u32, (usize, usize)> = HashMap::default();
        let mut stack = vec![Frame {
            rule: None,
            start: 0,
            body: structure,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let body = frame.body;
            let Some(token) = body.get(frame.next) else {
                if let Some(id) = frame.rule {
                    spans.insert(id, (frame.start, out.len()));
                }
                stack.pop();
                continue;
            };
            frame.next += 1;

            match token {
                Token::Nonterminal(id) => match spans.get(id) {
                    Some(&(start, end)) => out.extend_from_within(start..end),
                    None => stack.push(Frame {
                        rule: Some(*id),
                        start: out.len(),
                        body: &self.rules[id],
                        next: 0,
                    }),
                },
                other => out.push(other.clone()),
            }
        }
        debug_assert_eq!(out.len(), total);

        tracing::trace!(
            rules = order.len(),
            expanded_rules = spans.len(),
            compressed = structure.len(),
            expanded = out.len(),
            "expanded grammar"
        );
        Ok(out)
    }
}

/// Expanded length of `tokens`, saturating at `usize::MAX`.
fn expanded_size(tokens: &[Token], sizes: &HashMap<u32, usize>) -> Result<usize> {
    let mut total: usize = 0;
    for token in tokens {
        let size = match token {
            Token::Nonterminal(id) => *sizes
                .get(id)
                .ok_or(CompressionError::UnknownNonterminal { rule: *id })?,
            _ => 1,
        };
        total = total.saturating_add(size);
    }
    Ok(total)
}
