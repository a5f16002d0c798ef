//! Depth-first linearization of dependency trees.
//!
//! A node is written as its value, its left children, a [`Token::Separator`],
//! its right children and a closing [`Token::End`]:
//!
//! ```
//! use tree_repair::{linearize, DependencyTreeNode, Token};
//!
//! let tree = DependencyTreeNode::new("root")
//!     .with_left(DependencyTreeNode::new("A"))
//!     .with_right(DependencyTreeNode::new("C"));
//!
//! let tokens = linearize::encode(&tree);
//! assert_eq!(linearize::to_wire_text(&tokens), "root A | ] | C | ] ]");
//! assert_eq!(linearize::decode_exact(&tokens).unwrap(), tree);
//! ```
//!
//! All traversals use an explicit stack.

use crate::error::{CompressionError, Result};
use crate::symbol::Token;
use crate::tree::{DependencyTreeNode, Side};

enum Visit<'a> {
    Node(&'a DependencyTreeNode),
    Separator,
    End,
}

/// Encodes a tree into its token sequence.
pub fn encode(tree: &DependencyTreeNode) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut stack = vec![Visit::Node(tree)];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Node(node) => {
                tokens.push(Token::Terminal(node.value.clone()));
                stack.push(Visit::End);
                stack.extend(node.right_children.iter().rev().map(Visit::Node));
                stack.push(Visit::Separator);
                stack.extend(node.left_children.iter().rev().map(Visit::Node));
            }
            Visit::Separator => tokens.push(Token::Separator),
            Visit::End => tokens.push(Token::End),
        }
    }

    tokens
}

struct Frame {
    node: DependencyTreeNode,
    side: Side,
}

/// Decodes one tree starting at `cursor`, tolerating a truncated tail.
///
/// Returns `Ok(None)` if the cursor is past the end or on an end marker.
/// When the input runs out, every open node is closed as if its end markers
/// were present. On return the cursor points just after the decoded tree.
pub fn decode(tokens: &[Token], cursor: &mut usize) -> Result<Option<DependencyTreeNode>> {
    decode_tree(tokens, cursor, false)
}

/// Decodes a sequence that must hold exactly one complete tree.
///
/// Missing end markers and trailing tokens are [`CompressionError::MalformedSequence`].
pub fn decode_exact(tokens: &[Token]) -> Result<DependencyTreeNode> {
    let mut cursor = 0;
    let tree = decode_tree(tokens, &mut cursor, true)?
        .ok_or_else(|| CompressionError::malformed(0, "sequence does not start with a node value"))?;
    if cursor != tokens.len() {
        return Err(CompressionError::malformed(
            cursor,
            format!("{} trailing tokens after tree", tokens.len() - cursor),
        ));
    }
    Ok(tree)
}

fn decode_tree(
    tokens: &[Token],
    cursor: &mut usize,
    strict: bool,
) -> Result<Option<DependencyTreeNode>> {
    let root = match tokens.get(*cursor) {
        None | Some(Token::End) => return Ok(None),
        Some(token) => node_for(token, *cursor)?,
    };
    *cursor += 1;

    let mut stack = vec![Frame {
        node: root,
        side: Side::Left,
    }];

    loop {
        let close = match tokens.get(*cursor) {
            None if strict => {
                return Err(CompressionError::malformed(*cursor, "missing end marker"));
            }
            None => true,
            Some(Token::End) => {
                *cursor += 1;
                true
            }
            Some(Token::Separator) => {
                let Some(top) = stack.last_mut() else {
                    return Err(CompressionError::malformed(*cursor, "unbalanced separator"));
                };
                if top.side == Side::Right {
                    return Err(CompressionError::malformed(
                        *cursor,
                        "second separator inside one node",
                    ));
                }
                top.side = Side::Right;
                *cursor += 1;
                false
            }
            Some(token) => {
                let node = node_for(token, *cursor)?;
                *cursor += 1;
                stack.push(Frame {
                    node,
                    side: Side::Left,
                });
                false
            }
        };

        if !close {
            continue;
        }
        let Some(finished) = stack.pop() else {
            return Err(CompressionError::malformed(*cursor, "unbalanced end marker"));
        };
        match stack.last_mut() {
            Some(parent) => match parent.side {
                Side::Left => parent.node.left_children.push(finished.node),
                Side::Right => parent.node.right_children.push(finished.node),
            },
            None => return Ok(Some(finished.node)),
        }
    }
}

fn node_for(token: &Token, position: usize) -> Result<DependencyTreeNode> {
    match token {
        Token::Terminal(value) => Ok(DependencyTreeNode::new(value.as_str())),
        Token::Nonterminal(rule) => Err(CompressionError::UnknownNonterminal { rule: *rule }),
        Token::Separator | Token::End => Err(CompressionError::malformed(
            position,
            "marker where a node value was expected",
        )),
    }
}

/// Joins tokens into their space-separated wire text.
pub fn to_wire_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&token.to_wire());
    }
    out
}

/// Splits wire text back into tokens. Empty text yields no tokens.
pub fn from_wire_text(text: &str) -> Result<Vec<Token>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(' ')
        .enumerate()
        .map(|(position, part)| {
            if part.is_empty() {
                Err(CompressionError::malformed(position, "empty token"))
            } else {
                Token::from_wire(part, position)
            }
        })
        .collect()
}
