//! # tree-repair - Grammar compression for dependency trees
//!
//! A RePair-style compressor for ordered trees whose nodes have a list of left
//! and a list of right children, such as natural-language dependency parses.
//!
//! Compression linearizes the tree depth-first with explicit boundary markers,
//! then repeatedly replaces the most frequent repeated n-gram of that sequence
//! with a fresh nonterminal:
//!
//! 1. **Most frequent first**: across all lengths in `min_len..=max_len`
//! 2. **Non-overlapping**: only occurrences that do not overlap are counted and replaced
//! 3. **Deterministic**: ties go to the longer pattern, then to the one that occurs earliest
//!
//! Because `min_frequency` only decides when to stop, a higher threshold
//! yields a prefix of the rules a lower one would create.
//!
//! Decompression expands the rules bottom-up, refusing cyclic or oversized
//! grammars, and decodes the tree again.
//!
//! ## Example
//!
//! ```
//! use tree_repair::{DependencyTreeNode, TreeCompressor};
//!
//! let mut root = DependencyTreeNode::new("saw");
//! root.add_left_child(DependencyTreeNode::new("I"));
//! for _ in 0..4 {
//!     root.add_right_child(DependencyTreeNode::new("cat").with_left(DependencyTreeNode::new("the")));
//! }
//!
//! let compressor = TreeCompressor::default();
//! let compressed = compressor.compress(&root).unwrap();
//!
//! // Reconstructs the original tree
//! assert_eq!(compressor.decompress(&compressed).unwrap(), root);
//!
//! println!("Created {} rules", compressed.rules().len());
//! ```
//!
//! ## Performance
//!
//! - One O(n) rolling-hash pass per candidate length per compression round
//! - Every round shrinks the sequence, so there are at most n rounds
//! - Traversals use explicit stacks and handle very deep trees

mod compressed;
mod compressor;
mod config;
mod error;
mod expand;
mod grammar;
mod id_gen;
mod iter;
pub mod linearize;
mod miner;
mod pipeline;
mod render;
mod symbol;
mod tree;

#[cfg(test)]
mod tests;

pub use compressed::CompressedTree;
pub use compressor::{CompressionStats, TreeCompressor};
pub use config::CompressorConfig;
pub use error::{CompressionError, Result};
pub use expand::GrammarExpander;
pub use grammar::{Grammar, GrammarBuilder};
pub use iter::GrammarIter;
pub use pipeline::{TextCompressor, TreeBuilder, WhitespaceTreeBuilder};
pub use render::{PlainTextRenderer, TreeRenderer};
pub use symbol::{Token, END, SEPARATOR};
pub use tree::{ArenaNode, DependencyTreeNode, NodeKey, Preorder, Side, TreeArena};
