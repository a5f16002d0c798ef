//! Tree-level compression entry points.

use crate::compressed::CompressedTree;
use crate::config::CompressorConfig;
use crate::error::Result;
use crate::expand::GrammarExpander;
use crate::grammar::GrammarBuilder;
use crate::linearize::{decode_exact, encode, to_wire_text};
use crate::tree::DependencyTreeNode;

/// Compresses and decompresses dependency trees.
///
/// Holds only its configuration; every call builds its own grammar state, so
/// one compressor can serve any number of calls, including from several
/// threads at once.
///
/// ```
/// use tree_repair::{CompressorConfig, DependencyTreeNode, TreeCompressor};
///
/// let mut root = DependencyTreeNode::new("root");
/// for _ in 0..5 {
///     root.add_right_child(
///         DependencyTreeNode::new("pattern")
///             .with_left(DependencyTreeNode::new("child1"))
///             .with_right(DependencyTreeNode::new("child2")),
///     );
/// }
///
/// let compressor = TreeCompressor::new(CompressorConfig::default()).unwrap();
/// let compressed = compressor.compress(&root).unwrap();
/// assert!(!compressed.rules().is_empty());
/// assert_eq!(compressor.decompress(&compressed).unwrap(), root);
/// ```
#[derive(Debug, Clone)]
pub struct TreeCompressor {
    config: CompressorConfig,
}

impl TreeCompressor {
    pub fn new(config: CompressorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    pub fn compress(&self, tree: &DependencyTreeNode) -> Result<CompressedTree> {
        self.compress_with_stats(tree).map(|(compressed, _)| compressed)
    }

    /// Compresses a tree and reports sizes along the way.
    pub fn compress_with_stats(
        &self,
        tree: &DependencyTreeNode,
    ) -> Result<(CompressedTree, CompressionStats)> {
        if tree.is_empty() {
            tracing::debug!("empty tree, nothing to compress");
            return Ok((CompressedTree::empty(), CompressionStats::default()));
        }

        let tokens = encode(tree);
        let uncompressed_bytes = to_wire_text(&tokens).len();
        let grammar = GrammarBuilder::new(self.config.clone()).build(&tokens)?;
        debug_assert!(grammar.iter().eq(tokens.iter().cloned()));

        let compressed = grammar.to_compressed();
        let stats = CompressionStats {
            input_tokens: tokens.len(),
            output_tokens: grammar.len(),
            num_rules: grammar.num_rules(),
            rule_symbols: grammar.rule_symbols(),
            structure_bytes: compressed.structure().len(),
            uncompressed_bytes,
        };
        tracing::debug!(
            nodes = tree.node_count(),
            input_tokens = stats.input_tokens,
            output_tokens = stats.output_tokens,
            rules = stats.num_rules,
            "compressed tree"
        );
        Ok((compressed, stats))
    }

    /// Rebuilds the exact tree that produced `compressed`.
    pub fn decompress(&self, compressed: &CompressedTree) -> Result<DependencyTreeNode> {
        if compressed.is_empty() {
            return Ok(DependencyTreeNode::empty());
        }

        let structure = compressed.structure_tokens()?;
        let rules = compressed.rule_tokens()?;
        let num_rules = rules.len();
        let expanded = GrammarExpander::new(rules)
            .with_limit(self.config.max_expanded_tokens)
            .expand(&structure)?;
        let tree = decode_exact(&expanded)?;

        tracing::debug!(
            rules = num_rules,
            compressed_tokens = structure.len(),
            expanded_tokens = expanded.len(),
            "decompressed tree"
        );
        Ok(tree)
    }
}

impl Default for TreeCompressor {
    fn default() -> Self {
        Self {
            config: CompressorConfig::default(),
        }
    }
}

/// Statistics about one compression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Tokens in the linearized tree
    pub input_tokens: usize,
    /// Tokens in the final sequence
    pub output_tokens: usize,
    /// Number of rules created
    pub num_rules: usize,
    /// Total symbols on rule right-hand sides
    pub rule_symbols: usize,
    /// Length of the structure wire text
    pub structure_bytes: usize,
    /// Length of the uncompressed linearization's wire text
    pub uncompressed_bytes: usize,
}

impl CompressionStats {
    /// Grammar size relative to the input, as a percentage.
    ///
    /// Lower is better. 100% means no compression.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_tokens == 0 {
            0.0
        } else {
            ((self.output_tokens + self.rule_symbols) as f64 / self.input_tokens as f64) * 100.0
        }
    }
}
