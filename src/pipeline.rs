//! Text-to-text compression built from a tree builder and a renderer.
//!
//! The parser that turns text into a dependency tree is a collaborator: any
//! [`TreeBuilder`] will do. [`WhitespaceTreeBuilder`] is a minimal one that
//! attaches every word to a synthetic `<root>`.

use crate::compressed::CompressedTree;
use crate::compressor::TreeCompressor;
use crate::error::{CompressionError, Result};
use crate::render::{PlainTextRenderer, TreeRenderer};
use crate::tree::DependencyTreeNode;

/// Produces a dependency tree from input text.
pub trait TreeBuilder {
    /// Returns `None` if no tree can be built from `text`.
    fn build_tree(&self, text: &str) -> Option<DependencyTreeNode>;
}

impl<F> TreeBuilder for F
where
    F: Fn(&str) -> Option<DependencyTreeNode>,
{
    fn build_tree(&self, text: &str) -> Option<DependencyTreeNode> {
        self(text)
    }
}

/// Splits text on whitespace and hangs each word off a `<root>` node.
///
/// Blank text produces the sentinel tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTreeBuilder;

impl TreeBuilder for WhitespaceTreeBuilder {
    fn build_tree(&self, text: &str) -> Option<DependencyTreeNode> {
        let mut words = text.split_whitespace().peekable();
        if words.peek().is_none() {
            return Some(DependencyTreeNode::empty());
        }
        let mut root = DependencyTreeNode::new("<root>");
        for word in words {
            root.add_right_child(DependencyTreeNode::new(word));
        }
        Some(root)
    }
}

/// Compresses text by way of its dependency tree.
pub struct TextCompressor<B, R = PlainTextRenderer> {
    builder: B,
    renderer: R,
    compressor: TreeCompressor,
}

impl<B: TreeBuilder> TextCompressor<B, PlainTextRenderer> {
    pub fn new(builder: B, compressor: TreeCompressor) -> Self {
        Self::with_renderer(builder, PlainTextRenderer, compressor)
    }
}

impl<B: TreeBuilder, R: TreeRenderer> TextCompressor<B, R> {
    pub fn with_renderer(builder: B, renderer: R, compressor: TreeCompressor) -> Self {
        Self {
            builder,
            renderer,
            compressor,
        }
    }

    pub fn compressor(&self) -> &TreeCompressor {
        &self.compressor
    }

    pub fn compress(&self, text: &str) -> Result<CompressedTree> {
        let tree = self.builder.build_tree(text).ok_or_else(|| {
            CompressionError::InvalidArgument("tree builder produced no tree".to_owned())
        })?;
        self.compressor.compress(&tree)
    }

    pub fn decompress(&self, compressed: &CompressedTree) -> Result<String> {
        let tree = self.compressor.decompress(compressed)?;
        Ok(self.renderer.render(&tree))
    }
}
