//! Ordered binary dependency trees.
//!
//! A [`DependencyTreeNode`] owns two ordered child lists: the dependents that
//! precede the head word and the ones that follow it. Ownership is strictly
//! tree-shaped. Parent links live in [`TreeArena`], an index-based view of the
//! same tree, so no node ever holds a pointer back to its owner.
//!
//! Drop and equality walk the tree with an explicit stack and are safe on
//! chains many thousands of levels deep. `Clone` and `Debug` are derived and
//! recurse once per level.

use slotmap::{new_key_type, SlotMap};

/// A node in an ordered dependency tree.
#[derive(Debug, Clone, Default)]
pub struct DependencyTreeNode {
    /// Opaque node value (a word, tag or structural label).
    pub value: String,
    /// Dependents ordered before the head.
    pub left_children: Vec<DependencyTreeNode>,
    /// Dependents ordered after the head.
    pub right_children: Vec<DependencyTreeNode>,
}

/// Which child list of its parent a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl DependencyTreeNode {
    /// Creates a childless node.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            left_children: Vec::new(),
            right_children: Vec::new(),
        }
    }

    /// The sentinel tree: an empty value and no children.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true for the sentinel tree.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.is_leaf()
    }

    /// Returns true if the node has no children on either side.
    pub fn is_leaf(&self) -> bool {
        self.left_children.is_empty() && self.right_children.is_empty()
    }

    pub fn add_left_child(&mut self, child: DependencyTreeNode) {
        self.left_children.push(child);
    }

    pub fn add_right_child(&mut self, child: DependencyTreeNode) {
        self.right_children.push(child);
    }

    /// Builder-style variant of [`add_left_child`](Self::add_left_child).
    pub fn with_left(mut self, child: DependencyTreeNode) -> Self {
        self.left_children.push(child);
        self
    }

    /// Builder-style variant of [`add_right_child`](Self::add_right_child).
    pub fn with_right(mut self, child: DependencyTreeNode) -> Self {
        self.right_children.push(child);
        self
    }

    /// Returns the child list on the given side.
    pub fn children(&self, side: Side) -> &[DependencyTreeNode] {
        match side {
            Side::Left => &self.left_children,
            Side::Right => &self.right_children,
        }
    }

    /// Iterates over the subtree in pre-order: node, left children, right children.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Total number of nodes in the subtree.
    pub fn node_count(&self) -> usize {
        self.preorder().count()
    }

    /// Number of levels in the subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for child in node.left_children.iter().chain(&node.right_children) {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }
}

/// Pre-order iterator over a subtree.
pub struct Preorder<'a> {
    stack: Vec<&'a DependencyTreeNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a DependencyTreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the leftmost child is popped first
        self.stack.extend(node.right_children.iter().rev());
        self.stack.extend(node.left_children.iter().rev());
        Some(node)
    }
}

impl PartialEq for DependencyTreeNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.value != b.value
                || a.left_children.len() != b.left_children.len()
                || a.right_children.len() != b.right_children.len()
            {
                return false;
            }
            stack.extend(a.left_children.iter().zip(&b.left_children));
            stack.extend(a.right_children.iter().zip(&b.right_children));
        }
        true
    }
}

impl Eq for DependencyTreeNode {}

impl Drop for DependencyTreeNode {
    fn drop(&mut self) {
        if self.is_leaf() {
            return;
        }
        let mut pending = std::mem::take(&mut self.left_children);
        pending.append(&mut self.right_children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.left_children);
            pending.append(&mut node.right_children);
            // `node` is now childless and drops without recursing
        }
    }
}

new_key_type! {
    /// Key of a node inside a [`TreeArena`].
    pub struct NodeKey;
}

/// A node stored in a [`TreeArena`].
#[derive(Debug, Clone)]
pub struct ArenaNode {
    pub value: String,
    pub left: Vec<NodeKey>,
    pub right: Vec<NodeKey>,
    /// Non-owning link to the node that lists this one as a child.
    pub parent: Option<NodeKey>,
}

/// Arena form of a dependency tree with parent back-references.
///
/// Nodes are addressed by generational [`NodeKey`]s, so parent links are plain
/// indices and the arena owns every node exactly once.
pub struct TreeArena {
    nodes: SlotMap<NodeKey, ArenaNode>,
    root: NodeKey,
}

impl TreeArena {
    /// Copies an owned tree into an arena.
    pub fn from_tree(tree: &DependencyTreeNode) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ArenaNode {
            value: tree.value.clone(),
            left: Vec::new(),
            right: Vec::new(),
            parent: None,
        });

        let mut stack = vec![(tree, root)];
        while let Some((node, key)) = stack.pop() {
            let sides = [
                (Side::Left, &node.left_children),
                (Side::Right, &node.right_children),
            ];
            for (side, children) in sides {
                for child in children {
                    let child_key = nodes.insert(ArenaNode {
                        value: child.value.clone(),
                        left: Vec::new(),
                        right: Vec::new(),
                        parent: Some(key),
                    });
                    match side {
                        Side::Left => nodes[key].left.push(child_key),
                        Side::Right => nodes[key].right.push(child_key),
                    }
                    stack.push((child, child_key));
                }
            }
        }

        Self { nodes, root }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn get(&self, key: NodeKey) -> Option<&ArenaNode> {
        self.nodes.get(key)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key)?.parent
    }

    /// Returns which child list of its parent holds `key`, or `None` for the root.
    pub fn side(&self, key: NodeKey) -> Option<Side> {
        let parent = &self.nodes[self.parent(key)?];
        if parent.left.contains(&key) {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    /// Iterates from the parent of `key` up to the root.
    pub fn ancestors(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        std::iter::successors(self.parent(key), move |&k| self.parent(k))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every node key in the arena, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes.keys()
    }

    /// Rebuilds the owned tree, consuming the arena.
    pub fn into_tree(mut self) -> DependencyTreeNode {
        // Post-order over keys so children are finished before their parent
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            order.push(key);
            let node = &self.nodes[key];
            stack.extend(node.left.iter().chain(&node.right).copied());
        }

        let mut built: ahash::AHashMap<NodeKey, DependencyTreeNode> = ahash::AHashMap::default();
        for &key in order.iter().rev() {
            let Some(arena_node) = self.nodes.remove(key) else {
                continue;
            };
            let mut node = DependencyTreeNode::new(arena_node.value);
            node.left_children = arena_node
                .left
                .iter()
                .filter_map(|k| built.remove(k))
                .collect();
            node.right_children = arena_node
                .right
                .iter()
                .filter_map(|k| built.remove(k))
                .collect();
            built.insert(key, node);
        }

        built.remove(&self.root).unwrap_or_default()
    }
}
