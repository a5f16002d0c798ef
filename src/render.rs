//! Rendering trees back to text.

use crate::tree::DependencyTreeNode;

/// Turns a tree into human-readable text.
pub trait TreeRenderer {
    fn render(&self, tree: &DependencyTreeNode) -> String;
}

/// Values that never get a trailing space when they appear as left children.
const TIGHT_PUNCTUATION: [&str; 3] = [".", ",", "\""];
/// Structural labels that produce no text of their own.
const SILENT_LABELS: [&str; 2] = ["<root>", "<DocumentRoot>"];

/// Renders words in order, one space after each dependent.
///
/// Left children are each followed by a space unless they are `.`, `,` or `"`;
/// then the node's own value (structural `<root>` labels are skipped); then a
/// space if there are right children, each of which is followed by a space.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

enum Step<'a> {
    Node(&'a DependencyTreeNode),
    Text(&'a str),
}

impl TreeRenderer for PlainTextRenderer {
    fn render(&self, tree: &DependencyTreeNode) -> String {
        let mut out = String::new();
        let mut stack = vec![Step::Node(tree)];

        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Text(text) => {
                    out.push_str(text);
                    continue;
                }
                Step::Node(node) => node,
            };

            // Pushed in reverse of output order
            for child in node.right_children.iter().rev() {
                stack.push(Step::Text(" "));
                stack.push(Step::Node(child));
            }
            if !node.right_children.is_empty() {
                stack.push(Step::Text(" "));
            }
            if !SILENT_LABELS.contains(&node.value.as_str()) {
                stack.push(Step::Text(&node.value));
            }
            for child in node.left_children.iter().rev() {
                if !TIGHT_PUNCTUATION.contains(&child.value.as_str()) {
                    stack.push(Step::Text(" "));
                }
                stack.push(Step::Node(child));
            }
        }

        out
    }
}
