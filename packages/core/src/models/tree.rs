//! Assembled tree structure returned by the menu operation.

use crate::models::ContentNode;
use serde::{Deserialize, Serialize};

/// A content node together with its ordered children.
///
/// Serializes flat: the node's own fields plus a `children` array, which is
/// always present (empty for leaves).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub node: ContentNode,

    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Wrap a node with an empty child list
    pub fn leaf(node: ContentNode) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.node.key
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            count += 1;
            stack.extend(tree.children.iter());
        }
        count
    }

    /// Longest root-to-leaf path, counted in nodes
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((tree, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(tree.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }
}

// Flattens the tree before dropping so deep chains don't recurse once per level
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut tree) = pending.pop() {
            pending.append(&mut tree.children);
        }
    }
}
