//! Tree Assembler - flat node list to ordered forest
//!
//! Converts an unordered collection of content nodes into a forest of
//! [`TreeNode`]s. The assembler never fails: malformed hierarchy data degrades
//! into a best-effort forest.
//!
//! # Algorithm
//!
//! 1. Sort all nodes by the sibling comparator (`order`, then `updated_at`,
//!    then `created_at`, then `key`). Every sibling list is built in this
//!    order, so the output does not depend on input enumeration order.
//! 2. Resolve each node's `parent_key` against the input set. Unresolved
//!    parents (orphans) put the node in the root sequence.
//! 3. Build each tree from the roots, visiting every node at most once.
//! 4. Nodes still unvisited sit on a parent cycle (or below one). The first of
//!    them by sibling order is promoted to the root sequence and its subtree is
//!    built; repeat until every node is placed.
//!
//! Each input node appears exactly once in the output.

use crate::models::{ContentNode, TreeNode};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Total order used for every sibling sequence.
///
/// `order` ascending, ties broken by `updated_at` (last touched) ascending,
/// then by `created_at` and finally by `key` so equal timestamps still sort
/// deterministically.
pub fn sibling_cmp(a: &ContentNode, b: &ContentNode) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| a.updated_at.cmp(&b.updated_at))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.key.cmp(&b.key))
        .then_with(|| a.value.cmp(&b.value))
        .then_with(|| a.parent_key.cmp(&b.parent_key))
}

/// Assemble a forest from `nodes`.
///
/// Duplicate keys in the input keep only the entry that sorts last; store
/// snapshots never contain duplicates.
///
/// # Examples
///
/// ```rust
/// use contentspace_core::models::ContentNode;
/// use contentspace_core::services::tree_assembler::assemble;
///
/// let forest = assemble(vec![
///     ContentNode::new("child1", "", Some("root1".to_string()), 0),
///     ContentNode::new("orphan1", "", Some("missing".to_string()), 0),
///     ContentNode::new("root1", "", None, 0),
/// ]);
///
/// let roots: Vec<&str> = forest.iter().map(|t| t.key()).collect();
/// assert_eq!(roots.len(), 2);
/// assert!(roots.contains(&"root1") && roots.contains(&"orphan1"));
/// ```
pub fn assemble(mut nodes: Vec<ContentNode>) -> Vec<TreeNode> {
    nodes.sort_by(sibling_cmp);

    // key -> index; with duplicate keys the later (greater) entry wins
    let mut index_by_key: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        index_by_key.insert(node.key.as_str(), idx);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots: Vec<usize> = Vec::new();
    let mut orphan_count = 0usize;
    let mut shadowed: Vec<bool> = vec![false; nodes.len()];

    for (idx, node) in nodes.iter().enumerate() {
        if index_by_key.get(node.key.as_str()) != Some(&idx) {
            shadowed[idx] = true;
            continue;
        }

        match node.parent_key.as_deref() {
            None => roots.push(idx),
            Some(parent_key) => match index_by_key.get(parent_key) {
                Some(&parent_idx) if parent_idx != idx => children[parent_idx].push(idx),
                // Self-parented rows are treated like orphans
                _ => {
                    orphan_count += 1;
                    roots.push(idx);
                }
            },
        }
    }

    if orphan_count > 0 {
        tracing::warn!(
            "Promoted {} orphaned node(s) to the top level during menu assembly",
            orphan_count
        );
    }

    let mut slots: Vec<Option<ContentNode>> = nodes.into_iter().map(Some).collect();
    let mut visited = shadowed;

    let mut forest: Vec<(usize, TreeNode)> = Vec::with_capacity(roots.len());
    for root in roots {
        if let Some(tree) = build_subtree(root, &mut slots, &children, &mut visited) {
            forest.push((root, tree));
        }
    }

    // Anything left is only reachable through a parent cycle
    let mut cycle_count = 0usize;
    for idx in 0..visited.len() {
        if visited[idx] {
            continue;
        }
        cycle_count += 1;
        if let Some(tree) = build_subtree(idx, &mut slots, &children, &mut visited) {
            forest.push((idx, tree));
        }
    }

    if cycle_count > 0 {
        tracing::warn!(
            "Broke {} parent cycle(s) during menu assembly by promoting a member to the top level",
            cycle_count
        );
        // Indices follow sibling order, so sorting by index restores it
        forest.sort_by_key(|(idx, _)| *idx);
    }

    forest.into_iter().map(|(_, tree)| tree).collect()
}

/// Build the subtree rooted at `idx`, skipping anything already placed.
///
/// Walks the hierarchy with an explicit stack so chain depth is bounded only by
/// memory. The pre-order pass records which children each node claims; the
/// reverse pass then attaches completed subtrees bottom-up. Child index lists
/// are in sibling order because `nodes` was sorted before they were filled.
fn build_subtree(
    idx: usize,
    slots: &mut [Option<ContentNode>],
    children: &[Vec<usize>],
    visited: &mut [bool],
) -> Option<TreeNode> {
    if visited[idx] {
        return None;
    }
    visited[idx] = true;

    let mut preorder: Vec<(usize, Vec<usize>)> = Vec::new();
    let mut stack = vec![idx];

    while let Some(current) = stack.pop() {
        let claimed: Vec<usize> = children[current]
            .iter()
            .copied()
            .filter(|&child| !visited[child])
            .collect();
        for &child in &claimed {
            visited[child] = true;
        }
        // Reversed so the first sibling is popped (and placed) first
        stack.extend(claimed.iter().rev());
        preorder.push((current, claimed));
    }

    let mut built: HashMap<usize, TreeNode> = HashMap::with_capacity(preorder.len());
    for (current, claimed) in preorder.into_iter().rev() {
        let Some(node) = slots[current].take() else {
            continue;
        };
        let mut tree = TreeNode::leaf(node);
        tree.children = claimed
            .iter()
            .filter_map(|child| built.remove(child))
            .collect();
        built.insert(current, tree);
    }

    built.remove(&idx)
}
