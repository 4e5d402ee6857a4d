//! MemoryStore - in-process NodeStore implementation
//!
//! Keeps every node in a `HashMap` behind a `tokio::sync::RwLock`. Multi-record
//! operations take the write lock once for their whole duration, which gives
//! them the same all-or-nothing visibility the SQL store gets from a transaction.
//!
//! Used by tests, benchmarks and embedders that don't need durability.

use crate::db::node_store::{NodeStore, OrderFn};
use crate::db::DatabaseError;
use crate::models::{ContentNode, DeleteResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<String, ContentNode>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `nodes` (later duplicates replace earlier ones)
    pub fn with_nodes(nodes: impl IntoIterator<Item = ContentNode>) -> Self {
        let map = nodes
            .into_iter()
            .map(|node| (node.key.clone(), node))
            .collect();

        Self {
            nodes: RwLock::new(map),
        }
    }

    fn group_max(nodes: &HashMap<String, ContentNode>, parent_key: Option<&str>) -> Option<i64> {
        nodes
            .values()
            .filter(|node| node.parent_key.as_deref() == parent_key)
            .map(|node| node.order)
            .max()
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn get_node(&self, key: &str) -> Result<Option<ContentNode>, DatabaseError> {
        let nodes = self.nodes.read().await;
        Ok(nodes.get(key).cloned())
    }

    async fn put_node(&self, node: ContentNode) -> Result<ContentNode, DatabaseError> {
        let mut nodes = self.nodes.write().await;
        nodes.insert(node.key.clone(), node.clone());
        Ok(node)
    }

    async fn insert_with_order(
        &self,
        mut node: ContentNode,
        next_order: OrderFn,
    ) -> Result<ContentNode, DatabaseError> {
        let mut nodes = self.nodes.write().await;

        if nodes.contains_key(&node.key) {
            return Err(DatabaseError::duplicate_key(node.key));
        }

        node.order = next_order(Self::group_max(&nodes, node.parent_key.as_deref()));
        nodes.insert(node.key.clone(), node.clone());
        Ok(node)
    }

    async fn delete_node(&self, key: &str) -> Result<bool, DatabaseError> {
        let mut nodes = self.nodes.write().await;
        Ok(nodes.remove(key).is_some())
    }

    async fn delete_with_children(&self, key: &str) -> Result<DeleteResult, DatabaseError> {
        let mut nodes = self.nodes.write().await;

        if !nodes.contains_key(key) {
            return Ok(DeleteResult::not_found());
        }

        let before = nodes.len();
        nodes.retain(|_, node| node.parent_key.as_deref() != Some(key));
        let children_deleted = (before - nodes.len()) as u64;
        nodes.remove(key);

        Ok(DeleteResult::deleted(children_deleted))
    }

    async fn scan_all(&self) -> Result<Vec<ContentNode>, DatabaseError> {
        let nodes = self.nodes.read().await;
        Ok(nodes.values().cloned().collect())
    }

    async fn scan_by_parent(
        &self,
        parent_key: Option<&str>,
    ) -> Result<Vec<ContentNode>, DatabaseError> {
        let nodes = self.nodes.read().await;
        Ok(nodes
            .values()
            .filter(|node| node.parent_key.as_deref() == parent_key)
            .cloned()
            .collect())
    }

    async fn max_order(&self, parent_key: Option<&str>) -> Result<Option<i64>, DatabaseError> {
        let nodes = self.nodes.read().await;
        Ok(Self::group_max(&nodes, parent_key))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
