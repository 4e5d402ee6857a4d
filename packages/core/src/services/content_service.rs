//! Content Service - orchestration of content node operations
//!
//! This module provides the business logic layer over a [`NodeStore`]:
//!
//! - CRUD operations (create, get, upsert-style update, cascading delete)
//! - Flat listings (whole store, or one parent group)
//! - Menu assembly (flat snapshot → ordered forest)
//!
//! # Statelessness
//!
//! The service holds no node data between calls. Every operation works on the
//! store's current snapshot; the store handle is the only shared resource and
//! is passed in explicitly.
//!
//! # Hierarchy Rules
//!
//! - Keys are unique; `create` on an existing key fails with `Conflict`
//! - New nodes are appended to their sibling group (`OrderAssigner`)
//! - `delete` removes the node and its direct children only; grandchildren
//!   become orphans and are promoted to the top level by the menu
//! - Writes that would make a node its own ancestor fail with `CycleDetected`

use crate::config::ContentConfig;
use crate::db::NodeStore;
use crate::models::{ContentNode, DeleteResult, NodeUpdate, TreeNode};
use crate::services::error::ContentServiceError;
use crate::services::order_assigner::OrderAssigner;
use crate::services::tree_assembler;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

/// Default bound on the ancestor walk performed by cycle detection
pub const DEFAULT_MAX_ANCESTOR_DEPTH: usize = 1000;

/// Core service for content node CRUD, listing and menu assembly
///
/// # Examples
///
/// ```no_run
/// use contentspace_core::db::{DatabaseService, LibsqlStore};
/// use contentspace_core::services::ContentService;
/// use std::path::PathBuf;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/content.db")).await?);
///     let service = ContentService::new(Arc::new(LibsqlStore::new(db)));
///
///     service.create("home", "Welcome", None).await?;
///     service.create("intro", "Hello", Some("home".to_string())).await?;
///
///     let menu = service.menu().await?;
///     println!("{} top-level entries", menu.len());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn NodeStore>,
    max_ancestor_depth: usize,
}

impl ContentService {
    /// Create a service over `store` with default settings
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self {
            store,
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
        }
    }

    /// Create a service over `store` using the limits from `config`
    pub fn with_config(store: Arc<dyn NodeStore>, config: &ContentConfig) -> Self {
        Self {
            store,
            max_ancestor_depth: config.max_ancestor_depth,
        }
    }

    /// Get access to the underlying store
    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    /// Create a new node appended to its sibling group
    ///
    /// # Errors
    ///
    /// - `Conflict` if `key` already exists (the stored record is untouched)
    /// - `ValidationFailed` for an empty key or a self-parent
    /// - `CycleDetected` if `parent_key`'s ancestor chain leads back to `key`
    /// - `StoreUnavailable` for backend failures
    pub async fn create(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        parent_key: Option<String>,
    ) -> Result<ContentNode, ContentServiceError> {
        let node = ContentNode::new(key, value, parent_key, 0);
        node.validate()?;

        if self.store.get_node(&node.key).await?.is_some() {
            return Err(ContentServiceError::conflict(node.key));
        }

        self.ensure_acyclic(&node.key, node.parent_key.as_deref())
            .await?;

        // Duplicate check, order read and insert happen as one unit in the store
        let created = self
            .store
            .insert_with_order(node, OrderAssigner::next_after)
            .await?;

        tracing::info!(
            "Created content '{}' under {:?} at order {}",
            created.key,
            created.parent_key,
            created.order
        );

        Ok(created)
    }

    /// Upsert a node by key
    ///
    /// Existing nodes have each provided field merged independently; `updated_at`
    /// is always refreshed, `created_at` never changes. A missing key creates a
    /// node with an empty value, no parent and order 0 unless the update
    /// supplies them. The order is never re-derived here.
    pub async fn update(
        &self,
        key: &str,
        update: NodeUpdate,
    ) -> Result<ContentNode, ContentServiceError> {
        let now = Utc::now();

        let (node, parent_changed) = match self.store.get_node(key).await? {
            Some(mut existing) => {
                let parent_changed = matches!(
                    &update.parent_key,
                    Some(new_parent) if *new_parent != existing.parent_key
                );
                existing.apply_update(update, now);
                (existing, parent_changed)
            }
            None => {
                let node = ContentNode::new_at(
                    key,
                    update.value.unwrap_or_default(),
                    update.parent_key.flatten(),
                    update.order.unwrap_or(0),
                    now,
                );
                (node, true)
            }
        };

        node.validate()?;

        if parent_changed {
            self.ensure_acyclic(&node.key, node.parent_key.as_deref())
                .await?;
        }

        let stored = self.store.put_node(node).await?;
        tracing::info!("Upserted content '{}'", stored.key);

        Ok(stored)
    }

    /// Fetch a node by key
    pub async fn get(&self, key: &str) -> Result<ContentNode, ContentServiceError> {
        tracing::debug!("Fetching content '{}'", key);
        self.store
            .get_node(key)
            .await?
            .ok_or_else(|| ContentServiceError::not_found(key))
    }

    /// Every node, ordered by `parent_key` (top level first), then last-touched
    /// time, then creation time, then key
    pub async fn list(&self) -> Result<Vec<ContentNode>, ContentServiceError> {
        let mut nodes = self.store.scan_all().await?;
        nodes.sort_by(|a, b| {
            a.parent_key
                .cmp(&b.parent_key)
                .then_with(|| a.updated_at.cmp(&b.updated_at))
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.key.cmp(&b.key))
        });
        tracing::debug!("Listed {} content node(s)", nodes.len());
        Ok(nodes)
    }

    /// Direct children of `parent_key` (top-level nodes for `None`), ordered by
    /// last-touched time, then `order`, then key
    pub async fn list_by_parent(
        &self,
        parent_key: Option<&str>,
    ) -> Result<Vec<ContentNode>, ContentServiceError> {
        let mut nodes = self.store.scan_by_parent(parent_key).await?;
        nodes.sort_by(|a, b| {
            a.updated_at
                .cmp(&b.updated_at)
                .then_with(|| a.order.cmp(&b.order))
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(nodes)
    }

    /// Delete a node and its direct children as one unit
    ///
    /// # Errors
    ///
    /// `NotFound` if `key` is absent (a second delete of the same key fails).
    pub async fn delete(&self, key: &str) -> Result<DeleteResult, ContentServiceError> {
        let result = self.store.delete_with_children(key).await?;

        if !result.existed {
            return Err(ContentServiceError::not_found(key));
        }

        tracing::info!("{}", result.message(key));
        Ok(result)
    }

    /// Assemble every stored node into the ordered menu forest
    pub async fn menu(&self) -> Result<Vec<TreeNode>, ContentServiceError> {
        let nodes = self.store.scan_all().await?;
        Ok(tree_assembler::assemble(nodes))
    }

    /// Health check against the store
    pub async fn ping(&self) -> Result<(), ContentServiceError> {
        self.store.ping().await?;
        Ok(())
    }

    /// Reject `parent_key` if walking up from it reaches `key`
    ///
    /// The walk stops at a top-level node, a dangling parent, a cycle that does
    /// not include `key`, or after `max_ancestor_depth` steps.
    ///
    /// The walk reads the store outside the write that follows it. Two
    /// concurrent writes setting `a -> b` and `b -> a` can therefore both pass
    /// and leave a stored cycle; `menu()` still returns every node once (see
    /// `tree_assembler`), and later writes through either key are checked
    /// against the cycle as stored.
    async fn ensure_acyclic(
        &self,
        key: &str,
        parent_key: Option<&str>,
    ) -> Result<(), ContentServiceError> {
        let Some(parent_key) = parent_key else {
            return Ok(());
        };

        let mut current = parent_key.to_string();
        let mut seen: HashSet<String> = HashSet::new();

        for _ in 0..self.max_ancestor_depth {
            if current == key {
                tracing::warn!(
                    "Rejected parent '{}' for '{}': would create a cycle",
                    parent_key,
                    key
                );
                return Err(ContentServiceError::cycle_detected(key, parent_key));
            }

            if !seen.insert(current.clone()) {
                // Pre-existing cycle among other nodes; `key` is not on it
                return Ok(());
            }

            match self.store.get_node(&current).await? {
                Some(ContentNode {
                    parent_key: Some(next),
                    ..
                }) => current = next,
                _ => return Ok(()),
            }
        }

        tracing::warn!(
            "Ancestor walk for '{}' stopped after {} steps without reaching a root",
            key,
            self.max_ancestor_depth
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn create_test_service() -> ContentService {
        ContentService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_orders() {
        let service = create_test_service();

        let a = service.create("a", "A", None).await.unwrap();
        let b = service.create("b", "B", None).await.unwrap();
        let c = service.create("c", "C", Some("a".to_string())).await.unwrap();

        assert_eq!(a.order, 0);
        assert_eq!(b.order, 1);
        assert_eq!(c.order, 0);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = create_test_service();
        service
            .create("intro", "Hello", Some("home".to_string()))
            .await
            .unwrap();

        let fetched = service.get("intro").await.unwrap();
        assert_eq!(fetched.value, "Hello");
        assert_eq!(fetched.parent_key.as_deref(), Some("home"));
    }

    #[tokio::test]
    async fn test_create_conflict_leaves_record_unchanged() {
        let service = create_test_service();
        let original = service.create("home", "v1", None).await.unwrap();

        let err = service
            .create("home", "v2", Some("x".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, ContentServiceError::Conflict { .. }));
        assert_eq!(service.get("home").await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_key_and_self_parent() {
        let service = create_test_service();

        assert!(matches!(
            service.create("", "v", None).await,
            Err(ContentServiceError::ValidationFailed(_))
        ));
        assert!(matches!(
            service.create("a", "v", Some("a".to_string())).await,
            Err(ContentServiceError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_cycle_through_orphan() {
        let service = create_test_service();
        // "x" points at a parent that does not exist yet
        service.create("x", "", Some("k".to_string())).await.unwrap();

        let err = service
            .create("k", "", Some("x".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, ContentServiceError::CycleDetected { .. }));
        assert!(matches!(
            service.get("k").await,
            Err(ContentServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let service = create_test_service();
        assert!(matches!(
            service.get("nope").await,
            Err(ContentServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_merges_and_refreshes_updated_at() {
        let service = create_test_service();
        let created = service
            .create("a", "old", Some("p".to_string()))
            .await
            .unwrap();

        let updated = service
            .update("a", NodeUpdate::new().with_value("new"))
            .await
            .unwrap();

        assert_eq!(updated.value, "new");
        assert_eq!(updated.parent_key.as_deref(), Some("p"));
        assert_eq!(updated.order, created.order);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_can_clear_parent_and_set_order() {
        let service = create_test_service();
        service
            .create("a", "v", Some("p".to_string()))
            .await
            .unwrap();

        let updated = service
            .update(
                "a",
                NodeUpdate {
                    parent_key: Some(None),
                    order: Some(9),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.is_top_level());
        assert_eq!(updated.order, 9);
        assert_eq!(updated.value, "v");
    }

    #[tokio::test]
    async fn test_update_missing_key_creates_with_defaults() {
        let service = create_test_service();

        let node = service.update("fresh", NodeUpdate::default()).await.unwrap();

        assert_eq!(node.key, "fresh");
        assert_eq!(node.value, "");
        assert!(node.parent_key.is_none());
        assert_eq!(node.order, 0);
        assert_eq!(service.get("fresh").await.unwrap(), node);
    }

    #[tokio::test]
    async fn test_update_rejects_reparent_under_descendant() {
        let service = create_test_service();
        service.create("a", "", None).await.unwrap();
        service.create("b", "", Some("a".to_string())).await.unwrap();
        service.create("c", "", Some("b".to_string())).await.unwrap();

        let err = service
            .update("a", NodeUpdate::new().with_parent(Some("c".to_string())))
            .await
            .unwrap_err();

        assert!(matches!(err, ContentServiceError::CycleDetected { .. }));
        assert!(service.get("a").await.unwrap().is_top_level());
    }

    #[tokio::test]
    async fn test_update_rejects_self_parent() {
        let service = create_test_service();
        service.create("a", "", None).await.unwrap();

        let err = service
            .update("a", NodeUpdate::new().with_parent(Some("a".to_string())))
            .await
            .unwrap_err();

        assert!(matches!(err, ContentServiceError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_delete_cascades_one_level() {
        let service = create_test_service();
        service.create("a", "", None).await.unwrap();
        service.create("b", "", Some("a".to_string())).await.unwrap();
        service.create("c", "", Some("b".to_string())).await.unwrap();
        service.create("d", "", None).await.unwrap();

        let result = service.delete("a").await.unwrap();
        assert_eq!(result.children_deleted, 1);

        assert!(service.get("a").await.is_err());
        assert!(service.get("b").await.is_err());
        assert!(service.get("c").await.is_ok());
        assert!(service.get("d").await.is_ok());

        assert!(matches!(
            service.delete("a").await,
            Err(ContentServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_orders_by_parent_then_time() {
        let service = create_test_service();
        service.create("child", "", Some("a".to_string())).await.unwrap();
        service.create("a", "", None).await.unwrap();
        service.create("b", "", None).await.unwrap();

        let keys: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.key)
            .collect();

        assert_eq!(keys, vec!["a", "b", "child"]);
    }

    #[tokio::test]
    async fn test_list_by_parent() {
        let service = create_test_service();
        service.create("a", "", None).await.unwrap();
        service.create("x", "", Some("a".to_string())).await.unwrap();
        service.create("y", "", Some("a".to_string())).await.unwrap();

        let top: Vec<String> = service
            .list_by_parent(None)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.key)
            .collect();
        let children: Vec<String> = service
            .list_by_parent(Some("a"))
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.key)
            .collect();

        assert_eq!(top, vec!["a"]);
        assert_eq!(children, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_menu_promotes_orphans() {
        let service = create_test_service();
        service.create("root1", "", None).await.unwrap();
        service
            .create("child1", "", Some("root1".to_string()))
            .await
            .unwrap();
        service
            .create("orphan1", "", Some("missing".to_string()))
            .await
            .unwrap();

        let menu = service.menu().await.unwrap();
        let roots: Vec<&str> = menu.iter().map(TreeNode::key).collect();

        assert_eq!(roots, vec!["root1", "orphan1"]);
        assert_eq!(menu[0].children.len(), 1);
        assert_eq!(menu[0].children[0].key(), "child1");
    }

    #[tokio::test]
    async fn test_ancestor_walk_tolerates_existing_cycle() {
        let store = Arc::new(MemoryStore::with_nodes(vec![
            ContentNode::new("p", "", Some("q".to_string()), 0),
            ContentNode::new("q", "", Some("p".to_string()), 0),
        ]));
        let service = ContentService::new(store);

        let created = service.create("n", "", Some("p".to_string())).await;
        assert!(created.is_ok());
    }

    #[tokio::test]
    async fn test_ancestor_walk_respects_depth_bound() {
        let config = ContentConfig {
            max_ancestor_depth: 1,
            ..ContentConfig::default()
        };
        let store = Arc::new(MemoryStore::new());
        let service = ContentService::with_config(store, &config);
        service.create("a", "", None).await.unwrap();
        service.create("b", "", Some("a".to_string())).await.unwrap();

        // Walking b -> a needs two steps; the bound stops the walk early
        let moved = service
            .update("a", NodeUpdate::new().with_parent(Some("b".to_string())))
            .await;
        assert!(moved.is_ok());
    }

    #[tokio::test]
    async fn test_stored_cycle_still_serves_menu_and_writes() {
        let store = Arc::new(MemoryStore::new());
        let service = ContentService::new(store.clone());
        service.create("a", "", None).await.unwrap();
        service.create("b", "", None).await.unwrap();

        // Interleaved writes that each passed the check on their own snapshot
        let mut a = service.get("a").await.unwrap();
        a.parent_key = Some("b".to_string());
        let mut b = service.get("b").await.unwrap();
        b.parent_key = Some("a".to_string());
        store.put_node(a).await.unwrap();
        store.put_node(b).await.unwrap();

        let menu = service.menu().await.unwrap();
        assert_eq!(menu.iter().map(TreeNode::subtree_len).sum::<usize>(), 2);

        let created = service.create("c", "", Some("a".to_string())).await;
        assert!(created.is_ok());
        assert!(matches!(
            service
                .update("a", NodeUpdate::new().with_parent(Some("c".to_string())))
                .await,
            Err(ContentServiceError::CycleDetected { .. })
        ));
    }

    #[tokio::test]
    async fn test_ping() {
        assert!(create_test_service().ping().await.is_ok());
    }
}
