//! NodeStore Trait - Storage Abstraction Layer
//!
//! This module defines the `NodeStore` trait that abstracts persistence of
//! content nodes. The content service only ever talks to this trait, so the
//! libsql-backed store and the in-memory store are interchangeable.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so embedded and networked backends
//!    share one contract
//! 2. **Ownership Semantics**: Write methods take ownership of the node and
//!    return the stored copy
//! 3. **Multi-record units**: Operations that touch more than one record
//!    (`insert_with_order`, `delete_with_children`) are atomic inside the store;
//!    callers never observe a partial result
//! 4. **Typed Errors**: `DatabaseError` so the service can tell a duplicate key
//!    apart from an unavailable backend
//!
//! # Examples
//!
//! ```rust,no_run
//! use contentspace_core::db::{MemoryStore, NodeStore};
//! use contentspace_core::models::ContentNode;
//!
//! # async fn example() -> Result<(), contentspace_core::db::DatabaseError> {
//! let store = MemoryStore::new();
//! store.put_node(ContentNode::new("home", "Welcome", None, 0)).await?;
//!
//! let roots = store.scan_by_parent(None).await?;
//! assert_eq!(roots.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::db::DatabaseError;
use crate::models::{ContentNode, DeleteResult};
use async_trait::async_trait;

/// Computes the order for a new node from the current maximum of its sibling
/// group (`None` when the group is empty).
pub type OrderFn = fn(Option<i64>) -> i64;

/// Abstraction layer for content node persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single store handle is shared by
/// every concurrent caller of the content service.
///
/// # Parent Groups
///
/// Every method taking `parent_key: Option<&str>` treats `None` as the
/// top-level group (nodes stored without a parent).
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Get node by key
    ///
    /// Returns `Ok(None)` when the key is absent (not an error).
    async fn get_node(&self, key: &str) -> Result<Option<ContentNode>, DatabaseError>;

    /// Insert or replace a node keyed by `node.key`
    async fn put_node(&self, node: ContentNode) -> Result<ContentNode, DatabaseError>;

    /// Atomically insert a node at the next sibling position
    ///
    /// Within one unit of work the store:
    ///
    /// 1. Fails with [`DatabaseError::DuplicateKey`] if `node.key` exists
    /// 2. Reads the current maximum `order` of `node.parent_key`'s group
    /// 3. Sets `node.order = next_order(max)` and inserts the node
    ///
    /// Concurrent inserts into the same group therefore never read the same max.
    async fn insert_with_order(
        &self,
        node: ContentNode,
        next_order: OrderFn,
    ) -> Result<ContentNode, DatabaseError>;

    /// Delete a single node by key, leaving its children in place
    ///
    /// Returns `false` when the key was absent. The content service deletes
    /// through `delete_with_children`; this is the plain single-record form.
    async fn delete_node(&self, key: &str) -> Result<bool, DatabaseError>;

    /// Atomically delete a node and its direct children
    ///
    /// Deletes every node whose `parent_key` equals `key`, then the node itself.
    /// Grandchildren are untouched. Returns `DeleteResult::not_found()` without
    /// deleting anything when `key` is absent.
    async fn delete_with_children(&self, key: &str) -> Result<DeleteResult, DatabaseError>;

    /// Every stored node, in no particular order
    async fn scan_all(&self) -> Result<Vec<ContentNode>, DatabaseError>;

    /// Direct children of `parent_key` (top-level nodes for `None`), in no particular order
    async fn scan_by_parent(
        &self,
        parent_key: Option<&str>,
    ) -> Result<Vec<ContentNode>, DatabaseError>;

    /// Maximum `order` in the group, `None` when the group is empty
    async fn max_order(&self, parent_key: Option<&str>) -> Result<Option<i64>, DatabaseError>;

    /// Cheap round-trip proving the backend is reachable
    async fn ping(&self) -> Result<(), DatabaseError>;
}
