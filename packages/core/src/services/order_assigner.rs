//! Sibling order assignment for newly created nodes.
//!
//! A new node goes after every existing sibling: `1 + max(order)` of its parent
//! group, or `0` for an empty group. Only creation assigns an order; updates keep
//! the stored value unless the caller supplies a new one.
//!
//! The rule is exposed as a plain function so stores can evaluate it inside the
//! same unit of work that reads the group max (see
//! [`NodeStore::insert_with_order`](crate::db::NodeStore::insert_with_order)).

use crate::db::{DatabaseError, NodeStore};

pub struct OrderAssigner;

impl OrderAssigner {
    /// Order for a new node given the current group maximum
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use contentspace_core::services::OrderAssigner;
    /// assert_eq!(OrderAssigner::next_after(None), 0);
    /// assert_eq!(OrderAssigner::next_after(Some(4)), 5);
    /// ```
    pub fn next_after(current_max: Option<i64>) -> i64 {
        current_max.map_or(0, |max| max.saturating_add(1))
    }

    /// Read the group max from `store` and compute the next order
    ///
    /// This is a point-in-time answer only. Creation goes through
    /// `insert_with_order` so the read and the insert cannot interleave with
    /// another create in the same group.
    pub async fn next_order(
        store: &dyn NodeStore,
        parent_key: Option<&str>,
    ) -> Result<i64, DatabaseError> {
        let max = store.max_order(parent_key).await?;
        Ok(Self::next_after(max))
    }
}
