//! Content Node Data Structures
//!
//! This module defines the `ContentNode` struct and the partial-update type used
//! by the content service.
//!
//! # Architecture
//!
//! - **Keyed Node**: The caller-chosen `key` is the primary key and the foreign
//!   reference used by children (`parent_key`)
//! - **Loose Hierarchy**: `parent_key` is never enforced as a foreign key; dangling
//!   references (orphans) are valid data
//! - **Sibling Ordering**: `order` is an integer assigned per parent group at creation
//!
//! # Examples
//!
//! ```rust
//! use contentspace_core::models::ContentNode;
//!
//! let home = ContentNode::new("home", "Welcome", None, 0);
//! let intro = ContentNode::new("intro", "Intro text", Some("home".to_string()), 0);
//!
//! assert!(home.is_top_level());
//! assert_eq!(intro.parent_key.as_deref(), Some("home"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Validation errors for content node operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),
}

/// A single stored content record.
///
/// # Fields
///
/// - `key`: Unique, immutable, non-empty identifier
/// - `value`: Opaque payload (no format constraints)
/// - `parent_key`: Optional reference to another node's key (`None` = top level)
/// - `order`: Position among siblings sharing the same `parent_key`
/// - `created_at`: Set once at creation, never modified afterwards
/// - `updated_at`: Set at creation and refreshed on every update
///
/// `updated_at` is the "last touched" marker used as the ordering tiebreak when
/// sibling `order` values collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// Unique identifier (primary key)
    pub key: String,

    /// Opaque content payload
    pub value: String,

    /// Parent node key (not enforced, may dangle)
    pub parent_key: Option<String>,

    /// Sibling position within the parent group
    #[serde(default)]
    pub order: i64,

    /// Creation timestamp (immutable)
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl ContentNode {
    /// Create a new node stamped with the current time
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        parent_key: Option<String>,
        order: i64,
    ) -> Self {
        let now = Utc::now();
        Self::new_at(key, value, parent_key, order, now)
    }

    /// Create a new node with an explicit timestamp for both `created_at` and `updated_at`
    ///
    /// Useful when several records must share a single logical write time.
    pub fn new_at(
        key: impl Into<String>,
        value: impl Into<String>,
        parent_key: Option<String>,
        order: i64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            parent_key,
            order,
            created_at: at,
            updated_at: at,
        }
    }

    /// Validate node structure
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use contentspace_core::models::{ContentNode, ValidationError};
    /// let node = ContentNode::new("loop", "x", Some("loop".to_string()), 0);
    /// assert!(matches!(node.validate(), Err(ValidationError::InvalidParent(_))));
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key.is_empty() {
            return Err(ValidationError::MissingField("key".to_string()));
        }

        if let Some(parent_key) = &self.parent_key {
            if parent_key == &self.key {
                return Err(ValidationError::InvalidParent(
                    "Node cannot be its own parent".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// True when the node has no parent reference
    pub fn is_top_level(&self) -> bool {
        self.parent_key.is_none()
    }

    /// Merge a partial update into this node and refresh `updated_at`.
    ///
    /// Each provided field is applied independently; `updated_at` is refreshed
    /// even when the update carries no field at all.
    pub fn apply_update(&mut self, update: NodeUpdate, at: DateTime<Utc>) {
        if let Some(value) = update.value {
            self.value = value;
        }
        if let Some(parent_key) = update.parent_key {
            self.parent_key = parent_key;
        }
        if let Some(order) = update.order {
            self.order = order;
        }
        self.updated_at = at;
    }
}

/// Custom deserializer for optional fields that accepts both plain values and nulls
///
/// Maps three input formats to the double-Option pattern:
/// - Missing field → None (don't update)
/// - null → Some(None) (set to NULL)
/// - "value" → Some(Some("value")) (set to value)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial node update for upsert operations
///
/// All fields are optional. Only provided fields change the stored record.
///
/// `parent_key` uses the double-Option pattern:
///
/// - `None`: Don't change the parent
/// - `Some(None)`: Move the node to the top level
/// - `Some(Some(key))`: Re-parent under `key`
///
/// # Examples
///
/// ```rust
/// # use contentspace_core::models::NodeUpdate;
/// // Only change the payload
/// let update = NodeUpdate::new().with_value("Updated");
///
/// // Move to the top level and pin the position
/// let update = NodeUpdate {
///     parent_key: Some(None),
///     order: Some(3),
///     ..Default::default()
/// };
/// assert!(!update.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    /// Update the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Update the parent reference
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_key: Option<Option<String>>,

    /// Update the sibling position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl NodeUpdate {
    /// Create a new empty NodeUpdate
    pub fn new() -> Self {
        Self::default()
    }

    /// Set value update
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set parent update (`None` moves the node to the top level)
    pub fn with_parent(mut self, parent_key: Option<String>) -> Self {
        self.parent_key = Some(parent_key);
        self
    }

    /// Set order update
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Check if update contains any changes
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.parent_key.is_none() && self.order.is_none()
    }
}

/// Result of a delete operation
///
/// `children_deleted` counts the direct children removed alongside the node.
/// Grandchildren are left in place and become orphans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// Whether the node existed before deletion
    pub existed: bool,

    /// Number of direct children removed in the same unit of work
    pub children_deleted: u64,
}

impl DeleteResult {
    /// Create a DeleteResult for a node that existed
    pub fn deleted(children_deleted: u64) -> Self {
        Self {
            existed: true,
            children_deleted,
        }
    }

    /// Create a DeleteResult indicating the node didn't exist
    pub fn not_found() -> Self {
        Self {
            existed: false,
            children_deleted: 0,
        }
    }

    /// Human-readable confirmation for the caller
    pub fn message(&self, key: &str) -> String {
        format!(
            "Content '{}' and its {} direct child(ren) were deleted",
            key, self.children_deleted
        )
    }
}
