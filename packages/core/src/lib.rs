//! ContentSpace Core
//!
//! Storage and business logic for a hierarchical content store: keyed text
//! entries with an optional parent and a sibling order, assembled on demand
//! into an ordered navigation tree (the "menu").
//!
//! # Architecture
//!
//! - **Flat storage**: every node is one record keyed by `key`; the hierarchy is
//!   only the `parent_key` reference
//! - **libsql**: embedded SQLite-compatible database behind the `NodeStore` trait
//! - **Tolerant reads**: orphans and cycles degrade to top-level entries instead
//!   of failing the menu
//!
//! # Modules
//!
//! - [`models`] - Data structures (ContentNode, NodeUpdate, TreeNode)
//! - [`db`] - Storage contract plus libsql and in-memory stores
//! - [`services`] - ContentService, order assignment, tree assembly, seeding
//! - [`config`] - Runtime configuration

pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::ContentConfig;
pub use db::{DatabaseError, DatabaseService, LibsqlStore, MemoryStore, NodeStore};
pub use models::*;
pub use services::{ContentService, ContentServiceError};
