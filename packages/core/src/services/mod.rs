//! Business Services
//!
//! This module contains the content business logic:
//!
//! - `ContentService` - CRUD, listings and menu assembly over a `NodeStore`
//! - `OrderAssigner` - sibling order for newly created nodes
//! - `tree_assembler` - flat snapshot to ordered forest
//! - `seed` - stock content for a fresh store
//!
//! Services coordinate between the storage layer and callers; they hold no node
//! state of their own.

pub mod content_service;
pub mod error;
pub mod order_assigner;
pub mod seed;
pub mod tree_assembler;

pub use content_service::{ContentService, DEFAULT_MAX_ANCESTOR_DEPTH};
pub use error::ContentServiceError;
pub use order_assigner::OrderAssigner;
pub use seed::{seed_defaults, DEFAULT_CONTENT};
pub use tree_assembler::{assemble, sibling_cmp};
