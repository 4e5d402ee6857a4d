//! Data Models
//!
//! This module contains the core data structures used throughout ContentSpace:
//!
//! - `ContentNode` - The single stored entity (keyed, optionally parented)
//! - `NodeUpdate` - Partial update used by upserts
//! - `TreeNode` - A node plus its ordered children, produced by the menu assembler

mod node;
mod tree;

pub use node::{ContentNode, DeleteResult, NodeUpdate, ValidationError};
pub use tree::TreeNode;
