//! Service Layer Error Types
//!
//! This module defines the typed failures of the content service. Malformed
//! hierarchy data (dangling parents, duplicate orders) is never an error; these
//! variants only cover requests that cannot be honored.

use crate::db::DatabaseError;
use crate::models::ValidationError;
use thiserror::Error;

/// Content service operation errors
#[derive(Error, Debug)]
pub enum ContentServiceError {
    /// Key absent on get/delete
    #[error("Content not found: {key}")]
    NotFound { key: String },

    /// Key already present on create
    #[error("Content key already exists: {key}")]
    Conflict { key: String },

    /// Write would make a node its own ancestor
    #[error("Setting parent '{parent_key}' on '{key}' would create a cycle")]
    CycleDetected { key: String, parent_key: String },

    /// Node failed structural validation
    #[error("Content validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Underlying store failure, surfaced verbatim
    #[error("Store unavailable: {0}")]
    StoreUnavailable(DatabaseError),
}

impl ContentServiceError {
    /// Create a not found error
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a conflict error
    pub fn conflict(key: impl Into<String>) -> Self {
        Self::Conflict { key: key.into() }
    }

    /// Create a cycle detected error
    pub fn cycle_detected(key: impl Into<String>, parent_key: impl Into<String>) -> Self {
        Self::CycleDetected {
            key: key.into(),
            parent_key: parent_key.into(),
        }
    }
}

impl From<DatabaseError> for ContentServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::DuplicateKey { key } => Self::Conflict { key },
            other => Self::StoreUnavailable(other),
        }
    }
}
