//! Storage Layer
//!
//! This module holds everything that touches persisted content nodes:
//!
//! - `NodeStore` - the storage contract the content service depends on
//! - `DatabaseService` - libsql (embedded SQLite) connection and schema management
//! - `LibsqlStore` - durable `NodeStore` over `DatabaseService`
//! - `MemoryStore` - in-process `NodeStore` for tests and ephemeral use
//!
//! # Architecture
//!
//! The store is a single long-lived handle passed explicitly into the service
//! (`Arc<dyn NodeStore>`); there is no global connection.

mod database;
mod error;
mod libsql_store;
mod memory_store;
pub mod node_store;

pub use database::{DatabaseService, DEFAULT_BUSY_TIMEOUT_MS};
pub use error::DatabaseError;
pub use libsql_store::LibsqlStore;
pub use memory_store::MemoryStore;
pub use node_store::{NodeStore, OrderFn};
