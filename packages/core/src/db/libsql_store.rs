//! LibsqlStore - NodeStore implementation for the libsql (Turso) backend
//!
//! Wraps a `DatabaseService` and maps each `NodeStore` method onto SQL against
//! the `content_nodes` table.
//!
//! # Design Principles
//!
//! 1. **Row Conversion**: `row_to_node` is the single libsql::Row → ContentNode path
//! 2. **Transactions**: Multi-record writes run inside `BEGIN IMMEDIATE ... COMMIT`
//!    and roll back on any failure, so no partial state is ever visible
//! 3. **Sortable Timestamps**: Stored as fixed-width RFC3339 with nanoseconds
//!
//! # Examples
//!
//! ```rust,no_run
//! use contentspace_core::db::{DatabaseService, LibsqlStore, NodeStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/content.db")).await?);
//!     let store: Arc<dyn NodeStore> = Arc::new(LibsqlStore::new(db));
//!
//!     let node = store.get_node("home").await?;
//!     Ok(())
//! }
//! ```

use crate::db::node_store::{NodeStore, OrderFn};
use crate::db::{DatabaseError, DatabaseService};
use crate::models::{ContentNode, DeleteResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Row, Rows, Value};
use std::sync::Arc;

const SELECT_COLUMNS: &str =
    "SELECT key, value, parent_key, sort_order, created_at, updated_at FROM content_nodes";

/// LibsqlStore implements NodeStore on top of DatabaseService
pub struct LibsqlStore {
    db: Arc<DatabaseService>,
}

impl LibsqlStore {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Access the underlying database service
    pub fn database(&self) -> &Arc<DatabaseService> {
        &self.db
    }

    fn format_timestamp(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DatabaseError::invalid_row(format!("Bad timestamp '{}': {}", s, e)))
    }

    fn parent_value(parent_key: Option<&str>) -> Value {
        match parent_key {
            Some(key) => Value::Text(key.to_string()),
            None => Value::Null,
        }
    }

    /// Convert libsql::Row to ContentNode
    ///
    /// Expected columns (in order): key, value, parent_key, sort_order,
    /// created_at, updated_at (see `SELECT_COLUMNS`).
    fn row_to_node(row: &Row) -> Result<ContentNode, DatabaseError> {
        let key: String = row
            .get(0)
            .map_err(|e| DatabaseError::invalid_row(format!("Failed to get key: {}", e)))?;
        let value: String = row
            .get(1)
            .map_err(|e| DatabaseError::invalid_row(format!("Failed to get value: {}", e)))?;
        let parent_key: Option<String> = row
            .get(2)
            .map_err(|e| DatabaseError::invalid_row(format!("Failed to get parent_key: {}", e)))?;
        let order: i64 = row
            .get(3)
            .map_err(|e| DatabaseError::invalid_row(format!("Failed to get sort_order: {}", e)))?;
        let created_at: String = row
            .get(4)
            .map_err(|e| DatabaseError::invalid_row(format!("Failed to get created_at: {}", e)))?;
        let updated_at: String = row
            .get(5)
            .map_err(|e| DatabaseError::invalid_row(format!("Failed to get updated_at: {}", e)))?;

        Ok(ContentNode {
            key,
            value,
            parent_key,
            order,
            created_at: Self::parse_timestamp(&created_at)?,
            updated_at: Self::parse_timestamp(&updated_at)?,
        })
    }

    async fn collect_rows(mut rows: Rows) -> Result<Vec<ContentNode>, DatabaseError> {
        let mut nodes = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to read row: {}", e)))?
        {
            nodes.push(Self::row_to_node(&row)?);
        }
        Ok(nodes)
    }

    async fn begin(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute("BEGIN IMMEDIATE", ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to begin transaction: {}", e))
        })?;
        Ok(())
    }

    async fn commit(conn: &Connection) -> Result<(), DatabaseError> {
        if let Err(e) = conn.execute("COMMIT", ()).await {
            Self::rollback(conn).await;
            return Err(DatabaseError::sql_execution(format!(
                "Failed to commit transaction: {}",
                e
            )));
        }
        Ok(())
    }

    async fn rollback(conn: &Connection) {
        if let Err(e) = conn.execute("ROLLBACK", ()).await {
            tracing::warn!("Rollback failed: {}", e);
        }
    }

    async fn key_exists(conn: &Connection, key: &str) -> Result<bool, DatabaseError> {
        let mut rows = conn
            .query("SELECT 1 FROM content_nodes WHERE key = ?", [key])
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to check key existence: {}", e))
            })?;
        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn group_max(
        conn: &Connection,
        parent_key: Option<&str>,
    ) -> Result<Option<i64>, DatabaseError> {
        // `IS` matches NULL against NULL, so one statement serves the top-level group too
        let mut rows = conn
            .query(
                "SELECT MAX(sort_order) FROM content_nodes WHERE parent_key IS ?",
                vec![Self::parent_value(parent_key)],
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to read max order: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            Some(row) => row
                .get::<Option<i64>>(0)
                .map_err(|e| DatabaseError::invalid_row(format!("Failed to get max order: {}", e))),
            None => Ok(None),
        }
    }

    async fn insert_row(conn: &Connection, node: &ContentNode) -> Result<(), DatabaseError> {
        conn.execute(
            "INSERT INTO content_nodes (key, value, parent_key, sort_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                Value::Text(node.key.clone()),
                Value::Text(node.value.clone()),
                Self::parent_value(node.parent_key.as_deref()),
                Value::Integer(node.order),
                Value::Text(Self::format_timestamp(&node.created_at)),
                Value::Text(Self::format_timestamp(&node.updated_at)),
            ],
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert node: {}", e)))?;
        Ok(())
    }

    async fn insert_in_transaction(
        conn: &Connection,
        mut node: ContentNode,
        next_order: OrderFn,
    ) -> Result<ContentNode, DatabaseError> {
        if Self::key_exists(conn, &node.key).await? {
            return Err(DatabaseError::duplicate_key(node.key));
        }

        node.order = next_order(Self::group_max(conn, node.parent_key.as_deref()).await?);
        Self::insert_row(conn, &node).await?;
        Ok(node)
    }

    async fn delete_in_transaction(
        conn: &Connection,
        key: &str,
    ) -> Result<DeleteResult, DatabaseError> {
        if !Self::key_exists(conn, key).await? {
            return Ok(DeleteResult::not_found());
        }

        let children_deleted = conn
            .execute("DELETE FROM content_nodes WHERE parent_key = ?", [key])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to delete children: {}", e)))?;

        conn.execute("DELETE FROM content_nodes WHERE key = ?", [key])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to delete node: {}", e)))?;

        Ok(DeleteResult::deleted(children_deleted))
    }
}

#[async_trait]
impl NodeStore for LibsqlStore {
    async fn get_node(&self, key: &str) -> Result<Option<ContentNode>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;

        let mut rows = conn
            .query(&format!("{} WHERE key = ?", SELECT_COLUMNS), [key])
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to execute get_node query: {}", e))
            })?;

        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            Some(row) => Ok(Some(Self::row_to_node(&row)?)),
            None => Ok(None),
        }
    }

    async fn put_node(&self, node: ContentNode) -> Result<ContentNode, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO content_nodes (key, value, parent_key, sort_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                parent_key = excluded.parent_key,
                sort_order = excluded.sort_order,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            vec![
                Value::Text(node.key.clone()),
                Value::Text(node.value.clone()),
                Self::parent_value(node.parent_key.as_deref()),
                Value::Integer(node.order),
                Value::Text(Self::format_timestamp(&node.created_at)),
                Value::Text(Self::format_timestamp(&node.updated_at)),
            ],
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to upsert node: {}", e)))?;

        Ok(node)
    }

    async fn insert_with_order(
        &self,
        node: ContentNode,
        next_order: OrderFn,
    ) -> Result<ContentNode, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        Self::begin(&conn).await?;

        match Self::insert_in_transaction(&conn, node, next_order).await {
            Ok(node) => {
                Self::commit(&conn).await?;
                Ok(node)
            }
            Err(e) => {
                Self::rollback(&conn).await;
                Err(e)
            }
        }
    }

    async fn delete_node(&self, key: &str) -> Result<bool, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;

        let deleted = conn
            .execute("DELETE FROM content_nodes WHERE key = ?", [key])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to delete node: {}", e)))?;

        Ok(deleted > 0)
    }

    async fn delete_with_children(&self, key: &str) -> Result<DeleteResult, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        Self::begin(&conn).await?;

        match Self::delete_in_transaction(&conn, key).await {
            Ok(result) => {
                Self::commit(&conn).await?;
                Ok(result)
            }
            Err(e) => {
                Self::rollback(&conn).await;
                Err(e)
            }
        }
    }

    async fn scan_all(&self) -> Result<Vec<ContentNode>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;

        let rows = conn.query(SELECT_COLUMNS, ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute scan_all query: {}", e))
        })?;

        Self::collect_rows(rows).await
    }

    async fn scan_by_parent(
        &self,
        parent_key: Option<&str>,
    ) -> Result<Vec<ContentNode>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;

        let rows = conn
            .query(
                &format!("{} WHERE parent_key IS ?", SELECT_COLUMNS),
                vec![Self::parent_value(parent_key)],
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to execute scan_by_parent query: {}",
                    e
                ))
            })?;

        Self::collect_rows(rows).await
    }

    async fn max_order(&self, parent_key: Option<&str>) -> Result<Option<i64>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        Self::group_max(&conn, parent_key).await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        let mut rows = conn
            .query("SELECT 1", ())
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Health check failed: {}", e)))?;
        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Health check failed: {}", e)))?;
        Ok(())
    }
}
