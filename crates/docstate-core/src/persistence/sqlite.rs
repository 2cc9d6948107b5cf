//! SQLite-backed state store.

use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::error::StateError;

use super::{DocumentRecord, StateStore};

/// SQLite-backed state store.
///
/// Useful for single-node deployments and tests; the wire behavior is
/// identical to the PostgreSQL backend.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteStore {
    /// Create a new store over an existing pool, reading and writing `table`.
    pub fn new(pool: SqlitePool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    /// Connect to a SQLite URL and bootstrap the schema.
    ///
    /// The URL is passed through to sqlx, so `sqlite:state.db?mode=rwc` or
    /// `sqlite::memory:` both work.
    pub async fn connect(url: &str, table: impl Into<String>) -> Result<Self, StateError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| StateError::store("connect", e))?;

        let store = Self::new(pool, table);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create and initialize a store from a database file path.
    ///
    /// This convenience constructor handles all setup:
    /// - Creates parent directories if they don't exist
    /// - Creates the database file if it doesn't exist
    /// - Connects with sensible pool defaults
    /// - Bootstraps the schema
    pub async fn from_path(
        path: impl AsRef<Path>,
        table: impl Into<String>,
    ) -> Result<Self, StateError> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StateError::store(
                    "create_dir",
                    format!("Failed to create directory {:?}: {}", parent, e),
                )
            })?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.to_string_lossy());
        Self::connect(&url, table).await
    }

    /// Create the backing table if it does not exist.
    ///
    /// Safe to call multiple times; an existing table is left untouched.
    pub async fn ensure_schema(&self) -> Result<(), StateError> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                file_name TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{{}}',
                updated_at TEXT NOT NULL
            )
            "#,
            self.table
        );
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| StateError::store("ensure_schema", e))?;
        Ok(())
    }
}

fn record_from_row(row: &SqliteRow) -> Result<DocumentRecord, StateError> {
    let metadata_raw: String = row.try_get("metadata")?;
    Ok(DocumentRecord {
        file_name: row.try_get("file_name")?,
        state: row.try_get("state")?,
        metadata: serde_json::from_str(&metadata_raw)?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait::async_trait]
impl StateStore for SqliteStore {
    async fn get(&self, file_name: &str) -> Result<Option<DocumentRecord>, StateError> {
        let query = format!(
            r#"
            SELECT file_name, state, metadata, updated_at
            FROM {}
            WHERE file_name = ?
            "#,
            self.table
        );
        let row = sqlx::query(&query)
            .bind(file_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StateError::store("get", e))?;

        row.map(|row| record_from_row(&row)).transpose()
    }

    async fn put(&self, record: &DocumentRecord) -> Result<(), StateError> {
        let query = format!(
            r#"
            INSERT INTO {} (file_name, state, metadata, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (file_name) DO UPDATE
            SET state = excluded.state,
                metadata = excluded.metadata,
                updated_at = excluded.updated_at
            "#,
            self.table
        );
        let metadata = serde_json::to_string(&record.metadata)?;
        sqlx::query(&query)
            .bind(&record.file_name)
            .bind(&record.state)
            .bind(metadata)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StateError::store("put", e))?;

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StateError> {
        let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(row.0 == 1)
    }
}
