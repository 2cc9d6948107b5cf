//! PostgreSQL-backed state store.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::error::StateError;

use super::{DocumentRecord, StateStore};

/// PostgreSQL-backed state store.
///
/// The table name comes from configuration, so statements interpolate it
/// rather than naming it statically. The name is validated as a plain
/// identifier at configuration time.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    table: String,
}

impl PostgresStore {
    /// Create a new store over an existing pool, reading and writing `table`.
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
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
                updated_at TIMESTAMPTZ NOT NULL
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

fn record_from_row(row: &PgRow) -> Result<DocumentRecord, StateError> {
    let metadata_raw: String = row.try_get("metadata")?;
    Ok(DocumentRecord {
        file_name: row.try_get("file_name")?,
        state: row.try_get("state")?,
        metadata: serde_json::from_str(&metadata_raw)?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait::async_trait]
impl StateStore for PostgresStore {
    async fn get(&self, file_name: &str) -> Result<Option<DocumentRecord>, StateError> {
        let query = format!(
            r#"
            SELECT file_name, state, metadata, updated_at
            FROM {}
            WHERE file_name = $1
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
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (file_name) DO UPDATE
            SET state = EXCLUDED.state,
                metadata = EXCLUDED.metadata,
                updated_at = EXCLUDED.updated_at
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
