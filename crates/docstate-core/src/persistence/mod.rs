//! Persistence interfaces and backends for the state store.
//!
//! This module defines the store abstraction and backend implementations.
//! The store owns all persisted records; handlers only ever see full
//! [`DocumentRecord`]s and never issue partial writes.

pub mod memory;
pub mod postgres;
pub mod sqlite;

pub use self::memory::MemoryStore;
pub use self::postgres::PostgresStore;
pub use self::sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::StateError;

/// One document's persisted processing state.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    /// Unique document identifier; the sole lookup key.
    pub file_name: String,
    /// Current caller-asserted stage (e.g. "PENDING_OCR").
    pub state: String,
    /// Free-form annotations accumulated across pipeline stages.
    pub metadata: Map<String, Value>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

/// Key-value store interface used by the request handlers.
///
/// Single-item point operations only; the service needs no range queries or
/// secondary indexes. Handlers receive this as an injected `Arc<dyn
/// StateStore>` so tests can substitute the in-memory backend.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Look up the record for a document, or `None` if it was never written.
    async fn get(&self, file_name: &str) -> Result<Option<DocumentRecord>, StateError>;

    /// Write the full record, creating it if absent.
    ///
    /// The write is a single atomic upsert of the complete record; a failed
    /// put never leaves a half-written row. Read-merge-write sequences built
    /// on top of `get` + `put` are not atomic across concurrent callers, and
    /// the last writer wins.
    async fn put(&self, record: &DocumentRecord) -> Result<(), StateError>;

    /// Verify the backing store is reachable.
    async fn health_check(&self) -> Result<bool, StateError>;
}
