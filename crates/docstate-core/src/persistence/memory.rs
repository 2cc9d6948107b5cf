//! In-memory state store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::error::StateError;

use super::{DocumentRecord, StateStore};

/// In-memory store used by tests in place of a real database.
///
/// Implements the same capability set as the SQL backends, plus a failure
/// toggle so the store-error paths of the handlers can be exercised.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, DocumentRecord>>,
    fail: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent store call fail with a `StoreError`.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_failure(&self, operation: &str) -> Result<(), StateError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StateError::store(operation, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, file_name: &str) -> Result<Option<DocumentRecord>, StateError> {
        self.check_failure("get")?;
        Ok(self.records.read().await.get(file_name).cloned())
    }

    async fn put(&self, record: &DocumentRecord) -> Result<(), StateError> {
        self.check_failure("put")?;
        self.records
            .write()
            .await
            .insert(record.file_name.clone(), record.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StateError> {
        Ok(!self.fail.load(Ordering::SeqCst))
    }
}
