// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request handlers for the state-manager service.
//!
//! These handlers process orchestrator requests (state lookup, state update)
//! against the injected state store. The service is stateless between
//! requests; each invocation runs to completion independently.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument};

use crate::error::StateError;
use crate::persistence::{DocumentRecord, StateStore};
use crate::protocol::{
    GetResponse, HealthResponse, Operation, StateRequest, StateResponse, UpdateResponse,
};

/// Shared state for request handlers.
///
/// Contains the store implementation shared across all handlers.
pub struct HandlerState {
    /// Injected state store backend.
    pub store: Arc<dyn StateStore>,
    /// When the server started (for uptime calculation).
    pub start_time: std::time::Instant,
    /// Server version string.
    pub version: String,
}

impl HandlerState {
    /// Create a new handler state with the given store backend.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            start_time: std::time::Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Get the server uptime in milliseconds.
    pub fn uptime_ms(&self) -> i64 {
        self.start_time.elapsed().as_millis() as i64
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Dispatch a state request to the matching operation handler.
///
/// `file_name` is validated before the operation is resolved, so a missing
/// document identifier is reported even when the operation is also unknown.
///
/// # Errors
///
/// Returns `InvalidRequest` if:
/// - `file_name` is missing or empty
/// - `operation` is neither GET nor UPDATE (case-insensitive)
/// - the operation is UPDATE and `new_state` is missing or empty
#[instrument(skip(state, request), fields(operation = %request.operation, file_name = %request.file_name))]
pub async fn handle_request(
    state: &HandlerState,
    request: StateRequest,
) -> Result<StateResponse, StateError> {
    // 1. Validate file_name before dispatching
    if request.file_name.is_empty() {
        info!("Rejecting request without file_name");
        return Err(StateError::invalid("file_name is required"));
    }

    // 2. Resolve the operation
    let operation_raw = request.operation.to_ascii_uppercase();
    let Some(operation) = Operation::parse(&operation_raw) else {
        info!("Rejecting unrecognized operation");
        return Err(StateError::invalid(format!(
            "Invalid operation: {}. Use GET or UPDATE",
            operation_raw
        )));
    };

    // 3. Dispatch
    match operation {
        Operation::Get => handle_get(state, &request.file_name)
            .await
            .map(StateResponse::Get),
        Operation::Update => {
            let new_state = match request.new_state.as_deref() {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => {
                    info!("Rejecting UPDATE without new_state");
                    return Err(StateError::invalid(
                        "new_state is required for UPDATE operation",
                    ));
                }
            };
            let metadata = request.metadata.unwrap_or_default();
            handle_update(state, &request.file_name, new_state, metadata)
                .await
                .map(StateResponse::Update)
        }
    }
}

// ============================================================================
// GET
// ============================================================================

/// Look up the current state for a document.
///
/// A document with no record is not an error: it reports `exists: false`
/// with a null state and empty metadata, and no `updated_at`.
#[instrument(skip(state))]
pub async fn handle_get(
    state: &HandlerState,
    file_name: &str,
) -> Result<GetResponse, StateError> {
    match state.store.get(file_name).await {
        Ok(Some(record)) => {
            debug!(state = %record.state, "Record found");
            Ok(GetResponse {
                file_name: record.file_name,
                state: Some(record.state),
                metadata: record.metadata,
                updated_at: Some(record.updated_at),
                exists: true,
            })
        }
        Ok(None) => {
            debug!("No record for document");
            Ok(GetResponse {
                file_name: file_name.to_string(),
                state: None,
                metadata: Map::new(),
                updated_at: None,
                exists: false,
            })
        }
        Err(e) => {
            error!(error = %e, "Failed to read document state");
            Err(e)
        }
    }
}

// ============================================================================
// UPDATE
// ============================================================================

/// Write a new state for a document, merging metadata over what is stored.
///
/// Shallow merge: keys in the incoming metadata override stored keys; stored
/// keys absent from the incoming map are retained. The merged record is
/// written as a single put, so a failed update never leaves a half-merged
/// record. The read-merge-write sequence as a whole is not atomic across
/// concurrent callers; the last writer wins.
///
/// `new_state` is persisted as the caller supplies it. The service does not
/// gate stage transitions, so a caller can re-issue an earlier stage after a
/// partial failure.
#[instrument(skip(state, metadata))]
pub async fn handle_update(
    state: &HandlerState,
    file_name: &str,
    new_state: String,
    metadata: Map<String, Value>,
) -> Result<UpdateResponse, StateError> {
    // 1. Read the existing record as the merge base
    let existing = state.store.get(file_name).await.map_err(|e| {
        error!(error = %e, "Failed to read existing state for update");
        e
    })?;

    // 2. Shallow-merge incoming metadata over stored metadata
    let mut merged = existing.map(|r| r.metadata).unwrap_or_default();
    for (key, value) in metadata {
        merged.insert(key, value);
    }

    // 3. Write the fully-merged record in one put
    let record = DocumentRecord {
        file_name: file_name.to_string(),
        state: new_state,
        metadata: merged,
        updated_at: Utc::now(),
    };
    state.store.put(&record).await.map_err(|e| {
        error!(error = %e, "Failed to write document state");
        e
    })?;

    info!(state = %record.state, "Document state updated");

    Ok(UpdateResponse {
        file_name: record.file_name,
        state: record.state,
        metadata: record.metadata,
        updated_at: record.updated_at,
        success: true,
    })
}

// ============================================================================
// Health Check
// ============================================================================

/// Handle health check request.
///
/// Probes the store with a round-trip; an unreachable store reports
/// unhealthy rather than an error.
pub async fn handle_health_check(state: &HandlerState) -> HealthResponse {
    let healthy = state.store.health_check().await.unwrap_or(false);

    HealthResponse {
        healthy,
        version: state.version.clone(),
        uptime_ms: state.uptime_ms(),
    }
}
