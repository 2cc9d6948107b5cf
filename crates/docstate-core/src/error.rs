// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for the state-manager service.
//!
//! Provides a unified error type that maps to wire error responses.

use std::fmt;

/// Result type using StateError
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors that can occur during request processing.
///
/// Every error is terminal for the current invocation: the service performs
/// no internal retries and no partial writes. `InvalidRequest` is the
/// caller's fault and maps to a 4xx response; `StoreError` covers any failure
/// reaching or executing against the key-value store and maps to a 5xx
/// response, with retry left to the caller.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum StateError {
    /// Malformed or incomplete caller input.
    InvalidRequest {
        /// What was wrong with the request.
        message: String,
    },

    /// A state-store operation failed.
    StoreError {
        /// The store operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },
}

impl StateError {
    /// Build an `InvalidRequest` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Build a `StoreError` for the given store operation.
    pub fn store(operation: impl Into<String>, details: impl fmt::Display) -> Self {
        Self::StoreError {
            operation: operation.into(),
            details: details.to_string(),
        }
    }

    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
            Self::StoreError { .. } => "STORE_ERROR",
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest { message } => {
                write!(f, "{}", message)
            }
            Self::StoreError { operation, details } => {
                write!(f, "Store error during '{}': {}", operation, details)
            }
        }
    }
}

impl std::error::Error for StateError {}

impl From<sqlx::Error> for StateError {
    fn from(err: sqlx::Error) -> Self {
        StateError::StoreError {
            operation: "query".to_string(),
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::StoreError {
            operation: "json".to_string(),
            details: err.to_string(),
        }
    }
}
