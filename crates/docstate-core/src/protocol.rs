// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Wire request/response types for the state endpoint.
//!
//! The endpoint speaks UTF-8 JSON in both directions. Errors share the same
//! envelope style as success responses (an `error` object with code and
//! message) so the orchestrator can branch on a consistent shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StateError;

/// Operation requested by the orchestrator.
///
/// A closed set: anything other than GET or UPDATE is rejected at the
/// boundary with an `INVALID_REQUEST` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Look up the current state for a document.
    Get,
    /// Write a new state and merge metadata for a document.
    Update,
}

impl Operation {
    /// Parse an operation name, case-insensitively ("get" == "GET").
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "UPDATE" => Some(Self::Update),
            _ => None,
        }
    }

    /// Canonical wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Update => "UPDATE",
        }
    }
}

/// The named pipeline stages.
///
/// Informational only: the service accepts any caller-supplied state string
/// and does not gate transitions, so callers can re-issue an earlier stage
/// after a partial failure. `NULL` has no variant because it is represented
/// by the absence of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Document discovered, waiting for OCR.
    PendingOcr,
    /// OCR done, waiting for classification.
    PendingClassification,
    /// Classified, waiting for translation.
    PendingTranslation,
    /// All stages finished.
    Completed,
}

impl Stage {
    /// Canonical wire name of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingOcr => "PENDING_OCR",
            Self::PendingClassification => "PENDING_CLASSIFICATION",
            Self::PendingTranslation => "PENDING_TRANSLATION",
            Self::Completed => "COMPLETED",
        }
    }

    /// Parse a stage name, returning `None` for anything outside the set.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING_OCR" => Some(Self::PendingOcr),
            "PENDING_CLASSIFICATION" => Some(Self::PendingClassification),
            "PENDING_TRANSLATION" => Some(Self::PendingTranslation),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Request body for the state endpoint.
///
/// All fields are optional at the deserialization layer; required-field
/// validation happens in the handlers so that missing input produces the
/// service's own error envelope rather than a serde error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateRequest {
    /// Requested operation ("GET" or "UPDATE", case-insensitive).
    #[serde(default)]
    pub operation: String,
    /// Document identifier; required for every operation.
    #[serde(default)]
    pub file_name: String,
    /// Target state; required for UPDATE, ignored for GET.
    #[serde(default)]
    pub new_state: Option<String>,
    /// Metadata to merge into the stored record; only meaningful for UPDATE.
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Response for a GET operation.
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// Document identifier from the request.
    pub file_name: String,
    /// Current state, or `null` when no record exists.
    pub state: Option<String>,
    /// Stored metadata; empty when no record exists.
    pub metadata: Map<String, Value>,
    /// When the record was last written; omitted when no record exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Whether a record exists for this document.
    pub exists: bool,
}

/// Response for an UPDATE operation.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    /// Document identifier from the request.
    pub file_name: String,
    /// The state that was written.
    pub state: String,
    /// The post-merge metadata that was written.
    pub metadata: Map<String, Value>,
    /// The write timestamp assigned by the service.
    pub updated_at: DateTime<Utc>,
    /// Always true; present so the orchestrator can branch on it.
    pub success: bool,
}

/// Response for either state operation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StateResponse {
    /// GET result.
    Get(GetResponse),
    /// UPDATE result.
    Update(UpdateResponse),
}

/// Error payload within an [`ErrorResponse`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code ("INVALID_REQUEST", "STORE_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Error envelope returned in place of a result.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// The error indicator and message.
    pub error: ErrorBody,
}

impl ErrorResponse {
    /// Build the wire envelope for a service error.
    pub fn new(error: &StateError) -> Self {
        Self {
            error: ErrorBody {
                code: error.error_code().to_string(),
                message: error.to_string(),
            },
        }
    }
}

/// Response for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Whether the backing store answered a round-trip probe.
    pub healthy: bool,
    /// Server version string.
    pub version: String,
    /// Milliseconds since the server started.
    pub uptime_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_parse_case_insensitive() {
        assert_eq!(Operation::parse("GET"), Some(Operation::Get));
        assert_eq!(Operation::parse("get"), Some(Operation::Get));
        assert_eq!(Operation::parse("Update"), Some(Operation::Update));
        assert_eq!(Operation::parse("UPDATE"), Some(Operation::Update));
        assert_eq!(Operation::parse("DELETE"), None);
        assert_eq!(Operation::parse(""), None);
    }

    #[test]
    fn test_stage_round_trip() {
        for stage in [
            Stage::PendingOcr,
            Stage::PendingClassification,
            Stage::PendingTranslation,
            Stage::Completed,
        ] {
            assert_eq!(Stage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::parse("PENDING_REVIEW"), None);
    }

    #[test]
    fn test_request_deserializes_with_missing_fields() {
        let request: StateRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.operation.is_empty());
        assert!(request.file_name.is_empty());
        assert!(request.new_state.is_none());
        assert!(request.metadata.is_none());
    }

    #[test]
    fn test_get_response_shape_for_missing_record() {
        let response = GetResponse {
            file_name: "missing.pdf".to_string(),
            state: None,
            metadata: Map::new(),
            updated_at: None,
            exists: false,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["file_name"], "missing.pdf");
        assert_eq!(value["state"], Value::Null);
        assert_eq!(value["metadata"], json!({}));
        assert_eq!(value["exists"], false);
        // No updated_at key at all for an absent record
        assert!(value.get("updated_at").is_none());
    }

    #[test]
    fn test_get_response_shape_for_existing_record() {
        let mut metadata = Map::new();
        metadata.insert("discovered_at".to_string(), json!("T1"));

        let response = GetResponse {
            file_name: "doc1.pdf".to_string(),
            state: Some("PENDING_OCR".to_string()),
            metadata,
            updated_at: Some(Utc::now()),
            exists: true,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["state"], "PENDING_OCR");
        assert_eq!(value["metadata"]["discovered_at"], "T1");
        assert_eq!(value["exists"], true);
        assert!(value.get("updated_at").is_some());
    }

    #[test]
    fn test_error_response_envelope() {
        let err = StateError::invalid("file_name is required");
        let value = serde_json::to_value(ErrorResponse::new(&err)).unwrap();
        assert_eq!(value["error"]["code"], "INVALID_REQUEST");
        assert_eq!(value["error"]["message"], "file_name is required");
    }
}
