// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Docstate Core - Document Pipeline State Manager
//!
//! This crate provides the state-manager service for the document processing
//! pipeline. It exposes two operations over HTTP (read current state, write
//! new state plus metadata) against a durable key-value table keyed by
//! document file name.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Workflow Orchestrator                    │
//! │     (drives documents through the pipeline stages)       │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            │ HTTPS/JSON (POST /state)
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                    docstate-core                         │
//! │              (This Crate, stateless)                     │
//! │            GET / UPDATE request handlers                 │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                    State Store                           │
//! │      (PostgreSQL or SQLite, one row per document)        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Operations
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `GET` | Look up the current state and metadata for a document |
//! | `UPDATE` | Merge metadata, set a new state, refresh `updated_at` |
//!
//! Both operations are keyed by `file_name`, the stable document identifier.
//! The service holds no in-memory state between requests and can be
//! replicated horizontally; concurrent updates to the same document race at
//! read-merge-write granularity and the last writer wins.
//!
//! # Pipeline Stages
//!
//! The stage ordering below is informational only. The service persists
//! whatever state the caller asserts and does not gate transitions, so any
//! stage can loop back to re-processing after a partial failure.
//!
//! ```text
//! ┌──────┐    ┌─────────────┐    ┌────────────────────────┐
//! │ NULL │───▶│ PENDING_OCR │───▶│ PENDING_CLASSIFICATION │
//! └──────┘    └─────────────┘    └───────────┬────────────┘
//!                                            │
//!                                            ▼
//!             ┌───────────┐    ┌─────────────────────┐
//!             │ COMPLETED │◀───│ PENDING_TRANSLATION │
//!             └───────────┘    └─────────────────────┘
//! ```
//!
//! `NULL` is represented by the absence of a record; a record is created on
//! the first successful UPDATE and never deleted by this service.
//!
//! # Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `DOCSTATE_DATABASE_URL` | Yes | - | PostgreSQL or SQLite connection string |
//! | `DOCSTATE_STATE_TABLE` | No | `document_states` | Name of the backing table |
//! | `DOCSTATE_HTTP_PORT` | No | `8080` | HTTP server port |
//!
//! # Modules
//!
//! - [`config`]: Server configuration from environment variables
//! - [`error`]: Error types with error-code mapping
//! - [`protocol`]: Wire request/response types
//! - [`handlers`]: GET/UPDATE request handlers
//! - [`persistence`]: State store interface and backends
//! - [`http`]: HTTP router and server loop

#![deny(missing_docs)]

/// Server configuration loaded from environment variables.
pub mod config;

/// Error types for state-manager operations with error-code mapping.
pub mod error;

/// Request handlers (GET, UPDATE, health).
pub mod handlers;

/// HTTP router and server loop.
pub mod http;

/// State store interface and PostgreSQL/SQLite/in-memory backends.
pub mod persistence;

/// Wire request/response types for the state endpoint.
pub mod protocol;
