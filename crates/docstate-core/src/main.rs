// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! docstate-core - Document Pipeline State Manager
//!
//! The state manager is responsible for:
//! - GET: look up the current processing state for a document
//! - UPDATE: persist a new state and merge metadata for a document
//!
//! Note: document discovery, stage execution (OCR, classification,
//! translation), and retry policy are owned by the workflow orchestrator.

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use docstate_core::config::Config;
use docstate_core::handlers::HandlerState;
use docstate_core::http;
use docstate_core::persistence::{PostgresStore, SqliteStore, StateStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docstate_core=info".parse().unwrap()),
        )
        .init();

    info!("Starting document state manager");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        http_addr = %config.http_addr,
        table = %config.state_table,
        "Configuration loaded"
    );

    // Connect to the configured backend and bootstrap the schema
    let store: Arc<dyn StateStore> = if config.database_url.starts_with("sqlite:") {
        info!("Connecting to SQLite database...");
        let store = SqliteStore::connect(&config.database_url, &config.state_table).await?;
        Arc::new(store)
    } else {
        info!("Connecting to PostgreSQL database...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        // Verify connection
        let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await?;
        info!(result = row.0, "Database health check passed");

        let store = PostgresStore::new(pool, &config.state_table);
        store.ensure_schema().await?;
        Arc::new(store)
    };

    info!("State store initialized");

    let state = Arc::new(HandlerState::new(store));

    // Start the HTTP server (orchestrator connects here for GET/UPDATE)
    let http_addr = config.http_addr;
    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = http::serve(http_addr, server_state).await {
            error!("HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    server_handle.abort();
    info!("Shutdown complete");

    Ok(())
}
