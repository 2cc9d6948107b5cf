// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP surface for the state-manager service.
//!
//! One state endpoint (`POST /state`) plus a health probe (`GET /health`).
//! TLS termination and request authentication are handled by the hosting
//! platform in front of this server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;

use crate::error::StateError;
use crate::handlers::{self, HandlerState};
use crate::protocol::{ErrorResponse, StateRequest};

/// Build the service router.
pub fn router(state: Arc<HandlerState>) -> Router {
    Router::new()
        .route("/state", post(state_endpoint))
        .route("/health", get(health_endpoint))
        .with_state(state)
}

/// Bind and serve the router until the task is cancelled.
pub async fn serve(addr: SocketAddr, state: Arc<HandlerState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "State manager listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Map a service error to its HTTP status code.
fn status_for(error: &StateError) -> StatusCode {
    match error {
        StateError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        StateError::StoreError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &StateError) -> Response {
    (status_for(error), Json(ErrorResponse::new(error))).into_response()
}

/// The state endpoint: decodes the JSON body and dispatches to the handlers.
///
/// The body is decoded manually so that malformed JSON produces the same
/// error envelope as handler-level validation failures.
async fn state_endpoint(State(state): State<Arc<HandlerState>>, body: Bytes) -> Response {
    let request: StateRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let error = StateError::invalid(format!("Malformed request body: {}", e));
            return error_response(&error);
        }
    };

    match handlers::handle_request(state.as_ref(), request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => error_response(&error),
    }
}

/// Health endpoint; unhealthy stores report 503 so load balancers can react.
async fn health_endpoint(State(state): State<Arc<HandlerState>>) -> Response {
    let health = handlers::handle_health_check(state.as_ref()).await;
    let status = if health.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health)).into_response()
}
