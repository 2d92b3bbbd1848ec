// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::error::ApiError;
use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Liveness check. Returns 200 OK if the process is serving requests.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

// =============================================================================
// Readiness Check
// =============================================================================

/// GET /ready
///
/// Readiness check against the identity store.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.store().health_check().await;
    let components = vec![ComponentStatus {
        name: "identity_store".to_string(),
        healthy: store_healthy,
        message: (!store_healthy).then(|| "Identity store unavailable".to_string()),
    }];

    let response = ReadinessResponse {
        ready: store_healthy,
        components,
    };

    if store_healthy {
        (StatusCode::OK, Json(response))
    } else {
        tracing::warn!("Readiness check failed: identity store unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

// =============================================================================
// Fallback
// =============================================================================

/// Fallback for unrouted paths; only reached once the gate has let the
/// request through.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
