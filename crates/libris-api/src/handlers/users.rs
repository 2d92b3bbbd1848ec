// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account administration handlers.

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Auth;
use crate::response::UsersResponse;
use crate::state::AppState;

/// GET /api/users
///
/// Lists every account. Admin-only through the route policy.
pub async fn list_users(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<impl IntoResponse> {
    let users = state
        .store()
        .list()
        .await
        .map_err(|e| ApiError::store("Failed to list users", e))?;

    tracing::debug!(user_id = %ctx.user_id, count = users.len(), "Listed users");
    Ok(Json(UsersResponse { users }))
}
