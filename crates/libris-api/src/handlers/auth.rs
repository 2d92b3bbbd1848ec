// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use libris_core::{CoreError, NewUser, Role, StoredCredential, UserProfile};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, ValidatedJson};
use crate::response::{AuthResponse, UserResponse};
use crate::state::AppState;

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Returns `true` if `email` has the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    (*EMAIL_PATTERN)
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Passwords are taken verbatim; only the empty string counts as missing.
fn present_password(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Account email.
    pub email: Option<String>,
    /// Password.
    pub password: Option<String>,
}

/// POST /api/auth/login
///
/// Verifies the password before looking at account state, so a caller
/// without the password learns nothing about whether an account is
/// deactivated or pending.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(email), Some(password)) =
        (present(&request.email), present_password(&request.password))
    else {
        return Err(ApiError::bad_request("Email and password are required"));
    };
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    let record = state
        .store()
        .find_by_email(email)
        .await
        .map_err(|e| ApiError::store("Failed to login", e))?;

    // Unknown accounts still run a hash check so both failures cost the same.
    let credential = record.as_ref().and_then(|r| r.credential.as_ref());
    let verified = state.verifier().verify(password, credential);
    let Some(record) = record else {
        tracing::info!("Login failed: unknown account");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };
    if !verified {
        tracing::info!(user_id = %record.user.user_id, "Login failed: bad credentials");
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let user = record.user;
    if !user.is_active {
        return Err(ApiError::forbidden("Account is deactivated"));
    }
    if !user.can_log_in() {
        return Err(ApiError::forbidden(format!(
            "Account is {}. Please wait for admin approval.",
            user.approval_status
        )));
    }

    let token = state.jwt().issue(&user.user_id, &user.email, user.role())?;
    tracing::info!(user_id = %user.user_id, role = %user.role(), "User logged in");

    Ok(Json(AuthResponse::new("Login successful", user, token)))
}

// =============================================================================
// Register
// =============================================================================

/// Registration request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub username: Option<String>,
    /// Account email.
    pub email: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Requested role.
    pub role: Option<String>,
    /// Free-form account type.
    pub user_type: Option<String>,
    /// Degree programme (students).
    pub course: Option<String>,
    /// Academic department (faculty).
    pub department: Option<String>,
    /// Year level (students).
    pub year_level: Option<String>,
}

impl RegisterRequest {
    fn profile(&self, role: Role) -> UserProfile {
        let user_type = self.user_type.clone();
        match role {
            Role::Student => UserProfile::Student {
                user_type,
                course: self.course.clone(),
                year_level: self.year_level.clone(),
            },
            Role::Faculty => UserProfile::Faculty {
                user_type,
                department: self.department.clone(),
            },
            Role::Staff => UserProfile::Staff { user_type },
            Role::Admin => UserProfile::Admin { user_type },
        }
    }
}

/// POST /api/auth/register
///
/// Creates an approved, active account and signs the caller in.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(username), Some(email), Some(password), Some(role)) = (
        present(&request.username),
        present(&request.email),
        present_password(&request.password),
        present(&request.role),
    ) else {
        return Err(ApiError::bad_request(
            "Username, email, password, and role are required",
        ));
    };
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }
    let Some(role) = Role::parse(role.trim()) else {
        return Err(ApiError::bad_request("Invalid role"));
    };
    if !state.config.can_self_register(role) {
        tracing::warn!(role = %role, "Rejected self-registration for restricted role");
        return Err(ApiError::forbidden("Role cannot be self-registered"));
    }

    let existing = state
        .store()
        .find_by_email(email)
        .await
        .map_err(|e| ApiError::store("Failed to register user", e))?;
    if existing.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let phc = state.verifier().hash(password)?;
    let new_user = NewUser {
        username: username.trim().to_string(),
        email: email.to_string(),
        profile: request.profile(role),
        credential: StoredCredential::Hashed(phc),
    };

    let user = match state.store().create(new_user).await {
        Ok(user) => user,
        Err(CoreError::DuplicateEmail { .. }) => {
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => return Err(ApiError::store("Failed to register user", e)),
    };

    let token = state.jwt().issue(&user.user_id, &user.email, user.role())?;
    tracing::info!(user_id = %user.user_id, role = %role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("Registration successful", user, token)),
    ))
}

// =============================================================================
// Current User
// =============================================================================

/// GET /api/auth/me
///
/// Returns the caller's account as currently stored.
pub async fn current_user(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .store()
        .find_by_id(&ctx.user_id)
        .await
        .map_err(|e| ApiError::store("Failed to get user", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse { user }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("john@usant.edu"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(!is_valid_email("john"));
        assert!(!is_valid_email("john@usant"));
        assert!(!is_valid_email("jo hn@usant.edu"));
        assert!(!is_valid_email("@usant.edu"));
    }

    #[test]
    fn test_password_taken_verbatim() {
        assert_eq!(present_password(&Some("   ".into())), Some("   "));
        assert_eq!(present_password(&Some(" pass ".into())), Some(" pass "));
        assert_eq!(present_password(&Some(String::new())), None);
        assert_eq!(present_password(&None), None);
        assert_eq!(present(&Some("   ".into())), None);
    }

    #[test]
    fn test_register_profile_by_role() {
        let request = RegisterRequest {
            user_type: Some("Professor".into()),
            department: Some("CCS".into()),
            course: Some("ignored".into()),
            ..Default::default()
        };
        assert_eq!(
            request.profile(Role::Faculty),
            UserProfile::Faculty {
                user_type: Some("Professor".into()),
                department: Some("CCS".into()),
            }
        );
        assert_eq!(request.profile(Role::Staff).role(), Role::Staff);
    }

    #[test]
    fn test_register_request_field_names() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"username":"a","email":"a@b.co","password":"p","role":"student",
                "userType":"Undergraduate","yearLevel":"2nd Year"}"#,
        )
        .unwrap();
        assert_eq!(request.user_type.as_deref(), Some("Undergraduate"));
        assert_eq!(request.year_level.as_deref(), Some("2nd Year"));
    }
}
