// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use libris_core::User;
use serde::{Deserialize, Serialize};

// =============================================================================
// Auth Responses
// =============================================================================

/// Response to a successful login or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Human-readable outcome.
    pub message: String,
    /// The authenticated account.
    pub user: User,
    /// Bearer token.
    pub token: String,
}

impl AuthResponse {
    /// Creates a new auth response.
    pub fn new(message: impl Into<String>, user: User, token: String) -> Self {
        Self {
            message: message.into(),
            user,
            token,
        }
    }
}

/// Single account response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// The account.
    pub user: User,
}

/// Account list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    /// All accounts.
    pub users: Vec<User>,
}

// =============================================================================
// Health Responses
// =============================================================================

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Readiness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether every component is ready.
    pub ready: bool,
    /// Per-component status.
    pub components: Vec<ComponentStatus>,
}

/// Status of one dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
