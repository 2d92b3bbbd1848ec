// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context forwarded to handlers.

use std::net::IpAddr;

use libris_core::{Role, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Claims;

/// Header carrying the authenticated account id.
pub const X_USER_ID: &str = "x-user-id";
/// Header carrying the authenticated account email.
pub const X_USER_EMAIL: &str = "x-user-email";
/// Header carrying the authenticated account role.
pub const X_USER_ROLE: &str = "x-user-role";
/// Prefix of every forwarded identity header.
pub const X_USER_PREFIX: &str = "x-user-";

/// Identity of the caller, attached to request extensions by the gate.
///
/// Built from a validated token only; never re-checked against the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Account id.
    pub user_id: UserId,
    /// Account email at token issuance.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

impl AuthContext {
    /// Creates a context from validated claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id(),
            email: claims.email.clone(),
            role: claims.role,
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns `true` if the caller is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
