// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use chrono::{DateTime, Utc};
use libris_core::{Role, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an identity assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject: the account id.
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Issuer.
    pub iss: String,

    /// JWT ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// Account email at issuance; informational only.
    pub email: String,

    /// Account role.
    pub role: Role,
}

impl Claims {
    /// Creates claims issued at `issued_at` and valid for `ttl_secs`.
    ///
    /// An expiry past `i64::MAX` saturates; `JwtManager::issue_at` refuses
    /// such lifetimes before building claims.
    pub fn new(
        user_id: &UserId,
        email: impl Into<String>,
        role: Role,
        issuer: impl Into<String>,
        issued_at: i64,
        ttl_secs: i64,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            exp: issued_at.saturating_add(ttl_secs),
            iat: issued_at,
            iss: issuer.into(),
            jti: Some(Uuid::now_v7().to_string()),
            email: email.into(),
            role,
        }
    }

    /// Returns the account id.
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub.as_str())
    }

    /// Returns `true` if the claims are expired at `now`.
    ///
    /// A token is invalid from its expiry instant onward.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Returns the expiration time.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issued at time.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }
}
