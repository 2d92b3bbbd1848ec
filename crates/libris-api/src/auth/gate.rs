// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request authentication and authorization decision.
//!
//! ```text
//! UNCHECKED ── public path ─────────────────────────────► PUBLIC_ALLOWED
//!     │
//!     └─ AUTH_REQUIRED ── no bearer ──────────────────────► 401 No token provided
//!             │
//!             ├─ token invalid/expired ───────────────────► 401 Invalid or expired token
//!             │
//!             └─ AUTHENTICATED ── role not permitted ─────► 403
//!                     │
//!                     └─ ROLE_CHECKED ────────────────────► FORWARDED
//! ```
//!
//! [`AuthGate::evaluate`] depends only on its arguments and the read-only
//! signing key and policy, so concurrent requests never interact.

use std::sync::Arc;

use super::{Claims, JwtManager, RoutePolicy};
use crate::error::ApiError;

/// Outcome of gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Public route; forwarded without inspecting credentials.
    Public,
    /// Token validated and role permitted.
    Authenticated(Claims),
    /// Request rejected.
    Rejected(Rejection),
}

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No bearer token on a protected route.
    MissingToken,
    /// Token failed validation for any reason.
    InvalidToken,
    /// Valid identity, role not allowed for the route.
    Forbidden(&'static str),
}

impl Rejection {
    /// Converts the rejection into its HTTP error.
    pub fn into_error(self) -> ApiError {
        match self {
            Rejection::MissingToken => ApiError::unauthorized("No token provided"),
            Rejection::InvalidToken => ApiError::unauthorized("Invalid or expired token"),
            Rejection::Forbidden(message) => ApiError::forbidden(message),
        }
    }
}

/// The request gate.
#[derive(Debug, Clone)]
pub struct AuthGate {
    jwt: Arc<JwtManager>,
    policy: Arc<RoutePolicy>,
}

impl AuthGate {
    /// Creates a gate.
    pub fn new(jwt: Arc<JwtManager>, policy: Arc<RoutePolicy>) -> Self {
        Self { jwt, policy }
    }

    /// Returns the route policy.
    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Decides what happens to a request for `path` carrying the given
    /// `Authorization` header value, at time `now` (Unix seconds).
    pub fn evaluate(&self, path: &str, authorization: Option<&str>, now: i64) -> GateDecision {
        if self.policy.is_public(path) {
            return GateDecision::Public;
        }

        let Some(token) = authorization.and_then(parse_bearer) else {
            return GateDecision::Rejected(Rejection::MissingToken);
        };

        let Some(claims) = self.jwt.validate_at(token, now) else {
            return GateDecision::Rejected(Rejection::InvalidToken);
        };

        if let Some(rule) = self.policy.rule_for(path) {
            if !rule.permits(claims.role) {
                return GateDecision::Rejected(Rejection::Forbidden(rule.denial_message()));
            }
        }

        GateDecision::Authenticated(claims)
    }
}

/// Extracts the token from a `Bearer <token>` header value.
///
/// The scheme is case-insensitive; an empty token counts as absent.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, RouteRule};
    use libris_config::AuthConfig;
    use libris_core::{Role, UserId};

    const NOW: i64 = 1_700_000_000;

    fn gate() -> AuthGate {
        let jwt = JwtManager::new(JwtConfig::new("gate-test-secret-that-is-long-enough")).unwrap();
        let policy = RoutePolicy::from_config(&AuthConfig::default());
        AuthGate::new(Arc::new(jwt), Arc::new(policy))
    }

    fn bearer(gate: &AuthGate, role: Role) -> String {
        let token = gate
            .jwt
            .issue_at(&UserId::new("u-1"), "user@usant.edu", role, NOW)
            .unwrap();
        format!("Bearer {token}")
    }

    #[test]
    fn test_public_route_ignores_header() {
        let gate = gate();
        let valid = bearer(&gate, Role::Student);
        for header in [None, Some("garbage"), Some("Bearer nope"), Some(valid.as_str())] {
            assert_eq!(
                gate.evaluate("/api/auth/login", header, NOW),
                GateDecision::Public
            );
        }
    }

    #[test]
    fn test_missing_or_malformed_header() {
        let gate = gate();
        for header in [None, Some(""), Some("Basic abc"), Some("Bearer "), Some("token")] {
            assert_eq!(
                gate.evaluate("/api/auth/me", header, NOW),
                GateDecision::Rejected(Rejection::MissingToken)
            );
        }
    }

    #[test]
    fn test_invalid_and_expired_token() {
        let gate = gate();
        assert_eq!(
            gate.evaluate("/api/auth/me", Some("Bearer not-a-jwt"), NOW),
            GateDecision::Rejected(Rejection::InvalidToken)
        );

        let header = bearer(&gate, Role::Admin);
        let expired_at = NOW + gate.jwt.expiration_secs();
        assert_eq!(
            gate.evaluate("/api/auth/me", Some(&header), expired_at),
            GateDecision::Rejected(Rejection::InvalidToken)
        );
    }

    #[test]
    fn test_role_enforcement() {
        let gate = gate();
        let student = bearer(&gate, Role::Student);
        let admin = bearer(&gate, Role::Admin);

        assert_eq!(
            gate.evaluate("/api/admin/reports", Some(&student), NOW),
            GateDecision::Rejected(Rejection::Forbidden("Admin access required"))
        );
        assert!(matches!(
            gate.evaluate("/api/auth/me", Some(&student), NOW),
            GateDecision::Authenticated(ref c) if c.role == Role::Student
        ));
        assert!(matches!(
            gate.evaluate("/api/admin/reports", Some(&admin), NOW),
            GateDecision::Authenticated(_)
        ));
    }

    #[test]
    fn test_non_admin_rule_message() {
        let jwt = JwtManager::new(JwtConfig::new("gate-test-secret-that-is-long-enough")).unwrap();
        let policy =
            RoutePolicy::new().restrict(RouteRule::new("/api/circulation", [Role::Staff, Role::Admin]));
        let gate = AuthGate::new(Arc::new(jwt), Arc::new(policy));
        let header = bearer(&gate, Role::Faculty);

        assert_eq!(
            gate.evaluate("/api/circulation/loans", Some(&header), NOW),
            GateDecision::Rejected(Rejection::Forbidden("Insufficient role"))
        );
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer("bearer abc"), Some("abc"));
        assert_eq!(parse_bearer("Basic abc"), None);
        assert_eq!(parse_bearer("Bearer"), None);
        assert_eq!(parse_bearer("Bearer   "), None);
    }
}
