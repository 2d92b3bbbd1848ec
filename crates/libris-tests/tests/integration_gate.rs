// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Gate Integration Tests
//!
//! - `test_token_*`: issuance, validation, expiry and tampering
//! - `test_gate_*`: public routes, role enforcement, identity forwarding

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request},
};
use chrono::Utc;
use libris_api::{
    auth::{GateDecision, Rejection, RouteRule},
    AuthGate, JwtConfig, JwtManager, RoutePolicy,
};
use libris_config::AuthConfig;
use libris_core::{Role, UserId};
use libris_tests::prelude::*;

fn manager() -> JwtManager {
    JwtManager::new(JwtConfig::new(TEST_SECRET)).unwrap()
}

fn default_gate() -> AuthGate {
    AuthGate::new(
        Arc::new(manager()),
        Arc::new(RoutePolicy::from_config(&AuthConfig::default())),
    )
}

// =============================================================================
// Tokens
// =============================================================================

#[test]
fn test_token_round_trip_for_every_role() {
    let jwt = manager();
    let now = Utc::now().timestamp();

    for role in Role::ALL {
        let id = UserId::new(format!("user-{role}"));
        let token = jwt.issue_at(&id, "someone@usant.edu", role, now).unwrap();

        for at in [now, now + 1, now + jwt.expiration_secs() - 1] {
            let claims = jwt.validate_at(&token, at).expect("valid before expiry");
            assert_eq!(claims.user_id(), id);
            assert_eq!(claims.email, "someone@usant.edu");
            assert_eq!(claims.role, role);
            assert_eq!(claims.iss, "libris");
        }

        assert!(jwt.validate_at(&token, now + jwt.expiration_secs()).is_none());
        assert!(jwt.validate_at(&token, now + jwt.expiration_secs() + 60).is_none());
    }
}

#[test]
fn test_token_lifetime_is_seven_days() {
    let jwt = manager();
    assert_eq!(jwt.expiration_secs(), 7 * 24 * 60 * 60);

    let token = jwt
        .issue_at(&UserId::new("u"), "u@usant.edu", Role::Student, 1_000)
        .unwrap();
    let claims = jwt.validate_at(&token, 1_000).unwrap();
    assert_eq!(claims.exp - claims.iat, 604_800);
}

#[test]
fn test_token_tampering_any_byte() {
    let jwt = manager();
    let now = Utc::now().timestamp();
    let token = jwt
        .issue_at(&UserId::new("u-1"), "admin@usant.edu", Role::Admin, now)
        .unwrap();

    let bytes = token.as_bytes();
    for i in 0..bytes.len() {
        let mut tampered = bytes.to_vec();
        tampered[i] = if tampered[i] == b'A' { b'B' } else { b'A' };
        let Ok(tampered) = String::from_utf8(tampered) else {
            continue;
        };
        if tampered == token {
            continue;
        }
        assert!(
            jwt.validate_at(&tampered, now).is_none(),
            "tampered byte {i} still validated"
        );
    }
}

#[test]
fn test_token_from_other_secret_rejected() {
    let other = JwtManager::new(JwtConfig::new("another-secret-that-is-long-enough-too")).unwrap();
    let token = other
        .issue(&UserId::new("u"), "u@usant.edu", Role::Admin)
        .unwrap();
    assert!(manager().validate(&token).is_none());
}

// =============================================================================
// Gate
// =============================================================================

#[test]
fn test_gate_public_routes_ignore_headers() {
    let gate = default_gate();
    let now = Utc::now().timestamp();
    let token = manager()
        .issue_at(&UserId::new("u"), "u@usant.edu", Role::Student, now)
        .unwrap();
    let valid = format!("Bearer {token}");
    let headers = [
        None,
        Some(""),
        Some("Bearer"),
        Some("Bearer forged.token.value"),
        Some("Basic YWRtaW46YWRtaW4="),
        Some(valid.as_str()),
    ];

    for path in [
        "/health",
        "/ready",
        "/api/auth/login",
        "/api/auth/register",
        "/api/auth/forgot-password",
    ] {
        for header in headers {
            assert_eq!(gate.evaluate(path, header, now), GateDecision::Public);
        }
    }
}

#[test]
fn test_gate_role_enforcement() {
    let gate = default_gate();
    let jwt = manager();
    let now = Utc::now().timestamp();

    for role in [Role::Student, Role::Faculty, Role::Staff] {
        let token = jwt
            .issue_at(&UserId::new("u"), "u@usant.edu", role, now)
            .unwrap();
        let header = format!("Bearer {token}");

        for path in ["/api/admin", "/api/users", "/api/account-requests/3"] {
            assert_eq!(
                gate.evaluate(path, Some(&header), now),
                GateDecision::Rejected(Rejection::Forbidden("Admin access required"))
            );
        }
        for path in ["/api/auth/me", "/api/books", "/api/administrators"] {
            assert!(matches!(
                gate.evaluate(path, Some(&header), now),
                GateDecision::Authenticated(ref claims) if claims.role == role
            ));
        }
    }
}

#[test]
fn test_gate_custom_rule_message() {
    let policy = RoutePolicy::from_config(&AuthConfig::default())
        .restrict(RouteRule::new("/api/borrows", [Role::Staff, Role::Admin]));
    let gate = AuthGate::new(Arc::new(manager()), Arc::new(policy));
    let now = Utc::now().timestamp();
    let token = manager()
        .issue_at(&UserId::new("u"), "u@usant.edu", Role::Student, now)
        .unwrap();

    assert_eq!(
        gate.evaluate("/api/borrows/9", Some(&format!("Bearer {token}")), now),
        GateDecision::Rejected(Rejection::Forbidden("Insufficient role"))
    );
}

#[tokio::test]
async fn test_gate_scenarios_over_http() {
    let app = TestApp::with_demo_accounts().await;

    // Public login with no Authorization header is processed normally.
    app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.assert_status(200);

    // Student token on an admin route.
    let student = app.login_token(STUDENT_EMAIL, STUDENT_PASSWORD).await;
    app.get("/api/users", Some(&student))
        .await
        .assert_error(403, "Admin access required");
    app.get("/api/admin/anything", Some(&student))
        .await
        .assert_error(403, "Admin access required");

    // Same token on a non-restricted protected route.
    app.get("/api/auth/me", Some(&student)).await.assert_status(200);

    // Unknown routes are gated before they 404.
    app.get("/api/books", None)
        .await
        .assert_error(401, "No token provided");
    app.get("/api/books", Some(&student))
        .await
        .assert_error(404, "Route not found");
}

#[tokio::test]
async fn test_gate_expired_token_over_http() {
    let app = TestApp::with_demo_accounts().await;
    let long_ago = Utc::now().timestamp() - app.state.jwt().expiration_secs() - 1;
    let token = app
        .state
        .jwt()
        .issue_at(&UserId::new("u"), ADMIN_EMAIL, Role::Admin, long_ago)
        .unwrap();

    app.get("/api/users", Some(&token))
        .await
        .assert_error(401, "Invalid or expired token");
}

#[tokio::test]
async fn test_gate_forged_identity_headers_ignored() {
    let app = TestApp::with_demo_accounts().await;
    let student = app.login_token(STUDENT_EMAIL, STUDENT_PASSWORD).await;

    let request = Request::get("/api/users")
        .header(header::AUTHORIZATION, format!("Bearer {student}"))
        .header("x-user-role", "admin")
        .header("x-user-id", "someone-else")
        .body(Body::empty())
        .unwrap();
    app.send(request)
        .await
        .assert_error(403, "Admin access required");

    let request = Request::get("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {student}"))
        .header("x-user-id", "someone-else")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    response.assert_status(200);
    assert_eq!(response.body["user"]["email"], STUDENT_EMAIL);
}

#[tokio::test]
async fn test_gate_bearer_scheme_variants() {
    let app = TestApp::with_demo_accounts().await;
    let token = app.login_token(FACULTY_EMAIL, FACULTY_PASSWORD).await;

    for value in [format!("bearer {token}"), format!("BEARER   {token}")] {
        let request = Request::get("/api/auth/me")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        app.send(request).await.assert_status(200);
    }

    let request = Request::get("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Token {token}"))
        .body(Body::empty())
        .unwrap();
    app.send(request)
        .await
        .assert_error(401, "No token provided");
}
