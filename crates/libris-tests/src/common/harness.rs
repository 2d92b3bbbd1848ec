// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Builds the real router around an in-memory identity store and drives it
//! with `tower::ServiceExt::oneshot`, so no sockets are opened.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use libris_api::{auth::demo_records, ApiConfig, ApiServerBuilder, AppState};
use libris_core::{IdentityStore, MemoryIdentityStore, UserRecord};
use serde_json::Value;
use tower::ServiceExt;

use super::fixtures::api_config;
use super::init_test_logging;

// =============================================================================
// TestApp
// =============================================================================

/// An in-process Libris application.
pub struct TestApp {
    /// Router under test.
    pub router: Router,
    /// Backing store, for seeding and fault injection.
    pub store: Arc<MemoryIdentityStore>,
    /// Shared state, for issuing tokens directly.
    pub state: AppState,
}

impl TestApp {
    /// Creates an app with an empty store and demo accounts disabled.
    pub async fn new() -> Self {
        Self::build(api_config(), Vec::new()).await
    }

    /// Creates an app with demo accounts enabled and seeded.
    pub async fn with_demo_accounts() -> Self {
        Self::build(api_config().with_demo_accounts(true), demo_records()).await
    }

    /// Creates an app from a configuration and initial records.
    pub async fn build(config: ApiConfig, records: Vec<UserRecord>) -> Self {
        init_test_logging();

        let store = Arc::new(MemoryIdentityStore::new());
        store.seed(records).await.expect("seeding should succeed");

        let server = ApiServerBuilder::new()
            .config(config)
            .store(store.clone() as Arc<dyn IdentityStore>)
            .build()
            .expect("server should build");

        Self {
            router: server.router(),
            state: server.state().clone(),
            store,
        }
    }

    /// Sends a request and collects the response.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        self.send(request).await
    }

    /// Sends a prebuilt request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// GET with an optional bearer token.
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, token, None).await
    }

    /// POST a JSON body without a token.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, None, Some(body)).await
    }

    /// POST /api/auth/login.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/auth/login",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Logs in and returns the token, panicking on failure.
    pub async fn login_token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        response.assert_status(200);
        response.body["token"]
            .as_str()
            .expect("token should be a string")
            .to_string()
    }
}

// =============================================================================
// TestResponse
// =============================================================================

/// A collected response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// JSON body, or `Null` when the body is not JSON.
    pub body: Value,
}

impl TestResponse {
    /// Asserts the status code.
    pub fn assert_status(&self, expected: u16) {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "unexpected status, body: {}",
            self.body
        );
    }

    /// Asserts an error response with the standard `{error, message}` shape.
    pub fn assert_error(&self, expected_status: u16, expected_message: &str) {
        self.assert_status(expected_status);
        assert_eq!(
            self.body["error"].as_str(),
            self.status.canonical_reason(),
            "error field should be the reason phrase"
        );
        assert_eq!(self.body["message"], expected_message);
    }

    /// Returns the `message` field.
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}
