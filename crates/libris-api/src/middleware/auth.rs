// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request gate middleware.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{
    AuthContext, AuthGate, GateDecision, Rejection, X_USER_EMAIL, X_USER_ID, X_USER_PREFIX,
    X_USER_ROLE,
};

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer that runs the [`AuthGate`] in front of every route.
#[derive(Clone)]
pub struct AuthLayer {
    gate: Arc<AuthGate>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(gate: Arc<AuthGate>) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            gate: self.gate.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware enforcing the gate decision.
///
/// Client-supplied `x-user-*` headers are always removed; on success the
/// caller's [`AuthContext`] is inserted into extensions and mirrored into
/// `x-user-id`, `x-user-email` and `x-user-role`.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    gate: Arc<AuthGate>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        strip_identity_headers(req.headers_mut());

        let path = req.uri().path().to_string();
        let decision = {
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok());
            self.gate
                .evaluate(&path, authorization, Utc::now().timestamp())
        };

        // Drive the clone that was polled ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match decision {
                GateDecision::Public => inner.call(req).await,
                GateDecision::Authenticated(claims) => {
                    let mut ctx =
                        AuthContext::from_claims(&claims).with_request_id(Uuid::now_v7());
                    if let Some(ConnectInfo(addr)) =
                        req.extensions().get::<ConnectInfo<SocketAddr>>()
                    {
                        ctx = ctx.with_client_ip(addr.ip());
                    }

                    insert_identity_headers(req.headers_mut(), &ctx);
                    tracing::debug!(
                        user_id = %ctx.user_id,
                        role = %ctx.role,
                        request_id = %ctx.request_id,
                        path = %path,
                        "Request authenticated"
                    );
                    req.extensions_mut().insert(ctx);
                    inner.call(req).await
                }
                GateDecision::Rejected(rejection) => {
                    match rejection {
                        Rejection::MissingToken => {
                            tracing::debug!(path = %path, "No token provided")
                        }
                        Rejection::InvalidToken => {
                            tracing::info!(path = %path, "Rejected invalid or expired token")
                        }
                        Rejection::Forbidden(reason) => {
                            tracing::warn!(path = %path, reason, "Access denied")
                        }
                    }
                    Ok(rejection.into_error().into_response())
                }
            }
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Removes every `x-user-*` header so clients cannot forge identity.
fn strip_identity_headers(headers: &mut HeaderMap) {
    let forged: Vec<HeaderName> = headers
        .keys()
        .filter(|name| name.as_str().starts_with(X_USER_PREFIX))
        .cloned()
        .collect();
    for name in forged {
        headers.remove(&name);
    }
}

fn insert_identity_headers(headers: &mut HeaderMap, ctx: &AuthContext) {
    let values = [
        (X_USER_ID, ctx.user_id.as_str()),
        (X_USER_EMAIL, ctx.email.as_str()),
        (X_USER_ROLE, ctx.role.as_str()),
    ];
    for (name, value) in values {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(name), value);
            }
            Err(_) => tracing::warn!(header = name, "Identity value is not a valid header"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, JwtManager, RoutePolicy};
    use axum::http::StatusCode;
    use libris_config::AuthConfig;
    use libris_core::{Role, UserId};
    use tower::ServiceExt;

    fn jwt() -> Arc<JwtManager> {
        Arc::new(JwtManager::new(JwtConfig::new("middleware-test-secret-long-enough")).unwrap())
    }

    /// Runs `req` through the gate in front of a handler that echoes the
    /// forwarded identity back as the body.
    async fn call(jwt: Arc<JwtManager>, req: Request<Body>) -> Response {
        let gate = AuthGate::new(jwt, Arc::new(RoutePolicy::from_config(&AuthConfig::default())));
        let svc = AuthLayer::new(Arc::new(gate)).layer(tower::service_fn(
            |req: Request<Body>| async move {
                let has_ctx = req.extensions().get::<AuthContext>().is_some();
                let header = |name: &str| {
                    req.headers()
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-")
                        .to_string()
                };
                let body = format!("{has_ctx}|{}|{}", header(X_USER_ID), header(X_USER_ROLE));
                Ok::<_, std::convert::Infallible>(Response::new(Body::from(body)))
            },
        ));
        svc.oneshot(req).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_forged_headers_stripped_on_public_route() {
        let req = Request::builder()
            .uri("/api/auth/login")
            .header(X_USER_ID, "forged")
            .header(X_USER_ROLE, "admin")
            .body(Body::empty())
            .unwrap();

        let response = call(jwt(), req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "false|-|-");
    }

    #[tokio::test]
    async fn test_authenticated_request_forwards_identity() {
        let jwt = jwt();
        let token = jwt
            .issue(&UserId::new("u-42"), "john@usant.edu", Role::Student)
            .unwrap();
        let req = Request::builder()
            .uri("/api/auth/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(X_USER_ROLE, "admin")
            .body(Body::empty())
            .unwrap();

        let response = call(jwt, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "true|u-42|student");
    }

    #[tokio::test]
    async fn test_rejections() {
        let jwt = jwt();
        let token = jwt
            .issue(&UserId::new("u-1"), "john@usant.edu", Role::Student)
            .unwrap();

        let req = Request::builder()
            .uri("/api/auth/me")
            .body(Body::empty())
            .unwrap();
        let response = call(jwt.clone(), req).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let req = Request::builder()
            .uri("/api/users")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = call(jwt, req).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_strip_identity_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("a"));
        headers.insert("x-user-anything", HeaderValue::from_static("b"));
        headers.insert("x-request-id", HeaderValue::from_static("c"));

        strip_identity_headers(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("x-request-id"));
    }
}
