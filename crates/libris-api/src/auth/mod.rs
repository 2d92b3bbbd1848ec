// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - Password hashing and verification, plus the gated demo fixtures
//! - JWT issuance and validation
//! - The route policy and the request gate built on it
//! - The authentication context handed to handlers

mod claims;
mod context;
pub mod credential;
mod gate;
mod jwt;
mod policy;

pub use claims::Claims;
pub use context::{AuthContext, X_USER_EMAIL, X_USER_ID, X_USER_PREFIX, X_USER_ROLE};
pub use credential::{demo_records, CredentialVerifier, DemoAccount, DEMO_ACCOUNTS};
pub use gate::{parse_bearer, AuthGate, GateDecision, Rejection};
pub use jwt::{JwtConfig, JwtManager};
pub use policy::{RoutePolicy, RouteRule};
