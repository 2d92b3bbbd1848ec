// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # libris-api
//!
//! HTTP surface of the Libris library service.
//!
//! This crate provides password verification, JWT issuance, the request
//! gate that authenticates and authorizes every route, and the auth,
//! account and health handlers behind it.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{AuthContext, AuthGate, Claims, CredentialVerifier, JwtConfig, JwtManager, RoutePolicy};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
