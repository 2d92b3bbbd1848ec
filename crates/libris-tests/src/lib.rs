// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Libris Integration Tests
//!
//! Shared fixtures and an in-process application harness for the
//! integration suites under `tests/`.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p libris-tests
//! cargo test -p libris-tests --test integration_auth
//! cargo test -p libris-tests --test integration_gate
//! cargo test -p libris-tests --test integration_config
//! cargo test -p libris-tests --test integration_store
//! ```
//!
//! ## Test Categories
//!
//! - `integration_auth.rs`: login, registration, current account, account list
//! - `integration_gate.rs`: token round trip, tampering, public routes, role enforcement
//! - `integration_config.rs`: file formats, environment overrides, validation
//! - `integration_store.rs`: identity store and connection pool behaviour
//!
//! ## Using the Harness
//!
//! ```rust,ignore
//! use libris_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::with_demo_accounts().await;
//!     let token = app.login_token(ADMIN_EMAIL, ADMIN_PASSWORD).await;
//!     let response = app.get("/api/users", Some(&token)).await;
//!     response.assert_status(200);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::init_test_logging;
}
