// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: Liveness and readiness
//! - [`auth`]: Login, registration and the current account
//! - [`users`]: Account administration

mod auth;
mod health;
mod users;

pub use auth::*;
pub use health::*;
pub use users::*;
