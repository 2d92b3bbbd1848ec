// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # libris-core
//!
//! Core abstractions shared by the Libris library service.
//!
//! - **Identity**: accounts, roles and the per-role profile union
//! - **Store**: the [`IdentityStore`] trait and an in-memory implementation
//! - **Pool**: scoped connection checkout with a hold-time watchdog
//! - **Error**: the store/pool error hierarchy

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod identity;
pub mod pool;
pub mod store;

pub use error::{CoreError, CoreResult};
pub use identity::{
    normalize_email, ApprovalStatus, NewUser, Role, StoredCredential, User, UserId, UserProfile,
    UserRecord,
};
pub use pool::{ConnectionPool, ManageConnection, PoolConfig, PoolStatus, PooledConnection};
pub use store::{IdentityStore, MemoryIdentityStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
