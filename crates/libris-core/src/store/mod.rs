// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity storage.
//!
//! The auth layer only talks to accounts through [`IdentityStore`]. Lookups
//! by email return the stored credential; every other read returns the
//! public [`User`] view.

mod memory;

pub use memory::{MemoryBackend, MemoryConnection, MemoryIdentityStore};

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::identity::{NewUser, User, UserId, UserRecord};

/// Account storage used by the authentication endpoints.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Finds an account and its credential by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserRecord>>;

    /// Finds an account by id.
    async fn find_by_id(&self, user_id: &UserId) -> CoreResult<Option<User>>;

    /// Creates an approved, active account.
    ///
    /// Fails with [`CoreError::DuplicateEmail`](crate::CoreError::DuplicateEmail)
    /// if the email is taken.
    async fn create(&self, new_user: NewUser) -> CoreResult<User>;

    /// Lists all accounts, newest first.
    async fn list(&self) -> CoreResult<Vec<User>>;

    /// Returns `true` if the store can serve requests.
    async fn health_check(&self) -> bool;
}
