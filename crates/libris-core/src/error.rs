// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy for identity storage and connection pooling.
//!
//! ```text
//! CoreError
//! ├── Pool*        - connection checkout failures
//! ├── Connection   - backend could not open or use a connection
//! └── DuplicateEmail
//! ```

use std::time::Duration;

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the identity store and the connection pool.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No connection became available within the acquire timeout.
    #[error("Timed out after {timeout:?} waiting for a pooled connection")]
    PoolTimeout {
        /// The configured acquire timeout.
        timeout: Duration,
    },

    /// The pool has been closed.
    #[error("Connection pool is closed")]
    PoolClosed,

    /// The backend failed to open or use a connection.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// An account with this email already exists.
    #[error("Email already registered: {email}")]
    DuplicateEmail {
        /// The conflicting (normalized) email.
        email: String,
    },
}

impl CoreError {
    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a duplicate email error.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    /// Returns `true` for infrastructure failures (as opposed to data conflicts).
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            CoreError::PoolTimeout { .. } | CoreError::PoolClosed | CoreError::Connection { .. }
        )
    }
}
