// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # libris-bin
//!
//! Command-line entry point for the Libris library service:
//!
//! - CLI argument parsing with clap
//! - Service runtime orchestration
//! - Graceful shutdown handling
//! - Logging initialization
//!
//! ## Usage
//!
//! ```bash
//! # Start the service (default command)
//! libris
//!
//! # Start with a custom config
//! libris -c /etc/libris/libris.yaml
//!
//! # Check a config file without starting
//! libris validate --show-config
//!
//! # Produce a password hash for seeding an account
//! libris hash-password --stdin
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{LibrisRuntime, RuntimeBuilder};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
