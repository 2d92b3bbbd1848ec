// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # libris-config
//!
//! Configuration management for the Libris library service.
//!
//! ## Features
//!
//! - **Schema**: server, auth, database pool and logging sections
//! - **Multi-Format Support**: YAML, TOML and JSON files
//! - **Placeholders**: `${VAR}` / `${VAR:default}` inside files
//! - **Environment Overrides**: `LIBRIS_*` variables win over file values
//! - **Validation**: production refuses to start without a signing secret
//!
//! ## Quick Start
//!
//! ```no_run
//! use libris_config::load_config;
//!
//! let config = load_config("libris.yaml").unwrap();
//! println!("Listening on {}:{}", config.server.host, config.server.port);
//! ```
//!
//! ## Environment Variables
//!
//! ```text
//! LIBRIS_ENV=production
//! LIBRIS_JWT_SECRET=...
//! LIBRIS_API_HOST=0.0.0.0
//! LIBRIS_API_PORT=8080
//! LIBRIS_LOG_LEVEL=debug
//! LIBRIS_DEMO_ACCOUNTS=true
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader};
pub use schema::{
    AuthConfig, DatabaseConfig, Environment, JwtSettings, LibrisConfig, LogFormat, LogLevel,
    LoggingConfig, ServerConfig, KNOWN_ROLES, MAX_JWT_EXPIRATION_SECS,
    RECOMMENDED_SECRET_LEN,
};
