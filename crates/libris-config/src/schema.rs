// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema for Libris.
//!
//! Every section has serde defaults, so an empty file (or no file at all)
//! yields a runnable development configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default API port.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default token lifetime in seconds (7 days).
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Longest token lifetime accepted (1 year).
pub const MAX_JWT_EXPIRATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Default token issuer.
pub const DEFAULT_JWT_ISSUER: &str = "libris";

/// Default maximum number of pooled store connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 20;

/// Shortest signing secret accepted without a warning.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Role names known to the service.
pub const KNOWN_ROLES: [&str; 4] = ["student", "faculty", "staff", "admin"];

// =============================================================================
// LibrisConfig
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibrisConfig {
    /// Deployment environment.
    pub environment: Environment,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Authentication settings.
    pub auth: AuthConfig,
    /// Identity store connection pool settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl LibrisConfig {
    /// Validates the whole configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.auth.validate(self.environment)?;
        self.database.validate()?;
        Ok(())
    }
}

// =============================================================================
// Environment
// =============================================================================

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development.
    #[default]
    Development,
    /// Production deployment.
    Production,
}

impl Environment {
    /// Parses an environment name (`dev`/`development`, `prod`/`production`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Some(Environment::Development),
            "prod" | "production" => Some(Environment::Production),
            _ => None,
        }
    }

    /// Returns `true` for production.
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Returns the environment name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ServerConfig
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Validates the server section.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::missing_field("server.host"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Returns `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_API_PORT,
            request_timeout_secs: 30,
            cors_origins: Vec::new(),
        }
    }
}

// =============================================================================
// AuthConfig
// =============================================================================

/// Authentication and route policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Token settings.
    pub jwt: JwtSettings,
    /// Seed and honour the built-in demo accounts. Never allowed in production.
    pub demo_accounts: bool,
    /// Paths served without a token.
    pub public_paths: Vec<String>,
    /// Path prefixes reserved for administrators.
    pub admin_paths: Vec<String>,
    /// Roles an anonymous caller may register as.
    pub self_registration_roles: Vec<String>,
}

impl AuthConfig {
    /// Validates the auth section for the given environment.
    pub fn validate(&self, environment: Environment) -> ConfigResult<()> {
        self.jwt.validate(environment)?;

        if environment.is_production() && self.demo_accounts {
            return Err(ConfigError::validation(
                "auth.demo_accounts",
                "demo accounts cannot be enabled in production",
            ));
        }

        for path in self.public_paths.iter().chain(&self.admin_paths) {
            if !path.starts_with('/') {
                return Err(ConfigError::validation(
                    "auth",
                    format!("route '{path}' must start with '/'"),
                ));
            }
        }

        // "/" would prefix-match every route.
        if self.public_paths.iter().any(|path| path.trim_end_matches('/').is_empty()) {
            return Err(ConfigError::validation(
                "auth.public_paths",
                "the root path cannot be public",
            ));
        }

        for role in &self.self_registration_roles {
            let role = role.trim().to_lowercase();
            if !KNOWN_ROLES.contains(&role.as_str()) {
                return Err(ConfigError::validation(
                    "auth.self_registration_roles",
                    format!("unknown role '{role}'"),
                ));
            }
            if role == "admin" {
                return Err(ConfigError::validation(
                    "auth.self_registration_roles",
                    "admin accounts cannot be self-registered",
                ));
            }
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtSettings::default(),
            demo_accounts: false,
            public_paths: [
                "/health",
                "/ready",
                "/api/auth/login",
                "/api/auth/register",
                "/api/auth/forgot-password",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            admin_paths: ["/api/admin", "/api/users", "/api/account-requests"]
                .into_iter()
                .map(String::from)
                .collect(),
            self_registration_roles: ["student", "faculty", "staff"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Token signing settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtSettings {
    /// HMAC signing secret.
    pub secret: Option<String>,
    /// Issuer claim.
    pub issuer: String,
    /// Token lifetime in seconds.
    pub expiration_secs: u64,
}

impl JwtSettings {
    /// Returns the secret if it is set and non-blank.
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Returns the token lifetime.
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_secs)
    }

    /// Validates the token settings.
    pub fn validate(&self, environment: Environment) -> ConfigResult<()> {
        match self.secret() {
            None if environment.is_production() => {
                return Err(ConfigError::missing_field("auth.jwt.secret"));
            }
            Some(secret) if secret.len() < RECOMMENDED_SECRET_LEN => {
                tracing::warn!(
                    len = secret.len(),
                    recommended = RECOMMENDED_SECRET_LEN,
                    "JWT secret is shorter than recommended"
                );
            }
            _ => {}
        }

        if self.issuer.trim().is_empty() {
            return Err(ConfigError::missing_field("auth.jwt.issuer"));
        }
        if self.expiration_secs == 0 {
            return Err(ConfigError::validation(
                "auth.jwt.expiration_secs",
                "must be greater than 0",
            ));
        }
        if self.expiration_secs > MAX_JWT_EXPIRATION_SECS {
            return Err(ConfigError::validation(
                "auth.jwt.expiration_secs",
                format!("must not exceed {MAX_JWT_EXPIRATION_SECS}"),
            ));
        }
        Ok(())
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: DEFAULT_JWT_ISSUER.to_string(),
            expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
        }
    }
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("issuer", &self.issuer)
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

// =============================================================================
// DatabaseConfig
// =============================================================================

/// Identity store connection pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Maximum connections checked out at once.
    pub max_connections: usize,
    /// How long a request waits for a connection, in milliseconds.
    pub acquire_timeout_ms: u64,
    /// Hold time after which a checkout is logged as an overrun, in milliseconds.
    pub checkout_warn_ms: u64,
}

impl DatabaseConfig {
    /// Validates the pool section.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "must be greater than 0",
            ));
        }
        if self.acquire_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "database.acquire_timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.checkout_warn_ms == 0 {
            return Err(ConfigError::validation(
                "database.checkout_warn_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Returns the acquire timeout.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// Returns the checkout overrun threshold.
    pub fn checkout_warn_after(&self) -> Duration {
        Duration::from_millis(self.checkout_warn_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_ms: 2_000,
            checkout_warn_ms: 5_000,
        }
    }
}

// =============================================================================
// LoggingConfig
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level name as used by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON lines.
    Json,
    /// Compact single-line text.
    Compact,
}
