// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! # Loading Pipeline
//!
//! 1. Read the file (or start from defaults when it is absent)
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders
//! 3. Parse YAML, TOML or JSON
//! 4. Apply `LIBRIS_*` environment overrides
//! 5. Validate

use std::env;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{Environment, LibrisConfig, LogFormat, LogLevel};

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader.
///
/// ```no_run
/// use libris_config::ConfigLoader;
///
/// let config = ConfigLoader::new().load("libris.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    resolve_env_vars: bool,
}

impl ConfigLoader {
    /// Creates a loader with the `LIBRIS` prefix and env resolution enabled.
    pub fn new() -> Self {
        Self {
            env_prefix: "LIBRIS".to_string(),
            resolve_env_vars: true,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholders and environment overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads and validates configuration from a file.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<LibrisConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let format = ConfigFormat::from_path(path)?;

        let config = self.build(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })?;

        debug!(environment = %config.environment, "Configuration loaded");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise starts from defaults.
    ///
    /// Environment overrides and validation apply in both cases.
    pub fn load_or_default(&self, path: impl AsRef<Path>) -> ConfigResult<LibrisConfig> {
        let path = path.as_ref();
        if path.exists() {
            return self.load(path);
        }

        info!(path = %path.display(), "Configuration file not found, using defaults");
        let mut config = LibrisConfig::default();
        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<LibrisConfig> {
        self.build(content, format)
    }

    fn build(&self, content: &str, format: ConfigFormat) -> ConfigResult<LibrisConfig> {
        let content = if self.resolve_env_vars {
            resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let mut config: LibrisConfig = parse_str(&content, format)?;
        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn var(&self, suffix: &str) -> (String, Option<String>) {
        let name = format!("{}_{}", self.env_prefix, suffix);
        let value = env::var(&name).ok();
        (name, value)
    }

    /// Applies `<PREFIX>_*` environment overrides.
    fn apply_env_overrides(&self, config: &mut LibrisConfig) -> ConfigResult<()> {
        if let (name, Some(value)) = self.var("ENV") {
            config.environment = Environment::parse(&value).ok_or_else(|| {
                ConfigError::invalid_env_var(name, "expected 'development' or 'production'")
            })?;
        }
        if let (_, Some(value)) = self.var("JWT_SECRET") {
            config.auth.jwt.secret = Some(value);
        }
        if let (_, Some(value)) = self.var("API_HOST") {
            config.server.host = value;
        }
        if let (name, Some(value)) = self.var("API_PORT") {
            config.server.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected valid port number"))?;
        }
        if let (name, Some(value)) = self.var("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected a log level"))?;
        }
        if let (name, Some(value)) = self.var("LOG_FORMAT") {
            config.logging.format = match value.trim().to_lowercase().as_str() {
                "text" | "pretty" => LogFormat::Text,
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => {
                    return Err(ConfigError::invalid_env_var(
                        name,
                        "expected 'text', 'json' or 'compact'",
                    ))
                }
            };
        }
        if let (name, Some(value)) = self.var("DEMO_ACCOUNTS") {
            config.auth.demo_accounts = parse_bool(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected a boolean"))?;
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => parse_yaml(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

fn parse_yaml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

/// Replaces `${VAR}` and `${VAR:default}` with environment values.
///
/// Unset variables without a default are left in place.
fn resolve_env_placeholders(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            result.push_str(&rest[start..]);
            return result;
        };

        let inner = &after[..end];
        let (name, default) = match inner.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (inner, None),
        };

        match (env::var(name), default) {
            (Ok(value), _) => result.push_str(&value),
            (Err(_), Some(default)) => result.push_str(default),
            (Err(_), None) => {
                warn!(var = name, "Environment variable not found");
                result.push_str(&rest[start..start + 2 + end + 1]);
            }
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<LibrisConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<LibrisConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================
