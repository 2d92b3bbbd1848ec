// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the service (default)
//! - `validate`: Validate a configuration file
//! - `version`: Show version information
//! - `hash-password`: Print an Argon2 hash for seeding an account

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use libris_config::{LogLevel, LoggingConfig};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Libris - authentication and access control for the library service
#[derive(Parser, Debug)]
#[command(
    name = "libris",
    author = "Sylvex",
    version = libris_api::VERSION,
    about = "Authentication gateway for the Libris library service",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "libris.yaml",
        env = "LIBRIS_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact); overrides the config file
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without starting the server.
    Validate(ValidateArgs),

    /// Show version information
    Version,

    /// Hash a password for seeding an account
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Seed and accept the demo accounts (development only)
    #[arg(long)]
    pub demo_accounts: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show the parsed configuration (secrets redacted)
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `hash-password` command.
#[derive(Args, Debug, Clone)]
pub struct HashPasswordArgs {
    /// Password to hash
    #[arg(required_unless_present = "stdin")]
    pub password: Option<String>,

    /// Read the password from stdin
    #[arg(long)]
    pub stdin: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<libris_config::LogFormat> for LogFormat {
    fn from(format: libris_config::LogFormat) -> Self {
        match format {
            libris_config::LogFormat::Text => LogFormat::Text,
            libris_config::LogFormat::Json => LogFormat::Json,
            libris_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Get the effective log level: flags, then `--log-level`, then config.
    pub fn effective_log_level(&self, configured: LogLevel) -> String {
        if self.quiet {
            "warn".to_string()
        } else if self.verbose {
            "debug".to_string()
        } else {
            self.log_level
                .clone()
                .unwrap_or_else(|| configured.as_str().to_string())
        }
    }

    /// Get the effective log format: `--log-format`, then config.
    pub fn effective_log_format(&self, configured: libris_config::LogFormat) -> LogFormat {
        self.log_format.unwrap_or_else(|| configured.into())
    }

    /// Resolves level and format against a logging section.
    pub fn logging(&self, configured: &LoggingConfig) -> (String, LogFormat) {
        (
            self.effective_log_level(configured.level),
            self.effective_log_format(configured.format),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
