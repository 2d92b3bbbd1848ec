// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Failures of the `libris` command line and their exit codes.
//!
//! | Code | Meaning |
//! |------|---------|
//! | 1 | configuration could not be loaded or is invalid |
//! | 2 | bad command-line input |
//! | 3 | `validate --strict` found warnings |
//! | 4 | the service could not start |
//! | 5 | the API failed while serving or hashing |
//! | 6 | the identity store failed |
//! | 70 | anything else |

use thiserror::Error;

/// Result type alias for libris-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors surfaced by `libris` commands.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration is missing or invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] libris_config::ConfigError),

    /// The command line was well-formed but unusable.
    #[error("{0}")]
    Usage(String),

    /// Strict validation found warnings.
    #[error("Strict mode: {0} warning(s) found")]
    StrictWarnings(usize),

    /// The service could not be assembled from its configuration.
    #[error("Startup failed: {0}")]
    Startup(String),

    /// The API layer failed.
    #[error("API error: {0}")]
    Api(#[from] libris_api::ApiError),

    /// The identity store failed.
    #[error("Identity store error: {0}")]
    Store(#[from] libris_core::CoreError),

    /// Any other failure, with its context chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// A failure with the step that produced it.
    #[error("{context}: {source}")]
    WithContext {
        /// What was being done.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Creates a startup error.
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Wraps the error with the step that produced it.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Usage(_) => 2,
            Self::StrictWarnings(_) => 3,
            Self::Startup(_) => 4,
            Self::Api(_) => 5,
            Self::Store(_) => 6,
            Self::Other(_) => 70,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

/// Prints an error and its cause chain to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_context_keeps_exit_code() {
        let err = BinError::from(libris_config::ConfigError::missing_field("auth.jwt.secret"))
            .with_context("loading libris.yaml");
        assert!(err.to_string().starts_with("loading libris.yaml: Invalid configuration"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::usage("x").exit_code(), 2);
        assert_eq!(BinError::StrictWarnings(2).exit_code(), 3);
        assert_eq!(BinError::startup("x").exit_code(), 4);
        assert_eq!(BinError::from(libris_api::ApiError::internal("x")).exit_code(), 5);
        assert_eq!(BinError::from(libris_core::CoreError::PoolClosed).exit_code(), 6);
    }

    #[test]
    fn test_anyhow_chain_preserved() {
        let result: anyhow::Result<()> =
            Err(std::io::Error::other("pipe closed")).context("reading password");
        let err = BinError::from(result.unwrap_err());
        assert_eq!(err.to_string(), "reading password");
        assert_eq!(err.exit_code(), 70);
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()),
            Some("pipe closed".to_string())
        );
    }
}
