// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use anyhow::Context;
use libris_config::{ConfigLoader, LibrisConfig, RECOMMENDED_SECRET_LEN};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = ConfigLoader::new().load(config_path).map_err(|e| {
        BinError::from(e).with_context("Configuration validation failed")
    })?;
    config.validate()?;

    let warnings = collect_warnings(&config);
    let shown = args.show_config.then(|| redacted(&config));

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Environment:   {}", config.environment);
            println!("  API:           {}", config.server.bind_address());
            println!(
                "  Demo accounts: {}",
                if config.auth.demo_accounts { "enabled" } else { "disabled" }
            );
            println!("  Public paths:  {}", config.auth.public_paths.join(", "));
            println!("  Admin paths:   {}", config.auth.admin_paths.join(", "));

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if let Some(shown) = &shown {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_pretty_json(shown)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "environment": config.environment.as_str(),
                    "api_bind_address": config.server.bind_address(),
                    "demo_accounts": config.auth.demo_accounts,
                },
                "warnings": warnings,
                "config": shown,
            });
            println!("{}", to_pretty_json(&output)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::StrictWarnings(warnings.len()));
    }

    Ok(())
}

/// Non-fatal findings worth surfacing before deployment.
fn collect_warnings(config: &LibrisConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    match config.auth.jwt.secret() {
        None => warnings.push(
            "No JWT secret configured; a random per-process secret will be used".to_string(),
        ),
        Some(secret) if secret.len() < RECOMMENDED_SECRET_LEN => warnings.push(format!(
            "JWT secret is shorter than {} bytes",
            RECOMMENDED_SECRET_LEN
        )),
        Some(_) => {}
    }
    if config.auth.demo_accounts {
        warnings.push("Demo accounts are enabled".to_string());
    }
    if config.server.cors_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows any origin".to_string());
    }

    warnings
}

fn redacted(config: &LibrisConfig) -> LibrisConfig {
    let mut shown = config.clone();
    if shown.auth.jwt.secret.is_some() {
        shown.auth.jwt.secret = Some("<redacted>".to_string());
    }
    shown
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli_for(path: &std::path::Path) -> Cli {
        Cli::parse_from(["libris", "-c", path.to_str().unwrap(), "validate"])
    }

    #[test]
    fn test_warnings() {
        let mut config = LibrisConfig::default();
        assert_eq!(collect_warnings(&config).len(), 1);

        config.auth.jwt.secret = Some("short".into());
        config.auth.demo_accounts = true;
        let warnings = collect_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("shorter")));
        assert!(warnings.iter().any(|w| w.contains("Demo")));
    }

    #[test]
    fn test_redacted_hides_secret() {
        let mut config = LibrisConfig::default();
        config.auth.jwt.secret = Some("super-secret".into());
        let json = serde_json::to_string(&redacted(&config)).unwrap();
        assert!(!json.contains("super-secret"));
    }

    #[test]
    fn test_validate_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "server:\n  port: 9090\nauth:\n  jwt:\n    secret: \"a-secret-that-is-definitely-long-enough\"").unwrap();

        let cli = cli_for(file.path());
        assert!(validate(&cli, ValidateArgs::default()).is_ok());

        let strict = ValidateArgs {
            strict: true,
            ..Default::default()
        };
        assert!(validate(&cli, strict).is_ok());
    }

    #[test]
    fn test_strict_fails_on_warnings() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "server:\n  port: 9090").unwrap();

        let cli = cli_for(file.path());
        assert!(validate(&cli, ValidateArgs::default()).is_ok());

        let strict = ValidateArgs {
            strict: true,
            ..Default::default()
        };
        let err = validate(&cli, strict).unwrap_err();
        assert!(matches!(err, BinError::StrictWarnings(1)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_validate_missing_file() {
        let cli = cli_for(std::path::Path::new("/nonexistent/libris.yaml"));
        let err = validate(&cli, ValidateArgs::default()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
