// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Configuration Integration Tests
//!
//! Loads configuration files from disk and boots the router from them.

use std::io::Write;
use std::path::Path;

use libris_api::{ApiConfig, ApiServerBuilder};
use libris_config::{
    ConfigError, ConfigLoader, Environment, LogFormat, LogLevel, MAX_JWT_EXPIRATION_SECS,
};
use libris_core::Role;
use libris_tests::common::unique_test_id;
use libris_tests::prelude::*;
use tempfile::NamedTempFile;

fn write_config(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("libris-")
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A loader whose environment overrides cannot collide with other tests.
fn isolated_loader() -> (ConfigLoader, String) {
    let prefix = format!("LIBRIS_IT_{}", unique_test_id().replace('-', "_"));
    (ConfigLoader::new().with_env_prefix(prefix.clone()), prefix)
}

fn load(path: &Path) -> Result<libris_config::LibrisConfig, ConfigError> {
    isolated_loader().0.load(path)
}

const YAML: &str = r#"
environment: production
server:
  host: 127.0.0.1
  port: 9100
  request_timeout_secs: 15
  cors_origins:
    - https://library.usant.edu
auth:
  jwt:
    secret: yaml-secret-with-plenty-of-entropy-0123456789
    issuer: libris-prod
    expiration_secs: 3600
  self_registration_roles: [student, faculty]
logging:
  level: warn
  format: json
"#;

const TOML: &str = r#"
environment = "production"

[server]
host = "127.0.0.1"
port = 9100

[auth.jwt]
secret = "toml-secret-with-plenty-of-entropy-0123456789"

[logging]
level = "debug"
format = "compact"
"#;

const JSON: &str = r#"{
  "environment": "development",
  "server": { "port": 9200 },
  "auth": { "demo_accounts": true }
}"#;

#[test]
fn test_load_yaml() {
    let file = write_config(".yaml", YAML);
    let config = load(file.path()).unwrap();

    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.server.request_timeout().as_secs(), 15);
    assert_eq!(config.server.cors_origins, vec!["https://library.usant.edu"]);
    assert_eq!(config.auth.jwt.issuer, "libris-prod");
    assert_eq!(config.auth.jwt.expiration_secs, 3600);
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(!config.auth.demo_accounts);
}

#[test]
fn test_load_toml() {
    let file = write_config(".toml", TOML);
    let config = load(file.path()).unwrap();

    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Compact);
    // Unspecified sections keep their defaults.
    assert!(config
        .auth
        .public_paths
        .contains(&"/api/auth/login".to_string()));
}

#[test]
fn test_load_json() {
    let file = write_config(".json", JSON);
    let config = load(file.path()).unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.server.port, 9200);
    assert!(config.auth.demo_accounts);
    assert!(config.auth.jwt.secret().is_none());
}

#[test]
fn test_unknown_extension_and_fields() {
    let file = write_config(".ini", "port=1");
    assert!(matches!(
        load(file.path()),
        Err(ConfigError::UnsupportedFormat { .. })
    ));

    let file = write_config(".yaml", "server:\n  prot: 8080\n");
    assert!(matches!(load(file.path()), Err(ConfigError::Parse { .. })));
}

#[test]
fn test_env_overrides_win_over_file() {
    let (loader, prefix) = isolated_loader();
    std::env::set_var(format!("{prefix}_API_PORT"), "9300");
    std::env::set_var(format!("{prefix}_LOG_LEVEL"), "error");

    let file = write_config(".yaml", YAML);
    let config = loader.load(file.path()).unwrap();
    assert_eq!(config.server.port, 9300);
    assert_eq!(config.logging.level, LogLevel::Error);
    assert_eq!(config.auth.jwt.issuer, "libris-prod");
}

#[test]
fn test_env_turns_on_production_checks() {
    let (loader, prefix) = isolated_loader();
    std::env::set_var(format!("{prefix}_ENV"), "production");

    let file = write_config(".json", JSON);
    let err = loader.load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { ref field } if field == "auth.jwt.secret"));
}

#[test]
fn test_production_rules() {
    let without_secret = "environment: production\n";
    let file = write_config(".yaml", without_secret);
    assert!(matches!(
        load(file.path()),
        Err(ConfigError::MissingField { .. })
    ));

    let with_demo = "environment: production\nauth:\n  demo_accounts: true\n  jwt:\n    secret: a-secret-that-is-long-enough-for-production\n";
    let file = write_config(".yaml", with_demo);
    assert!(matches!(
        load(file.path()),
        Err(ConfigError::Validation { ref field, .. }) if field == "auth.demo_accounts"
    ));
}

#[test]
fn test_admin_self_registration_rejected() {
    let file = write_config(
        ".yaml",
        "auth:\n  self_registration_roles: [student, admin]\n",
    );
    assert!(matches!(
        load(file.path()),
        Err(ConfigError::Validation { ref field, .. }) if field == "auth.self_registration_roles"
    ));
}

#[test]
fn test_token_lifetime_bounded() {
    let huge = format!("auth:\n  jwt:\n    expiration_secs: {}\n", i64::MAX);
    let file = write_config(".yaml", &huge);
    assert!(matches!(
        load(file.path()),
        Err(ConfigError::Validation { ref field, .. }) if field == "auth.jwt.expiration_secs"
    ));

    let year = format!("auth:\n  jwt:\n    expiration_secs: {MAX_JWT_EXPIRATION_SECS}\n");
    let file = write_config(".yaml", &year);
    let config = load(file.path()).unwrap();
    let api = ApiConfig::from_config(&config).unwrap();
    assert!(ApiServerBuilder::new().config(api).build().is_ok());
}

#[test]
fn test_root_public_path_rejected() {
    let file = write_config(
        ".yaml",
        "auth:\n  public_paths: [/health, /]\n",
    );
    assert!(matches!(
        load(file.path()),
        Err(ConfigError::Validation { ref field, .. }) if field == "auth.public_paths"
    ));
}

#[tokio::test]
async fn test_loaded_config_drives_router() {
    let file = write_config(".yaml", YAML);
    let config = load(file.path()).unwrap();
    let api = ApiConfig::from_config(&config).unwrap();

    assert_eq!(api.port, 9100);
    assert_eq!(api.jwt.issuer, "libris-prod");
    assert!(api.can_self_register(Role::Faculty));
    assert!(!api.can_self_register(Role::Staff));
    assert!(!api.can_self_register(Role::Admin));

    let app = TestApp::build(api, Vec::new()).await;

    app.post("/api/auth/register", registration_body("new@usant.edu", "staff"))
        .await
        .assert_error(403, "Role cannot be self-registered");

    let response = app
        .post("/api/auth/register", registration_body("new@usant.edu", "faculty"))
        .await;
    response.assert_status(201);

    let token = response.body["token"].as_str().unwrap();
    let claims = app.state.jwt().validate(token).unwrap();
    assert_eq!(claims.iss, "libris-prod");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_development_without_secret_still_serves() {
    let file = write_config(".json", JSON);
    let config = load(file.path()).unwrap();
    let api = ApiConfig::from_config(&config).unwrap();

    assert!(api.demo_accounts);
    assert!(ApiServerBuilder::new().config(api).build().is_ok());
}
