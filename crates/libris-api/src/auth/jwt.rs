// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token management.
//!
//! Tokens are HS256-signed and validated against the wall clock with no
//! leeway. Validation collapses every failure into `None`.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use libris_config::{Environment, JwtSettings, MAX_JWT_EXPIRATION_SECS, RECOMMENDED_SECRET_LEN};
use libris_core::{Role, UserId};
use rand::distributions::Alphanumeric;
use rand::Rng;

use super::Claims;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token expiration time in seconds.
    pub expiration_secs: i64,
}

impl JwtConfig {
    /// Creates a configuration with the given secret and default lifetime.
    pub fn new(secret: impl Into<String>) -> Self {
        let defaults = JwtSettings::default();
        Self {
            secret: secret.into(),
            issuer: defaults.issuer,
            expiration_secs: defaults.expiration_secs as i64,
        }
    }

    /// Builds the configuration from loaded settings.
    ///
    /// Without a configured secret, production is refused and development
    /// gets a random secret that lives as long as the process.
    pub fn from_settings(settings: &JwtSettings, environment: Environment) -> ApiResult<Self> {
        let secret = match settings.secret() {
            Some(secret) => secret.to_string(),
            None if environment.is_production() => {
                return Err(ApiError::internal("JWT secret is not configured"));
            }
            None => {
                tracing::warn!(
                    "No JWT secret configured; using a random per-process secret. \
                     Tokens will not survive a restart."
                );
                random_secret()
            }
        };

        Ok(Self {
            secret,
            issuer: settings.issuer.clone(),
            expiration_secs: i64::try_from(settings.expiration_secs)
                .map_err(|_| ApiError::internal("JWT expiration is out of range"))?,
        })
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the expiration time in seconds.
    pub fn with_expiration_secs(mut self, secs: i64) -> Self {
        self.expiration_secs = secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::internal("JWT secret is not configured"));
        }
        if self.secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                "JWT secret is shorter than recommended ({} bytes)",
                RECOMMENDED_SECRET_LEN
            );
        }
        if self.expiration_secs <= 0 {
            return Err(ApiError::internal("JWT expiration must be positive"));
        }
        if self.expiration_secs as u64 > MAX_JWT_EXPIRATION_SECS {
            return Err(ApiError::internal("JWT expiration is too long"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

// =============================================================================
// JwtManager
// =============================================================================

/// Issues and validates identity assertions.
#[derive(Clone)]
pub struct JwtManager {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtManager {
    /// Creates a new JWT manager with the given configuration.
    pub fn new(config: JwtConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // Expiry is checked by `validate_at` against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.validate_aud = false;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Issues a token for an account, valid from now.
    pub fn issue(&self, user_id: &UserId, email: &str, role: Role) -> ApiResult<String> {
        self.issue_at(user_id, email, role, Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: &UserId, email: &str, role: Role, now: i64) -> ApiResult<String> {
        if now.checked_add(self.config.expiration_secs).is_none() {
            tracing::error!(
                expiration_secs = self.config.expiration_secs,
                "Token expiry overflows the timestamp range"
            );
            return Err(ApiError::internal("Failed to issue token"));
        }
        let claims = Claims::new(
            user_id,
            email,
            role,
            &self.config.issuer,
            now,
            self.config.expiration_secs,
        );
        self.sign(&claims)
    }

    /// Signs arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> ApiResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign token");
            ApiError::internal("Failed to issue token")
        })
    }

    /// Validates a token against the current time.
    pub fn validate(&self, token: &str) -> Option<Claims> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validates a token against a fixed clock.
    ///
    /// Returns the claims only if the signature and issuer verify and
    /// `now` is strictly before expiry.
    pub fn validate_at(&self, token: &str, now: i64) -> Option<Claims> {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(reason = ?e.kind(), "Token rejected");
                return None;
            }
        };

        if claims.is_expired_at(now) {
            tracing::debug!(sub = %claims.sub, exp = claims.exp, "Token expired");
            return None;
        }
        Some(claims)
    }

    /// Returns the token lifetime in seconds.
    pub fn expiration_secs(&self) -> i64 {
        self.config.expiration_secs
    }

    /// Returns the issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.config.issuer)
            .field("expiration_secs", &self.config.expiration_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
