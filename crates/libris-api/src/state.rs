// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use libris_core::{IdentityStore, MemoryIdentityStore};

use crate::auth::{AuthGate, CredentialVerifier, JwtManager};
use crate::config::ApiConfig;
use crate::error::ApiResult;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Everything here is read-only after startup except the identity store,
/// which synchronizes internally.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Identity store.
    pub store: Arc<dyn IdentityStore>,
    /// JWT manager for token operations.
    pub jwt_manager: Arc<JwtManager>,
    /// Request gate.
    pub gate: Arc<AuthGate>,
    /// Password verifier.
    pub verifier: Arc<CredentialVerifier>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the JWT manager.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt_manager
    }

    /// Returns the identity store.
    pub fn store(&self) -> &dyn IdentityStore {
        self.store.as_ref()
    }

    /// Returns the credential verifier.
    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("jwt_manager", &self.jwt_manager)
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing [`AppState`].
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    store: Option<Arc<dyn IdentityStore>>,
    jwt_manager: Option<Arc<JwtManager>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the identity store.
    pub fn store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the JWT manager.
    pub fn jwt_manager(mut self, manager: Arc<JwtManager>) -> Self {
        self.jwt_manager = Some(manager);
        self
    }

    /// Builds the state.
    ///
    /// Without a configuration a development config with a random secret is
    /// used; without a store an empty in-memory store is created.
    pub fn build(self) -> ApiResult<AppState> {
        let config = match self.config {
            Some(config) => config,
            None => ApiConfig::from_config(&libris_config::LibrisConfig::default())?,
        };

        let jwt_manager = match self.jwt_manager {
            Some(manager) => manager,
            None => Arc::new(JwtManager::new(config.jwt.clone())?),
        };

        let gate = Arc::new(AuthGate::new(
            jwt_manager.clone(),
            Arc::new(config.policy.clone()),
        ));
        let verifier =
            Arc::new(CredentialVerifier::new().with_demo_accounts(config.demo_accounts));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryIdentityStore::new()));

        Ok(AppState {
            config: Arc::new(config),
            store,
            jwt_manager,
            gate,
            verifier,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_manager.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<dyn IdentityStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let state = AppState::builder()
            .config(ApiConfig::new("state-test-secret-long-enough-1234"))
            .build()
            .unwrap();
        assert!(!state.verifier().demo_enabled());
        assert_eq!(state.jwt().issuer(), "libris");
        assert!(state.gate.policy().is_public("/health"));
    }

    #[test]
    fn test_demo_flag_reaches_verifier() {
        let config = ApiConfig::new("state-test-secret-long-enough-1234").with_demo_accounts(true);
        let state = AppState::builder().config(config).build().unwrap();
        assert!(state.verifier().demo_enabled());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = AppState::builder().config(ApiConfig::new("")).build();
        assert!(result.is_err());
    }
}
