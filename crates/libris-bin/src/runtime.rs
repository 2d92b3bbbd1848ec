// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Startup order: resolve the API configuration (this is where a missing
//! production secret aborts), open the identity store, seed the demo
//! accounts when enabled, then serve until shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use libris_api::{auth::demo_records, ApiConfig, ApiServerBuilder};
use libris_config::{ConfigLoader, LibrisConfig};
use libris_core::{IdentityStore, MemoryIdentityStore, PoolConfig};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// LibrisRuntime
// =============================================================================

/// The service runtime.
pub struct LibrisRuntime {
    config: Arc<LibrisConfig>,
    shutdown: ShutdownCoordinator,
}

impl LibrisRuntime {
    /// Creates a runtime for a validated configuration.
    pub fn new(config: LibrisConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LibrisConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Builds the identity store and seeds it as configured.
    pub async fn create_store(&self) -> BinResult<Arc<MemoryIdentityStore>> {
        let db = &self.config.database;
        let pool = PoolConfig::default()
            .with_max_size(db.max_connections)
            .with_acquire_timeout(db.acquire_timeout())
            .with_checkout_warn_after(db.checkout_warn_after());
        let store = Arc::new(MemoryIdentityStore::with_pool_config(pool));

        if self.config.auth.demo_accounts {
            let seeded = store.seed(demo_records()).await?;
            warn!(count = seeded, "Demo accounts enabled; never use this in production");
        }

        Ok(store)
    }

    /// Runs the service until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!(
            version = libris_api::VERSION,
            environment = %self.config.environment,
            "Starting Libris"
        );

        let api_config = ApiConfig::from_config(&self.config)
            .map_err(|e| BinError::startup(e.to_string()).with_context("resolving API settings"))?;
        let store = self.create_store().await?;

        let server = ApiServerBuilder::new()
            .config(api_config)
            .store(store.clone() as Arc<dyn IdentityStore>)
            .build()?;

        let waiter = self.shutdown.clone();
        let signals = tokio::spawn(async move { waiter.wait_for_shutdown().await });

        let result = server
            .run_with_shutdown(self.shutdown.shutdown_signal())
            .await;

        // A server error also ends the signal task.
        self.shutdown.initiate_shutdown();
        let _ = signals.await;
        store.close();

        info!("Libris shutdown complete");
        result.map_err(BinError::from)
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<LibrisConfig>,
    port: Option<u16>,
    demo_accounts: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: LibrisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Enables the demo accounts on top of the configuration.
    pub fn demo_accounts(mut self, enabled: bool) -> Self {
        self.demo_accounts = enabled;
        self
    }

    /// Loads (if needed), applies overrides to and validates the
    /// configuration.
    pub fn build(self) -> BinResult<LibrisRuntime> {
        let mut config = match self.config {
            Some(config) => config,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::usage("No configuration provided"))?;
                ConfigLoader::new().load_or_default(&path).map_err(|e| {
                    BinError::from(e).with_context(format!("loading {}", path.display()))
                })?
            }
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.demo_accounts {
            config.auth.demo_accounts = true;
        }
        config.validate()?;

        Ok(LibrisRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================
