// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use libris_config::LibrisConfig;
use libris_core::Role;

use crate::auth::{JwtConfig, RoutePolicy};
use crate::error::{ApiError, ApiResult};

// =============================================================================
// ApiConfig
// =============================================================================

/// Resolved configuration for the API server.
///
/// Built once at startup from [`LibrisConfig`]; the signing secret and the
/// route policy are fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Allowed CORS origins; empty or `*` allows any.
    pub cors_origins: Vec<String>,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Whether the demo fixture accounts are accepted.
    pub demo_accounts: bool,
    /// Public allow-list and restricted prefixes.
    pub policy: RoutePolicy,
    /// Roles a visitor may pick when registering.
    pub self_registration_roles: Vec<Role>,
}

impl ApiConfig {
    /// Creates a development configuration signing with `secret`.
    pub fn new(secret: impl Into<String>) -> Self {
        Self::from_libris(&LibrisConfig::default(), JwtConfig::new(secret))
    }

    /// Resolves the API configuration from the loaded service configuration.
    pub fn from_config(config: &LibrisConfig) -> ApiResult<Self> {
        let jwt = JwtConfig::from_settings(&config.auth.jwt, config.environment)?;
        let mut api = Self::from_libris(config, jwt);
        api.host = config.server.host.parse().map_err(|_| {
            ApiError::internal(format!("Invalid server host: {}", config.server.host))
        })?;
        Ok(api)
    }

    fn from_libris(config: &LibrisConfig, jwt: JwtConfig) -> Self {
        let self_registration_roles = config
            .auth
            .self_registration_roles
            .iter()
            .filter_map(|name| Role::parse(name))
            .filter(|role| *role != Role::Admin)
            .collect();

        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: config.server.port,
            request_timeout: config.server.request_timeout(),
            cors_origins: config.server.cors_origins.clone(),
            jwt,
            demo_accounts: config.auth.demo_accounts,
            policy: RoutePolicy::from_config(&config.auth),
            self_registration_roles,
        }
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the JWT configuration.
    pub fn with_jwt(mut self, jwt: JwtConfig) -> Self {
        self.jwt = jwt;
        self
    }

    /// Enables or disables the demo accounts.
    pub fn with_demo_accounts(mut self, enabled: bool) -> Self {
        self.demo_accounts = enabled;
        self
    }

    /// Replaces the route policy.
    pub fn with_policy(mut self, policy: RoutePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns `true` if `role` may be chosen at registration.
    pub fn can_self_register(&self, role: Role) -> bool {
        self.self_registration_roles.contains(&role)
    }
}

// =============================================================================
// Tests
// =============================================================================
