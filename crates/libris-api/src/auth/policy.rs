// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route policy.
//!
//! Every path is either on the public allow-list or requires a valid token;
//! restricted prefixes additionally constrain the caller's role.
//!
//! Prefixes match on whole segments: `/api/admin` covers `/api/admin` and
//! `/api/admin/books` but not `/api/administrators`.

use libris_config::AuthConfig;
use libris_core::Role;

// =============================================================================
// RouteRule
// =============================================================================

/// A restricted route prefix and the roles allowed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    prefix: String,
    roles: Vec<Role>,
}

impl RouteRule {
    /// Creates a rule.
    pub fn new(prefix: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            prefix: normalize_prefix(prefix.into()),
            roles: roles.into_iter().collect(),
        }
    }

    /// Creates an admin-only rule.
    pub fn admin_only(prefix: impl Into<String>) -> Self {
        Self::new(prefix, [Role::Admin])
    }

    /// Returns the prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns `true` if `role` may access the prefix.
    pub fn permits(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns `true` if only administrators are allowed.
    pub fn is_admin_only(&self) -> bool {
        self.roles == [Role::Admin]
    }

    /// Returns the message sent with a 403.
    pub fn denial_message(&self) -> &'static str {
        if self.is_admin_only() {
            "Admin access required"
        } else {
            "Insufficient role"
        }
    }
}

// =============================================================================
// RoutePolicy
// =============================================================================

/// Public allow-list plus restricted prefixes.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    public: Vec<String>,
    rules: Vec<RouteRule>,
}

impl RoutePolicy {
    /// Creates an empty policy: every path requires a token, no role limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the policy from the auth configuration.
    ///
    /// Each configured admin path becomes an admin-only rule.
    pub fn from_config(config: &AuthConfig) -> Self {
        let mut policy = Self::new();
        for path in &config.public_paths {
            policy = policy.allow_public(path.as_str());
        }
        for path in &config.admin_paths {
            policy = policy.restrict(RouteRule::admin_only(path.as_str()));
        }
        policy
    }

    /// Adds a public prefix.
    pub fn allow_public(mut self, prefix: impl Into<String>) -> Self {
        self.public.push(normalize_prefix(prefix.into()));
        self
    }

    /// Adds a restricted prefix.
    pub fn restrict(mut self, rule: RouteRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns `true` if the path bypasses authentication.
    ///
    /// A public `/` opens the root path only, never the routes below it.
    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|prefix| match prefix.as_str() {
            "/" => path == "/",
            prefix => matches_prefix(path, prefix),
        })
    }

    /// Returns the most specific rule covering the path.
    pub fn rule_for(&self, path: &str) -> Option<&RouteRule> {
        self.rules
            .iter()
            .filter(|rule| matches_prefix(path, &rule.prefix))
            .max_by_key(|rule| rule.prefix.len())
    }

    /// Returns the public prefixes.
    pub fn public_paths(&self) -> &[String] {
        &self.public
    }
}

fn normalize_prefix(prefix: String) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Segment-aware prefix match.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

// =============================================================================
// Tests
// =============================================================================
