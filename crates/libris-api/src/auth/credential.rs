// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing, verification and demo fixtures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use libris_core::{ApprovalStatus, StoredCredential, User, UserId, UserProfile, UserRecord};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;

use crate::error::{ApiError, ApiResult};

// =============================================================================
// CredentialVerifier
// =============================================================================

/// Hash checked when an account or its credential is missing, so every
/// failed login pays the same Argon2 cost.
static DECOY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"libris-decoy-password", &salt)
        .map(|hash| hash.to_string())
        .ok()
});

/// Hashes and verifies account passwords.
///
/// Verification returns a plain `bool`: a malformed hash, a wrong password
/// and a missing credential are indistinguishable to the caller, in both
/// result and cost.
#[derive(Clone)]
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
    demo_enabled: bool,
    hash_checks: Arc<AtomicU64>,
}

impl CredentialVerifier {
    /// Creates a verifier that only accepts hashed credentials.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
            demo_enabled: false,
            hash_checks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Enables or disables the demo fixture credentials.
    pub fn with_demo_accounts(mut self, enabled: bool) -> Self {
        self.demo_enabled = enabled;
        self
    }

    /// Returns `true` if demo credentials are honoured.
    pub fn demo_enabled(&self) -> bool {
        self.demo_enabled
    }

    /// Hashes a password into a salted PHC string.
    pub fn hash(&self, plaintext: &str) -> ApiResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                ApiError::internal("Failed to process password")
            })
    }

    /// Returns how many Argon2 checks this verifier and its clones have run.
    pub fn hash_checks(&self) -> u64 {
        self.hash_checks.load(Ordering::Relaxed)
    }

    /// Checks a password against a stored credential.
    ///
    /// A missing credential, a malformed hash or a disabled demo credential
    /// is checked against a decoy hash and rejected.
    pub fn verify(&self, plaintext: &str, stored: Option<&StoredCredential>) -> bool {
        match stored {
            Some(StoredCredential::Hashed(phc)) => match PasswordHash::new(phc) {
                Ok(parsed) => self.check(plaintext, &parsed),
                Err(_) => {
                    tracing::warn!("Stored password hash is malformed");
                    self.check_decoy(plaintext);
                    false
                }
            },
            Some(StoredCredential::Demo(expected)) if self.demo_enabled => {
                constant_time_eq(plaintext.as_bytes(), expected.as_bytes())
            }
            _ => {
                self.check_decoy(plaintext);
                false
            }
        }
    }

    fn check(&self, plaintext: &str, parsed: &PasswordHash<'_>) -> bool {
        self.hash_checks.fetch_add(1, Ordering::Relaxed);
        self.argon2
            .verify_password(plaintext.as_bytes(), parsed)
            .is_ok()
    }

    fn check_decoy(&self, plaintext: &str) {
        if let Some(parsed) = DECOY_HASH
            .as_deref()
            .and_then(|phc| PasswordHash::new(phc).ok())
        {
            let _ = self.check(plaintext, &parsed);
        }
    }
}

impl Default for CredentialVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("demo_enabled", &self.demo_enabled)
            .field("hash_checks", &self.hash_checks())
            .finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// =============================================================================
// Demo fixtures
// =============================================================================

/// A seeded demo account.
#[derive(Debug, Clone, Copy)]
pub struct DemoAccount {
    /// Login email.
    pub email: &'static str,
    /// Plaintext password.
    pub password: &'static str,
    /// Display name.
    pub username: &'static str,
}

/// The fixed demo account list.
pub const DEMO_ACCOUNTS: [DemoAccount; 4] = [
    DemoAccount {
        email: "admin@usant.edu",
        password: "admin123",
        username: "Admin User",
    },
    DemoAccount {
        email: "john@usant.edu",
        password: "student123",
        username: "John Student",
    },
    DemoAccount {
        email: "rob@usant.edu",
        password: "faculty123",
        username: "Rob Faculty",
    },
    DemoAccount {
        email: "maria@usant.edu",
        password: "librarian123",
        username: "Maria Librarian",
    },
];

fn demo_profile(email: &str) -> UserProfile {
    match email {
        "admin@usant.edu" => UserProfile::Admin {
            user_type: Some("System Administrator".to_string()),
        },
        "john@usant.edu" => UserProfile::Student {
            user_type: Some("Undergraduate Student".to_string()),
            course: Some("BS Computer Science".to_string()),
            year_level: Some("3rd Year".to_string()),
        },
        "rob@usant.edu" => UserProfile::Faculty {
            user_type: Some("Professor".to_string()),
            department: Some("College of Computer Studies".to_string()),
        },
        _ => UserProfile::Staff {
            user_type: Some("Librarian".to_string()),
        },
    }
}

/// Builds the demo account records for seeding an identity store.
pub fn demo_records() -> Vec<UserRecord> {
    DEMO_ACCOUNTS
        .iter()
        .map(|account| UserRecord {
            user: User {
                user_id: UserId::generate(),
                username: account.username.to_string(),
                email: account.email.to_string(),
                profile: demo_profile(account.email),
                approval_status: ApprovalStatus::Approved,
                is_active: true,
                created_at: Utc::now(),
            },
            credential: Some(StoredCredential::Demo(account.password.to_string())),
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use libris_core::Role;

    #[test]
    fn test_hash_and_verify() {
        let verifier = CredentialVerifier::new();
        let phc = verifier.hash("s3cret-pass").unwrap();
        assert!(phc.starts_with("$argon2"));

        let stored = StoredCredential::Hashed(phc);
        assert!(verifier.verify("s3cret-pass", Some(&stored)));
        assert!(!verifier.verify("wrong", Some(&stored)));
    }

    #[test]
    fn test_hashes_are_salted() {
        let verifier = CredentialVerifier::new();
        let a = verifier.hash("password").unwrap();
        let b = verifier.hash("password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_false() {
        let verifier = CredentialVerifier::new();
        let stored = StoredCredential::Hashed("$2b$10$not-argon".to_string());
        assert!(!verifier.verify("anything", Some(&stored)));
    }

    #[test]
    fn test_missing_credential_never_authenticates() {
        let verifier = CredentialVerifier::new().with_demo_accounts(true);
        assert!(!verifier.verify("", None));
        assert!(!verifier.verify("admin123", None));
    }

    #[test]
    fn test_every_rejection_runs_argon2() {
        let verifier = CredentialVerifier::new();
        let hashed = StoredCredential::Hashed(verifier.hash("s3cret-pass").unwrap());
        let malformed = StoredCredential::Hashed("$2b$10$not-argon".to_string());
        let demo = StoredCredential::Demo("admin123".to_string());

        let cases = [None, Some(&hashed), Some(&malformed), Some(&demo)];
        for (i, stored) in cases.into_iter().enumerate() {
            assert!(!verifier.verify("wrong", stored));
            assert_eq!(verifier.hash_checks(), i as u64 + 1);
        }

        let clone = verifier.clone();
        assert!(clone.verify("s3cret-pass", Some(&hashed)));
        assert_eq!(verifier.hash_checks(), 5);
    }

    #[test]
    fn test_demo_credentials_gated() {
        let stored = StoredCredential::Demo("admin123".to_string());

        let disabled = CredentialVerifier::new();
        assert!(!disabled.verify("admin123", Some(&stored)));

        let enabled = CredentialVerifier::new().with_demo_accounts(true);
        assert!(enabled.verify("admin123", Some(&stored)));
        assert!(!enabled.verify("admin1234", Some(&stored)));
        assert!(!enabled.verify("Admin123", Some(&stored)));
    }

    #[test]
    fn test_demo_records() {
        let records = demo_records();
        assert_eq!(records.len(), 4);

        let roles: Vec<Role> = records.iter().map(|r| r.user.role()).collect();
        assert_eq!(roles, vec![Role::Admin, Role::Student, Role::Faculty, Role::Staff]);
        assert!(records.iter().all(|r| r.user.can_log_in()));
    }
}
