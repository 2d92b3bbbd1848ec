// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account identity types.
//!
//! A [`User`] is the public view of an account; the [`StoredCredential`] lives
//! beside it in a [`UserRecord`] and never leaves the store/auth boundary.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// UserId
// =============================================================================

/// Opaque, stable account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// Role
// =============================================================================

/// Account role carried in identity assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Enrolled student.
    Student,
    /// Teaching faculty.
    Faculty,
    /// Library or university staff.
    Staff,
    /// Administrator.
    Admin,
}

impl Role {
    /// All roles.
    pub const ALL: [Role; 4] = [Role::Student, Role::Faculty, Role::Staff, Role::Admin];

    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Parses a role from its lowercase name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Some(Role::Student),
            "faculty" => Some(Role::Faculty),
            "staff" => Some(Role::Staff),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// UserProfile
// =============================================================================

/// Role-specific account details.
///
/// The variant determines the account's [`Role`]; serialized as a `role` tag
/// alongside the variant's own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum UserProfile {
    /// Student account.
    Student {
        /// e.g. "Undergraduate Student".
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_type: Option<String>,
        /// Degree programme.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        course: Option<String>,
        /// Year level.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        year_level: Option<String>,
    },
    /// Faculty account.
    Faculty {
        /// e.g. "Professor".
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_type: Option<String>,
        /// Academic department.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        department: Option<String>,
    },
    /// Staff account.
    Staff {
        /// e.g. "Librarian".
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_type: Option<String>,
    },
    /// Administrator account.
    Admin {
        /// e.g. "System Administrator".
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_type: Option<String>,
    },
}

impl UserProfile {
    /// Returns the role implied by this profile.
    pub fn role(&self) -> Role {
        match self {
            UserProfile::Student { .. } => Role::Student,
            UserProfile::Faculty { .. } => Role::Faculty,
            UserProfile::Staff { .. } => Role::Staff,
            UserProfile::Admin { .. } => Role::Admin,
        }
    }

    /// Returns the free-form user type, if any.
    pub fn user_type(&self) -> Option<&str> {
        match self {
            UserProfile::Student { user_type, .. }
            | UserProfile::Faculty { user_type, .. }
            | UserProfile::Staff { user_type }
            | UserProfile::Admin { user_type } => user_type.as_deref(),
        }
    }

    /// Creates a profile with no optional details for the given role.
    pub fn bare(role: Role) -> Self {
        match role {
            Role::Student => UserProfile::Student {
                user_type: None,
                course: None,
                year_level: None,
            },
            Role::Faculty => UserProfile::Faculty {
                user_type: None,
                department: None,
            },
            Role::Staff => UserProfile::Staff { user_type: None },
            Role::Admin => UserProfile::Admin { user_type: None },
        }
    }
}

// =============================================================================
// ApprovalStatus
// =============================================================================

/// Administrative approval state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Awaiting review.
    Pending,
    /// Approved; may log in.
    Approved,
    /// Rejected.
    Rejected,
}

impl ApprovalStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// StoredCredential
// =============================================================================

/// How an account's password is stored.
#[derive(Clone, PartialEq, Eq)]
pub enum StoredCredential {
    /// Salted one-way hash in PHC string format.
    Hashed(String),
    /// Plaintext comparison value for seeded demo fixtures only.
    Demo(String),
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredCredential::Hashed(_) => f.write_str("Hashed(<redacted>)"),
            StoredCredential::Demo(_) => f.write_str("Demo(<redacted>)"),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account identifier.
    pub user_id: UserId,
    /// Display/user name.
    pub username: String,
    /// Normalized email.
    pub email: String,
    /// Role-specific details (serialized with a `role` tag).
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Approval state.
    pub approval_status: ApprovalStatus,
    /// Whether the account is active.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns the account role.
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Returns `true` if the account may log in.
    pub fn can_log_in(&self) -> bool {
        self.is_active && self.approval_status == ApprovalStatus::Approved
    }
}

/// An account together with its stored credential.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Public account data.
    pub user: User,
    /// Stored credential; `None` means the account cannot authenticate.
    pub credential: Option<StoredCredential>,
}

/// Data required to create an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display/user name.
    pub username: String,
    /// Email (normalized by the store).
    pub email: String,
    /// Role-specific details.
    pub profile: UserProfile,
    /// Initial credential.
    pub credential: StoredCredential,
}

/// Normalizes an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Tests
// =============================================================================
