// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures

use chrono::Utc;
use libris_api::{ApiConfig, CredentialVerifier};
use libris_core::{ApprovalStatus, StoredCredential, User, UserId, UserProfile, UserRecord};

/// Signing secret shared by the integration suites.
pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// Demo administrator email.
pub const ADMIN_EMAIL: &str = "admin@usant.edu";
/// Demo administrator password.
pub const ADMIN_PASSWORD: &str = "admin123";
/// Demo student email.
pub const STUDENT_EMAIL: &str = "john@usant.edu";
/// Demo student password.
pub const STUDENT_PASSWORD: &str = "student123";
/// Demo faculty email.
pub const FACULTY_EMAIL: &str = "rob@usant.edu";
/// Demo faculty password.
pub const FACULTY_PASSWORD: &str = "faculty123";
/// Demo librarian email.
pub const STAFF_EMAIL: &str = "maria@usant.edu";
/// Demo librarian password.
pub const STAFF_PASSWORD: &str = "librarian123";

/// API configuration signing with [`TEST_SECRET`].
pub fn api_config() -> ApiConfig {
    ApiConfig::new(TEST_SECRET)
}

/// An account record with a real Argon2 hash of `password`.
pub fn hashed_record(
    email: &str,
    password: &str,
    profile: UserProfile,
    approval_status: ApprovalStatus,
    is_active: bool,
) -> UserRecord {
    let phc = CredentialVerifier::new()
        .hash(password)
        .expect("hashing should succeed");
    UserRecord {
        user: User {
            user_id: UserId::generate(),
            username: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            profile,
            approval_status,
            is_active,
            created_at: Utc::now(),
        },
        credential: Some(StoredCredential::Hashed(phc)),
    }
}

/// An active, approved student with a hashed password.
pub fn student_record(email: &str, password: &str) -> UserRecord {
    hashed_record(
        email,
        password,
        UserProfile::Student {
            user_type: Some("Undergraduate Student".into()),
            course: Some("BS Information Technology".into()),
            year_level: Some("1st Year".into()),
        },
        ApprovalStatus::Approved,
        true,
    )
}

/// An account that has no credential at all.
pub fn credentialless_record(email: &str) -> UserRecord {
    let mut record = student_record(email, "unused");
    record.credential = None;
    record
}

/// A registration body as sent by the sign-up form.
pub fn registration_body(email: &str, role: &str) -> serde_json::Value {
    serde_json::json!({
        "username": "New Patron",
        "email": email,
        "password": "correct horse battery staple",
        "role": role,
        "userType": "Undergraduate Student",
        "course": "BS Computer Science",
        "yearLevel": "2nd Year",
        "department": "College of Computer Studies",
    })
}
