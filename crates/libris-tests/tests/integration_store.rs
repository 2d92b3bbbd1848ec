// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Identity Store Integration Tests
//!
//! Concurrent traffic through the router against the pooled store, plus
//! outage and shutdown behaviour.

use std::sync::Arc;
use std::time::Duration;

use libris_core::{
    CoreError, IdentityStore, MemoryIdentityStore, NewUser, PoolConfig, Role, StoredCredential,
    UserProfile,
};
use libris_tests::prelude::*;

fn new_user(email: &str, role: Role) -> NewUser {
    NewUser {
        username: "Patron".to_string(),
        email: email.to_string(),
        profile: UserProfile::bare(role),
        credential: StoredCredential::Hashed("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into()),
    }
}

#[tokio::test]
async fn test_concurrent_registrations() {
    let app = Arc::new(TestApp::new().await);

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let email = format!("patron{i}@usant.edu");
            app.post("/api/auth/register", registration_body(&email, "student"))
                .await
                .status
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().as_u16(), 201);
    }

    assert_eq!(app.store.list().await.unwrap().len(), 16);
    let status = app.store.pool_status();
    assert_eq!(status.in_use, 0);
    assert!(status.opened <= status.max_size);
}

#[tokio::test]
async fn test_concurrent_duplicate_registration() {
    let app = Arc::new(TestApp::new().await);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.post(
                "/api/auth/register",
                registration_body("same@usant.edu", "faculty"),
            )
            .await
            .status
            .as_u16()
        }));
    }

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }
    assert_eq!(statuses.iter().filter(|s| **s == 201).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == 409).count(), 7);
}

#[tokio::test]
async fn test_registered_account_can_log_in() {
    let app = TestApp::new().await;
    app.post("/api/auth/register", registration_body("Reader@USANT.edu", "staff"))
        .await
        .assert_status(201);

    let token = app
        .login_token("reader@usant.edu", "correct horse battery staple")
        .await;
    let me = app.get("/api/auth/me", Some(&token)).await;
    me.assert_status(200);
    assert_eq!(me.body["user"]["email"], "reader@usant.edu");
    assert_eq!(me.body["user"]["role"], "staff");
}

#[tokio::test]
async fn test_outage_and_recovery() {
    let app = TestApp::with_demo_accounts().await;
    let token = app.login_token(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    app.store.set_online(false);
    app.get("/ready", None).await.assert_status(503);
    app.get("/health", None).await.assert_status(200);
    app.get("/api/users", Some(&token))
        .await
        .assert_error(500, "Failed to list users");

    app.store.set_online(true);
    app.get("/ready", None).await.assert_status(200);
    let users = app.get("/api/users", Some(&token)).await;
    users.assert_status(200);
    assert_eq!(users.body["users"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_closed_store_fails_requests() {
    let app = TestApp::with_demo_accounts().await;
    app.store.close();

    app.login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .assert_error(500, "Failed to login");
    app.get("/ready", None).await.assert_status(503);
    assert!(matches!(
        app.store.find_by_email(ADMIN_EMAIL).await,
        Err(CoreError::PoolClosed)
    ));
}

#[tokio::test]
async fn test_small_pool_serializes_access() {
    init_test_logging();
    let store = Arc::new(MemoryIdentityStore::with_pool_config(
        PoolConfig::default()
            .with_max_size(1)
            .with_acquire_timeout(Duration::from_secs(5)),
    ));

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .create(new_user(&format!("user{i}@usant.edu"), Role::Student))
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let status = store.pool_status();
    assert_eq!(status.max_size, 1);
    assert_eq!(status.opened, 1);
    assert_eq!(status.in_use, 0);
    assert!(store.health_check().await);
}
