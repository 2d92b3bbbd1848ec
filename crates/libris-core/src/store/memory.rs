// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory identity store.
//!
//! Accounts live in shared tables; every operation checks out a
//! [`MemoryConnection`] from a [`ConnectionPool`] the same way a database
//! backed store would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::IdentityStore;
use crate::error::{CoreError, CoreResult};
use crate::identity::{normalize_email, ApprovalStatus, NewUser, User, UserId, UserRecord};
use crate::pool::{ConnectionPool, ManageConnection, PoolConfig, PoolStatus};

// =============================================================================
// Tables
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, UserRecord>,
    email_index: HashMap<String, UserId>,
}

impl Tables {
    fn insert(&mut self, mut record: UserRecord) -> CoreResult<User> {
        let email = normalize_email(&record.user.email);
        if self.email_index.contains_key(&email) {
            return Err(CoreError::duplicate_email(email));
        }
        record.user.email = email.clone();
        let user = record.user.clone();
        self.email_index.insert(email, user.user_id.clone());
        self.users.insert(user.user_id.clone(), record);
        Ok(user)
    }
}

// =============================================================================
// MemoryBackend / MemoryConnection
// =============================================================================

/// Opens connections onto the shared in-memory tables.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    tables: Arc<RwLock<Tables>>,
    online: Arc<AtomicBool>,
}

impl MemoryBackend {
    fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            online: Arc::new(AtomicBool::new(true)),
        }
    }
}

#[async_trait]
impl ManageConnection for MemoryBackend {
    type Connection = MemoryConnection;

    async fn connect(&self) -> CoreResult<MemoryConnection> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(CoreError::connection("identity store is unreachable"));
        }
        Ok(MemoryConnection {
            tables: self.tables.clone(),
            online: self.online.clone(),
        })
    }
}

/// A handle onto the in-memory tables.
#[derive(Debug)]
pub struct MemoryConnection {
    tables: Arc<RwLock<Tables>>,
    online: Arc<AtomicBool>,
}

impl MemoryConnection {
    fn ensure_online(&self) -> CoreResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CoreError::connection("identity store is unreachable"))
        }
    }

    /// Finds a record by normalized email.
    pub fn find_by_email(&self, email: &str) -> CoreResult<Option<UserRecord>> {
        self.ensure_online()?;
        let tables = self.tables.read();
        Ok(tables
            .email_index
            .get(&normalize_email(email))
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    /// Finds a user by id.
    pub fn find_by_id(&self, user_id: &UserId) -> CoreResult<Option<User>> {
        self.ensure_online()?;
        Ok(self.tables.read().users.get(user_id).map(|r| r.user.clone()))
    }

    /// Inserts a record, enforcing email uniqueness.
    pub fn insert(&self, record: UserRecord) -> CoreResult<User> {
        self.ensure_online()?;
        self.tables.write().insert(record)
    }

    /// Lists users, newest first.
    pub fn list(&self) -> CoreResult<Vec<User>> {
        self.ensure_online()?;
        let mut users: Vec<User> = self
            .tables
            .read()
            .users
            .values()
            .map(|r| r.user.clone())
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

// =============================================================================
// MemoryIdentityStore
// =============================================================================

/// [`IdentityStore`] backed by process memory.
#[derive(Clone)]
pub struct MemoryIdentityStore {
    pool: ConnectionPool<MemoryBackend>,
    online: Arc<AtomicBool>,
}

impl MemoryIdentityStore {
    /// Creates an empty store with default pool settings.
    pub fn new() -> Self {
        Self::with_pool_config(PoolConfig::default())
    }

    /// Creates an empty store with the given pool settings.
    pub fn with_pool_config(config: PoolConfig) -> Self {
        let backend = MemoryBackend::new();
        let online = backend.online.clone();
        Self {
            pool: ConnectionPool::new(backend, config),
            online,
        }
    }

    /// Inserts pre-built records, e.g. seeded fixture accounts.
    pub async fn seed(&self, records: impl IntoIterator<Item = UserRecord>) -> CoreResult<usize> {
        let conn = self.pool.acquire().await?;
        let mut count = 0;
        for record in records {
            conn.insert(record)?;
            count += 1;
        }
        tracing::debug!(count, "Seeded identity store");
        Ok(count)
    }

    /// Simulates the backend becoming reachable or unreachable.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Returns connection pool statistics.
    pub fn pool_status(&self) -> PoolStatus {
        self.pool.status()
    }

    /// Closes the underlying pool.
    pub fn close(&self) {
        self.pool.close();
    }
}

impl Default for MemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryIdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIdentityStore")
            .field("pool", &self.pool.status())
            .finish()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserRecord>> {
        self.pool.acquire().await?.find_by_email(email)
    }

    async fn find_by_id(&self, user_id: &UserId) -> CoreResult<Option<User>> {
        self.pool.acquire().await?.find_by_id(user_id)
    }

    async fn create(&self, new_user: NewUser) -> CoreResult<User> {
        let record = UserRecord {
            user: User {
                user_id: UserId::generate(),
                username: new_user.username,
                email: new_user.email,
                profile: new_user.profile,
                approval_status: ApprovalStatus::Approved,
                is_active: true,
                created_at: Utc::now(),
            },
            credential: Some(new_user.credential),
        };
        let user = self.pool.acquire().await?.insert(record)?;
        tracing::info!(user_id = %user.user_id, role = %user.role(), "Account created");
        Ok(user)
    }

    async fn list(&self) -> CoreResult<Vec<User>> {
        self.pool.acquire().await?.list()
    }

    async fn health_check(&self) -> bool {
        match self.pool.acquire().await {
            Ok(conn) => conn.ensure_online().is_ok(),
            Err(_) => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Role, StoredCredential, UserProfile};

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            username: "Test".to_string(),
            email: email.to_string(),
            profile: UserProfile::bare(role),
            credential: StoredCredential::Hashed("$argon2id$stub".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryIdentityStore::new();
        let user = store.create(new_user("Alice@USANT.edu", Role::Student)).await.unwrap();

        assert_eq!(user.email, "alice@usant.edu");
        assert_eq!(user.approval_status, ApprovalStatus::Approved);
        assert!(user.is_active);

        let record = store.find_by_email("alice@usant.edu").await.unwrap().unwrap();
        assert_eq!(record.user.user_id, user.user_id);
        assert!(record.credential.is_some());

        let by_id = store.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert_eq!(by_id.role(), Role::Student);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryIdentityStore::new();
        store.create(new_user("bob@usant.edu", Role::Faculty)).await.unwrap();

        let err = store
            .create(new_user(" BOB@usant.edu", Role::Staff))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn test_unknown_lookups() {
        let store = MemoryIdentityStore::new();
        assert!(store.find_by_email("nobody@usant.edu").await.unwrap().is_none());
        assert!(store.find_by_id(&UserId::new("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_offline_store_errors() {
        let store = MemoryIdentityStore::new();
        assert!(store.health_check().await);

        store.set_online(false);
        assert!(!store.health_check().await);

        let err = store.find_by_email("x@usant.edu").await.unwrap_err();
        assert!(err.is_infrastructure());
    }

    #[tokio::test]
    async fn test_list_and_pool_reuse() {
        let store = MemoryIdentityStore::new();
        store.create(new_user("a@usant.edu", Role::Student)).await.unwrap();
        store.create(new_user("b@usant.edu", Role::Admin)).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 2);

        let status = store.pool_status();
        assert_eq!(status.in_use, 0);
        assert_eq!(status.opened, 1);
    }
}
