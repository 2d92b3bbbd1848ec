// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Scoped connection pool.
//!
//! Connections are checked out with [`ConnectionPool::acquire`] and returned
//! automatically when the [`PooledConnection`] guard is dropped. Every
//! checkout starts a watchdog task that logs once if the connection is held
//! longer than [`PoolConfig::checkout_warn_after`]; the watchdog never fails
//! or reclaims the connection.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// ManageConnection
// =============================================================================

/// Opens connections for a [`ConnectionPool`].
#[async_trait]
pub trait ManageConnection: Send + Sync + 'static {
    /// The connection type handed out by the pool.
    type Connection: Send + 'static;

    /// Opens a new connection.
    async fn connect(&self) -> CoreResult<Self::Connection>;

    /// Returns `true` if the connection must not be returned to the pool.
    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

// =============================================================================
// PoolConfig
// =============================================================================

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections checked out at once.
    pub max_size: usize,
    /// How long `acquire` waits for a free slot.
    pub acquire_timeout: Duration,
    /// Hold time after which the watchdog logs an overrun.
    pub checkout_warn_after: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 20,
            acquire_timeout: Duration::from_secs(2),
            checkout_warn_after: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    /// Sets the maximum pool size.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Sets the acquire timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Sets the checkout overrun threshold.
    pub fn with_checkout_warn_after(mut self, threshold: Duration) -> Self {
        self.checkout_warn_after = threshold;
        self
    }
}

// =============================================================================
// PoolStatus
// =============================================================================

/// Point-in-time pool statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Configured maximum size.
    pub max_size: usize,
    /// Connections currently checked out.
    pub in_use: usize,
    /// Idle connections ready for reuse.
    pub idle: usize,
    /// Connections opened over the pool's lifetime.
    pub opened: usize,
    /// Checkouts that exceeded the hold-time threshold.
    pub overruns: u64,
}

// =============================================================================
// ConnectionPool
// =============================================================================

struct PoolInner<M: ManageConnection> {
    manager: M,
    config: PoolConfig,
    idle: Mutex<Vec<M::Connection>>,
    semaphore: Arc<Semaphore>,
    opened: AtomicUsize,
    overruns: Arc<AtomicU64>,
}

/// Bounded pool of connections with RAII checkout.
pub struct ConnectionPool<M: ManageConnection> {
    inner: Arc<PoolInner<M>>,
}

impl<M: ManageConnection> Clone for ConnectionPool<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M: ManageConnection> ConnectionPool<M> {
    /// Creates a pool. Connections are opened lazily.
    pub fn new(manager: M, config: PoolConfig) -> Self {
        let permits = config.max_size.max(1);
        Self {
            inner: Arc::new(PoolInner {
                manager,
                semaphore: Arc::new(Semaphore::new(permits)),
                config,
                idle: Mutex::new(Vec::new()),
                opened: AtomicUsize::new(0),
                overruns: Arc::new(AtomicU64::new(0)),
            }),
        }
    }

    /// Checks out a connection, waiting up to the acquire timeout.
    pub async fn acquire(&self) -> CoreResult<PooledConnection<M>> {
        let timeout = self.inner.config.acquire_timeout;
        let permit = match tokio::time::timeout(
            timeout,
            self.inner.semaphore.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(CoreError::PoolClosed),
            Err(_) => {
                tracing::warn!(timeout = ?timeout, "Timed out waiting for a pooled connection");
                return Err(CoreError::PoolTimeout { timeout });
            }
        };

        let reused = self.inner.idle.lock().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => {
                let conn = self.inner.manager.connect().await?;
                let opened = self.inner.opened.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!(opened, "Opened pooled connection");
                conn
            }
        };

        Ok(PooledConnection {
            conn: Some(conn),
            pool: self.inner.clone(),
            watchdog: spawn_watchdog(
                self.inner.config.checkout_warn_after,
                self.inner.overruns.clone(),
            ),
            checked_out_at: Instant::now(),
            _permit: permit,
        })
    }

    /// Closes the pool. Pending and future acquisitions fail with
    /// [`CoreError::PoolClosed`]; checked-out connections are discarded on
    /// release.
    pub fn close(&self) {
        self.inner.semaphore.close();
        self.inner.idle.lock().clear();
        tracing::info!("Connection pool closed");
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.semaphore.is_closed()
    }

    /// Returns current pool statistics.
    pub fn status(&self) -> PoolStatus {
        let max_size = self.inner.config.max_size.max(1);
        let in_use = if self.is_closed() {
            0
        } else {
            max_size - self.inner.semaphore.available_permits()
        };
        PoolStatus {
            max_size,
            in_use,
            idle: self.inner.idle.lock().len(),
            opened: self.inner.opened.load(Ordering::Relaxed),
            overruns: self.inner.overruns.load(Ordering::Relaxed),
        }
    }

    /// Returns the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }
}

fn spawn_watchdog(threshold: Duration, overruns: Arc<AtomicU64>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(threshold).await;
        overruns.fetch_add(1, Ordering::Relaxed);
        tracing::error!(
            threshold = ?threshold,
            "A connection has been checked out for longer than the configured threshold"
        );
    })
}

// =============================================================================
// PooledConnection
// =============================================================================

/// A checked-out connection. Returned to the pool on drop.
pub struct PooledConnection<M: ManageConnection> {
    conn: Option<M::Connection>,
    pool: Arc<PoolInner<M>>,
    watchdog: JoinHandle<()>,
    checked_out_at: Instant,
    _permit: OwnedSemaphorePermit,
}

impl<M: ManageConnection> PooledConnection<M> {
    /// Returns how long this connection has been checked out.
    pub fn held_for(&self) -> Duration {
        self.checked_out_at.elapsed()
    }
}

impl<M: ManageConnection> Deref for PooledConnection<M> {
    type Target = M::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect("connection is present until drop")
    }
}

impl<M: ManageConnection> DerefMut for PooledConnection<M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection is present until drop")
    }
}

impl<M: ManageConnection> Drop for PooledConnection<M> {
    fn drop(&mut self) {
        self.watchdog.abort();

        let Some(mut conn) = self.conn.take() else {
            return;
        };
        if self.pool.semaphore.is_closed() || self.pool.manager.has_broken(&mut conn) {
            return;
        }
        self.pool.idle.lock().push(conn);
        tracing::trace!(held_for = ?self.checked_out_at.elapsed(), "Connection released");
    }
}

// =============================================================================
// Tests
// =============================================================================
