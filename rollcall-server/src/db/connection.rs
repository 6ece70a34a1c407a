//! Lazily-initialized, memoized database connection
//!
//! One `ConnectionManager` is constructed at startup and owned by the store.
//! The first caller of [`ConnectionManager::ensure_connected`] starts the
//! connection attempt; callers arriving while it is in flight wait on the same
//! attempt. The outcome is kept for the life of the process: a failed attempt
//! is not retried. An attempt cancelled before finishing leaves nothing behind,
//! so the next caller starts over.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use super::error::DbError;
use super::migrations;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a request waits for a free pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the underlying connection.
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: Send + Sync;

    async fn connect(&self) -> Result<Self::Conn, sqlx::Error>;
}

/// Postgres pool connector; runs the schema bootstrap once connected.
#[derive(Debug, Clone)]
pub struct PgConnector {
    database_url: String,
    max_connections: u32,
}

impl PgConnector {
    pub fn new(database_url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections,
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Conn = PgPool;

    async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&self.database_url)
            .await?;

        migrations::run(&pool).await?;
        Ok(pool)
    }
}

/// Observable connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Connecting,
    Ready,
    Failed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memoized connection with in-flight collapse
pub struct ConnectionManager<C: Connector = PgConnector> {
    connector: C,
    /// Attempts currently running; a cancelled attempt leaves the cell empty
    in_flight: AtomicUsize,
    outcome: OnceCell<Result<C::Conn, String>>,
}

/// Decrements the in-flight count when an attempt finishes or is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            in_flight: AtomicUsize::new(0),
            outcome: OnceCell::new(),
        }
    }

    /// Return the shared connection, opening it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Unavailable`] if the (single) connection attempt failed.
    pub async fn ensure_connected(&self) -> Result<&C::Conn, DbError> {
        let outcome = self
            .outcome
            .get_or_init(|| async {
                let _attempt = InFlight::enter(&self.in_flight);
                tracing::info!("Connecting to database");

                match self.connector.connect().await {
                    Ok(conn) => {
                        tracing::info!("Database connection ready");
                        Ok(conn)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Database connection failed");
                        Err(e.to_string())
                    }
                }
            })
            .await;

        outcome
            .as_ref()
            .map_err(|reason| DbError::Unavailable(reason.clone()))
    }

    pub fn state(&self) -> ConnectionState {
        match self.outcome.get() {
            Some(Ok(_)) => ConnectionState::Ready,
            Some(Err(_)) => ConnectionState::Failed,
            None if self.in_flight.load(Ordering::Acquire) > 0 => ConnectionState::Connecting,
            None => ConnectionState::Uninitialized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// Counts attempts; optionally fails every one.
    struct FakeConnector {
        attempts: AtomicUsize,
        fail: bool,
    }

    impl FakeConnector {
        fn new(fail: bool) -> Self {
            Self {
                attempts: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl Connector for FakeConnector {
        type Conn = u32;

        async fn connect(&self) -> Result<u32, sqlx::Error> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                Err(sqlx::Error::PoolTimedOut)
            } else {
                Ok(42)
            }
        }
    }

    #[tokio::test]
    async fn starts_uninitialized() {
        let manager = ConnectionManager::new(FakeConnector::new(false));
        assert_eq!(manager.state(), ConnectionState::Uninitialized);
    }

    #[tokio::test]
    async fn connects_once_and_reuses() {
        let manager = ConnectionManager::new(FakeConnector::new(false));

        assert_eq!(*manager.ensure_connected().await.unwrap(), 42);
        assert_eq!(*manager.ensure_connected().await.unwrap(), 42);

        assert_eq!(manager.state(), ConnectionState::Ready);
        assert_eq!(manager.connector.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_attempt() {
        let manager = Arc::new(ConnectionManager::new(FakeConnector::new(false)));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { *manager.ensure_connected().await.unwrap() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.expect("task panicked"), 42);
        }
        assert_eq!(manager.connector.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reports_connecting_while_in_flight() {
        let manager = Arc::new(ConnectionManager::new(FakeConnector::new(false)));

        let pending = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.ensure_connected().await.is_ok() })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(manager.state(), ConnectionState::Connecting);

        assert!(pending.await.unwrap());
        assert_eq!(manager.state(), ConnectionState::Ready);
    }

    #[tokio::test]
    async fn cancelled_attempt_returns_to_uninitialized() {
        let manager = Arc::new(ConnectionManager::new(FakeConnector::new(false)));

        let pending = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.ensure_connected().await.is_ok() })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(manager.state(), ConnectionState::Connecting);

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert_eq!(manager.state(), ConnectionState::Uninitialized);

        // The next caller starts a fresh attempt
        assert_eq!(*manager.ensure_connected().await.unwrap(), 42);
        assert_eq!(manager.state(), ConnectionState::Ready);
        assert_eq!(manager.connector.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_is_sticky() {
        let manager = ConnectionManager::new(FakeConnector::new(true));

        let first = manager.ensure_connected().await.unwrap_err();
        let second = manager.ensure_connected().await.unwrap_err();

        assert!(matches!(first, DbError::Unavailable(_)));
        assert!(matches!(second, DbError::Unavailable(_)));
        assert_eq!(manager.state(), ConnectionState::Failed);
        assert_eq!(manager.connector.attempts.load(Ordering::SeqCst), 1);
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p rollcall-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pg_connector_bootstraps_schema() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let manager = ConnectionManager::new(PgConnector::new(url, DEFAULT_MAX_CONNECTIONS));
        let pool = manager.ensure_connected().await.expect("connect failed");

        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM courses")
            .fetch_one(pool)
            .await
            .expect("courses table missing");
        assert!(result.0 >= 0);
    }
}
