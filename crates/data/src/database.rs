//! Postgres connection management.
//!
//! The pool is opened lazily and every caller goes through [`DatabaseClient::pool`],
//! which pings the current pool and reopens it with bounded retries when the
//! ping fails.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use fintech_monitor_core::{DatabaseConfig, MonitorError};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

const SCHEMA: &str = include_str!("../migrations/schema.sql");

const STORE_TARGET: &str = "postgres";

pub struct DatabaseClient {
    url: String,
    max_connections: u32,
    connect_attempts: u32,
    retry_delay: Duration,
    acquire_timeout: Duration,
    pool: RwLock<Option<PgPool>>,
}

impl DatabaseClient {
    /// Creates a client without connecting.
    #[must_use]
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            connect_attempts: config.connect_attempts.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            acquire_timeout: Duration::from_secs(config.acquire_timeout_secs),
            pool: RwLock::new(None),
        }
    }

    /// Establishes the pool, retrying up to the configured attempt count.
    ///
    /// # Errors
    /// Returns [`MonitorError::Connectivity`] once every attempt has failed.
    pub async fn connect(&self) -> Result<(), MonitorError> {
        self.reconnect().await.map(|_| ())
    }

    /// Returns a healthy pool, reconnecting first if the current one is stale.
    ///
    /// # Errors
    /// Returns [`MonitorError::Connectivity`] if the store cannot be reached.
    pub async fn pool(&self) -> Result<PgPool, MonitorError> {
        let current = self.pool.read().await.clone();
        if let Some(pool) = current {
            if ping(&pool).await {
                return Ok(pool);
            }
            warn!("Database connection is stale, reconnecting");
        }
        self.reconnect().await
    }

    /// Returns true if the store answers a trivial query.
    pub async fn health_check(&self) -> bool {
        self.pool().await.is_ok()
    }

    /// Creates tables and indexes if they do not exist.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable or a statement fails.
    pub async fn initialize_schema(&self) -> anyhow::Result<()> {
        let pool = self.pool().await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        info!("Database schema initialized");
        Ok(())
    }

    pub async fn close(&self) {
        if let Some(pool) = self.pool.write().await.take() {
            pool.close().await;
        }
    }

    async fn reconnect(&self) -> Result<PgPool, MonitorError> {
        let mut guard = self.pool.write().await;

        // Another caller may have reconnected while we waited for the lock.
        if let Some(pool) = guard.as_ref() {
            if ping(pool).await {
                return Ok(pool.clone());
            }
        }
        if let Some(stale) = guard.take() {
            stale.close().await;
        }

        let pool = retry_with_backoff(STORE_TARGET, self.connect_attempts, self.retry_delay, || {
            PgPoolOptions::new()
                .max_connections(self.max_connections)
                .acquire_timeout(self.acquire_timeout)
                .connect(&self.url)
        })
        .await?;

        info!("Successfully connected to PostgreSQL");
        *guard = Some(pool.clone());
        Ok(pool)
    }
}

async fn ping(pool: &PgPool) -> bool {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => true,
        Err(e) => {
            debug!("Database ping failed: {}", e);
            false
        }
    }
}

/// Runs `op` until it succeeds or `attempts` tries have failed, sleeping
/// `delay` between tries.
///
/// # Errors
/// Returns [`MonitorError::Connectivity`] carrying the last failure.
pub async fn retry_with_backoff<T, E, F, Fut>(
    target: &str,
    attempts: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, MonitorError>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(target_name = target, attempt, "Connection attempt failed: {}", e);
                last_error = e.to_string();
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    error!(target_name = target, attempts, "Failed to connect after all retries");
    Err(MonitorError::connectivity(
        target,
        format!("{attempts} attempts failed, last error: {last_error}"),
    ))
}
