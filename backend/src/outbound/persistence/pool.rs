//! Shared bb8 pool of `diesel-async` PostgreSQL connections.
//!
//! Every Diesel adapter checks a connection out per call. A checkout that
//! times out is reported as [`PoolError::Checkout`], which the adapters turn
//! into their port's `Connection` error.

use std::fmt;
use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tracing::info;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Sizing and timeouts for the connection pool.
///
/// `Debug` output hides any credentials embedded in the URL.
///
/// # Example
///
/// ```ignore
/// let config = PoolConfig::new("postgres://restaurants@localhost/restaurants")
///     .with_max_size(20)
///     .with_checkout_timeout(Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Ten connections, two kept warm, and a five second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            min_idle: 2,
            checkout_timeout: Duration::from_secs(5),
        }
    }

    /// Upper bound on open connections. Zero is raised to one.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// How long a repository call waits for a free connection before the
    /// store is reported unavailable.
    #[must_use]
    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    /// Get the database URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Warm connections never exceed the pool size.
    fn min_idle(&self) -> u32 {
        self.min_idle.min(self.max_size)
    }

    fn redacted_url(&self) -> String {
        match self.database_url.split_once('@') {
            Some((scheme_and_user, host)) => {
                let scheme = scheme_and_user
                    .split_once("://")
                    .map_or("", |(scheme, _)| scheme);
                format!("{scheme}://***@{host}")
            }
            None => self.database_url.clone(),
        }
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("database_url", &self.redacted_url())
            .field("max_size", &self.max_size)
            .field("min_idle", &self.min_idle())
            .field("checkout_timeout", &self.checkout_timeout)
            .finish()
    }
}

/// Cloneable handle to the connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool, opening the warm connections up front.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` when the URL is malformed or the warm
    /// connections cannot be opened.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle()))
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        info!(config = ?config, "database pool ready");

        Ok(Self { inner: pool })
    }

    /// Check a connection out of the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` if a connection cannot be obtained within
    /// the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
