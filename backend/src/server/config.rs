//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::Key;
use restaurants::middleware::trace::DEFAULT_SLOW_REQUEST;
use restaurants::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) slow_request: Duration,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration backed by the in-memory store.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            bind_addr,
            slow_request: DEFAULT_SLOW_REQUEST,
            db_pool: None,
        }
    }

    /// Override the latency above which requests are logged as slow.
    #[must_use]
    pub fn with_slow_request(mut self, slow_request: Duration) -> Self {
        self.slow_request = slow_request;
        self
    }

    /// Attach a database connection pool.
    ///
    /// When provided, every repository port is served by its Diesel adapter.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
