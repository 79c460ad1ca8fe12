//! Backend entry-point: loads settings, selects storage, and serves the API.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use restaurants::inbound::http::health::HealthState;
use restaurants::inbound::http::session_config::{BuildMode, load_session_key};
use restaurants::outbound::persistence::{DbPool, PoolConfig, run_migrations_async};
use restaurants::settings::ServerSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|err| io::Error::other(format!("failed to load settings: {err}")))?;
    let key = load_session_key(
        &settings.session_key_file(),
        BuildMode::from_debug_assertions(),
    )
    .map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;

    let mut config = ServerConfig::new(key, settings.cookie_secure, bind_addr)
        .with_slow_request(settings.slow_request());
    if let Some(url) = settings.database_url() {
        if settings.run_migrations {
            run_migrations_async(url.to_owned())
                .await
                .map_err(io::Error::other)?;
        }
        let pool_config = PoolConfig::new(url)
            .with_max_size(settings.db_max_connections)
            .with_checkout_timeout(settings.db_checkout_timeout());
        let pool = DbPool::new(pool_config)
            .await
            .map_err(io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");

    let drain_state = health_state.clone();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            drain_state.mark_unhealthy();
        }
    });

    server.await
}
