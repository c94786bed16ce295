//! Backend entry-point: loads settings, applies migrations, wires adapters,
//! and serves the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use backend::outbound::cache::RedisTokenStore;
use backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ForumSettings, ServerConfig, build_http_state, create_server, production_adapters};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ForumSettings::load()
        .map_err(|error| std::io::Error::other(format!("load settings: {error}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let database_url = settings.database_url().map_err(std::io::Error::other)?;
    let redis_url = settings.redis_url().map_err(std::io::Error::other)?;

    let applied = run_pending_migrations(database_url)
        .await
        .map_err(std::io::Error::other)?;
    info!(applied, "database schema up to date");

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(std::io::Error::other)?;
    let tokens = RedisTokenStore::connect(redis_url, settings.pool_max_size())
        .await
        .map_err(std::io::Error::other)?;

    let http_state = build_http_state(
        production_adapters(&pool, tokens),
        Arc::new(DefaultClock),
        settings.reset_link_base(),
    );
    let bind_addr = settings.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        ServerConfig::new(session, bind_addr, http_state),
    )?;
    info!(%bind_addr, "forum backend listening");
    server.await
}
