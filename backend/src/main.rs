//! Backend entry-point: loads configuration, builds the database pool and
//! serves the clinic API.

mod server;

use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use clinic_backend::config::AppSettings;
use clinic_backend::inbound::http::session_config::fingerprint::key_fingerprint;
use clinic_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use clinic_backend::outbound::persistence::DbPool;

use server::{ServerConfig, create_server, health_state_for};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("load configuration")?;
    let bind_addr = settings.bind_addr()?;
    let pool_config = settings.pool_config()?;

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        ttl_secs = session.ttl.as_secs(),
        "session key loaded"
    );

    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("create database pool")?;
    let health_state = health_state_for(&pool);
    let server = create_server(health_state, ServerConfig::new(session, bind_addr, pool))
        .wrap_err_with(|| format!("bind {bind_addr}"))?;

    info!(%bind_addr, "clinic backend listening");
    server.await.wrap_err("server terminated")
}
