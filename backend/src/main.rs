//! Eventora entry point: loads configuration, prepares storage and serves
//! the `/api` routes.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use backend::outbound::persistence::{DbPool, run_migrations};
use server::{ServerConfig, ServerSettings, create_server};

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

    let settings =
        ServerSettings::load().map_err(|err| eyre!("failed to load server settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    );
    let mut health = HealthState::new();
    match settings.pool_config() {
        Some(pool_config) => {
            if settings.run_migrations() {
                run_migrations(pool_config.database_url())
                    .await
                    .wrap_err("failed to apply migrations")?;
            }
            let pool = DbPool::new(pool_config)
                .await
                .wrap_err("failed to open database pool")?;
            health = health.with_pool(pool.clone());
            config = config.with_db_pool(pool);
        }
        None => warn!("EVENTORA_DATABASE_URL is not set"),
    }

    let bind_addr = config.bind_addr();
    let server = create_server(web::Data::new(health), config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "server listening");
    server.await.wrap_err("server terminated abnormally")?;
    info!("server stopped");
    Ok(())
}
