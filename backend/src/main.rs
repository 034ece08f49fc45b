//! Backend entry-point: loads settings, opens the registry and serves the
//! REST API with OpenAPI docs in debug builds.

mod server;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use corridor::domain::{Role, UserDraft};
use corridor::inbound::http::health::HealthState;
use corridor::inbound::http::session_config::fingerprint::key_fingerprint;
use corridor::inbound::http::session_config::{BuildMode, session_settings_from_env};
use corridor::inbound::http::state::HttpState;
use corridor::outbound::persistence::{DbPool, PoolConfig, run_migrations};

use server::{CorridorSettings, ServerConfig, build_http_state, create_server};

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

    let settings = CorridorSettings::load().wrap_err("failed to load settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let pool = connect_database(&settings).await?;
    let http_state = build_http_state(pool.as_ref())
        .await
        .wrap_err("failed to open registry")?;
    bootstrap_central_user(&http_state, &settings).await?;

    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;
    #[cfg(not(feature = "metrics"))]
    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    );
    #[cfg(feature = "metrics")]
    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        PrometheusMetricsBuilder::new("corridor")
            .endpoint("/metrics")
            .build()
            .map_err(|e| eyre!("failed to configure Prometheus metrics: {e}"))?,
    );

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting HTTP server");
    create_server(health_state, http_state, config)?
        .await
        .wrap_err("HTTP server failed")
}

async fn connect_database(settings: &CorridorSettings) -> Result<Option<DbPool>> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(None);
    };
    run_migrations(url)
        .await
        .wrap_err("failed to apply database migrations")?;
    let pool = DbPool::new(
        PoolConfig::new(url)
            .with_max_size(settings.db_pool_size())
            .with_connection_timeout(settings.db_connect_timeout()),
    )
    .await
    .wrap_err("failed to build database pool")?;
    Ok(Some(pool))
}

async fn bootstrap_central_user(state: &HttpState, settings: &CorridorSettings) -> Result<()> {
    let Some(bootstrap) = settings.bootstrap_user() else {
        return Ok(());
    };
    let draft = UserDraft::new(
        bootstrap.username,
        bootstrap.full_name,
        None,
        Role::Central,
        bootstrap.password,
    )
    .map_err(|e| eyre!("invalid bootstrap user: {e}"))?;
    match state.corridor.bootstrap_central_user(draft).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            info!(username = bootstrap.username, "bootstrap user already exists");
            Ok(())
        }
        Err(e) => Err(eyre!("failed to create bootstrap user: {e}")),
    }
}
