//! # taskboard
//!
//! Server entry point. Adapters are chosen by compile-time features and
//! handed to the services as trait objects.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use api_adapters::{router, AppState};
use auth_adapters::{Argon2Hasher, JwtCredentials};
use configs::{LogFormat, LogSettings, Settings};
use services::{Ports, ServiceOptions, Services};

#[cfg(feature = "db-postgres")]
use storage_adapters::PgStore;
#[cfg(not(feature = "db-postgres"))]
use storage_adapters::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let ports = build_ports(&settings).await?;
    let services = Services::new(
        ports,
        ServiceOptions {
            restrict_project_creation: settings.policy.restrict_project_creation,
        },
    );
    let app = router(AppState::new(services));

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "taskboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("taskboard stopped");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn build_ports(settings: &Settings) -> anyhow::Result<Ports> {
    let ttl = i64::try_from(settings.auth.token_ttl_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .context("auth.token_ttl_secs is out of range")?;
    let credentials = Arc::new(JwtCredentials::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        ttl,
    ));
    let hasher = Arc::new(Argon2Hasher::new());

    #[cfg(feature = "db-postgres")]
    let store = {
        let store = PgStore::connect(
            settings.database.url.expose_secret(),
            settings.database.max_connections,
        )
        .await?;
        store.migrate().await?;
        tracing::info!("connected to postgres");
        Arc::new(store)
    };

    #[cfg(not(feature = "db-postgres"))]
    let store = {
        tracing::warn!("db-postgres disabled, data is kept in memory only");
        Arc::new(MemoryStore::new())
    };

    Ok(Ports {
        users: store.clone(),
        projects: store.clone(),
        tasks: store.clone(),
        comments: store,
        hasher,
        credentials,
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown requested");
}
