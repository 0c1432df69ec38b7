//! Creates the first global owner so that projects can be created on a fresh
//! install. Reads `SEED_OWNER_NAME`, `SEED_OWNER_EMAIL` and
//! `SEED_OWNER_PASSWORD`; an existing account is reported and left alone.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use auth_adapters::{Argon2Hasher, JwtCredentials};
use configs::Settings;
use domains::{DomainError, GlobalRole};
use services::{AuthService, SignupRequest};
use storage_adapters::PgStore;

fn required(key: &str) -> anyhow::Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("{key} must be set"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log.level))
        .init();

    let request = SignupRequest {
        name: required("SEED_OWNER_NAME")?,
        email: required("SEED_OWNER_EMAIL")?,
        password: required("SEED_OWNER_PASSWORD")?,
    };

    let store = PgStore::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await?;
    store.migrate().await?;

    let ttl = i64::try_from(settings.auth.token_ttl_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .context("auth.token_ttl_secs is out of range")?;
    let auth = AuthService::new(
        Arc::new(store),
        Arc::new(Argon2Hasher::new()),
        Arc::new(JwtCredentials::new(
            settings.auth.jwt_secret.expose_secret().as_bytes(),
            ttl,
        )),
    );

    match auth.register(request, GlobalRole::Owner).await {
        Ok(session) => {
            tracing::info!(user = %session.user.id, email = %session.user.email, "owner account created");
        }
        Err(DomainError::Conflict(_)) => {
            tracing::info!("owner account already exists, nothing to do");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
