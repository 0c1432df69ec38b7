//! taskboard/crates/configs/src/lib.rs
//!
//! Layered runtime settings: built-in defaults, then `config/default.toml`,
//! then `config/{APP_ENV}.toml`, then `TASKBOARD__*` environment variables
//! (`TASKBOARD__SERVER__PORT=8080`, `TASKBOARD__AUTH__JWT_SECRET=...`).

use std::collections::HashMap;

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

const ENV_PREFIX: &str = "TASKBOARD";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub policy: PolicySettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(deserialize_with = "secret")]
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    #[serde(deserialize_with = "secret")]
    pub jwt_secret: SecretString,
    /// Lifetime of issued tokens.
    pub token_ttl_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PolicySettings {
    /// Only global owners may create projects.
    pub restrict_project_creation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `taskboard=debug,sqlx=warn`.
    pub level: String,
    pub format: LogFormat,
}

fn secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, SettingsError> {
    Ok(Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("database.url", "postgres://localhost/taskboard")?
        .set_default("database.max_connections", 10)?
        .set_default("auth.jwt_secret", "")?
        .set_default("auth.token_ttl_secs", 7 * 24 * 60 * 60)?
        .set_default("policy.restrict_project_creation", true)?
        .set_default("log.level", "info")?
        .set_default("log.format", "json")?)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Loads `.env` (if present) and every configuration layer.
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(environment())
            .build()?;

        let settings = Self::finish(config)?;
        tracing::debug!(env = %app_env, port = settings.server.port, "settings loaded");
        Ok(settings)
    }

    /// Builds settings from defaults plus the given variables only, ignoring
    /// the process environment and config files.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, SettingsError> {
        let config = defaults()?
            .add_source(environment().source(Some(vars)))
            .build()?;
        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self, SettingsError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(SettingsError::Invalid(format!(
                "{ENV_PREFIX}__AUTH__JWT_SECRET must be set"
            )));
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(SettingsError::Invalid(
                "auth.token_ttl_secs must be positive".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(SettingsError::Invalid(
                "database.max_connections must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let settings =
            Settings::from_vars(vars(&[("TASKBOARD__AUTH__JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.auth.token_ttl_secs, 604_800);
        assert!(settings.policy.restrict_project_creation);
        assert_eq!(settings.log.format, LogFormat::Json);
        assert_eq!(settings.auth.jwt_secret.expose_secret(), "s3cret");
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = Settings::from_vars(vars(&[
            ("TASKBOARD__AUTH__JWT_SECRET", "s3cret"),
            ("TASKBOARD__SERVER__PORT", "9000"),
            ("TASKBOARD__POLICY__RESTRICT_PROJECT_CREATION", "false"),
            ("TASKBOARD__LOG__FORMAT", "pretty"),
        ]))
        .unwrap();

        assert_eq!(settings.server.bind_addr(), "0.0.0.0:9000");
        assert!(!settings.policy.restrict_project_creation);
        assert_eq!(settings.log.format, LogFormat::Pretty);
    }

    #[test]
    fn missing_secret_is_rejected() {
        let err = Settings::from_vars(HashMap::new()).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let settings =
            Settings::from_vars(vars(&[("TASKBOARD__AUTH__JWT_SECRET", "s3cret")])).unwrap();
        assert!(!format!("{settings:?}").contains("s3cret"));
    }
}
