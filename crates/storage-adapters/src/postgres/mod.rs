//! # PostgreSQL store
//!
//! Maps the relational schema in `migrations/` onto the domain models.
//! Project members live in their own table; every multi-row write runs in a
//! transaction.

mod comments;
mod projects;
mod tasks;
mod users;

use domains::DomainError;
use sqlx::postgres::{PgPool, PgPoolOptions};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Unique violations become `Conflict`; everything else is an internal
/// failure whose details stay in the log.
pub(crate) fn db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DomainError::Conflict("Email already registered".to_string());
        }
    }
    tracing::error!(error = %err, "database error");
    DomainError::internal("database operation failed")
}

pub(crate) fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
