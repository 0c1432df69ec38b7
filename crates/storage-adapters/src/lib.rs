//! taskboard/crates/storage-adapters/src/lib.rs
//!
//! Implementations of the repository ports.
//!
//! - [`memory::MemoryStore`]: always compiled; used by tests and by the
//!   server when no database feature is enabled.
//! - `postgres::PgStore`: behind the `db-postgres` feature.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
