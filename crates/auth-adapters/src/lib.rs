//! # auth-adapters
//!
//! Password hashing (Argon2) and signed credentials (JWT, feature
//! `auth-jwt`) behind the `domains` identity ports.

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtCredentials;
