//! # DomainError
//!
//! Centralized error handling for the task board.
//! Every port and service returns one of these kinds; the HTTP boundary
//! decides how each is rendered.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input (e.g. empty title, assignee outside the project)
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired credential
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the caller's role or authorship is insufficient
    #[error("{0}")]
    Forbidden(String),

    /// Resource absent, or deliberately masked as absent
    #[error("{resource} not found")]
    NotFound { resource: &'static str, id: String },

    /// Duplicate email, user already a member
    #[error("{0}")]
    Conflict(String),

    /// Store or infrastructure failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A specialized Result type for task board logic.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
