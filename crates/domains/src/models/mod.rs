//! # Domain Models
//!
//! These structs represent the core entities of the task board.
//! We use UUID v7 for time-ordered, globally unique identification.

pub mod comment;
pub mod ids;
pub mod page;
pub mod project;
pub mod task;
pub mod user;

pub use comment::*;
pub use ids::*;
pub use page::*;
pub use project::*;
pub use task::*;
pub use user::*;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) when deserializing partial updates.
///
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Like [`double_option`] for id fields, but a blank string also counts as
/// an explicit clear (`Some(None)`).
pub fn nullable_id<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(de)? {
        None => Ok(Some(None)),
        Some(raw) if raw.trim().is_empty() => Ok(Some(None)),
        Some(raw) => raw.parse().map(|id| Some(Some(id))).map_err(D::Error::custom),
    }
}
