//! taskboard/crates/api-adapters/src/lib.rs
//!
//! HTTP surface of the task board. Handlers stay thin: decode the request,
//! call one service, shape the JSON body. Every rule lives in `services`.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod routes;
#[cfg(feature = "web-axum")]
pub mod state;

pub use metrics::Metrics;

#[cfg(feature = "web-axum")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "web-axum")]
pub use routes::router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
