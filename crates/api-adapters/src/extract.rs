//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use domains::Actor;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller behind a verified bearer token. Tokens for accounts that no
/// longer exist are rejected.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Actor);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts).ok_or_else(|| ApiError::unauthorized("Authorization token missing"))?;
        let actor = state.services.auth.authenticate(token).await?;
        Ok(Self(actor))
    }
}
