use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use services::{LoginRequest, Session, SignupRequest};

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;

pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let Json(req) = body?;
    let session = state.services.auth.signup(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let Json(req) = body?;
    Ok(Json(state.services.auth.login(req).await?))
}

pub async fn user_info(State(state): State<AppState>, AuthUser(actor): AuthUser) -> ApiResult<Json<Value>> {
    let user = state.services.auth.current_user(&actor).await?;
    Ok(Json(json!({ "user": user })))
}
