use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use domains::UserId;

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;

pub async fn list_members(State(state): State<AppState>, AuthUser(actor): AuthUser) -> ApiResult<Json<Value>> {
    let members = state.services.users.list_members(&actor).await?;
    Ok(Json(json!({
        "success": true,
        "count": members.len(),
        "data": members,
    })))
}

pub async fn delete_member(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<UserId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    state.services.users.delete_member(&actor, id).await?;
    Ok(Json(json!({
        "success": true,
        "data": {},
        "message": "User deleted successfully",
    })))
}
