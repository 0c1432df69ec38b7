use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use domains::{CommentId, NewComment, TaskId};

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EditComment {
    #[serde(default)]
    content: String,
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    path: Result<Path<TaskId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(task_id) = path?;
    let comments = state.services.comments.list_for_task(task_id).await?;
    Ok(Json(json!({ "comments": comments })))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<TaskId>, PathRejection>,
    body: Result<Json<NewComment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Path(task_id) = path?;
    let Json(input) = body?;
    let comment = state.services.comments.create(actor.id, task_id, input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "comment": comment }))))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<CommentId>, PathRejection>,
    body: Result<Json<EditComment>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let Json(edit) = body?;
    let comment = state.services.comments.update(actor.id, id, &edit.content).await?;
    Ok(Json(json!({ "comment": comment })))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<CommentId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let removed = state.services.comments.delete(actor.id, id).await?;
    Ok(Json(json!({ "message": "Comment deleted successfully", "deleted": removed })))
}
