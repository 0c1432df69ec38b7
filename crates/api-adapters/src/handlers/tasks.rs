use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use domains::{NewTask, ProjectId, ReorderEntry, TaskId, TaskPatch};

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;

/// Clients send either a bare array or `{ "tasks": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReorderBody {
    Entries(Vec<ReorderEntry>),
    Wrapped { tasks: Vec<ReorderEntry> },
}

impl ReorderBody {
    fn into_entries(self) -> Vec<ReorderEntry> {
        match self {
            Self::Entries(entries) | Self::Wrapped { tasks: entries } => entries,
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    body: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(input) = body?;
    let task = state.services.tasks.create(actor.id, input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "task": task }))))
}

pub async fn list_by_project(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<ProjectId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(project_id) = path?;
    let tasks = state.services.tasks.list_by_project(actor.id, project_id).await?;
    Ok(Json(json!({ "tasks": tasks })))
}

pub async fn list_all(State(state): State<AppState>, AuthUser(actor): AuthUser) -> ApiResult<Json<Value>> {
    let tasks = state.services.tasks.list_all_for_user(actor.id).await?;
    Ok(Json(json!({ "tasks": tasks })))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<TaskId>, PathRejection>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let Json(patch) = body?;
    let task = state.services.tasks.update(actor.id, id, patch).await?;
    Ok(Json(json!({ "task": task })))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<TaskId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    state.services.tasks.delete(actor.id, id).await?;
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

pub async fn reorder(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    body: Result<Json<ReorderBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    state.services.tasks.reorder(actor.id, body.into_entries()).await?;
    Ok(Json(json!({ "success": true, "message": "Tasks reordered successfully" })))
}
