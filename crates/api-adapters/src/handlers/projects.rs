use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use domains::{NewProject, PageRequest, ProjectId, ProjectPatch};

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddMemberRequest {
    #[serde(default, rename = "memberEmail")]
    member_email: String,
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    body: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(input) = body?;
    let project = state.services.projects.create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": project }))))
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let request = PageRequest::parse(params.page.as_deref(), params.limit.as_deref());
    let page = state.services.projects.list_for_user(actor.id, request).await?;
    Ok(Json(json!({
        "success": true,
        "data": page.items,
        "pagination": page.pagination,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<ProjectId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let project = state.services.projects.get(actor.id, id).await?;
    Ok(Json(json!({ "project": project })))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<ProjectId>, PathRejection>,
    body: Result<Json<ProjectPatch>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let Json(patch) = body?;
    let project = state.services.projects.update(actor.id, id, patch).await?;
    Ok(Json(json!({ "project": project })))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<ProjectId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    state.services.projects.delete(actor.id, id).await?;
    Ok(Json(json!({ "success": true, "message": "Project deleted successfully" })))
}

pub async fn add_member(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<ProjectId>, PathRejection>,
    body: Result<Json<AddMemberRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let Json(req) = body?;
    let project = state
        .services
        .projects
        .add_member(actor.id, id, &req.member_email)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Member added successfully",
        "project": project,
    })))
}
