use axum::{Json, extract::{Path, State}, http::StatusCode};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use taskhub_db::models::{Project, ProjectStatus, WorkspaceAction};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, workspace::WorkspaceId},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub is_archived: bool,
    pub updated_at: String,
}

fn to_response(p: Project) -> ProjectResponse {
    ProjectResponse {
        id: p.id.unwrap().to_hex(),
        workspace_id: p.workspace_id.to_hex(),
        name: p.name,
        description: p.description,
        status: p.status,
        is_archived: p.is_archived,
        updated_at: p.updated_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    body.validate()?;

    state
        .membership
        .authorize(workspace_id, auth.user_id, WorkspaceAction::View)
        .await?;

    let project = state
        .projects
        .create(workspace_id, body.name, body.description, auth.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(project))))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    state
        .membership
        .authorize(workspace_id, auth.user_id, WorkspaceAction::View)
        .await?;
    state.workspaces.base.find_by_id(workspace_id).await?;

    let projects = state.projects.find_by_workspace(workspace_id).await?;
    Ok(Json(projects.into_iter().map(to_response).collect()))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id)): Path<(String, String)>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let wid = ObjectId::parse_str(&workspace_id)
        .map_err(|_| ApiError::BadRequest("Invalid workspace_id".to_string()))?;
    let pid = ObjectId::parse_str(&project_id)
        .map_err(|_| ApiError::BadRequest("Invalid project_id".to_string()))?;

    state
        .membership
        .authorize(wid, auth.user_id, WorkspaceAction::View)
        .await?;

    let updated = state
        .projects
        .update(wid, pid, body.name, body.description, body.status, body.is_archived)
        .await?;
    if !updated {
        // Distinguish a no-op body from a missing project.
        state.projects.base.find_by_id_in_workspace(wid, pid).await?;
    }

    let project = state.projects.base.find_by_id_in_workspace(wid, pid).await?;
    Ok(Json(to_response(project)))
}

pub async fn archived(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    state
        .membership
        .authorize(workspace_id, auth.user_id, WorkspaceAction::View)
        .await?;
    state.workspaces.base.find_by_id(workspace_id).await?;

    let projects = state.projects.find_archived(workspace_id).await?;
    Ok(Json(projects.into_iter().map(to_response).collect()))
}
