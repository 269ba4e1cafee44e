use axum::{Json, extract::{Path, State}, http::StatusCode};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use taskhub_db::models::{Task, TaskPriority, TaskStatus, WorkspaceAction};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, workspace::WorkspaceId},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub assignee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub workspace_id: String,
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub is_archived: bool,
    pub updated_at: String,
}

fn to_response(t: Task) -> TaskResponse {
    TaskResponse {
        id: t.id.unwrap().to_hex(),
        workspace_id: t.workspace_id.to_hex(),
        project_id: t.project_id.to_hex(),
        title: t.title,
        description: t.description,
        status: t.status,
        priority: t.priority,
        is_archived: t.is_archived,
        updated_at: t.updated_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id)): Path<(String, String)>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    body.validate()?;

    let wid = ObjectId::parse_str(&workspace_id)
        .map_err(|_| ApiError::BadRequest("Invalid workspace_id".to_string()))?;
    let pid = ObjectId::parse_str(&project_id)
        .map_err(|_| ApiError::BadRequest("Invalid project_id".to_string()))?;

    state
        .membership
        .authorize(wid, auth.user_id, WorkspaceAction::View)
        .await?;

    // Task must land in an existing project of this workspace.
    state.projects.base.find_by_id_in_workspace(wid, pid).await?;

    let assignee_id = body
        .assignee_id
        .as_deref()
        .map(ObjectId::parse_str)
        .transpose()
        .map_err(|_| ApiError::BadRequest("Invalid assignee_id".to_string()))?;

    let task = state
        .tasks
        .create(
            wid,
            pid,
            body.title,
            body.description,
            body.priority,
            assignee_id,
            auth.user_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(task))))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id)): Path<(String, String)>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let wid = ObjectId::parse_str(&workspace_id)
        .map_err(|_| ApiError::BadRequest("Invalid workspace_id".to_string()))?;
    let pid = ObjectId::parse_str(&project_id)
        .map_err(|_| ApiError::BadRequest("Invalid project_id".to_string()))?;

    state
        .membership
        .authorize(wid, auth.user_id, WorkspaceAction::View)
        .await?;
    state.projects.base.find_by_id_in_workspace(wid, pid).await?;

    let tasks = state.tasks.find_by_project(pid).await?;
    Ok(Json(tasks.into_iter().map(to_response).collect()))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, task_id)): Path<(String, String)>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let wid = ObjectId::parse_str(&workspace_id)
        .map_err(|_| ApiError::BadRequest("Invalid workspace_id".to_string()))?;
    let tid = ObjectId::parse_str(&task_id)
        .map_err(|_| ApiError::BadRequest("Invalid task_id".to_string()))?;

    state
        .membership
        .authorize(wid, auth.user_id, WorkspaceAction::View)
        .await?;

    let updated = state
        .tasks
        .update(
            wid,
            tid,
            body.title,
            body.description,
            body.status,
            body.priority,
            body.is_archived,
        )
        .await?;
    if !updated {
        state.tasks.base.find_by_id_in_workspace(wid, tid).await?;
    }

    let task = state.tasks.base.find_by_id_in_workspace(wid, tid).await?;
    Ok(Json(to_response(task)))
}

pub async fn archived(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    state
        .membership
        .authorize(workspace_id, auth.user_id, WorkspaceAction::View)
        .await?;
    state.workspaces.base.find_by_id(workspace_id).await?;

    let tasks = state.tasks.find_archived(workspace_id).await?;
    Ok(Json(tasks.into_iter().map(to_response).collect()))
}
