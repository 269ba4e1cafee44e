use axum::{Json, extract::State, http::StatusCode};
use bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use taskhub_db::models::{
    ProjectStatus, TaskStatus, Workspace, WorkspaceAction, WorkspaceMember,
};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, workspace::WorkspaceId},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkspaceRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferOwnershipRequest {
    #[serde(alias = "newOwnerId")]
    pub new_owner_id: String,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub joined_at: String,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceDetailsResponse {
    #[serde(flatten)]
    pub workspace: WorkspaceResponse,
    pub members: Vec<MemberResponse>,
}

pub(crate) fn to_response(w: Workspace) -> WorkspaceResponse {
    WorkspaceResponse {
        id: w.id.unwrap().to_hex(),
        name: w.name,
        description: w.description,
        color: w.color,
        owner_id: w.owner_id.to_hex(),
        created_at: w.created_at.try_to_rfc3339_string().unwrap_or_default(),
        updated_at: w.updated_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateWorkspaceRequest>,
) -> Result<(StatusCode, Json<WorkspaceDetailsResponse>), ApiError> {
    body.validate()?;

    let workspace = state
        .membership
        .create_workspace(auth.user_id, body.name, body.description, body.color)
        .await?;

    let workspace_id = workspace.id.unwrap();
    let members = state.workspaces.find_members(workspace_id).await?;
    let members = resolve_members(&state, workspace.owner_id, members).await?;

    Ok((
        StatusCode::CREATED,
        Json(WorkspaceDetailsResponse {
            workspace: to_response(workspace),
            members,
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<WorkspaceResponse>>, ApiError> {
    let workspaces = state.workspaces.find_user_workspaces(auth.user_id).await?;
    Ok(Json(workspaces.into_iter().map(to_response).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
) -> Result<Json<WorkspaceDetailsResponse>, ApiError> {
    state
        .membership
        .authorize(workspace_id, auth.user_id, WorkspaceAction::View)
        .await?;

    let workspace = state.workspaces.base.find_by_id(workspace_id).await?;
    let members = state.workspaces.find_members(workspace_id).await?;
    let members = resolve_members(&state, workspace.owner_id, members).await?;

    Ok(Json(WorkspaceDetailsResponse {
        workspace: to_response(workspace),
        members,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
    Json(body): Json<UpdateWorkspaceRequest>,
) -> Result<Json<WorkspaceResponse>, ApiError> {
    state
        .membership
        .authorize(workspace_id, auth.user_id, WorkspaceAction::UpdateWorkspace)
        .await?;

    if let Some(ref name) = body.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".to_string()));
        }
    }

    state
        .workspaces
        .update_details(workspace_id, body.name, body.description, body.color)
        .await?;

    let workspace = state.workspaces.base.find_by_id(workspace_id).await?;
    Ok(Json(to_response(workspace)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .membership
        .delete_workspace(workspace_id, auth.user_id)
        .await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn transfer_ownership(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
    Json(body): Json<TransferOwnershipRequest>,
) -> Result<Json<WorkspaceResponse>, ApiError> {
    let new_owner_id = ObjectId::parse_str(&body.new_owner_id)
        .map_err(|_| ApiError::BadRequest("Invalid new_owner_id".to_string()))?;

    let workspace = state
        .membership
        .transfer_ownership(workspace_id, auth.user_id, new_owner_id)
        .await?;

    Ok(Json(to_response(workspace)))
}

pub async fn members(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    state
        .membership
        .authorize(workspace_id, auth.user_id, WorkspaceAction::View)
        .await?;

    let workspace = state.workspaces.base.find_by_id(workspace_id).await?;
    let members = state.workspaces.find_members(workspace_id).await?;
    Ok(Json(resolve_members(&state, workspace.owner_id, members).await?))
}

pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .membership
        .authorize(workspace_id, auth.user_id, WorkspaceAction::View)
        .await?;
    state.workspaces.base.find_by_id(workspace_id).await?;

    let total_projects = state
        .projects
        .base
        .count(doc! { "workspace_id": workspace_id, "is_archived": false })
        .await?;
    let active_projects = state
        .projects
        .count_by_status(workspace_id, ProjectStatus::Active)
        .await?;
    let completed_projects = state
        .projects
        .count_by_status(workspace_id, ProjectStatus::Completed)
        .await?;

    let total_tasks = state
        .tasks
        .base
        .count(doc! { "workspace_id": workspace_id, "is_archived": false })
        .await?;
    let todo_tasks = state
        .tasks
        .count_by_status(workspace_id, TaskStatus::Todo)
        .await?;
    let in_progress_tasks = state
        .tasks
        .count_by_status(workspace_id, TaskStatus::InProgress)
        .await?;
    let done_tasks = state
        .tasks
        .count_by_status(workspace_id, TaskStatus::Done)
        .await?;
    let total_members = state
        .workspaces
        .members
        .count(doc! { "workspace_id": workspace_id })
        .await?;

    Ok(Json(serde_json::json!({
        "projects": {
            "total": total_projects,
            "active": active_projects,
            "completed": completed_projects,
        },
        "tasks": {
            "total": total_tasks,
            "todo": todo_tasks,
            "in_progress": in_progress_tasks,
            "done": done_tasks,
        },
        "members": total_members,
    })))
}

/// Joins member records with their user documents so listings carry
/// name and email. Roles are derived against `owner_id`, the
/// authoritative owner reference.
async fn resolve_members(
    state: &AppState,
    owner_id: ObjectId,
    members: Vec<WorkspaceMember>,
) -> Result<Vec<MemberResponse>, ApiError> {
    let user_ids: Vec<ObjectId> = members.iter().map(|m| m.user_id).collect();
    let users = if user_ids.is_empty() {
        Vec::new()
    } else {
        state
            .users
            .base
            .find_many(doc! { "_id": { "$in": user_ids } }, None)
            .await?
    };

    Ok(members
        .into_iter()
        .map(|m| {
            let user = users.iter().find(|u| u.id == Some(m.user_id));
            MemberResponse {
                id: m.id.unwrap().to_hex(),
                user_id: m.user_id.to_hex(),
                name: user.map(|u| u.name.clone()).unwrap_or_default(),
                email: user.map(|u| u.email.clone()).unwrap_or_default(),
                role: m.effective_role(owner_id).as_str().to_string(),
                joined_at: m.joined_at.try_to_rfc3339_string().unwrap_or_default(),
            }
        })
        .collect())
}
