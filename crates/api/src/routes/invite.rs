use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use taskhub_db::models::{Invite, MemberRole};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, workspace::WorkspaceId},
    state::AppState,
};

use super::workspace::{WorkspaceResponse, to_response};

#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberRequest {
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub role: MemberRole,
}

#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub id: String,
    pub workspace_id: String,
    pub token: String,
    pub role: String,
    pub target_email: Option<String>,
    pub expires_at: String,
}

/// Invite creation succeeded as long as the token was persisted;
/// `email_sent` reports delivery separately.
#[derive(Debug, Serialize)]
pub struct InviteMemberResponse {
    #[serde(flatten)]
    pub invite: InviteResponse,
    pub email_sent: bool,
}

fn invite_to_response(invite: Invite) -> InviteResponse {
    InviteResponse {
        id: invite.id.unwrap().to_hex(),
        workspace_id: invite.workspace_id.to_hex(),
        token: invite.token,
        role: invite.role.as_str().to_string(),
        target_email: invite.target_email,
        expires_at: invite.expires_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn invite_member(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
    Json(body): Json<InviteMemberRequest>,
) -> Result<(StatusCode, Json<InviteMemberResponse>), ApiError> {
    body.validate()?;

    let issued = state
        .membership
        .invite_member(workspace_id, auth.user_id, body.email, body.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InviteMemberResponse {
            invite: invite_to_response(issued.invite),
            email_sent: issued.email_sent,
        }),
    ))
}

pub async fn generate_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    WorkspaceId(workspace_id): WorkspaceId,
) -> Result<Json<InviteResponse>, ApiError> {
    let invite = state
        .membership
        .generate_invite_link(workspace_id, auth.user_id)
        .await?;

    Ok(Json(invite_to_response(invite)))
}

pub async fn accept_invite_token(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<AcceptInviteRequest>,
) -> Result<Json<WorkspaceResponse>, ApiError> {
    let workspace = state
        .membership
        .accept_invite(&body.token, auth.user_id)
        .await?;

    Ok(Json(to_response(workspace)))
}
