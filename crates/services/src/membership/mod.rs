use std::sync::Arc;

use bson::{doc, oid::ObjectId, DateTime};
use chrono::{Duration, Utc};
use taskhub_config::Settings;
use taskhub_db::models::{
    Invite, InviteStatus, MemberRole, Workspace, WorkspaceAction,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::dao::{
    base::DaoError,
    invite::InviteDao,
    project::ProjectDao,
    task::TaskDao,
    user::UserDao,
    workspace::WorkspaceDao,
};
use crate::email::Mailer;

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error(transparent)]
    Dao(#[from] DaoError),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("User is already a member of this workspace")]
    AlreadyMember,
    #[error("Invite token is invalid")]
    InvalidToken,
    #[error("Invite token has expired")]
    ExpiredToken,
    #[error("Invite token has already been used")]
    AlreadyConsumed,
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
    #[error("Ownership changed concurrently")]
    TransferConflict,
    #[error("Validation: {0}")]
    Validation(String),
}

pub type MembershipResult<T> = Result<T, MembershipError>;

/// Outcome of a direct invite: the invite is created regardless of
/// whether the notification email could be delivered.
pub struct IssuedInvite {
    pub invite: Invite,
    pub email_sent: bool,
}

/// Owns the workspace membership lifecycle: creation, invitation
/// issuance and acceptance, ownership transfer, and deletion cascade.
pub struct MembershipService {
    workspaces: Arc<WorkspaceDao>,
    invites: Arc<InviteDao>,
    projects: Arc<ProjectDao>,
    tasks: Arc<TaskDao>,
    users: Arc<UserDao>,
    mailer: Arc<dyn Mailer>,
    settings: Settings,
}

impl MembershipService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        workspaces: Arc<WorkspaceDao>,
        invites: Arc<InviteDao>,
        projects: Arc<ProjectDao>,
        tasks: Arc<TaskDao>,
        users: Arc<UserDao>,
        mailer: Arc<dyn Mailer>,
        settings: Settings,
    ) -> Self {
        Self {
            workspaces,
            invites,
            projects,
            tasks,
            users,
            mailer,
            settings,
        }
    }

    /// Creates the workspace with the caller as owner and sole member.
    pub async fn create_workspace(
        &self,
        owner_id: ObjectId,
        name: String,
        description: Option<String>,
        color: Option<String>,
    ) -> MembershipResult<Workspace> {
        let workspace = self
            .workspaces
            .create(name, description, color, owner_id)
            .await?;
        info!(workspace_id = %workspace.id.unwrap(), "Workspace created");
        Ok(workspace)
    }

    /// Requires the caller to hold at least `action`'s minimum role.
    /// Non-members and under-privileged members both get `Forbidden`.
    pub async fn authorize(
        &self,
        workspace_id: ObjectId,
        user_id: ObjectId,
        action: WorkspaceAction,
    ) -> MembershipResult<MemberRole> {
        // member_role resolves the workspace first, so a deleted
        // workspace reads as NotFound rather than Forbidden.
        let role = self
            .workspaces
            .member_role(workspace_id, user_id)
            .await
            .map_err(|e| match e {
                DaoError::Forbidden(msg) => MembershipError::Forbidden(msg),
                other => MembershipError::Dao(other),
            })?;

        if !role.can(action) {
            return Err(MembershipError::Forbidden(format!(
                "Requires at least {} role",
                action.min_role().as_str()
            )));
        }
        Ok(role)
    }

    /// Issues a direct invite for `email` and dispatches the acceptance
    /// link. Delivery failure does not roll the invite back: the token
    /// stays valid and the caller sees `email_sent == false`.
    pub async fn invite_member(
        &self,
        workspace_id: ObjectId,
        caller_id: ObjectId,
        email: String,
        role: MemberRole,
    ) -> MembershipResult<IssuedInvite> {
        self.authorize(workspace_id, caller_id, WorkspaceAction::InviteMembers)
            .await?;

        if role == MemberRole::Owner {
            return Err(MembershipError::Validation(
                "Cannot invite a user as owner".to_string(),
            ));
        }

        let workspace = self.find_workspace(workspace_id).await?;

        // A user who already holds membership cannot be invited again.
        if let Ok(user) = self.users.find_by_email(&email).await {
            if self
                .workspaces
                .is_member(workspace_id, user.id.unwrap())
                .await?
            {
                return Err(MembershipError::AlreadyMember);
            }
        }

        let invite = self
            .issue_invite(workspace_id, caller_id, Some(email.clone()), role)
            .await?;

        let email_sent = self.send_invite_email(&workspace, &email, &invite.token).await;

        Ok(IssuedInvite { invite, email_sent })
    }

    /// Produces a shareable link invite not bound to an email, reusing
    /// an outstanding unexpired one when present. Single-use, like a
    /// direct invite; a fresh link can be minted once it is consumed.
    pub async fn generate_invite_link(
        &self,
        workspace_id: ObjectId,
        caller_id: ObjectId,
    ) -> MembershipResult<Invite> {
        self.authorize(workspace_id, caller_id, WorkspaceAction::InviteMembers)
            .await?;
        self.find_workspace(workspace_id).await?;

        if let Some(existing) = self.invites.find_open_invite(workspace_id).await? {
            return Ok(existing);
        }

        self.issue_invite(workspace_id, caller_id, None, MemberRole::Member)
            .await
    }

    /// Accepts an invite token for `user_id`. The consumed flag is the
    /// single source of truth: it is flipped with an atomic
    /// compare-and-set before membership is created, so a concurrent
    /// double-submit produces exactly one member and one
    /// `AlreadyConsumed` failure.
    pub async fn accept_invite(
        &self,
        token: &str,
        user_id: ObjectId,
    ) -> MembershipResult<Workspace> {
        let invite = self
            .invites
            .find_by_token(token)
            .await?
            .ok_or(MembershipError::InvalidToken)?;
        let invite_id = invite.id.unwrap();

        match invite.effective_status(DateTime::now()) {
            InviteStatus::Issued => {}
            InviteStatus::Consumed => return Err(MembershipError::AlreadyConsumed),
            InviteStatus::Expired => {
                self.invites.mark_expired(invite_id).await?;
                return Err(MembershipError::ExpiredToken);
            }
            InviteStatus::Revoked => return Err(MembershipError::InvalidToken),
        }

        let workspace = self.find_workspace(invite.workspace_id).await?;

        // CAS on status: the loser of a racing double-accept lands here.
        let consumed = self.invites.consume(invite_id, user_id).await?;
        if consumed.is_none() {
            return Err(MembershipError::AlreadyConsumed);
        }

        match self
            .workspaces
            .add_member(invite.workspace_id, user_id, invite.role, Some(invite.inviter_id))
            .await
        {
            Ok(_) => {
                info!(
                    workspace_id = %invite.workspace_id,
                    %user_id,
                    role = invite.role.as_str(),
                    "Invite accepted"
                );
                Ok(workspace)
            }
            // Unique (workspace_id, user_id) index: the acceptor was
            // already a member. The token stays consumed.
            Err(DaoError::DuplicateKey(_)) => Err(MembershipError::AlreadyMember),
            Err(e) => Err(e.into()),
        }
    }

    /// Transfers ownership to an existing member. Serialized per
    /// workspace by a compare-and-swap on `owner_id`: a transfer that
    /// raced a competing one fails instead of producing two owners.
    pub async fn transfer_ownership(
        &self,
        workspace_id: ObjectId,
        caller_id: ObjectId,
        new_owner_id: ObjectId,
    ) -> MembershipResult<Workspace> {
        let workspace = self.find_workspace(workspace_id).await?;

        if workspace.owner_id != caller_id {
            return Err(MembershipError::Forbidden(
                "Only the owner can transfer ownership".to_string(),
            ));
        }
        if new_owner_id == caller_id {
            return Err(MembershipError::InvalidTarget(
                "User is already the owner".to_string(),
            ));
        }
        if self
            .workspaces
            .find_member(workspace_id, new_owner_id)
            .await?
            .is_none()
        {
            return Err(MembershipError::InvalidTarget(
                "Target user is not a member of this workspace".to_string(),
            ));
        }

        let swapped = self
            .workspaces
            .swap_owner(workspace_id, caller_id, new_owner_id)
            .await?;
        if swapped.is_none() {
            return Err(MembershipError::TransferConflict);
        }

        // owner_id is authoritative from here: role reads derive
        // against it, so the window before these reconciling writes
        // land (or a crash inside it) is not observable as zero or
        // two owners.
        self.workspaces
            .set_member_role(workspace_id, new_owner_id, MemberRole::Owner)
            .await?;
        self.workspaces
            .set_member_role(workspace_id, caller_id, MemberRole::Admin)
            .await?;

        info!(%workspace_id, from = %caller_id, to = %new_owner_id, "Ownership transferred");

        self.find_workspace(workspace_id).await
    }

    /// Deletes the workspace and everything scoped to it. The parent
    /// document goes first, so every workspace-scoped read observes
    /// `NotFound` rather than a partial cascade while children are
    /// reaped; tasks are removed before projects so a task can never
    /// be seen to outlive its project.
    pub async fn delete_workspace(
        &self,
        workspace_id: ObjectId,
        caller_id: ObjectId,
    ) -> MembershipResult<()> {
        let workspace = self.find_workspace(workspace_id).await?;
        if workspace.owner_id != caller_id {
            return Err(MembershipError::Forbidden(
                "Only the owner can delete the workspace".to_string(),
            ));
        }

        // Guarded on owner_id so a concurrent transfer cannot let a
        // stale owner delete the workspace.
        let removed = self
            .workspaces
            .base
            .hard_delete(doc! { "_id": workspace_id, "owner_id": caller_id })
            .await?;
        if removed == 0 {
            return Err(MembershipError::TransferConflict);
        }

        let scope = doc! { "workspace_id": workspace_id };
        let tasks = self.tasks.base.hard_delete(scope.clone()).await?;
        let projects = self.projects.base.hard_delete(scope.clone()).await?;
        let members = self.workspaces.members.hard_delete(scope.clone()).await?;
        let invites = self.invites.base.hard_delete(scope).await?;

        info!(
            %workspace_id,
            tasks,
            projects,
            members,
            invites,
            "Workspace deleted with cascade"
        );
        Ok(())
    }

    async fn find_workspace(&self, workspace_id: ObjectId) -> MembershipResult<Workspace> {
        Ok(self.workspaces.base.find_by_id(workspace_id).await?)
    }

    async fn issue_invite(
        &self,
        workspace_id: ObjectId,
        inviter_id: ObjectId,
        target_email: Option<String>,
        role: MemberRole,
    ) -> MembershipResult<Invite> {
        // nanoid! takes a single token tree, so the field access must be parenthesized.
        #[allow(unused_parens)]
        let token = nanoid::nanoid!((self.settings.invite.token_length));
        let expires_at = DateTime::from_chrono(
            Utc::now() + Duration::days(self.settings.invite.ttl_days),
        );

        let invite = self
            .invites
            .create(workspace_id, token, inviter_id, target_email, role, expires_at)
            .await?;
        Ok(invite)
    }

    async fn send_invite_email(&self, workspace: &Workspace, to: &str, token: &str) -> bool {
        let link = format!(
            "{}/workspace-invite/{}",
            self.settings.app.frontend_url.trim_end_matches('/'),
            token
        );
        let subject = format!("You have been invited to join {}", workspace.name);
        let body = format!(
            "<p>You have been invited to join the <b>{}</b> workspace on TaskHub.</p>\
             <p><a href=\"{}\">Accept invitation</a></p>\
             <p>This invitation expires in {} days.</p>",
            workspace.name, link, self.settings.invite.ttl_days
        );

        match self.mailer.send(to, &subject, &body).await {
            Ok(()) => true,
            Err(e) => {
                warn!(to, error = %e, "Invite email delivery failed, token remains valid");
                false
            }
        }
    }
}
