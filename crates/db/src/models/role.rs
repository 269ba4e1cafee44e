use serde::{Deserialize, Serialize};

/// Role of a user within one workspace. A workspace has exactly one
/// `Owner` at any time; the variants form a total order used by the
/// permission table below.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    #[default]
    Member,
    Admin,
    Owner,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
        }
    }

    pub fn can(&self, action: WorkspaceAction) -> bool {
        *self >= action.min_role()
    }
}

/// Privileged workspace operations, each mapped to the minimum role
/// allowed to perform it. Kept as a closed table so authorization is
/// auditable in one place instead of scattered string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceAction {
    View,
    InviteMembers,
    UpdateWorkspace,
    TransferOwnership,
    DeleteWorkspace,
}

impl WorkspaceAction {
    pub fn min_role(&self) -> MemberRole {
        match self {
            WorkspaceAction::View => MemberRole::Member,
            WorkspaceAction::InviteMembers => MemberRole::Admin,
            WorkspaceAction::UpdateWorkspace => MemberRole::Owner,
            WorkspaceAction::TransferOwnership => MemberRole::Owner,
            WorkspaceAction::DeleteWorkspace => MemberRole::Owner,
        }
    }
}
