use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::role::MemberRole;

/// A user's role-scoped association with one workspace.
/// Unique per (workspace_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMember {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub workspace_id: ObjectId,
    pub user_id: ObjectId,
    #[serde(default)]
    pub role: MemberRole,
    pub joined_at: DateTime,
    pub invited_by: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl WorkspaceMember {
    pub const COLLECTION: &'static str = "workspace_members";

    /// Role as derived from the workspace's `owner_id`, which is the
    /// authoritative owner reference while an ownership transfer is
    /// in flight: the member `owner_id` points at reads as `owner`,
    /// and a record still carrying `owner` from before the swap reads
    /// as `admin`. Stored roles are reconciled after the swap, but
    /// every read goes through this so the workspace never shows zero
    /// or two owners.
    pub fn effective_role(&self, owner_id: ObjectId) -> MemberRole {
        if self.user_id == owner_id {
            MemberRole::Owner
        } else if self.role == MemberRole::Owner {
            MemberRole::Admin
        } else {
            self.role
        }
    }
}
