use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::role::MemberRole;

/// A token granting join rights to a workspace. Single-use: the
/// status moves one way, `Issued -> Consumed` on acceptance or
/// `Issued -> Expired` when read past `expires_at`. A consumed or
/// expired invite can never produce membership again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub workspace_id: ObjectId,
    pub token: String,
    pub inviter_id: ObjectId,
    /// Absent for self-service generated links.
    pub target_email: Option<String>,
    #[serde(default)]
    pub role: MemberRole,
    pub expires_at: DateTime,
    #[serde(default)]
    pub status: InviteStatus,
    pub consumed_by: Option<ObjectId>,
    pub consumed_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    #[default]
    Issued,
    Consumed,
    Expired,
    Revoked,
}

impl Invite {
    pub const COLLECTION: &'static str = "invites";

    /// Status as observed at `now`: an issued invite past its expiry
    /// reads as expired even before the document is updated.
    pub fn effective_status(&self, now: DateTime) -> InviteStatus {
        if self.status == InviteStatus::Issued && self.expires_at <= now {
            InviteStatus::Expired
        } else {
            self.status
        }
    }
}
