use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Top-level tenant: the container for members, projects and tasks.
/// Invariant: `owner_id` always points at a user who holds a
/// `WorkspaceMember` record with role `owner` in this workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    pub owner_id: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

pub fn default_color() -> String {
    "#4F46E5".to_string()
}

impl Workspace {
    pub const COLLECTION: &'static str = "workspaces";
}
