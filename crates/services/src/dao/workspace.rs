use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use taskhub_db::models::{workspace::default_color, MemberRole, Workspace, WorkspaceMember};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct WorkspaceDao {
    pub base: BaseDao<Workspace>,
    pub members: BaseDao<WorkspaceMember>,
}

impl WorkspaceDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Workspace::COLLECTION),
            members: BaseDao::new(db, WorkspaceMember::COLLECTION),
        }
    }

    /// Creates the workspace and its owner membership as one service
    /// call, so the exactly-one-owner invariant holds from the start.
    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
        color: Option<String>,
        owner_id: ObjectId,
    ) -> DaoResult<Workspace> {
        let now = DateTime::now();
        let workspace = Workspace {
            id: None,
            name,
            description,
            color: color.unwrap_or_else(default_color),
            owner_id,
            created_at: now,
            updated_at: now,
        };

        let workspace_id = self.base.insert_one(&workspace).await?;
        self.add_member(workspace_id, owner_id, MemberRole::Owner, None)
            .await?;

        self.base.find_by_id(workspace_id).await
    }

    pub async fn add_member(
        &self,
        workspace_id: ObjectId,
        user_id: ObjectId,
        role: MemberRole,
        invited_by: Option<ObjectId>,
    ) -> DaoResult<WorkspaceMember> {
        let now = DateTime::now();
        let member = WorkspaceMember {
            id: None,
            workspace_id,
            user_id,
            role,
            joined_at: now,
            invited_by,
            created_at: now,
            updated_at: now,
        };

        let id = self.members.insert_one(&member).await?;
        self.members.find_by_id(id).await
    }

    pub async fn find_user_workspaces(&self, user_id: ObjectId) -> DaoResult<Vec<Workspace>> {
        let memberships = self
            .members
            .find_many(doc! { "user_id": user_id }, None)
            .await?;

        let workspace_ids: Vec<ObjectId> =
            memberships.iter().map(|m| m.workspace_id).collect();

        if workspace_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.base
            .find_many(
                doc! { "_id": { "$in": workspace_ids } },
                Some(doc! { "name": 1 }),
            )
            .await
    }

    pub async fn find_members(&self, workspace_id: ObjectId) -> DaoResult<Vec<WorkspaceMember>> {
        self.members
            .find_many(
                doc! { "workspace_id": workspace_id },
                Some(doc! { "joined_at": 1 }),
            )
            .await
    }

    pub async fn find_member(
        &self,
        workspace_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<Option<WorkspaceMember>> {
        self.members
            .find_one(doc! { "workspace_id": workspace_id, "user_id": user_id })
            .await
    }

    pub async fn is_member(
        &self,
        workspace_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<bool> {
        let count = self
            .members
            .count(doc! { "workspace_id": workspace_id, "user_id": user_id })
            .await?;
        Ok(count > 0)
    }

    /// The caller's role, derived against `Workspace.owner_id` so a
    /// transfer that has swapped the owner reference but not yet
    /// reconciled the member records still reads consistently.
    pub async fn member_role(
        &self,
        workspace_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<MemberRole> {
        let workspace = self.base.find_by_id(workspace_id).await?;
        let member = self
            .find_member(workspace_id, user_id)
            .await?
            .ok_or(DaoError::Forbidden("Not a member of this workspace".to_string()))?;
        Ok(member.effective_role(workspace.owner_id))
    }

    pub async fn set_member_role(
        &self,
        workspace_id: ObjectId,
        user_id: ObjectId,
        role: MemberRole,
    ) -> DaoResult<bool> {
        self.members
            .update_one(
                doc! { "workspace_id": workspace_id, "user_id": user_id },
                doc! { "$set": { "role": bson::to_bson(&role)? } },
            )
            .await
    }

    /// Compare-and-swap on the owner reference. Succeeds only if the
    /// owner is still `expected_owner`, so two racing transfers cannot
    /// both win; the loser observes `None`.
    pub async fn swap_owner(
        &self,
        workspace_id: ObjectId,
        expected_owner: ObjectId,
        new_owner: ObjectId,
    ) -> DaoResult<Option<Workspace>> {
        self.base
            .find_one_and_update(
                doc! { "_id": workspace_id, "owner_id": expected_owner },
                doc! { "$set": { "owner_id": new_owner } },
            )
            .await
    }

    pub async fn update_details(
        &self,
        workspace_id: ObjectId,
        name: Option<String>,
        description: Option<String>,
        color: Option<String>,
    ) -> DaoResult<bool> {
        let mut update = bson::Document::new();
        if let Some(name) = name {
            update.insert("name", name);
        }
        if let Some(description) = description {
            update.insert("description", description);
        }
        if let Some(color) = color {
            update.insert("color", color);
        }

        if update.is_empty() {
            return Ok(false);
        }

        self.base
            .update_by_id(workspace_id, doc! { "$set": update })
            .await
    }
}
