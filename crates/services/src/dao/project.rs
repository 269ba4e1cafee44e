use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use taskhub_db::models::{Project, ProjectStatus};

use super::base::{BaseDao, DaoResult};

pub struct ProjectDao {
    pub base: BaseDao<Project>,
}

impl ProjectDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Project::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        workspace_id: ObjectId,
        name: String,
        description: Option<String>,
        creator_id: ObjectId,
    ) -> DaoResult<Project> {
        let now = DateTime::now();
        let project = Project {
            id: None,
            workspace_id,
            name,
            description,
            status: ProjectStatus::Planning,
            is_archived: false,
            creator_id,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&project).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_workspace(&self, workspace_id: ObjectId) -> DaoResult<Vec<Project>> {
        self.base
            .find_many(
                doc! { "workspace_id": workspace_id, "is_archived": false },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    /// Archived projects, most recently archived first.
    pub async fn find_archived(&self, workspace_id: ObjectId) -> DaoResult<Vec<Project>> {
        self.base
            .find_many(
                doc! { "workspace_id": workspace_id, "is_archived": true },
                Some(doc! { "updated_at": -1 }),
            )
            .await
    }

    pub async fn update(
        &self,
        workspace_id: ObjectId,
        project_id: ObjectId,
        name: Option<String>,
        description: Option<String>,
        status: Option<ProjectStatus>,
        is_archived: Option<bool>,
    ) -> DaoResult<bool> {
        let mut update = bson::Document::new();
        if let Some(name) = name {
            update.insert("name", name);
        }
        if let Some(description) = description {
            update.insert("description", description);
        }
        if let Some(status) = status {
            update.insert("status", bson::to_bson(&status)?);
        }
        if let Some(is_archived) = is_archived {
            update.insert("is_archived", is_archived);
        }

        if update.is_empty() {
            return Ok(false);
        }

        self.base
            .update_one(
                doc! { "_id": project_id, "workspace_id": workspace_id },
                doc! { "$set": update },
            )
            .await
    }

    pub async fn count_by_status(
        &self,
        workspace_id: ObjectId,
        status: ProjectStatus,
    ) -> DaoResult<u64> {
        self.base
            .count(doc! {
                "workspace_id": workspace_id,
                "is_archived": false,
                "status": bson::to_bson(&status)?,
            })
            .await
    }
}
