use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use taskhub_db::models::{Task, TaskPriority, TaskStatus};

use super::base::{BaseDao, DaoResult};

pub struct TaskDao {
    pub base: BaseDao<Task>,
}

impl TaskDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Task::COLLECTION),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        workspace_id: ObjectId,
        project_id: ObjectId,
        title: String,
        description: Option<String>,
        priority: TaskPriority,
        assignee_id: Option<ObjectId>,
        creator_id: ObjectId,
    ) -> DaoResult<Task> {
        let now = DateTime::now();
        let task = Task {
            id: None,
            workspace_id,
            project_id,
            title,
            description,
            status: TaskStatus::Todo,
            priority,
            assignee_id,
            is_archived: false,
            creator_id,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&task).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_project(&self, project_id: ObjectId) -> DaoResult<Vec<Task>> {
        self.base
            .find_many(
                doc! { "project_id": project_id, "is_archived": false },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    /// Archived tasks, most recently archived first.
    pub async fn find_archived(&self, workspace_id: ObjectId) -> DaoResult<Vec<Task>> {
        self.base
            .find_many(
                doc! { "workspace_id": workspace_id, "is_archived": true },
                Some(doc! { "updated_at": -1 }),
            )
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        workspace_id: ObjectId,
        task_id: ObjectId,
        title: Option<String>,
        description: Option<String>,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
        is_archived: Option<bool>,
    ) -> DaoResult<bool> {
        let mut update = bson::Document::new();
        if let Some(title) = title {
            update.insert("title", title);
        }
        if let Some(description) = description {
            update.insert("description", description);
        }
        if let Some(status) = status {
            update.insert("status", bson::to_bson(&status)?);
        }
        if let Some(priority) = priority {
            update.insert("priority", bson::to_bson(&priority)?);
        }
        if let Some(is_archived) = is_archived {
            update.insert("is_archived", is_archived);
        }

        if update.is_empty() {
            return Ok(false);
        }

        self.base
            .update_one(
                doc! { "_id": task_id, "workspace_id": workspace_id },
                doc! { "$set": update },
            )
            .await
    }

    pub async fn count_by_status(
        &self,
        workspace_id: ObjectId,
        status: TaskStatus,
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
