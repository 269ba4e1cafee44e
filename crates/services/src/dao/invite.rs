use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use taskhub_db::models::{Invite, InviteStatus, MemberRole};

use super::base::{BaseDao, DaoResult};

pub struct InviteDao {
    pub base: BaseDao<Invite>,
}

impl InviteDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Invite::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        workspace_id: ObjectId,
        token: String,
        inviter_id: ObjectId,
        target_email: Option<String>,
        role: MemberRole,
        expires_at: DateTime,
    ) -> DaoResult<Invite> {
        let now = DateTime::now();
        let invite = Invite {
            id: None,
            workspace_id,
            token,
            inviter_id,
            target_email,
            role,
            expires_at,
            status: InviteStatus::Issued,
            consumed_by: None,
            consumed_at: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&invite).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_token(&self, token: &str) -> DaoResult<Option<Invite>> {
        self.base.find_one(doc! { "token": token }).await
    }

    /// An outstanding self-service link invite for the workspace:
    /// issued, not email-bound, and not yet past expiry.
    pub async fn find_open_invite(&self, workspace_id: ObjectId) -> DaoResult<Option<Invite>> {
        self.base
            .find_one(doc! {
                "workspace_id": workspace_id,
                "target_email": null,
                "status": "issued",
                "expires_at": { "$gt": DateTime::now() },
            })
            .await
    }

    /// Atomically flips `Issued -> Consumed` for `user_id`. Returns the
    /// pre-update invite, or `None` when the invite was no longer in
    /// the issued state (already consumed, expired, or revoked).
    pub async fn consume(
        &self,
        invite_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<Option<Invite>> {
        self.base
            .find_one_and_update(
                doc! { "_id": invite_id, "status": "issued" },
                doc! { "$set": {
                    "status": "consumed",
                    "consumed_by": user_id,
                    "consumed_at": DateTime::now(),
                } },
            )
            .await
    }

    /// Persists the lazily-observed `Issued -> Expired` transition.
    pub async fn mark_expired(&self, invite_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": invite_id, "status": "issued" },
                doc! { "$set": { "status": "expired" } },
            )
            .await
    }
}
