use super::entities::{vote, Vote};
use crate::domain::VoteDirection;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

#[derive(Clone)]
pub struct VoteRepository {
    db: DatabaseConnection,
}

impl VoteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, post_id: Uuid, fingerprint: &str) -> Result<Option<vote::Model>, DbErr> {
        Vote::find()
            .filter(vote::Column::PostId.eq(post_id))
            .filter(vote::Column::Fingerprint.eq(fingerprint))
            .one(&self.db)
            .await
    }

    pub async fn create(
        &self,
        post_id: Uuid,
        fingerprint: &str,
        direction: VoteDirection,
    ) -> Result<vote::Model, DbErr> {
        let now = chrono::Utc::now();
        let active = vote::ActiveModel {
            id: Set(Uuid::new_v4()),
            post_id: Set(post_id),
            fingerprint: Set(fingerprint.to_string()),
            direction: Set(direction.as_str().to_string()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };
        active.insert(&self.db).await
    }

    pub async fn set_direction(
        &self,
        model: vote::Model,
        direction: VoteDirection,
    ) -> Result<vote::Model, DbErr> {
        let mut active: vote::ActiveModel = model.into();
        active.direction = Set(direction.as_str().to_string());
        active.updated_at = Set(Some(chrono::Utc::now()));
        active.update(&self.db).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbErr> {
        Vote::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<vote::Model>, DbErr> {
        Vote::find()
            .filter(vote::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
    }
}
