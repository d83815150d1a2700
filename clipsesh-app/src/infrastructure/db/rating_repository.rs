use super::entities::{rating, Rating};
use crate::domain::{Identity, RatingValue};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

#[derive(Clone)]
pub struct RatingRepository {
    db: DatabaseConnection,
}

impl RatingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, clip_id: Uuid, user_id: Uuid) -> Result<Option<rating::Model>, DbErr> {
        Rating::find()
            .filter(rating::Column::ClipId.eq(clip_id))
            .filter(rating::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    pub async fn create(
        &self,
        clip_id: Uuid,
        rater: &Identity,
        value: RatingValue,
    ) -> Result<rating::Model, DbErr> {
        let now = chrono::Utc::now();
        let active = rating::ActiveModel {
            id: Set(Uuid::new_v4()),
            clip_id: Set(clip_id),
            user_id: Set(rater.id),
            username: Set(rater.username.clone()),
            rating: Set(value.as_str().to_string()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };
        active.insert(&self.db).await
    }

    pub async fn set_value(&self, model: rating::Model, value: RatingValue) -> Result<rating::Model, DbErr> {
        let mut active: rating::ActiveModel = model.into();
        active.rating = Set(value.as_str().to_string());
        active.updated_at = Set(Some(chrono::Utc::now()));
        active.update(&self.db).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbErr> {
        Rating::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn list_for_clip(&self, clip_id: Uuid) -> Result<Vec<rating::Model>, DbErr> {
        Rating::find()
            .filter(rating::Column::ClipId.eq(clip_id))
            .order_by_asc(rating::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Every rating, oldest first.
    pub async fn list_all(&self) -> Result<Vec<rating::Model>, DbErr> {
        Rating::find()
            .order_by_asc(rating::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
