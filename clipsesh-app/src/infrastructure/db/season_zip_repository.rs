use super::entities::{season_zip, SeasonZip};
use crate::domain::SeasonArchive;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

#[derive(Clone)]
pub struct SeasonZipRepository {
    db: DatabaseConnection,
}

impl SeasonZipRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        url: String,
        season: String,
        name: String,
        size: i64,
        clip_amount: i32,
    ) -> Result<season_zip::Model, DbErr> {
        let now = chrono::Utc::now();
        let active = season_zip::ActiveModel {
            id: Set(Uuid::new_v4()),
            url: Set(url),
            season: Set(season),
            name: Set(name),
            size: Set(size),
            clip_amount: Set(clip_amount),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };
        active.insert(&self.db).await
    }

    pub async fn list(&self) -> Result<Vec<season_zip::Model>, DbErr> {
        SeasonZip::find()
            .order_by_asc(season_zip::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<season_zip::Model>, DbErr> {
        SeasonZip::find_by_id(id).one(&self.db).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbErr> {
        SeasonZip::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}

impl From<season_zip::Model> for SeasonArchive {
    fn from(m: season_zip::Model) -> Self {
        Self {
            id: m.id,
            url: m.url,
            season: m.season,
            name: m.name,
            size: m.size,
            clip_amount: m.clip_amount,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
