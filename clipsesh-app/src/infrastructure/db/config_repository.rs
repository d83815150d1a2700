use super::entities::admin_config::{self, SINGLETON_ID};
use super::entities::AdminConfig as AdminConfigEntity;
use crate::domain::AdminConfig;
use sea_orm::{entity::*, DatabaseConnection, DbErr};

#[derive(Clone)]
pub struct ConfigRepository {
    db: DatabaseConnection,
}

impl ConfigRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn load(&self) -> Result<Option<AdminConfig>, DbErr> {
        let row = AdminConfigEntity::find_by_id(SINGLETON_ID).one(&self.db).await?;
        Ok(row.map(|r| AdminConfig {
            deny_threshold: r.deny_threshold,
            latest_video_link: r.latest_video_link,
        }))
    }

    /// Insert the singleton on first write, update it afterwards.
    pub async fn save(&self, config: &AdminConfig) -> Result<AdminConfig, DbErr> {
        let existing = AdminConfigEntity::find_by_id(SINGLETON_ID).one(&self.db).await?;

        let saved = match existing {
            Some(row) => {
                let mut active: admin_config::ActiveModel = row.into();
                active.deny_threshold = Set(config.deny_threshold);
                active.latest_video_link = Set(config.latest_video_link.clone());
                active.update(&self.db).await?
            }
            None => {
                let active = admin_config::ActiveModel {
                    id: Set(SINGLETON_ID),
                    deny_threshold: Set(config.deny_threshold),
                    latest_video_link: Set(config.latest_video_link.clone()),
                };
                active.insert(&self.db).await?
            }
        };

        Ok(AdminConfig {
            deny_threshold: saved.deny_threshold,
            latest_video_link: saved.latest_video_link,
        })
    }
}
