use crate::domain::{AdminConfig, ConfigUpdate};
use crate::infrastructure::db::ConfigRepository;
use clipsesh_errors::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Singleton settings record with a write-through cache.
#[derive(Clone)]
pub struct ConfigService {
    repo: ConfigRepository,
    cache: Arc<RwLock<Option<AdminConfig>>>,
}

impl ConfigService {
    pub fn new(repo: ConfigRepository) -> Self {
        Self {
            repo,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Current config; defaults when it was never written.
    pub async fn load(&self) -> Result<AdminConfig, AppError> {
        if let Some(config) = self.cache.read().await.as_ref() {
            return Ok(config.clone());
        }

        let mut cache = self.cache.write().await;
        if let Some(config) = cache.as_ref() {
            return Ok(config.clone());
        }
        let config = self
            .repo
            .load()
            .await
            .map_err(AppError::internal)?
            .unwrap_or_default();
        *cache = Some(config.clone());
        Ok(config)
    }

    pub async fn deny_threshold(&self) -> Result<i32, AppError> {
        Ok(self.load().await?.deny_threshold)
    }

    pub async fn update(&self, update: ConfigUpdate) -> Result<AdminConfig, AppError> {
        if matches!(update.deny_threshold, Some(t) if t < 0) {
            return Err(AppError::Validation(
                "denyThreshold must not be negative".to_string(),
            ));
        }

        let mut cache = self.cache.write().await;
        let current = match cache.as_ref() {
            Some(config) => config.clone(),
            None => self
                .repo
                .load()
                .await
                .map_err(AppError::internal)?
                .unwrap_or_default(),
        };

        let saved = self
            .repo
            .save(&current.merged(update))
            .await
            .map_err(AppError::internal)?;
        *cache = Some(saved.clone());

        tracing::info!(
            "Config updated: deny threshold {}, latest video {:?}",
            saved.deny_threshold,
            saved.latest_video_link
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_DENY_THRESHOLD;
    use crate::infrastructure::db::memory_db;

    #[tokio::test]
    async fn defaults_until_first_write() {
        let db = memory_db().await.unwrap();
        let service = ConfigService::new(ConfigRepository::new(db.clone()));

        let config = service.load().await.unwrap();
        assert_eq!(config.deny_threshold, DEFAULT_DENY_THRESHOLD);
        assert_eq!(config.latest_video_link, "");
        assert!(ConfigRepository::new(db).load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_replaces_cached_value() {
        let db = memory_db().await.unwrap();
        let service = ConfigService::new(ConfigRepository::new(db.clone()));
        service.load().await.unwrap();

        let saved = service
            .update(ConfigUpdate {
                deny_threshold: Some(3),
                latest_video_link: None,
            })
            .await
            .unwrap();
        assert_eq!(saved.deny_threshold, 3);
        assert_eq!(service.deny_threshold().await.unwrap(), 3);

        // A fresh service reads the persisted row.
        let other = ConfigService::new(ConfigRepository::new(db));
        let config = other
            .update(ConfigUpdate {
                deny_threshold: None,
                latest_video_link: Some("https://youtu.be/x".into()),
            })
            .await
            .unwrap();
        assert_eq!(config.deny_threshold, 3);
        assert_eq!(config.latest_video_link, "https://youtu.be/x");
    }

    #[tokio::test]
    async fn negative_threshold_is_rejected() {
        let db = memory_db().await.unwrap();
        let service = ConfigService::new(ConfigRepository::new(db));
        let err = service
            .update(ConfigUpdate {
                deny_threshold: Some(-1),
                latest_video_link: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
