use super::admin_config::ConfigService;
use crate::domain::{
    is_denied, most_chosen, ClipDescriptor, EligibleClips, Identity, RatingRequest, RatingSummary,
    RatingUser, RatingValue,
};
use crate::infrastructure::db::entities::rating;
use crate::infrastructure::db::{PostRepository, RatingRepository};
use clipsesh_errors::AppError;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct RatingBoard {
    posts: PostRepository,
    ratings: RatingRepository,
    config: ConfigService,
}

impl RatingBoard {
    pub fn new(posts: PostRepository, ratings: RatingRepository, config: ConfigService) -> Self {
        Self {
            posts,
            ratings,
            config,
        }
    }

    /// Record, replace or retract the rater's verdict on a clip.
    ///
    /// Submitting the value already on record withdraws it.
    pub async fn rate(
        &self,
        clip_id: Uuid,
        rater: &Identity,
        request: RatingRequest,
    ) -> Result<RatingSummary, AppError> {
        let value = request.value().ok_or_else(|| {
            AppError::Validation("Provide a rating from 1 to 4 or deny: true".to_string())
        })?;
        self.ensure_clip(clip_id).await?;

        let existing = self
            .ratings
            .find(clip_id, rater.id)
            .await
            .map_err(AppError::internal)?;

        match existing {
            Some(record) if record.rating.parse::<RatingValue>().ok() == Some(value) => {
                self.ratings.delete(record.id).await.map_err(AppError::internal)?;
            }
            Some(record) => {
                self.ratings
                    .set_value(record, value)
                    .await
                    .map_err(AppError::internal)?;
            }
            None => {
                self.ratings
                    .create(clip_id, rater, value)
                    .await
                    .map_err(AppError::internal)?;
            }
        }

        self.summary(clip_id).await
    }

    pub async fn summary(&self, clip_id: Uuid) -> Result<RatingSummary, AppError> {
        self.ensure_clip(clip_id).await?;
        let rows = self
            .ratings
            .list_for_clip(clip_id)
            .await
            .map_err(AppError::internal)?;
        Ok(RatingSummary::tally(clip_id, rows.into_iter().filter_map(vote_of)))
    }

    /// Rated clips that survive the deny gate, each tagged with its most
    /// chosen rating, plus how many were held back.
    pub async fn eligible(&self) -> Result<EligibleClips, AppError> {
        let threshold = self.config.deny_threshold().await?;
        let posts = self.posts.list().await.map_err(AppError::internal)?;
        let rows = self.ratings.list_all().await.map_err(AppError::internal)?;

        let mut by_clip: HashMap<Uuid, Vec<rating::Model>> = HashMap::new();
        for row in rows {
            by_clip.entry(row.clip_id).or_default().push(row);
        }

        let mut clips = Vec::new();
        let mut denied_count = 0;
        for post in posts {
            let Some(rows) = by_clip.remove(&post.id) else {
                continue;
            };
            let summary = RatingSummary::tally(post.id, rows.into_iter().filter_map(vote_of));
            if is_denied(&summary.rating_counts, threshold) {
                denied_count += 1;
                continue;
            }
            let Some(rating) = most_chosen(&summary.rating_counts) else {
                continue;
            };
            clips.push(ClipDescriptor {
                id: Some(post.id),
                url: post.url,
                streamer: post.streamer,
                title: post.title,
                rating,
            });
        }

        Ok(EligibleClips {
            clips,
            denied_count,
        })
    }

    async fn ensure_clip(&self, clip_id: Uuid) -> Result<(), AppError> {
        self.posts
            .find_by_id(clip_id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found("Clip"))?;
        Ok(())
    }
}

fn vote_of(row: rating::Model) -> Option<(RatingValue, RatingUser)> {
    let value = match row.rating.parse::<RatingValue>() {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Skipping rating {}: {}", row.id, e);
            return None;
        }
    };
    Some((
        value,
        RatingUser {
            user_id: row.user_id,
            username: row.username,
        },
    ))
}
