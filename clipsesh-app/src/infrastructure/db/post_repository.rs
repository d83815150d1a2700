use super::entities::{comment, post, rating, vote, Comment, Post, Rating, Vote};
use crate::domain::{NewPost, PostChanges, Tally};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use uuid::Uuid;

#[derive(Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, data: &NewPost) -> Result<post::Model, DbErr> {
        let now = chrono::Utc::now();
        let active = post::ActiveModel {
            id: Set(data.id),
            link: Set(data.link.clone()),
            url: Set(data.url.clone()),
            thumbnail: Set(data.thumbnail.clone()),
            streamer: Set(data.streamer.clone()),
            submitter: Set(data.submitter.clone()),
            title: Set(data.title.clone()),
            upvotes: Set(0),
            downvotes: Set(0),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };
        active.insert(&self.db).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<post::Model>, DbErr> {
        Post::find_by_id(id).one(&self.db).await
    }

    pub async fn list(&self) -> Result<Vec<post::Model>, DbErr> {
        Post::find()
            .order_by_asc(post::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn list_newest_first(&self) -> Result<Vec<post::Model>, DbErr> {
        Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Write back counters computed by the caller. There is no compare-and-set:
    /// a concurrent vote between read and write is lost or double counted.
    pub async fn save_tally(&self, model: post::Model, tally: Tally) -> Result<post::Model, DbErr> {
        let mut active: post::ActiveModel = model.into();
        active.upvotes = Set(tally.upvotes);
        active.downvotes = Set(tally.downvotes);
        active.updated_at = Set(Some(chrono::Utc::now()));
        active.update(&self.db).await
    }

    pub async fn update_details(
        &self,
        model: post::Model,
        changes: &PostChanges,
    ) -> Result<post::Model, DbErr> {
        let mut active: post::ActiveModel = model.into();
        if let Some(streamer) = &changes.streamer {
            active.streamer = Set(streamer.clone());
        }
        if let Some(submitter) = &changes.submitter {
            active.submitter = Set(submitter.clone());
        }
        if let Some(title) = &changes.title {
            active.title = Set(title.clone());
        }
        active.updated_at = Set(Some(chrono::Utc::now()));
        active.update(&self.db).await
    }

    /// Remove a post together with its comments, ledger entries and ratings.
    pub async fn delete_cascade(&self, id: Uuid) -> Result<(), DbErr> {
        Comment::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&self.db)
            .await?;
        Vote::delete_many()
            .filter(vote::Column::PostId.eq(id))
            .exec(&self.db)
            .await?;
        Rating::delete_many()
            .filter(rating::Column::ClipId.eq(id))
            .exec(&self.db)
            .await?;
        Post::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<u64, DbErr> {
        Comment::delete_many().exec(&self.db).await?;
        Vote::delete_many().exec(&self.db).await?;
        Rating::delete_many().exec(&self.db).await?;
        let result = Post::delete_many().exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}

/// Join a post row with its comment rows (already in insertion order).
pub fn to_post(model: post::Model, comments: Vec<comment::Model>) -> crate::domain::Post {
    crate::domain::Post {
        id: model.id,
        link: model.link,
        url: model.url,
        thumbnail: model.thumbnail,
        streamer: model.streamer,
        submitter: model.submitter,
        title: model.title,
        upvotes: model.upvotes,
        downvotes: model.downvotes,
        comments: comments.into_iter().map(Into::into).collect(),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
