use super::entities::{comment, Comment};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentRepository {
    db: DatabaseConnection,
}

impl CommentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn append(&self, post_id: Uuid, username: &str, text: &str) -> Result<comment::Model, DbErr> {
        let now = chrono::Utc::now();
        let active = comment::ActiveModel {
            post_id: Set(post_id),
            username: Set(username.to_string()),
            comment: Set(text.to_string()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        };
        active.insert(&self.db).await
    }

    pub async fn find(&self, post_id: Uuid, comment_id: i32) -> Result<Option<comment::Model>, DbErr> {
        Comment::find_by_id(comment_id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
    }

    pub async fn delete(&self, comment_id: i32) -> Result<(), DbErr> {
        Comment::delete_by_id(comment_id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<comment::Model>, DbErr> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
    }

    /// Comments of many posts in one query, grouped by post, insertion order kept.
    pub async fn list_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<comment::Model>>, DbErr> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Comment::find()
            .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await?;

        let mut grouped: HashMap<Uuid, Vec<comment::Model>> = HashMap::new();
        for row in rows {
            grouped.entry(row.post_id).or_default().push(row);
        }
        Ok(grouped)
    }
}

impl From<comment::Model> for crate::domain::Comment {
    fn from(m: comment::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            comment: m.comment,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
