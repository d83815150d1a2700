use serde::{Deserialize, Serialize};

/// A submitted clip with its running vote counters and comment thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: uuid::Uuid,
    pub link: Option<String>,
    pub url: String,
    pub thumbnail: Option<String>,
    pub streamer: String,
    pub submitter: String,
    pub title: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub comments: Vec<Comment>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub username: String,
    pub comment: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: uuid::Uuid,
    pub link: Option<String>,
    pub url: String,
    pub thumbnail: Option<String>,
    pub streamer: String,
    pub submitter: String,
    pub title: String,
}

impl NewPost {
    pub fn new(url: String, streamer: String, submitter: String, title: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            link: None,
            url,
            thumbnail: None,
            streamer,
            submitter,
            title,
        }
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }
}

/// Editable post details; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostChanges {
    pub streamer: Option<String>,
    pub submitter: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub posts: Vec<Post>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
}
