use crate::domain::{NewPost, Post, PostChanges, SearchPage};
use crate::infrastructure::db::entities::post;
use crate::infrastructure::db::{to_post, CommentRepository, PostRepository};
use crate::infrastructure::search::FuzzyMatcher;
use crate::infrastructure::security::InputSanitizer;
use crate::infrastructure::storage::MediaStore;
use clipsesh_errors::AppError;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Where a new post's media comes from.
pub enum PostSource {
    Link(String),
    Upload {
        file_name: Option<String>,
        data: bytes::Bytes,
    },
}

pub struct CreatePost {
    pub streamer: String,
    pub submitter: String,
    pub title: String,
    pub link: Option<String>,
    pub source: Option<PostSource>,
}

#[derive(Clone)]
pub struct PostCatalog {
    posts: PostRepository,
    comments: CommentRepository,
    uploads: MediaStore,
}

impl PostCatalog {
    pub fn new(posts: PostRepository, comments: CommentRepository, uploads: MediaStore) -> Self {
        Self {
            posts,
            comments,
            uploads,
        }
    }

    pub async fn list(&self) -> Result<Vec<Post>, AppError> {
        let rows = self.posts.list().await.map_err(AppError::internal)?;
        self.hydrate(rows).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, AppError> {
        load_post(&self.posts, &self.comments, id).await
    }

    pub async fn create(&self, input: CreatePost) -> Result<Post, AppError> {
        let streamer = InputSanitizer::required_text("streamer", &input.streamer)?;
        let submitter = InputSanitizer::required_text("submitter", &input.submitter)?;
        let title = InputSanitizer::required_text("title", &input.title)?;
        let link = input
            .link
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .map(InputSanitizer::validate_url)
            .transpose()?;

        let (url, link) = match input.source {
            Some(PostSource::Link(raw)) => {
                let url = InputSanitizer::validate_url(&raw)?;
                let link = link.or_else(|| Some(url.clone()));
                (url, link)
            }
            Some(PostSource::Upload { file_name, data }) => {
                if data.is_empty() {
                    return Err(AppError::Validation("Uploaded file is empty".to_string()));
                }
                let stored = self
                    .uploads
                    .save(file_name.as_deref(), &data)
                    .await
                    .map_err(AppError::internal)?;
                tracing::info!("Stored upload {} ({} bytes)", stored.name, data.len());
                (stored.url, link)
            }
            None => {
                return Err(AppError::Validation(
                    "Either a clip URL or an uploaded file is required".to_string(),
                ))
            }
        };

        let new_post = NewPost::new(url, streamer, submitter, title).with_link(link);
        let model = self.posts.create(&new_post).await.map_err(AppError::internal)?;
        Ok(to_post(model, Vec::new()))
    }

    pub async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, AppError> {
        let changes = PostChanges {
            streamer: clean_optional("streamer", changes.streamer)?,
            submitter: clean_optional("submitter", changes.submitter)?,
            title: clean_optional("title", changes.title)?,
        };

        let model = self
            .posts
            .find_by_id(id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found("Post"))?;
        self.posts
            .update_details(model, &changes)
            .await
            .map_err(AppError::internal)?;
        self.get(id).await
    }

    /// Remove the post with everything hanging off it. The uploaded media file
    /// goes last and only best-effort.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let model = self
            .posts
            .find_by_id(id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found("Post"))?;

        self.posts.delete_cascade(id).await.map_err(AppError::internal)?;
        self.uploads.remove_by_url(&model.url).await;
        if let Some(thumbnail) = &model.thumbnail {
            self.uploads.remove_by_url(thumbnail).await;
        }

        tracing::info!("Deleted post {}", id);
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let deleted = self.posts.delete_all().await.map_err(AppError::internal)?;
        self.uploads.clear().await;
        tracing::info!("Deleted all {} posts", deleted);
        Ok(deleted)
    }

    pub async fn search(&self, query: &str, page: u64, limit: u64) -> Result<SearchPage, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::Validation("Search query is required".to_string()));
        }
        let page = page.max(1);
        let limit = limit.max(1);

        let candidates = self.posts.list_newest_first().await.map_err(AppError::internal)?;
        let matcher = FuzzyMatcher::new(query);
        let ranked = matcher.rank(candidates, |p| {
            vec![p.title.as_str(), p.streamer.as_str(), p.submitter.as_str()]
        });

        let total_posts = ranked.len() as u64;
        let total_pages = total_posts.div_ceil(limit);
        let skip = (page - 1).saturating_mul(limit);
        let window: Vec<_> = ranked
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        if window.is_empty() {
            return Err(AppError::NotFound("No posts found".to_string()));
        }

        Ok(SearchPage {
            posts: self.hydrate(window).await?,
            current_page: page,
            total_pages,
            total_posts,
        })
    }

    async fn hydrate(&self, rows: Vec<post::Model>) -> Result<Vec<Post>, AppError> {
        let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
        let mut comments = self
            .comments
            .list_for_posts(&ids)
            .await
            .map_err(AppError::internal)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let thread = comments.remove(&row.id).unwrap_or_default();
                to_post(row, thread)
            })
            .collect())
    }
}

/// Fetch a post and its comments, or `NotFound`.
pub(crate) async fn load_post(
    posts: &PostRepository,
    comments: &CommentRepository,
    id: Uuid,
) -> Result<Post, AppError> {
    let model = posts
        .find_by_id(id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found("Post"))?;
    let thread = comments.list_for_post(id).await.map_err(AppError::internal)?;
    Ok(to_post(model, thread))
}

fn clean_optional(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    value
        .map(|v| InputSanitizer::required_text(field, &v))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::memory_db;

    async fn catalog(dir: &std::path::Path) -> PostCatalog {
        let db = memory_db().await.unwrap();
        PostCatalog::new(
            PostRepository::new(db.clone()),
            CommentRepository::new(db),
            MediaStore::new(dir, "http://localhost:5000", "uploads"),
        )
    }

    fn link_post(title: &str, streamer: &str) -> CreatePost {
        CreatePost {
            streamer: streamer.to_string(),
            submitter: "tester".to_string(),
            title: title.to_string(),
            link: None,
            source: Some(PostSource::Link(format!(
                "https://clips.example.com/{}",
                title.replace(' ', "-")
            ))),
        }
    }

    #[tokio::test]
    async fn create_requires_a_source() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog(dir.path()).await;

        let mut input = link_post("a", "b");
        input.source = None;
        assert!(matches!(catalog.create(input).await, Err(AppError::Validation(_))));

        let mut input = link_post("a", "b");
        input.source = Some(PostSource::Link("ftp://nope".into()));
        assert!(matches!(catalog.create(input).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn upload_is_served_and_removed_with_post() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog(dir.path()).await;

        let mut input = link_post("upload", "spoekle");
        input.source = Some(PostSource::Upload {
            file_name: Some("clip.mp4".into()),
            data: bytes::Bytes::from_static(b"video"),
        });
        let post = catalog.create(input).await.unwrap();
        assert!(post.url.starts_with("http://localhost:5000/uploads/"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        catalog.delete(post.id).await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(matches!(catalog.get(post.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_rejects_blank_fields() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog(dir.path()).await;
        let post = catalog.create(link_post("first", "someone")).await.unwrap();

        let updated = catalog
            .update(
                post.id,
                PostChanges {
                    title: Some("renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.streamer, "someone");

        let blank = PostChanges {
            streamer: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(catalog.update(post.id, blank).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn search_paginates_matches() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog(dir.path()).await;
        catalog.create(link_post("insane jump", "alpha")).await.unwrap();
        catalog.create(link_post("funny fail", "beta")).await.unwrap();
        catalog.create(link_post("another jump", "gamma")).await.unwrap();

        let page = catalog.search("jump", 1, 1).await.unwrap();
        assert_eq!(page.total_posts, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.posts.len(), 1);

        let by_streamer = catalog.search("BETA", 1, 10).await.unwrap();
        assert_eq!(by_streamer.posts[0].title, "funny fail");

        assert!(matches!(catalog.search("jump", 3, 1).await, Err(AppError::NotFound(_))));
        assert!(matches!(catalog.search(" ", 1, 10).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_all_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog(dir.path()).await;
        catalog.create(link_post("one", "a")).await.unwrap();
        catalog.create(link_post("two", "b")).await.unwrap();

        assert_eq!(catalog.delete_all().await.unwrap(), 2);
        assert!(catalog.list().await.unwrap().is_empty());
    }
}
