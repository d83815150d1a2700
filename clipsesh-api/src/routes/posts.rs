use crate::extract::{parse_id, AppJson, AppMultipart, AppQuery, Authenticated, ClientIp};
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use clipsesh_app::application::{CreatePost, PostSource, DEFAULT_PAGE_SIZE};
use clipsesh_app::domain::{Post, PostChanges, Role, SearchPage, VoteDirection};
use clipsesh_app::AppContext;
use clipsesh_errors::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post).delete(delete_all_posts))
        .route("/posts/search", get(search_posts))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/posts/{id}/vote/{vote_type}", post(vote))
        .route("/posts/{id}/comment", post(add_comment))
        .route("/posts/{post_id}/comment/{comment_id}", delete(remove_comment))
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
}

#[derive(Deserialize)]
struct CommentBody {
    comment: String,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    post: Post,
}

async fn list_posts(State(ctx): State<AppContext>) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(ctx.posts.list().await?))
}

async fn search_posts(
    State(ctx): State<AppContext>,
    ClientIp(ip): ClientIp,
    AppQuery(params): AppQuery<SearchParams>,
) -> Result<Json<SearchPage>, AppError> {
    ctx.search_limiter.check(&ip)?;
    let query = params.q.unwrap_or_default();
    let page = ctx
        .posts
        .search(
            &query,
            params.page.unwrap_or(1),
            params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    Ok(Json(page))
}

async fn get_post(State(ctx): State<AppContext>, Path(id): Path<String>) -> Result<Json<Post>, AppError> {
    let id = parse_id(&id, "post")?;
    Ok(Json(ctx.posts.get(id).await?))
}

async fn create_post(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<Json<Created>, AppError> {
    auth.require_any(&[Role::Uploader, Role::Admin])?;

    let mut fields: HashMap<String, String> = HashMap::new();
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "post" {
            let file_name = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            if !data.is_empty() {
                upload = Some(PostSource::Upload { file_name, data });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            fields.insert(name, text);
        }
    }

    let mut take = |key: &str| fields.remove(key).unwrap_or_default();
    let url = take("url");
    let source = if !url.trim().is_empty() {
        Some(PostSource::Link(url))
    } else {
        upload
    };
    let input = CreatePost {
        streamer: take("streamer"),
        submitter: take("submitter"),
        title: take("title"),
        link: Some(take("link")),
        source,
    };

    let post = ctx.posts.create(input).await?;
    Ok(Json(Created { success: true, post }))
}

async fn update_post(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    Path(id): Path<String>,
    AppJson(changes): AppJson<PostChanges>,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Uploader, Role::Admin])?;
    let id = parse_id(&id, "post")?;
    let post = ctx.posts.update(id, changes).await?;
    Ok(Json(json!({ "message": "Post updated successfully", "post": post })))
}

async fn delete_post(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Admin])?;
    let id = parse_id(&id, "post")?;
    ctx.posts.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

async fn delete_all_posts(
    State(ctx): State<AppContext>,
    auth: Authenticated,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Admin])?;
    let deleted = ctx.posts.delete_all().await?;
    Ok(Json(json!({
        "success": true,
        "message": "All posts deleted successfully",
        "deleted": deleted,
    })))
}

async fn vote(
    State(ctx): State<AppContext>,
    ClientIp(ip): ClientIp,
    Path((id, vote_type)): Path<(String, String)>,
) -> Result<Json<Post>, AppError> {
    let id = parse_id(&id, "post")?;
    let direction: VoteDirection = vote_type.parse().map_err(AppError::Validation)?;
    Ok(Json(ctx.votes.cast_vote(id, &ip, direction).await?))
}

async fn add_comment(
    State(ctx): State<AppContext>,
    Authenticated(who): Authenticated,
    Path(id): Path<String>,
    AppJson(body): AppJson<CommentBody>,
) -> Result<Json<Post>, AppError> {
    let id = parse_id(&id, "post")?;
    Ok(Json(ctx.comments.add(id, &who, &body.comment).await?))
}

async fn remove_comment(
    State(ctx): State<AppContext>,
    Authenticated(who): Authenticated,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Post>, AppError> {
    let post_id = parse_id(&post_id, "post")?;
    let comment_id: i32 = comment_id
        .parse()
        .map_err(|_| AppError::Validation("Invalid comment id".to_string()))?;
    Ok(Json(ctx.comments.remove(post_id, comment_id, &who).await?))
}
