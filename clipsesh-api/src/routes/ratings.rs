use crate::extract::{parse_id, AppJson, Authenticated};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use clipsesh_app::domain::{RatingRequest, RatingSummary, Role};
use clipsesh_app::AppContext;
use clipsesh_errors::AppError;

pub fn router() -> Router<AppContext> {
    Router::new().route("/ratings/{clip_id}", get(summary).post(rate))
}

async fn summary(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    Path(clip_id): Path<String>,
) -> Result<Json<RatingSummary>, AppError> {
    auth.require_any(&[Role::Clipteam, Role::Editor, Role::Admin])?;
    let clip_id = parse_id(&clip_id, "clip")?;
    Ok(Json(ctx.ratings.summary(clip_id).await?))
}

async fn rate(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    Path(clip_id): Path<String>,
    AppJson(request): AppJson<RatingRequest>,
) -> Result<Json<RatingSummary>, AppError> {
    let rater = auth.require_any(&[Role::Clipteam, Role::Admin])?;
    let clip_id = parse_id(&clip_id, "clip")?;
    Ok(Json(ctx.ratings.rate(clip_id, rater, request).await?))
}
