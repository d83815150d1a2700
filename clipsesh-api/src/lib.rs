pub mod extract;
mod routes;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::Router;
use clipsesh_app::AppContext;
use clipsesh_errors::AppError;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Clip uploads and manual archive uploads share this cap.
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub fn router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let uploads = ServeDir::new(ctx.settings.upload_dir.clone());
    let downloads = ServeDir::new(ctx.settings.download_dir.clone());
    let pictures = ServeDir::new(ctx.settings.profile_picture_dir.clone());

    Router::new()
        .nest("/api", routes::api())
        .nest_service("/uploads", uploads)
        .nest_service("/download", downloads)
        .nest_service("/profilePictures", pictures)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CompressionLayer::new())
        .with_state(ctx)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
