mod admin;
mod posts;
mod ratings;
mod users;
mod zips;

use axum::Router;
use clipsesh_app::AppContext;

pub fn api() -> Router<AppContext> {
    Router::new()
        .merge(posts::router())
        .merge(users::router())
        .merge(admin::router())
        .merge(ratings::router())
        .merge(zips::router())
}
