use crate::extract::{parse_id, AppJson, Authenticated};
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use clipsesh_app::application::AdminUserUpdate;
use clipsesh_app::domain::{AdminConfig, ConfigUpdate, Role};
use clipsesh_app::AppContext;
use clipsesh_errors::AppError;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/admin/config", get(get_config).put(update_config))
        .route("/admin/create-user", post(create_user))
        .route("/admin/users/{id}", put(update_user))
}

#[derive(Deserialize)]
struct NewAccount {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    roles: Option<Vec<Role>>,
}

async fn get_config(State(ctx): State<AppContext>) -> Result<Json<AdminConfig>, AppError> {
    Ok(Json(ctx.config.load().await?))
}

async fn update_config(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    AppJson(update): AppJson<ConfigUpdate>,
) -> Result<Json<AdminConfig>, AppError> {
    auth.require_any(&[Role::Admin])?;
    Ok(Json(ctx.config.update(update).await?))
}

async fn create_user(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    AppJson(body): AppJson<NewAccount>,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Admin])?;
    let user = ctx
        .accounts
        .admin_create(&body.username, &body.password, body.roles)
        .await?;
    Ok(Json(json!({ "message": "User created successfully", "user": user })))
}

async fn update_user(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    Path(id): Path<String>,
    AppJson(update): AppJson<AdminUserUpdate>,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Admin])?;
    let id = parse_id(&id, "user")?;
    let user = ctx.accounts.admin_update(id, update).await?;
    Ok(Json(json!({ "message": "User updated successfully", "user": user })))
}
