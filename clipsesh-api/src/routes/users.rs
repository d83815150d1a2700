use crate::extract::{parse_id, AppJson, AppMultipart, Authenticated};
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use clipsesh_app::application::ProfileUpdate;
use clipsesh_app::domain::{Role, User, UserStatus};
use clipsesh_app::AppContext;
use clipsesh_errors::AppError;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(me))
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/approve", post(approve))
        .route("/users/disable", post(disable))
        .route("/users/resetPassword", post(request_reset))
        .route("/users/resetPassword/confirm", post(confirm_reset))
        .route("/users/uploadProfilePicture", post(upload_profile_picture))
        .route("/users/{id}", put(update_user).delete(delete_user))
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusChange {
    user_id: String,
}

#[derive(Deserialize)]
struct ResetRequest {
    #[serde(default)]
    email: String,
}

#[derive(Deserialize)]
struct ResetConfirm {
    #[serde(default)]
    token: String,
    #[serde(default)]
    password: String,
}

async fn register(
    State(ctx): State<AppContext>,
    AppJson(body): AppJson<Credentials>,
) -> Result<Json<Value>, AppError> {
    let token = ctx.accounts.register(&body.username, &body.password).await?;
    Ok(Json(json!({ "token": token })))
}

async fn login(
    State(ctx): State<AppContext>,
    AppJson(body): AppJson<Credentials>,
) -> Result<Json<Value>, AppError> {
    let token = ctx.accounts.login(&body.username, &body.password).await?;
    Ok(Json(json!({ "token": token })))
}

async fn me(State(ctx): State<AppContext>, Authenticated(who): Authenticated) -> Result<Json<User>, AppError> {
    Ok(Json(ctx.accounts.me(who.id).await?))
}

async fn list_users(State(ctx): State<AppContext>, auth: Authenticated) -> Result<Json<Vec<User>>, AppError> {
    auth.require_any(&[Role::Admin])?;
    Ok(Json(ctx.accounts.list().await?))
}

async fn update_user(
    State(ctx): State<AppContext>,
    Authenticated(who): Authenticated,
    Path(id): Path<String>,
    AppJson(update): AppJson<ProfileUpdate>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id, "user")?;
    let user = ctx.accounts.update_profile(&who, id, update).await?;
    Ok(Json(json!({ "message": "User updated successfully", "user": user })))
}

async fn delete_user(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Admin])?;
    let id = parse_id(&id, "user")?;
    ctx.accounts.delete(id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

async fn approve(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    AppJson(body): AppJson<StatusChange>,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Admin])?;
    let id = parse_id(&body.user_id, "user")?;
    ctx.accounts.set_status(id, UserStatus::Active).await?;
    Ok(Json(json!({ "message": "User approved successfully" })))
}

async fn disable(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    AppJson(body): AppJson<StatusChange>,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Admin])?;
    let id = parse_id(&body.user_id, "user")?;
    ctx.accounts.set_status(id, UserStatus::Disabled).await?;
    Ok(Json(json!({ "message": "User disabled successfully" })))
}

async fn request_reset(
    State(ctx): State<AppContext>,
    AppJson(body): AppJson<ResetRequest>,
) -> Result<Json<Value>, AppError> {
    ctx.accounts.request_reset(&body.email).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Password reset link sent to your email.",
    })))
}

async fn confirm_reset(
    State(ctx): State<AppContext>,
    AppJson(body): AppJson<ResetConfirm>,
) -> Result<Json<Value>, AppError> {
    ctx.accounts.confirm_reset(&body.token, &body.password).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Password has been reset successfully.",
    })))
}

async fn upload_profile_picture(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<Json<Value>, AppError> {
    let who = auth.require_any(&[Role::User, Role::Editor, Role::Uploader, Role::Admin])?;

    let mut picture = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some("profilePicture") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        picture = Some((file_name, data));
    }

    let (file_name, data) =
        picture.ok_or_else(|| AppError::Validation("A profile picture is required".to_string()))?;
    let url = ctx
        .accounts
        .set_profile_picture(who.id, file_name.as_deref(), &data)
        .await?;
    Ok(Json(json!({ "success": true, "profilePictureUrl": url })))
}
