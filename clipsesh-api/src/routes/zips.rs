use crate::extract::{parse_id, AppJson, AppMultipart, Authenticated};
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use clipsesh_app::domain::{ClipDescriptor, EligibleClips, Role, SeasonArchive};
use clipsesh_app::AppContext;
use clipsesh_errors::AppError;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/zips", get(list_zips))
        .route("/zips/eligible", get(eligible))
        .route("/zips/process", post(process))
        .route("/zips/upload", post(upload))
        .route("/zips/{id}", delete(delete_zip))
}

#[derive(Deserialize)]
struct ProcessRequest {
    #[serde(default)]
    clips: Vec<ClipDescriptor>,
    #[serde(default)]
    season: String,
}

async fn list_zips(
    State(ctx): State<AppContext>,
    auth: Authenticated,
) -> Result<Json<Vec<SeasonArchive>>, AppError> {
    auth.require_any(&[Role::Clipteam, Role::Editor, Role::Admin])?;
    Ok(Json(ctx.archives.list().await?))
}

async fn eligible(
    State(ctx): State<AppContext>,
    auth: Authenticated,
) -> Result<Json<EligibleClips>, AppError> {
    auth.require_any(&[Role::Clipteam, Role::Admin])?;
    Ok(Json(ctx.ratings.eligible().await?))
}

async fn process(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    AppJson(body): AppJson<ProcessRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Clipteam, Role::Admin])?;
    let zip = ctx.archives.process_season(body.clips, &body.season).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Zip file processed and stored successfully",
        "zip": zip,
    })))
}

async fn upload(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Admin])?;

    let mut file = None;
    let mut season = String::new();
    let mut clip_amount = String::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "clipsZip" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                file = Some((file_name, data));
            }
            "season" => {
                season = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
            }
            "clipAmount" => {
                clip_amount = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("A zip file is required".to_string()))?;
    let clip_amount: i32 = clip_amount
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("clipAmount must be a number".to_string()))?;

    let zip = ctx
        .archives
        .register_upload(file_name, data, &season, clip_amount)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Zip file uploaded successfully",
        "zip": zip,
    })))
}

async fn delete_zip(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    auth.require_any(&[Role::Admin])?;
    let id = parse_id(&id, "zip")?;
    ctx.archives.delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Zip file deleted successfully" })))
}
