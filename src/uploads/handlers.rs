use axum::{
    extract::{
        multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::services::{ext_from_mime, presign_image, store_image, UploadItem, UploadKind};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_path: String,
}

pub fn upload_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/uploads/:kind", post(upload_image))
        .route("/uploads/:kind/:file", get(get_image))
        .layer(DefaultBodyLimit::max(max_bytes))
}

fn parse_kind(kind: &str) -> AppResult<UploadKind> {
    kind.parse()
        .map_err(|_| AppError::NotFound(format!("Unknown upload kind {}", kind)))
}

/// POST /uploads/{products|users} (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    mp: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let kind = parse_kind(&kind)?;
    let mut mp = mp?;

    let mut item = None;
    while let Some(field) = mp.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if ext_from_mime(&content_type).is_none() {
            warn!(%content_type, "rejected upload");
            return Err(AppError::Validation(format!(
                "unsupported image type {}",
                content_type
            )));
        }
        let body = field.bytes().await.map_err(|e| {
            warn!(error = %e, "reading upload body failed");
            AppError::from(e)
        })?;
        item = Some(UploadItem { body, content_type });
        break;
    }

    let item = item.ok_or_else(|| AppError::Validation("image is required".into()))?;
    let size = item.body.len();
    let image_path = store_image(&state, kind, item).await?;

    info!(%image_path, size, "image uploaded");
    Ok((StatusCode::CREATED, Json(UploadResponse { image_path })))
}

/// 307 to a presigned URL of the stored object.
#[instrument(skip(state))]
pub async fn get_image(
    State(state): State<AppState>,
    Path((kind, file)): Path<(String, String)>,
) -> AppResult<Redirect> {
    let kind = parse_kind(&kind)?;
    if file.contains("..") {
        return Err(AppError::Validation("invalid file name".into()));
    }
    let url = presign_image(&state, kind, &file)
        .await
        .map_err(|e| {
            warn!(error = %e, %file, "image lookup failed");
            AppError::NotFound("Image not found".into())
        })?;
    Ok(Redirect::temporary(&url))
}
