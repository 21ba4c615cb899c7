use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use serde_json::{Value, json};

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    server::AppState,
};

/// POST /api/v1/upload/image - stores the multipart `file` field
#[tracing::instrument(skip_all)]
pub async fn image(
    State(state): State<AppState>,
    _user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Value>> {
    let mut multipart =
        multipart.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_owned();
        let data = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(err.body_text()))?;

        let blob = state.blobs.upload(data.to_vec(), &content_type).await?;
        tracing::info!(blob_id = %blob.id, "image uploaded");

        return Ok(Json(json!({
            "success": true,
            "message": "Image uploaded successfully",
            "data": blob,
        })));
    }

    Err(AppError::BadRequest("No file uploaded".to_owned()))
}
