//! Media file upload handler.

use axum::extract::Multipart;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ApiError;
use crate::schema::upload::UploadResponse;

/// Accepts a multipart file and returns it base64-encoded.
///
/// `POST /api/upload` — the editor embeds the result into a media node's
/// `mediaUrl` as a data URI. Nothing is written to disk.
pub async fn upload(mut multipart: Multipart) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("bad multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("bad multipart field: {}", e)))?;
        return Ok(Json(UploadResponse {
            filename,
            base64: STANDARD.encode(&bytes),
            content_type,
            size: bytes.len(),
        }));
    }
    Err(ApiError::BadRequest("file field is required".to_string()))
}
