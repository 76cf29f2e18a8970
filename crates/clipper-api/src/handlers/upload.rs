//! Video upload handler.

use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::handlers::sanitize_filename;
use crate::state::AppState;

/// Accepted source video extensions.
const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// POST /api/upload — accept a multipart video upload.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        // "file" is the legacy field name, kept for older clients.
        if !matches!(field.name(), Some("video") | Some("file")) {
            continue;
        }

        let original_name = field
            .file_name()
            .map(sanitize_filename)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::bad_request("No file selected"))?;

        let extension = PathBuf::from(&original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ApiError::bad_request(format!(
                "File type not allowed: .{extension}"
            )));
        }

        // Prefix with a short unique id so repeated uploads never collide.
        let uuid = Uuid::new_v4().simple().to_string();
        let file_id = &uuid[..8];
        let stored_name = format!("{file_id}_{original_name}");
        let dest = PathBuf::from(&state.config.upload_dir).join(&stored_name);

        let mut file = tokio::fs::File::create(&dest)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to create upload file: {e}")))?;

        let mut written: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::bad_request(format!("Upload interrupted: {e}")))?
        {
            written += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .map_err(|e| ApiError::internal(format!("Failed to write upload: {e}")))?;
        }
        file.flush()
            .await
            .map_err(|e| ApiError::internal(format!("Failed to flush upload: {e}")))?;

        info!(filename = %stored_name, bytes = written, "Upload stored");

        return Ok(Json(json!({
            "file_id": file_id,
            "filename": stored_name,
            "filepath": dest.to_string_lossy(),
            "size": written,
        })));
    }

    Err(ApiError::bad_request("No video file provided"))
}
