//! Clip download handler.

use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::path::Path;
use tokio_util::io::ReaderStream;

use crate::error::{ApiError, ApiResult};
use crate::handlers::sanitize_filename;
use crate::state::AppState;

/// GET /api/download/:job_id/:filename — stream a produced clip.
pub async fn download_clip(
    State(state): State<AppState>,
    AxumPath((job_id, filename)): AxumPath<(String, String)>,
) -> ApiResult<Response> {
    let job_id = sanitize_filename(&job_id);
    let filename = sanitize_filename(&filename);
    if job_id.is_empty() || filename.is_empty() {
        return Err(ApiError::bad_request("Invalid download path"));
    }

    let path = Path::new(&state.config.output_dir)
        .join(&job_id)
        .join(&filename);

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| ApiError::not_found("File not found"))?;
    let size = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to stat file: {e}")))?
        .len();

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    let response = (
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (header::CONTENT_LENGTH, size.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response();

    Ok(response)
}
