//! Job status handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use clipper_models::{Job, JobId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Most recent jobs returned by the listing.
const LIST_LIMIT: usize = 50;

/// GET /api/status/:job_id — poll one job.
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Job>> {
    let id = JobId::from_string(job_id);
    let job = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

/// GET /api/jobs — list recent jobs, newest first.
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let (jobs, total) = state.store.list(LIST_LIMIT).await?;
    Ok(Json(json!({
        "jobs": jobs,
        "total": total,
    })))
}
