//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::download::download_clip;
use crate::handlers::health::health;
use crate::handlers::process::{process_video, process_youtube};
use crate::handlers::status::{get_status, list_jobs};
use crate::handlers::upload::upload_video;
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/upload", post(upload_video))
        .route("/process", post(process_video))
        .route("/youtube", post(process_youtube))
        .route("/status/:job_id", get(get_status))
        .route("/jobs", get(list_jobs))
        .route("/download/:job_id/:filename", get(download_clip));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
