//! HTTP server and job supervisor for the video clipper backend.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod supervisor;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
