//! Shared data models for the video clipper backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs, their status lifecycle, and processing options
//! - Clip plans and the pure clip-timing planner
//! - Per-run metadata written alongside produced clips

pub mod job;
pub mod metadata;
pub mod plan;

// Re-export common types
pub use job::{Job, JobId, JobStatus, OutputFile, ProcessOptions, MESSAGE_MAX_LEN};
pub use metadata::{ClipOutcome, RunMetadata};
pub use plan::{is_vertical_platform, plan_clips, platform_default_duration, ClipPlan, PlanError};
