//! Clip-timing planner.
//!
//! Pure function from a video's duration and user constraints to an
//! ordered sequence of clip start/duration pairs. No side effects, no
//! hidden randomness: identical inputs always yield identical plans.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default target clip duration for platforms not in the defaults table.
const FALLBACK_CLIP_SECS: u32 = 30;

/// Errors from clip planning.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// One planned clip: where it starts and how long it runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipPlan {
    /// 0-based sequence index
    pub index: usize,
    /// Start offset in seconds
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
    /// Target platform tag
    pub platform: String,
}

/// Default target clip duration for a platform, in seconds.
pub fn platform_default_duration(platform: &str) -> u32 {
    match platform.to_lowercase().as_str() {
        "tiktok" => 30,
        "instagram" => 30,
        "youtube" => 60,
        "twitter" => 45,
        _ => FALLBACK_CLIP_SECS,
    }
}

/// Whether clips for this platform use the vertical 9:16 frame.
pub fn is_vertical_platform(platform: &str) -> bool {
    matches!(
        platform.to_lowercase().as_str(),
        "instagram" | "tiktok" | "youtube"
    )
}

/// Resolve the target clip duration from the user constraints.
///
/// Midpoint of min/max when both are given (integer division), the single
/// bound when only one is given, otherwise the platform default. The result
/// is clamped back into `[min, max]` when both bounds were supplied.
fn resolve_target_duration(
    min_duration: Option<u32>,
    max_duration: Option<u32>,
    platform: &str,
) -> u32 {
    let mut target = match (min_duration, max_duration) {
        // Widened so pathological bounds cannot overflow the sum.
        (Some(min), Some(max)) => ((min as u64 + max as u64) / 2) as u32,
        (Some(min), None) => min,
        (None, Some(max)) => max,
        (None, None) => platform_default_duration(platform),
    };

    if let Some(min) = min_duration {
        target = target.max(min);
    }
    if let Some(max) = max_duration {
        target = target.min(max);
    }
    target
}

/// Plan clip timings across a video.
///
/// Short videos collapse to a single clip spanning the whole input.
/// Otherwise exactly `clip_count` clips are returned: evenly spaced
/// (possibly overlapping) starts when the video is shorter than
/// `target * clip_count`, non-overlapping section starts when it is longer.
/// Every start lies in `[0, total_duration)` and no clip runs past the end.
pub fn plan_clips(
    total_duration: f64,
    clip_count: u32,
    min_duration: Option<u32>,
    max_duration: Option<u32>,
    platform: &str,
) -> Result<Vec<ClipPlan>, PlanError> {
    if total_duration <= 0.0 {
        return Err(PlanError::InvalidInput(format!(
            "total duration must be positive, got {total_duration}"
        )));
    }
    if clip_count == 0 {
        return Err(PlanError::InvalidInput(
            "clip count must be positive".to_string(),
        ));
    }

    let target = resolve_target_duration(min_duration, max_duration, platform) as f64;

    // Video shorter than one clip: a single clip covering the full input.
    if total_duration < target {
        return Ok(vec![ClipPlan {
            index: 0,
            start: 0.0,
            duration: total_duration,
            platform: platform.to_string(),
        }]);
    }

    let count = clip_count as usize;
    let starts: Vec<f64> = if total_duration <= target * clip_count as f64 {
        // Clips overlap or just fit: spread starts evenly across the video.
        (0..count)
            .map(|i| i as f64 * (total_duration / clip_count as f64))
            .collect()
    } else {
        // Long video: one clip per non-overlapping section.
        let section = (total_duration - target) / (clip_count.max(2) - 1) as f64;
        (0..count).map(|i| i as f64 * section).collect()
    };

    let plan = starts
        .into_iter()
        .enumerate()
        .map(|(index, start)| {
            let start = if start + target > total_duration {
                (total_duration - target).max(0.0)
            } else {
                start
            };
            ClipPlan {
                index,
                start,
                duration: target,
                platform: platform.to_string(),
            }
        })
        .collect();

    Ok(plan)
}
