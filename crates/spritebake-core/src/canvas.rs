//! Canvas sizing.
//!
//! The canvas depends only on the projection parameters, never on the asset,
//! so every sprite of a run shares one size and sprite sheets stitch cleanly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RunConfig;

/// Square output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSpec {
    /// Edge length in pixels (power of two).
    pub size: u32,
}

impl CanvasSpec {
    /// Canvas for a run, derived from its projection parameters.
    pub fn for_config(config: &RunConfig) -> Self {
        Self {
            size: canvas_size(
                config.ortho_scale,
                config.pixels_per_unit,
                config.min_canvas_size,
                config.max_canvas_size,
            ),
        }
    }

    /// Fallback canvas when there is nothing to frame.
    pub fn minimum(config: &RunConfig) -> Self {
        Self {
            size: config.min_canvas_size,
        }
    }
}

/// `clamp(next_power_of_two(ceil(ortho_scale * pixels_per_unit)), min, max)`.
///
/// A required size above `max` is silently capped.
pub fn canvas_size(ortho_scale: f64, pixels_per_unit: f64, min: u32, max: u32) -> u32 {
    let required = (ortho_scale * pixels_per_unit).ceil();
    if !required.is_finite() || required <= 1.0 {
        return min;
    }
    if required >= f64::from(max) {
        if required > f64::from(max) {
            debug!(
                "Required canvas {}px exceeds maximum {}px; capping",
                required, max
            );
        }
        return max;
    }

    let size = (required as u32).next_power_of_two();
    size.clamp(min, max)
}
