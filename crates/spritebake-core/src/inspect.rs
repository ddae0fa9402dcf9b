//! Model size inspection.
//!
//! Measures models without rendering them, to help pick a `scale_factor`
//! that maps model units onto game tiles.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bounds::scene_bounds;
use crate::scene::Scene;

/// Measured size of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSize {
    /// File name of the model.
    pub file: String,
    pub mesh_count: usize,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// Largest of width, height and depth.
    pub max: f64,
}

/// A model that could not be measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedModel {
    pub path: PathBuf,
    pub reason: String,
}

/// Scale factor suggestions derived from the average model size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRecommendations {
    /// Average of every measured model's largest dimension.
    pub average_max: f64,
    /// Makes the average model 1 unit across.
    pub one_unit_per_tile: f64,
    /// Makes the average model 2 units across.
    pub two_units_per_tile: f64,
}

/// Result of inspecting a set of models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectSummary {
    pub models: Vec<ModelSize>,
    pub skipped: Vec<SkippedModel>,
    /// Absent when nothing could be measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<ScaleRecommendations>,
}

impl InspectSummary {
    /// Builds a summary, computing recommendations from `models`.
    pub fn new(models: Vec<ModelSize>, skipped: Vec<SkippedModel>) -> Self {
        let recommendations = recommend(&models);
        Self {
            models,
            skipped,
            recommendations,
        }
    }
}

/// Scale recommendations for `models`, or `None` if there is no usable size.
pub fn recommend(models: &[ModelSize]) -> Option<ScaleRecommendations> {
    if models.is_empty() {
        return None;
    }
    let average_max = models.iter().map(|m| m.max).sum::<f64>() / models.len() as f64;
    if average_max <= 0.0 || !average_max.is_finite() {
        return None;
    }
    Some(ScaleRecommendations {
        average_max,
        one_unit_per_tile: 1.0 / average_max,
        two_units_per_tile: 2.0 / average_max,
    })
}

/// Imports and measures one model at its native scale.
pub fn measure(scene: &mut dyn Scene, path: &Path) -> Result<ModelSize, String> {
    scene.clear().map_err(|e| e.to_string())?;
    let meshes = scene.import(path, 1.0).map_err(|e| e.to_string())?;
    let bounds = scene_bounds(&meshes).ok_or_else(|| "No mesh objects found".to_string())?;

    Ok(ModelSize {
        file: path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        mesh_count: bounds.mesh_count,
        width: bounds.width(),
        height: bounds.height(),
        depth: bounds.depth(),
        max: bounds.max_dimension(),
    })
}

/// Measures every model in `paths`; failures are collected, not fatal.
pub fn inspect_models(scene: &mut dyn Scene, paths: &[PathBuf]) -> InspectSummary {
    let mut models = Vec::new();
    let mut skipped = Vec::new();

    for path in paths {
        info!("Inspecting: {}", path.display());
        match measure(scene, path) {
            Ok(size) => models.push(size),
            Err(reason) => {
                warn!("Skipping {}: {}", path.display(), reason);
                skipped.push(SkippedModel {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }

    InspectSummary::new(models, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(file: &str, max: f64) -> ModelSize {
        ModelSize {
            file: file.to_string(),
            mesh_count: 1,
            width: max,
            height: max / 2.0,
            depth: max / 4.0,
            max,
        }
    }

    #[test]
    fn test_recommendations_from_average_max() {
        let rec = recommend(&[size("a.glb", 2.0), size("b.glb", 6.0)]).unwrap();
        assert_eq!(rec.average_max, 4.0);
        assert_eq!(rec.one_unit_per_tile, 0.25);
        assert_eq!(rec.two_units_per_tile, 0.5);
    }

    #[test]
    fn test_no_recommendations_without_sizes() {
        assert!(recommend(&[]).is_none());
        assert!(recommend(&[size("flat.obj", 0.0)]).is_none());

        let summary = InspectSummary::new(Vec::new(), Vec::new());
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("recommendations").is_none());
    }
}
