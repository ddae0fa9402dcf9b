//! Batch orchestration.
//!
//! Walks the input tree, imports each model into the scene, renders every
//! capture direction, then crops and writes metadata. Import and render
//! failures are isolated to the asset (or direction) they happen on; only
//! discovery and scene setup abort a run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::bounds::{scene_bounds, SceneBounds};
use crate::camera::{place_camera, CameraPose};
use crate::canvas::CanvasSpec;
use crate::config::RunConfig;
use crate::crop::Cropper;
use crate::discovery::{find_models, ModelAsset};
use crate::error::{BatchError, SceneError};
use crate::metadata::{self, SpriteMetadata};
use crate::rotation::{directions, Compass, Direction};
use crate::scene::{RenderRequest, Scene};

/// One failed asset or direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedItem {
    /// Asset path relative to the input root.
    pub asset: String,
    /// Failing direction; `None` when the asset failed before rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Compass>,
    /// Error message
    pub error: String,
    /// Stable error code, when the failure came from the scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl FailedItem {
    fn from_scene_error(asset: &ModelAsset, direction: Option<Compass>, err: &SceneError) -> Self {
        Self {
            asset: asset.display_name(),
            direction,
            error: err.to_string(),
            code: Some(err.code().to_string()),
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Assets discovered
    pub total: usize,
    /// Assets with every direction rendered
    pub processed: usize,
    /// Assets skipped because their outputs already existed
    pub skipped: usize,
    /// Assets with at least one failure
    pub failed: usize,
    /// Failure details in processing order
    pub failures: Vec<FailedItem>,
    /// Assets rendered without mesh geometry
    pub degraded: Vec<String>,
    /// Total runtime in seconds
    pub runtime_seconds: f64,
}

impl BatchResult {
    fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
            degraded: Vec::new(),
            runtime_seconds: 0.0,
        }
    }

    /// True when no asset failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Distinct failed assets, in processing order.
    pub fn failed_assets(&self) -> Vec<&str> {
        let mut assets: Vec<&str> = Vec::new();
        for item in &self.failures {
            if assets.last() != Some(&item.asset.as_str()) {
                assets.push(&item.asset);
            }
        }
        assets
    }
}

enum AssetOutcome {
    Processed,
    Skipped,
    Failed,
}

/// Runs the whole pipeline over `config.input_dir`.
///
/// `scene` is configured once, then reused for every asset.
pub fn run_batch(
    config: &RunConfig,
    scene: &mut dyn Scene,
    cropper: &dyn Cropper,
) -> Result<BatchResult, BatchError> {
    let start = Instant::now();

    let assets = find_models(&config.input_dir, &config.formats)?;
    if assets.is_empty() {
        return Err(BatchError::NoAssets {
            input_dir: config.input_dir.clone(),
        });
    }
    info!(
        "Found {} model file(s) in {}",
        assets.len(),
        config.input_dir.display()
    );

    let directions = directions(config.rotations, config.camera_yaw);
    let canvas = CanvasSpec::for_config(config);
    info!(
        "Canvas: {}x{} px ({} px/unit, ortho scale {}), {} direction(s), crop: {}",
        canvas.size,
        canvas.size,
        config.pixels_per_unit,
        config.ortho_scale,
        directions.len(),
        cropper.name()
    );

    scene
        .configure(&config.render_settings())
        .map_err(BatchError::Setup)?;

    let initial_pose = place_camera([0.0; 3], config.camera_angle, directions[0].yaw_degrees);
    let mut run = BatchRun {
        config,
        scene,
        cropper,
        directions,
        canvas,
        last_pose: initial_pose,
        claimed: HashMap::new(),
        result: BatchResult::new(assets.len()),
    };

    let total = assets.len();
    for (index, asset) in assets.iter().enumerate() {
        info!("[{}/{}] Processing: {}", index + 1, total, asset.display_name());
        match run.process(asset) {
            AssetOutcome::Processed => run.result.processed += 1,
            AssetOutcome::Skipped => run.result.skipped += 1,
            AssetOutcome::Failed => run.result.failed += 1,
        }
    }

    let mut result = run.result;
    result.runtime_seconds = start.elapsed().as_secs_f64();
    info!(
        "Batch complete: {} processed, {} skipped, {} failed",
        result.processed, result.skipped, result.failed
    );
    Ok(result)
}

struct BatchRun<'a> {
    config: &'a RunConfig,
    scene: &'a mut dyn Scene,
    cropper: &'a dyn Cropper,
    directions: Vec<Direction>,
    canvas: CanvasSpec,
    /// Pose of the most recent render; reused when an asset has no geometry.
    last_pose: CameraPose,
    /// Output image path -> asset that owns it.
    claimed: HashMap<PathBuf, String>,
    result: BatchResult,
}

impl BatchRun<'_> {
    fn process(&mut self, asset: &ModelAsset) -> AssetOutcome {
        let outputs: Vec<PathBuf> = self
            .directions
            .iter()
            .map(|direction| asset.output_path(&self.config.output_dir, direction))
            .collect();

        // Assets differing only by extension share a stem; the first in
        // path order keeps the outputs.
        let collision = outputs
            .iter()
            .find_map(|path| self.claimed.get(path).map(|owner| (path, owner)));
        if let Some((path, owner)) = collision {
            let message = format!(
                "Output {} is already produced by {}",
                path.display(),
                owner
            );
            warn!("Failed: {}: {}", asset.display_name(), message);
            self.result.failures.push(FailedItem {
                asset: asset.display_name(),
                direction: None,
                error: message,
                code: None,
            });
            return AssetOutcome::Failed;
        }
        for path in &outputs {
            self.claimed.insert(path.clone(), asset.display_name());
        }

        if self.config.skip_existing && outputs.iter().all(|path| path.exists()) {
            info!("Skipping (already exists): {}", asset.display_name());
            return AssetOutcome::Skipped;
        }

        let bounds = match self.load(asset) {
            Ok(bounds) => bounds,
            Err(e) => {
                error!("Failed: {}: {}", asset.display_name(), e);
                self.result
                    .failures
                    .push(FailedItem::from_scene_error(asset, None, &e));
                return AssetOutcome::Failed;
            }
        };

        let canvas = match &bounds {
            Some(bounds) => {
                debug!(
                    "Bounds: {:.3} x {:.3} x {:.3}, center ({:.3}, {:.3}, {:.3})",
                    bounds.width(),
                    bounds.height(),
                    bounds.depth(),
                    bounds.center()[0],
                    bounds.center()[1],
                    bounds.center()[2]
                );
                self.canvas
            }
            None => {
                warn!(
                    "No mesh geometry in {}; rendering with previous camera and minimum canvas",
                    asset.display_name()
                );
                self.result.degraded.push(asset.display_name());
                CanvasSpec::minimum(self.config)
            }
        };

        let directions = self.directions.clone();
        let mut all_ok = true;
        for (direction, output) in directions.iter().zip(&outputs) {
            let pose = match &bounds {
                Some(bounds) => place_camera(
                    bounds.center(),
                    self.config.camera_angle,
                    direction.yaw_degrees,
                ),
                None => self.last_pose,
            };
            self.last_pose = pose;

            if let Err(e) = self.render_direction(direction, output, pose, canvas, bounds.as_ref()) {
                error!(
                    "Failed: {} ({}): {}",
                    asset.display_name(),
                    direction.compass,
                    e
                );
                self.result.failures.push(FailedItem::from_scene_error(
                    asset,
                    Some(direction.compass),
                    &e,
                ));
                all_ok = false;
            }
        }

        if all_ok {
            AssetOutcome::Processed
        } else {
            AssetOutcome::Failed
        }
    }

    /// Clears the scene, imports `asset` and measures it.
    fn load(&mut self, asset: &ModelAsset) -> Result<Option<SceneBounds>, SceneError> {
        self.scene.clear()?;
        let meshes = self.scene.import(&asset.path, self.config.scale_factor)?;
        debug!("Imported {} mesh object(s)", meshes.len());

        let bounds = scene_bounds(&meshes);
        if bounds.is_none() && self.config.fail_on_empty_geometry {
            return Err(SceneError::NoGeometry {
                path: asset.path.clone(),
            });
        }
        Ok(bounds)
    }

    fn render_direction(
        &mut self,
        direction: &Direction,
        output: &Path,
        pose: CameraPose,
        canvas: CanvasSpec,
        bounds: Option<&SceneBounds>,
    ) -> Result<(), SceneError> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SceneError::render_failed(format!(
                    "cannot create output directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        debug!(
            "Rendering {} (yaw {}) at {}px -> {}",
            direction.compass,
            direction.yaw_degrees,
            canvas.size,
            output.display()
        );
        self.scene.render(&RenderRequest {
            pose,
            canvas_size: canvas.size,
            output_path: output.to_path_buf(),
        })?;

        if !output.is_file() {
            return Err(SceneError::OutputMissing {
                path: output.to_path_buf(),
            });
        }

        let crop = self.cropper.crop(output);
        let record = SpriteMetadata::new(self.config, canvas, bounds, direction).with_crop(crop);
        metadata::emit(output, &record);

        info!("Rendered: {}", output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::NoopCropper;
    use crate::scene::{MeshNode, RenderSettings, IDENTITY};

    /// Records requests; renders write a placeholder file.
    #[derive(Default)]
    struct RecordingScene {
        configured: usize,
        empty: bool,
        fail_configure: bool,
        renders: Vec<RenderRequest>,
    }

    impl Scene for RecordingScene {
        fn configure(&mut self, _settings: &RenderSettings) -> Result<(), SceneError> {
            if self.fail_configure {
                return Err(SceneError::backend("engine unavailable"));
            }
            self.configured += 1;
            Ok(())
        }

        fn clear(&mut self) -> Result<(), SceneError> {
            Ok(())
        }

        fn import(&mut self, _path: &Path, _scale: f64) -> Result<Vec<MeshNode>, SceneError> {
            if self.empty {
                return Ok(Vec::new());
            }
            Ok(vec![MeshNode::from_local_box(
                "Cube",
                [4.0, 4.0, 0.0],
                [6.0, 6.0, 2.0],
                IDENTITY,
            )])
        }

        fn render(&mut self, request: &RenderRequest) -> Result<(), SceneError> {
            fs::write(&request.output_path, b"sprite").unwrap();
            self.renders.push(request.clone());
            Ok(())
        }
    }

    fn config_for(input: &Path, output: &Path) -> RunConfig {
        RunConfig {
            input_dir: input.to_path_buf(),
            output_dir: output.to_path_buf(),
            auto_crop: false,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_for(tmp.path(), &tmp.path().join("out"));
        let mut scene = RecordingScene::default();

        let err = run_batch(&config, &mut scene, &NoopCropper).unwrap_err();
        assert!(matches!(err, BatchError::NoAssets { .. }));
        assert_eq!(scene.configured, 0);
    }

    #[test]
    fn test_configure_failure_aborts_run() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.glb"), b"").unwrap();
        let config = config_for(tmp.path(), &tmp.path().join("out"));
        let mut scene = RecordingScene {
            fail_configure: true,
            ..Default::default()
        };

        let err = run_batch(&config, &mut scene, &NoopCropper).unwrap_err();
        assert!(matches!(err, BatchError::Setup(_)));
    }

    #[test]
    fn test_camera_targets_object_center() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.glb"), b"").unwrap();
        let config = config_for(tmp.path(), &tmp.path().join("out"));
        let mut scene = RecordingScene::default();

        let result = run_batch(&config, &mut scene, &NoopCropper).unwrap();
        assert_eq!(result.processed, 1);
        assert_eq!(scene.configured, 1);

        let expected = place_camera([5.0, 5.0, 1.0], config.camera_angle, 0.0);
        assert_eq!(scene.renders[0].pose, expected);
        assert_eq!(scene.renders[0].canvas_size, 1024);
    }

    #[test]
    fn test_degraded_asset_reuses_initial_pose_and_minimum_canvas() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("empty.obj"), b"").unwrap();
        let config = config_for(tmp.path(), &tmp.path().join("out"));
        let mut scene = RecordingScene {
            empty: true,
            ..Default::default()
        };

        let result = run_batch(&config, &mut scene, &NoopCropper).unwrap();
        assert_eq!(result.processed, 1);
        assert_eq!(result.degraded, vec!["empty.obj".to_string()]);

        let request = &scene.renders[0];
        assert_eq!(request.canvas_size, config.min_canvas_size);
        assert_eq!(request.pose, place_camera([0.0; 3], config.camera_angle, 0.0));
    }

    #[test]
    fn test_failed_assets_are_listed_once() {
        let result = BatchResult {
            failures: vec![
                FailedItem {
                    asset: "a.glb".into(),
                    direction: Some(Compass::East),
                    error: "x".into(),
                    code: None,
                },
                FailedItem {
                    asset: "a.glb".into(),
                    direction: Some(Compass::West),
                    error: "x".into(),
                    code: None,
                },
                FailedItem {
                    asset: "b.glb".into(),
                    direction: None,
                    error: "y".into(),
                    code: None,
                },
            ],
            failed: 2,
            ..BatchResult::new(3)
        };
        assert_eq!(result.failed_assets(), vec!["a.glb", "b.glb"]);
        assert!(!result.is_success());
    }
}
