//! Sidecar metadata.
//!
//! Every sprite gets a JSON file with the same stem describing how it was
//! framed, so an importer can scale and re-anchor it without guessing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::bounds::SceneBounds;
use crate::canvas::CanvasSpec;
use crate::config::RunConfig;
use crate::crop::CropInfo;
use crate::error::MetadataError;
use crate::rotation::Direction;

/// World-space point with named axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Object dimensions as written to metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectBounds {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub center: Point3,
}

impl From<&SceneBounds> for ObjectBounds {
    fn from(bounds: &SceneBounds) -> Self {
        let [x, y, z] = bounds.center();
        Self {
            width: bounds.width(),
            height: bounds.height(),
            depth: bounds.depth(),
            center: Point3 { x, y, z },
        }
    }
}

/// Record describing one produced sprite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteMetadata {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub ortho_scale: f64,
    pub pixels_per_unit: f64,
    /// Absent when the import had no mesh geometry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_bounds: Option<ObjectBounds>,
    pub rotation_degrees: u32,
    pub direction: String,
    /// Crop bookkeeping, present only when the sprite was cropped.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropInfo>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub degraded: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SpriteMetadata {
    /// Builds the record for a render of `direction`.
    pub fn new(
        config: &RunConfig,
        canvas: CanvasSpec,
        bounds: Option<&SceneBounds>,
        direction: &Direction,
    ) -> Self {
        Self {
            canvas_width: canvas.size,
            canvas_height: canvas.size,
            ortho_scale: config.ortho_scale,
            pixels_per_unit: config.pixels_per_unit,
            object_bounds: bounds.map(ObjectBounds::from),
            rotation_degrees: direction.rotation_degrees,
            direction: direction.compass.as_str().to_string(),
            crop: None,
            degraded: bounds.is_none(),
        }
    }

    /// Attaches crop bookkeeping.
    pub fn with_crop(mut self, crop: Option<CropInfo>) -> Self {
        self.crop = crop;
        self
    }
}

/// Sidecar path for an image: same path, `.json` extension.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("json")
}

/// Writes the sidecar for `image_path`, replacing any previous one.
pub fn write_sidecar(image_path: &Path, metadata: &SpriteMetadata) -> Result<PathBuf, MetadataError> {
    let path = sidecar_path(image_path);
    let json = serde_json::to_string_pretty(metadata).map_err(MetadataError::Serialize)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| MetadataError::Write {
            path: path.clone(),
            source: e,
        })?;
    }
    fs::write(&path, json).map_err(|e| MetadataError::Write {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

/// Best-effort variant of [`write_sidecar`]: failures are logged only.
pub fn emit(image_path: &Path, metadata: &SpriteMetadata) -> bool {
    match write_sidecar(image_path, metadata) {
        Ok(path) => {
            debug!("Exported metadata: {}", path.display());
            true
        }
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}
