//! Interfaces to the 3D scene and render engine.
//!
//! The pipeline never touches a renderer directly. Everything it needs from
//! the engine goes through an explicit [`Scene`] handle, so one run owns one
//! scene and independent runs can own independent scenes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::CameraPose;
use crate::error::SceneError;

/// A point or direction in world space `[x, y, z]`, Z up.
pub type Vec3 = [f64; 3];

/// A row-major 4x4 affine transform.
pub type Mat4 = [[f64; 4]; 4];

/// The identity transform.
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// A mesh object as reported by the importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    /// Object name inside the engine.
    pub name: String,
    /// Local-to-world transform.
    pub matrix_world: Mat4,
    /// The 8 corners of the local bounding box.
    pub bound_box: [Vec3; 8],
}

impl MeshNode {
    /// Creates a node from a local axis-aligned box and a transform.
    pub fn from_local_box(name: impl Into<String>, min: Vec3, max: Vec3, matrix_world: Mat4) -> Self {
        let mut bound_box = [[0.0; 3]; 8];
        for (i, corner) in bound_box.iter_mut().enumerate() {
            *corner = [
                if i & 1 == 0 { min[0] } else { max[0] },
                if i & 2 == 0 { min[1] } else { max[1] },
                if i & 4 == 0 { min[2] } else { max[2] },
            ];
        }
        Self {
            name: name.into(),
            matrix_world,
            bound_box,
        }
    }
}

/// Sun light parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSettings {
    pub strength: f64,
    /// Tilt in degrees.
    pub angle_x: f64,
    /// Heading in degrees.
    pub angle_z: f64,
}

/// Scene-wide settings applied once before the first asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Initial square resolution; every render request overrides it.
    pub resolution: u32,
    /// Anti-aliasing samples.
    pub samples: u32,
    /// Orthographic view width in model-space units.
    pub ortho_scale: f64,
    pub light: LightSettings,
}

/// One render of the current scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub pose: CameraPose,
    /// Square canvas edge in pixels.
    pub canvas_size: u32,
    /// Destination PNG (RGBA, 8 bits per channel).
    pub output_path: PathBuf,
}

/// An explicit handle to a 3D scene owned by a render engine.
///
/// Implementations hold mutable engine state; callers drive them strictly
/// sequentially.
pub trait Scene {
    /// Sets up camera, light and output format. Called once per run.
    fn configure(&mut self, settings: &RenderSettings) -> Result<(), SceneError>;

    /// Removes imported geometry. Camera and light persist.
    fn clear(&mut self) -> Result<(), SceneError>;

    /// Imports a model, scaling its root objects by `scale_factor`, and
    /// returns every mesh now present in the scene.
    fn import(&mut self, path: &Path, scale_factor: f64) -> Result<Vec<MeshNode>, SceneError>;

    /// Renders the scene from `request.pose` into `request.output_path`.
    fn render(&mut self, request: &RenderRequest) -> Result<(), SceneError>;
}

impl<S: Scene + ?Sized> Scene for Box<S> {
    fn configure(&mut self, settings: &RenderSettings) -> Result<(), SceneError> {
        (**self).configure(settings)
    }

    fn clear(&mut self) -> Result<(), SceneError> {
        (**self).clear()
    }

    fn import(&mut self, path: &Path, scale_factor: f64) -> Result<Vec<MeshNode>, SceneError> {
        (**self).import(path, scale_factor)
    }

    fn render(&mut self, request: &RenderRequest) -> Result<(), SceneError> {
        (**self).render(request)
    }
}
