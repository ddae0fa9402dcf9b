//! Test harness: a scripted scene and a scratch model tree.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

use spritebake_core::scene::{MeshNode, RenderRequest, RenderSettings, Scene, IDENTITY};
use spritebake_core::{RunConfig, SceneError};

/// Model file content that imports with no mesh geometry.
pub const EMPTY_MODEL: &str = "empty";

/// Model file content the fake importer rejects.
pub const BROKEN_MODEL: &str = "broken";

/// A [`Scene`] that never touches a render engine.
///
/// Import reads the model file itself: [`EMPTY_MODEL`] and [`BROKEN_MODEL`]
/// trigger those cases, a JSON array is taken as the mesh list, anything
/// else is a unit cube centered on the origin. Renders write a transparent
/// PNG with an opaque square covering the middle quarter.
pub struct FakeScene {
    /// Extensions the importer accepts.
    pub supported: Vec<String>,
    /// Renders whose output file name contains one of these fail.
    pub fail_outputs: Vec<String>,
    /// Renders whose output file name contains one of these succeed
    /// without writing anything.
    pub silent_outputs: Vec<String>,

    pub configured: Vec<RenderSettings>,
    pub clears: usize,
    pub imports: Vec<PathBuf>,
    pub renders: Vec<RenderRequest>,
}

impl Default for FakeScene {
    fn default() -> Self {
        Self {
            supported: [".gltf", ".glb", ".obj", ".fbx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fail_outputs: Vec::new(),
            silent_outputs: Vec::new(),
            configured: Vec::new(),
            clears: 0,
            imports: Vec::new(),
            renders: Vec::new(),
        }
    }
}

impl FakeScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails renders whose output name contains `pattern`.
    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.fail_outputs.push(pattern.to_string());
        self
    }

    /// Skips writing outputs whose name contains `pattern`.
    pub fn silent_on(mut self, pattern: &str) -> Self {
        self.silent_outputs.push(pattern.to_string());
        self
    }

    fn matches(patterns: &[String], path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        patterns.iter().any(|p| name.contains(p.as_str()))
    }
}

/// A unit cube around the origin, scaled uniformly.
pub fn unit_cube(name: &str, scale: f64) -> MeshNode {
    let mut matrix = IDENTITY;
    for (i, row) in matrix.iter_mut().enumerate().take(3) {
        row[i] = scale;
    }
    MeshNode::from_local_box(name, [-0.5; 3], [0.5; 3], matrix)
}

/// An axis-aligned box mesh between `min` and `max` in world space.
pub fn box_mesh(name: &str, min: [f64; 3], max: [f64; 3]) -> MeshNode {
    MeshNode::from_local_box(name, min, max, IDENTITY)
}

impl Scene for FakeScene {
    fn configure(&mut self, settings: &RenderSettings) -> Result<(), SceneError> {
        self.configured.push(*settings);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SceneError> {
        self.clears += 1;
        Ok(())
    }

    fn import(&mut self, path: &Path, scale_factor: f64) -> Result<Vec<MeshNode>, SceneError> {
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_ascii_lowercase()))
            .unwrap_or_default();
        if !self.supported.contains(&extension) {
            return Err(SceneError::UnsupportedFormat { extension });
        }
        self.imports.push(path.to_path_buf());

        let content = fs::read_to_string(path)
            .map_err(|e| SceneError::import_failed(path, e.to_string()))?;
        let content = content.trim();
        if content == EMPTY_MODEL {
            return Ok(Vec::new());
        }
        if content == BROKEN_MODEL {
            return Err(SceneError::import_failed(path, "corrupt file"));
        }
        if content.starts_with('[') {
            return serde_json::from_str(content)
                .map_err(|e| SceneError::import_failed(path, e.to_string()));
        }
        Ok(vec![unit_cube("Cube", scale_factor)])
    }

    fn render(&mut self, request: &RenderRequest) -> Result<(), SceneError> {
        self.renders.push(request.clone());
        let path = &request.output_path;

        if Self::matches(&self.fail_outputs, path) {
            return Err(SceneError::render_failed("GPU out of memory"));
        }
        if Self::matches(&self.silent_outputs, path) {
            return Ok(());
        }

        let size = request.canvas_size;
        let mut image = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
        let quarter = size / 4;
        for y in (size / 2 - quarter / 2)..(size / 2 + quarter / 2) {
            for x in (size / 2 - quarter / 2)..(size / 2 + quarter / 2) {
                image.put_pixel(x, y, Rgba([90, 140, 60, 255]));
            }
        }
        image
            .save(path)
            .map_err(|e| SceneError::render_failed(e.to_string()))
    }
}

/// Scratch input and output directories for one test.
pub struct ModelTree {
    pub dir: TempDir,
}

impl ModelTree {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("models")).expect("Failed to create models dir");
        Self { dir }
    }

    pub fn input(&self) -> PathBuf {
        self.dir.path().join("models")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("sprites")
    }

    /// Writes a model file at `rel` under the input root.
    pub fn add_model(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.input().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create model dir");
        }
        fs::write(&path, content).expect("Failed to write model");
        path
    }

    /// Writes a model made of `meshes`.
    pub fn add_meshes(&self, rel: &str, meshes: &[MeshNode]) -> PathBuf {
        let json = serde_json::to_string(meshes).expect("Failed to serialize meshes");
        self.add_model(rel, &json)
    }

    /// Default run config rooted in this tree.
    pub fn config(&self) -> RunConfig {
        RunConfig {
            input_dir: self.input(),
            output_dir: self.output(),
            ..RunConfig::default()
        }
    }

    /// Path of an output file relative to the output root.
    pub fn sprite(&self, rel: &str) -> PathBuf {
        self.output().join(rel)
    }

    /// Parsed sidecar for the sprite at `rel`.
    pub fn sidecar(&self, rel: &str) -> serde_json::Value {
        let path = self.sprite(rel).with_extension("json");
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        serde_json::from_str(&content).expect("Sidecar is not valid JSON")
    }
}

impl Default for ModelTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if Blender tests should run based on environment variable.
pub fn should_run_blender_tests() -> bool {
    std::env::var("SPRITEBAKE_RUN_BLENDER_TESTS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
