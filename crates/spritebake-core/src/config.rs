//! Run configuration.
//!
//! A [`RunConfig`] is resolved once per run: defaults, then an optional JSON
//! config file, then command-line overrides. The result is validated and
//! shared read-only by every stage of the pipeline. Per-render values such as
//! the camera yaw of a direction travel separately (see [`crate::rotation`]).

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scene::{LightSettings, RenderSettings};

/// Default accepted model extensions.
pub const DEFAULT_FORMATS: &[&str] = &[".gltf", ".glb", ".obj", ".fbx"];

/// Default per-request deadline for the render engine (5 minutes).
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 300;

/// Keys recognised in a config file. Anything else produces a warning.
pub const KNOWN_KEYS: &[&str] = &[
    "input_dir",
    "output_dir",
    "resolution",
    "camera_angle",
    "camera_yaw",
    "samples",
    "ortho_scale",
    "pixels_per_unit",
    "min_canvas_size",
    "max_canvas_size",
    "rotations",
    "light_strength",
    "light_angle_x",
    "light_angle_z",
    "formats",
    "skip_existing",
    "auto_crop",
    "scale_factor",
    "fail_on_empty_geometry",
    "render_timeout_secs",
    "verbose",
    "log_file",
];

/// Immutable settings for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Root directory scanned for models.
    pub input_dir: PathBuf,
    /// Root directory for sprites and sidecars.
    pub output_dir: PathBuf,

    /// Initial render resolution. Advisory only: the canvas is computed.
    pub resolution: u32,
    /// Camera pitch in degrees from horizontal (90 = straight down).
    pub camera_angle: f64,
    /// Camera yaw in degrees for single-direction runs.
    pub camera_yaw: f64,
    /// Anti-aliasing sample count.
    pub samples: u32,

    /// Width of the orthographic view in model-space units.
    pub ortho_scale: f64,
    /// Output pixels per model-space unit.
    pub pixels_per_unit: f64,
    /// Smallest canvas edge in pixels (power of two).
    pub min_canvas_size: u32,
    /// Largest canvas edge in pixels (power of two).
    pub max_canvas_size: u32,

    /// Number of camera directions: 1 or 4.
    pub rotations: u32,

    /// Sun light intensity.
    pub light_strength: f64,
    /// Sun light tilt in degrees.
    pub light_angle_x: f64,
    /// Sun light heading in degrees.
    pub light_angle_z: f64,

    /// Accepted extensions, lowercase with a leading dot.
    pub formats: Vec<String>,
    /// Skip assets whose outputs already exist.
    pub skip_existing: bool,
    /// Crop sprites to their opaque content.
    pub auto_crop: bool,
    /// Uniform scale applied to imported root objects.
    pub scale_factor: f64,
    /// Treat imports without mesh geometry as failures instead of degraded renders.
    pub fail_on_empty_geometry: bool,
    /// Deadline for a single request to the render engine.
    pub render_timeout_secs: u64,

    /// Debug-level console logging.
    pub verbose: bool,
    /// Optional log file (always debug level).
    pub log_file: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::from("./rendered_sprites"),
            resolution: 512,
            camera_angle: 55.0,
            camera_yaw: 0.0,
            samples: 64,
            ortho_scale: 4.0,
            pixels_per_unit: 256.0,
            min_canvas_size: 256,
            max_canvas_size: 1024,
            rotations: 1,
            light_strength: 3.0,
            light_angle_x: 45.0,
            light_angle_z: 315.0,
            formats: DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect(),
            skip_existing: false,
            auto_crop: true,
            scale_factor: 1.0,
            fail_on_empty_geometry: false,
            render_timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
            verbose: false,
            log_file: None,
        }
    }
}

/// Non-fatal problems found while loading a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A key that is not part of the config schema.
    UnknownKey { key: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::UnknownKey { key } => {
                write!(f, "unknown config key '{}' (ignored)", key)
            }
        }
    }
}

/// The config file schema. Every field is optional; absent fields keep the
/// value from the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigFile {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub resolution: Option<u32>,
    pub camera_angle: Option<f64>,
    pub camera_yaw: Option<f64>,
    pub samples: Option<u32>,
    pub ortho_scale: Option<f64>,
    pub pixels_per_unit: Option<f64>,
    pub min_canvas_size: Option<u32>,
    pub max_canvas_size: Option<u32>,
    pub rotations: Option<u32>,
    pub light_strength: Option<f64>,
    pub light_angle_x: Option<f64>,
    pub light_angle_z: Option<f64>,
    pub formats: Option<Vec<String>>,
    pub skip_existing: Option<bool>,
    pub auto_crop: Option<bool>,
    pub scale_factor: Option<f64>,
    pub fail_on_empty_geometry: Option<bool>,
    pub render_timeout_secs: Option<u64>,
    pub verbose: Option<bool>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFile {
    /// Parses a config file body, reporting keys outside the schema.
    pub fn parse(json: &str) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        let serde_json::Value::Object(mut map) = value else {
            return Err(ConfigError::NotAnObject);
        };

        let unknown: Vec<String> = map
            .keys()
            .filter(|key| !KNOWN_KEYS.contains(&key.as_str()))
            .cloned()
            .collect();

        let mut warnings = Vec::with_capacity(unknown.len());
        for key in unknown {
            map.remove(&key);
            warnings.push(ConfigWarning::UnknownKey { key });
        }

        let file: ConfigFile =
            serde_json::from_value(serde_json::Value::Object(map)).map_err(ConfigError::Parse)?;
        Ok((file, warnings))
    }

    /// Reads and parses a config file from disk.
    pub fn read(path: &Path) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }
}

/// Values supplied on the command line. They take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub resolution: Option<u32>,
    pub camera_angle: Option<f64>,
    pub camera_yaw: Option<f64>,
    pub ortho_scale: Option<f64>,
    pub samples: Option<u32>,
    pub pixels_per_unit: Option<f64>,
    pub rotations: Option<u32>,
    pub light_strength: Option<f64>,
    pub scale_factor: Option<f64>,
    pub render_timeout_secs: Option<u64>,
    pub skip_existing: bool,
    pub no_auto_crop: bool,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
}

impl RunConfig {
    /// Resolves the run configuration: defaults, then `config_path`, then
    /// `overrides`. The result is normalised and validated.
    pub fn resolve(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let mut config = RunConfig::default();
        let mut warnings = Vec::new();

        if let Some(path) = config_path {
            let (file, file_warnings) = ConfigFile::read(path)?;
            config.apply_file(file);
            warnings.extend(file_warnings);
        }

        config.apply_overrides(overrides);
        config.normalize();
        config.validate()?;

        Ok((config, warnings))
    }

    /// Applies every field present in the config file.
    pub fn apply_file(&mut self, file: ConfigFile) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = file.$field { self.$field = value; })*
            };
        }
        take!(
            input_dir,
            output_dir,
            resolution,
            camera_angle,
            camera_yaw,
            samples,
            ortho_scale,
            pixels_per_unit,
            min_canvas_size,
            max_canvas_size,
            rotations,
            light_strength,
            light_angle_x,
            light_angle_z,
            formats,
            skip_existing,
            auto_crop,
            scale_factor,
            fail_on_empty_geometry,
            render_timeout_secs,
            verbose,
        );
        if file.log_file.is_some() {
            self.log_file = file.log_file;
        }
    }

    /// Applies command-line overrides. Boolean switches can only turn their
    /// behaviour on (or auto-crop off).
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.input_dir {
            self.input_dir = dir.clone();
        }
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(resolution) = overrides.resolution {
            self.resolution = resolution;
        }
        if let Some(angle) = overrides.camera_angle {
            self.camera_angle = angle;
        }
        if let Some(yaw) = overrides.camera_yaw {
            self.camera_yaw = yaw;
        }
        if let Some(scale) = overrides.ortho_scale {
            self.ortho_scale = scale;
        }
        if let Some(samples) = overrides.samples {
            self.samples = samples;
        }
        if let Some(ppu) = overrides.pixels_per_unit {
            self.pixels_per_unit = ppu;
        }
        if let Some(rotations) = overrides.rotations {
            self.rotations = rotations;
        }
        if let Some(strength) = overrides.light_strength {
            self.light_strength = strength;
        }
        if let Some(scale) = overrides.scale_factor {
            self.scale_factor = scale;
        }
        if let Some(secs) = overrides.render_timeout_secs {
            self.render_timeout_secs = secs;
        }
        if overrides.skip_existing {
            self.skip_existing = true;
        }
        if overrides.no_auto_crop {
            self.auto_crop = false;
        }
        if overrides.verbose {
            self.verbose = true;
        }
        if let Some(path) = &overrides.log_file {
            self.log_file = Some(path.clone());
        }
    }

    /// Lowercases extensions and ensures each has a leading dot. Repeats are
    /// dropped, keeping the first occurrence.
    pub fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.formats = self
            .formats
            .iter()
            .map(|f| normalize_extension(f))
            .filter(|f| f.len() > 1 && seen.insert(f.clone()))
            .collect();
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingInput);
        }
        if !self.camera_angle.is_finite() || !(0.0..=90.0).contains(&self.camera_angle) {
            return Err(ConfigError::invalid(
                "camera_angle",
                format!("must be within 0..=90 degrees, got {}", self.camera_angle),
            ));
        }
        if !self.camera_yaw.is_finite() {
            return Err(ConfigError::invalid("camera_yaw", "must be finite"));
        }
        require_positive("ortho_scale", self.ortho_scale)?;
        require_positive("pixels_per_unit", self.pixels_per_unit)?;
        require_positive("scale_factor", self.scale_factor)?;
        if !self.light_strength.is_finite() || self.light_strength < 0.0 {
            return Err(ConfigError::invalid("light_strength", "must be >= 0"));
        }
        if !self.light_angle_x.is_finite() || !self.light_angle_z.is_finite() {
            return Err(ConfigError::invalid("light_angle", "must be finite"));
        }
        for (field, size) in [
            ("min_canvas_size", self.min_canvas_size),
            ("max_canvas_size", self.max_canvas_size),
        ] {
            if !size.is_power_of_two() {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be a power of two, got {}", size),
                ));
            }
        }
        if self.min_canvas_size > self.max_canvas_size {
            return Err(ConfigError::invalid(
                "min_canvas_size",
                format!(
                    "{} exceeds max_canvas_size {}",
                    self.min_canvas_size, self.max_canvas_size
                ),
            ));
        }
        if self.rotations != 1 && self.rotations != 4 {
            return Err(ConfigError::invalid(
                "rotations",
                format!("must be 1 or 4, got {}", self.rotations),
            ));
        }
        if self.samples == 0 {
            return Err(ConfigError::invalid("samples", "must be at least 1"));
        }
        if self.resolution == 0 {
            return Err(ConfigError::invalid("resolution", "must be at least 1"));
        }
        if self.formats.is_empty() {
            return Err(ConfigError::invalid("formats", "at least one extension is required"));
        }
        if self.render_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "render_timeout_secs",
                "must be at least 1 second",
            ));
        }
        Ok(())
    }

    /// Scene-wide render settings derived from this config.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            resolution: self.resolution,
            samples: self.samples,
            ortho_scale: self.ortho_scale,
            light: LightSettings {
                strength: self.light_strength,
                angle_x: self.light_angle_x,
                angle_z: self.light_angle_z,
            },
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_ascii_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be a positive number, got {}", value),
        ))
    }
}
