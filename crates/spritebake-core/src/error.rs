//! Error types for the sprite pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON or a field has the wrong type.
    #[error("Failed to parse config file: {0}")]
    Parse(#[source] serde_json::Error),

    /// Config file top level is not a JSON object.
    #[error("Config file must contain a JSON object")]
    NotAnObject,

    /// No input directory was given.
    #[error("An input directory is required (--input or \"input_dir\")")]
    MissingInput,

    /// A field is outside its allowed range.
    #[error("Invalid config value for '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Creates a new invalid-value error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Errors reported by a [`crate::scene::Scene`] collaborator.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The engine has no importer for this extension.
    #[error("Unsupported model format: {extension}")]
    UnsupportedFormat { extension: String },

    /// The importer rejected the file.
    #[error("Failed to import {path}: {message}")]
    ImportFailed { path: PathBuf, message: String },

    /// The engine reported a render failure.
    #[error("Render failed: {message}")]
    RenderFailed { message: String },

    /// Render returned but the image is not on disk.
    #[error("Render completed but file not found: {path}")]
    OutputMissing { path: PathBuf },

    /// The engine itself is unavailable or misbehaved.
    #[error("Render backend error: {message}")]
    Backend { message: String },

    /// The import succeeded but produced no mesh objects.
    #[error("Imported model contains no mesh geometry: {path}")]
    NoGeometry { path: PathBuf },
}

impl SceneError {
    /// Creates a new import failure.
    pub fn import_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ImportFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new render failure.
    pub fn render_failed(message: impl Into<String>) -> Self {
        Self::RenderFailed {
            message: message.into(),
        }
    }

    /// Creates a new backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Stable identifier used in summaries.
    pub fn code(&self) -> &'static str {
        match self {
            SceneError::UnsupportedFormat { .. } => "SCENE_001",
            SceneError::ImportFailed { .. } => "SCENE_002",
            SceneError::RenderFailed { .. } => "SCENE_003",
            SceneError::OutputMissing { .. } => "SCENE_004",
            SceneError::Backend { .. } => "SCENE_005",
            SceneError::NoGeometry { .. } => "SCENE_006",
        }
    }
}

/// Fatal batch errors. Everything else is recorded per asset.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Discovery found nothing to render.
    #[error("No models found in {input_dir}")]
    NoAssets { input_dir: PathBuf },

    /// The input root could not be walked.
    #[error("Failed to scan input directory {input_dir}: {message}")]
    Discovery { input_dir: PathBuf, message: String },

    /// The scene could not be configured for rendering.
    #[error("Failed to set up scene: {0}")]
    Setup(#[source] SceneError),
}

/// Sidecar persistence errors. Logged, never fatal.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Failed to serialize the record.
    #[error("Failed to serialize metadata: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to write the sidecar file.
    #[error("Failed to write metadata {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::invalid("rotations", "must be 1 or 4, got 3");
        assert!(err.to_string().contains("'rotations'"));

        let err = SceneError::import_failed("models/tree.fbx", "bad header");
        assert!(err.to_string().contains("models/tree.fbx"));
        assert!(err.to_string().contains("bad header"));

        let err = BatchError::NoAssets {
            input_dir: PathBuf::from("models"),
        };
        assert_eq!(err.to_string(), "No models found in models");
    }

    #[test]
    fn test_scene_error_codes_are_distinct() {
        let errors = [
            SceneError::UnsupportedFormat {
                extension: ".stl".into(),
            },
            SceneError::import_failed("a", "b"),
            SceneError::render_failed("c"),
            SceneError::OutputMissing {
                path: PathBuf::from("d.png"),
            },
            SceneError::backend("e"),
            SceneError::NoGeometry {
                path: PathBuf::from("f.glb"),
            },
        ];
        let mut codes: Vec<_> = errors.iter().map(SceneError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
