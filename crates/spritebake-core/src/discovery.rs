//! Model discovery.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::BatchError;
use crate::rotation::Direction;

/// A model file found under the input root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModelAsset {
    /// Path relative to the input root. Also the sort key.
    pub relative_path: PathBuf,
    /// Full path on disk.
    pub path: PathBuf,
    /// Lowercase extension with a leading dot.
    pub extension: String,
}

impl ModelAsset {
    /// Identifier used in logs and failure lists.
    pub fn display_name(&self) -> String {
        self.relative_path.to_string_lossy().replace('\\', "/")
    }

    /// Output image path for `direction`, mirroring the input tree under
    /// `output_root`.
    pub fn output_path(&self, output_root: &Path, direction: &Direction) -> PathBuf {
        let base = output_root.join(&self.relative_path);
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        base.with_file_name(format!("{}{}.png", stem, direction.suffix))
    }
}

/// Recursively finds files under `input_dir` whose extension is in `formats`
/// (lowercase, leading dot), sorted by relative path.
///
/// Symlinks are followed. Entries that cannot be read (dangling links, link
/// loops, permission errors) are logged and skipped; only an input root that
/// is not a directory fails.
pub fn find_models(input_dir: &Path, formats: &[String]) -> Result<Vec<ModelAsset>, BatchError> {
    if !input_dir.is_dir() {
        return Err(BatchError::Discovery {
            input_dir: input_dir.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut models = Vec::new();
    for entry in WalkDir::new(input_dir).min_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(extension) = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
        else {
            continue;
        };
        if !formats.iter().any(|f| *f == extension) {
            continue;
        }

        let relative_path = path
            .strip_prefix(input_dir)
            .unwrap_or(path)
            .to_path_buf();
        models.push(ModelAsset {
            relative_path,
            path: path.to_path_buf(),
            extension,
        });
    }

    // Sort for deterministic order
    models.sort();
    Ok(models)
}
