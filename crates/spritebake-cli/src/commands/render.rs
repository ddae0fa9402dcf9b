//! Render command implementation
//!
//! Renders every model under the input directory to sprites and writes a
//! run summary next to them.

use anyhow::{Context, Result};
use spritebake_backend_blender::{BlenderScene, SessionConfig};
use spritebake_core::{cropper_for, run_batch, BatchResult, ConfigOverrides, RunConfig, Scene};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use super::reporting::{print_config, print_summary};
use crate::logging;

/// File name of the run summary written under the output directory.
pub const SUMMARY_FILE: &str = "render_summary.json";

/// Run the render command
///
/// # Arguments
/// * `config_path` - Optional JSON config file
/// * `overrides` - Values from command-line flags
/// * `blender` - Optional explicit Blender executable
///
/// # Returns
/// Exit code: 0 if every model rendered, 1 otherwise
pub fn run(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    blender: Option<&Path>,
) -> Result<ExitCode> {
    let (config, warnings) =
        RunConfig::resolve(config_path, overrides).context("Invalid configuration")?;

    logging::init(config.verbose, config.log_file.as_deref())?;
    for warning in &warnings {
        warn!("{}", warning);
    }

    print_config(&config);

    let mut session = SessionConfig::default().timeout_secs(config.render_timeout_secs);
    if let Some(path) = blender {
        session = session.blender_path(path);
    }
    let mut scene = BlenderScene::new(session);

    let result = execute(&config, &mut scene);
    scene.shutdown();
    let result = result?;

    print_summary(&result);
    Ok(exit_code(&result))
}

/// Runs the batch with `scene` and writes the summary file.
pub fn execute(config: &RunConfig, scene: &mut dyn Scene) -> Result<BatchResult> {
    let cropper = cropper_for(config.auto_crop);
    let result = run_batch(config, scene, cropper.as_ref()).context("Batch render failed")?;

    let summary_path = write_summary(&config.output_dir, &result)?;
    info!("Summary written to {}", summary_path.display());
    Ok(result)
}

/// Writes `result` as pretty JSON to `<output_dir>/render_summary.json`.
pub fn write_summary(output_dir: &Path, result: &BatchResult) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let path = output_dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(result).context("Failed to serialize summary")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// 0 when nothing failed, 1 otherwise.
pub fn exit_code(result: &BatchResult) -> ExitCode {
    if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
