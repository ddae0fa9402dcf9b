//! Inspect command implementation
//!
//! Measures models in Blender units and suggests scale factors.

use anyhow::{Context, Result};
use colored::Colorize;
use spritebake_backend_blender::{BlenderScene, SessionConfig};
use spritebake_core::inspect::{inspect_models, InspectSummary};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::logging;

/// Run the inspect command
///
/// # Returns
/// Exit code: 0 if at least one model was measured, 1 otherwise
pub fn run(models: &[PathBuf], json: bool, blender: Option<&Path>, timeout_secs: u64) -> Result<ExitCode> {
    logging::init(false, None)?;

    let mut session = SessionConfig::default().timeout_secs(timeout_secs);
    if let Some(path) = blender {
        session = session.blender_path(path);
    }
    let mut scene = BlenderScene::new(session);
    let summary = inspect_models(&mut scene, models);
    scene.shutdown();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    } else {
        print!("{}", format_table(&summary));
        for skipped in &summary.skipped {
            println!(
                "  {} {}: {}",
                "!".yellow(),
                skipped.path.display(),
                skipped.reason
            );
        }
    }

    if summary.models.is_empty() {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Plain-text size table with scale recommendations.
pub fn format_table(summary: &InspectSummary) -> String {
    let rule = "-".repeat(60);
    let mut out = String::new();

    let _ = writeln!(out, "{:<40} {:>6} {:>12}", "Model", "Meshes", "Max (BU)");
    let _ = writeln!(out, "{}", rule);
    for model in &summary.models {
        let _ = writeln!(
            out,
            "{:<40} {:>6} {:>12.3}",
            model.file, model.mesh_count, model.max
        );
        let _ = writeln!(
            out,
            "  {:.3} x {:.3} x {:.3}",
            model.width, model.height, model.depth
        );
    }
    let _ = writeln!(out, "{}", rule);

    match &summary.recommendations {
        Some(rec) => {
            let _ = writeln!(out, "{:<40} {:>19.3}", "Average", rec.average_max);
            let _ = writeln!(out);
            let _ = writeln!(out, "Scale factor recommendations:");
            let _ = writeln!(
                out,
                "  1 BU = 1 tile: scale_factor = {:.3}",
                rec.one_unit_per_tile
            );
            let _ = writeln!(
                out,
                "  2 BU = 1 tile: scale_factor = {:.3}",
                rec.two_units_per_tile
            );
            let _ = writeln!(out, "  No scaling:    scale_factor = 1.0");
        }
        None => {
            let _ = writeln!(out, "No measurable models");
        }
    }
    out
}
