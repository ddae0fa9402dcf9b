//! CLI argument definitions for the spritebake command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Args, Parser, Subcommand};
use spritebake_core::config::DEFAULT_RENDER_TIMEOUT_SECS;
use spritebake_core::ConfigOverrides;
use std::path::PathBuf;

/// spritebake - Batch 3D model to 2D sprite renderer
#[derive(Parser)]
#[command(name = "spritebake")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Render every model under a directory to sprites
    Render(RenderArgs),

    /// Measure model sizes and suggest scale factors
    Inspect {
        /// Model files to inspect
        #[arg(required = true)]
        models: Vec<PathBuf>,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,

        /// Path to the Blender executable
        #[arg(long)]
        blender: Option<PathBuf>,

        /// Seconds to wait for Blender per model
        #[arg(long, default_value_t = DEFAULT_RENDER_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Check Blender and build capabilities
    Doctor {
        /// Path to the Blender executable
        #[arg(long)]
        blender: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct RenderArgs {
    /// Input directory containing models
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory for sprites (default: ./rendered_sprites)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Initial render resolution
    #[arg(short, long)]
    pub resolution: Option<u32>,

    /// Camera pitch in degrees from horizontal (90 = top-down)
    #[arg(short = 'a', long = "angle")]
    pub angle: Option<f64>,

    /// Camera yaw in degrees (single-direction renders)
    #[arg(long, allow_negative_numbers = true)]
    pub camera_yaw: Option<f64>,

    /// Orthographic view width in model units
    #[arg(long)]
    pub ortho_scale: Option<f64>,

    /// Anti-aliasing samples
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Output pixels per model unit
    #[arg(long)]
    pub pixels_per_unit: Option<f64>,

    /// Number of directions to render (1 or 4)
    #[arg(long, value_parser = parse_rotations)]
    pub rotations: Option<u32>,

    /// Sun light strength
    #[arg(long)]
    pub light_strength: Option<f64>,

    /// Uniform scale applied to imported models
    #[arg(long)]
    pub scale_factor: Option<f64>,

    /// Skip models whose sprites already exist
    #[arg(long)]
    pub skip_existing: bool,

    /// Keep sprites at full canvas size
    #[arg(long)]
    pub no_auto_crop: bool,

    /// Debug-level console logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a debug log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// JSON config file (flags override its values)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the Blender executable
    #[arg(long)]
    pub blender: Option<PathBuf>,

    /// Seconds to wait for Blender per request
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl RenderArgs {
    /// Command-line values as config overrides.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_dir: self.input.clone(),
            output_dir: self.output.clone(),
            resolution: self.resolution,
            camera_angle: self.angle,
            camera_yaw: self.camera_yaw,
            ortho_scale: self.ortho_scale,
            samples: self.samples,
            pixels_per_unit: self.pixels_per_unit,
            rotations: self.rotations,
            light_strength: self.light_strength,
            scale_factor: self.scale_factor,
            render_timeout_secs: self.timeout,
            skip_existing: self.skip_existing,
            no_auto_crop: self.no_auto_crop,
            verbose: self.verbose,
            log_file: self.log_file.clone(),
        }
    }
}

fn parse_rotations(value: &str) -> Result<u32, String> {
    match value {
        "1" => Ok(1),
        "4" => Ok(4),
        other => Err(format!("must be 1 or 4, got '{}'", other)),
    }
}
