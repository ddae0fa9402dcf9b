//! spritebake CLI - Batch renderer turning 3D models into 2D sprites
//!
//! This binary provides commands for rendering model directories to sprites,
//! inspecting model sizes, and checking the Blender setup.

use clap::Parser;
use std::process::ExitCode;

use spritebake_cli::commands;

mod cli_args;

use cli_args::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render(args) => commands::render::run(
            args.config.as_deref(),
            &args.overrides(),
            args.blender.as_deref(),
        ),
        Commands::Inspect {
            models,
            json,
            blender,
            timeout,
        } => commands::inspect::run(&models, json, blender.as_deref(), timeout),
        Commands::Doctor { blender } => commands::doctor::run(blender.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
