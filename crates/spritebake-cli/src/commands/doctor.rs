//! Doctor command implementation
//!
//! Checks system dependencies and configuration.

use anyhow::Result;
use colored::Colorize;
use spritebake_backend_blender::session::ENTRYPOINT_ENV;
use spritebake_backend_blender::{blender_version, find_blender};
use spritebake_core::AUTOCROP_AVAILABLE;
use std::env;
use std::path::Path;
use std::process::ExitCode;

/// Run the doctor command
///
/// Checks:
/// - Blender installation and version
/// - Auto-crop support
/// - Output directory permissions
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(blender: Option<&Path>) -> Result<ExitCode> {
    println!("{}", "spritebake doctor".cyan().bold());
    println!("{}", "=================".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} spritebake-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Dependencies:".bold());
    match find_blender(blender) {
        Ok(path) => match blender_version(&path) {
            Ok(version) => {
                let version = parse_blender_version(&version).unwrap_or(version);
                println!(
                    "  {} Blender {} ({})",
                    "ok".green(),
                    version,
                    path.display()
                );
            }
            Err(e) => {
                println!(
                    "  {} Blender at {} failed to run: {}",
                    "!!".red(),
                    path.display(),
                    e
                );
                all_ok = false;
            }
        },
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            println!(
                "     {}",
                "Install from https://www.blender.org/download/".dimmed()
            );
            all_ok = false;
        }
    }

    if let Ok(path) = env::var(ENTRYPOINT_ENV) {
        if Path::new(&path).exists() {
            println!("  {} Entrypoint override: {}", "ok".green(), path);
        } else {
            println!(
                "  {} {} points to a missing file: {}",
                "!!".red(),
                ENTRYPOINT_ENV,
                path
            );
            all_ok = false;
        }
    }

    if AUTOCROP_AVAILABLE {
        println!("  {} Auto-crop support compiled in", "ok".green());
    } else {
        println!(
            "  {} Auto-crop support not compiled in (sprites stay uncropped)",
            "!!".yellow()
        );
    }
    println!();

    println!("{}", "Permissions:".bold());
    match env::current_dir() {
        Ok(dir) => {
            let test_file = dir.join(".spritebake_write_test");
            match std::fs::write(&test_file, "test") {
                Ok(_) => {
                    let _ = std::fs::remove_file(&test_file);
                    println!(
                        "  {} Current directory is writable ({})",
                        "ok".green(),
                        dir.display()
                    );
                }
                Err(e) => {
                    println!("  {} Cannot write to current directory: {}", "!!".red(), e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("  {} Cannot determine current directory: {}", "!!".red(), e);
            all_ok = false;
        }
    }
    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

fn parse_blender_version(line: &str) -> Option<String> {
    line.strip_prefix("Blender ").map(|v| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blender_version() {
        assert_eq!(
            parse_blender_version("Blender 4.0.2").as_deref(),
            Some("4.0.2")
        );
        assert_eq!(parse_blender_version("not blender"), None);
    }
}
