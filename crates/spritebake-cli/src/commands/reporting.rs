use colored::Colorize;
use spritebake_core::{BatchResult, RunConfig};

/// Prints the configuration banner shown before a batch starts.
pub(crate) fn print_config(config: &RunConfig) {
    println!("{}", "spritebake render".cyan().bold());
    println!("{}", "=================".cyan());
    println!("  Input:        {}", config.input_dir.display());
    println!("  Output:       {}", config.output_dir.display());
    println!(
        "  Camera:       pitch {}°, yaw {}°",
        config.camera_angle, config.camera_yaw
    );
    println!(
        "  Projection:   ortho scale {}, {} px/unit, canvas {}-{} px",
        config.ortho_scale, config.pixels_per_unit, config.min_canvas_size, config.max_canvas_size
    );
    println!("  Rotations:    {}", config.rotations);
    println!("  Samples:      {}", config.samples);
    println!("  Scale factor: {}", config.scale_factor);
    println!(
        "  Auto-crop:    {}",
        if config.auto_crop { "on" } else { "off" }
    );
    println!();
}

/// Prints the end-of-run summary.
pub(crate) fn print_summary(result: &BatchResult) {
    println!();
    println!("{}", "Summary".cyan().bold());
    println!("{}", "=======".cyan());
    println!("  Total:     {}", result.total);
    println!("  Processed: {}", result.processed.to_string().green());
    println!("  Skipped:   {}", result.skipped.to_string().yellow());
    if result.failed > 0 {
        println!("  Failed:    {}", result.failed.to_string().red());
    } else {
        println!("  Failed:    {}", result.failed);
    }
    println!("  Runtime:   {:.1}s", result.runtime_seconds);

    if !result.degraded.is_empty() {
        println!();
        println!("{}", "Rendered without geometry:".yellow().bold());
        for asset in &result.degraded {
            println!("  {} {}", "!".yellow(), asset);
        }
    }

    if !result.failures.is_empty() {
        println!();
        println!("{}", "Failures:".red().bold());
        for item in &result.failures {
            let code = item
                .code
                .as_deref()
                .map(|c| format!(" [{}]", c))
                .unwrap_or_default();
            match &item.direction {
                Some(direction) => println!(
                    "  {} {} ({}){}: {}",
                    "x".red(),
                    item.asset,
                    direction,
                    code,
                    item.error
                ),
                None => println!("  {} {}{}: {}", "x".red(), item.asset, code, item.error),
            }
        }
    }

    println!();
    if result.is_success() {
        println!("{} All models rendered", "SUCCESS".green().bold());
    } else {
        println!(
            "{} {} of {} model(s) failed",
            "FAILED".red().bold(),
            result.failed,
            result.total
        );
    }
}
