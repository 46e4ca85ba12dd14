//! Doctor command implementation
//!
//! Checks external tools and configured resources.

use anyhow::Result;
use colored::Colorize;
use metatone_backend_svc::ResolvedPaths;
use metatone_spec::MetatoneConfig;
use std::path::Path;
use std::process::ExitCode;

use crate::lyricist::CommandLyricist;
use crate::pipeline::Pipeline;

/// Run the doctor command
///
/// Checks:
/// - FluidSynth and the SoundFont (required for `sing`)
/// - The lyricist program (required for `lyrics`)
/// - The voice conversion checkout, model and config (required for
///   `sing --convert`)
///
/// # Returns
/// Exit code: 0 if rendering is possible, 1 otherwise
pub fn run(config: &MetatoneConfig, config_source: Option<&Path>) -> Result<ExitCode> {
    println!("{}", "MetaTone Doctor".cyan().bold());
    println!("{}", "===============".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} metatone-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    match config_source {
        Some(path) => println!("  {} config {}", "->".green(), path.display()),
        None => println!("  {} config (defaults)", "->".yellow()),
    }
    println!();

    let pipeline = match Pipeline::new(config.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            return Ok(ExitCode::from(1));
        }
    };

    println!("{}", "Rendering:".bold());
    match pipeline.renderer().find_fluidsynth() {
        Ok(path) => println!("  {} FluidSynth ({})", "ok".green(), path.display()),
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            all_ok = false;
        }
    }
    match pipeline.renderer().soundfont() {
        Ok(path) => println!("  {} SoundFont ({})", "ok".green(), path.display()),
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            all_ok = false;
        }
    }
    println!();

    println!("{}", "Lyrics:".bold());
    match CommandLyricist::from_config(&config.lyricist).validate() {
        Ok(path) => println!("  {} {} ({})", "ok".green(), config.lyricist.program, path.display()),
        Err(e) => {
            println!("  {} {}", "!!".yellow(), e);
            println!(
                "     {}",
                "Only needed for `metatone lyrics`.".dimmed()
            );
        }
    }
    println!();

    println!("{}", "Voice conversion:".bold());
    match pipeline.converter().validate() {
        Ok(ResolvedPaths {
            repo_dir, model, ..
        }) => {
            println!("  {} repository ({})", "ok".green(), repo_dir.display());
            println!("  {} model ({})", "ok".green(), model.display());
        }
        Err(e) => {
            println!("  {} {}", "!!".yellow(), e);
            println!(
                "     {}",
                "Only needed for `metatone sing --convert`.".dimmed()
            );
        }
    }
    println!();

    if all_ok {
        println!("{}", "All required checks passed.".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", "Some required checks failed.".red().bold());
        Ok(ExitCode::from(1))
    }
}
