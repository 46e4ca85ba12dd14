//! Sing command implementation
//!
//! Composes lyrics, renders them with the SoundFont and optionally runs
//! voice conversion.

use anyhow::{Context, Result};
use colored::Colorize;
use metatone_spec::MetatoneConfig;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use super::{report_failure, resolve_lyrics};
use crate::pipeline::Pipeline;

/// Run the sing command
///
/// # Arguments
/// * `config` - Loaded configuration
/// * `lyrics_path` - Lyrics text file
/// * `session_path` - Session file used when no lyrics file is given
/// * `out` - Output path for the rough WAV
/// * `convert_out` - Output path for the voice-converted FLAC; skips
///   conversion when absent
///
/// # Returns
/// Exit code: 0 success, 1 input or resource error, 2 generation error
pub fn run(
    config: &MetatoneConfig,
    lyrics_path: Option<&Path>,
    session_path: Option<&Path>,
    out: &Path,
    convert_out: Option<&Path>,
) -> Result<ExitCode> {
    let start = Instant::now();
    let input = match resolve_lyrics(lyrics_path, session_path) {
        Ok(input) => input,
        Err(e) => return Ok(report_failure(&e)),
    };

    let pipeline = match Pipeline::new(config.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => return Ok(report_failure(&e)),
    };

    if let Some(title) = input.title.as_deref() {
        println!("{} {}", "Singing:".cyan().bold(), title);
    }
    let performance =
        match pipeline.sing(&input.lyrics, input.title.as_deref(), convert_out.is_some()) {
            Ok(performance) => performance,
            Err(e) => return Ok(report_failure(&e)),
        };

    std::fs::write(out, &performance.rough.data)
        .with_context(|| format!("Failed to write WAV file: {}", out.display()))?;
    let info = performance
        .rough
        .info
        .map(|i| format!("{:.2}s, {} Hz", i.duration_secs(), i.sample_rate))
        .unwrap_or_default();
    println!(
        "  {} {} ({}, {} notes)",
        "ok".green(),
        out.display(),
        info,
        performance.composition.score.len()
    );

    if let (Some(path), Some(converted)) = (convert_out, performance.converted.as_ref()) {
        std::fs::write(path, &converted.data)
            .with_context(|| format!("Failed to write converted audio: {}", path.display()))?;
        println!(
            "  {} {} ({} bytes)",
            "ok".green(),
            path.display(),
            converted.data.len()
        );
    }

    println!(
        "\n{} in {:.1}s",
        "SUCCESS".green().bold(),
        start.elapsed().as_secs_f64()
    );
    Ok(ExitCode::SUCCESS)
}
