//! Compose command implementation
//!
//! Turns lyrics into a melody and writes it as a Standard MIDI File.

use anyhow::{Context, Result};
use colored::Colorize;
use metatone_spec::MetatoneConfig;
use std::path::Path;
use std::process::ExitCode;

use super::{report_failure, resolve_lyrics};
use crate::pipeline::Pipeline;

/// Run the compose command
///
/// # Arguments
/// * `config` - Loaded configuration
/// * `lyrics_path` - Lyrics text file
/// * `session_path` - Session file used when no lyrics file is given
/// * `out` - Output MIDI path
/// * `title` - Track name; defaults to the session title
/// * `json_output` - Print the note list as JSON on stdout
///
/// # Returns
/// Exit code: 0 success, 1 input error, 2 generation error
pub fn run(
    config: &MetatoneConfig,
    lyrics_path: Option<&Path>,
    session_path: Option<&Path>,
    out: &Path,
    title: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    let input = match resolve_lyrics(lyrics_path, session_path) {
        Ok(input) => input,
        Err(e) => return Ok(report_failure(&e)),
    };
    let title = title.or(input.title.as_deref());

    let pipeline = match Pipeline::new(config.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => return Ok(report_failure(&e)),
    };
    let composition = match pipeline.compose(&input.lyrics, title) {
        Ok(composition) => composition,
        Err(e) => return Ok(report_failure(&e)),
    };

    std::fs::write(out, &composition.midi)
        .with_context(|| format!("Failed to write MIDI file: {}", out.display()))?;

    if json_output {
        let json = serde_json::to_string_pretty(&composition.score)
            .context("Failed to serialize score")?;
        println!("{}", json);
    } else {
        println!(
            "{} {} notes, {} beats",
            "Composed:".cyan().bold(),
            composition.score.len(),
            composition.score.total_beats()
        );
        println!("{} {}", "Written to:".cyan().bold(), out.display());
        println!("{} {}", "Hash:".dimmed(), &composition.hash[..16]);
    }

    Ok(ExitCode::SUCCESS)
}
