//! Inspect command implementation
//!
//! Parses a MIDI file and prints its notes and lyrics.

use anyhow::{Context, Result};
use colored::Colorize;
use metatone_backend_music::parse_score;
use metatone_spec::GenerationError;
use std::path::Path;
use std::process::ExitCode;

use super::report_failure;

/// Run the inspect command
///
/// # Arguments
/// * `midi_path` - Standard MIDI File to read
/// * `json_output` - Print the score as JSON
///
/// # Returns
/// Exit code: 0 success, 2 if the file is not a readable score
pub fn run(midi_path: &Path, json_output: bool) -> Result<ExitCode> {
    let bytes = std::fs::read(midi_path)
        .with_context(|| format!("Failed to read MIDI file: {}", midi_path.display()))?;

    let score = match parse_score(&bytes) {
        Ok(score) => score,
        Err(e) => return Ok(report_failure(&GenerationError::from_backend(e))),
    };

    if json_output {
        let json = serde_json::to_string_pretty(&score).context("Failed to serialize score")?;
        println!("{}", json);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "File:".cyan().bold(), midi_path.display());
    println!(
        "{} {}  {} {}  {} {}",
        "Program:".dimmed(),
        score.program,
        "Notes:".dimmed(),
        score.len(),
        "Beats:".dimmed(),
        score.total_beats()
    );
    println!();
    for (i, note) in score.notes.iter().enumerate() {
        println!(
            "  {:>4}  {:<4} {:>3}  {:>5.2}  {}",
            i,
            note.pitch.name(),
            note.pitch.midi(),
            note.duration,
            note.lyric
        );
    }

    Ok(ExitCode::SUCCESS)
}
