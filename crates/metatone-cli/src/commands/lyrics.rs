//! Lyrics command implementation
//!
//! Generates a title and lyrics for a drawing.

use anyhow::Result;
use colored::Colorize;
use metatone_spec::{format_lyrics, MetatoneConfig};
use std::path::Path;
use std::process::ExitCode;

use super::report_failure;
use crate::lyricist::CommandLyricist;
use crate::pipeline::{Pipeline, Stage};
use crate::session::{load_session, save_session};

/// Run the lyrics command
///
/// # Arguments
/// * `config` - Loaded configuration
/// * `image` - The drawing to write a song about
/// * `session_path` - Optional session file updated with the new song
///
/// # Returns
/// Exit code: 0 success, 1 input or resource error, 2 generation error
pub fn run(config: &MetatoneConfig, image: &Path, session_path: Option<&Path>) -> Result<ExitCode> {
    let pipeline = match Pipeline::new(config.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => return Ok(report_failure(&e)),
    };
    if let Err(e) = pipeline.validate(&[Stage::Lyrics]) {
        return Ok(report_failure(&e));
    }

    let mut session = match session_path {
        Some(path) => load_session(path)?,
        None => Default::default(),
    };

    eprintln!("{} {}", "Writing lyrics for:".cyan().bold(), image.display());
    let lyricist = CommandLyricist::from_config(&config.lyricist);
    let song = match pipeline.generate_lyrics(&lyricist, image, &mut session) {
        Ok(song) => song,
        Err(e) => return Ok(report_failure(&e)),
    };

    println!("{}", song.title.bold());
    println!();
    println!("{}", format_lyrics(&song.lyrics.to_string()));

    if let Some(path) = session_path {
        save_session(path, &session)?;
        eprintln!("{} {}", "Session saved to:".dimmed(), path.display());
    }

    Ok(ExitCode::SUCCESS)
}
