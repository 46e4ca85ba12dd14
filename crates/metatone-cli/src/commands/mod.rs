//! CLI command implementations

pub mod compose;
pub mod doctor;
pub mod inspect;
pub mod lyrics;
pub mod sing;

use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;
use metatone_spec::{GenerationError, LyricText};

use crate::session::load_session;

/// Exit code for a failed stage: 1 for input or resource problems, 2 for
/// generation failures.
pub fn exit_code_for(err: &GenerationError) -> ExitCode {
    if err.kind.is_user_error() {
        ExitCode::from(1)
    } else {
        ExitCode::from(2)
    }
}

/// Prints a stage failure and returns its exit code.
pub(crate) fn report_failure(err: &GenerationError) -> ExitCode {
    eprintln!(
        "{} [{}] {}",
        "error".red().bold(),
        err.code.red(),
        err.message
    );
    eprintln!(
        "  {} {} ({})",
        "->".dimmed(),
        err.kind.to_string().dimmed(),
        err.category.dimmed()
    );
    exit_code_for(err)
}

/// Lyrics to sing and the title they came with.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsInput {
    pub lyrics: LyricText,
    pub title: Option<String>,
}

/// Reads lyrics from `--lyrics`, falling back to the song stored in
/// `--session`.
pub fn resolve_lyrics(
    lyrics_path: Option<&Path>,
    session_path: Option<&Path>,
) -> Result<LyricsInput, GenerationError> {
    if let Some(path) = lyrics_path {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GenerationError::input_missing(format!(
                "Cannot read lyrics file {}: {}",
                path.display(),
                e
            ))
        })?;
        return Ok(LyricsInput {
            lyrics: LyricText::parse(&text),
            title: None,
        });
    }

    if let Some(path) = session_path {
        let session = load_session(path).map_err(|e| {
            GenerationError::input_missing(format!("{e:#}"))
        })?;
        return match session.song() {
            Some(song) => Ok(LyricsInput {
                lyrics: song.lyrics.clone(),
                title: Some(song.title.clone()),
            }),
            None => Err(GenerationError::input_missing(format!(
                "No lyrics in session {}. Run `metatone lyrics` first",
                path.display()
            ))),
        };
    }

    Err(GenerationError::input_missing(
        "No lyrics given. Pass --lyrics <file> or --session <file>",
    ))
}
