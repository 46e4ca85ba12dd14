//! Error types for the music backend.

use metatone_spec::{BackendError, ErrorKind};
use thiserror::Error;

/// Result type for music backend operations.
pub type MusicResult<T> = Result<T, MusicError>;

/// Errors that can occur while composing, writing or parsing scores.
#[derive(Debug, Error)]
pub enum MusicError {
    /// The embedded hyphenation dictionary could not be loaded.
    #[error("English hyphenation dictionary unavailable: {0}")]
    DictionaryUnavailable(String),

    /// A program number outside the General MIDI range.
    #[error("MIDI program {0} is out of range (0-127)")]
    InvalidProgram(u8),

    /// A note with a non-positive or non-finite duration.
    #[error("note {index} has invalid duration {duration}")]
    InvalidDuration { index: usize, duration: f64 },

    /// Encoding the MIDI file failed.
    #[error("failed to encode MIDI: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// The bytes are not a readable Standard MIDI File.
    #[error("failed to parse MIDI: {0}")]
    ParseFailed(String),

    /// The MIDI file uses SMPTE timecode instead of ticks per beat.
    #[error("unsupported MIDI timing: only metrical (ticks per beat) timing is supported")]
    UnsupportedTiming,

    /// The MIDI file parsed but its note events are inconsistent.
    #[error("malformed score: {0}")]
    MalformedScore(String),
}

impl MusicError {
    /// Creates a new malformed score error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedScore(message.into())
    }
}

impl BackendError for MusicError {
    fn code(&self) -> &'static str {
        match self {
            MusicError::DictionaryUnavailable(_) => "MUSIC_001",
            MusicError::InvalidProgram(_) => "MUSIC_002",
            MusicError::InvalidDuration { .. } => "MUSIC_003",
            MusicError::WriteFailed(_) => "MUSIC_004",
            MusicError::ParseFailed(_) => "MUSIC_005",
            MusicError::UnsupportedTiming => "MUSIC_006",
            MusicError::MalformedScore(_) => "MUSIC_007",
        }
    }

    fn category(&self) -> &'static str {
        "music"
    }

    fn kind(&self) -> ErrorKind {
        match self {
            MusicError::DictionaryUnavailable(_) => ErrorKind::ResourceMissing,
            _ => ErrorKind::Internal,
        }
    }
}
