//! Error types for the audio backend.

use std::path::PathBuf;

use metatone_spec::{BackendError, ErrorKind};
use thiserror::Error;

/// Result type for audio backend operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors that can occur while rendering audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No SoundFont was configured.
    #[error("No SoundFont configured. Set `soundfont` in the config file or pass --soundfont")]
    SoundFontNotConfigured,

    /// The configured SoundFont does not exist or is not a file.
    #[error("SoundFont not found: {path}")]
    SoundFontNotFound { path: PathBuf },

    /// FluidSynth executable not found.
    #[error("FluidSynth executable not found. Install FluidSynth and make sure it is in PATH, or set FLUIDSYNTH_PATH")]
    SynthesizerNotFound,

    /// Failed to spawn the synthesizer process.
    #[error("Failed to spawn FluidSynth: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// The synthesizer did not finish in time.
    #[error("FluidSynth timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The synthesizer exited with a non-zero status.
    #[error("FluidSynth exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// The synthesizer succeeded but wrote no output file.
    #[error("Expected rendered audio not found: {path}")]
    OutputNotFound { path: PathBuf },

    /// The bytes are not a readable WAV stream.
    #[error("Invalid WAV data: {0}")]
    InvalidWav(String),

    /// IO error while staging files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Creates a new process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        AudioError::InvalidWav(err.to_string())
    }
}

impl BackendError for AudioError {
    fn code(&self) -> &'static str {
        match self {
            AudioError::SoundFontNotConfigured => "AUDIO_001",
            AudioError::SoundFontNotFound { .. } => "AUDIO_002",
            AudioError::SynthesizerNotFound => "AUDIO_003",
            AudioError::SpawnFailed(_) => "AUDIO_004",
            AudioError::Timeout { .. } => "AUDIO_005",
            AudioError::ProcessFailed { .. } => "AUDIO_006",
            AudioError::OutputNotFound { .. } => "AUDIO_007",
            AudioError::InvalidWav(_) => "AUDIO_008",
            AudioError::Io(_) => "AUDIO_009",
        }
    }

    fn category(&self) -> &'static str {
        "audio"
    }

    fn kind(&self) -> ErrorKind {
        match self {
            AudioError::SoundFontNotConfigured
            | AudioError::SoundFontNotFound { .. }
            | AudioError::SynthesizerNotFound => ErrorKind::ResourceMissing,
            AudioError::SpawnFailed(_)
            | AudioError::Timeout { .. }
            | AudioError::ProcessFailed { .. } => ErrorKind::InvocationFailed,
            AudioError::OutputNotFound { .. } | AudioError::InvalidWav(_) => {
                ErrorKind::OutputMissing
            }
            AudioError::Io(_) => ErrorKind::Internal,
        }
    }
}
