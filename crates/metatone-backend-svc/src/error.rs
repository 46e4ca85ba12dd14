//! Error types for the voice conversion backend.

use std::path::PathBuf;

use metatone_spec::{BackendError, ErrorKind};
use thiserror::Error;

/// Result type for voice conversion operations.
pub type SvcResult<T> = Result<T, SvcError>;

/// Errors that can occur during voice conversion.
#[derive(Debug, Error)]
pub enum SvcError {
    /// A required setting has no value.
    #[error("Voice conversion setting `{setting}` is not configured")]
    NotConfigured { setting: &'static str },

    /// The converter repository does not exist.
    #[error("Voice conversion repository not found: {path}")]
    RepoNotFound { path: PathBuf },

    /// The inference script does not exist.
    #[error("Inference script not found: {path}")]
    ScriptNotFound { path: PathBuf },

    /// The model checkpoint does not exist.
    #[error("Voice model not found: {path}")]
    ModelNotFound { path: PathBuf },

    /// The model configuration does not exist.
    #[error("Voice model config not found: {path}")]
    ModelConfigNotFound { path: PathBuf },

    /// The interpreter could not be located.
    #[error("Interpreter not found: {program}")]
    InterpreterNotFound { program: String },

    /// Failed to spawn the converter process.
    #[error("Failed to spawn voice converter: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// The converter did not finish in time.
    #[error("Voice converter timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The converter exited with a non-zero status.
    #[error("Voice converter exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// The converter succeeded but the expected artifact is absent.
    #[error("Converted audio not found: {path}. Results directory contains: {}", format_listing(.listing))]
    OutputNotFound { path: PathBuf, listing: Vec<String> },

    /// Failed to stage the input waveform.
    #[error("Failed to stage input at {path}: {source}")]
    StageFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_listing(listing: &[String]) -> String {
    if listing.is_empty() {
        "(empty)".to_string()
    } else {
        listing.join(", ")
    }
}

impl SvcError {
    /// Creates a new process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }
}

impl BackendError for SvcError {
    fn code(&self) -> &'static str {
        match self {
            SvcError::NotConfigured { .. } => "SVC_001",
            SvcError::RepoNotFound { .. } => "SVC_002",
            SvcError::ScriptNotFound { .. } => "SVC_003",
            SvcError::ModelNotFound { .. } => "SVC_004",
            SvcError::ModelConfigNotFound { .. } => "SVC_005",
            SvcError::InterpreterNotFound { .. } => "SVC_006",
            SvcError::SpawnFailed(_) => "SVC_007",
            SvcError::Timeout { .. } => "SVC_008",
            SvcError::ProcessFailed { .. } => "SVC_009",
            SvcError::OutputNotFound { .. } => "SVC_010",
            SvcError::StageFailed { .. } => "SVC_011",
            SvcError::Io(_) => "SVC_012",
        }
    }

    fn category(&self) -> &'static str {
        "svc"
    }

    fn kind(&self) -> ErrorKind {
        match self {
            SvcError::NotConfigured { .. }
            | SvcError::RepoNotFound { .. }
            | SvcError::ScriptNotFound { .. }
            | SvcError::ModelNotFound { .. }
            | SvcError::ModelConfigNotFound { .. }
            | SvcError::InterpreterNotFound { .. } => ErrorKind::ResourceMissing,
            SvcError::SpawnFailed(_) | SvcError::Timeout { .. } | SvcError::ProcessFailed { .. } => {
                ErrorKind::InvocationFailed
            }
            SvcError::OutputNotFound { .. } => ErrorKind::OutputMissing,
            SvcError::StageFailed { .. } | SvcError::Io(_) => ErrorKind::Internal,
        }
    }
}
