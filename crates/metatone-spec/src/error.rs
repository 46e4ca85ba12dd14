//! Error taxonomy shared by every pipeline stage.

use std::fmt;

/// Failure classes surfaced to the end user.
///
/// Every backend error maps onto exactly one kind. The CLI uses the kind to
/// pick an exit code; the message and diagnostic text come from the error
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No drawn image or lyric source content was provided.
    InputMissing,
    /// A static resource (sound bank, model, config, executable) is absent.
    ResourceMissing,
    /// An external process exited with a non-zero status or timed out.
    InvocationFailed,
    /// An external process succeeded but its artifact could not be located.
    OutputMissing,
    /// Local I/O, encoding or decoding failure.
    Internal,
}

impl ErrorKind {
    /// Returns the stable name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InputMissing => "input_missing",
            ErrorKind::ResourceMissing => "resource_missing",
            ErrorKind::InvocationFailed => "invocation_failed",
            ErrorKind::OutputMissing => "output_missing",
            ErrorKind::Internal => "internal",
        }
    }

    /// Returns true for failures caused by what the user supplied rather
    /// than by a generation step.
    pub fn is_user_error(&self) -> bool {
        matches!(self, ErrorKind::InputMissing | ErrorKind::ResourceMissing)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common interface for backend error types.
///
/// # Example
///
/// ```
/// use metatone_spec::error::BackendError;
///
/// fn handle_error<E: BackendError>(err: E) {
///     eprintln!("[{}] {} ({})", err.code(), err.message(), err.kind());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Stable error code such as "AUDIO_001" or "SVC_003".
    fn code(&self) -> &'static str;

    /// Human-readable message, usually the `Display` output.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Category used to group related errors ("music", "audio", "svc").
    fn category(&self) -> &'static str;

    /// Taxonomy class of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type-erased error from any backend.
///
/// Lets the pipeline report errors from different stages uniformly while
/// keeping the code, category and kind of the original.
#[derive(Debug)]
pub struct GenerationError {
    /// The error code (e.g., "AUDIO_001").
    pub code: &'static str,
    /// The human-readable error message.
    pub message: String,
    /// The error category (e.g., "audio", "svc").
    pub category: &'static str,
    /// The taxonomy class.
    pub kind: ErrorKind,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GenerationError {
    /// Create a `GenerationError` from any `BackendError` implementor.
    pub fn from_backend<E: BackendError + Send + Sync + 'static>(err: E) -> Self {
        Self {
            code: err.code(),
            message: err.message(),
            category: err.category(),
            kind: err.kind(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a `GenerationError` with explicit values.
    pub fn new(
        code: &'static str,
        message: impl Into<String>,
        category: &'static str,
        kind: ErrorKind,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            category,
            kind,
            source: None,
        }
    }

    /// Convenience constructor for missing user input.
    pub fn input_missing(message: impl Into<String>) -> Self {
        Self::new("PIPELINE_001", message, "pipeline", ErrorKind::InputMissing)
    }

    /// Convenience constructor for a missing static resource.
    pub fn resource_missing(message: impl Into<String>) -> Self {
        Self::new(
            "PIPELINE_002",
            message,
            "pipeline",
            ErrorKind::ResourceMissing,
        )
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Errors raised while building or loading core values.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// A note name could not be parsed.
    #[error("invalid note name '{0}'")]
    InvalidNoteName(String),

    /// A MIDI key outside 0..=127.
    #[error("MIDI key {0} is out of range (0-127)")]
    KeyOutOfRange(u32),

    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for the expected schema.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration value is out of range.
    #[error("invalid config value for {field}: {message}")]
    ConfigInvalid { field: &'static str, message: String },
}
