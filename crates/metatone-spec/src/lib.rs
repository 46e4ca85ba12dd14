//! MetaTone Core Types
//!
//! This crate holds the values that flow through the MetaTone pipeline, from
//! generated lyrics to a playable score, plus the error taxonomy and the
//! configuration shared by every backend.
//!
//! # Example
//!
//! ```
//! use metatone_spec::{LyricText, Note, Pitch, Score};
//!
//! let lyrics = LyricText::parse("Hello world\n\nSecond line");
//! assert_eq!(lyrics.len(), 2);
//!
//! let mut score = Score::default();
//! score.notes.push(Note::new(Pitch::C4, 1.0, "Hel"));
//! assert_eq!(score.program, 53);
//! ```
//!
//! # Modules
//!
//! - [`pitch`]: MIDI pitches and note names
//! - [`score`]: Notes and scores
//! - [`lyrics`]: Lyric text, songs and sessions
//! - [`config`]: Pipeline configuration
//! - [`error`]: Error taxonomy and the backend error trait

pub mod config;
pub mod error;
pub mod lyrics;
pub mod pitch;
pub mod score;

pub use config::{
    LoggingConfig, LyricistConfig, MetatoneConfig, MusicConfig, RendererConfig,
    VoiceConversionConfig,
};
pub use error::{BackendError, ErrorKind, GenerationError, SpecError};
pub use lyrics::{format_lyrics, trim_generated, LyricText, Session, Song};
pub use pitch::{Pitch, MELODY_SCALE};
pub use score::{Note, Score, DEFAULT_PROGRAM, NOTE_BEATS};
