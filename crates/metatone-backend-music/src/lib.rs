//! MetaTone Music Backend - Deterministic Lyric-to-Melody Mapping
//!
//! This crate turns lyric text into a playable melody. Every step is a pure
//! function of its input: the same lyrics always produce the same notes and
//! byte-identical MIDI.
//!
//! # Pipeline
//!
//! 1. [`syllable`]: split each line into syllable units (English hyphenation)
//! 2. [`melody`]: one note per unit, pitch walking C4..B4, one beat each
//! 3. [`score`]: concatenate line melodies into a single score, program 53
//! 4. [`midi`]: write the score as a single-track Standard MIDI File with
//!    lyric meta events, and parse such files back
//!
//! # Example
//!
//! ```
//! use metatone_backend_music::{parse_score, Composer};
//! use metatone_spec::LyricText;
//!
//! let composer = Composer::new().unwrap();
//! let lyrics = LyricText::parse("Hello world");
//! let result = composer.compose(&lyrics, None).unwrap();
//!
//! let parsed = parse_score(&result.midi).unwrap();
//! assert_eq!(parsed, result.score);
//! ```

pub mod compose;
pub mod error;
pub mod melody;
pub mod midi;
pub mod score;
pub mod syllable;

pub use compose::{Composer, Composition};
pub use error::{MusicError, MusicResult};
pub use melody::{map_units, melody_for_line, pitch_at};
pub use midi::{parse_score, score_to_smf, write_score, MidiOptions, TICKS_PER_BEAT};
pub use score::ScoreBuilder;
pub use syllable::Syllabifier;

/// Crate version for backend identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend identifier.
pub const BACKEND_ID: &str = "metatone-backend-music";
