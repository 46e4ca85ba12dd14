//! MetaTone Voice Conversion Backend
//!
//! Turns the rough FluidSynth waveform into a sung voice by running an
//! external So-VITS-SVC inference script. Conversion is behind the
//! [`VoiceConverter`] trait; [`SoVitsSvcConverter`] is the bundled
//! implementation.
//!
//! The converter validates every resource before touching disk, waits on the
//! script with an explicit timeout, and removes its staged input and output
//! files on every exit path.

pub mod converter;
pub mod error;

pub use converter::{ResolvedPaths, SoVitsSvcConfig, SoVitsSvcConverter, VoiceConverter};
pub use error::{SvcError, SvcResult};

/// Crate version for backend identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend identifier.
pub const BACKEND_ID: &str = "metatone-backend-svc";
