//! MetaTone Audio Backend - Basic Rendering
//!
//! Renders Standard MIDI Files into WAV audio with a SoundFont by driving
//! FluidSynth as a subprocess, and inspects the resulting WAV data.
//!
//! The renderer never synthesizes a fallback: if the SoundFont or the
//! FluidSynth executable is missing, rendering fails before any temporary
//! file is created.
//!
//! # Example
//!
//! ```no_run
//! use metatone_backend_audio::{AudioRenderer, FluidSynthConfig, FluidSynthRenderer};
//!
//! let renderer = FluidSynthRenderer::with_config(
//!     FluidSynthConfig::default().soundfont("soundfonts/VocalsPapel.sf2"),
//! );
//! let midi = std::fs::read("score.mid").unwrap();
//! let audio = renderer.render(&midi).unwrap();
//! std::fs::write("rough.wav", &audio.data).unwrap();
//! ```

pub mod audio;
pub mod error;
pub mod process;
pub mod render;
pub mod wav;

pub use audio::{AudioFormat, RenderedAudio};
pub use error::{AudioError, AudioResult};
pub use process::{wait_with_timeout, ProcessOutput, WaitOutcome};
pub use render::{AudioRenderer, FluidSynthConfig, FluidSynthRenderer, FLUIDSYNTH_PATH_ENV};
pub use wav::{compute_pcm_hash, extract_pcm_data, inspect_wav, WavInfo};

/// Crate version for backend identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend identifier.
pub const BACKEND_ID: &str = "metatone-backend-audio";
