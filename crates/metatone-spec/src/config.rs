//! Pipeline configuration.
//!
//! Every field has a default so a config file only needs the values that
//! differ, typically the sound bank and converter paths:
//!
//! ```json
//! {
//!   "soundfont": "soundfonts/VocalsPapel.sf2",
//!   "voice_conversion": {
//!     "repo_dir": "/opt/so-vits-svc",
//!     "model_path": "models/G_800.pth",
//!     "config_path": "configs/config.json"
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::score::DEFAULT_PROGRAM;

/// Default FluidSynth output sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default timeout for the basic renderer, in seconds.
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 120;

/// Default timeout for voice conversion, in seconds.
pub const DEFAULT_SVC_TIMEOUT_SECS: u64 = 600;

/// Default timeout for the lyricist command, in seconds.
pub const DEFAULT_LYRICIST_TIMEOUT_SECS: u64 = 300;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetatoneConfig {
    /// SoundFont used by the basic renderer.
    pub soundfont: Option<PathBuf>,
    /// Basic renderer settings.
    pub renderer: RendererConfig,
    /// Voice conversion settings.
    pub voice_conversion: VoiceConversionConfig,
    /// Lyricist command settings.
    pub lyricist: LyricistConfig,
    /// Melody settings.
    pub music: MusicConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// When set, the composed MIDI and rough WAV are copied here.
    pub debug_dump_dir: Option<PathBuf>,
}

impl MetatoneConfig {
    /// Loads a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let content = std::fs::read_to_string(path).map_err(|e| SpecError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content).map_err(|e| match e {
            SpecError::ConfigParse { source, .. } => SpecError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        let config: Self = serde_json::from_str(json).map_err(|e| SpecError::ConfigParse {
            path: PathBuf::from("<inline>"),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges. File existence is checked by the pipeline.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.music.program > 127 {
            return Err(invalid("music.program", "must be 0-127"));
        }
        if self.music.velocity == 0 || self.music.velocity > 127 {
            return Err(invalid("music.velocity", "must be 1-127"));
        }
        if self.music.tempo_bpm == 0 {
            return Err(invalid("music.tempo_bpm", "must be positive"));
        }
        if self.renderer.sample_rate == 0 {
            return Err(invalid("renderer.sample_rate", "must be positive"));
        }
        if self.renderer.timeout_secs == 0 {
            return Err(invalid("renderer.timeout_secs", "must be positive"));
        }
        if self.voice_conversion.timeout_secs == 0 {
            return Err(invalid(
                "voice_conversion.timeout_secs",
                "must be positive",
            ));
        }
        if self.voice_conversion.speaker.trim().is_empty() {
            return Err(invalid("voice_conversion.speaker", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: &str) -> SpecError {
    SpecError::ConfigInvalid {
        field,
        message: message.to_string(),
    }
}

/// Settings for the FluidSynth renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Explicit FluidSynth executable; otherwise `FLUIDSYNTH_PATH` or `PATH`.
    pub fluidsynth_path: Option<PathBuf>,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Render timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fluidsynth_path: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
        }
    }
}

/// Settings for the So-VITS-SVC voice converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConversionConfig {
    /// Checkout of the converter repository; used as the working directory.
    pub repo_dir: Option<PathBuf>,
    /// Interpreter used to run the inference script.
    pub python: PathBuf,
    /// Inference script, relative to `repo_dir` unless absolute.
    pub script: PathBuf,
    /// Trained generator checkpoint.
    pub model_path: Option<PathBuf>,
    /// Model configuration JSON.
    pub config_path: Option<PathBuf>,
    /// Target speaker identifier.
    pub speaker: String,
    /// Pitch shift in semitones.
    pub transpose: i32,
    /// Base name of the staged input and the derived output.
    pub input_name: String,
    /// F0 predictor tag that appears in the output file name.
    pub f0_predictor: String,
    /// Conversion timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for VoiceConversionConfig {
    fn default() -> Self {
        Self {
            repo_dir: None,
            python: PathBuf::from("python"),
            script: PathBuf::from("inference_main.py"),
            model_path: None,
            config_path: None,
            speaker: "hal-9000".to_string(),
            transpose: 0,
            input_name: "temp_infer".to_string(),
            f0_predictor: "pm".to_string(),
            timeout_secs: DEFAULT_SVC_TIMEOUT_SECS,
        }
    }
}

/// Settings for the external lyricist command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricistConfig {
    /// Program to run.
    pub program: String,
    /// Argument template; `{prompt}` and `{image}` are substituted.
    pub args: Vec<String>,
    /// Timeout in seconds per call.
    pub timeout_secs: u64,
}

impl Default for LyricistConfig {
    fn default() -> Self {
        Self {
            program: "ollama".to_string(),
            args: vec![
                "run".to_string(),
                "llava:7b".to_string(),
                "{prompt} {image}".to_string(),
            ],
            timeout_secs: DEFAULT_LYRICIST_TIMEOUT_SECS,
        }
    }
}

/// Melody and MIDI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    /// General MIDI program for the score.
    pub program: u8,
    /// Tempo written to the MIDI file.
    pub tempo_bpm: u32,
    /// Note-on velocity.
    pub velocity: u8,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM,
            tempo_bpm: 120,
            velocity: 90,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. "info" or "metatone_backend_music=debug".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
