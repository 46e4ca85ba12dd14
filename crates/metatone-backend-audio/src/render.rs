//! FluidSynth subprocess renderer.
//!
//! Each call stages the MIDI file in its own temporary directory, runs
//! `fluidsynth -ni <sf2> <in.mid> -F <out.wav> -r <rate>` and reads the WAV
//! back. The directory is removed when the call returns, on every path.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use metatone_spec::RendererConfig;
use tracing::{debug, info};

use crate::audio::RenderedAudio;
use crate::error::{AudioError, AudioResult};
use crate::process::{wait_with_timeout, WaitOutcome};

/// Environment variable naming the FluidSynth executable.
pub const FLUIDSYNTH_PATH_ENV: &str = "FLUIDSYNTH_PATH";

const INPUT_FILE: &str = "score.mid";
const OUTPUT_FILE: &str = "render.wav";

/// Turns MIDI bytes into a waveform.
pub trait AudioRenderer {
    /// Renders a Standard MIDI File.
    fn render(&self, midi: &[u8]) -> AudioResult<RenderedAudio>;
}

/// Configuration for [`FluidSynthRenderer`].
#[derive(Debug, Clone)]
pub struct FluidSynthConfig {
    /// SoundFont bank.
    pub soundfont: Option<PathBuf>,
    /// Explicit FluidSynth executable.
    pub fluidsynth_path: Option<PathBuf>,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Render timeout.
    pub timeout: Duration,
    /// Parent for per-call temp directories; the system temp dir if unset.
    pub temp_root: Option<PathBuf>,
}

impl Default for FluidSynthConfig {
    fn default() -> Self {
        Self::from_config(None, &RendererConfig::default())
    }
}

impl FluidSynthConfig {
    /// Builds a config from the `soundfont` and `renderer` config values.
    pub fn from_config(soundfont: Option<&Path>, config: &RendererConfig) -> Self {
        Self {
            soundfont: soundfont.map(Path::to_path_buf),
            fluidsynth_path: config.fluidsynth_path.clone(),
            sample_rate: config.sample_rate,
            timeout: Duration::from_secs(config.timeout_secs),
            temp_root: None,
        }
    }

    /// Sets the SoundFont path.
    pub fn soundfont(mut self, path: impl Into<PathBuf>) -> Self {
        self.soundfont = Some(path.into());
        self
    }

    /// Sets the FluidSynth executable path.
    pub fn fluidsynth_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fluidsynth_path = Some(path.into());
        self
    }

    /// Sets the sample rate.
    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the parent directory for temporary files.
    pub fn temp_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(path.into());
        self
    }
}

/// Renders MIDI through a FluidSynth subprocess.
#[derive(Debug, Clone)]
pub struct FluidSynthRenderer {
    config: FluidSynthConfig,
}

impl FluidSynthRenderer {
    /// Creates a renderer with the given configuration.
    pub fn with_config(config: FluidSynthConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FluidSynthConfig {
        &self.config
    }

    /// Checks that the SoundFont and FluidSynth are both available.
    ///
    /// Returns the resolved SoundFont and executable paths.
    pub fn validate(&self) -> AudioResult<(PathBuf, PathBuf)> {
        let soundfont = self.soundfont()?;
        let fluidsynth = self.find_fluidsynth()?;
        Ok((soundfont, fluidsynth))
    }

    /// Resolves the SoundFont, which must be an existing file.
    pub fn soundfont(&self) -> AudioResult<PathBuf> {
        let path = self
            .config
            .soundfont
            .as_ref()
            .ok_or(AudioError::SoundFontNotConfigured)?;
        if !path.is_file() {
            return Err(AudioError::SoundFontNotFound { path: path.clone() });
        }
        Ok(path.clone())
    }

    /// Finds the FluidSynth executable.
    pub fn find_fluidsynth(&self) -> AudioResult<PathBuf> {
        // Config override first
        if let Some(ref path) = self.config.fluidsynth_path {
            if path.exists() {
                return Ok(path.clone());
            }
        }

        if let Ok(path) = std::env::var(FLUIDSYNTH_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        let names = if cfg!(windows) {
            vec!["fluidsynth.exe", "fluidsynth"]
        } else {
            vec!["fluidsynth"]
        };
        for name in names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        let common_paths = if cfg!(windows) {
            vec!["C:\\Program Files\\FluidSynth\\bin\\fluidsynth.exe"]
        } else if cfg!(target_os = "macos") {
            vec!["/opt/homebrew/bin/fluidsynth", "/usr/local/bin/fluidsynth"]
        } else {
            vec!["/usr/bin/fluidsynth", "/usr/local/bin/fluidsynth"]
        };
        for path_str in common_paths {
            let path = PathBuf::from(path_str);
            if path.exists() {
                return Ok(path);
            }
        }

        Err(AudioError::SynthesizerNotFound)
    }

    fn temp_dir(&self) -> AudioResult<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("metatone-render-");
        let dir = match self.config.temp_root {
            Some(ref root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}

impl AudioRenderer for FluidSynthRenderer {
    fn render(&self, midi: &[u8]) -> AudioResult<RenderedAudio> {
        // Resource checks happen before anything touches disk.
        let (soundfont, fluidsynth) = self.validate()?;

        let work_dir = self.temp_dir()?;
        let input = work_dir.path().join(INPUT_FILE);
        let output = work_dir.path().join(OUTPUT_FILE);
        std::fs::write(&input, midi)?;

        debug!(
            fluidsynth = %fluidsynth.display(),
            soundfont = %soundfont.display(),
            sample_rate = self.config.sample_rate,
            "spawning FluidSynth"
        );

        let start = Instant::now();
        let child = Command::new(&fluidsynth)
            .arg("-ni")
            .arg(&soundfont)
            .arg(&input)
            .arg("-F")
            .arg(&output)
            .arg("-r")
            .arg(self.config.sample_rate.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(AudioError::SpawnFailed)?;

        let result = match wait_with_timeout(child, self.config.timeout)? {
            WaitOutcome::Exited(result) => result,
            WaitOutcome::TimedOut => {
                return Err(AudioError::Timeout {
                    timeout_secs: self.config.timeout.as_secs(),
                })
            }
        };

        if !result.status.success() {
            return Err(AudioError::process_failed(
                result.exit_code(),
                result.stderr.trim(),
            ));
        }
        if !result.stdout.trim().is_empty() {
            debug!(stdout = %result.stdout.trim(), "FluidSynth output");
        }

        if !output.is_file() {
            return Err(AudioError::OutputNotFound { path: output });
        }
        let audio = RenderedAudio::wav(std::fs::read(&output)?)?;

        info!(
            bytes = audio.data.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            pcm_hash = audio.pcm_hash.as_deref().map(|h| &h[..16]).unwrap_or("-"),
            "rendered waveform"
        );
        Ok(audio)
    }
}
