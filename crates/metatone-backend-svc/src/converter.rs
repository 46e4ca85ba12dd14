//! So-VITS-SVC subprocess orchestrator.
//!
//! The inference script reads its input from `<repo>/raw/<name>.wav` and
//! writes `<repo>/results/<name>_<t>key_<speaker>_sovits_<f0>.flac`, so the
//! converter stages files at those fixed locations and cleans both up once
//! the artifact has been read.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use metatone_backend_audio::{wait_with_timeout, RenderedAudio, WaitOutcome};
use metatone_spec::VoiceConversionConfig;
use tracing::{debug, info, warn};

use crate::error::{SvcError, SvcResult};

const RAW_DIR: &str = "raw";
const RESULTS_DIR: &str = "results";

/// Converts a rough waveform into a sung voice.
pub trait VoiceConverter {
    /// Converts WAV bytes into the target voice.
    fn convert(&self, wav: &[u8]) -> SvcResult<RenderedAudio>;
}

/// Configuration for [`SoVitsSvcConverter`].
#[derive(Debug, Clone)]
pub struct SoVitsSvcConfig {
    /// Converter repository; working directory of the script.
    pub repo_dir: Option<PathBuf>,
    /// Interpreter.
    pub python: PathBuf,
    /// Inference script, relative to the repository unless absolute.
    pub script: PathBuf,
    /// Generator checkpoint, relative to the repository unless absolute.
    pub model_path: Option<PathBuf>,
    /// Model config, relative to the repository unless absolute.
    pub config_path: Option<PathBuf>,
    /// Target speaker.
    pub speaker: String,
    /// Pitch shift in semitones.
    pub transpose: i32,
    /// Staged input base name.
    pub input_name: String,
    /// F0 predictor tag in the output name.
    pub f0_predictor: String,
    /// Conversion timeout.
    pub timeout: Duration,
}

impl Default for SoVitsSvcConfig {
    fn default() -> Self {
        Self::from_config(&VoiceConversionConfig::default())
    }
}

impl SoVitsSvcConfig {
    /// Builds a config from the `voice_conversion` config section.
    pub fn from_config(config: &VoiceConversionConfig) -> Self {
        Self {
            repo_dir: config.repo_dir.clone(),
            python: config.python.clone(),
            script: config.script.clone(),
            model_path: config.model_path.clone(),
            config_path: config.config_path.clone(),
            speaker: config.speaker.clone(),
            transpose: config.transpose,
            input_name: config.input_name.clone(),
            f0_predictor: config.f0_predictor.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Sets the repository directory.
    pub fn repo_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_dir = Some(path.into());
        self
    }

    /// Sets the interpreter.
    pub fn python(mut self, path: impl Into<PathBuf>) -> Self {
        self.python = path.into();
        self
    }

    /// Sets the inference script.
    pub fn script(mut self, path: impl Into<PathBuf>) -> Self {
        self.script = path.into();
        self
    }

    /// Sets the model checkpoint.
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Sets the model config.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Sets the speaker.
    pub fn speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = speaker.into();
        self
    }

    /// Sets the transpose in semitones.
    pub fn transpose(mut self, semitones: i32) -> Self {
        self.transpose = semitones;
        self
    }

    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name of the file the script is expected to produce.
    pub fn output_file_name(&self) -> String {
        format!(
            "{}_{}key_{}_sovits_{}.flac",
            self.input_name, self.transpose, self.speaker, self.f0_predictor
        )
    }
}

/// Paths resolved by [`SoVitsSvcConverter::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Repository directory.
    pub repo_dir: PathBuf,
    /// Interpreter executable.
    pub python: PathBuf,
    /// Inference script.
    pub script: PathBuf,
    /// Model checkpoint.
    pub model: PathBuf,
    /// Model config.
    pub config: PathBuf,
}

impl ResolvedPaths {
    /// Staged input location.
    pub fn input_path(&self, config: &SoVitsSvcConfig) -> PathBuf {
        self.repo_dir
            .join(RAW_DIR)
            .join(format!("{}.wav", config.input_name))
    }

    /// Expected output location.
    pub fn output_path(&self, config: &SoVitsSvcConfig) -> PathBuf {
        self.repo_dir
            .join(RESULTS_DIR)
            .join(config.output_file_name())
    }

    /// Results directory.
    pub fn results_dir(&self) -> PathBuf {
        self.repo_dir.join(RESULTS_DIR)
    }
}

/// Removes the registered files when dropped, along with the staging
/// directory if this guard created it.
struct StagedFiles {
    paths: Vec<PathBuf>,
    created_dir: Option<PathBuf>,
}

impl StagedFiles {
    fn new() -> Self {
        Self {
            paths: Vec::new(),
            created_dir: None,
        }
    }

    fn track(&mut self, path: &Path) {
        self.paths.push(path.to_path_buf());
    }

    /// Creates `dir` unless it already exists.
    fn create_dir(&mut self, dir: &Path) -> std::io::Result<()> {
        if dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(dir)?;
        self.created_dir = Some(dir.to_path_buf());
        Ok(())
    }
}

impl Drop for StagedFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed staged file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove staged file"),
            }
        }
        // Left in place if anything else was written there meanwhile.
        if let Some(dir) = &self.created_dir {
            if fs::remove_dir(dir).is_ok() {
                debug!(path = %dir.display(), "removed staging directory");
            }
        }
    }
}

/// Runs So-VITS-SVC inference as a subprocess.
#[derive(Debug, Clone)]
pub struct SoVitsSvcConverter {
    config: SoVitsSvcConfig,
}

impl SoVitsSvcConverter {
    /// Creates a converter with the given configuration.
    pub fn with_config(config: SoVitsSvcConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SoVitsSvcConfig {
        &self.config
    }

    /// Checks that the repository, interpreter, script, model and config
    /// all exist. Nothing is written.
    pub fn validate(&self) -> SvcResult<ResolvedPaths> {
        let repo_dir = self
            .config
            .repo_dir
            .clone()
            .ok_or(SvcError::NotConfigured {
                setting: "voice_conversion.repo_dir",
            })?;
        if !repo_dir.is_dir() {
            return Err(SvcError::RepoNotFound { path: repo_dir });
        }

        let script = resolve(&repo_dir, &self.config.script);
        if !script.is_file() {
            return Err(SvcError::ScriptNotFound { path: script });
        }

        let model = self
            .config
            .model_path
            .as_ref()
            .map(|p| resolve(&repo_dir, p))
            .ok_or(SvcError::NotConfigured {
                setting: "voice_conversion.model_path",
            })?;
        if !model.is_file() {
            return Err(SvcError::ModelNotFound { path: model });
        }

        let config = self
            .config
            .config_path
            .as_ref()
            .map(|p| resolve(&repo_dir, p))
            .ok_or(SvcError::NotConfigured {
                setting: "voice_conversion.config_path",
            })?;
        if !config.is_file() {
            return Err(SvcError::ModelConfigNotFound { path: config });
        }

        let python =
            which::which(&self.config.python).map_err(|_| SvcError::InterpreterNotFound {
                program: self.config.python.display().to_string(),
            })?;

        Ok(ResolvedPaths {
            repo_dir,
            python,
            script,
            model,
            config,
        })
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

impl VoiceConverter for SoVitsSvcConverter {
    fn convert(&self, wav: &[u8]) -> SvcResult<RenderedAudio> {
        let paths = self.validate()?;
        let input = paths.input_path(&self.config);
        let output = paths.output_path(&self.config);

        // The script never clears results/, so a file from an earlier run
        // would otherwise pass for this run's artifact.
        match fs::remove_file(&output) {
            Ok(()) => debug!(path = %output.display(), "removed stale converter output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SvcError::StageFailed {
                    path: output.clone(),
                    source: e,
                })
            }
        }

        let mut staged = StagedFiles::new();
        staged.track(&input);
        staged.track(&output);

        let raw_dir = paths.repo_dir.join(RAW_DIR);
        staged.create_dir(&raw_dir).map_err(|e| SvcError::StageFailed {
            path: raw_dir.clone(),
            source: e,
        })?;
        fs::write(&input, wav).map_err(|e| SvcError::StageFailed {
            path: input.clone(),
            source: e,
        })?;

        debug!(
            python = %paths.python.display(),
            script = %paths.script.display(),
            speaker = %self.config.speaker,
            transpose = self.config.transpose,
            "spawning voice converter"
        );

        let start = Instant::now();
        let child = Command::new(&paths.python)
            .arg(&paths.script)
            .arg("-m")
            .arg(&paths.model)
            .arg("-c")
            .arg(&paths.config)
            .arg("-n")
            .arg(&self.config.input_name)
            .arg("-t")
            .arg(self.config.transpose.to_string())
            .arg("-s")
            .arg(&self.config.speaker)
            .current_dir(&paths.repo_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SvcError::SpawnFailed)?;

        let result = match wait_with_timeout(child, self.config.timeout)? {
            WaitOutcome::Exited(result) => result,
            WaitOutcome::TimedOut => {
                return Err(SvcError::Timeout {
                    timeout_secs: self.config.timeout.as_secs(),
                })
            }
        };

        if !result.status.success() {
            return Err(SvcError::process_failed(
                result.exit_code(),
                result.stderr.trim(),
            ));
        }
        if !result.stdout.trim().is_empty() {
            debug!(stdout = %result.stdout.trim(), "voice converter output");
        }

        if !output.is_file() {
            return Err(SvcError::OutputNotFound {
                listing: list_dir(&paths.results_dir()),
                path: output,
            });
        }
        let data = fs::read(&output)?;

        info!(
            bytes = data.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            speaker = %self.config.speaker,
            "converted voice"
        );
        Ok(RenderedAudio::flac(data))
    }
}
