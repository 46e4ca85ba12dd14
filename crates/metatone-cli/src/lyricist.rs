//! Lyric and title generation from a drawing.
//!
//! The vision-language model is an external collaborator. [`CommandLyricist`]
//! runs a configured command (by default `ollama run llava:7b`) and reads the
//! generated text from stdout.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use metatone_backend_audio::{wait_with_timeout, WaitOutcome};
use metatone_spec::{
    format_lyrics, trim_generated, BackendError, ErrorKind, LyricText, LyricistConfig, Song,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Prompt for the song lyrics.
pub const LYRICS_PROMPT: &str = "You are a creative songwriting assistant.
Please look at the image I provide and write a structured poetic song inspired by the visual content.

**Requirements**:
1. The song must include [Verse], [Chorus], and optionally [Bridge].
2. Capture deep emotions, vivid imagery, and a dynamic sense of movement.
3. Each section should introduce new elements, avoiding repetitive phrases.
4. Keep lines concise, naturally rhythmic, and easy to sing.
5. Verses should be introspective and descriptive, while the chorus should be impactful, emotionally intense, and memorable.
6. Build emotional tension and resolution within the narrative.

Now here is the image:";

/// Prompt for the song title.
pub const TITLE_PROMPT: &str = "Provide a concise, creative, and poetic song title. \
Only output the title, with no extra words or disclaimers.";

/// Title used when the model returns nothing usable.
pub const FALLBACK_TITLE: &str = "Untitled";

/// Result type for lyricist operations.
pub type LyricistResult<T> = Result<T, LyricistError>;

/// Errors from the lyricist.
#[derive(Debug, Error)]
pub enum LyricistError {
    /// The drawing does not exist.
    #[error("Image not found: {path}")]
    ImageNotFound { path: PathBuf },

    /// The lyricist program could not be located.
    #[error("Lyricist program not found: {program}")]
    ProgramNotFound { program: String },

    /// Failed to spawn the lyricist.
    #[error("Failed to spawn lyricist: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// The lyricist did not finish in time.
    #[error("Lyricist timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The lyricist exited with a non-zero status.
    #[error("Lyricist exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// The lyricist produced no text.
    #[error("Lyricist returned no {what}")]
    EmptyOutput { what: &'static str },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError for LyricistError {
    fn code(&self) -> &'static str {
        match self {
            LyricistError::ImageNotFound { .. } => "LYRICIST_001",
            LyricistError::ProgramNotFound { .. } => "LYRICIST_002",
            LyricistError::SpawnFailed(_) => "LYRICIST_003",
            LyricistError::Timeout { .. } => "LYRICIST_004",
            LyricistError::ProcessFailed { .. } => "LYRICIST_005",
            LyricistError::EmptyOutput { .. } => "LYRICIST_006",
            LyricistError::Io(_) => "LYRICIST_007",
        }
    }

    fn category(&self) -> &'static str {
        "lyricist"
    }

    fn kind(&self) -> ErrorKind {
        match self {
            LyricistError::ImageNotFound { .. } => ErrorKind::InputMissing,
            LyricistError::ProgramNotFound { .. } => ErrorKind::ResourceMissing,
            LyricistError::SpawnFailed(_)
            | LyricistError::Timeout { .. }
            | LyricistError::ProcessFailed { .. } => ErrorKind::InvocationFailed,
            LyricistError::EmptyOutput { .. } => ErrorKind::OutputMissing,
            LyricistError::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Generates text from an image and a prompt.
pub trait Lyricist {
    /// Returns the raw generated text.
    fn generate(&self, image: &Path, prompt: &str) -> LyricistResult<String>;
}

/// Runs an external command as the lyricist.
#[derive(Debug, Clone)]
pub struct CommandLyricist {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandLyricist {
    /// Creates a lyricist from the `lyricist` config section.
    pub fn from_config(config: &LyricistConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Checks that the program can be found.
    pub fn validate(&self) -> LyricistResult<PathBuf> {
        which::which(&self.program).map_err(|_| LyricistError::ProgramNotFound {
            program: self.program.clone(),
        })
    }

    /// Expands `{prompt}` and `{image}` in the argument template.
    pub fn expand_args(&self, image: &Path, prompt: &str) -> Vec<String> {
        let image = image.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace("{prompt}", prompt).replace("{image}", &image))
            .collect()
    }
}

impl Lyricist for CommandLyricist {
    fn generate(&self, image: &Path, prompt: &str) -> LyricistResult<String> {
        let program = self.validate()?;
        debug!(program = %program.display(), image = %image.display(), "spawning lyricist");

        let child = Command::new(&program)
            .args(self.expand_args(image, prompt))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(LyricistError::SpawnFailed)?;

        match wait_with_timeout(child, self.timeout)? {
            WaitOutcome::Exited(output) if output.status.success() => Ok(output.stdout),
            WaitOutcome::Exited(output) => Err(LyricistError::ProcessFailed {
                exit_code: output.exit_code(),
                stderr: output.stderr.trim().to_string(),
            }),
            WaitOutcome::TimedOut => Err(LyricistError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}

/// Generates a title and lyrics for a drawing.
///
/// Lyrics are trimmed of surrounding quotes, blank lines are dropped and
/// every line starts with a capital letter.
pub fn write_song(lyricist: &dyn Lyricist, image: &Path) -> LyricistResult<Song> {
    if !image.is_file() {
        return Err(LyricistError::ImageNotFound {
            path: image.to_path_buf(),
        });
    }

    let raw_lyrics = lyricist.generate(image, LYRICS_PROMPT)?;
    let lyrics = LyricText::parse(&format_lyrics(trim_generated(&raw_lyrics)));
    if lyrics.is_empty() {
        return Err(LyricistError::EmptyOutput { what: "lyrics" });
    }

    let raw_title = lyricist.generate(image, TITLE_PROMPT)?;
    let title = match trim_generated(&raw_title) {
        "" => {
            warn!("lyricist returned an empty title");
            FALLBACK_TITLE.to_string()
        }
        title => title.to_string(),
    };

    info!(title = %title, lines = lyrics.len(), "wrote song");
    Ok(Song::new(title, lyrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Answers each prompt with a fixed string.
    struct Scripted {
        lyrics: &'static str,
        title: &'static str,
    }

    impl Lyricist for Scripted {
        fn generate(&self, _image: &Path, prompt: &str) -> LyricistResult<String> {
            Ok(if prompt == TITLE_PROMPT {
                self.title.to_string()
            } else {
                self.lyrics.to_string()
            })
        }
    }

    fn image() -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        std::fs::write(file.path(), b"\x89PNG").unwrap();
        file
    }

    #[test]
    fn test_write_song_cleans_output() {
        let lyricist = Scripted {
            lyrics: "\"[Verse]\nbrushstrokes bloom\n\n\nacross the sky\"\n",
            title: "  \"Paper Sky\"  ",
        };
        let img = image();
        let song = write_song(&lyricist, img.path()).unwrap();

        assert_eq!(song.title, "Paper Sky");
        assert_eq!(
            song.lyrics.lines(),
            ["[Verse]", "Brushstrokes bloom", "Across the sky"]
        );
    }

    #[test]
    fn test_missing_image_is_input_missing() {
        let lyricist = Scripted {
            lyrics: "la",
            title: "La",
        };
        let err = write_song(&lyricist, Path::new("/no/drawing.png")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputMissing);
    }

    #[test]
    fn test_empty_lyrics_is_output_missing() {
        let lyricist = Scripted {
            lyrics: " \"\" ",
            title: "Nothing",
        };
        let img = image();
        let err = write_song(&lyricist, img.path()).unwrap_err();
        assert!(matches!(err, LyricistError::EmptyOutput { what: "lyrics" }));
        assert_eq!(err.kind(), ErrorKind::OutputMissing);
    }

    #[test]
    fn test_empty_title_falls_back() {
        let lyricist = Scripted {
            lyrics: "one line",
            title: "\"\"",
        };
        let img = image();
        assert_eq!(write_song(&lyricist, img.path()).unwrap().title, FALLBACK_TITLE);
    }

    #[test]
    fn test_expand_args() {
        let lyricist = CommandLyricist::from_config(&LyricistConfig::default());
        let args = lyricist.expand_args(Path::new("/tmp/d.png"), "Describe");
        assert_eq!(args, vec!["run", "llava:7b", "Describe /tmp/d.png"]);
    }

    #[test]
    fn test_missing_program() {
        let lyricist = CommandLyricist::from_config(&LyricistConfig {
            program: "metatone-no-such-lyricist".to_string(),
            ..Default::default()
        });
        let err = lyricist.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceMissing);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_lyricist_reads_stdout() {
        let lyricist = CommandLyricist::from_config(&LyricistConfig {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "printf '%s|%s' \"$0\" \"$1\"".to_string(),
                "{image}".to_string(),
                "{prompt}".to_string(),
            ],
            timeout_secs: 10,
        });
        let out = lyricist.generate(Path::new("d.png"), "Title please").unwrap();
        assert_eq!(out, "d.png|Title please");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_lyricist_failure_carries_stderr() {
        let lyricist = CommandLyricist::from_config(&LyricistConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo 'model not found' 1>&2; exit 1".to_string()],
            timeout_secs: 10,
        });
        let err = lyricist.generate(Path::new("d.png"), "x").unwrap_err();
        assert!(err.to_string().contains("model not found"));
        assert_eq!(err.kind(), ErrorKind::InvocationFailed);
    }
}
