//! The generation pipeline.
//!
//! Stages run in order and can be invoked on their own: lyric generation,
//! composition (melody and MIDI), basic rendering and voice conversion.
//! [`Pipeline::validate`] checks the resources of the requested stages
//! before any of them runs.

use std::path::Path;

use metatone_backend_audio::{
    AudioRenderer, FluidSynthConfig, FluidSynthRenderer, RenderedAudio,
};
use metatone_backend_music::{Composer, Composition};
use metatone_backend_svc::{SoVitsSvcConfig, SoVitsSvcConverter, VoiceConverter};
use metatone_spec::{GenerationError, LyricText, MetatoneConfig, Session, Song};
use tracing::{debug, info, warn};

use crate::lyricist::{write_song, CommandLyricist, Lyricist};

/// File name of the dumped score in the debug dump directory.
pub const DUMP_SCORE_FILE: &str = "score.mid";

/// File name of the dumped rough waveform in the debug dump directory.
pub const DUMP_ROUGH_FILE: &str = "rough.wav";

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Title and lyrics from a drawing.
    Lyrics,
    /// Melody and MIDI from lyrics.
    Compose,
    /// Rough waveform from MIDI.
    Render,
    /// Sung voice from the rough waveform.
    Convert,
}

impl Stage {
    /// Stage name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Lyrics => "lyrics",
            Stage::Compose => "compose",
            Stage::Render => "render",
            Stage::Convert => "convert",
        }
    }
}

/// Everything produced by one `sing` run.
#[derive(Debug, Clone)]
pub struct Performance {
    /// Score and MIDI bytes.
    pub composition: Composition,
    /// FluidSynth rendering.
    pub rough: RenderedAudio,
    /// Voice-converted rendering, when requested.
    pub converted: Option<RenderedAudio>,
}

/// The configured MetaTone pipeline.
#[derive(Debug)]
pub struct Pipeline {
    config: MetatoneConfig,
    composer: Composer,
    renderer: FluidSynthRenderer,
    converter: SoVitsSvcConverter,
}

impl Pipeline {
    /// Builds every stage from the config.
    pub fn new(config: MetatoneConfig) -> Result<Self, GenerationError> {
        let composer = Composer::from_config(&config.music).map_err(GenerationError::from_backend)?;
        let renderer = FluidSynthRenderer::with_config(FluidSynthConfig::from_config(
            config.soundfont.as_deref(),
            &config.renderer,
        ));
        let converter =
            SoVitsSvcConverter::with_config(SoVitsSvcConfig::from_config(&config.voice_conversion));
        Ok(Self {
            config,
            composer,
            renderer,
            converter,
        })
    }

    /// Returns the config.
    pub fn config(&self) -> &MetatoneConfig {
        &self.config
    }

    /// Returns the renderer.
    pub fn renderer(&self) -> &FluidSynthRenderer {
        &self.renderer
    }

    /// Returns the voice converter.
    pub fn converter(&self) -> &SoVitsSvcConverter {
        &self.converter
    }

    /// Checks the resources needed by `stages`.
    pub fn validate(&self, stages: &[Stage]) -> Result<(), GenerationError> {
        for stage in stages {
            debug!(stage = stage.as_str(), "validating stage");
            match stage {
                Stage::Lyrics => {
                    CommandLyricist::from_config(&self.config.lyricist)
                        .validate()
                        .map_err(GenerationError::from_backend)?;
                }
                // The dictionary is loaded when the pipeline is built.
                Stage::Compose => {}
                Stage::Render => {
                    self.renderer
                        .validate()
                        .map_err(GenerationError::from_backend)?;
                }
                Stage::Convert => {
                    self.converter
                        .validate()
                        .map_err(GenerationError::from_backend)?;
                }
            }
        }
        Ok(())
    }

    /// Generates a song for a drawing and records it in the session.
    pub fn generate_lyrics(
        &self,
        lyricist: &dyn Lyricist,
        image: &Path,
        session: &mut Session,
    ) -> Result<Song, GenerationError> {
        let song = write_song(lyricist, image).map_err(GenerationError::from_backend)?;
        if let Some(previous) = session.record(song.clone()) {
            debug!(title = %previous.title, "replaced previous song");
        }
        Ok(song)
    }

    /// Composes the melody and MIDI for `lyrics`.
    pub fn compose(
        &self,
        lyrics: &LyricText,
        title: Option<&str>,
    ) -> Result<Composition, GenerationError> {
        if lyrics.is_empty() {
            return Err(GenerationError::input_missing(
                "Lyrics contain no singable lines",
            ));
        }
        let composition = self
            .composer
            .compose(lyrics, title)
            .map_err(GenerationError::from_backend)?;
        self.dump(DUMP_SCORE_FILE, &composition.midi);
        Ok(composition)
    }

    /// Renders a composition to a rough waveform.
    pub fn render(&self, composition: &Composition) -> Result<RenderedAudio, GenerationError> {
        let audio = self
            .renderer
            .render(&composition.midi)
            .map_err(GenerationError::from_backend)?;
        self.dump(DUMP_ROUGH_FILE, &audio.data);
        Ok(audio)
    }

    /// Converts a rough waveform into the sung voice.
    pub fn convert(&self, rough: &RenderedAudio) -> Result<RenderedAudio, GenerationError> {
        self.converter
            .convert(&rough.data)
            .map_err(GenerationError::from_backend)
    }

    /// Composes, renders and optionally converts `lyrics`.
    pub fn sing(
        &self,
        lyrics: &LyricText,
        title: Option<&str>,
        convert: bool,
    ) -> Result<Performance, GenerationError> {
        let stages: &[Stage] = if convert {
            &[Stage::Compose, Stage::Render, Stage::Convert]
        } else {
            &[Stage::Compose, Stage::Render]
        };
        self.validate(stages)?;

        let composition = self.compose(lyrics, title)?;
        let rough = self.render(&composition)?;
        let converted = if convert {
            Some(self.convert(&rough)?)
        } else {
            None
        };

        info!(
            notes = composition.score.len(),
            converted = converted.is_some(),
            "performance ready"
        );
        Ok(Performance {
            composition,
            rough,
            converted,
        })
    }

    /// Copies an intermediate artifact into the debug dump directory.
    ///
    /// Dump failures are logged and never fail the pipeline.
    fn dump(&self, name: &str, bytes: &[u8]) {
        let Some(ref dir) = self.config.debug_dump_dir else {
            return;
        };
        let path = dir.join(name);
        let result = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, bytes));
        match result {
            Ok(()) => debug!(path = %path.display(), bytes = bytes.len(), "dumped artifact"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to dump artifact"),
        }
    }
}
