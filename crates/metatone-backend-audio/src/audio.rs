//! Rendered audio artifacts.

use crate::error::AudioResult;
use crate::wav::{compute_pcm_hash, inspect_wav, WavInfo};

/// Container format of an audio artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// RIFF/WAVE, produced by the basic renderer.
    Wav,
    /// FLAC, produced by voice conversion.
    Flac,
}

impl AudioFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
        }
    }

    /// MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Flac => "audio/flac",
        }
    }
}

/// Audio bytes produced by a pipeline stage.
#[derive(Debug, Clone)]
pub struct RenderedAudio {
    /// Container format.
    pub format: AudioFormat,
    /// Complete file bytes.
    pub data: Vec<u8>,
    /// Header summary, for WAV output.
    pub info: Option<WavInfo>,
    /// BLAKE3 of the PCM data, for WAV output.
    pub pcm_hash: Option<String>,
}

impl RenderedAudio {
    /// Wraps WAV bytes, validating the header.
    pub fn wav(data: Vec<u8>) -> AudioResult<Self> {
        let info = inspect_wav(&data)?;
        let pcm_hash = compute_pcm_hash(&data);
        Ok(Self {
            format: AudioFormat::Wav,
            data,
            info: Some(info),
            pcm_hash,
        })
    }

    /// Wraps FLAC bytes as produced by a converter.
    pub fn flac(data: Vec<u8>) -> Self {
        Self {
            format: AudioFormat::Flac,
            data,
            info: None,
            pcm_hash: None,
        }
    }

    /// BLAKE3 of the complete file bytes.
    pub fn file_hash(&self) -> String {
        blake3::hash(&self.data).to_hex().to_string()
    }
}
