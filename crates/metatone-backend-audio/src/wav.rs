//! WAV inspection and PCM hashing.

use std::io::Cursor;

use crate::error::AudioResult;

/// Format summary of a WAV stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    /// Number of channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Number of frames (samples per channel).
    pub frames: u32,
}

impl WavInfo {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Parses the header of a WAV stream.
///
/// Fails with [`AudioError::InvalidWav`](crate::AudioError::InvalidWav) if the
/// bytes are not a WAV file `hound` can read.
pub fn inspect_wav(wav_data: &[u8]) -> AudioResult<WavInfo> {
    let reader = hound::WavReader::new(Cursor::new(wav_data))?;
    let spec = reader.spec();
    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        frames: reader.duration(),
    })
}

/// Extracts the `data` chunk of a RIFF/WAVE buffer.
///
/// Returns `None` if the buffer is not RIFF/WAVE or has no complete data
/// chunk.
pub fn extract_pcm_data(wav_data: &[u8]) -> Option<&[u8]> {
    if wav_data.len() < 12 || &wav_data[0..4] != b"RIFF" || &wav_data[8..12] != b"WAVE" {
        return None;
    }

    let mut pos = 12;
    while pos + 8 <= wav_data.len() {
        let chunk_id = &wav_data[pos..pos + 4];
        let size_bytes: [u8; 4] = wav_data[pos + 4..pos + 8].try_into().ok()?;
        let chunk_size = u32::from_le_bytes(size_bytes) as usize;
        let data_start = pos + 8;

        if chunk_id == b"data" {
            let data_end = data_start.checked_add(chunk_size)?;
            return wav_data.get(data_start..data_end);
        }

        // Chunks are word aligned.
        pos = data_start + chunk_size + (chunk_size % 2);
    }

    None
}

/// BLAKE3 hash of the PCM payload, so header differences between
/// synthesizer versions do not change the hash.
pub fn compute_pcm_hash(wav_data: &[u8]) -> Option<String> {
    extract_pcm_data(wav_data).map(|pcm| blake3::hash(pcm).to_hex().to_string())
}
