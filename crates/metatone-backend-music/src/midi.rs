//! Standard MIDI File output and parsing for scores.
//!
//! A score becomes a single-track SMF (format 0):
//!
//! | Tick | Event |
//! |------|-------|
//! | 0 | ProgramChange (channel 0) |
//! | 0 | Track name (when a title is given) |
//! | 0 | Tempo |
//! | per note | Lyric meta, NoteOn, then NoteOff after the note's duration |
//! | end | EndOfTrack |
//!
//! Each lyric event sits at the same tick as, and immediately before, the
//! NoteOn it belongs to, so note index and lyric index always line up.

use std::collections::BTreeMap;

use metatone_spec::{Note, Pitch, Score};
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};

use crate::error::{MusicError, MusicResult};

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_BEAT: u16 = 480;

/// Channel used for the melody.
const MELODY_CHANNEL: u8 = 0;

/// Largest value a tempo meta event can hold (microseconds per beat).
const MAX_TEMPO_MICROS: u32 = 0x00FF_FFFF;

/// Options for MIDI output.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiOptions {
    /// Tempo in beats per minute.
    pub tempo_bpm: u32,
    /// Note-on velocity (1-127).
    pub velocity: u8,
    /// Optional track name, usually the song title.
    pub title: Option<String>,
}

impl Default for MidiOptions {
    fn default() -> Self {
        Self {
            tempo_bpm: 120,
            velocity: 90,
            title: None,
        }
    }
}

impl MidiOptions {
    /// Sets the track name.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn tempo_micros(&self) -> u32 {
        (60_000_000 / self.tempo_bpm.max(1)).min(MAX_TEMPO_MICROS)
    }
}

fn beats_to_ticks(index: usize, note: &Note) -> MusicResult<u32> {
    if !note.duration.is_finite() || note.duration <= 0.0 {
        return Err(MusicError::InvalidDuration {
            index,
            duration: note.duration,
        });
    }
    Ok((note.duration * TICKS_PER_BEAT as f64).round().max(1.0) as u32)
}

fn event(delta: u32, kind: TrackEventKind<'_>) -> TrackEvent<'_> {
    TrackEvent {
        delta: u28::new(delta),
        kind,
    }
}

fn channel_event(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
    event(
        delta,
        TrackEventKind::Midi {
            channel: u4::new(MELODY_CHANNEL),
            message,
        },
    )
}

/// Converts a score to an in-memory SMF borrowing the score's lyrics.
pub fn score_to_smf<'a>(score: &'a Score, options: &'a MidiOptions) -> MusicResult<Smf<'a>> {
    if score.program > 127 {
        return Err(MusicError::InvalidProgram(score.program));
    }
    let velocity = options.velocity.clamp(1, 127);

    let mut track: Track<'a> = Vec::with_capacity(score.notes.len() * 3 + 4);
    track.push(channel_event(
        0,
        MidiMessage::ProgramChange {
            program: u7::new(score.program),
        },
    ));
    if let Some(title) = &options.title {
        track.push(event(
            0,
            TrackEventKind::Meta(MetaMessage::TrackName(title.as_bytes())),
        ));
    }
    track.push(event(
        0,
        TrackEventKind::Meta(MetaMessage::Tempo(u24::new(options.tempo_micros()))),
    ));

    for (index, note) in score.notes.iter().enumerate() {
        let ticks = beats_to_ticks(index, note)?;
        let key = u7::new(note.pitch.midi());

        track.push(event(
            0,
            TrackEventKind::Meta(MetaMessage::Lyric(note.lyric.as_bytes())),
        ));
        track.push(channel_event(
            0,
            MidiMessage::NoteOn {
                key,
                vel: u7::new(velocity),
            },
        ));
        track.push(channel_event(
            ticks,
            MidiMessage::NoteOff {
                key,
                vel: u7::new(0),
            },
        ));
    }

    track.push(event(0, TrackEventKind::Meta(MetaMessage::EndOfTrack)));

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_BEAT)),
    ));
    smf.tracks.push(track);
    Ok(smf)
}

/// Serializes a score to SMF bytes.
pub fn write_score(score: &Score, options: &MidiOptions) -> MusicResult<Vec<u8>> {
    let smf = score_to_smf(score, options)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf).map_err(MusicError::WriteFailed)?;
    Ok(buf)
}

/// A note recovered from a MIDI file, with its position for ordering.
struct ParsedNote {
    start: u64,
    track: usize,
    seq: usize,
    key: u8,
    ticks: u64,
    lyric: String,
}

/// Parses SMF bytes back into a score.
///
/// Notes are ordered by start tick, then by their order in the file. A lyric
/// meta event binds to the next NoteOn of the same track. NoteOn with
/// velocity zero counts as NoteOff. When no ProgramChange is present the
/// program is 0, the General MIDI default.
pub fn parse_score(bytes: &[u8]) -> MusicResult<Score> {
    let smf = Smf::parse(bytes).map_err(|e| MusicError::ParseFailed(e.to_string()))?;
    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(tpb) if tpb.as_int() > 0 => tpb.as_int() as f64,
        _ => return Err(MusicError::UnsupportedTiming),
    };

    let mut program: Option<u8> = None;
    let mut parsed: Vec<ParsedNote> = Vec::new();

    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let mut now: u64 = 0;
        let mut pending_lyric: Option<String> = None;
        // Sounding notes keyed by (channel, key): index into `parsed`.
        let mut open: BTreeMap<(u8, u8), usize> = BTreeMap::new();

        for ev in track {
            now += ev.delta.as_int() as u64;
            match ev.kind {
                TrackEventKind::Meta(MetaMessage::Lyric(text)) => {
                    pending_lyric = Some(String::from_utf8_lossy(text).into_owned());
                }
                TrackEventKind::Midi { channel, message } => {
                    let channel = channel.as_int();
                    match message {
                        MidiMessage::ProgramChange { program: p } => {
                            program.get_or_insert(p.as_int());
                        }
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            let key = key.as_int();
                            if open.contains_key(&(channel, key)) {
                                return Err(MusicError::malformed(format!(
                                    "key {key} retriggered at tick {now} before release"
                                )));
                            }
                            open.insert((channel, key), parsed.len());
                            parsed.push(ParsedNote {
                                start: now,
                                track: track_idx,
                                seq: parsed.len(),
                                key,
                                ticks: 0,
                                lyric: pending_lyric.take().unwrap_or_default(),
                            });
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            if let Some(idx) = open.remove(&(channel, key.as_int())) {
                                parsed[idx].ticks = now - parsed[idx].start;
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        if let Some(((_, key), _)) = open.iter().next() {
            return Err(MusicError::malformed(format!(
                "key {key} in track {track_idx} is never released"
            )));
        }
    }

    parsed.sort_by_key(|n| (n.start, n.track, n.seq));

    let mut score = Score::new(program.unwrap_or(0));
    for note in parsed {
        let pitch = Pitch::from_midi(note.key).map_err(|e| MusicError::malformed(e.to_string()))?;
        score.notes.push(Note::new(
            pitch,
            note.ticks as f64 / ticks_per_beat,
            note.lyric,
        ));
    }
    Ok(score)
}
