//! Notes and scores.

use serde::{Deserialize, Serialize};

use crate::pitch::Pitch;

/// General MIDI program used for every score ("Voice Oohs", zero-based 53).
pub const DEFAULT_PROGRAM: u8 = 53;

/// Duration of every melody note, in beats (quarter notes).
pub const NOTE_BEATS: f64 = 1.0;

/// A pitched, timed note bound to one lyric unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Pitch of the note.
    pub pitch: Pitch,
    /// Duration in beats.
    pub duration: f64,
    /// Syllable unit sung on this note.
    pub lyric: String,
}

impl Note {
    /// Creates a note.
    pub fn new(pitch: Pitch, duration: f64, lyric: impl Into<String>) -> Self {
        Self {
            pitch,
            duration,
            lyric: lyric.into(),
        }
    }

    /// Returns the note as a `(pitch, duration, lyric)` triple.
    pub fn triple(&self) -> (Pitch, f64, &str) {
        (self.pitch, self.duration, self.lyric.as_str())
    }
}

/// An ordered note sequence with a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// General MIDI program number (0-127).
    pub program: u8,
    /// Notes in lyric order.
    pub notes: Vec<Note>,
}

impl Score {
    /// Creates an empty score with the given program.
    pub fn new(program: u8) -> Self {
        Self {
            program,
            notes: Vec::new(),
        }
    }

    /// Returns true when the score has no notes.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Returns the number of notes.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Total length in beats.
    pub fn total_beats(&self) -> f64 {
        self.notes.iter().map(|n| n.duration).sum()
    }

    /// Lyric units in note order.
    pub fn lyrics(&self) -> impl Iterator<Item = &str> {
        self.notes.iter().map(|n| n.lyric.as_str())
    }

    /// Notes as `(pitch, duration, lyric)` triples.
    pub fn triples(&self) -> Vec<(Pitch, f64, &str)> {
        self.notes.iter().map(Note::triple).collect()
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_score() {
        let score = Score::default();
        assert_eq!(score.program, 53);
        assert!(score.is_empty());
        assert_eq!(score.total_beats(), 0.0);
    }

    #[test]
    fn test_triples_and_beats() {
        let mut score = Score::default();
        score.notes.push(Note::new(Pitch::C4, NOTE_BEATS, "Hel"));
        score.notes.push(Note::new(Pitch::D4, NOTE_BEATS, "lo"));

        assert_eq!(score.len(), 2);
        assert_eq!(score.total_beats(), 2.0);
        assert_eq!(
            score.triples(),
            vec![(Pitch::C4, 1.0, "Hel"), (Pitch::D4, 1.0, "lo")]
        );
        assert_eq!(score.lyrics().collect::<Vec<_>>(), vec!["Hel", "lo"]);
    }

    #[test]
    fn test_note_json() {
        let note = Note::new(Pitch::E4, 1.0, "world");
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(json, r#"{"pitch":"E4","duration":1.0,"lyric":"world"}"#);
    }
}
