//! Lyric-to-melody mapping.
//!
//! Each syllable unit of a line gets one note. Pitches walk the C major scale
//! C4..B4 by the unit's position in the line and wrap every seven units, so
//! the melody stays within one octave however long the line is. Every note
//! lasts one beat. The mapping is a pure function of the units and never
//! uses randomness.

use metatone_spec::{Note, Pitch, MELODY_SCALE, NOTE_BEATS};

use crate::syllable::Syllabifier;

/// Returns the pitch for the unit at `index` within its line.
pub fn pitch_at(index: usize) -> Pitch {
    MELODY_SCALE[index % MELODY_SCALE.len()]
}

/// Maps a line's syllable units to notes, one note per unit.
pub fn map_units<S: AsRef<str>>(units: &[S]) -> Vec<Note> {
    units
        .iter()
        .enumerate()
        .map(|(i, unit)| Note::new(pitch_at(i), NOTE_BEATS, unit.as_ref()))
        .collect()
}

/// Splits a raw line into units and maps them to notes.
pub fn melody_for_line(syllabifier: &Syllabifier, line: &str) -> Vec<Note> {
    map_units(&syllabifier.split_line(line))
}
