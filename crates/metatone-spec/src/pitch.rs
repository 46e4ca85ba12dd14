//! Pitches as MIDI key numbers with scientific note names.
//!
//! Octave convention follows MIDI: `C4` is middle C, key 60.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Semitone offsets for natural note letters.
const SEMITONE_MAP: [(char, i32); 7] = [
    ('C', 0),
    ('D', 2),
    ('E', 4),
    ('F', 5),
    ('G', 7),
    ('A', 9),
    ('B', 11),
];

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A single pitch, stored as a MIDI key number (0-127).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch(u8);

impl Pitch {
    /// C4, middle C.
    pub const C4: Pitch = Pitch(60);
    /// D4.
    pub const D4: Pitch = Pitch(62);
    /// E4.
    pub const E4: Pitch = Pitch(64);
    /// F4.
    pub const F4: Pitch = Pitch(65);
    /// G4.
    pub const G4: Pitch = Pitch(67);
    /// A4 (440 Hz).
    pub const A4: Pitch = Pitch(69);
    /// B4.
    pub const B4: Pitch = Pitch(71);

    /// Creates a pitch from a MIDI key number.
    pub fn from_midi(key: u8) -> Result<Self, SpecError> {
        if key > 127 {
            return Err(SpecError::KeyOutOfRange(key as u32));
        }
        Ok(Self(key))
    }

    /// Returns the MIDI key number.
    pub fn midi(&self) -> u8 {
        self.0
    }

    /// Returns the octave in MIDI numbering (key 60 is octave 4).
    pub fn octave(&self) -> i32 {
        self.0 as i32 / 12 - 1
    }

    /// Returns the frequency in Hz (equal temperament, A4 = 440 Hz).
    pub fn frequency(&self) -> f64 {
        440.0 * 2.0_f64.powf((self.0 as f64 - 69.0) / 12.0)
    }

    /// Returns the note name using sharps, e.g. "C4" or "F#3".
    pub fn name(&self) -> String {
        format!("{}{}", SHARP_NAMES[(self.0 % 12) as usize], self.octave())
    }
}

/// The seven-tone melody scale, C4 through B4, in walking order.
pub const MELODY_SCALE: [Pitch; 7] = [
    Pitch::C4,
    Pitch::D4,
    Pitch::E4,
    Pitch::F4,
    Pitch::G4,
    Pitch::A4,
    Pitch::B4,
];

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Pitch {
    type Err = SpecError;

    /// Parses names such as "C4", "A#3", "Bb5" or "C-1".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SpecError::InvalidNoteName(s.to_string());
        let mut chars = s.trim().chars().peekable();

        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        let mut semitone = SEMITONE_MAP
            .iter()
            .find(|(c, _)| *c == letter)
            .map(|(_, s)| *s)
            .ok_or_else(invalid)?;

        match chars.peek() {
            Some('#') => {
                chars.next();
                semitone += 1;
            }
            Some('b') => {
                chars.next();
                semitone -= 1;
            }
            _ => {}
        }

        let octave: i32 = chars.collect::<String>().parse().map_err(|_| invalid())?;
        let key = (octave + 1) * 12 + semitone;
        if !(0..=127).contains(&key) {
            return Err(invalid());
        }
        Ok(Pitch(key as u8))
    }
}

impl TryFrom<String> for Pitch {
    type Error = SpecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pitch> for String {
    fn from(pitch: Pitch) -> Self {
        pitch.name()
    }
}
