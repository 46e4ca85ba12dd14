//! Assembles per-line melodies into one score.

use metatone_spec::{LyricText, Score, DEFAULT_PROGRAM};
use tracing::{debug, trace};

use crate::error::{MusicError, MusicResult};
use crate::melody::melody_for_line;
use crate::syllable::Syllabifier;

/// Builds scores from lyric text.
///
/// Notes follow the lyrics left to right, line by line, syllable by
/// syllable. The pitch walk restarts at C4 on every line.
#[derive(Debug)]
pub struct ScoreBuilder {
    syllabifier: Syllabifier,
    program: u8,
}

impl ScoreBuilder {
    /// Creates a builder with the English syllabifier and the default program.
    pub fn new() -> MusicResult<Self> {
        Ok(Self {
            syllabifier: Syllabifier::english()?,
            program: DEFAULT_PROGRAM,
        })
    }

    /// Sets the General MIDI program attached to built scores.
    pub fn program(mut self, program: u8) -> MusicResult<Self> {
        if program > 127 {
            return Err(MusicError::InvalidProgram(program));
        }
        self.program = program;
        Ok(self)
    }

    /// Returns the syllabifier used by this builder.
    pub fn syllabifier(&self) -> &Syllabifier {
        &self.syllabifier
    }

    /// Builds a score from lyric text.
    ///
    /// Empty lyrics produce an empty, silent score.
    pub fn build(&self, lyrics: &LyricText) -> Score {
        let mut score = Score::new(self.program);
        for (line_no, line) in lyrics.lines().iter().enumerate() {
            let notes = melody_for_line(&self.syllabifier, line);
            debug!(line = line_no, notes = notes.len(), "mapped lyric line");
            for note in &notes {
                trace!(pitch = %note.pitch, lyric = %note.lyric, "note");
            }
            score.notes.extend(notes);
        }
        score
    }

    /// Builds a score from raw text, dropping blank lines first.
    pub fn build_text(&self, text: &str) -> Score {
        self.build(&LyricText::parse(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metatone_spec::Pitch;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_lyrics_give_empty_score() {
        let builder = ScoreBuilder::new().unwrap();
        let score = builder.build(&LyricText::default());
        assert!(score.is_empty());
        assert_eq!(score.program, 53);
    }

    #[test]
    fn test_blank_lines_contribute_nothing() {
        let builder = ScoreBuilder::new().unwrap();
        let with_blanks = builder.build_text("\n\nsky\n   \nblue\n\n");
        let without = builder.build_text("sky\nblue");
        assert_eq!(with_blanks, without);
        assert_eq!(with_blanks.lyrics().collect::<Vec<_>>(), vec!["sky", "blue"]);
    }

    #[test]
    fn test_pitch_walk_restarts_per_line() {
        let builder = ScoreBuilder::new().unwrap();
        let score = builder.build_text("sky blue\nred");
        assert_eq!(
            score.triples(),
            vec![
                (Pitch::C4, 1.0, "sky"),
                (Pitch::D4, 1.0, "blue"),
                (Pitch::C4, 1.0, "red"),
            ]
        );
    }

    #[test]
    fn test_note_count_is_sum_of_line_units() {
        let builder = ScoreBuilder::new().unwrap();
        let lyrics = LyricText::parse("Whispers of the morning\nDancing in the wonderful rain");
        let expected: usize = lyrics
            .lines()
            .iter()
            .map(|l| builder.syllabifier().split_line(l).len())
            .sum();
        assert_eq!(builder.build(&lyrics).len(), expected);
    }

    #[test]
    fn test_program_override() {
        let builder = ScoreBuilder::new().unwrap().program(52).unwrap();
        assert_eq!(builder.build_text("la").program, 52);
        assert!(matches!(
            ScoreBuilder::new().unwrap().program(128),
            Err(MusicError::InvalidProgram(128))
        ));
    }
}
