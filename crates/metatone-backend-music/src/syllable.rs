//! Syllable splitting for English lyric lines.
//!
//! Words are split at hyphenation points found by the Knuth-Liang patterns
//! embedded in the `hyphenation` crate. Every unit is a slice of the original
//! word, so the units of a word always concatenate back to the word,
//! punctuation and capitalization included.

use hyphenation::{Hyphenator, Language, Load, Standard};
use tracing::debug;

use crate::error::{MusicError, MusicResult};

/// Splits lyric lines into syllable units.
pub struct Syllabifier {
    dictionary: Standard,
}

impl std::fmt::Debug for Syllabifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Syllabifier")
            .field("language", &"en-US")
            .finish_non_exhaustive()
    }
}

impl Syllabifier {
    /// Loads the embedded US English dictionary.
    pub fn english() -> MusicResult<Self> {
        let dictionary = Standard::from_embedded(Language::EnglishUS)
            .map_err(|e| MusicError::DictionaryUnavailable(e.to_string()))?;
        Ok(Self { dictionary })
    }

    /// Splits one word into syllable units.
    ///
    /// A word without hyphenation points yields itself as the only unit.
    pub fn split_word<'w>(&self, word: &'w str) -> Vec<&'w str> {
        let hyphenated = self.dictionary.hyphenate(word);
        let mut units = Vec::with_capacity(hyphenated.breaks.len() + 1);
        let mut start = 0;

        for &at in &hyphenated.breaks {
            if at > start && at < word.len() && word.is_char_boundary(at) {
                units.push(&word[start..at]);
                start = at;
            }
        }
        units.push(&word[start..]);
        units
    }

    /// Splits a line into the syllable units of all its words, in order.
    ///
    /// Whitespace-only input yields no units.
    pub fn split_line<'l>(&self, line: &'l str) -> Vec<&'l str> {
        let mut units = Vec::new();
        for word in line.split_whitespace() {
            let split = self.split_word(word);
            debug!(word, units = ?split, "split word");
            units.extend(split);
        }
        units
    }
}
