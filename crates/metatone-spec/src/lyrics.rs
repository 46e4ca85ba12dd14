//! Lyric text, generated songs and the per-user session.

use serde::{Deserialize, Serialize};

/// Ordered, non-empty lyric lines.
///
/// Blank and whitespace-only lines are dropped on construction, so every
/// stored line contains at least one word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LyricText {
    lines: Vec<String>,
}

impl LyricText {
    /// Builds lyric text from raw text, one line per newline.
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// Builds lyric text from individual lines, dropping blank ones.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self { lines }
    }

    /// Returns the lines in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns true when no non-blank line exists.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Iterates over the whitespace-separated words of every line.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().flat_map(|l| l.split_whitespace())
    }
}

impl From<String> for LyricText {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<LyricText> for String {
    fn from(lyrics: LyricText) -> Self {
        lyrics.lines.join("\n")
    }
}

impl std::fmt::Display for LyricText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Strips surrounding whitespace and double quotes from model output.
pub fn trim_generated(text: &str) -> &str {
    text.trim().trim_matches('"')
}

/// Normalizes generated lyrics for display.
///
/// Drops blank lines, trims each line and upper-cases its first character.
/// Lines are separated by a blank line, as the lyric view shows them.
pub fn format_lyrics(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn capitalize_first(line: &str) -> String {
    let mut chars = line.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A generated title and its lyrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Song title.
    pub title: String,
    /// Song lyrics.
    pub lyrics: LyricText,
}

impl Song {
    /// Creates a song.
    pub fn new(title: impl Into<String>, lyrics: LyricText) -> Self {
        Self {
            title: title.into(),
            lyrics,
        }
    }
}

/// The state of one user session.
///
/// Holds at most one song; recording a new song replaces the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    current: Option<Song>,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly generated song, returning the one it replaced.
    pub fn record(&mut self, song: Song) -> Option<Song> {
        self.current.replace(song)
    }

    /// The current song, if any.
    pub fn song(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    /// Lyrics of the current song, if any.
    pub fn lyrics(&self) -> Option<&LyricText> {
        self.current.as_ref().map(|s| &s.lyrics)
    }

    /// Title of the current song, if any.
    pub fn title(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.title.as_str())
    }

    /// Forgets the current song.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
