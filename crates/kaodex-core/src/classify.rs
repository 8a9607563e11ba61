//! Codepoint-level kaomoji classification.
//!
//! Stateless heuristics over a fragment's codepoints: dot-art ratio,
//! emoji membership, line-break detection, and invisible-whitespace
//! normalization. Everything operates at the codepoint level; there is
//! no grapheme-cluster segmentation.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use regex::Regex;
use tracing::warn;

use crate::error::Result;
use crate::record::KaomojiRecord;

/// Placeholder substituted for invisible whitespace: U+2800 BRAILLE
/// PATTERN BLANK, visually empty but selectable and editable.
pub const PLACEHOLDER: char = '\u{2800}';

/// Dot-art ratio above which content counts as dot art.
const DOT_ART_THRESHOLD: f64 = 0.7;

/// Line and paragraph break codepoints: LF, CR, VT, FF, NEL,
/// LINE SEPARATOR, PARAGRAPH SEPARATOR.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\u{000B}', '\u{000C}', '\u{0085}', '\u{2028}', '\u{2029}',
];

/// The set of emoji scalar values used by [`Classifier::has_emoji`].
///
/// Normally parsed from a Unicode `emoji-data.txt`-style file; when that
/// is unavailable a fixed set of well-known emoji block ranges stands in.
#[derive(Debug, Clone)]
pub struct EmojiTable {
    points: HashSet<u32>,
}

impl EmojiTable {
    /// Parses the semicolon-delimited emoji-data format: the first field
    /// of each line is a whitespace-separated sequence of hex codepoints;
    /// blank lines and `#` comments are skipped, as are unparseable
    /// codepoints.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading from `reader` fails.
    pub fn from_reader(reader: impl BufRead) -> io::Result<Self> {
        let mut points = HashSet::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(field) = line.split(';').next() else {
                continue;
            };
            for codepoint in field.split_whitespace() {
                if let Ok(value) = u32::from_str_radix(codepoint, 16) {
                    points.insert(value);
                }
            }
        }
        Ok(Self { points })
    }

    /// The built-in fallback: well-known emoji block ranges.
    #[must_use]
    pub fn fallback() -> Self {
        const RANGES: &[(u32, u32)] = &[
            (0x1F600, 0x1F64F), // Emoticons
            (0x1F300, 0x1F5FF), // Miscellaneous symbols and pictographs
            (0x1F680, 0x1F6FF), // Transport and map symbols
            (0x1F1E6, 0x1F1FF), // Regional indicators
            (0x2600, 0x26FF),   // Miscellaneous symbols
            (0x2700, 0x27BF),   // Dingbats
            (0xFE00, 0xFE0F),   // Variation selectors
        ];
        let points = RANGES.iter().flat_map(|&(lo, hi)| lo..=hi).collect();
        Self { points }
    }

    /// Loads the table from `path`, falling back to the built-in ranges
    /// if the file is missing or unreadable. Never fatal; the miss is
    /// logged. Intended to be called once per process.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), %err, "emoji data not found, using fallback ranges");
                return Self::fallback();
            }
        };
        match Self::from_reader(BufReader::new(file)) {
            Ok(table) => table,
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read emoji data, using fallback ranges");
                Self::fallback()
            }
        }
    }

    /// Whether `c`'s scalar value is in the table.
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        self.points.contains(&(c as u32))
    }

    /// Number of scalar values in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Stateless content classifiers plus the process-lifetime emoji table.
pub struct Classifier {
    re_invisible: Regex,
    emoji: EmojiTable,
}

impl Classifier {
    /// Constructs a classifier holding `emoji` for its lifetime.
    ///
    /// # Errors
    ///
    /// Returns `KaodexError::Regex` if the invisible-whitespace pattern
    /// fails to compile (should never happen with the static pattern
    /// defined here).
    pub fn new(emoji: EmojiTable) -> Result<Self> {
        Ok(Self {
            re_invisible: Regex::new(
                "[\u{2000}-\u{200F}\u{2028}-\u{202F}\u{205F}\u{2060}\u{3000}\u{FEFF}]",
            )?,
            emoji,
        })
    }

    /// Replaces invisible and format whitespace (general punctuation
    /// spaces, line/paragraph separators, zero-width marks, ideographic
    /// space, BOM) with [`PLACEHOLDER`]. Ordinary spaces and line breaks
    /// pass through, preserving visual layout. Idempotent.
    #[must_use]
    pub fn normalize(&self, content: &str) -> String {
        self.re_invisible
            .replace_all(content, "\u{2800}")
            .into_owned()
    }

    /// Whether content is primarily dot art: more than 70% of its
    /// codepoints are whitespace or braille-pattern block members.
    /// Empty content is not dot art.
    #[must_use]
    pub fn is_dot_art(&self, content: &str) -> bool {
        if content.is_empty() {
            return false;
        }
        let total = content.chars().count();
        let dots = content
            .chars()
            .filter(|&c| c.is_whitespace() || matches!(c, '\u{2800}'..='\u{28FF}'))
            .count();
        dots as f64 / total as f64 > DOT_ART_THRESHOLD
    }

    /// Whether any codepoint is in the emoji table.
    #[must_use]
    pub fn has_emoji(&self, content: &str) -> bool {
        content.chars().any(|c| self.emoji.contains(c))
    }

    /// Whether content contains a line or paragraph break.
    #[must_use]
    pub fn is_multiline(&self, content: &str) -> bool {
        content.chars().any(|c| LINE_BREAKS.contains(&c))
    }

    /// Recomputes the three content flags from the raw content, then
    /// normalizes the content in place. Safe to re-run on records that
    /// already carry flags.
    pub fn classify(&self, record: &mut KaomojiRecord) {
        record.dot_art = self.is_dot_art(&record.content);
        record.has_emoji = self.has_emoji(&record.content);
        record.multi_line = self.is_multiline(&record.content);
        record.content = self.normalize(&record.content);
    }
}
