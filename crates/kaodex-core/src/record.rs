//! The kaomoji record model and its on-disk corpus encoding.
//!
//! Corpus files are JSON objects keyed by record id (a content hash or
//! source-assigned key), each value a record in the wire format below.
//! `serde_json`'s `preserve_order` feature keeps iteration in stored
//! order, which the batch pipeline relies on.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KaodexError, Result};

/// A single curated kaomoji entry.
///
/// Field names follow the corpus wire format (`dotArt`, `hasEmoji`,
/// `multiLine`). Every field is defaulted so unreviewed records that
/// have not been classified yet still deserialize; the classifiers are
/// pure functions of `content`, so recomputing the flags is safe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KaomojiRecord {
    /// The art itself.
    #[serde(default)]
    pub content: String,

    /// Species taxonomy terms (e.g. "cat", "wolf").
    #[serde(default)]
    pub species: Vec<String>,

    /// Emotion taxonomy terms (e.g. "happy", "angry").
    #[serde(default)]
    pub emotion: Vec<String>,

    /// Unclassified free-form labels. Terms promoted to `species` or
    /// `emotion` stay here too; the duplication is part of the format.
    #[serde(default)]
    pub misc: Vec<String>,

    /// Content is dominated by braille-pattern codepoints.
    #[serde(default, rename = "dotArt")]
    pub dot_art: bool,

    /// Content contains at least one emoji codepoint.
    #[serde(default, rename = "hasEmoji")]
    pub has_emoji: bool,

    /// Content spans more than one line.
    #[serde(default, rename = "multiLine")]
    pub multi_line: bool,
}

impl KaomojiRecord {
    /// Creates a record holding `content` with no labels or flags set.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// An id-keyed corpus collection, in stored order.
pub type RecordMap = serde_json::Map<String, serde_json::Value>;

/// Reads an id-keyed corpus file.
///
/// # Errors
///
/// Returns `KaodexError::Io` if the file cannot be read and
/// `KaodexError::Corpus` if its top level is not a JSON object.
/// Both are fatal to the pipeline, which cannot proceed without a
/// readable source.
pub fn read_record_map(path: &Path) -> Result<RecordMap> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| KaodexError::Corpus {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes an id-keyed corpus file, pretty-printed with non-ASCII
/// content preserved literally.
pub fn write_record_map(path: &Path, records: &RecordMap) -> Result<()> {
    let text = serde_json::to_string_pretty(records)?;
    fs::write(path, text)?;
    Ok(())
}

/// Decodes one record value out of a corpus map.
///
/// # Errors
///
/// Returns `KaodexError::Corpus` if the value is not record-shaped.
pub fn decode_record(path: &Path, value: &serde_json::Value) -> Result<KaomojiRecord> {
    serde_json::from_value(value.clone()).map_err(|source| KaodexError::Corpus {
        path: path.to_path_buf(),
        source,
    })
}
