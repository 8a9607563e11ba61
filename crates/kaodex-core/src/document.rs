//! Review-document rendering and parsing.
//!
//! A review document is the plain-text projection of a record that a
//! human edits in their editor of choice: a comment preamble, the raw
//! content, three JSON list sections, a JSON metadata object, and a
//! trailing reference listing of the known taxonomy terms.
//!
//! Parsing must survive a human having edited the text freely. The
//! contract is an ordered-section grammar: each header is located by its
//! first occurrence, and a section runs to the start of the next header
//! that is present — in the fixed section order — or to the end of the
//! document. `CONTENT` is the exception: it is free text and ends
//! specifically at `SPECIES:`, never at a header found inside itself by
//! a generic scan. A JSON section that is present but malformed is a
//! recoverable error; the review session reopens the editor.

use serde::Deserialize;

use crate::error::{KaodexError, Result};
use crate::record::KaomojiRecord;
use crate::taxonomy::TaxonomyPair;

const CONTENT_HEADER: &str = "CONTENT:";
const SPECIES_HEADER: &str = "SPECIES:";
const EMOTION_HEADER: &str = "EMOTION:";
const MISC_HEADER: &str = "MISC:";
const METADATA_HEADER: &str = "METADATA:";

/// First line of the trailing reference listing; terminates METADATA.
const REFERENCE_MARKER: &str = "# Available species";

/// How much of a malformed section to echo back to the reviewer.
const ERROR_PREVIEW_LIMIT: usize = 120;

/// Metadata overrides recognized from an edited document. Keys the
/// reviewer removed stay `None` and leave the base record untouched;
/// unrecognized keys are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, rename = "dotArt")]
    pub dot_art: Option<bool>,
    #[serde(default, rename = "hasEmoji")]
    pub has_emoji: Option<bool>,
    #[serde(default, rename = "multiLine")]
    pub multi_line: Option<bool>,
    #[serde(default)]
    pub delete: Option<bool>,
}

/// The structured result of parsing an edited review document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDocument {
    pub content: String,
    pub species: Vec<String>,
    pub emotion: Vec<String>,
    pub misc: Vec<String>,
    pub metadata: DocumentMetadata,
}

impl ReviewDocument {
    /// Merges the edited document over `base`: content and label lists
    /// replace, metadata flags override only where the reviewer kept
    /// them. The transient `delete` flag is not part of the record.
    #[must_use]
    pub fn apply_to(&self, base: &KaomojiRecord) -> KaomojiRecord {
        let mut record = base.clone();
        record.content = self.content.clone();
        record.species = self.species.clone();
        record.emotion = self.emotion.clone();
        record.misc = self.misc.clone();
        if let Some(dot_art) = self.metadata.dot_art {
            record.dot_art = dot_art;
        }
        if let Some(has_emoji) = self.metadata.has_emoji {
            record.has_emoji = has_emoji;
        }
        if let Some(multi_line) = self.metadata.multi_line {
            record.multi_line = multi_line;
        }
        record
    }

    /// Whether the reviewer flagged the record for deletion.
    #[must_use]
    pub fn marked_for_deletion(&self) -> bool {
        self.metadata.delete == Some(true)
    }
}

/// Renders the review document for one record.
///
/// # Errors
///
/// Returns `KaodexError::Json` if a section fails to encode (does not
/// happen for well-formed records).
pub fn render(id: &str, record: &KaomojiRecord, taxonomies: &TaxonomyPair) -> Result<String> {
    let mut doc = String::new();

    doc.push_str(&format!("# Kaomoji ID: {id}\n"));
    doc.push_str("# Edit the content below, then save and exit\n");
    doc.push_str("# Set 'delete': true to skip this kaomoji\n");
    doc.push_str("# Lines starting with # are comments\n\n");

    doc.push_str(CONTENT_HEADER);
    doc.push('\n');
    doc.push_str(&record.content);
    doc.push_str("\n\n");

    doc.push_str(SPECIES_HEADER);
    doc.push('\n');
    doc.push_str(&serde_json::to_string(&record.species)?);
    doc.push_str("\n\n");

    doc.push_str(EMOTION_HEADER);
    doc.push('\n');
    doc.push_str(&serde_json::to_string(&record.emotion)?);
    doc.push_str("\n\n");

    doc.push_str(MISC_HEADER);
    doc.push('\n');
    doc.push_str(&serde_json::to_string(&record.misc)?);
    doc.push_str("\n\n");

    doc.push_str(METADATA_HEADER);
    doc.push('\n');
    let metadata = serde_json::json!({
        "dotArt": record.dot_art,
        "hasEmoji": record.has_emoji,
        "multiLine": record.multi_line,
        "delete": false,
    });
    doc.push_str(&serde_json::to_string_pretty(&metadata)?);

    doc.push_str("\n\n# Available species (for reference):\n");
    doc.push_str(&format!(
        "# {}\n",
        taxonomies.species.sorted_terms().join(", ")
    ));
    doc.push_str("\n# Available emotions (for reference):\n");
    doc.push_str(&format!(
        "# {}\n",
        taxonomies.emotion.sorted_terms().join(", ")
    ));

    Ok(doc)
}

/// Parses a (possibly edited) review document.
///
/// Missing list sections yield empty lists and a missing metadata
/// section yields no overrides, so partial deletions degrade instead of
/// failing.
///
/// # Errors
///
/// Returns `KaodexError::DocumentSection` when a present JSON section
/// does not decode — a recoverable condition handled by the review
/// session's retry loop.
pub fn parse(text: &str) -> Result<ReviewDocument> {
    let content_start = text.find(CONTENT_HEADER);
    let species_start = text.find(SPECIES_HEADER);
    let emotion_start = text.find(EMOTION_HEADER);
    let misc_start = text.find(MISC_HEADER);
    let metadata_start = text.find(METADATA_HEADER);
    let eof = text.len();

    // CONTENT is free text: it ends at SPECIES: specifically.
    let content = match (content_start, species_start) {
        (Some(start), Some(end)) if start < end => {
            text[start + CONTENT_HEADER.len()..end].trim().to_string()
        }
        _ => String::new(),
    };

    // Later sections end at the next header that is present, in order.
    let species_end = emotion_start.or(misc_start).or(metadata_start).unwrap_or(eof);
    let emotion_end = misc_start.or(metadata_start).unwrap_or(eof);
    let misc_end = metadata_start.unwrap_or(eof);
    let metadata_end = text.find(REFERENCE_MARKER).unwrap_or(eof);

    let species = parse_list(
        "SPECIES",
        section(text, species_start, SPECIES_HEADER, species_end),
    )?;
    let emotion = parse_list(
        "EMOTION",
        section(text, emotion_start, EMOTION_HEADER, emotion_end),
    )?;
    let misc = parse_list("MISC", section(text, misc_start, MISC_HEADER, misc_end))?;
    let metadata = parse_metadata(section(
        text,
        metadata_start,
        METADATA_HEADER,
        metadata_end,
    ))?;

    Ok(ReviewDocument {
        content,
        species,
        emotion,
        misc,
        metadata,
    })
}

/// Extracts a section body: the text between the header (if present)
/// and `end`, trimmed. A header at or past `end` counts as absent.
fn section<'a>(text: &'a str, start: Option<usize>, header: &str, end: usize) -> Option<&'a str> {
    let start = start?;
    if start >= end {
        return None;
    }
    let body = (start + header.len()).min(end);
    Some(text[body..end].trim())
}

fn parse_list(name: &'static str, raw: Option<&str>) -> Result<Vec<String>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    serde_json::from_str(raw).map_err(|source| KaodexError::DocumentSection {
        section: name,
        preview: preview_of(raw),
        source,
    })
}

fn parse_metadata(raw: Option<&str>) -> Result<DocumentMetadata> {
    let Some(raw) = raw else {
        return Ok(DocumentMetadata::default());
    };
    serde_json::from_str(raw).map_err(|source| KaodexError::DocumentSection {
        section: "METADATA",
        preview: preview_of(raw),
        source,
    })
}

fn preview_of(raw: &str) -> String {
    if raw.chars().count() > ERROR_PREVIEW_LIMIT {
        let truncated: String = raw.chars().take(ERROR_PREVIEW_LIMIT).collect();
        format!("{truncated}...")
    } else {
        raw.to_string()
    }
}
