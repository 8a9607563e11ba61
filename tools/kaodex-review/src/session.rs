//! One human-in-the-loop review cycle.
//!
//! A session walks a record through `Prompt → Editing → Parsing →
//! Retrying → Accepted | Skipped`. The reviewer can skip at the prompt,
//! edit the review document in an external editor, or flag the record
//! for deletion inside the document. Malformed edits and vanished or
//! emptied documents reopen the editor instead of losing data; the
//! retry loops are bounded only by the reviewer.

use std::fs;
use std::io::{self, Write as _};
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

use kaodex_core::document;
use kaodex_core::record::KaomojiRecord;
use kaodex_core::taxonomy::TaxonomyPair;

/// Reviewer's answer to the pre-edit prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptReply {
    Edit,
    Skip,
}

/// Terminal state of a review session.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// The reviewer accepted the (possibly edited) record.
    Accepted(KaomojiRecord),
    /// The record was skipped or flagged for deletion; nothing persists.
    Skipped,
}

/// The interactive seam between the pipeline and the human reviewer.
///
/// The production implementation is [`EditorUi`]; tests drive sessions
/// with a scripted implementation instead.
pub trait ReviewUi {
    /// Shows the record preview and instructions, then reads one reply.
    fn prompt(&mut self, id: &str, content: &str) -> Result<PromptReply>;

    /// Hands `path` to the reviewer for in-place editing and blocks
    /// until they are done.
    fn edit(&mut self, path: &Path) -> Result<()>;

    /// Reports a reviewer-facing message.
    fn notify(&mut self, message: &str);
}

/// Longest content preview printed before the edit prompt.
const PREVIEW_LIMIT: usize = 10_000;

/// Stdin/stdout prompt plus an external editor process.
///
/// The editor contract is "process exits when the human is done editing
/// the file in place"; the wait has no timeout.
pub struct EditorUi {
    editor: String,
}

impl EditorUi {
    pub fn new(editor: impl Into<String>) -> Self {
        Self {
            editor: editor.into(),
        }
    }
}

impl ReviewUi for EditorUi {
    fn prompt(&mut self, id: &str, content: &str) -> Result<PromptReply> {
        println!("\nEditing kaomoji {id}");
        println!("Content preview:");
        println!("{}", "─".repeat(40));
        if content.chars().count() > PREVIEW_LIMIT {
            let preview: String = content.chars().take(PREVIEW_LIMIT).collect();
            println!("{preview}...");
        } else {
            println!("{content}");
        }
        println!("{}", "─".repeat(40));
        println!("Instructions:");
        println!("  - Edit fields as needed");
        println!("  - Set 'delete': true to skip this kaomoji");
        println!("  - Press 's' to skip without editing");
        println!("  - Save and exit to continue");
        print!("Press Enter to open in editor, or 's' to skip: ");
        io::stdout().flush()?;

        let mut reply = String::new();
        io::stdin()
            .read_line(&mut reply)
            .context("failed to read reviewer input")?;

        if reply.trim().eq_ignore_ascii_case("s") {
            Ok(PromptReply::Skip)
        } else {
            Ok(PromptReply::Edit)
        }
    }

    fn edit(&mut self, path: &Path) -> Result<()> {
        let status = Command::new(&self.editor)
            .arg(path)
            .status()
            .with_context(|| format!("failed to launch editor {:?}", self.editor))?;
        if !status.success() {
            debug!(editor = %self.editor, code = ?status.code(), "editor exited non-zero");
        }
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Runs one review session for `record`.
///
/// On acceptance, species/emotion terms the reviewer introduced are
/// appended to their taxonomies before the record is returned. The
/// temporary review document is private to this session and removed on
/// every exit path, including error propagation.
pub fn review(
    id: &str,
    record: &KaomojiRecord,
    taxonomies: &mut TaxonomyPair,
    ui: &mut dyn ReviewUi,
) -> Result<ReviewOutcome> {
    if ui.prompt(id, &record.content)? == PromptReply::Skip {
        ui.notify("Kaomoji skipped.");
        return Ok(ReviewOutcome::Skipped);
    }

    let rendered = document::render(id, record, taxonomies)?;
    let file = tempfile::Builder::new()
        .prefix("kaodex-")
        .suffix(".txt")
        .tempfile()
        .context("failed to create review document")?;
    fs::write(file.path(), &rendered).context("failed to write review document")?;

    loop {
        ui.edit(file.path())?;

        let edited = match fs::read_to_string(file.path()) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                ui.notify("ERROR: review document is empty, reopening...");
                fs::write(file.path(), &rendered)
                    .context("failed to restore review document")?;
                continue;
            }
            Err(_) => {
                ui.notify("ERROR: review document was deleted, recreating...");
                fs::write(file.path(), &rendered)
                    .context("failed to recreate review document")?;
                continue;
            }
        };
        let preview: String = edited.chars().take(500).collect();
        debug!(id, bytes = edited.len(), %preview, "read edited review document");

        let parsed = match document::parse(&edited) {
            Ok(parsed) => parsed,
            Err(err) => {
                ui.notify(&format!("Error parsing document: {err}"));
                ui.notify("Please fix the format and try again...");
                continue;
            }
        };

        if parsed.marked_for_deletion() {
            ui.notify("Kaomoji marked for deletion, skipping...");
            return Ok(ReviewOutcome::Skipped);
        }

        let reviewed = parsed.apply_to(record);
        let added = taxonomies.species.append(&reviewed.species)?;
        if !added.is_empty() {
            ui.notify(&format!(
                "Added new species to {}: {}",
                taxonomies.species.path().display(),
                added.join(", ")
            ));
        }
        let added = taxonomies.emotion.append(&reviewed.emotion)?;
        if !added.is_empty() {
            ui.notify(&format!(
                "Added new emotions to {}: {}",
                taxonomies.emotion.path().display(),
                added.join(", ")
            ));
        }

        ui.notify("Changes saved. Continue to next kaomoji...");
        return Ok(ReviewOutcome::Accepted(reviewed));
    }
}
