//! Scripted reviewer for session and pipeline tests.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::session::{PromptReply, ReviewUi};

/// One scripted editor invocation.
#[derive(Debug, Clone)]
pub enum EditScript {
    /// Leave the document untouched.
    Keep,
    /// Overwrite the whole document.
    Replace(String),
    /// Transform the current document text.
    Amend(fn(&str) -> String),
    /// Remove the document file.
    Delete,
}

/// Deterministic [`ReviewUi`]: replays queued prompt replies and edit
/// scripts, recording everything it was told. Exhausted queues default
/// to `Edit` / `Keep` so a test only scripts what it cares about.
pub struct ScriptedUi {
    replies: VecDeque<PromptReply>,
    edits: VecDeque<EditScript>,
    notices: Vec<String>,
    edit_count: usize,
}

impl ScriptedUi {
    pub fn new() -> Self {
        Self {
            replies: VecDeque::new(),
            edits: VecDeque::new(),
            notices: Vec::new(),
            edit_count: 0,
        }
    }

    pub fn reply(mut self, reply: PromptReply) -> Self {
        self.replies.push_back(reply);
        self
    }

    pub fn edit(mut self, script: EditScript) -> Self {
        self.edits.push_back(script);
        self
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn edit_count(&self) -> usize {
        self.edit_count
    }
}

impl ReviewUi for ScriptedUi {
    fn prompt(&mut self, _id: &str, _content: &str) -> Result<PromptReply> {
        Ok(self.replies.pop_front().unwrap_or(PromptReply::Edit))
    }

    fn edit(&mut self, path: &Path) -> Result<()> {
        self.edit_count += 1;
        match self.edits.pop_front().unwrap_or(EditScript::Keep) {
            EditScript::Keep => {}
            EditScript::Replace(text) => fs::write(path, text)?,
            EditScript::Amend(transform) => {
                let current = fs::read_to_string(path)?;
                fs::write(path, transform(&current))?;
            }
            EditScript::Delete => fs::remove_file(path)?,
        }
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
