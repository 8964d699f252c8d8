//! Cell edit state machine.
//!
//! `idle → editing → (commit | cancel) → idle`. At most one cell is edited
//! at a time: beginning a new edit commits the active one first. Committed
//! text goes to the document store, which owns type coercion; store errors
//! are logged and otherwise ignored.

use serde::Serialize;
use tracing::{debug, warn};

use crate::path::Path;
use crate::store::DocumentStore;
use crate::types::CellCoord;

/// Where the edit buffer comes from and where the caret starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditSeed {
    /// Displayed value, all text selected (Enter key)
    Current,
    /// Typed text replaces the value, caret at end (printable key)
    Overwrite(String),
    /// Displayed value, caret at end (double click)
    Append,
}

/// Caret placement in the edit box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Caret {
    SelectAll,
    End,
}

/// What ended an edit with a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTrigger {
    /// Enter: commit and advance one row
    Enter,
    /// Focus left the editor
    Blur,
}

/// The cell being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    pub cell: CellCoord,
    pub path: Path,
    /// Displayed value when the edit began
    pub original: String,
    pub buffer: String,
    pub caret: Caret,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing(EditSession),
}

/// Result of a commit, for the caller to move the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub path: Path,
    /// Whether the buffer was sent to the store
    pub written: bool,
    /// Next cell in the same column after an Enter commit, if one exists
    pub advance_to: Option<CellCoord>,
}

#[derive(Debug, Clone, Default)]
pub struct CellEditor {
    state: EditState,
}

impl CellEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn session(&self) -> Option<&EditSession> {
        match &self.state {
            EditState::Editing(session) => Some(session),
            EditState::Idle => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    /// Begin editing `cell`. An edit already in progress is committed first;
    /// its outcome is returned.
    pub fn begin<S: DocumentStore + ?Sized>(
        &mut self,
        store: &mut S,
        cell: CellCoord,
        path: Path,
        displayed: String,
        seed: EditSeed,
    ) -> Option<CommitOutcome> {
        let previous = self.commit(store, CommitTrigger::Blur, 0);

        let (buffer, caret) = match seed {
            EditSeed::Current => (displayed.clone(), Caret::SelectAll),
            EditSeed::Overwrite(text) => (text, Caret::End),
            EditSeed::Append => (displayed.clone(), Caret::End),
        };
        debug!(path = %path, row = cell.row, col = cell.col, "edit started");
        self.state = EditState::Editing(EditSession {
            cell,
            path,
            original: displayed,
            buffer,
            caret,
        });
        previous
    }

    /// Replace the edit buffer (the host mirrors its input box here).
    pub fn set_buffer(&mut self, text: &str) -> bool {
        match &mut self.state {
            EditState::Editing(session) => {
                text.clone_into(&mut session.buffer);
                true
            }
            EditState::Idle => false,
        }
    }

    /// Commit the active edit to `store`.
    ///
    /// An unchanged buffer is not written. On `Enter` the outcome names the
    /// next row's cell in the same column when `row_count` has one.
    pub fn commit<S: DocumentStore + ?Sized>(
        &mut self,
        store: &mut S,
        trigger: CommitTrigger,
        row_count: usize,
    ) -> Option<CommitOutcome> {
        let EditState::Editing(session) = std::mem::take(&mut self.state) else {
            return None;
        };

        let written = session.buffer != session.original;
        if written {
            match store.update_value(&session.path.to_string(), &session.buffer) {
                Ok(()) => debug!(path = %session.path, "edit committed"),
                Err(e) => warn!(path = %session.path, error = %e, "edit commit rejected by store"),
            }
        }

        let next_row = session.cell.row + 1;
        let advance_to = (trigger == CommitTrigger::Enter && next_row < row_count)
            .then(|| CellCoord::new(next_row, session.cell.col));

        Some(CommitOutcome {
            path: session.path,
            written,
            advance_to,
        })
    }

    /// Discard the active edit. The document is untouched.
    pub fn cancel(&mut self) -> Option<EditSession> {
        match std::mem::take(&mut self.state) {
            EditState::Editing(session) => {
                debug!(path = %session.path, "edit cancelled");
                Some(session)
            }
            EditState::Idle => None,
        }
    }
}

/// New key name for a header rename, if it should be applied: trimmed,
/// non-empty and different from `old_key`.
pub fn rename_target(old_key: &str, new_key: &str) -> Option<String> {
    let trimmed = new_key.trim();
    (!trimmed.is_empty() && trimmed != old_key).then(|| trimmed.to_string())
}
