//! Pointer, keyboard and edit handlers for `GridEngine`.
//!
//! Coordinates are in CSS pixels relative to the grid's top-left corner:
//! header rows on top, the row-index column on the left, the row area
//! scrolled by the viewport offset.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::GridEngine;
use crate::editor::{CommitOutcome, CommitTrigger, EditSeed};
use crate::grid::display_text;
use crate::selection::Direction;
use crate::store::DocumentStore;
use crate::types::{HitTarget, Selection};

/// A key press as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyInput {
    /// DOM `KeyboardEvent.key` value
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// A single character typed without a command modifier.
    pub fn is_printable(&self) -> bool {
        self.key.chars().count() == 1 && !self.ctrl && !self.alt && !self.meta
    }

    fn is_copy(&self) -> bool {
        (self.ctrl || self.meta) && self.key.eq_ignore_ascii_case("c")
    }

    fn direction(&self) -> Option<Direction> {
        match self.key.as_str() {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// What a key press did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum KeyOutcome {
    /// Not handled; the host keeps its default behavior
    Ignored,
    /// Selection focus moved
    Moved { row: usize, col: usize },
    EditStarted,
    EditCommitted,
    EditCancelled,
    /// Selection copied as TSV
    Copied { text: String },
}

impl<S: DocumentStore> GridEngine<S> {
    /// What lies under `(x, y)` in the last rendered frame.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<HitTarget> {
        if x < 0.0 || y < 0.0 || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let levels = self.geometry.header_rows.len().max(1);
        let level_height = self.config.header_height;
        let header_height = level_height * levels as f32;
        let index_width = self.config.index_column_width;

        if y < header_height {
            if x < index_width {
                return Some(HitTarget::Corner);
            }
            let col = self.column_at(x - index_width)?;
            let level = (0..levels).find(|l| y < level_height * (l + 1) as f32)?;
            return self
                .geometry
                .header_rows
                .iter()
                .flatten()
                .find(|cell| {
                    cell.depth <= level
                        && level < cell.depth + cell.row_span
                        && (cell.col..cell.col + cell.col_span).contains(&col)
                })
                .map(|cell| HitTarget::Header {
                    col: cell.col,
                    span: cell.col_span,
                    path: cell.path.clone(),
                    name: cell.name.clone(),
                });
        }

        let rows = &self.render_state.row_heights;
        let content_y = y - header_height + self.viewport.scroll_offset;
        if content_y >= rows.total_height() {
            return None;
        }
        let row = rows.row_at_offset(content_y)?;
        if x < index_width {
            return Some(HitTarget::RowIndex { row });
        }
        let col = self.column_at(x - index_width)?;
        Some(HitTarget::Cell { row, col })
    }

    fn column_at(&self, x: f32) -> Option<usize> {
        let mut right = 0.0_f32;
        self.geometry.column_widths.iter().position(|&w| {
            right += w;
            x < right
        })
    }

    /// Pointer pressed on `target`. An active edit is committed first.
    pub fn pointer_down(&mut self, target: &HitTarget, extend: bool) -> bool {
        if self.editor.is_editing() {
            self.commit_edit();
        }
        self.refresh();
        let changed = self.selection.pointer_down(
            target,
            extend,
            self.shape.row_count,
            self.shape.col_count(),
        );
        if changed {
            self.needs_render = true;
            self.emit_selection_change();
        }
        changed
    }

    pub fn pointer_move(&mut self, target: &HitTarget) -> bool {
        let changed =
            self.selection
                .pointer_move(target, self.shape.row_count, self.shape.col_count());
        if changed {
            self.needs_render = true;
            self.emit_selection_change();
        }
        changed
    }

    pub fn pointer_up(&mut self) {
        self.selection.pointer_up();
    }

    /// Double click on a cell selects it and starts an append edit.
    pub fn double_click(&mut self, target: &HitTarget) -> bool {
        if !matches!(target, HitTarget::Cell { .. }) {
            return false;
        }
        self.pointer_down(target, false);
        self.pointer_up();
        self.begin_edit(EditSeed::Append)
    }

    /// Keyboard handling for the grid (not for the edit box's own text).
    pub fn key_down(&mut self, input: &KeyInput) -> KeyOutcome {
        if self.editor.is_editing() {
            return match input.key.as_str() {
                "Enter" => {
                    self.commit_edit_with(CommitTrigger::Enter);
                    KeyOutcome::EditCommitted
                }
                "Escape" => {
                    self.cancel_edit();
                    KeyOutcome::EditCancelled
                }
                _ => KeyOutcome::Ignored,
            };
        }

        self.refresh();
        if self.selection.selection().is_none() {
            return KeyOutcome::Ignored;
        }
        if input.is_copy() {
            return self
                .copy_selection()
                .map_or(KeyOutcome::Ignored, |text| KeyOutcome::Copied { text });
        }
        if input.key == "Enter" {
            return self.edit_outcome(EditSeed::Current);
        }
        if input.is_printable() {
            return self.edit_outcome(EditSeed::Overwrite(input.key.clone()));
        }
        let Some(direction) = input.direction() else {
            return KeyOutcome::Ignored;
        };

        let Some(focus) = self.selection.move_focus(
            direction,
            input.shift,
            self.shape.row_count,
            self.shape.col_count(),
        ) else {
            return KeyOutcome::Ignored;
        };
        self.scroll_row_into_view(focus.row);
        self.needs_render = true;
        self.emit_selection_change();
        KeyOutcome::Moved {
            row: focus.row,
            col: focus.col,
        }
    }

    fn edit_outcome(&mut self, seed: EditSeed) -> KeyOutcome {
        if self.begin_edit(seed) {
            KeyOutcome::EditStarted
        } else {
            KeyOutcome::Ignored
        }
    }

    /// Start editing the anchor cell.
    pub fn begin_edit(&mut self, seed: EditSeed) -> bool {
        self.refresh();
        let Some(anchor) = self.selection.selection().map(Selection::anchor) else {
            return false;
        };
        let Some(path) = self.shape.cell_path(anchor.row, anchor.col) else {
            return false;
        };
        let displayed = display_text(self.store.value_by_path(&path, None));
        self.editor
            .begin(&mut self.store, anchor, path, displayed, seed);
        self.needs_render = true;
        true
    }

    /// Mirror the host's edit box text.
    pub fn set_edit_buffer(&mut self, text: &str) -> bool {
        self.editor.set_buffer(text)
    }

    /// Commit the active edit as on loss of focus.
    pub fn commit_edit(&mut self) -> Option<CommitOutcome> {
        self.commit_edit_with(CommitTrigger::Blur)
    }

    /// Commit the active edit. An `Enter` commit moves the selection one row
    /// down when there is a next row.
    pub fn commit_edit_with(&mut self, trigger: CommitTrigger) -> Option<CommitOutcome> {
        let outcome = self
            .editor
            .commit(&mut self.store, trigger, self.shape.row_count)?;
        self.needs_render = true;
        self.refresh();
        if let Some(next) = outcome.advance_to {
            debug!(row = next.row, col = next.col, "advancing after commit");
            self.selection.set(Some(Selection::cell(next.row, next.col)));
            self.selection
                .clamp(self.shape.row_count, self.shape.col_count());
            self.scroll_row_into_view(next.row);
            self.emit_selection_change();
        }
        Some(outcome)
    }

    /// Discard the active edit; the next render shows the unmodified value.
    pub fn cancel_edit(&mut self) -> bool {
        let cancelled = self.editor.cancel().is_some();
        if cancelled {
            self.needs_render = true;
        }
        cancelled
    }
}
