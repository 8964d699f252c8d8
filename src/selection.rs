//! Range selection state machine.
//!
//! Pointer-down on a cell, row index or header sets a new anchor and enters
//! dragging; moves while dragging update the focus; pointer-up returns to
//! idle. With the range-extend modifier, pointer-down moves only the focus.
//! Stored anchor/focus keep the drag direction; consumers read the
//! normalized rectangle through [`Selection::bounds`].

use serde::{Deserialize, Serialize};

use crate::grid::{GridRenderState, GridShape};
use crate::path::Path;
use crate::types::{CellCoord, HeaderSelection, HitTarget, Selection, SelectionBounds};

/// Pointer phase of the selection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    Dragging,
}

/// Arrow-key direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selection: Option<Selection>,
    pointer: PointerState,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn bounds(&self) -> Option<SelectionBounds> {
        self.selection.as_ref().map(Selection::bounds)
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer == PointerState::Dragging
    }

    pub fn set(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn clear(&mut self) {
        self.selection = None;
        self.pointer = PointerState::Idle;
    }

    /// Handle pointer-down on `target` in a grid of `rows x cols`.
    /// Returns `true` when the selection changed.
    pub fn pointer_down(&mut self, target: &HitTarget, extend: bool, rows: usize, cols: usize) -> bool {
        if rows == 0 || cols == 0 {
            let had = self.selection.is_some();
            self.clear();
            return had;
        }
        let before = self.selection.clone();

        if let (true, Some(current)) = (extend, self.selection.as_ref()) {
            if let Some(focus) = focus_for(target, rows, cols) {
                // The anchor stays put; a header target turns the range into a
                // key selection.
                let extended = match target {
                    HitTarget::Header { path, name, .. } => Selection::Header {
                        anchor: current.anchor(),
                        focus,
                        header: HeaderSelection {
                            path: path.clone(),
                            name: name.clone(),
                        },
                    },
                    _ => current.with_focus(focus),
                };
                self.selection = Some(extended);
                return self.selection != before;
            }
        }

        let last_row = rows - 1;
        let last_col = cols - 1;
        let (selection, pointer) = match target {
            HitTarget::Cell { row, col } => {
                let at = CellCoord::new((*row).min(last_row), (*col).min(last_col));
                (
                    Selection::Cells {
                        anchor: at,
                        focus: at,
                    },
                    PointerState::Dragging,
                )
            }
            HitTarget::RowIndex { row } => {
                let row = (*row).min(last_row);
                (
                    Selection::Cells {
                        anchor: CellCoord::new(row, 0),
                        focus: CellCoord::new(row, last_col),
                    },
                    PointerState::Dragging,
                )
            }
            HitTarget::Header {
                col,
                span,
                path,
                name,
            } => {
                let first = (*col).min(last_col);
                let last = (first + span.saturating_sub(1)).min(last_col);
                (
                    Selection::Header {
                        anchor: CellCoord::new(0, first),
                        focus: CellCoord::new(last_row, last),
                        header: HeaderSelection {
                            path: path.clone(),
                            name: name.clone(),
                        },
                    },
                    PointerState::Dragging,
                )
            }
            HitTarget::Corner => (
                Selection::Cells {
                    anchor: CellCoord::new(0, 0),
                    focus: CellCoord::new(last_row, last_col),
                },
                PointerState::Idle,
            ),
        };
        self.selection = Some(selection);
        self.pointer = pointer;
        self.selection != before
    }

    /// Handle pointer movement; only updates the focus while dragging.
    pub fn pointer_move(&mut self, target: &HitTarget, rows: usize, cols: usize) -> bool {
        if !self.is_dragging() {
            return false;
        }
        let Some(focus) = focus_for(target, rows, cols) else {
            return false;
        };
        match &self.selection {
            Some(current) if current.focus() != focus => {
                self.selection = Some(current.with_focus(focus));
                true
            }
            _ => false,
        }
    }

    pub fn pointer_up(&mut self) {
        self.pointer = PointerState::Idle;
    }

    /// Arrow-key navigation from the focus, clamped to the grid.
    ///
    /// With `extend` only the focus moves; otherwise anchor and focus move
    /// together and a header selection becomes a cell selection.
    pub fn move_focus(
        &mut self,
        direction: Direction,
        extend: bool,
        rows: usize,
        cols: usize,
    ) -> Option<CellCoord> {
        let current = self.selection.as_ref()?;
        let from = current.focus();
        let (d_row, d_col): (isize, isize) = match direction {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        };
        let to = CellCoord::new(
            from.row.saturating_add_signed(d_row),
            from.col.saturating_add_signed(d_col),
        )
        .clamped(rows, cols)?;

        self.selection = Some(if extend {
            current.with_focus(to)
        } else {
            Selection::Cells {
                anchor: to,
                focus: to,
            }
        });
        Some(to)
    }

    /// Re-clamp to the current grid. An empty grid clears the selection.
    pub fn clamp(&mut self, rows: usize, cols: usize) {
        self.selection = self
            .selection
            .as_ref()
            .and_then(|s| s.clamped(rows, cols));
        if self.selection.is_none() {
            self.pointer = PointerState::Idle;
        }
    }

    /// Concrete cell paths of the selection rectangle, row-major.
    pub fn selected_paths(&self, shape: &GridShape) -> Vec<Vec<Path>> {
        let Some(bounds) = self
            .selection
            .as_ref()
            .and_then(|s| s.clamped(shape.row_count, shape.col_count()))
            .map(|s| s.bounds())
        else {
            return Vec::new();
        };
        bounds
            .rows()
            .map(|row| {
                bounds
                    .cols()
                    .filter_map(|col| shape.cell_path(row, col))
                    .collect()
            })
            .collect()
    }

    /// Flip the wrap flag of every selected column to the inverse of the
    /// first selected column's flag. Returns the new flag.
    pub fn toggle_wrap(&self, shape: &GridShape, state: &mut GridRenderState) -> Option<bool> {
        let bounds = self.bounds()?;
        let ids: Vec<String> = bounds
            .cols()
            .filter_map(|col| shape.columns.get(col).map(|c| c.id()))
            .collect();
        let wrap = !state.is_wrapped(ids.first()?);
        for id in &ids {
            state.set_wrapped(id, wrap);
        }
        Some(wrap)
    }

    /// Wrap flag of the anchor column.
    pub fn is_wrapped(&self, shape: &GridShape, state: &GridRenderState) -> bool {
        self.selection
            .as_ref()
            .and_then(|s| shape.columns.get(s.anchor().col))
            .is_some_and(|c| state.is_wrapped(&c.id()))
    }
}

/// Focus coordinate a pointer target stands for during a drag or extend.
fn focus_for(target: &HitTarget, rows: usize, cols: usize) -> Option<CellCoord> {
    let last_row = rows.checked_sub(1)?;
    let last_col = cols.checked_sub(1)?;
    match target {
        HitTarget::Cell { row, col } => Some(CellCoord::new((*row).min(last_row), (*col).min(last_col))),
        HitTarget::RowIndex { row } => Some(CellCoord::new((*row).min(last_row), last_col)),
        HitTarget::Header { col, span, .. } => Some(CellCoord::new(
            last_row,
            (col + span.saturating_sub(1)).min(last_col),
        )),
        HitTarget::Corner => None,
    }
}
