use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::path::Path;

/// A cell position in the projected grid (row index, column index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Clamp into `[0, rows-1] x [0, cols-1]`. Returns `None` for an empty grid.
    pub fn clamped(self, rows: usize, cols: usize) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }
        Some(Self {
            row: self.row.min(rows - 1),
            col: self.col.min(cols - 1),
        })
    }
}

/// Normalized rectangle of a selection (inclusive on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionBounds {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl SelectionBounds {
    pub fn from_corners(a: CellCoord, b: CellCoord) -> Self {
        Self {
            min_row: a.row.min(b.row),
            min_col: a.col.min(b.col),
            max_row: a.row.max(b.row),
            max_col: a.col.max(b.col),
        }
    }

    pub fn rows(&self) -> RangeInclusive<usize> {
        self.min_row..=self.max_row
    }

    pub fn cols(&self) -> RangeInclusive<usize> {
        self.min_col..=self.max_col
    }

    pub fn row_span(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn col_span(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }
}

/// A selected column or column group, identified by its relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSelection {
    pub path: Path,
    pub name: String,
}

/// Current selection: a cell range, or a header range that also names the
/// selected column group.
///
/// Anchor and focus are stored as the user produced them; normalization
/// happens on read through [`Selection::bounds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Cells {
        anchor: CellCoord,
        focus: CellCoord,
    },
    Header {
        anchor: CellCoord,
        focus: CellCoord,
        header: HeaderSelection,
    },
}

impl Selection {
    /// Single-cell selection.
    pub fn cell(row: usize, col: usize) -> Self {
        let at = CellCoord::new(row, col);
        Self::Cells {
            anchor: at,
            focus: at,
        }
    }

    pub fn anchor(&self) -> CellCoord {
        match self {
            Self::Cells { anchor, .. } | Self::Header { anchor, .. } => *anchor,
        }
    }

    pub fn focus(&self) -> CellCoord {
        match self {
            Self::Cells { focus, .. } | Self::Header { focus, .. } => *focus,
        }
    }

    pub fn header(&self) -> Option<&HeaderSelection> {
        match self {
            Self::Header { header, .. } => Some(header),
            Self::Cells { .. } => None,
        }
    }

    /// Get normalized bounds (min/max on both axes)
    pub fn bounds(&self) -> SelectionBounds {
        SelectionBounds::from_corners(self.anchor(), self.focus())
    }

    /// Same selection with a new focus; anchor and variant are kept.
    pub fn with_focus(&self, focus: CellCoord) -> Self {
        match self {
            Self::Cells { anchor, .. } => Self::Cells {
                anchor: *anchor,
                focus,
            },
            Self::Header { anchor, header, .. } => Self::Header {
                anchor: *anchor,
                focus,
                header: header.clone(),
            },
        }
    }

    /// Re-clamp both corners to a grid of `rows x cols`. `None` when empty.
    pub fn clamped(&self, rows: usize, cols: usize) -> Option<Self> {
        let anchor = self.anchor().clamped(rows, cols)?;
        let focus = self.focus().clamped(rows, cols)?;
        Some(match self {
            Self::Cells { .. } => Self::Cells { anchor, focus },
            Self::Header { header, .. } => Self::Header {
                anchor,
                focus,
                header: header.clone(),
            },
        })
    }
}

/// What a pointer event landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HitTarget {
    /// A data cell
    Cell { row: usize, col: usize },
    /// The index cell at the start of a row
    RowIndex { row: usize },
    /// A header cell covering `span` columns starting at `col`
    Header {
        col: usize,
        span: usize,
        path: Path,
        name: String,
    },
    /// Top-left corner (select all)
    Corner,
}

/// Whether a selection change refers to a value or to a key (header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Value,
    Key,
}

/// Payload of the selection-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionChange {
    /// Absolute path of the anchor cell, or of the selected column group
    pub path: Option<Path>,
    pub header: Option<HeaderSelection>,
    #[serde(rename = "type")]
    pub kind: SelectionKind,
}
