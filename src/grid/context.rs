//! Grid context: which rows a selected path puts on screen.

use serde::Serialize;
use serde_json::Value;

use crate::path::Path;
use crate::types::{CellCoord, ColumnDefinition};

/// Rows the grid displays for a selected path, borrowed from the document.
#[derive(Debug, Clone, PartialEq)]
pub struct GridContext<'a> {
    pub rows: Vec<&'a Value>,
    /// Path of the array (or object) that holds the rows
    pub containing_path: Path,
    /// Selected path relative to a row
    pub relative_path: Path,
    pub is_array_context: bool,
}

impl<'a> GridContext<'a> {
    /// Resolve the grid context of `selected`.
    ///
    /// In priority order:
    /// 1. `selected` is an array: its elements are the rows.
    /// 2. The nearest ancestor index segment whose prefix is an array: that
    ///    array is the rows, the rest of the path is relative to a row.
    /// 3. `selected` is an object: it is the single row.
    /// 4. Otherwise the parent object is the single row and the last segment
    ///    is the relative path. Without a parent there are no rows.
    pub fn resolve(root: &'a Value, selected: &Path) -> Self {
        let value = selected.resolve(root);

        if let Some(Value::Array(items)) = value {
            return Self::array(items, selected.clone(), Path::root());
        }

        for (i, segment) in selected.segments().iter().enumerate().rev() {
            if !segment.is_index() {
                continue;
            }
            let prefix = selected.prefix(i);
            if let Some(Value::Array(items)) = prefix.resolve(root) {
                return Self::array(items, prefix, selected.suffix(i + 1));
            }
        }

        if let Some(object) = value.filter(|v| v.is_object()) {
            return Self {
                rows: vec![object],
                containing_path: selected.clone(),
                relative_path: Path::root(),
                is_array_context: false,
            };
        }

        let parent = selected
            .parent()
            .and_then(|p| p.resolve(root).filter(|v| v.is_object()).map(|v| (p, v)));
        match (parent, selected.last()) {
            (Some((parent_path, parent)), Some(last)) => Self {
                rows: vec![parent],
                containing_path: parent_path,
                relative_path: Path::from_segments(vec![last.clone()]),
                is_array_context: false,
            },
            _ => Self {
                rows: Vec::new(),
                containing_path: selected.parent().unwrap_or_default(),
                relative_path: Path::root(),
                is_array_context: false,
            },
        }
    }

    fn array(items: &'a [Value], containing_path: Path, relative_path: Path) -> Self {
        Self {
            rows: items.iter().collect(),
            containing_path,
            relative_path,
            is_array_context: true,
        }
    }

    /// Owned summary of this context with its projected columns.
    pub fn shape(&self, columns: Vec<ColumnDefinition>) -> GridShape {
        GridShape {
            containing_path: self.containing_path.clone(),
            relative_path: self.relative_path.clone(),
            is_array_context: self.is_array_context,
            row_count: self.rows.len(),
            columns,
        }
    }
}

/// Owned geometry of the last projection, kept between renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridShape {
    pub containing_path: Path,
    pub relative_path: Path,
    pub is_array_context: bool,
    pub row_count: usize,
    pub columns: Vec<ColumnDefinition>,
}

impl GridShape {
    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.columns.is_empty()
    }

    /// Absolute path of row `row`.
    pub fn row_path(&self, row: usize) -> Option<Path> {
        if row >= self.row_count {
            return None;
        }
        Some(if self.is_array_context {
            self.containing_path.with_index(row)
        } else {
            self.containing_path.clone()
        })
    }

    /// Absolute path of a cell: containing path, row index (array context),
    /// then the column's relative path.
    pub fn cell_path(&self, row: usize, col: usize) -> Option<Path> {
        let column = self.columns.get(col)?;
        Some(self.row_path(row)?.join(&column.path))
    }

    /// Cell displaying `path`, if any. Paths below a collapsed column map to
    /// that column.
    pub fn locate(&self, path: &Path) -> Option<CellCoord> {
        if !path.starts_with(&self.containing_path) {
            return None;
        }
        let rest = path.suffix(self.containing_path.len());
        let (row, relative) = if self.is_array_context {
            let row = rest.segments().first()?.as_index()?;
            (row, rest.suffix(1))
        } else {
            (0, rest)
        };
        if row >= self.row_count {
            return None;
        }
        if relative.is_empty() {
            return (!self.columns.is_empty()).then_some(CellCoord::new(row, 0));
        }
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| relative.starts_with(&c.path))
            .max_by_key(|(_, c)| c.path.len())
            .map(|(col, _)| CellCoord::new(row, col))
    }
}
