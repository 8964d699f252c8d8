use serde::Serialize;

use crate::path::Path;

/// Name of the synthetic column used when no row is an object.
pub const VALUE_COLUMN: &str = "value";

/// One leaf column of the projected grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Path relative to a row (empty for the synthetic value column)
    pub path: Path,
    /// Header label (last segment)
    pub name: String,
    /// Some row holds an object or array at this path
    pub is_collapsible: bool,
    /// Collapsible and currently shown as a single column
    pub is_collapsed: bool,
    /// Some row holds an array at this path
    pub is_array_kind: bool,
}

impl ColumnDefinition {
    /// The single column shown when the row set contains no object.
    pub fn value_column() -> Self {
        Self {
            path: Path::root(),
            name: VALUE_COLUMN.to_string(),
            is_collapsible: false,
            is_collapsed: false,
            is_array_kind: false,
        }
    }

    /// Identity string: the relative path form (`stats.hp`, `tags[0]`).
    pub fn id(&self) -> String {
        self.path.to_relative_string()
    }

    /// Number of header levels this column occupies (at least one).
    pub fn depth(&self) -> usize {
        self.path.len().max(1)
    }
}

/// Toggle offered by a header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderToggle {
    /// Collapsed leaf that can be opened
    Expand,
    /// Group header that can be closed
    Collapse,
}

/// One cell of the multi-level header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCell {
    /// Relative path of the column or group
    pub path: Path,
    pub name: String,
    /// Header level (0 = top)
    pub depth: usize,
    /// First leaf column covered
    pub col: usize,
    pub col_span: usize,
    pub row_span: usize,
    pub toggle: Option<HeaderToggle>,
    /// The group (or collapsed leaf) holds arrays
    pub is_array_kind: bool,
}

impl HeaderCell {
    pub fn id(&self) -> String {
        self.path.to_relative_string()
    }
}
