//! Multi-level header rows built from the flattened column list.

use crate::path::Segment;
use crate::types::{ColumnDefinition, HeaderCell, HeaderToggle};

use super::projector::group_is_array;

/// Number of header levels (the deepest column path, at least one).
pub fn header_depth(columns: &[ColumnDefinition]) -> usize {
    columns
        .iter()
        .map(ColumnDefinition::depth)
        .max()
        .unwrap_or(0)
}

/// Build one row of header cells per level.
///
/// At each level, consecutive columns sharing the path prefix up to that
/// level merge into one cell spanning them. A column's last segment is its
/// leaf cell, which spans the remaining levels downward.
pub fn build_header_rows(columns: &[ColumnDefinition]) -> Vec<Vec<HeaderCell>> {
    let max_depth = header_depth(columns);
    (0..max_depth)
        .map(|depth| build_level(columns, depth, max_depth))
        .collect()
}

fn build_level(columns: &[ColumnDefinition], depth: usize, max_depth: usize) -> Vec<HeaderCell> {
    let mut cells = Vec::new();
    let mut col = 0;
    while let Some(column) = columns.get(col) {
        if column.depth() <= depth {
            col += 1;
            continue;
        }
        let prefix = column.path.prefix(depth + 1);
        let span = columns
            .iter()
            .skip(col)
            .take_while(|c| c.depth() > depth && c.path.prefix(depth + 1) == prefix)
            .count()
            .max(1);
        let is_leaf = column.depth() == depth + 1;
        let name = column
            .path
            .segments()
            .get(depth)
            .map_or_else(|| column.name.clone(), Segment::label);

        let (toggle, is_array_kind) = if is_leaf {
            let toggle = column.is_collapsed.then_some(HeaderToggle::Expand);
            (toggle, column.is_array_kind)
        } else {
            (
                Some(HeaderToggle::Collapse),
                group_is_array(columns, &prefix),
            )
        };

        cells.push(HeaderCell {
            path: prefix,
            name,
            depth,
            col,
            col_span: span,
            row_span: if is_leaf { max_depth - depth } else { 1 },
            toggle,
            is_array_kind,
        });
        col += span;
    }
    cells
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::grid::projector::{project_columns, ExpandState};
    use serde_json::{json, Value};

    fn columns_for(data: &Value, expand: &ExpandState) -> Vec<ColumnDefinition> {
        let rows: Vec<&Value> = data.as_array().unwrap().iter().collect();
        project_columns(&rows, expand)
    }

    #[test]
    fn test_single_level_header() {
        let data = json!([{"id": 1, "hp": 2}]);
        let header = build_header_rows(&columns_for(&data, &ExpandState::new()));
        assert_eq!(header.len(), 1);
        assert_eq!(header[0].len(), 2);
        assert!(header[0].iter().all(|c| c.row_span == 1 && c.col_span == 1));
    }

    #[test]
    fn test_grouped_header_spans() {
        let data = json!([{"id": 1, "stats": {"hp": 10, "mp": 2}}]);
        let header = build_header_rows(&columns_for(&data, &ExpandState::new()));
        assert_eq!(header.len(), 2);

        let top = &header[0];
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].name.as_str(), top[0].row_span), ("id", 2));
        assert_eq!((top[1].name.as_str(), top[1].col_span), ("stats", 2));
        assert_eq!(top[1].toggle, Some(HeaderToggle::Collapse));
        assert!(!top[1].is_array_kind);

        let bottom = &header[1];
        assert_eq!(bottom.len(), 2);
        assert_eq!(bottom[0].col, 1);
        assert_eq!(bottom[1].id(), "stats.mp");
    }

    #[test]
    fn test_array_group_and_expand_toggle() {
        let data = json!([{"tags": ["a", "b"], "items": [1]}]);
        let mut expand = ExpandState::new();
        expand.expand("tags", true);
        let header = build_header_rows(&columns_for(&data, &expand));

        let top = &header[0];
        assert_eq!(top[0].name, "tags");
        assert!(top[0].is_array_kind);
        assert_eq!(top[0].col_span, 2);
        assert_eq!(top[1].name, "items");
        assert_eq!(top[1].toggle, Some(HeaderToggle::Expand));
        assert_eq!(header[1][1].name, "[1]");
    }

    #[test]
    fn test_value_column_header() {
        let data = json!([1, 2]);
        let header = build_header_rows(&columns_for(&data, &ExpandState::new()));
        assert_eq!(header.len(), 1);
        assert_eq!(header[0][0].name, "value");
    }
}
