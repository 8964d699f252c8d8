//! Column projection: recursive structural union of a row set.
//!
//! Every key seen in any object row becomes a column, in first-seen order.
//! Columns holding objects start expanded (flattened into their sub-keys);
//! columns holding arrays start collapsed. [`ExpandState`] overrides either
//! default by relative path string.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::{self, Path, Segment};
use crate::types::ColumnDefinition;

/// User overrides of the default expand policy, keyed by relative path string.
///
/// When a key is present in both sets, the collapsed entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandState {
    collapsed: BTreeSet<String>,
    expanded: BTreeSet<String>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys forced closed (object columns).
    pub fn collapsed(&self) -> &BTreeSet<String> {
        &self.collapsed
    }

    /// Keys forced open (array columns).
    pub fn expanded(&self) -> &BTreeSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, key: &str, default: bool) -> bool {
        if self.collapsed.contains(key) {
            false
        } else if self.expanded.contains(key) {
            true
        } else {
            default
        }
    }

    /// Open `key`. Array columns need an explicit entry; object columns only
    /// lose their collapse override.
    pub fn expand(&mut self, key: &str, array_kind: bool) {
        self.collapsed.remove(key);
        if array_kind {
            self.expanded.insert(key.to_string());
        }
    }

    /// Close `key`. Object columns need an explicit entry; array columns only
    /// lose their expand override.
    pub fn collapse(&mut self, key: &str, array_kind: bool) {
        self.expanded.remove(key);
        if !array_kind {
            self.collapsed.insert(key.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.collapsed.clear();
        self.expanded.clear();
    }
}

/// Project `rows` into an ordered column list.
///
/// Deterministic in (rows, overrides). A row set without any object yields
/// the single synthetic `value` column.
pub fn project_columns(rows: &[&Value], expand: &ExpandState) -> Vec<ColumnDefinition> {
    let mut columns = Vec::new();
    project_level(rows, &Path::root(), expand, &mut columns);
    if columns.is_empty() {
        columns.push(ColumnDefinition::value_column());
    }
    columns
}

fn project_level(
    rows: &[&Value],
    prefix: &Path,
    expand: &ExpandState,
    out: &mut Vec<ColumnDefinition>,
) {
    // Below the top level, array rows contribute their indices.
    let nested = !prefix.is_empty();

    for segment in union_segments(rows, nested) {
        let children: Vec<&Value> = rows
            .iter()
            .filter_map(|row| path::child(row, &segment))
            .collect();
        let is_array_kind = children.iter().any(|v| v.is_array());
        let is_collapsible = is_array_kind || children.iter().any(|v| v.is_object());
        let has_sub_keys = children.iter().any(|v| match v {
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => false,
        });

        let path = prefix.with_segment(segment);
        let is_expanded =
            is_collapsible && expand.is_expanded(&path.to_relative_string(), !is_array_kind);

        if is_expanded && has_sub_keys {
            project_level(&children, &path, expand, out);
            continue;
        }

        let name = path.last().map(Segment::label).unwrap_or_default();
        out.push(ColumnDefinition {
            path,
            name,
            is_collapsible,
            is_collapsed: is_collapsible && !is_expanded,
            is_array_kind,
        });
    }
}

/// Distinct keys (and, when `nested`, array indices) across `rows`, in
/// first-seen order.
fn union_segments(rows: &[&Value], nested: bool) -> Vec<Segment> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    let mut add = |segment: Segment| {
        if seen.insert(segment.clone()) {
            ordered.push(segment);
        }
    };
    for row in rows {
        match row {
            Value::Object(map) => map.keys().for_each(|k| add(Segment::Key(k.clone()))),
            Value::Array(items) if nested => (0..items.len()).for_each(|i| add(Segment::Index(i))),
            _ => {}
        }
    }
    ordered
}

/// Whether the header group at `prefix` holds array elements, i.e. the
/// segment directly below it is an index.
pub fn group_is_array(columns: &[ColumnDefinition], prefix: &Path) -> bool {
    columns.iter().any(|c| {
        c.path.len() > prefix.len()
            && c.path.starts_with(prefix)
            && c.path
                .segments()
                .get(prefix.len())
                .is_some_and(Segment::is_index)
    })
}
