//! Clipboard text for `GridEngine`: TSV copy of the selection and TSV paste
//! into the grid.

use tracing::debug;

use super::GridEngine;
use crate::grid::display_text;
use crate::store::{DocumentStore, ValueUpdate};

/// Escape a cell value for TSV. Values containing tabs, line breaks or
/// quotes are wrapped in quotes with inner quotes doubled.
pub fn escape_cell_value(value: &str) -> String {
    let needs_quoting = value.contains(['\t', '\n', '\r', '"']);
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Split TSV text into rows of fields, honoring quoted fields. A trailing
/// line break does not start a new row.
pub fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut at_field_start = true;
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => quoted = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if at_field_start => {
                quoted = true;
                at_field_start = false;
            }
            '\t' => {
                row.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }
    if !field.is_empty() || !row.is_empty() || quoted {
        row.push(field);
        rows.push(row);
    }
    rows
}

impl<S: DocumentStore> GridEngine<S> {
    /// The selection rectangle as TSV, rows separated by `\n`.
    pub fn copy_selection(&mut self) -> Option<String> {
        self.refresh();
        let bounds = self.selection.bounds()?;
        let text = bounds
            .rows()
            .map(|row| {
                bounds
                    .cols()
                    .map(|col| {
                        let value = self
                            .shape
                            .cell_path(row, col)
                            .and_then(|path| self.store.value_by_path(&path, None));
                        escape_cell_value(&display_text(value))
                    })
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n");
        Some(text)
    }

    /// Write TSV `text` into the grid starting at the selection's top-left
    /// cell. Fields falling outside the grid are dropped. Returns the number
    /// of cells written.
    pub fn paste_tsv(&mut self, text: &str) -> usize {
        self.refresh();
        let Some(bounds) = self.selection.bounds() else {
            return 0;
        };
        let updates: Vec<ValueUpdate> = parse_tsv(text)
            .iter()
            .enumerate()
            .flat_map(|(r, fields)| {
                fields
                    .iter()
                    .enumerate()
                    .map(move |(c, field)| (bounds.min_row + r, bounds.min_col + c, field))
            })
            .filter_map(|(row, col, field)| {
                let path = self.shape.cell_path(row, col)?;
                Some(ValueUpdate::new(&path, field.as_str()))
            })
            .collect();
        if updates.is_empty() {
            return 0;
        }
        debug!(cells = updates.len(), "pasting");
        let result = self.store.batch_update_values(&updates);
        self.apply("paste", result).unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::store::JsonDocument;
    use crate::types::HitTarget;
    use serde_json::json;

    #[test]
    fn test_escape_cell_value() {
        assert_eq!(escape_cell_value("plain"), "plain");
        assert_eq!(escape_cell_value("a\tb"), "\"a\tb\"");
        assert_eq!(escape_cell_value("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cell_value("x\ny"), "\"x\ny\"");
    }

    #[test]
    fn test_parse_tsv() {
        assert_eq!(parse_tsv("a\tb\nc\td\n"), vec![vec!["a", "b"], vec!["c", "d"]]);
        assert_eq!(parse_tsv("\"x\ty\"\t\"q\"\"\"\r\n1"), vec![vec!["x\ty", "q\""], vec!["1"]]);
        assert_eq!(parse_tsv("a\t\n"), vec![vec!["a", ""]]);
        assert!(parse_tsv("").is_empty());
    }

    fn engine() -> GridEngine<JsonDocument> {
        let doc = JsonDocument::new(json!([
            {"name": "Slime", "hp": 10},
            {"name": "Bat", "hp": 15},
            {"name": "Orc", "hp": 30}
        ]));
        let mut engine = GridEngine::new(doc, GridConfig::default());
        engine.set_selection("root").unwrap();
        engine
    }

    #[test]
    fn test_paste_is_anchored_and_clipped() {
        let mut engine = engine();
        engine.pointer_down(&HitTarget::Cell { row: 1, col: 1 }, false);
        engine.pointer_up();
        let written = engine.paste_tsv("20\textra\n40\n50\n");
        assert_eq!(written, 2);
        assert_eq!(engine.store().data()[1]["hp"], json!(20));
        assert_eq!(engine.store().data()[2]["hp"], json!(40));
        assert_eq!(engine.store().data()[0]["hp"], json!(10));
    }

    #[test]
    fn test_copy_round_trips_through_paste() {
        let mut engine = engine();
        engine.pointer_down(&HitTarget::Corner, false);
        let text = engine.copy_selection().unwrap();
        assert_eq!(text, "Slime\t10\nBat\t15\nOrc\t30");
        assert_eq!(parse_tsv(&text).len(), 3);
    }
}
