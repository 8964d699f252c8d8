//! Per-column statistics: display width and numeric maximum.
//!
//! Pure functions of (rows, columns, saved widths). Nothing here mutates its
//! input.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::config::GridConfig;
use crate::types::ColumnDefinition;

/// Measured statistics of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetrics {
    /// Final pixel width
    pub width: f32,
    /// Largest numeric value, only when positive
    pub max_value: Option<f64>,
    /// Widest display text (header name included), in width units
    pub max_visual_width: usize,
}

/// Cell display text: strings verbatim, everything else in compact JSON,
/// missing values empty.
pub fn display_text(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Width units of `text`: 1 per Latin-1 character, 2 for anything wider.
pub fn visual_width(text: &str) -> usize {
    text.chars()
        .map(|c| if u32::from(c) <= 0xFF { 1 } else { 2 })
        .sum()
}

/// Numeric reading of a cell: numbers, or strings that parse as finite numbers.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Bar length in `[0, 1]` for a positive numeric cell of a column with
/// positive maximum.
pub fn bar_ratio(value: Option<&Value>, max_value: Option<f64>) -> Option<f64> {
    let max = max_value.filter(|m| *m > 0.0)?;
    let n = numeric_value(value?)?;
    (n > 0.0).then(|| (n / max).min(1.0))
}

/// Measure one column over `rows`.
pub fn measure_column(
    rows: &[&Value],
    column: &ColumnDefinition,
    saved_width: Option<f32>,
    config: &GridConfig,
) -> ColumnMetrics {
    let mut max_visual_width = visual_width(&column.name);
    let mut max_numeric: Option<f64> = None;

    for row in rows {
        let value = column.path.resolve(row);
        max_visual_width = max_visual_width.max(visual_width(&display_text(value)));
        if let Some(n) = value.and_then(numeric_value) {
            max_numeric = Some(max_numeric.map_or(n, |m| m.max(n)));
        }
    }

    let width = saved_width.unwrap_or_else(|| {
        (max_visual_width as f32 * config.char_width + config.cell_padding)
            .clamp(config.min_column_width, config.max_column_width)
    });

    ColumnMetrics {
        width,
        max_value: max_numeric.filter(|m| *m > 0.0),
        max_visual_width,
    }
}

/// Measure every column; saved widths are keyed by column id.
pub fn measure_columns(
    rows: &[&Value],
    columns: &[ColumnDefinition],
    saved_widths: &HashMap<String, f32>,
    config: &GridConfig,
) -> Vec<ColumnMetrics> {
    columns
        .iter()
        .map(|column| {
            let saved = saved_widths.get(&column.id()).copied();
            measure_column(rows, column, saved, config)
        })
        .collect()
}
