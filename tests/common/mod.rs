//! Shared fixtures for the integration tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use serde_json::{json, Value};

use jsongrid::{GridConfig, GridEngine, JsonDocument, Path};

// ============================================================================
// Documents
// ============================================================================

/// Three monsters with a nested `stats` object and an array of tags.
pub fn monsters() -> Value {
    json!({
        "monsters": [
            {"id": 1, "name": "Slime", "stats": {"hp": 10, "mp": 0}, "tags": ["blue"]},
            {"id": 2, "name": "Bat", "stats": {"hp": 15, "mp": 3}, "tags": ["flying", "night"]},
            {"id": 3, "name": "Orc", "stats": {"hp": 30, "mp": 5}, "tags": []}
        ],
        "version": 2
    })
}

/// `count` flat rows of `{"n": i, "label": "row i"}`.
pub fn numbered_rows(count: usize) -> Value {
    let rows: Vec<Value> = (0..count)
        .map(|i| json!({"n": i, "label": format!("row {i}")}))
        .collect();
    json!({ "rows": rows })
}

// ============================================================================
// Engine helpers
// ============================================================================

/// Engine over `doc` with the default configuration, showing `path`.
pub fn engine_at(doc: Value, path: &str) -> GridEngine<JsonDocument> {
    let mut engine = GridEngine::new(JsonDocument::new(doc), GridConfig::default());
    engine.set_selection(path).expect("path should parse");
    engine
}

pub fn path(s: &str) -> Path {
    Path::parse(s).expect("path should parse")
}

/// Column ids of the current projection.
pub fn column_ids(engine: &mut GridEngine<JsonDocument>) -> Vec<String> {
    engine.shape().columns.iter().map(|c| c.id()).collect()
}

/// Selected paths rendered as strings, row-major.
pub fn selected_strings(engine: &mut GridEngine<JsonDocument>) -> Vec<Vec<String>> {
    engine
        .selected_paths()
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect()
}
