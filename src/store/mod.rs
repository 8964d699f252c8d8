//! Document store: the JSON document the grid projects, and its mutation API.
//!
//! The grid engine only talks to the [`DocumentStore`] trait. [`JsonDocument`]
//! is the in-memory implementation used by the wasm facade, the CLI and the
//! tests.

mod coerce;
mod document;

pub use coerce::{coerce_edit, detect_value};
pub use document::JsonDocument;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::path::Path;

/// One entry of a batch update (clipboard paste).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueUpdate {
    /// Canonical path string of the target cell
    pub path: String,
    /// Raw text, coerced by the store
    pub value: String,
}

impl ValueUpdate {
    pub fn new(path: &Path, value: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            value: value.into(),
        }
    }
}

/// Notification payload fired after every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DocumentChange {
    Replaced,
    ValueUpdated { path: Path },
    BatchUpdated { count: usize },
    ArrayElementInserted { path: Path, index: usize },
    ArrayElementRemoved { path: Path, index: usize },
    ArrayElementMoved { path: Path, from: usize, to: usize },
    KeyRenamed { parent: Path, old_key: String, new_key: String },
    KeyMoved { parent: Path, key: String, target: String },
    KeyInserted { parent: Path, key: String },
    KeyRemoved { parent: Path, key: String },
}

/// The narrow document API the grid engine consumes.
///
/// Key-level operations (`rename_key`, `move_key`, `insert_key`,
/// `remove_key`) fan out: when the addressed location crosses an array
/// where a key is expected, the operation applies to every element.
pub trait DocumentStore {
    /// The whole document.
    fn data(&self) -> &Value;

    /// Resolve `path` against `root`, or against the document when `root` is `None`.
    fn value_by_path<'a>(&'a self, path: &Path, root: Option<&'a Value>) -> Option<&'a Value> {
        path.resolve(root.unwrap_or_else(|| self.data()))
    }

    /// Replace the value at `path` with `raw`, coerced by the original value's type.
    fn update_value(&mut self, path: &str, raw: &str) -> Result<()>;

    /// Apply several updates under one notification. Returns how many applied.
    fn batch_update_values(&mut self, updates: &[ValueUpdate]) -> Result<usize>;

    fn insert_array_element(&mut self, path: &str, index: usize) -> Result<()>;

    fn remove_array_element(&mut self, path: &str, index: usize) -> Result<()>;

    fn move_array_element(&mut self, path: &str, from: usize, to: usize) -> Result<()>;

    /// Rename `old_key` to `new_key` in the object(s) at `base` + `sub`.
    /// Fails with `KeyExists`, renaming nothing, when any of them already
    /// holds `new_key`.
    fn rename_key(&mut self, base: &Path, sub: &Path, old_key: &str, new_key: &str)
        -> Result<()>;

    /// Move `key` before (or after) `target` within the object(s) at `parent`.
    fn move_key(&mut self, parent: &Path, key: &str, target: &str, insert_after: bool)
        -> Result<()>;

    /// Insert a fresh null-valued key beside `beside`; returns the generated name.
    fn insert_key(&mut self, parent: &Path, beside: &str, insert_after: bool) -> Result<String>;

    fn remove_key(&mut self, parent: &Path, key: &str) -> Result<()>;

    /// Monotonic counter bumped by every successful mutation.
    fn revision(&self) -> u64;
}
