//! Structured error types for jsongrid.
//!
//! Read paths (path resolution, projection, metrics) never fail; these errors
//! come from path parsing, configuration, and document mutations.

/// All errors that can occur in jsongrid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Path string could not be parsed.
    #[error("Invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Path is well formed but does not address an existing value.
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// An array was required at this path.
    #[error("Not an array: {0}")]
    NotAnArray(String),

    /// An object was required at this path.
    #[error("Not an object: {0}")]
    NotAnObject(String),

    /// Array index outside `0..len` (or `0..=len` for inserts).
    #[error("Index {index} out of range for array of length {len} at {path}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    /// Renaming onto a key that is already taken in at least one object.
    #[error("Key `{key}` already exists at {path}")]
    KeyExists { path: String, key: String },

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid grid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl GridError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
