//! jsongrid - JSON grid engine for the web
//!
//! Projects an arbitrary JSON document into a spreadsheet-like grid for an
//! in-browser JSON editor, compiled to WebAssembly:
//! - Paths addressing every cell, row and column group
//! - Recursive column projection with expand/collapse of nested objects and arrays
//! - Virtualized rows over measured, variable heights
//! - Rectangular range selection, cell editing, TSV copy/paste
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { JsonGridView } from 'jsongrid';
//! await init();
//! const view = new JsonGridView(jsonText, { bufferRows: 5 });
//! view.setSelection('root.monsters');
//! const frame = view.render();
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod grid;
pub mod layout;
pub mod path;
pub mod selection;
pub mod store;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use config::GridConfig;
pub use error::{GridError, Result};
pub use grid::{render_pass, GridRenderState, RenderFrame, RenderInput};
pub use path::{Path, Segment};
pub use store::{DocumentStore, JsonDocument};
pub use types::*;
pub use viewer::{GridEngine, JsonGridView};

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
