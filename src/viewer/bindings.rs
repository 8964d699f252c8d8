//! `JsonGridView`: the grid engine exported to JavaScript.
//!
//! The JS surface takes pixel coordinates and DOM key names, returns render
//! frames as plain objects (via `serde-wasm-bindgen`) and reports selection
//! changes through a callback. Native builds get a small Rust surface used
//! by tests and the CLI.

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use js_sys::Function;
#[cfg(target_arch = "wasm32")]
use tracing::warn;

use super::GridEngine;
use crate::store::JsonDocument;
#[cfg(target_arch = "wasm32")]
use crate::{
    config::GridConfig,
    error::GridError,
    path::Path,
    store::DocumentStore,
    viewer::KeyInput,
};

/// The grid view exported to JavaScript
#[wasm_bindgen]
pub struct JsonGridView {
    engine: GridEngine<JsonDocument>,
}

// ============================================================================
// WASM32 Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl JsonGridView {
    /// Create a view over `json`. `config` is an optional partial
    /// `GridConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(json: &str, config: JsValue) -> Result<JsonGridView, JsValue> {
        console_error_panic_hook::set_once();
        let config: GridConfig = if config.is_undefined() || config.is_null() {
            GridConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config.validate()?;
        let store = JsonDocument::from_json_str(json)?;
        Ok(JsonGridView {
            engine: GridEngine::new(store, config),
        })
    }

    /// Replace the whole document.
    #[wasm_bindgen(js_name = "setData")]
    pub fn set_data(&mut self, json: &str) -> Result<(), JsValue> {
        let value = serde_json::from_str(json).map_err(GridError::from)?;
        self.engine.store_mut().set_data(value);
        Ok(())
    }

    #[wasm_bindgen(js_name = "toJson")]
    pub fn to_json(&self) -> Result<String, JsValue> {
        Ok(self.engine.store().to_json_pretty()?)
    }

    #[wasm_bindgen(js_name = "setSelection")]
    pub fn set_selection(&mut self, path: &str) -> Result<(), JsValue> {
        Ok(self.engine.set_selection(path)?)
    }

    /// Run a render pass and return the frame.
    #[wasm_bindgen]
    pub fn render(&mut self) -> Result<JsValue, JsValue> {
        let frame = self.engine.render();
        to_js(&frame)
    }

    #[wasm_bindgen(js_name = "needsRender")]
    pub fn needs_render(&self) -> bool {
        self.engine.needs_render()
    }

    /// Measured heights of rendered rows, starting at row `start`.
    #[wasm_bindgen(js_name = "reportRowHeights")]
    pub fn report_row_heights(&mut self, start: usize, heights: Vec<f32>) -> usize {
        self.engine.report_row_heights(start, &heights)
    }

    #[wasm_bindgen(js_name = "scrollTo")]
    pub fn scroll_to(&mut self, offset: f32) -> bool {
        self.engine.scroll_to(offset)
    }

    #[wasm_bindgen(js_name = "scrollBy")]
    pub fn scroll_by(&mut self, delta: f32) -> bool {
        self.engine.scroll_by(delta)
    }

    #[wasm_bindgen(js_name = "resizeViewport")]
    pub fn resize_viewport(&mut self, height: f32) {
        self.engine.resize_viewport(height);
    }

    #[wasm_bindgen(js_name = "hitTest")]
    pub fn hit_test(&self, x: f32, y: f32) -> Result<JsValue, JsValue> {
        to_js(&self.engine.hit_test(x, y))
    }

    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(&mut self, x: f32, y: f32, extend: bool) -> bool {
        match self.engine.hit_test(x, y) {
            Some(target) => self.engine.pointer_down(&target, extend),
            None => {
                self.engine.commit_edit();
                false
            }
        }
    }

    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.engine
            .hit_test(x, y)
            .is_some_and(|target| self.engine.pointer_move(&target))
    }

    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&mut self) {
        self.engine.pointer_up();
    }

    #[wasm_bindgen(js_name = "doubleClick")]
    pub fn double_click(&mut self, x: f32, y: f32) -> bool {
        self.engine
            .hit_test(x, y)
            .is_some_and(|target| self.engine.double_click(&target))
    }

    #[wasm_bindgen(js_name = "keyDown")]
    pub fn key_down(
        &mut self,
        key: &str,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Result<JsValue, JsValue> {
        let input = KeyInput {
            key: key.to_string(),
            shift,
            ctrl,
            alt,
            meta,
        };
        to_js(&self.engine.key_down(&input))
    }

    /// Current edit session (cell, path, buffer, caret), or null.
    #[wasm_bindgen(js_name = "editSession")]
    pub fn edit_session(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.editor().session())
    }

    #[wasm_bindgen(js_name = "setEditBuffer")]
    pub fn set_edit_buffer(&mut self, text: &str) -> bool {
        self.engine.set_edit_buffer(text)
    }

    #[wasm_bindgen(js_name = "commitEdit")]
    pub fn commit_edit(&mut self) -> bool {
        self.engine.commit_edit().is_some()
    }

    #[wasm_bindgen(js_name = "cancelEdit")]
    pub fn cancel_edit(&mut self) -> bool {
        self.engine.cancel_edit()
    }

    #[wasm_bindgen(js_name = "getSelectedPaths")]
    pub fn selected_paths(&mut self) -> Result<JsValue, JsValue> {
        let paths: Vec<Vec<String>> = self
            .engine
            .selected_paths()
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        to_js(&paths)
    }

    #[wasm_bindgen(js_name = "toggleWrapSelection")]
    pub fn toggle_wrap_selection(&mut self) -> Option<bool> {
        self.engine.toggle_wrap_selection()
    }

    #[wasm_bindgen(js_name = "isSelectionWrapped")]
    pub fn is_selection_wrapped(&mut self) -> bool {
        self.engine.is_selection_wrapped()
    }

    #[wasm_bindgen(js_name = "expandColumn")]
    pub fn expand_column(&mut self, column: &str) -> Result<bool, JsValue> {
        Ok(self.engine.expand_column(&Path::parse(column)?))
    }

    #[wasm_bindgen(js_name = "collapseColumn")]
    pub fn collapse_column(&mut self, column: &str) -> Result<bool, JsValue> {
        Ok(self.engine.collapse_column(&Path::parse(column)?))
    }

    #[wasm_bindgen(js_name = "resizeColumn")]
    pub fn resize_column(&mut self, column: &str, width: f32) -> Result<f32, JsValue> {
        Ok(self.engine.resize_column(&Path::parse(column)?, width))
    }

    #[wasm_bindgen(js_name = "insertRow")]
    pub fn insert_row(&mut self, index: usize) -> bool {
        self.engine.insert_row(index)
    }

    #[wasm_bindgen(js_name = "removeRow")]
    pub fn remove_row(&mut self, index: usize) -> bool {
        self.engine.remove_row(index)
    }

    #[wasm_bindgen(js_name = "moveRow")]
    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        self.engine.move_row(from, to)
    }

    #[wasm_bindgen(js_name = "insertColumn")]
    pub fn insert_column(&mut self, column: &str, insert_after: bool) -> Result<Option<String>, JsValue> {
        Ok(self.engine.insert_column(&Path::parse(column)?, insert_after))
    }

    #[wasm_bindgen(js_name = "removeColumn")]
    pub fn remove_column(&mut self, column: &str) -> Result<bool, JsValue> {
        Ok(self.engine.remove_column(&Path::parse(column)?))
    }

    #[wasm_bindgen(js_name = "renameColumn")]
    pub fn rename_column(&mut self, column: &str, new_name: &str) -> Result<bool, JsValue> {
        Ok(self.engine.rename_column(&Path::parse(column)?, new_name))
    }

    #[wasm_bindgen(js_name = "moveColumn")]
    pub fn move_column(&mut self, column: &str, target: &str, insert_after: bool) -> Result<bool, JsValue> {
        let column = Path::parse(column)?;
        let target = Path::parse(target)?;
        Ok(self.engine.move_column(&column, &target, insert_after))
    }

    #[wasm_bindgen(js_name = "copySelection")]
    pub fn copy_selection(&mut self) -> Option<String> {
        self.engine.copy_selection()
    }

    #[wasm_bindgen(js_name = "pasteTsv")]
    pub fn paste_tsv(&mut self, text: &str) -> usize {
        self.engine.paste_tsv(text)
    }

    /// Register `callback({ path, header, type })` for selection changes.
    #[wasm_bindgen(js_name = "onSelectionChange")]
    pub fn on_selection_change(&mut self, callback: Function) {
        self.engine.on_selection_change(move |change| {
            let payload = match serde_wasm_bindgen::to_value(change) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "selection change not serializable");
                    return;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
                warn!(error = ?e, "selection change callback threw");
            }
        });
    }
}

// ============================================================================
// Non-WASM32 Implementation (for tests/CLI)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl JsonGridView {
    /// Create a view over `json` (native version for tests and tooling)
    pub fn from_json(json: &str, config: crate::config::GridConfig) -> crate::error::Result<Self> {
        config.validate()?;
        let store = JsonDocument::from_json_str(json)?;
        Ok(Self {
            engine: GridEngine::new(store, config),
        })
    }

    pub fn engine(&self) -> &GridEngine<JsonDocument> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GridEngine<JsonDocument> {
        &mut self.engine
    }

    pub fn into_engine(self) -> GridEngine<JsonDocument> {
        self.engine
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    #[test]
    fn test_from_json_builds_engine() {
        let mut view = JsonGridView::from_json(r#"{"a": [1, 2, 3]}"#, GridConfig::default()).unwrap();
        view.engine_mut().set_selection("root.a").unwrap();
        let frame = view.engine_mut().render();
        assert_eq!(frame.shape.row_count, 3);
        assert_eq!(frame.columns[0].def.name, "value");
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(JsonGridView::from_json("{", GridConfig::default()).is_err());
        let config = GridConfig {
            default_row_height: 0.0,
            ..GridConfig::default()
        };
        assert!(JsonGridView::from_json("{}", config).is_err());
    }
}
