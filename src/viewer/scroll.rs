//! Scroll and resize handling for `GridEngine`.

use tracing::trace;

use super::GridEngine;
use crate::store::DocumentStore;

impl<S: DocumentStore> GridEngine<S> {
    /// Scroll the row area to an absolute offset. Returns `true` when the
    /// offset changed.
    pub fn scroll_to(&mut self, offset: f32) -> bool {
        let total = self.content_height();
        let before = self.viewport.scroll_offset;
        self.viewport.scroll_to(offset, total);
        self.scrolled(before)
    }

    pub fn scroll_by(&mut self, delta: f32) -> bool {
        let total = self.content_height();
        let before = self.viewport.scroll_offset;
        self.viewport.scroll_by(delta, total);
        self.scrolled(before)
    }

    /// New visible height of the row area.
    pub fn resize_viewport(&mut self, height: f32) {
        self.viewport.resize(height);
        let total = self.content_height();
        self.viewport.clamp_scroll(total);
        self.needs_render = true;
    }

    /// Scroll the least distance that shows `row` completely.
    pub fn scroll_row_into_view(&mut self, row: usize) -> bool {
        self.content_height();
        let before = self.viewport.scroll_offset;
        self.viewport
            .scroll_row_into_view(&self.render_state.row_heights, row);
        self.scrolled(before)
    }

    /// Total height of all rows, with the height cache sized to the grid.
    pub fn content_height(&mut self) -> f32 {
        self.refresh();
        self.render_state
            .row_heights
            .ensure_len(self.shape.row_count, self.config.default_row_height);
        self.render_state.row_heights.total_height()
    }

    fn scrolled(&mut self, before: f32) -> bool {
        let moved = (self.viewport.scroll_offset - before).abs() > f32::EPSILON;
        if moved {
            trace!(offset = self.viewport.scroll_offset, "scrolled");
            self.needs_render = true;
        }
        moved
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use crate::config::GridConfig;
    use crate::store::JsonDocument;
    use crate::viewer::GridEngine;
    use serde_json::{json, Value};

    fn engine(rows: usize) -> GridEngine<JsonDocument> {
        let items: Vec<Value> = (0..rows).map(|i| json!({ "n": i })).collect();
        let mut engine = GridEngine::new(JsonDocument::new(Value::Array(items)), GridConfig::default());
        engine.set_selection("root").unwrap();
        engine.resize_viewport(560.0);
        engine
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut engine = engine(100);
        assert!(engine.scroll_to(1e9));
        assert_eq!(engine.viewport().scroll_offset, 2800.0 - 560.0);
        assert!(engine.scroll_by(-1e9));
        assert_eq!(engine.viewport().scroll_offset, 0.0);
        assert!(!engine.scroll_by(-10.0));
    }

    #[test]
    fn test_scroll_row_into_view_nearest_edge() {
        let mut engine = engine(100);
        assert!(engine.scroll_row_into_view(30));
        assert_eq!(engine.viewport().scroll_offset, 31.0 * 28.0 - 560.0);
        assert!(!engine.scroll_row_into_view(25));
        assert!(engine.scroll_row_into_view(0));
        assert_eq!(engine.viewport().scroll_offset, 0.0);
    }

    #[test]
    fn test_short_content_does_not_scroll() {
        let mut engine = engine(3);
        assert!(!engine.scroll_to(200.0));
        let frame = engine.render();
        assert_eq!(frame.scroll_offset, 0.0);
    }
}
