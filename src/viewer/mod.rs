//! Grid engine: the stateful coordinator behind the grid view.
//!
//! `GridEngine` owns everything one grid instance mutates between renders
//! (expand overrides, column widths, the row-height cache, wrap flags, the
//! viewport, the selection and the cell editor) and drives a
//! [`DocumentStore`] for every document mutation. Handlers here run
//! synchronously; each leaves the engine marked for re-render when it
//! changed anything visible.
//!
//! The JavaScript surface is [`JsonGridView`] in `bindings`.

mod bindings;
mod clipboard;
mod events;
mod scroll;

pub use bindings::JsonGridView;
pub use clipboard::{escape_cell_value, parse_tsv};
pub use events::{KeyInput, KeyOutcome};

use std::fmt;

use tracing::{debug, warn};

use crate::config::GridConfig;
use crate::editor::{rename_target, CellEditor};
use crate::error::Result;
use crate::grid::{
    group_is_array, project_columns, render_pass, GridContext, GridRenderState, GridShape,
    RenderFrame, RenderInput,
};
use crate::layout::{VirtualViewport, VirtualWindow};
use crate::path::{Path, Segment};
use crate::selection::SelectionModel;
use crate::store::DocumentStore;
use crate::types::{HeaderCell, Selection, SelectionChange, SelectionKind};

type SelectionListener = Box<dyn FnMut(&SelectionChange)>;

/// Geometry of the last rendered frame, used for hit testing.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FrameGeometry {
    pub(crate) column_widths: Vec<f32>,
    pub(crate) header_rows: Vec<Vec<HeaderCell>>,
}

pub struct GridEngine<S: DocumentStore> {
    store: S,
    config: GridConfig,
    /// Path whose grid context is displayed
    selected_path: Path,
    render_state: GridRenderState,
    viewport: VirtualViewport,
    selection: SelectionModel,
    editor: CellEditor,
    shape: GridShape,
    geometry: FrameGeometry,
    window: Option<VirtualWindow>,
    shape_stale: bool,
    shape_revision: u64,
    needs_render: bool,
    listeners: Vec<SelectionListener>,
}

impl<S: DocumentStore + fmt::Debug> fmt::Debug for GridEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridEngine")
            .field("store", &self.store)
            .field("selected_path", &self.selected_path)
            .field("viewport", &self.viewport)
            .field("selection", &self.selection)
            .field("shape", &self.shape)
            .field("needs_render", &self.needs_render)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<S: DocumentStore> GridEngine<S> {
    pub fn new(store: S, config: GridConfig) -> Self {
        let viewport = VirtualViewport::new(600.0, config.buffer_rows);
        Self {
            store,
            config,
            selected_path: Path::root(),
            render_state: GridRenderState::default(),
            viewport,
            selection: SelectionModel::new(),
            editor: CellEditor::new(),
            shape: GridShape::default(),
            geometry: FrameGeometry::default(),
            window: None,
            shape_stale: true,
            shape_revision: 0,
            needs_render: true,
            listeners: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store. Mutations made through it are picked up
    /// by revision on the next handler call.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn selected_path(&self) -> &Path {
        &self.selected_path
    }

    pub fn viewport(&self) -> &VirtualViewport {
        &self.viewport
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.selection()
    }

    pub fn editor(&self) -> &CellEditor {
        &self.editor
    }

    pub fn render_state(&self) -> &GridRenderState {
        &self.render_state
    }

    /// Grid shape, refreshed when the document or projection changed.
    pub fn shape(&mut self) -> &GridShape {
        self.refresh();
        &self.shape
    }

    /// Window of the last render.
    pub fn window(&self) -> Option<&VirtualWindow> {
        self.window.as_ref()
    }

    pub fn needs_render(&self) -> bool {
        self.needs_render || self.store.revision() != self.shape_revision
    }

    /// Register a selection-change listener.
    pub fn on_selection_change(&mut self, listener: impl FnMut(&SelectionChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Display the grid context of `path` and select the cell showing it.
    ///
    /// Selections made this way are not echoed to selection listeners.
    pub fn set_selection(&mut self, path: &str) -> Result<()> {
        let path = Path::parse(path)?;
        if self.editor.is_editing() {
            self.commit_edit();
        }
        self.selected_path = path;
        self.shape_stale = true;
        self.refresh();

        let located = self.shape.locate(&self.selected_path);
        debug!(path = %self.selected_path, cell = ?located, "selection set");
        self.selection.clear();
        if let Some(cell) = located {
            self.selection.set(Some(Selection::cell(cell.row, cell.col)));
            self.render_state
                .row_heights
                .ensure_len(self.shape.row_count, self.config.default_row_height);
            self.viewport
                .scroll_row_into_view(&self.render_state.row_heights, cell.row);
        } else {
            self.viewport.scroll_to(0.0, 0.0);
        }
        self.needs_render = true;
        Ok(())
    }

    /// Run one render pass and keep its geometry for hit testing.
    pub fn render(&mut self) -> RenderFrame {
        self.refresh();
        let state = std::mem::take(&mut self.render_state);
        let (frame, state) = render_pass(
            state,
            RenderInput {
                document: self.store.data(),
                selected_path: &self.selected_path,
                viewport: &self.viewport,
                selection: self.selection.selection(),
                config: &self.config,
            },
        );
        self.render_state = state;
        self.viewport
            .clamp_scroll(self.render_state.row_heights.total_height());
        self.shape = frame.shape.clone();
        self.geometry = FrameGeometry {
            column_widths: frame.columns.iter().map(|c| c.width).collect(),
            header_rows: frame.header_rows.clone(),
        };
        self.window = frame.window.clone();
        self.needs_render = false;
        frame
    }

    /// Feed back measured heights of rendered rows starting at `start`.
    /// Corrections take effect on the next render.
    pub fn report_row_heights(&mut self, start: usize, heights: &[f32]) -> usize {
        let changed =
            self.render_state
                .reconcile_row_heights(start, heights, self.config.height_epsilon);
        if changed > 0 {
            debug!(start, changed, "row heights corrected");
            self.needs_render = true;
        }
        changed
    }

    /// Concrete cell paths of the selection rectangle, row-major.
    pub fn selected_paths(&mut self) -> Vec<Vec<Path>> {
        self.refresh();
        self.selection.selected_paths(&self.shape)
    }

    /// Flip the wrap flag of the selected columns and notify listeners.
    /// Returns the new flag.
    pub fn toggle_wrap_selection(&mut self) -> Option<bool> {
        self.refresh();
        let wrapped = self
            .selection
            .toggle_wrap(&self.shape, &mut self.render_state)?;
        self.needs_render = true;
        self.emit_selection_change();
        Some(wrapped)
    }

    pub fn is_selection_wrapped(&mut self) -> bool {
        self.refresh();
        self.selection.is_wrapped(&self.shape, &self.render_state)
    }

    // ------------------------------------------------------------------
    // Column projection overrides
    // ------------------------------------------------------------------

    /// Open a collapsed column.
    pub fn expand_column(&mut self, column: &Path) -> bool {
        self.refresh();
        let Some(def) = self.shape.columns.iter().find(|c| c.path == *column) else {
            return false;
        };
        let id = def.id();
        self.render_state.expand.expand(&id, def.is_array_kind);
        debug!(column = %id, "column expanded");
        self.projection_changed();
        true
    }

    /// Close an expanded column or column group.
    pub fn collapse_column(&mut self, column: &Path) -> bool {
        self.refresh();
        let array_kind = match self.shape.columns.iter().find(|c| c.path == *column) {
            Some(leaf) if leaf.is_collapsible => leaf.is_array_kind,
            Some(_) => return false,
            None if self.shape.columns.iter().any(|c| c.path.starts_with(column)) => {
                group_is_array(&self.shape.columns, column)
            }
            None => return false,
        };
        let id = column.to_relative_string();
        self.render_state.expand.collapse(&id, array_kind);
        debug!(column = %id, "column collapsed");
        self.projection_changed();
        true
    }

    /// Set a user width for a column; returns the stored (clamped) width.
    pub fn resize_column(&mut self, column: &Path, width: f32) -> f32 {
        let id = column.to_relative_string();
        let width =
            self.render_state
                .set_column_width(&id, width, self.config.min_resize_width);
        self.needs_render = true;
        width
    }

    // ------------------------------------------------------------------
    // Row operations (array contexts only)
    // ------------------------------------------------------------------

    pub fn insert_row(&mut self, index: usize) -> bool {
        let Some(array) = self.row_array() else {
            return false;
        };
        let result = self.store.insert_array_element(&array, index);
        self.apply("insert row", result).is_some()
    }

    pub fn remove_row(&mut self, index: usize) -> bool {
        let Some(array) = self.row_array() else {
            return false;
        };
        let result = self.store.remove_array_element(&array, index);
        self.apply("remove row", result).is_some()
    }

    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        let Some(array) = self.row_array() else {
            return false;
        };
        let result = self.store.move_array_element(&array, from, to);
        self.apply("move row", result).is_some()
    }

    // ------------------------------------------------------------------
    // Column operations (key-level, applied to every row)
    // ------------------------------------------------------------------

    /// Insert a new key beside `column`; returns its name.
    pub fn insert_column(&mut self, column: &Path, insert_after: bool) -> Option<String> {
        let (parent, key) = self.column_key(column)?;
        let result = self.store.insert_key(&parent, &key, insert_after);
        self.apply("insert column", result)
    }

    pub fn remove_column(&mut self, column: &Path) -> bool {
        let Some((parent, key)) = self.column_key(column) else {
            return false;
        };
        let result = self.store.remove_key(&parent, &key);
        self.apply("remove column", result).is_some()
    }

    /// Rename the key behind a header. Blank or unchanged names are ignored.
    pub fn rename_column(&mut self, column: &Path, new_name: &str) -> bool {
        let Some((_, old_key)) = self.column_key(column) else {
            return false;
        };
        let Some(new_key) = rename_target(&old_key, new_name) else {
            return false;
        };
        let sub = column.parent().unwrap_or_default();
        let base = self.shape.containing_path.clone();
        let result = self.store.rename_key(&base, &sub, &old_key, &new_key);
        self.apply("rename column", result).is_some()
    }

    /// Move the key of `column` before or after the key of `target`. Both
    /// must share a parent.
    pub fn move_column(&mut self, column: &Path, target: &Path, insert_after: bool) -> bool {
        let Some((parent, key)) = self.column_key(column) else {
            return false;
        };
        let Some((target_parent, target_key)) = self.column_key(target) else {
            return false;
        };
        if parent != target_parent {
            debug!(column = %column, target = %target, "move across groups ignored");
            return false;
        }
        let result = self.store.move_key(&parent, &key, &target_key, insert_after);
        self.apply("move column", result).is_some()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn refresh(&mut self) {
        let revision = self.store.revision();
        if !self.shape_stale && revision == self.shape_revision {
            return;
        }
        let context = GridContext::resolve(self.store.data(), &self.selected_path);
        let columns = project_columns(&context.rows, &self.render_state.expand);
        debug!(
            path = %self.selected_path,
            rows = context.rows.len(),
            columns = columns.len(),
            "grid context resolved"
        );
        self.shape = context.shape(columns);
        self.shape_stale = false;
        self.shape_revision = revision;
        self.needs_render = true;
        self.selection
            .clamp(self.shape.row_count, self.shape.col_count());
    }

    fn projection_changed(&mut self) {
        self.shape_stale = true;
        self.refresh();
    }

    /// Log a rejected mutation; mark the grid stale on success.
    fn apply<T>(&mut self, op: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                debug!(op, "document mutated");
                self.needs_render = true;
                self.refresh();
                Some(value)
            }
            Err(e) => {
                warn!(op, error = %e, "document mutation rejected");
                None
            }
        }
    }

    fn row_array(&mut self) -> Option<String> {
        self.refresh();
        if self.shape.is_array_context {
            Some(self.shape.containing_path.to_string())
        } else {
            debug!(path = %self.shape.containing_path, "row operation outside an array");
            None
        }
    }

    /// Absolute parent path and key name of a keyed column.
    fn column_key(&mut self, column: &Path) -> Option<(Path, String)> {
        self.refresh();
        let Some(Segment::Key(key)) = column.last() else {
            return None;
        };
        let sub = column.parent().unwrap_or_default();
        Some((self.shape.containing_path.join(&sub), key.clone()))
    }

    /// Notify listeners of the current selection.
    fn emit_selection_change(&mut self) {
        let Some(selection) = self.selection.selection() else {
            return;
        };
        let anchor = selection.anchor();
        let change = match selection.header() {
            Some(header) => SelectionChange {
                path: self.shape.cell_path(anchor.row, anchor.col),
                header: Some(header.clone()),
                kind: SelectionKind::Key,
            },
            None => SelectionChange {
                path: self.shape.cell_path(anchor.row, anchor.col),
                header: None,
                kind: SelectionKind::Value,
            },
        };
        for listener in &mut self.listeners {
            listener(&change);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::store::JsonDocument;
    use serde_json::json;

    fn engine() -> GridEngine<JsonDocument> {
        let doc = JsonDocument::new(json!({
            "monsters": [
                {"id": 1, "name": "Slime", "stats": {"hp": 10, "mp": 0}},
                {"id": 2, "name": "Bat", "stats": {"hp": 15, "mp": 3}}
            ]
        }));
        let mut engine = GridEngine::new(doc, GridConfig::default());
        engine.set_selection("root.monsters").unwrap();
        engine
    }

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn test_set_selection_locates_cell() {
        let mut engine = engine();
        engine.set_selection("root.monsters[1].stats.hp").unwrap();
        let sel = engine.selection().unwrap();
        assert_eq!((sel.anchor().row, sel.anchor().col), (1, 2));
        assert_eq!(engine.shape().row_count, 2);
    }

    #[test]
    fn test_set_selection_rejects_bad_path() {
        let mut engine = engine();
        assert!(engine.set_selection("root.a[").is_err());
        assert_eq!(engine.selected_path().to_string(), "root.monsters");
    }

    #[test]
    fn test_collapse_then_expand_group() {
        let mut engine = engine();
        assert!(engine.collapse_column(&p("stats")));
        assert!(engine.render_state().expand.collapsed().contains("stats"));
        let ids: Vec<String> = engine.shape().columns.iter().map(|c| c.id()).collect();
        assert_eq!(ids, ["id", "name", "stats"]);

        assert!(engine.expand_column(&p("stats")));
        assert_eq!(engine.shape().col_count(), 4);
    }

    #[test]
    fn test_column_operations_fan_out() {
        let mut engine = engine();
        assert!(engine.rename_column(&p("stats.hp"), " health "));
        assert_eq!(engine.store().data()["monsters"][1]["stats"]["health"], json!(15));

        assert_eq!(engine.insert_column(&p("name"), true).as_deref(), Some("newKey"));
        assert_eq!(engine.store().data()["monsters"][0]["newKey"], json!(null));

        assert!(engine.remove_column(&p("newKey")));
        assert!(!engine.rename_column(&p("name"), "name"));
    }

    #[test]
    fn test_move_column_needs_shared_parent() {
        let mut engine = engine();
        assert!(!engine.move_column(&p("id"), &p("stats.hp"), false));
        assert!(engine.move_column(&p("id"), &p("name"), true));
        let keys: Vec<&String> = engine.store().data()["monsters"][0]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, ["name", "id", "stats"]);
    }

    #[test]
    fn test_row_operations() {
        let mut engine = engine();
        assert!(engine.insert_row(2));
        assert_eq!(engine.shape().row_count, 3);
        assert!(engine.move_row(2, 0));
        assert!(engine.remove_row(0));
        assert_eq!(engine.shape().row_count, 2);
        assert!(!engine.remove_row(9));
    }

    #[test]
    fn test_row_operations_need_array_context() {
        let mut engine = GridEngine::new(JsonDocument::new(json!({"a": {"b": 1}})), GridConfig::default());
        engine.set_selection("root.a").unwrap();
        assert!(!engine.insert_row(0));
    }

    #[test]
    fn test_report_row_heights_marks_dirty() {
        let mut engine = engine();
        engine.render();
        assert!(!engine.needs_render());
        assert_eq!(engine.report_row_heights(0, &[28.0, 60.0]), 1);
        assert!(engine.needs_render());
        let frame = engine.render();
        assert_eq!(frame.rows[1].height, 60.0);
    }

    #[test]
    fn test_store_mutation_outside_engine_is_picked_up() {
        let mut engine = engine();
        engine.render();
        engine
            .store_mut()
            .insert_array_element("root.monsters", 0)
            .unwrap();
        assert!(engine.needs_render());
        assert_eq!(engine.shape().row_count, 3);
    }

    #[test]
    fn test_resize_column_clamps() {
        let mut engine = engine();
        assert_eq!(engine.resize_column(&p("name"), 1.0), 5.0);
        let frame = engine.render();
        assert_eq!(frame.columns[1].width, 5.0);
    }
}
