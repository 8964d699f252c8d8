//! Grid projection pipeline.
//!
//! One render pass runs: grid context → column projection → column metrics →
//! virtual window → materialized rows. Everything that outlives a pass (the
//! expand overrides, the column-width map, the row-height cache and the wrap
//! flags) lives in [`GridRenderState`], which the pass takes by value and
//! hands back.

mod context;
mod header;
mod metrics;
mod projector;

pub use context::{GridContext, GridShape};
pub use header::{build_header_rows, header_depth};
pub use metrics::{
    bar_ratio, display_text, measure_column, measure_columns, numeric_value, visual_width,
    ColumnMetrics,
};
pub use projector::{group_is_array, project_columns, ExpandState};

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::GridConfig;
use crate::layout::{RowHeightCache, VirtualViewport, VirtualWindow};
use crate::path::Path;
use crate::types::{ColumnDefinition, HeaderCell, Selection, SelectionBounds};

/// State carried from one render pass to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridRenderState {
    pub expand: ExpandState,
    /// User-set widths keyed by column id
    pub column_widths: HashMap<String, f32>,
    pub row_heights: RowHeightCache,
    /// Ids of columns whose cells wrap
    pub wrapped_columns: HashSet<String>,
}

impl GridRenderState {
    pub fn is_wrapped(&self, column_id: &str) -> bool {
        self.wrapped_columns.contains(column_id)
    }

    /// Set the wrap flag of a column. Wrapping changes row heights, so the
    /// height cache is dropped.
    pub fn set_wrapped(&mut self, column_id: &str, wrapped: bool) {
        if wrapped {
            self.wrapped_columns.insert(column_id.to_string());
        } else {
            self.wrapped_columns.remove(column_id);
        }
        self.row_heights.clear();
    }

    /// Store a user-set width, clamped to `min_width`.
    pub fn set_column_width(&mut self, column_id: &str, width: f32, min_width: f32) -> f32 {
        let width = if width.is_finite() { width.max(min_width) } else { min_width };
        self.column_widths.insert(column_id.to_string(), width);
        width
    }

    /// Apply post-render measurements for rows starting at `start`.
    /// Returns the number of corrected rows.
    pub fn reconcile_row_heights(&mut self, start: usize, measured: &[f32], epsilon: f32) -> usize {
        self.row_heights.reconcile(start, measured, epsilon)
    }
}

/// Borrowed inputs of one render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub document: &'a Value,
    /// Path whose grid context is displayed
    pub selected_path: &'a Path,
    pub viewport: &'a VirtualViewport,
    pub selection: Option<&'a Selection>,
    pub config: &'a GridConfig,
}

/// JSON type of a cell value, for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Null,
    Array,
    Object,
    Missing,
}

impl ValueKind {
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None => Self::Missing,
            Some(Value::Null) => Self::Null,
            Some(Value::Bool(_)) => Self::Boolean,
            Some(Value::Number(_)) => Self::Number,
            Some(Value::String(_)) => Self::String,
            Some(Value::Array(_)) => Self::Array,
            Some(Value::Object(_)) => Self::Object,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFrame {
    #[serde(flatten)]
    pub def: ColumnDefinition,
    pub id: String,
    pub width: f32,
    pub max_value: Option<f64>,
    pub wrapped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFrame {
    pub path: Path,
    pub text: String,
    pub kind: ValueKind,
    /// Proportional bar length in `[0, 1]`
    pub bar: Option<f64>,
    /// Inside the selection rectangle
    pub selected: bool,
    /// The anchor cell
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFrame {
    pub index: usize,
    pub path: Path,
    /// Cached height used for this pass
    pub height: f32,
    pub cells: Vec<CellFrame>,
}

/// Everything the render surface needs to draw one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub shape: GridShape,
    pub columns: Vec<ColumnFrame>,
    pub header_rows: Vec<Vec<HeaderCell>>,
    pub header_height: f32,
    pub index_column_width: f32,
    /// `None` when there are no rows
    pub window: Option<VirtualWindow>,
    pub rows: Vec<RowFrame>,
    pub selection: Option<SelectionBounds>,
    pub total_width: f32,
    pub scroll_offset: f32,
}

impl RenderFrame {
    pub fn materialized_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Run one render pass.
///
/// The row-height cache is reset when the row count changed; it is otherwise
/// read as corrected by earlier measurements. The window is computed from
/// the cache as it stands, so measurements reported after this pass only
/// take effect on the next one.
pub fn render_pass(
    mut state: GridRenderState,
    input: RenderInput<'_>,
) -> (RenderFrame, GridRenderState) {
    let config = input.config;
    let context = GridContext::resolve(input.document, input.selected_path);
    let columns = project_columns(&context.rows, &state.expand);
    let metrics = measure_columns(&context.rows, &columns, &state.column_widths, config);

    if state
        .row_heights
        .ensure_len(context.rows.len(), config.default_row_height)
    {
        debug!(rows = context.rows.len(), "row height cache reset");
    }
    let window = input.viewport.window(&state.row_heights);

    let column_frames: Vec<ColumnFrame> = columns
        .iter()
        .zip(&metrics)
        .map(|(def, m)| {
            let id = def.id();
            ColumnFrame {
                wrapped: state.is_wrapped(&id),
                def: def.clone(),
                id,
                width: m.width,
                max_value: m.max_value,
            }
        })
        .collect();

    let shape = context.shape(columns);
    let selection = input
        .selection
        .and_then(|s| s.clamped(shape.row_count, shape.col_count()));
    let bounds = selection.as_ref().map(Selection::bounds);
    let active = selection.as_ref().map(Selection::anchor);

    let rows: Vec<RowFrame> = window
        .iter()
        .flat_map(VirtualWindow::rows)
        .filter_map(|index| {
            let row_value = *context.rows.get(index)?;
            let path = shape.row_path(index)?;
            let cells = column_frames
                .iter()
                .enumerate()
                .map(|(col, column)| {
                    let value = column.def.path.resolve(row_value);
                    CellFrame {
                        path: path.join(&column.def.path),
                        text: display_text(value),
                        kind: ValueKind::of(value),
                        bar: bar_ratio(value, column.max_value),
                        selected: bounds.is_some_and(|b| b.contains(index, col)),
                        active: active.is_some_and(|a| a.row == index && a.col == col),
                    }
                })
                .collect();
            Some(RowFrame {
                index,
                path,
                height: state.row_heights.height(index).unwrap_or(config.default_row_height),
                cells,
            })
        })
        .collect();

    let header_rows = build_header_rows(&shape.columns);
    let total_width = config.index_column_width + column_frames.iter().map(|c| c.width).sum::<f32>();

    debug!(
        path = %input.selected_path,
        rows = shape.row_count,
        columns = shape.col_count(),
        window = ?window.as_ref().map(|w| (w.start, w.end)),
        "render pass"
    );

    let frame = RenderFrame {
        header_height: config.header_height * header_rows.len().max(1) as f32,
        index_column_width: config.index_column_width,
        scroll_offset: window.as_ref().map_or(0.0, |_| {
            input
                .viewport
                .scroll_offset
                .clamp(0.0, input.viewport.max_scroll(state.row_heights.total_height()))
        }),
        shape,
        columns: column_frames,
        header_rows,
        window,
        rows,
        selection: bounds,
        total_width,
    };
    (frame, state)
}
