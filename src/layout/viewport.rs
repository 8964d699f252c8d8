//! Virtual viewport: which rows to materialize for the current scroll position.

use std::ops::RangeInclusive;

use serde::Serialize;

use super::RowHeightCache;

/// Materialized row range plus the spacer sizes that stand in for the rest.
///
/// `spacer_top + sum(heights[start..=end]) + spacer_bottom == total_height`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualWindow {
    pub start: usize,
    /// Inclusive
    pub end: usize,
    pub spacer_top: f32,
    pub spacer_bottom: f32,
    pub total_height: f32,
}

impl VirtualWindow {
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Number of materialized rows (at least one).
    pub fn row_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Scroll state of the row area.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualViewport {
    /// Vertical scroll position in content coordinates (px)
    pub scroll_offset: f32,
    /// Visible height of the row area (px)
    pub height: f32,
    /// Extra rows materialized beyond each visible edge
    pub buffer_rows: usize,
}

impl Default for VirtualViewport {
    fn default() -> Self {
        Self::new(600.0, 5)
    }
}

impl VirtualViewport {
    pub fn new(height: f32, buffer_rows: usize) -> Self {
        Self {
            scroll_offset: 0.0,
            height: height.max(0.0),
            buffer_rows,
        }
    }

    /// Largest valid scroll offset for content of `total_height`.
    pub fn max_scroll(&self, total_height: f32) -> f32 {
        (total_height - self.height).max(0.0)
    }

    /// Clamp scroll position to `[0, max_scroll]`. Non-finite offsets reset to 0.
    pub fn clamp_scroll(&mut self, total_height: f32) {
        self.scroll_offset = self.clamped_offset(total_height);
    }

    /// Set absolute scroll position
    pub fn scroll_to(&mut self, offset: f32, total_height: f32) {
        self.scroll_offset = offset;
        self.clamp_scroll(total_height);
    }

    /// Scroll by delta amount
    pub fn scroll_by(&mut self, delta: f32, total_height: f32) {
        self.scroll_offset += delta;
        self.clamp_scroll(total_height);
    }

    /// Resize the viewport
    pub fn resize(&mut self, height: f32) {
        self.height = if height.is_finite() { height.max(0.0) } else { 0.0 };
    }

    /// Scroll the minimum distance that brings `row` fully into view.
    ///
    /// Returns `true` when the offset changed.
    pub fn scroll_row_into_view(&mut self, rows: &RowHeightCache, row: usize) -> bool {
        if row >= rows.len() {
            return false;
        }
        let before = self.scroll_offset;
        let top = rows.offset(row);
        let bottom = rows.offset(row + 1);
        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if bottom > self.scroll_offset + self.height {
            self.scroll_offset = bottom - self.height;
        }
        self.clamp_scroll(rows.total_height());
        (self.scroll_offset - before).abs() > f32::EPSILON
    }

    /// Compute the materialized window, or `None` when there are no rows.
    ///
    /// The window starts `buffer_rows` before the first row intersecting the
    /// viewport. It ends `buffer_rows` after the last fully visible row, and
    /// never before the last partially visible one.
    pub fn window(&self, rows: &RowHeightCache) -> Option<VirtualWindow> {
        let last_row = rows.len().checked_sub(1)?;
        let total_height = rows.total_height();
        let scroll = self.clamped_offset(total_height);
        let bottom = scroll + self.height;

        let first = rows.row_at_offset(scroll)?;
        let offsets = rows.offsets();
        let last_partial = offsets
            .partition_point(|&o| o < bottom)
            .saturating_sub(1)
            .clamp(first, last_row);
        let ends = offsets.get(1..).unwrap_or_default();
        let end = match ends.partition_point(|&e| e <= bottom).checked_sub(1) {
            Some(last_full) => last_full.saturating_add(self.buffer_rows).max(last_partial),
            None => last_partial,
        }
        .min(last_row);
        let start = first.saturating_sub(self.buffer_rows);

        Some(VirtualWindow {
            start,
            end,
            spacer_top: rows.offset(start),
            spacer_bottom: (total_height - rows.offset(end + 1)).max(0.0),
            total_height,
        })
    }

    fn clamped_offset(&self, total_height: f32) -> f32 {
        if self.scroll_offset.is_finite() {
            self.scroll_offset.clamp(0.0, self.max_scroll(total_height))
        } else {
            0.0
        }
    }
}
