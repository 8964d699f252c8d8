//! Row height cache with prefix-sum offsets.
//!
//! Heights start at an estimate and are corrected by post-render
//! measurement. Offsets are kept in sync so offset and hit lookups are
//! O(log n).

/// Per-row heights plus cumulative offsets (`offsets[i]` = top of row `i`,
/// `offsets[n]` = total height).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowHeightCache {
    heights: Vec<f32>,
    offsets: Vec<f32>,
}

impl RowHeightCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache of `rows` entries, all at `height`.
    pub fn with_rows(rows: usize, height: f32) -> Self {
        let mut cache = Self::default();
        cache.ensure_len(rows, height);
        cache
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Reset to `rows` entries of `default_height` when the row count changed.
    ///
    /// Returns `true` when the cache was reset.
    pub fn ensure_len(&mut self, rows: usize, default_height: f32) -> bool {
        if self.heights.len() == rows && self.offsets.len() == rows + 1 {
            return false;
        }
        self.heights = vec![default_height; rows];
        self.recompute_offsets();
        true
    }

    /// Drop all measurements; the next `ensure_len` starts from estimates.
    pub fn clear(&mut self) {
        self.heights.clear();
        self.offsets.clear();
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    pub fn height(&self, row: usize) -> Option<f32> {
        self.heights.get(row).copied()
    }

    /// Top edge of `row`; rows past the end map to the total height.
    pub fn offset(&self, row: usize) -> f32 {
        self.offsets
            .get(row)
            .copied()
            .unwrap_or_else(|| self.total_height())
    }

    pub fn total_height(&self) -> f32 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    /// Find row at y offset (binary search over offsets)
    pub fn row_at_offset(&self, y: f32) -> Option<usize> {
        let last = self.heights.len().checked_sub(1)?;
        let idx = self.offsets.partition_point(|&o| o <= y);
        Some(idx.saturating_sub(1).min(last))
    }

    /// Overwrite heights of rows `start..start + measured.len()` that differ
    /// from the cache by more than `epsilon`.
    ///
    /// Non-finite or negative measurements and rows past the end are
    /// ignored. Returns the number of corrected rows.
    pub fn reconcile(&mut self, start: usize, measured: &[f32], epsilon: f32) -> usize {
        let mut changed = 0;
        for (row, &height) in (start..).zip(measured) {
            if !height.is_finite() || height < 0.0 {
                continue;
            }
            let Some(cached) = self.heights.get_mut(row) else {
                break;
            };
            if (*cached - height).abs() > epsilon {
                *cached = height;
                changed += 1;
            }
        }
        if changed > 0 {
            self.recompute_offsets();
        }
        changed
    }

    fn recompute_offsets(&mut self) {
        let mut offsets = Vec::with_capacity(self.heights.len() + 1);
        let mut y: f32 = 0.0;
        for &h in &self.heights {
            offsets.push(y);
            y += h;
        }
        offsets.push(y); // Final edge
        self.offsets = offsets;
    }
}
