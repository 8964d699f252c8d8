//! Grid configuration: sizing constants and virtualization parameters.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Tunables for projection sizing and the virtual viewport.
///
/// Every field is optional in the serialized form; missing fields take the
/// default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Row height estimate used before a row has been measured (px)
    pub default_row_height: f32,
    /// Rows materialized beyond each edge of the visible range
    pub buffer_rows: usize,
    /// Height of one header level (px)
    pub header_height: f32,
    /// Width of the row index column (px)
    pub index_column_width: f32,
    /// Pixels per unit of visual width
    pub char_width: f32,
    /// Horizontal padding added to measured content (px)
    pub cell_padding: f32,
    /// Lower bound of auto-sized columns (px)
    pub min_column_width: f32,
    /// Upper bound of auto-sized columns (px)
    pub max_column_width: f32,
    /// Smallest width a user resize may produce (px)
    pub min_resize_width: f32,
    /// Measured heights within this distance of the cached value are ignored (px)
    pub height_epsilon: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_row_height: 28.0,
            buffer_rows: 5,
            header_height: 28.0,
            index_column_width: 40.0,
            char_width: 8.0,
            cell_padding: 24.0,
            min_column_width: 60.0,
            max_column_width: 400.0,
            min_resize_width: 5.0,
            height_epsilon: 0.5,
        }
    }
}

impl GridConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the viewport and metrics cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.default_row_height.is_finite() && self.default_row_height > 0.0) {
            return Err(GridError::Config(format!(
                "defaultRowHeight must be positive, got {}",
                self.default_row_height
            )));
        }
        if !(self.min_column_width.is_finite() && self.max_column_width.is_finite()) {
            return Err(GridError::Config("column width bounds must be finite".into()));
        }
        if self.min_column_width > self.max_column_width {
            return Err(GridError::Config(format!(
                "minColumnWidth ({}) exceeds maxColumnWidth ({})",
                self.min_column_width, self.max_column_width
            )));
        }
        if self.min_resize_width < 0.0 || self.char_width < 0.0 || self.cell_padding < 0.0 {
            return Err(GridError::Config(
                "minResizeWidth, charWidth and cellPadding must not be negative".into(),
            ));
        }
        if self.height_epsilon.is_nan() || self.height_epsilon < 0.0 {
            return Err(GridError::Config(format!(
                "heightEpsilon must not be negative, got {}",
                self.height_epsilon
            )));
        }
        Ok(())
    }
}
