//! Row layout for the virtualized grid.
//!
//! This module handles:
//! - Cached row heights and their prefix-sum offsets
//! - Binary search for the row at a scroll offset
//! - Viewport state (scroll position, height) and the materialized row window

mod row_heights;
mod viewport;

pub use row_heights::RowHeightCache;
pub use viewport::{VirtualViewport, VirtualWindow};
