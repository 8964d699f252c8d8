//! Row virtualization: height cache, window computation and engine scrolling.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]

mod common;

use common::{engine_at, numbered_rows};
use jsongrid::layout::{RowHeightCache, VirtualViewport};
use test_case::test_case;

/// Spacers plus materialized heights must cover the content exactly.
fn assert_window_covers(cache: &RowHeightCache, viewport: &VirtualViewport) {
    let window = viewport.window(cache).unwrap();
    let materialized: f32 = window.rows().filter_map(|r| cache.height(r)).sum();
    let covered = window.spacer_top + materialized + window.spacer_bottom;
    assert!(
        (covered - window.total_height).abs() < 0.01,
        "covered {covered} vs total {}",
        window.total_height
    );
}

// ============================================================================
// Window computation
// ============================================================================

#[test_case(0.0, 0, 24 ; "top")]
#[test_case(280.0, 5, 34 ; "ten rows down")]
#[test_case(294.0, 5, 34 ; "partial first row")]
#[test_case(1_000_000.0, 975, 999 ; "past the end clamps")]
fn test_uniform_window(scroll: f32, start: usize, end: usize) {
    let cache = RowHeightCache::with_rows(1000, 28.0);
    let mut viewport = VirtualViewport::new(560.0, 5);
    viewport.scroll_to(scroll, cache.total_height());

    let window = viewport.window(&cache).unwrap();
    assert_eq!((window.start, window.end), (start, end));
    assert!(window.row_count() <= 20 + 2 * 5);
    assert_window_covers(&cache, &viewport);
}

#[test]
fn test_window_with_measured_heights() {
    let mut cache = RowHeightCache::with_rows(50, 28.0);
    assert_eq!(cache.reconcile(0, &[100.0, 100.0, 28.2, 100.0], 0.5), 3);
    assert_eq!(cache.total_height(), 47.0 * 28.0 + 300.0);

    let viewport = VirtualViewport::new(250.0, 2);
    let window = viewport.window(&cache).unwrap();
    assert_eq!(window.start, 0);
    // Rows 0..=2 fit (row 2 ends at 228); row 3 is cut off.
    assert_eq!(window.end, 2 + 2);
    assert_window_covers(&cache, &viewport);
}

#[test]
fn test_viewport_taller_than_content() {
    let cache = RowHeightCache::with_rows(3, 28.0);
    let mut viewport = VirtualViewport::new(600.0, 5);
    viewport.scroll_to(50.0, cache.total_height());
    assert_eq!(viewport.scroll_offset, 0.0);
    let window = viewport.window(&cache).unwrap();
    assert_eq!((window.start, window.end), (0, 2));
    assert_eq!(window.spacer_bottom, 0.0);
}

#[test]
fn test_empty_cache_has_no_window() {
    let viewport = VirtualViewport::new(600.0, 5);
    assert!(viewport.window(&RowHeightCache::new()).is_none());
}

#[test]
fn test_row_at_offset_boundaries() {
    let mut cache = RowHeightCache::with_rows(4, 10.0);
    cache.reconcile(1, &[30.0], 0.5);
    assert_eq!(cache.row_at_offset(0.0), Some(0));
    assert_eq!(cache.row_at_offset(9.9), Some(0));
    assert_eq!(cache.row_at_offset(10.0), Some(1));
    assert_eq!(cache.row_at_offset(39.9), Some(1));
    assert_eq!(cache.row_at_offset(40.0), Some(2));
    assert_eq!(cache.row_at_offset(500.0), Some(3));
}

// ============================================================================
// Engine scrolling
// ============================================================================

#[test]
fn test_thousand_rows_materialize_a_small_window() {
    let mut engine = engine_at(numbered_rows(1000), "root.rows");
    engine.resize_viewport(560.0);

    let frame = engine.render();
    assert_eq!(frame.shape.row_count, 1000);
    assert_eq!(frame.rows.first().map(|r| r.index), Some(0));
    assert!(frame.materialized_rows() <= 30);

    assert!(engine.scroll_to(f32::MAX));
    let frame = engine.render();
    assert!(frame.materialized_rows() <= 30);
    assert_eq!(frame.rows.last().map(|r| r.index), Some(999));
    assert_eq!(frame.scroll_offset, 1000.0 * 28.0 - 560.0);
    assert_eq!(frame.window.as_ref().unwrap().spacer_bottom, 0.0);
}

#[test]
fn test_scroll_by_clamps_at_both_ends() {
    let mut engine = engine_at(numbered_rows(100), "root.rows");
    engine.resize_viewport(560.0);
    assert!(!engine.scroll_by(-50.0));
    assert!(engine.scroll_by(100.0));
    assert_eq!(engine.viewport().scroll_offset, 100.0);
    assert!(engine.scroll_by(1.0e6));
    assert_eq!(engine.viewport().scroll_offset, 2800.0 - 560.0);
    assert!(!engine.scroll_by(10.0));
}

#[test]
fn test_reported_heights_apply_on_next_render() {
    let mut engine = engine_at(numbered_rows(10), "root.rows");
    let before = engine.render();
    assert_eq!(before.window.as_ref().unwrap().total_height, 280.0);
    assert!(!engine.needs_render());

    assert_eq!(engine.report_row_heights(2, &[60.0, 28.1, f32::NAN]), 1);
    assert!(engine.needs_render());
    let after = engine.render();
    assert_eq!(after.window.as_ref().unwrap().total_height, 312.0);
    assert_eq!(after.rows[2].height, 60.0);
    assert_eq!(after.rows[3].height, 28.0);
}

#[test]
fn test_row_count_change_resets_heights() {
    let mut engine = engine_at(numbered_rows(3), "root.rows");
    engine.render();
    engine.report_row_heights(0, &[90.0]);
    assert_eq!(engine.content_height(), 90.0 + 56.0);

    assert!(engine.insert_row(0));
    assert_eq!(engine.content_height(), 4.0 * 28.0);
}

#[test]
fn test_selecting_a_far_row_scrolls_it_into_view() {
    let mut engine = engine_at(numbered_rows(500), "root.rows");
    engine.resize_viewport(280.0);
    engine.set_selection("root.rows[300].label").unwrap();
    let offset = engine.viewport().scroll_offset;
    assert_eq!(offset, 301.0 * 28.0 - 280.0);

    let frame = engine.render();
    let active = frame
        .rows
        .iter()
        .flat_map(|r| &r.cells)
        .find(|c| c.active)
        .unwrap();
    assert_eq!(active.path.to_string(), "root.rows[300].label");
}
