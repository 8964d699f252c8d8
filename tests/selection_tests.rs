//! Range selection through the engine: pointer gestures, keyboard
//! navigation, selected paths and change notifications.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{engine_at, monsters, path, selected_strings};
use jsongrid::viewer::{KeyInput, KeyOutcome};
use jsongrid::{CellCoord, HitTarget, SelectionChange, SelectionKind};

fn cell(row: usize, col: usize) -> HitTarget {
    HitTarget::Cell { row, col }
}

fn stats_header() -> HitTarget {
    HitTarget::Header {
        col: 2,
        span: 2,
        path: path("stats"),
        name: "stats".to_string(),
    }
}

#[test]
fn test_drag_selects_rectangle_of_paths() {
    let mut engine = engine_at(monsters(), "root.monsters");
    assert!(engine.pointer_down(&cell(0, 2), false));
    assert!(engine.pointer_move(&cell(1, 3)));
    engine.pointer_up();
    // Moves after release are ignored.
    assert!(!engine.pointer_move(&cell(2, 4)));

    assert_eq!(
        selected_strings(&mut engine),
        vec![
            vec!["root.monsters[0].stats.hp", "root.monsters[0].stats.mp"],
            vec!["root.monsters[1].stats.hp", "root.monsters[1].stats.mp"],
        ]
    );
}

#[test]
fn test_reverse_drag_normalizes() {
    let mut engine = engine_at(monsters(), "root.monsters");
    engine.pointer_down(&cell(2, 1), false);
    engine.pointer_move(&cell(1, 0));
    engine.pointer_up();
    let bounds = engine.selection().unwrap().bounds();
    assert_eq!(
        (bounds.min_row, bounds.min_col, bounds.max_row, bounds.max_col),
        (1, 0, 2, 1)
    );
    assert_eq!(engine.selection().unwrap().anchor().row, 2);
}

#[test]
fn test_header_selects_whole_group() {
    let mut engine = engine_at(monsters(), "root.monsters");
    assert!(engine.pointer_down(&stats_header(), false));
    engine.pointer_up();

    let paths = selected_strings(&mut engine);
    assert_eq!(paths.len(), 3);
    assert_eq!(paths[2], vec!["root.monsters[2].stats.hp", "root.monsters[2].stats.mp"]);
    let header = engine.selection().unwrap().header().unwrap();
    assert_eq!(header.path.to_relative_string(), "stats");
}

#[test]
fn test_row_index_and_corner() {
    let mut engine = engine_at(monsters(), "root.monsters");
    engine.pointer_down(&HitTarget::RowIndex { row: 1 }, false);
    engine.pointer_up();
    let paths = selected_strings(&mut engine);
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].len(), 5);
    assert_eq!(paths[0][0], "root.monsters[1].id");

    // Extending to another row index keeps the full width.
    engine.pointer_down(&HitTarget::RowIndex { row: 2 }, true);
    assert_eq!(selected_strings(&mut engine).len(), 2);

    engine.pointer_down(&HitTarget::Corner, false);
    let paths = selected_strings(&mut engine);
    assert_eq!((paths.len(), paths[0].len()), (3, 5));
}

#[test]
fn test_shift_click_extends_from_anchor() {
    let mut engine = engine_at(monsters(), "root.monsters");
    engine.pointer_down(&cell(0, 0), false);
    engine.pointer_up();
    engine.pointer_down(&cell(2, 1), true);
    engine.pointer_up();
    let bounds = engine.selection().unwrap().bounds();
    assert_eq!((bounds.row_span(), bounds.col_span()), (3, 2));
}

#[test]
fn test_shift_click_row_index_keeps_anchor() {
    let mut engine = engine_at(monsters(), "root.monsters");
    engine.pointer_down(&cell(0, 2), false);
    engine.pointer_up();
    engine.pointer_down(&HitTarget::RowIndex { row: 2 }, true);

    let sel = engine.selection().unwrap();
    assert_eq!(sel.anchor(), CellCoord::new(0, 2));
    assert_eq!(sel.focus(), CellCoord::new(2, 4));
    assert!(sel.header().is_none());
}

#[test]
fn test_shift_click_header_records_key_selection() {
    let mut engine = engine_at(monsters(), "root.monsters");
    let seen: Rc<RefCell<Vec<SelectionChange>>> = Rc::default();
    let sink = Rc::clone(&seen);
    engine.on_selection_change(move |change| sink.borrow_mut().push(change.clone()));

    engine.pointer_down(&cell(1, 0), false);
    engine.pointer_up();
    let name = HitTarget::Header {
        col: 1,
        span: 1,
        path: path("name"),
        name: "name".to_string(),
    };
    engine.pointer_down(&name, true);

    let sel = engine.selection().unwrap();
    assert_eq!(sel.anchor(), CellCoord::new(1, 0));
    assert_eq!(sel.focus(), CellCoord::new(2, 1));
    assert_eq!(sel.header().map(|h| h.name.as_str()), Some("name"));
    assert_eq!(seen.borrow().last().map(|c| c.kind), Some(SelectionKind::Key));
}

#[test]
fn test_wrap_toggle_notifies_listeners() {
    let mut engine = engine_at(monsters(), "root.monsters");
    engine.pointer_down(&cell(0, 1), false);
    engine.pointer_up();

    let seen: Rc<RefCell<Vec<SelectionChange>>> = Rc::default();
    let sink = Rc::clone(&seen);
    engine.on_selection_change(move |change| sink.borrow_mut().push(change.clone()));
    assert_eq!(engine.toggle_wrap_selection(), Some(true));
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(
        seen.borrow()[0].path.as_ref().map(ToString::to_string).as_deref(),
        Some("root.monsters[0].name")
    );
}

#[test]
fn test_arrow_keys_move_and_clamp() {
    let mut engine = engine_at(monsters(), "root.monsters");
    engine.pointer_down(&cell(0, 0), false);
    engine.pointer_up();

    assert_eq!(
        engine.key_down(&KeyInput::new("ArrowDown")),
        KeyOutcome::Moved { row: 1, col: 0 }
    );
    assert_eq!(
        engine.key_down(&KeyInput::new("ArrowLeft")),
        KeyOutcome::Moved { row: 1, col: 0 }
    );
    engine.key_down(&KeyInput::new("ArrowRight").with_shift());
    engine.key_down(&KeyInput::new("ArrowDown").with_shift());
    let bounds = engine.selection().unwrap().bounds();
    assert_eq!((bounds.min_row, bounds.max_row, bounds.min_col, bounds.max_col), (1, 2, 0, 1));

    // A plain arrow collapses the range onto the moved focus.
    assert_eq!(
        engine.key_down(&KeyInput::new("ArrowUp")),
        KeyOutcome::Moved { row: 1, col: 1 }
    );
    assert_eq!(engine.selection().unwrap().bounds().row_span(), 1);
}

#[test]
fn test_listeners_get_value_and_key_changes() {
    let mut engine = engine_at(monsters(), "root.monsters");
    let seen: Rc<RefCell<Vec<SelectionChange>>> = Rc::default();
    let sink = Rc::clone(&seen);
    engine.on_selection_change(move |change| sink.borrow_mut().push(change.clone()));

    engine.pointer_down(&cell(1, 1), false);
    engine.pointer_up();
    engine.pointer_down(&stats_header(), false);
    engine.pointer_up();
    // Programmatic selection is not echoed.
    engine.set_selection("root.monsters[0].id").unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].kind, SelectionKind::Value);
    assert_eq!(
        seen[0].path.as_ref().map(ToString::to_string).as_deref(),
        Some("root.monsters[1].name")
    );
    assert_eq!(seen[1].kind, SelectionKind::Key);
    assert_eq!(
        seen[1].header.as_ref().map(|h| h.name.as_str()),
        Some("stats")
    );
}

#[test]
fn test_set_selection_locates_cells() {
    let mut engine = engine_at(monsters(), "root.monsters");
    engine.set_selection("root.monsters[2].stats.mp").unwrap();
    let anchor = engine.selection().unwrap().anchor();
    assert_eq!((anchor.row, anchor.col), (2, 3));

    // An element of a nested array switches the grid to that array.
    engine.set_selection("root.monsters[1].tags[1]").unwrap();
    assert_eq!(
        engine.shape().containing_path.to_string(),
        "root.monsters[1].tags"
    );
    let anchor = engine.selection().unwrap().anchor();
    assert_eq!((anchor.row, anchor.col), (1, 0));

    engine.set_selection("root.monsters[1].name").unwrap();
    assert!(engine.set_selection("root[").is_err());
    // A failed parse keeps the previous selection.
    assert_eq!(engine.selected_path().to_string(), "root.monsters[1].name");
}

#[test]
fn test_row_removal_clamps_selection() {
    let mut engine = engine_at(monsters(), "root.monsters");
    engine.pointer_down(&cell(2, 4), false);
    engine.pointer_up();
    assert!(engine.remove_row(2));
    let anchor = engine.selection().unwrap().anchor();
    assert_eq!((anchor.row, anchor.col), (1, 4));

    assert!(engine.remove_row(0));
    assert!(engine.remove_row(0));
    assert!(engine.selection().is_none());
    assert!(selected_strings(&mut engine).is_empty());
}

#[test]
fn test_wrap_toggle_covers_selected_columns() {
    let mut engine = engine_at(monsters(), "root.monsters");
    assert_eq!(engine.toggle_wrap_selection(), None);

    engine.pointer_down(&stats_header(), false);
    engine.pointer_up();
    assert_eq!(engine.toggle_wrap_selection(), Some(true));
    assert!(engine.is_selection_wrapped());
    let frame = engine.render();
    let wrapped: Vec<&str> = frame
        .columns
        .iter()
        .filter(|c| c.wrapped)
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(wrapped, vec!["stats.hp", "stats.mp"]);

    assert_eq!(engine.toggle_wrap_selection(), Some(false));
    assert!(!engine.is_selection_wrapped());
}
