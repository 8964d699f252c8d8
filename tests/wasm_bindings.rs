//! Smoke tests of the JavaScript surface. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use jsongrid::JsonGridView;
use serde_json::{json, Value};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const DOC: &str = r#"{"monsters": [{"id": 1, "hp": 10}, {"id": 2, "hp": 15}]}"#;

fn frame(view: &mut JsonGridView) -> Value {
    serde_wasm_bindgen::from_value(view.render().unwrap()).unwrap()
}

#[wasm_bindgen_test]
fn renders_selected_array() {
    let mut view = JsonGridView::new(DOC, JsValue::UNDEFINED).unwrap();
    view.set_selection("root.monsters").unwrap();
    let frame = frame(&mut view);
    assert_eq!(frame["shape"]["rowCount"], json!(2));
    assert_eq!(frame["columns"][1]["id"], json!("hp"));
    assert_eq!(frame["rows"][1]["cells"][1]["text"], json!("15"));
}

#[wasm_bindgen_test]
fn edits_through_keyboard() {
    let mut view = JsonGridView::new(DOC, JsValue::UNDEFINED).unwrap();
    view.set_selection("root.monsters[0].hp").unwrap();
    view.key_down("7", false, false, false, false).unwrap();
    view.key_down("Enter", false, false, false, false).unwrap();
    let doc: Value = serde_json::from_str(&view.to_json().unwrap()).unwrap();
    assert_eq!(doc["monsters"][0]["hp"], json!(7));
}

#[wasm_bindgen_test]
fn rejects_bad_input() {
    assert!(JsonGridView::new("{", JsValue::UNDEFINED).is_err());
    let mut view = JsonGridView::new(DOC, JsValue::NULL).unwrap();
    assert!(view.set_selection("root[").is_err());
    assert!(view.expand_column("a[").is_err());
}
