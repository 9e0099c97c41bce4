#![cfg(target_arch = "wasm32")]

use neon_trace_game::{SessionStore, TimerControl, TimerKind};
use neon_trace_web::{IntervalTimers, NeonTraceHandle, WebSessionStore, dom};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const KEY: &str = "neon-trace";

fn clear_slot() {
    WebSessionStore.remove(KEY).expect("clear slot");
}

fn field(value: &JsValue, name: &str) -> JsValue {
    js_sys::Reflect::get(value, &JsValue::from_str(name)).expect("field")
}

#[wasm_bindgen_test]
fn local_storage_round_trips_the_slot() {
    assert!(dom::window().is_some());
    let mut store = WebSessionStore;
    store.write(KEY, "{}").expect("write");
    assert_eq!(store.read(KEY).expect("read").as_deref(), Some("{}"));
    store.remove(KEY).expect("remove");
    assert_eq!(store.read(KEY).expect("read"), None);
}

#[wasm_bindgen_test]
fn interval_timers_track_armed_state() {
    let mut timers = IntervalTimers::new();
    timers.arm(TimerKind::Deadline);
    assert!(timers.is_armed(TimerKind::Deadline));
    timers.arm(TimerKind::Deadline);
    assert!(timers.is_armed(TimerKind::Deadline));
    timers.disarm(TimerKind::Deadline);
    assert!(!timers.is_armed(TimerKind::Deadline));
    assert!(!timers.is_armed(TimerKind::Elapsed));
}

#[wasm_bindgen_test]
fn handle_plays_first_mission_and_persists() {
    clear_slot();
    let handle = NeonTraceHandle::new().expect("boot");
    let view = handle.view().expect("view");
    assert_eq!(field(&view, "title").as_string().as_deref(), Some("Mission Offline"));

    handle.start();
    let outcome = handle.submit("Stockholm ").expect("submit");
    assert_eq!(
        field(&outcome, "outcome").as_string().as_deref(),
        Some("accepted")
    );
    let view = handle.view().expect("view");
    assert_eq!(
        field(&view, "title").as_string().as_deref(),
        Some("Mission 02: Alias Pivot")
    );
    let saved = WebSessionStore.read(KEY).expect("read").expect("slot");
    assert!(saved.contains(r#""currentIndex":1"#));

    assert!(handle.toggle_mode());
    let lines = handle.drain_log().expect("log");
    assert!(js_sys::Array::is_array(&lines));

    handle.reset();
    assert_eq!(WebSessionStore.read(KEY).expect("read"), None);
}

#[wasm_bindgen_test]
fn handle_restores_saved_session() {
    let mut store = WebSessionStore;
    store
        .write(
            KEY,
            r#"{"queue":[1,2,3,4],"currentIndex":3,"integrity":35,"hardMode":true}"#,
        )
        .expect("seed");
    let handle = NeonTraceHandle::new().expect("boot");
    let view = handle.view().expect("view");
    assert_eq!(
        field(&view, "title").as_string().as_deref(),
        Some("Mission 04: Transit Signal")
    );
    assert_eq!(field(&view, "integrity_alert").as_bool(), Some(true));
    let files = handle.case_files().expect("case files");
    assert_eq!(js_sys::Array::from(&files).length(), 6);
    clear_slot();
}
