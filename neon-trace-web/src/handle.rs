//! JavaScript-facing handle the page script drives.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use log::{debug, warn};
use neon_trace_game::{
    MissionController, StaticMissionLoader, TimerControl, TimerKind, boot_controller,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::storage::WebSessionStore;
use crate::timers::{IntervalTimers, TickCallback};

type WebController = MissionController<WebSessionStore, IntervalTimers>;
type ChangeSlot = Rc<RefCell<Option<Function>>>;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn notify(on_change: &ChangeSlot) {
    let callback = on_change.borrow().clone();
    if let Some(callback) = callback
        && let Err(err) = callback.call0(&JsValue::NULL)
    {
        dom::console_error(&format!(
            "onChange callback failed: {}",
            dom::js_error_message(&err)
        ));
    }
}

fn tick_router(controller: Weak<RefCell<WebController>>, on_change: ChangeSlot) -> TickCallback {
    Rc::new(move |kind| {
        let Some(controller) = controller.upgrade() else {
            return;
        };
        {
            let Ok(mut ctl) = controller.try_borrow_mut() else {
                warn!("{kind:?} tick arrived while the controller was busy");
                return;
            };
            match kind {
                TimerKind::Deadline => {
                    ctl.tick_deadline();
                }
                TimerKind::Elapsed => ctl.tick_elapsed(),
            }
        }
        notify(&on_change);
    })
}

/// Browser host for one game session.
#[wasm_bindgen]
pub struct NeonTraceHandle {
    controller: Rc<RefCell<WebController>>,
    on_change: ChangeSlot,
}

#[wasm_bindgen]
impl NeonTraceHandle {
    /// Boot the engine and silently restore any saved session.
    ///
    /// # Errors
    /// Returns an error if the embedded mission data is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Self, JsValue> {
        let timers = IntervalTimers::new();
        let (controller, outcome) =
            boot_controller(&StaticMissionLoader::default(), WebSessionStore, timers.clone())
                .map_err(|err| JsValue::from_str(&err.to_string()))?;
        debug!("session restore: {outcome:?}");

        let controller = Rc::new(RefCell::new(controller));
        let on_change = ChangeSlot::default();
        timers.set_on_tick(tick_router(
            Rc::downgrade(&controller),
            Rc::clone(&on_change),
        ));
        Ok(Self {
            controller,
            on_change,
        })
    }

    /// Register the callback invoked after every timer-driven transition.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Option<Function>) {
        *self.on_change.borrow_mut() = callback;
    }

    pub fn start(&self) {
        self.controller.borrow_mut().start();
    }

    /// # Errors
    /// Returns an error if the outcome cannot be converted to a JS value.
    pub fn submit(&self, raw: &str) -> Result<JsValue, JsValue> {
        let outcome = self.controller.borrow_mut().submit(raw);
        to_js(&outcome)
    }

    /// # Errors
    /// Returns an error if the outcome cannot be converted to a JS value.
    pub fn trace(&self) -> Result<JsValue, JsValue> {
        let outcome = self.controller.borrow_mut().trace();
        to_js(&outcome)
    }

    /// # Errors
    /// Returns an error if the outcome cannot be converted to a JS value.
    pub fn hint(&self) -> Result<JsValue, JsValue> {
        let outcome = self.controller.borrow_mut().hint();
        to_js(&outcome)
    }

    /// Returns `true` when hard mode is now active.
    #[wasm_bindgen(js_name = toggleMode)]
    pub fn toggle_mode(&self) -> bool {
        self.controller.borrow_mut().toggle_mode()
    }

    pub fn reset(&self) {
        self.controller.borrow_mut().reset();
    }

    /// # Errors
    /// Returns an error if the view cannot be converted to a JS value.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let view = self.controller.borrow().view();
        to_js(&view)
    }

    /// # Errors
    /// Returns an error if the log lines cannot be converted to a JS value.
    #[wasm_bindgen(js_name = drainLog)]
    pub fn drain_log(&self) -> Result<JsValue, JsValue> {
        let lines = self.controller.borrow_mut().drain_log();
        to_js(&lines)
    }

    /// # Errors
    /// Returns an error if the case files cannot be converted to a JS value.
    #[wasm_bindgen(js_name = caseFiles)]
    pub fn case_files(&self) -> Result<JsValue, JsValue> {
        let files = self.controller.borrow().case_files();
        to_js(&files)
    }
}

impl Drop for NeonTraceHandle {
    fn drop(&mut self) {
        if let Ok(ctl) = self.controller.try_borrow() {
            let mut timers = ctl.timers().clone();
            timers.disarm(TimerKind::Deadline);
            timers.disarm(TimerKind::Elapsed);
        }
    }
}
