//! `setInterval`-backed one-second tickers.
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::warn;
use neon_trace_game::{TimerControl, TimerKind};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::dom;

const TICK_MS: i32 = 1_000;

/// Invoked once per second for every armed timer.
pub type TickCallback = Rc<dyn Fn(TimerKind)>;

struct Ticker {
    // Lives as long as the schedule; a tick may re-arm its own timer.
    closure: Closure<dyn FnMut()>,
    interval: Option<i32>,
}

#[derive(Default)]
struct Schedule {
    on_tick: Option<TickCallback>,
    tickers: HashMap<TimerKind, Ticker>,
}

/// [`TimerControl`] over `window.setInterval`. Clones share one schedule.
#[derive(Clone, Default)]
pub struct IntervalTimers {
    schedule: Rc<RefCell<Schedule>>,
}

impl IntervalTimers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route ticks to `callback`. Ticks fired before a callback is set are dropped.
    pub fn set_on_tick(&self, callback: TickCallback) {
        self.schedule.borrow_mut().on_tick = Some(callback);
    }

    #[must_use]
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.schedule
            .borrow()
            .tickers
            .get(&kind)
            .is_some_and(|ticker| ticker.interval.is_some())
    }

    fn tick_closure(schedule: Weak<RefCell<Schedule>>, kind: TimerKind) -> Closure<dyn FnMut()> {
        Closure::wrap(Box::new(move || {
            let Some(schedule) = schedule.upgrade() else {
                return;
            };
            let callback = schedule.borrow().on_tick.clone();
            if let Some(callback) = callback {
                callback(kind);
            }
        }) as Box<dyn FnMut()>)
    }
}

impl TimerControl for IntervalTimers {
    fn arm(&mut self, kind: TimerKind) {
        let Some(window) = dom::window() else {
            warn!("cannot arm {kind:?} timer without a window");
            return;
        };
        let weak = Rc::downgrade(&self.schedule);
        let mut schedule = self.schedule.borrow_mut();
        let ticker = schedule.tickers.entry(kind).or_insert_with(|| Ticker {
            closure: Self::tick_closure(weak, kind),
            interval: None,
        });
        if let Some(id) = ticker.interval.take() {
            window.clear_interval_with_handle(id);
        }
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            ticker.closure.as_ref().unchecked_ref(),
            TICK_MS,
        ) {
            Ok(id) => ticker.interval = Some(id),
            Err(err) => {
                dom::console_error(&format!(
                    "failed to arm {kind:?} timer: {}",
                    dom::js_error_message(&err)
                ));
            }
        }
    }

    fn disarm(&mut self, kind: TimerKind) {
        let mut schedule = self.schedule.borrow_mut();
        let Some(id) = schedule
            .tickers
            .get_mut(&kind)
            .and_then(|ticker| ticker.interval.take())
        else {
            return;
        };
        if let Some(window) = dom::window() {
            window.clear_interval_with_handle(id);
        }
    }
}

impl Drop for Schedule {
    fn drop(&mut self) {
        let live: Vec<i32> = self
            .tickers
            .values_mut()
            .filter_map(|ticker| ticker.interval.take())
            .collect();
        if live.is_empty() {
            return;
        }
        if let Some(window) = dom::window() {
            for id in live {
                window.clear_interval_with_handle(id);
            }
        }
    }
}
