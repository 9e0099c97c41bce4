//! Browser host for the Neon Trace mission engine.
//!
//! The page script constructs a [`NeonTraceHandle`], renders from `view()`
//! and `drainLog()`, and re-renders from the `onChange` callback whenever a
//! timer tick moves the session forward.
#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod dom;
pub mod handle;
pub mod storage;
pub mod timers;

pub use handle::NeonTraceHandle;
pub use storage::{WebSessionStore, WebStoreError};
pub use timers::{IntervalTimers, TickCallback};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
