//! Deadline and elapsed clocks.
//!
//! Both clocks are pure state machines advanced by `tick()`. Wall-clock
//! scheduling belongs to the host, which receives `arm`/`disarm` requests
//! through [`TimerControl`] and calls back into the controller once per
//! second while a timer is armed.
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::constants::{CLOCK_IDLE_DISPLAY, SECS_PER_MINUTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Deadline,
    Elapsed,
}

/// Host-side scheduler for the one-second tickers.
pub trait TimerControl {
    /// Start ticking `kind` every second. Any schedule already running for
    /// `kind` must be cancelled first so two tickers never overlap.
    fn arm(&mut self, kind: TimerKind);

    /// Stop ticking `kind`. Disarming an idle timer is a no-op.
    fn disarm(&mut self, kind: TimerKind);
}

/// Format seconds as zero-padded `MM:SS`; minutes do not wrap.
#[must_use]
pub fn format_clock(secs: u64) -> String {
    let per_minute = u64::from(SECS_PER_MINUTE);
    format!("{:02}:{:02}", secs / per_minute, secs % per_minute)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum DeadlinePhase {
    #[default]
    Idle,
    Running {
        remaining: u32,
    },
    Expired,
}

/// What a single deadline tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineTick {
    /// Clock was not running.
    Ignored,
    Counting { remaining: u32 },
    Expired,
}

/// Per-mission countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeadlineClock {
    phase: DeadlinePhase,
}

impl DeadlineClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: DeadlinePhase::Idle,
        }
    }

    /// Begin counting down from `duration` seconds, discarding any previous run.
    pub const fn start(&mut self, duration: u32) {
        self.phase = if duration == 0 {
            DeadlinePhase::Expired
        } else {
            DeadlinePhase::Running {
                remaining: duration,
            }
        };
    }

    pub const fn stop(&mut self) {
        self.phase = DeadlinePhase::Idle;
    }

    /// Decrement, then check for zero. A clock started at `n` expires on its `n`-th tick.
    pub const fn tick(&mut self) -> DeadlineTick {
        match self.phase {
            DeadlinePhase::Running { remaining } => {
                let next = remaining.saturating_sub(1);
                if next == 0 {
                    self.phase = DeadlinePhase::Expired;
                    DeadlineTick::Expired
                } else {
                    self.phase = DeadlinePhase::Running { remaining: next };
                    DeadlineTick::Counting { remaining: next }
                }
            }
            DeadlinePhase::Idle | DeadlinePhase::Expired => DeadlineTick::Ignored,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> DeadlinePhase {
        self.phase
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.phase, DeadlinePhase::Running { .. })
    }

    /// Seconds left, or `None` when idle.
    #[must_use]
    pub const fn remaining(&self) -> Option<u32> {
        match self.phase {
            DeadlinePhase::Idle => None,
            DeadlinePhase::Running { remaining } => Some(remaining),
            DeadlinePhase::Expired => Some(0),
        }
    }

    #[must_use]
    pub fn display(&self) -> String {
        self.remaining().map_or_else(
            || CLOCK_IDLE_DISPLAY.to_string(),
            |secs| format_clock(u64::from(secs)),
        )
    }
}

/// Session-wide elapsed time, cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElapsedClock {
    started: bool,
    secs: u64,
}

impl ElapsedClock {
    /// Start the clock. Returns `false` if it was already running.
    pub const fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        true
    }

    pub const fn tick(&mut self) {
        if self.started {
            self.secs = self.secs.saturating_add(1);
        }
    }

    pub const fn reset(&mut self) {
        self.started = false;
        self.secs = 0;
    }

    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub const fn secs(&self) -> u64 {
        self.secs
    }

    #[must_use]
    pub fn display(&self) -> String {
        format_clock(self.secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCall {
    Arm(TimerKind),
    Disarm(TimerKind),
}

#[derive(Debug, Default)]
struct TimerLedger {
    calls: Vec<TimerCall>,
    armed: HashSet<TimerKind>,
}

/// [`TimerControl`] that only records requests. Clones share one ledger, so
/// a test can keep a handle after moving another into the controller.
#[derive(Debug, Clone, Default)]
pub struct RecordingTimers {
    ledger: Rc<RefCell<TimerLedger>>,
}

impl RecordingTimers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<TimerCall> {
        self.ledger.borrow().calls.clone()
    }

    #[must_use]
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.ledger.borrow().armed.contains(&kind)
    }

    /// Number of times `kind` was armed, including restarts.
    #[must_use]
    pub fn arm_count(&self, kind: TimerKind) -> usize {
        self.ledger
            .borrow()
            .calls
            .iter()
            .filter(|call| **call == TimerCall::Arm(kind))
            .count()
    }

    pub fn clear(&self) {
        self.ledger.borrow_mut().calls.clear();
    }
}

impl TimerControl for RecordingTimers {
    fn arm(&mut self, kind: TimerKind) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.calls.push(TimerCall::Arm(kind));
        ledger.armed.insert(kind);
    }

    fn disarm(&mut self, kind: TimerKind) {
        let mut ledger = self.ledger.borrow_mut();
        ledger.calls.push(TimerCall::Disarm(kind));
        ledger.armed.remove(&kind);
    }
}
