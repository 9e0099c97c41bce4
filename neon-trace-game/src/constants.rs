//! Centralized tuning constants and display strings for the mission engine.
//!
//! Gameplay numbers live in [`crate::config::EngineConfig`] defaults; the
//! values here are the fixed strings and bounds the engine never varies.

// Persistence --------------------------------------------------------------
pub(crate) const DEFAULT_STORAGE_KEY: &str = "neon-trace";

// Tuning defaults ----------------------------------------------------------
pub(crate) const STANDARD_DEADLINE_SECS: u32 = 90;
pub(crate) const HARD_DEADLINE_SECS: u32 = 55;
pub(crate) const WRONG_ANSWER_PENALTY: u8 = 5;
pub(crate) const TIMEOUT_PENALTY: u8 = 20;
pub(crate) const INTEGRITY_ALERT_THRESHOLD: u8 = 40;

// Integrity bounds ---------------------------------------------------------
pub const INTEGRITY_MIN: u8 = 0;
pub const INTEGRITY_MAX: u8 = 100;

// Clock display ------------------------------------------------------------
pub(crate) const CLOCK_IDLE_DISPLAY: &str = "--:--";
pub(crate) const SECS_PER_MINUTE: u32 = 60;

// Mission panel copy -------------------------------------------------------
pub(crate) const IDLE_TITLE: &str = "Mission Offline";
pub(crate) const IDLE_PROMPT: &str = "Press Start to load your first case file.";
pub(crate) const COMPLETE_TITLE: &str = "All Missions Complete";
pub(crate) const COMPLETE_PROMPT: &str = "You cleared the grid. Reset to run again.";
pub(crate) const EVIDENCE_PLACEHOLDER: &str = "Signal buffer empty. Run trace.";
pub(crate) const MODE_LABEL_HARD: &str = "Mode: Hard";
pub(crate) const MODE_LABEL_STANDARD: &str = "Mode: Standard";

// Status notes -------------------------------------------------------------
pub(crate) const STATUS_IDLE: &str = "Awaiting mission start.";
pub(crate) const STATUS_LOADED: &str = "Mission loaded. Awaiting analysis.";
pub(crate) const STATUS_COMPLETE: &str = "Extraction successful.";
pub(crate) const STATUS_EMPTY_ANSWER: &str = "Answer field empty.";
pub(crate) const STATUS_ACCEPTED: &str = "Signal confirmed. Moving to next mission.";
pub(crate) const STATUS_REJECTED: &str = "No match. Recheck the evidence.";
pub(crate) const STATUS_TIMEOUT: &str = "Timeout. Moving to next mission.";
pub(crate) const STATUS_HINT: &str = "Hint delivered. Stay sharp.";
