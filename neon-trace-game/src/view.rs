//! Render-ready snapshot of the mission panel.
use serde::{Deserialize, Serialize};

use crate::state::SessionPhase;

/// Everything a renderer needs after a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionView {
    pub phase: SessionPhase,
    pub title: String,
    pub prompt: String,
    /// Revealed evidence joined by newlines, the placeholder, or empty.
    pub evidence: String,
    pub status: String,
    pub progress_label: String,
    pub progress_ratio: f64,
    pub deadline: String,
    pub deadline_remaining: Option<u32>,
    pub elapsed: String,
    pub elapsed_secs: u64,
    pub integrity: u8,
    pub integrity_label: String,
    pub integrity_alert: bool,
    pub inputs_enabled: bool,
    pub hard_mode: bool,
    pub mode_label: String,
    /// Bumped on every mission load; the answer box should be cleared when it changes.
    pub load_generation: u64,
    /// Bumped on reset; the terminal should be cleared when it changes.
    pub log_epoch: u64,
}

#[must_use]
pub fn progress_label(done: usize, total: usize) -> String {
    format!("{done} / {total}")
}

#[must_use]
pub fn integrity_label(integrity: u8) -> String {
    format!("{integrity}%")
}
