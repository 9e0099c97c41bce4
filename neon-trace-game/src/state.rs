use serde::{Deserialize, Serialize};

use crate::constants::INTEGRITY_MAX;
use crate::data::MissionId;
use crate::numbers::apply_integrity_delta;
use crate::store::{RestorePatch, SessionSnapshot};

/// Which screen the mission panel is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Nothing loaded yet, or just reset.
    Idle,
    Active,
    /// Queue exhausted.
    Complete,
}

/// Mutable progression state for one session.
///
/// Invariants: `current_index <= queue.len()` and `integrity <= 100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    queue: Vec<MissionId>,
    current_index: usize,
    integrity: u8,
    hard_mode: bool,
    trace_shown: bool,
}

impl SessionState {
    #[must_use]
    pub fn fresh(base_queue: &[MissionId]) -> Self {
        Self {
            queue: base_queue.to_vec(),
            current_index: 0,
            integrity: INTEGRITY_MAX,
            hard_mode: false,
            trace_shown: false,
        }
    }

    #[must_use]
    pub fn queue(&self) -> &[MissionId] {
        &self.queue
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub const fn integrity(&self) -> u8 {
        self.integrity
    }

    #[must_use]
    pub const fn hard_mode(&self) -> bool {
        self.hard_mode
    }

    #[must_use]
    pub const fn trace_shown(&self) -> bool {
        self.trace_shown
    }

    /// Id at the current position, `None` once the queue is exhausted.
    #[must_use]
    pub fn current_id(&self) -> Option<MissionId> {
        self.queue.get(self.current_index).copied()
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.current_index >= self.queue.len()
    }

    /// Move to the next queue entry, saturating at the terminal position.
    pub fn advance(&mut self) {
        if self.current_index < self.queue.len() {
            self.current_index += 1;
        }
    }

    /// Splice `bonus` in right after the current mission unless it is queued anywhere already.
    pub fn insert_bonus(&mut self, bonus: MissionId) -> bool {
        if self.queue.contains(&bonus) {
            return false;
        }
        let at = (self.current_index + 1).min(self.queue.len());
        self.queue.insert(at, bonus);
        true
    }

    /// Subtract `amount` from integrity, flooring at zero. Returns the new value.
    pub fn penalize(&mut self, amount: u8) -> u8 {
        self.integrity = apply_integrity_delta(self.integrity, -i32::from(amount));
        self.integrity
    }

    /// Flip the difficulty flag, returning the new value.
    pub const fn toggle_hard_mode(&mut self) -> bool {
        self.hard_mode = !self.hard_mode;
        self.hard_mode
    }

    /// Mark evidence as revealed. Returns `false` if it already was.
    pub const fn mark_traced(&mut self) -> bool {
        if self.trace_shown {
            return false;
        }
        self.trace_shown = true;
        true
    }

    pub const fn clear_trace(&mut self) {
        self.trace_shown = false;
    }

    /// `(completed, total)` for the progress indicator.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.current_index.min(self.queue.len()), self.queue.len())
    }

    /// Merge the well-typed fields of a restored blob. The index is clamped
    /// against the (possibly replaced) queue afterwards.
    pub fn apply_patch(&mut self, patch: RestorePatch) {
        if let Some(queue) = patch.queue {
            self.queue = queue;
        }
        if let Some(index) = patch.current_index {
            self.current_index = index;
        }
        if let Some(integrity) = patch.integrity {
            self.integrity = integrity.min(INTEGRITY_MAX);
        }
        if let Some(hard_mode) = patch.hard_mode {
            self.hard_mode = hard_mode;
        }
        self.current_index = self.current_index.min(self.queue.len());
        self.trace_shown = false;
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            queue: self.queue.clone(),
            current_index: self.current_index,
            integrity: self.integrity,
            hard_mode: self.hard_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_defaults() {
        let state = SessionState::fresh(&[1, 2, 3, 4]);
        assert_eq!(state.queue(), &[1, 2, 3, 4]);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.integrity(), 100);
        assert!(!state.hard_mode());
        assert_eq!(state.current_id(), Some(1));
    }

    #[test]
    fn advance_saturates_at_queue_end() {
        let mut state = SessionState::fresh(&[1]);
        state.advance();
        assert!(state.is_exhausted());
        state.advance();
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.current_id(), None);
        assert_eq!(state.progress(), (1, 1));
    }

    #[test]
    fn bonus_lands_after_current_and_never_twice() {
        let mut state = SessionState::fresh(&[1, 2, 3, 4]);
        state.advance();
        assert!(state.insert_bonus(5));
        assert_eq!(state.queue(), &[1, 2, 5, 3, 4]);
        assert!(!state.insert_bonus(5));
        state.advance();
        assert!(!state.insert_bonus(5));
        assert_eq!(state.queue().iter().filter(|&&id| id == 5).count(), 1);
    }

    #[test]
    fn integrity_floors_at_zero() {
        let mut state = SessionState::fresh(&[1]);
        for _ in 0..25 {
            state.penalize(5);
        }
        assert_eq!(state.integrity(), 0);
        assert_eq!(state.penalize(20), 0);
    }

    #[test]
    fn trace_is_one_shot_until_cleared() {
        let mut state = SessionState::fresh(&[1]);
        assert!(state.mark_traced());
        assert!(!state.mark_traced());
        state.clear_trace();
        assert!(state.mark_traced());
    }

    #[test]
    fn patch_merges_fields_and_clamps_index() {
        let mut state = SessionState::fresh(&[1, 2, 3, 4]);
        state.apply_patch(RestorePatch {
            queue: Some(vec![1, 2]),
            current_index: Some(9),
            integrity: None,
            hard_mode: Some(true),
            ..RestorePatch::default()
        });
        assert_eq!(state.queue(), &[1, 2]);
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.integrity(), 100);
        assert!(state.hard_mode());
        assert!(state.is_exhausted());
    }
}
