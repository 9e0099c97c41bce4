//! Mission progression controller.
//!
//! Owns the session state, both clocks, and the host collaborators. Every
//! public operation runs to completion synchronously; timer ticks arrive
//! through [`MissionController::tick_deadline`] and
//! [`MissionController::tick_elapsed`].
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::answer::AnswerVerdict;
use crate::clock::{DeadlineClock, DeadlineTick, ElapsedClock, TimerControl, TimerKind};
use crate::config::{ConfigError, EngineConfig};
use crate::constants::{
    COMPLETE_PROMPT, COMPLETE_TITLE, EVIDENCE_PLACEHOLDER, IDLE_PROMPT, IDLE_TITLE,
    MODE_LABEL_HARD, MODE_LABEL_STANDARD, STATUS_ACCEPTED, STATUS_COMPLETE, STATUS_EMPTY_ANSWER,
    STATUS_HINT, STATUS_IDLE, STATUS_LOADED, STATUS_REJECTED, STATUS_TIMEOUT,
};
use crate::data::{CaseFile, Mission, MissionCatalog, MissionId};
use crate::event::{LogLine, MissionEvent};
use crate::numbers::ratio;
use crate::state::{SessionPhase, SessionState};
use crate::store::{SessionStore, parse_restore};
use crate::view::{MissionView, integrity_label, progress_label};

/// Mission at the current queue position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentMission<'a> {
    Mission(&'a Mission),
    /// Queue exhausted.
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// No mission is accepting answers.
    Inactive,
    Empty,
    Accepted {
        answer: String,
        bonus: Option<MissionId>,
    },
    Rejected {
        answer: String,
        integrity: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TraceOutcome {
    Inactive,
    Revealed { evidence: Vec<String> },
    AlreadyExecuted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HintOutcome {
    Inactive,
    Delivered { hint: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    Ignored,
    Counting { remaining: u32 },
    /// Deadline expired; the mission was skipped.
    TimedOut { skipped: MissionId, integrity: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RestoreOutcome {
    /// Nothing persisted.
    Fresh,
    /// Blob merged; `skipped` lists fields that were present but ill-typed.
    Restored { skipped: Vec<String> },
    /// Blob unusable; slot cleared and a fresh session kept.
    Discarded,
}

pub struct MissionController<S, T>
where
    S: SessionStore,
    T: TimerControl,
{
    catalog: MissionCatalog,
    config: EngineConfig,
    state: SessionState,
    phase: SessionPhase,
    deadline: DeadlineClock,
    elapsed: ElapsedClock,
    store: S,
    timers: T,
    status: &'static str,
    load_generation: u64,
    log_epoch: u64,
    log: Vec<LogLine>,
}

impl<S, T> MissionController<S, T>
where
    S: SessionStore,
    T: TimerControl,
{
    /// Build an idle controller with a fresh session.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(
        catalog: MissionCatalog,
        config: EngineConfig,
        store: S,
        timers: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = SessionState::fresh(catalog.base_queue());
        Ok(Self {
            catalog,
            config,
            state,
            phase: SessionPhase::Idle,
            deadline: DeadlineClock::new(),
            elapsed: ElapsedClock::default(),
            store,
            timers,
            status: STATUS_IDLE,
            load_generation: 0,
            log_epoch: 0,
            log: Vec::new(),
        })
    }

    /// Mission at `queue[current_index]`, or the terminal sentinel.
    #[must_use]
    pub fn current(&self) -> CurrentMission<'_> {
        self.state
            .current_id()
            .and_then(|id| self.catalog.get(id))
            .map_or(CurrentMission::Complete, CurrentMission::Mission)
    }

    fn current_mission(&self) -> Option<&Mission> {
        match self.current() {
            CurrentMission::Mission(mission) => Some(mission),
            CurrentMission::Complete => None,
        }
    }

    /// Start the elapsed clock on first use, load the current mission, persist.
    pub fn start(&mut self) {
        if self.elapsed.start() {
            self.timers.arm(TimerKind::Elapsed);
        }
        self.load_mission(true);
        self.save();
    }

    /// Evaluate a raw answer against the current mission.
    pub fn submit(&mut self, raw: &str) -> SubmitOutcome {
        if self.phase != SessionPhase::Active {
            return SubmitOutcome::Inactive;
        }
        let Some(mission) = self.current_mission() else {
            return SubmitOutcome::Inactive;
        };
        let verdict = AnswerVerdict::evaluate(mission, raw);
        let bonus = match &verdict {
            AnswerVerdict::Accepted(answer) => mission.bonus_for(answer),
            AnswerVerdict::Empty | AnswerVerdict::Rejected(_) => None,
        };

        match verdict {
            AnswerVerdict::Empty => {
                self.status = STATUS_EMPTY_ANSWER;
                SubmitOutcome::Empty
            }
            AnswerVerdict::Accepted(answer) => {
                self.push(&MissionEvent::AnswerAccepted {
                    answer: answer.clone(),
                });
                self.status = STATUS_ACCEPTED;
                let mut unlocked = None;
                if let Some(id) = bonus
                    && self.insert_bonus(id)
                {
                    unlocked = Some(id);
                }
                self.advance();
                self.save();
                self.load_mission(true);
                SubmitOutcome::Accepted {
                    answer,
                    bonus: unlocked,
                }
            }
            AnswerVerdict::Rejected(answer) => {
                self.push(&MissionEvent::AnswerRejected {
                    answer: answer.clone(),
                });
                self.status = STATUS_REJECTED;
                let integrity = self.state.penalize(self.config.wrong_answer_penalty);
                SubmitOutcome::Rejected { answer, integrity }
            }
        }
    }

    /// Splice a bonus mission in after the current one. Returns `false` if it is already queued.
    pub fn insert_bonus(&mut self, bonus: MissionId) -> bool {
        if !self.state.insert_bonus(bonus) {
            return false;
        }
        debug!("bonus mission {bonus} queued at {}", self.state.current_index() + 1);
        if let Some(title) = self.catalog.get(bonus).map(|m| m.title.clone()) {
            self.push(&MissionEvent::BonusUnlocked { title });
        }
        true
    }

    /// Move the queue pointer forward one mission.
    pub fn advance(&mut self) {
        self.state.advance();
    }

    /// Reveal the current mission's evidence, once per load.
    pub fn trace(&mut self) -> TraceOutcome {
        if self.phase != SessionPhase::Active {
            return TraceOutcome::Inactive;
        }
        let Some(evidence) = self.current_mission().map(|m| m.evidence.clone()) else {
            return TraceOutcome::Inactive;
        };
        if !self.state.mark_traced() {
            self.push(&MissionEvent::TraceRepeated);
            return TraceOutcome::AlreadyExecuted;
        }
        self.push(&MissionEvent::TraceExecuted);
        for line in &evidence {
            self.push(&MissionEvent::EvidenceLine { line: line.clone() });
        }
        TraceOutcome::Revealed { evidence }
    }

    pub fn hint(&mut self) -> HintOutcome {
        if self.phase != SessionPhase::Active {
            return HintOutcome::Inactive;
        }
        let Some(hint) = self.current_mission().map(|m| m.hint.clone()) else {
            return HintOutcome::Inactive;
        };
        self.push(&MissionEvent::Hint { hint: hint.clone() });
        self.status = STATUS_HINT;
        HintOutcome::Delivered { hint }
    }

    /// Flip difficulty. A running deadline restarts at the new full duration.
    pub fn toggle_mode(&mut self) -> bool {
        let hard = self.state.toggle_hard_mode();
        self.push(&if hard {
            MissionEvent::HardModeArmed
        } else {
            MissionEvent::StandardModeRestored
        });
        self.save();
        if self.deadline.is_running() {
            self.start_deadline();
        }
        hard
    }

    /// One-second deadline tick. Expiry skips the mission with a penalty.
    pub fn tick_deadline(&mut self) -> TickOutcome {
        match self.deadline.tick() {
            DeadlineTick::Ignored => TickOutcome::Ignored,
            DeadlineTick::Counting { remaining } => TickOutcome::Counting { remaining },
            DeadlineTick::Expired => self.handle_timeout(),
        }
    }

    /// One-second elapsed tick.
    pub fn tick_elapsed(&mut self) {
        self.elapsed.tick();
    }

    fn handle_timeout(&mut self) -> TickOutcome {
        let skipped = self.state.current_id().unwrap_or_default();
        self.stop_deadline();
        let integrity = self.state.penalize(self.config.timeout_penalty);
        debug!("deadline expired on mission {skipped}; integrity now {integrity}");
        self.push(&MissionEvent::TimerExpired);
        self.status = STATUS_TIMEOUT;
        self.advance();
        self.save();
        self.load_mission(true);
        TickOutcome::TimedOut { skipped, integrity }
    }

    /// Bring the current queue position on screen and (re)start its deadline.
    pub fn load_mission(&mut self, with_log: bool) {
        self.state.clear_trace();
        self.load_generation += 1;
        let title = self.current_mission().map(|m| m.title.clone());
        match title {
            Some(title) => {
                self.phase = SessionPhase::Active;
                self.status = STATUS_LOADED;
                self.start_deadline();
                debug!(
                    "loaded mission {} ({}/{})",
                    title,
                    self.state.current_index(),
                    self.state.queue().len()
                );
                if with_log {
                    self.push(&MissionEvent::MissionLoaded { title });
                    self.push(&MissionEvent::TraceReminder);
                }
            }
            None => {
                self.phase = SessionPhase::Complete;
                self.status = STATUS_COMPLETE;
                self.stop_deadline();
                if with_log {
                    self.push(&MissionEvent::AllComplete);
                }
            }
        }
    }

    fn start_deadline(&mut self) {
        let duration = self.config.deadline_secs(self.state.hard_mode());
        self.deadline.start(duration);
        self.timers.arm(TimerKind::Deadline);
    }

    fn stop_deadline(&mut self) {
        self.deadline.stop();
        self.timers.disarm(TimerKind::Deadline);
    }

    /// Persist queue, index, integrity and mode. Store failures are logged, never fatal.
    pub fn save(&mut self) {
        let payload = match self.state.snapshot().to_json() {
            Ok(payload) => payload,
            Err(err) => {
                warn!("could not serialize session: {err}");
                return;
            }
        };
        if let Err(err) = self.store.write(&self.config.storage_key, &payload) {
            warn!("could not persist session: {err}");
        }
    }

    /// Rehydrate from the store into a fresh session, then load silently.
    pub fn restore(&mut self) -> RestoreOutcome {
        let raw = match self.store.read(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return RestoreOutcome::Fresh,
            Err(err) => {
                warn!("could not read persisted session: {err}");
                return RestoreOutcome::Fresh;
            }
        };

        match parse_restore(&raw, &self.catalog) {
            Ok(patch) => {
                if !patch.skipped.is_empty() {
                    warn!(
                        "ignored ill-typed persisted fields: {}",
                        patch.skipped.join(", ")
                    );
                }
                let skipped = patch.skipped.iter().map(ToString::to_string).collect();
                self.state = SessionState::fresh(self.catalog.base_queue());
                self.state.apply_patch(patch);
                self.load_mission(false);
                RestoreOutcome::Restored { skipped }
            }
            Err(err) => {
                warn!("discarding persisted session: {err}");
                self.discard_session();
                RestoreOutcome::Discarded
            }
        }
    }

    /// Back to a fresh idle session; clocks stopped, persisted slot removed.
    pub fn reset(&mut self) {
        self.state = SessionState::fresh(self.catalog.base_queue());
        self.phase = SessionPhase::Idle;
        self.elapsed.reset();
        self.timers.disarm(TimerKind::Elapsed);
        self.stop_deadline();
        self.status = STATUS_IDLE;
        self.log.clear();
        self.log_epoch += 1;
        self.clear_slot();
    }

    /// Drop to a fresh idle session after an unusable blob. Only live timers are disarmed.
    fn discard_session(&mut self) {
        self.state = SessionState::fresh(self.catalog.base_queue());
        self.phase = SessionPhase::Idle;
        self.status = STATUS_IDLE;
        self.load_generation += 1;
        if self.deadline.is_running() {
            self.stop_deadline();
        }
        if self.elapsed.is_started() {
            self.elapsed.reset();
            self.timers.disarm(TimerKind::Elapsed);
        }
        self.clear_slot();
    }

    fn clear_slot(&mut self) {
        if let Err(err) = self.store.remove(&self.config.storage_key) {
            warn!("could not clear persisted session: {err}");
        }
    }

    fn push(&mut self, event: &MissionEvent) {
        self.log.push(LogLine::from(event));
    }

    /// Take every terminal line emitted since the last drain.
    pub fn drain_log(&mut self) -> Vec<LogLine> {
        std::mem::take(&mut self.log)
    }

    #[must_use]
    pub fn pending_log(&self) -> &[LogLine] {
        &self.log
    }

    #[must_use]
    pub fn view(&self) -> MissionView {
        let (done, total) = self.state.progress();
        let (title, prompt, evidence, progress_done) = match (self.phase, self.current()) {
            (SessionPhase::Active, CurrentMission::Mission(mission)) => (
                mission.title.clone(),
                mission.prompt.clone(),
                if self.state.trace_shown() {
                    mission.evidence.join("\n")
                } else {
                    EVIDENCE_PLACEHOLDER.to_string()
                },
                done,
            ),
            (SessionPhase::Idle, _) => (
                IDLE_TITLE.to_string(),
                IDLE_PROMPT.to_string(),
                String::new(),
                done,
            ),
            (SessionPhase::Complete | SessionPhase::Active, _) => (
                COMPLETE_TITLE.to_string(),
                COMPLETE_PROMPT.to_string(),
                String::new(),
                total,
            ),
        };
        let integrity = self.state.integrity();
        let hard_mode = self.state.hard_mode();

        MissionView {
            phase: self.phase,
            title,
            prompt,
            evidence,
            status: self.status.to_string(),
            progress_label: progress_label(progress_done, total),
            progress_ratio: ratio(progress_done, total),
            deadline: self.deadline.display(),
            deadline_remaining: self.deadline.remaining(),
            elapsed: self.elapsed.display(),
            elapsed_secs: self.elapsed.secs(),
            integrity,
            integrity_label: integrity_label(integrity),
            integrity_alert: integrity <= self.config.integrity_alert_threshold,
            inputs_enabled: self.phase == SessionPhase::Active,
            hard_mode,
            mode_label: if hard_mode {
                MODE_LABEL_HARD
            } else {
                MODE_LABEL_STANDARD
            }
            .to_string(),
            load_generation: self.load_generation,
            log_epoch: self.log_epoch,
        }
    }

    #[must_use]
    pub fn case_files(&self) -> Vec<CaseFile> {
        self.catalog.case_files()
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub const fn deadline(&self) -> &DeadlineClock {
        &self.deadline
    }

    #[must_use]
    pub const fn elapsed(&self) -> &ElapsedClock {
        &self.elapsed
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn timers(&self) -> &T {
        &self.timers
    }
}
