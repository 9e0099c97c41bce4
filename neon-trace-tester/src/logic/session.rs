use anyhow::{Context, Result, bail};
use log::debug;
use neon_trace_game::{
    CurrentMission, MemoryStore, MissionController, MissionView, RecordingTimers, RestoreOutcome,
    StaticMissionLoader, SubmitOutcome, TickOutcome, TimerKind, boot_controller,
};

use crate::scenario::Step;

pub type Controller = MissionController<MemoryStore, RecordingTimers>;

/// Storage key used by the default engine tuning.
pub const SESSION_KEY: &str = "neon-trace";

/// A controller wired to in-memory fakes, plus everything it has logged.
pub struct TestSession {
    store: MemoryStore,
    timers: RecordingTimers,
    controller: Controller,
    last_restore: RestoreOutcome,
    transcript: Vec<String>,
}

impl TestSession {
    /// Boot over `store`, restoring whatever it holds.
    pub fn boot(store: MemoryStore) -> Result<Self> {
        let timers = RecordingTimers::new();
        let (controller, last_restore) =
            boot_controller(&StaticMissionLoader::default(), store.clone(), timers.clone())
                .context("booting mission controller")?;
        Ok(Self {
            store,
            timers,
            controller,
            last_restore,
            transcript: Vec::new(),
        })
    }

    /// Boot with `raw` already sitting in the session slot.
    pub fn boot_with_persisted(raw: &str) -> Result<Self> {
        Self::boot(MemoryStore::new().with_slot(SESSION_KEY, raw))
    }

    pub fn apply(&mut self, step: &Step) -> Result<()> {
        debug!("step: {}", step.label());
        match step {
            Step::Start => self.controller.start(),
            Step::Submit(raw) => {
                self.controller.submit(raw);
            }
            Step::Trace => {
                self.controller.trace();
            }
            Step::Hint => {
                self.controller.hint();
            }
            Step::ToggleMode => {
                self.controller.toggle_mode();
            }
            Step::Tick(secs) => self.tick(*secs),
            Step::ExpireDeadline => {
                self.expire_deadline()?;
            }
            Step::Reload => self.reload()?,
            Step::Reset => self.controller.reset(),
            Step::Expect(label, check) => {
                self.collect_log();
                check(self).with_context(|| format!("checkpoint '{label}'"))?;
            }
        }
        self.collect_log();
        Ok(())
    }

    /// Submit an answer chosen at run time.
    pub fn submit(&mut self, raw: &str) -> SubmitOutcome {
        let outcome = self.controller.submit(raw);
        self.collect_log();
        outcome
    }

    /// Advance wall time by `secs`, ticking whichever timers are armed.
    pub fn tick(&mut self, secs: u32) {
        for _ in 0..secs {
            self.tick_once();
        }
    }

    fn tick_once(&mut self) -> TickOutcome {
        let outcome = if self.timers.is_armed(TimerKind::Deadline) {
            self.controller.tick_deadline()
        } else {
            TickOutcome::Ignored
        };
        if self.timers.is_armed(TimerKind::Elapsed) {
            self.controller.tick_elapsed();
        }
        outcome
    }

    /// Let time pass until the running deadline expires.
    pub fn expire_deadline(&mut self) -> Result<TickOutcome> {
        let Some(remaining) = self.controller.deadline().remaining() else {
            bail!("no deadline is running");
        };
        for _ in 0..remaining {
            let outcome = self.tick_once();
            if matches!(outcome, TickOutcome::TimedOut { .. }) {
                return Ok(outcome);
            }
        }
        bail!("deadline did not expire after {remaining}s")
    }

    /// Drop the controller and boot a new one from the same store.
    pub fn reload(&mut self) -> Result<()> {
        self.collect_log();
        let timers = RecordingTimers::new();
        let (controller, outcome) =
            boot_controller(&StaticMissionLoader::default(), self.store.clone(), timers.clone())
                .context("rebooting mission controller")?;
        debug!("reload restored: {outcome:?}");
        self.controller = controller;
        self.timers = timers;
        self.last_restore = outcome;
        Ok(())
    }

    /// First registered answer for the mission on screen.
    #[must_use]
    pub fn correct_answer(&self) -> Option<String> {
        match self.controller.current() {
            CurrentMission::Mission(mission) => mission.answers.first().cloned(),
            CurrentMission::Complete => None,
        }
    }

    fn collect_log(&mut self) {
        self.transcript.extend(
            self.controller
                .drain_log()
                .into_iter()
                .map(|line| line.text),
        );
    }

    #[must_use]
    pub fn view(&self) -> MissionView {
        self.controller.view()
    }

    #[must_use]
    pub const fn controller(&self) -> &Controller {
        &self.controller
    }

    #[must_use]
    pub const fn timers(&self) -> &RecordingTimers {
        &self.timers
    }

    #[must_use]
    pub fn persisted(&self) -> Option<String> {
        self.store.get(SESSION_KEY)
    }

    #[must_use]
    pub const fn last_restore(&self) -> &RestoreOutcome {
        &self.last_restore
    }

    #[must_use]
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    #[must_use]
    pub fn transcript_contains(&self, line: &str) -> bool {
        self.transcript.iter().any(|entry| entry == line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_only_advances_armed_clocks() {
        let mut session = TestSession::boot(MemoryStore::new()).unwrap();
        session.tick(5);
        assert_eq!(session.view().elapsed, "00:00");
        session.apply(&Step::Start).unwrap();
        session.tick(5);
        assert_eq!(session.view().elapsed, "00:05");
        assert_eq!(session.controller().deadline().remaining(), Some(85));
    }

    #[test]
    fn expire_deadline_requires_running_clock() {
        let mut session = TestSession::boot(MemoryStore::new()).unwrap();
        assert!(session.expire_deadline().is_err());
        session.apply(&Step::Start).unwrap();
        assert!(matches!(
            session.expire_deadline().unwrap(),
            TickOutcome::TimedOut { skipped: 1, .. }
        ));
    }

    #[test]
    fn reload_resumes_from_store() {
        let mut session = TestSession::boot(MemoryStore::new()).unwrap();
        session.apply(&Step::Start).unwrap();
        session.apply(&Step::Submit("stockholm")).unwrap();
        session.apply(&Step::Reload).unwrap();
        assert_eq!(session.view().title, "Mission 02: Alias Pivot");
        assert!(session.transcript_contains("Answer accepted: stockholm"));
        assert_eq!(session.correct_answer().as_deref(), Some("github"));
    }

    #[test]
    fn failing_checkpoint_names_itself() {
        let mut session = TestSession::boot(MemoryStore::new()).unwrap();
        let err = session
            .apply(&Step::Expect("always fails", |_| anyhow::bail!("nope")))
            .unwrap_err();
        assert!(format!("{err:#}").contains("checkpoint 'always fails'"));
    }
}
