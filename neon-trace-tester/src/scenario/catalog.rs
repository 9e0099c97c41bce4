use anyhow::{Result, ensure};
use neon_trace_game::{RestoreOutcome, SessionPhase, TimerKind};

use super::{ScenarioKind, ScriptedPlan, Step, TestScenario};
use crate::logic::TestSession;

const BASE_QUEUE: [u32; 4] = [1, 2, 3, 4];

fn scripted(key: &'static str, name: &'static str, plan: ScriptedPlan) -> TestScenario {
    TestScenario {
        key,
        name,
        kind: ScenarioKind::Scripted(plan),
    }
}

pub fn scenarios() -> Vec<TestScenario> {
    vec![
        smoke(),
        full_clear(),
        bonus_paths(),
        timeout_chain(),
        integrity_floor(),
        restore_partial(),
        restore_garbage(),
        hard_mode(),
        reset_mid_run(),
        TestScenario {
            key: "integrity-fuzz",
            name: "Seeded Integrity Fuzz",
            kind: ScenarioKind::Fuzz,
        },
        TestScenario {
            key: "deterministic-replay",
            name: "Deterministic Replay",
            kind: ScenarioKind::Replay,
        },
    ]
}

fn smoke() -> TestScenario {
    scripted(
        "smoke",
        "Smoke Test",
        ScriptedPlan::new(vec![Step::Start, Step::Trace, Step::Hint]).with_expectation(
            |session| {
                let view = session.view();
                ensure!(view.phase == SessionPhase::Active, "phase {:?}", view.phase);
                ensure!(view.title == "Mission 01: GeoTrace", "title {}", view.title);
                ensure!(view.deadline == "01:30", "deadline {}", view.deadline);
                ensure!(
                    session.transcript_contains("Trace executed. Signals received."),
                    "trace line missing"
                );
                ensure!(session.persisted().is_some(), "session not persisted");
                Ok(())
            },
        ),
    )
}

fn expect_complete(session: &TestSession) -> Result<()> {
    let view = session.view();
    ensure!(view.phase == SessionPhase::Complete, "phase {:?}", view.phase);
    ensure!(view.title == "All Missions Complete", "title {}", view.title);
    ensure!(view.status == "Extraction successful.", "status {}", view.status);
    ensure!(!view.inputs_enabled, "inputs still enabled");
    ensure!(
        !session.timers().is_armed(TimerKind::Deadline),
        "deadline still armed after completion"
    );
    Ok(())
}

fn full_clear() -> TestScenario {
    scripted(
        "full-clear",
        "Full Clear",
        ScriptedPlan::new(vec![
            Step::Start,
            Step::Submit("Stockholm "),
            Step::Submit("git"),
            Step::Submit("DigitalOcean"),
            Step::Submit("vpn"),
            Step::Submit("20:15"),
        ])
        .with_expectation(expect_complete)
        .with_expectation(|session| {
            let state = session.controller().state();
            ensure!(state.queue() == [1, 2, 3, 6, 4], "queue {:?}", state.queue());
            ensure!(state.integrity() == 100, "integrity {}", state.integrity());
            Ok(())
        }),
    )
}

fn bonus_paths() -> TestScenario {
    scripted(
        "bonus-paths",
        "Bonus Paths",
        ScriptedPlan::new(vec![
            Step::Start,
            Step::Submit("stockholm"),
            Step::Submit("github"),
            Step::Expect("repo ghost queued next", |session| {
                let state = session.controller().state();
                ensure!(state.queue() == [1, 2, 5, 3, 4], "queue {:?}", state.queue());
                ensure!(state.current_index() == 2, "index {}", state.current_index());
                Ok(())
            }),
            Step::Submit("github actions"),
            Step::Submit("digital ocean"),
            Step::Submit("proxy"),
            Step::Submit("20:15"),
        ])
        .with_expectation(expect_complete)
        .with_expectation(|session| {
            let queue = session.controller().state().queue();
            ensure!(queue == [1, 2, 5, 3, 6, 4], "queue {queue:?}");
            ensure!(
                session.transcript_contains("Bonus path unlocked: Side Mission: Repo Ghost"),
                "repo ghost unlock not logged"
            );
            ensure!(
                session.transcript_contains("Bonus path unlocked: Side Mission: VPN Trail"),
                "vpn trail unlock not logged"
            );
            Ok(())
        }),
    )
}

fn timeout_chain() -> TestScenario {
    scripted(
        "timeout-chain",
        "Timeout Chain",
        ScriptedPlan::new(vec![
            Step::Start,
            Step::ExpireDeadline,
            Step::Expect("skipped with penalty", |session| {
                let state = session.controller().state();
                ensure!(state.current_index() == 1, "index {}", state.current_index());
                ensure!(state.integrity() == 80, "integrity {}", state.integrity());
                ensure!(
                    session.controller().deadline().remaining() == Some(90),
                    "deadline not restarted"
                );
                Ok(())
            }),
            Step::ExpireDeadline,
            Step::ExpireDeadline,
            Step::ExpireDeadline,
        ])
        .with_expectation(expect_complete)
        .with_expectation(|session| {
            let view = session.view();
            ensure!(view.integrity == 20, "integrity {}", view.integrity);
            ensure!(view.integrity_alert, "alert not raised at {}%", view.integrity);
            ensure!(view.elapsed == "06:00", "elapsed {}", view.elapsed);
            Ok(())
        }),
    )
}

fn integrity_floor() -> TestScenario {
    let mut steps = vec![Step::Start];
    steps.extend(std::iter::repeat_n(Step::Submit("oslo"), 25));
    steps.push(Step::Submit("   "));
    scripted(
        "integrity-floor",
        "Integrity Floor",
        ScriptedPlan::new(steps).with_expectation(|session| {
            let view = session.view();
            ensure!(view.integrity == 0, "integrity {}", view.integrity);
            ensure!(view.integrity_label == "0%", "label {}", view.integrity_label);
            ensure!(view.status == "Answer field empty.", "status {}", view.status);
            ensure!(
                session.controller().state().current_index() == 0,
                "wrong answers must not advance"
            );
            Ok(())
        }),
    )
}

fn restore_partial() -> TestScenario {
    scripted(
        "restore-partial",
        "Partial Restore",
        ScriptedPlan::new(Vec::new())
            .with_persisted(r#"{"integrity":"oops","hardMode":true}"#)
            .with_expectation(|session| {
                ensure!(
                    *session.last_restore()
                        == RestoreOutcome::Restored {
                            skipped: vec!["integrity".to_string()]
                        },
                    "restore outcome {:?}",
                    session.last_restore()
                );
                let state = session.controller().state();
                ensure!(state.integrity() == 100, "integrity {}", state.integrity());
                ensure!(state.hard_mode(), "hard mode not restored");
                ensure!(
                    session.controller().deadline().remaining() == Some(55),
                    "deadline {:?}",
                    session.controller().deadline().remaining()
                );
                ensure!(session.transcript().is_empty(), "restore must be silent");
                ensure!(
                    !session.controller().elapsed().is_started(),
                    "restore must not start the elapsed clock"
                );
                Ok(())
            }),
    )
}

fn restore_garbage() -> TestScenario {
    scripted(
        "restore-garbage",
        "Garbage Restore",
        ScriptedPlan::new(vec![Step::Start])
            .with_persisted("{\"queue\": [1, 2,")
            .with_expectation(|session| {
                ensure!(
                    *session.last_restore() == RestoreOutcome::Discarded,
                    "restore outcome {:?}",
                    session.last_restore()
                );
                let state = session.controller().state();
                ensure!(state.queue() == BASE_QUEUE, "queue {:?}", state.queue());
                ensure!(state.integrity() == 100, "integrity {}", state.integrity());
                let persisted = session.persisted().unwrap_or_default();
                ensure!(
                    persisted.contains(r#""currentIndex":0"#),
                    "fresh session not persisted: {persisted}"
                );
                Ok(())
            }),
    )
}

fn hard_mode() -> TestScenario {
    scripted(
        "hard-mode",
        "Hard Mode",
        ScriptedPlan::new(vec![
            Step::ToggleMode,
            Step::Expect("idle toggle leaves clock stopped", |session| {
                ensure!(
                    session.view().deadline == "--:--",
                    "deadline {}",
                    session.view().deadline
                );
                Ok(())
            }),
            Step::Start,
            Step::Tick(10),
            Step::ToggleMode,
            Step::Expect("standard restart", |session| {
                ensure!(
                    session.controller().deadline().remaining() == Some(90),
                    "deadline {:?}",
                    session.controller().deadline().remaining()
                );
                Ok(())
            }),
            Step::ToggleMode,
            Step::Tick(55),
        ])
        .with_expectation(|session| {
            let view = session.view();
            ensure!(view.hard_mode, "hard mode lost");
            ensure!(view.mode_label == "Mode: Hard", "label {}", view.mode_label);
            ensure!(view.integrity == 80, "integrity {}", view.integrity);
            ensure!(view.deadline == "00:55", "deadline {}", view.deadline);
            ensure!(view.elapsed == "01:05", "elapsed {}", view.elapsed);
            ensure!(
                session.transcript_contains("Standard mode restored."),
                "mode log missing"
            );
            Ok(())
        }),
    )
}

fn reset_mid_run() -> TestScenario {
    scripted(
        "reset-mid-run",
        "Reset Mid-Run",
        ScriptedPlan::new(vec![
            Step::Start,
            Step::Submit("stockholm"),
            Step::Submit("github"),
            Step::Submit("wrong"),
            Step::ToggleMode,
            Step::Reload,
            Step::Expect("reload resumes at repo ghost", |session| {
                let view = session.view();
                ensure!(view.title == "Side Mission: Repo Ghost", "title {}", view.title);
                ensure!(view.integrity == 95, "integrity {}", view.integrity);
                ensure!(view.hard_mode, "hard mode lost on reload");
                Ok(())
            }),
            Step::Reset,
        ])
        .with_expectation(|session| {
            let state = session.controller().state();
            ensure!(state.queue() == BASE_QUEUE, "queue {:?}", state.queue());
            ensure!(state.current_index() == 0, "index {}", state.current_index());
            ensure!(state.integrity() == 100, "integrity {}", state.integrity());
            ensure!(session.persisted().is_none(), "slot not cleared");
            let view = session.view();
            ensure!(view.phase == SessionPhase::Idle, "phase {:?}", view.phase);
            ensure!(view.log_epoch == 1, "log epoch {}", view.log_epoch);
            Ok(())
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<_> = scenarios().iter().map(|s| s.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), scenarios().len());
    }

    #[test]
    fn scripted_scenarios_carry_expectations() {
        for scenario in scenarios() {
            if let ScenarioKind::Scripted(plan) = scenario.kind {
                assert!(!plan.expectations.is_empty(), "{}", scenario.key);
            }
        }
    }
}
