use anyhow::{Context, Result, ensure};
use neon_trace_game::constants::INTEGRITY_MAX;
use neon_trace_game::{MemoryStore, SessionPhase};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use super::session::TestSession;
use crate::scenario::Step;

/// Actions per fuzz run.
pub const FUZZ_STEPS: usize = 200;

const WRONG_ANSWERS: [&str; 4] = ["oslo", "gitlab", "aws", "21:15"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FuzzAction {
    Start,
    SubmitCorrect,
    SubmitWrong(usize),
    SubmitEmpty,
    Trace,
    Hint,
    ToggleMode,
    Tick(u32),
    ExpireDeadline,
    Reload,
    Reset,
}

impl FuzzAction {
    fn pick(rng: &mut ChaCha20Rng) -> Self {
        match rng.gen_range(0..100) {
            0..=7 => Self::Start,
            8..=29 => Self::SubmitCorrect,
            30..=47 => Self::SubmitWrong(rng.gen_range(0..WRONG_ANSWERS.len())),
            48..=51 => Self::SubmitEmpty,
            52..=59 => Self::Trace,
            60..=63 => Self::Hint,
            64..=69 => Self::ToggleMode,
            70..=84 => Self::Tick(rng.gen_range(1..=30)),
            85..=91 => Self::ExpireDeadline,
            92..=96 => Self::Reload,
            _ => Self::Reset,
        }
    }
}

/// Summary of one seeded run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzRun {
    pub seed: u64,
    pub steps: usize,
    pub completions: usize,
    pub final_integrity: u8,
    /// SHA-256 over every persisted snapshot and log line, in order.
    pub digest: String,
}

/// Compiled display-format checks.
pub struct ClockFormats {
    deadline: Regex,
    elapsed: Regex,
    integrity: Regex,
    progress: Regex,
}

impl ClockFormats {
    pub fn new() -> Result<Self> {
        Ok(Self {
            deadline: Regex::new(r"^(\d{2}:[0-5]\d|--:--)$").context("deadline pattern")?,
            elapsed: Regex::new(r"^\d{2,}:[0-5]\d$").context("elapsed pattern")?,
            integrity: Regex::new(r"^\d{1,3}%$").context("integrity pattern")?,
            progress: Regex::new(r"^\d+ / \d+$").context("progress pattern")?,
        })
    }
}

/// Drive `steps` random actions from `seed`, checking invariants after each.
pub fn run_fuzz(seed: u64, steps: usize, formats: &ClockFormats) -> Result<FuzzRun> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut session = TestSession::boot(MemoryStore::new())?;
    let mut hasher = Sha256::new();
    let mut completions = 0;
    let mut seen_lines = 0;

    for index in 0..steps {
        let action = FuzzAction::pick(&mut rng);
        let was_complete = session.controller().phase() == SessionPhase::Complete;
        apply(&mut session, action)
            .with_context(|| format!("step {index} ({action:?}) with seed {seed}"))?;
        check_invariants(&session, formats).with_context(|| {
            format!("invariant broken after step {index} ({action:?}) with seed {seed}")
        })?;

        if !was_complete && session.controller().phase() == SessionPhase::Complete {
            completions += 1;
        }
        hasher.update(session.persisted().unwrap_or_default().as_bytes());
        for line in &session.transcript()[seen_lines..] {
            hasher.update(line.as_bytes());
        }
        seen_lines = session.transcript().len();
    }

    Ok(FuzzRun {
        seed,
        steps,
        completions,
        final_integrity: session.controller().state().integrity(),
        digest: format!("{:x}", hasher.finalize()),
    })
}

fn apply(session: &mut TestSession, action: FuzzAction) -> Result<()> {
    let step = match action {
        FuzzAction::Start => Step::Start,
        FuzzAction::SubmitCorrect => {
            let answer = session.correct_answer().unwrap_or_default();
            session.submit(&answer);
            return Ok(());
        }
        FuzzAction::SubmitWrong(index) => Step::Submit(WRONG_ANSWERS[index]),
        FuzzAction::SubmitEmpty => Step::Submit(""),
        FuzzAction::Trace => Step::Trace,
        FuzzAction::Hint => Step::Hint,
        FuzzAction::ToggleMode => Step::ToggleMode,
        FuzzAction::Tick(secs) => Step::Tick(secs),
        FuzzAction::ExpireDeadline => {
            if session.controller().deadline().is_running() {
                Step::ExpireDeadline
            } else {
                Step::Tick(1)
            }
        }
        FuzzAction::Reload => Step::Reload,
        FuzzAction::Reset => Step::Reset,
    };
    session.apply(&step)
}

/// Structural invariants that must hold after every transition.
pub fn check_invariants(session: &TestSession, formats: &ClockFormats) -> Result<()> {
    let controller = session.controller();
    let state = controller.state();
    let queue = state.queue();

    ensure!(
        state.integrity() <= INTEGRITY_MAX,
        "integrity {} above maximum",
        state.integrity()
    );
    ensure!(
        state.current_index() <= queue.len(),
        "index {} beyond queue of {}",
        state.current_index(),
        queue.len()
    );
    let unique: HashSet<_> = queue.iter().collect();
    ensure!(unique.len() == queue.len(), "duplicate mission in queue {queue:?}");
    ensure!(
        queue.iter().all(|&id| controller.catalog().contains(id)),
        "unknown mission in queue {queue:?}"
    );

    match controller.phase() {
        SessionPhase::Idle => ensure!(
            !controller.deadline().is_running(),
            "idle session with running deadline"
        ),
        SessionPhase::Active => {
            ensure!(
                state.current_index() < queue.len(),
                "active session past the end of the queue"
            );
            ensure!(
                controller.deadline().is_running(),
                "active session without a deadline"
            );
        }
        SessionPhase::Complete => {
            ensure!(state.is_exhausted(), "complete before the queue ran out");
            ensure!(
                !controller.deadline().is_running(),
                "deadline running after completion"
            );
        }
    }

    let view = session.view();
    ensure!(
        formats.deadline.is_match(&view.deadline),
        "bad deadline display {:?}",
        view.deadline
    );
    ensure!(
        formats.elapsed.is_match(&view.elapsed),
        "bad elapsed display {:?}",
        view.elapsed
    );
    ensure!(
        formats.integrity.is_match(&view.integrity_label),
        "bad integrity label {:?}",
        view.integrity_label
    );
    ensure!(
        formats.progress.is_match(&view.progress_label),
        "bad progress label {:?}",
        view.progress_label
    );
    ensure!(
        (0.0..=1.0).contains(&view.progress_ratio),
        "progress ratio {} out of range",
        view.progress_ratio
    );
    Ok(())
}

/// Run the same seed twice and require identical digests.
pub fn run_replay(seed: u64, steps: usize, formats: &ClockFormats) -> Result<FuzzRun> {
    let first = run_fuzz(seed, steps, formats)?;
    let second = run_fuzz(seed, steps, formats)?;
    ensure!(
        first == second,
        "seed {seed} diverged: {} vs {}",
        first.digest,
        second.digest
    );
    Ok(first)
}
