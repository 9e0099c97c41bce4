use anyhow::Result;

use crate::logic::TestSession;

pub mod catalog;

/// Check run against a live session.
pub type Expectation = fn(&TestSession) -> Result<()>;

/// One scripted player or host action.
#[derive(Clone)]
pub enum Step {
    Start,
    Submit(&'static str),
    Trace,
    Hint,
    ToggleMode,
    /// Let `n` seconds pass on every armed timer.
    Tick(u32),
    /// Run the current deadline down to expiry.
    ExpireDeadline,
    /// Tear the controller down and boot a new one over the same store.
    Reload,
    Reset,
    /// Mid-script checkpoint.
    Expect(&'static str, Expectation),
}

impl Step {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Start => "start".to_string(),
            Self::Submit(raw) => format!("submit {raw:?}"),
            Self::Trace => "trace".to_string(),
            Self::Hint => "hint".to_string(),
            Self::ToggleMode => "toggle mode".to_string(),
            Self::Tick(secs) => format!("tick {secs}s"),
            Self::ExpireDeadline => "expire deadline".to_string(),
            Self::Reload => "reload".to_string(),
            Self::Reset => "reset".to_string(),
            Self::Expect(label, _) => format!("expect {label}"),
        }
    }
}

#[derive(Clone)]
pub struct ScriptedPlan {
    /// Raw blob placed in the session slot before boot.
    pub persisted: Option<&'static str>,
    pub steps: Vec<Step>,
    pub expectations: Vec<Expectation>,
}

impl ScriptedPlan {
    #[must_use]
    pub const fn new(steps: Vec<Step>) -> Self {
        Self {
            persisted: None,
            steps,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_persisted(mut self, raw: &'static str) -> Self {
        self.persisted = Some(raw);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

#[derive(Clone)]
pub enum ScenarioKind {
    Scripted(ScriptedPlan),
    /// Random actions from a seeded RNG with invariants checked after each.
    Fuzz,
    /// The same seeded run twice; persisted snapshots must hash identically.
    Replay,
}

#[derive(Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: ScenarioKind,
}

impl TestScenario {
    /// Seeded scenarios run once per seed and iteration.
    #[must_use]
    pub const fn is_seeded(&self) -> bool {
        matches!(self.kind, ScenarioKind::Fuzz | ScenarioKind::Replay)
    }
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = match name.to_lowercase().as_str() {
        "smoke" => "smoke",
        "full-clear" | "clear" => "full-clear",
        "bonus-paths" | "bonus" => "bonus-paths",
        "timeout-chain" | "timeouts" => "timeout-chain",
        "integrity-floor" | "floor" => "integrity-floor",
        "restore-partial" => "restore-partial",
        "restore-garbage" => "restore-garbage",
        "hard-mode" | "hard" => "hard-mode",
        "reset-mid-run" | "reset" => "reset-mid-run",
        "integrity-fuzz" | "fuzz" => "integrity-fuzz",
        "deterministic-replay" | "replay" => "deterministic-replay",
        _ => return None,
    };
    catalog::scenarios().into_iter().find(|s| s.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog::scenarios()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.name))
        .collect()
}
