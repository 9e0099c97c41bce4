use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::fuzz::{ClockFormats, FUZZ_STEPS, run_fuzz, run_replay};
use super::session::TestSession;
use crate::scenario::{ScenarioKind, ScriptedPlan, TestScenario};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    /// Base seed for seeded sweeps; absent for scripted playthroughs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

impl ScenarioResult {
    fn from_runs(
        name: &str,
        seed: Option<u64>,
        iterations: usize,
        failures: Vec<String>,
        performance_data: Vec<Duration>,
    ) -> Self {
        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };
        Self {
            scenario_name: name.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: performance_data.len(),
            failures,
            average_duration,
            performance_data,
        }
    }
}

pub struct LogicTester {
    verbose: bool,
    formats: ClockFormats,
}

impl LogicTester {
    pub fn new(verbose: bool) -> Result<Self> {
        Ok(Self {
            verbose,
            formats: ClockFormats::new()?,
        })
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        if self.verbose {
            println!("🧪 Testing scenario: {}", scenario.name.bright_white());
        }
        match &scenario.kind {
            ScenarioKind::Scripted(plan) => vec![self.run_scripted(scenario.name, plan)],
            ScenarioKind::Fuzz | ScenarioKind::Replay => seeds
                .iter()
                .map(|&seed| self.run_seeded(scenario, seed, iterations))
                .collect(),
        }
    }

    fn run_scripted(&self, name: &str, plan: &ScriptedPlan) -> ScenarioResult {
        let start_time = Instant::now();
        let (failures, performance_data) = match run_plan(plan) {
            Ok(()) => {
                let duration = start_time.elapsed();
                if self.verbose {
                    println!("  ✅ {name} passed ({duration:?})");
                }
                (Vec::new(), vec![duration])
            }
            Err(err) => {
                if self.verbose {
                    println!("  ❌ {name} failed: {}", format!("{err:#}").red());
                }
                (vec![format!("{err:#}")], Vec::new())
            }
        };
        ScenarioResult::from_runs(name, None, 1, failures, performance_data)
    }

    fn run_seeded(&self, scenario: &TestScenario, seed: u64, iterations: usize) -> ScenarioResult {
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let run = match scenario.kind {
                ScenarioKind::Replay => run_replay(iteration_seed, FUZZ_STEPS, &self.formats),
                _ => run_fuzz(iteration_seed, FUZZ_STEPS, &self.formats),
            };
            match run {
                Ok(run) => {
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    info!(
                        "{} seed {} completions {} integrity {} digest {}",
                        scenario.key, run.seed, run.completions, run.final_integrity, run.digest
                    );
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) completions:{} integrity:{}",
                            i + 1,
                            iterations,
                            run.completions,
                            run.final_integrity
                        );
                    }
                }
                Err(err) => {
                    let message = format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1);
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            message.clone().red()
                        );
                    }
                    failures.push(message);
                }
            }
        }

        ScenarioResult::from_runs(
            scenario.name,
            Some(seed),
            iterations,
            failures,
            performance_data,
        )
    }
}

/// Play a scripted plan from boot to its final expectations.
pub fn run_plan(plan: &ScriptedPlan) -> Result<()> {
    let mut session = match plan.persisted {
        Some(raw) => TestSession::boot_with_persisted(raw)?,
        None => TestSession::boot(neon_trace_game::MemoryStore::new())?,
    };
    for (index, step) in plan.steps.iter().enumerate() {
        session
            .apply(step)
            .with_context(|| format!("step {} ({})", index + 1, step.label()))?;
    }
    for expectation in &plan.expectations {
        expectation(&session)?;
    }
    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
