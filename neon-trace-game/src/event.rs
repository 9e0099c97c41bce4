//! Player-facing terminal log.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something worth a terminal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MissionEvent {
    MissionLoaded { title: String },
    TraceReminder,
    AllComplete,
    TraceExecuted,
    EvidenceLine { line: String },
    TraceRepeated,
    Hint { hint: String },
    AnswerAccepted { answer: String },
    AnswerRejected { answer: String },
    BonusUnlocked { title: String },
    TimerExpired,
    HardModeArmed,
    StandardModeRestored,
}

impl MissionEvent {
    /// Secondary lines are rendered dimmed.
    #[must_use]
    pub const fn is_dim(&self) -> bool {
        matches!(
            self,
            Self::TraceReminder
                | Self::EvidenceLine { .. }
                | Self::TraceRepeated
                | Self::Hint { .. }
                | Self::AnswerRejected { .. }
                | Self::TimerExpired
                | Self::HardModeArmed
                | Self::StandardModeRestored
        )
    }
}

impl fmt::Display for MissionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissionLoaded { title } => write!(f, "Loaded {title}"),
            Self::TraceReminder => f.write_str("Run trace to reveal signal artifacts."),
            Self::AllComplete => f.write_str("All missions complete. Extraction window open."),
            Self::TraceExecuted => f.write_str("Trace executed. Signals received."),
            Self::EvidenceLine { line } => write!(f, "> {line}"),
            Self::TraceRepeated => f.write_str("Trace already executed."),
            Self::Hint { hint } => write!(f, "Hint: {hint}"),
            Self::AnswerAccepted { answer } => write!(f, "Answer accepted: {answer}"),
            Self::AnswerRejected { answer } => write!(f, "Answer rejected: {answer}"),
            Self::BonusUnlocked { title } => write!(f, "Bonus path unlocked: {title}"),
            Self::TimerExpired => f.write_str("Timer expired. Signal lost."),
            Self::HardModeArmed => f.write_str("Hard mode armed."),
            Self::StandardModeRestored => f.write_str("Standard mode restored."),
        }
    }
}

/// One rendered terminal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub text: String,
    pub dim: bool,
}

impl From<&MissionEvent> for LogLine {
    fn from(event: &MissionEvent) -> Self {
        Self {
            text: event.to_string(),
            dim: event.is_dim(),
        }
    }
}
