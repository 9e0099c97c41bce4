//! Neon Trace Mission Engine
//!
//! Platform-agnostic core logic for the Neon Trace OSINT puzzle game.
//! This crate provides mission progression, scoring, clocks and persistence
//! without UI or platform-specific dependencies.

pub mod answer;
pub mod clock;
pub mod config;
pub mod constants;
pub mod controller;
pub mod data;
pub mod event;
pub mod numbers;
pub mod state;
pub mod store;
pub mod view;

// Re-export commonly used types
pub use answer::{AnswerVerdict, normalize_answer};
pub use clock::{
    DeadlineClock, DeadlinePhase, DeadlineTick, ElapsedClock, RecordingTimers, TimerCall,
    TimerControl, TimerKind, format_clock,
};
pub use config::{ConfigError, EngineConfig};
pub use controller::{
    CurrentMission, HintOutcome, MissionController, RestoreOutcome, SubmitOutcome, TickOutcome,
    TraceOutcome,
};
pub use data::{CaseFile, CatalogError, Mission, MissionCatalog, MissionId};
pub use event::{LogLine, MissionEvent};
pub use state::{SessionPhase, SessionState};
pub use store::{
    MemoryStore, RestoreError, RestorePatch, SessionSnapshot, SessionStore, parse_restore,
};
pub use view::MissionView;

/// Trait for abstracting mission data loading.
/// Platform-specific implementations may provide their own source.
pub trait MissionLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the mission catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error>;

    /// Load engine tuning.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or fails validation.
    fn load_config(&self) -> Result<EngineConfig, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum StaticLoadError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Loader backed by the catalog embedded in this crate and default tuning.
#[derive(Debug, Clone, Default)]
pub struct StaticMissionLoader {
    config: Option<EngineConfig>,
}

impl StaticMissionLoader {
    /// Use `config` instead of the default tuning.
    #[must_use]
    pub const fn with_config(config: EngineConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl MissionLoader for StaticMissionLoader {
    type Error = StaticLoadError;

    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error> {
        Ok(MissionCatalog::load_from_static()?)
    }

    fn load_config(&self) -> Result<EngineConfig, Self::Error> {
        let config = self.config.clone().unwrap_or_default();
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BootError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to load mission data: {0}")]
    Load(#[source] E),
    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Build a controller from a loader and restore any persisted session.
///
/// # Errors
///
/// Returns an error if the loader fails or the configuration is invalid.
pub fn boot_controller<L, S, T>(
    loader: &L,
    store: S,
    timers: T,
) -> Result<(MissionController<S, T>, RestoreOutcome), BootError<L::Error>>
where
    L: MissionLoader,
    S: SessionStore,
    T: TimerControl,
{
    let catalog = loader.load_catalog().map_err(BootError::Load)?;
    let config = loader.load_config().map_err(BootError::Load)?;
    let mut controller = MissionController::new(catalog, config, store, timers)?;
    let outcome = controller.restore();
    Ok((controller, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_without_save_stays_idle() {
        let (ctl, outcome) =
            boot_controller(&StaticMissionLoader::default(), MemoryStore::new(), RecordingTimers::new())
                .unwrap();
        assert_eq!(outcome, RestoreOutcome::Fresh);
        assert_eq!(ctl.phase(), SessionPhase::Idle);
    }

    #[test]
    fn boot_restores_saved_session_silently() {
        let store = MemoryStore::new().with_slot(
            "neon-trace",
            r#"{"queue":[1,2,3,4],"currentIndex":2,"integrity":80,"hardMode":true}"#,
        );
        let (ctl, outcome) =
            boot_controller(&StaticMissionLoader::default(), store, RecordingTimers::new()).unwrap();
        assert_eq!(outcome, RestoreOutcome::Restored { skipped: vec![] });
        assert_eq!(ctl.phase(), SessionPhase::Active);
        assert_eq!(ctl.view().title, "Mission 03: Infra Leak");
        assert_eq!(ctl.deadline().remaining(), Some(55));
        assert!(ctl.pending_log().is_empty());
        assert!(!ctl.elapsed().is_started());
    }

    #[test]
    fn loader_rejects_invalid_config() {
        let loader = StaticMissionLoader::with_config(EngineConfig {
            hard_deadline_secs: 0,
            ..EngineConfig::default()
        });
        let err = boot_controller(&loader, MemoryStore::new(), RecordingTimers::new())
            .err()
            .expect("boot should fail");
        assert!(matches!(err, BootError::Load(StaticLoadError::Config(_))));
    }
}
