use anyhow::{Result, ensure};
use neon_trace_game::{
    CatalogError, ConfigError, EngineConfig, MemoryStore, MissionCatalog, MissionController, RecordingTimers,
    SessionPhase, SubmitOutcome, TickOutcome,
};

const TWO_MISSIONS: &str = r#"{
  "base_queue": [10],
  "missions": [
    {
      "id": 10,
      "title": "Drill: Ping",
      "prompt": "Name the protocol.",
      "evidence": ["Type 8", "Code 0"],
      "answer": ["icmp"],
      "bonus_on": {"icmp": 11},
      "hint": "Echo request."
    },
    {
      "id": 11,
      "title": "Drill: Pong",
      "prompt": "And the reply?",
      "answer": ["echo reply"],
      "hint": "Type 0."
    }
  ]
}"#;

type Controller = MissionController<MemoryStore, RecordingTimers>;

fn controller(catalog: MissionCatalog, config: EngineConfig) -> Result<Controller> {
    let store = MemoryStore::new();
    Ok(Controller::new(catalog, config, store, RecordingTimers::new())?)
}

#[test]
fn custom_catalog_drives_bonus_and_completion() -> Result<()> {
    let catalog = MissionCatalog::from_json(TWO_MISSIONS)?;
    ensure!(catalog.base_queue() == [10]);
    let mut ctl = controller(catalog, EngineConfig::default())?;
    ctl.start();

    let outcome = ctl.submit(" ICMP");
    ensure!(
        outcome
            == SubmitOutcome::Accepted {
                answer: "icmp".to_string(),
                bonus: Some(11)
            },
        "unexpected outcome {outcome:?}"
    );
    ensure!(ctl.view().title == "Drill: Pong");
    ensure!(ctl.view().progress_label == "1 / 2");

    ctl.submit("Echo Reply");
    ensure!(ctl.phase() == SessionPhase::Complete);
    ensure!(ctl.view().progress_label == "2 / 2");
    Ok(())
}

#[test]
fn evidence_defaults_to_empty() -> Result<()> {
    let catalog = MissionCatalog::from_json(TWO_MISSIONS)?;
    let files = catalog.case_files();
    ensure!(files.len() == 2);
    ensure!(files[0].signal_count == 2);
    ensure!(files[1].signal_count == 0);
    Ok(())
}

#[test]
fn tuned_config_changes_deadline_and_penalties() -> Result<()> {
    let config = EngineConfig::from_json(
        r#"{"standard_deadline_secs": 3, "wrong_answer_penalty": 30, "timeout_penalty": 50}"#,
    )?;
    ensure!(config.hard_deadline_secs == 55, "unset fields keep defaults");
    let mut ctl = controller(MissionCatalog::from_json(TWO_MISSIONS)?, config)?;
    ctl.start();

    ctl.submit("udp");
    ensure!(ctl.state().integrity() == 70);
    ensure!(ctl.tick_deadline() == TickOutcome::Counting { remaining: 2 });
    ensure!(ctl.tick_deadline() == TickOutcome::Counting { remaining: 1 });
    let outcome = ctl.tick_deadline();
    ensure!(
        outcome
            == TickOutcome::TimedOut {
                skipped: 10,
                integrity: 20
            },
        "unexpected outcome {outcome:?}"
    );
    ensure!(ctl.phase() == SessionPhase::Complete);
    Ok(())
}

#[test]
fn invalid_catalogs_are_rejected() {
    let cases = [
        (
            r#"{"base_queue":[1],"missions":[{"id":1,"title":"a","prompt":"p","answer":["X"],"hint":"h"}]}"#,
            "not normalized",
        ),
        (
            r#"{"base_queue":[1],"missions":[{"id":1,"title":"a","prompt":"p","answer":[],"hint":"h"}]}"#,
            "no accepted answers",
        ),
        (
            r#"{"base_queue":[1],"missions":[{"id":1,"title":"a","prompt":"p","answer":["x"],"bonus_on":{"y":1},"hint":"h"}]}"#,
            "not an accepted answer",
        ),
        (
            r#"{"base_queue":[1],"missions":[{"id":1,"title":"a","prompt":"p","answer":["x"],"bonus_on":{"x":9},"hint":"h"}]}"#,
            "unknown bonus mission 9",
        ),
        (
            r#"{"base_queue":[2],"missions":[{"id":1,"title":"a","prompt":"p","answer":["x"],"hint":"h"}]}"#,
            "unknown mission 2",
        ),
        (
            r#"{"base_queue":[],"missions":[{"id":1,"title":"a","prompt":"p","answer":["x"],"hint":"h"}]}"#,
            "base queue is empty",
        ),
        (r#"{"base_queue":[1]}"#, "JSON parsing error"),
    ];
    for (json, needle) in cases {
        let err = MissionCatalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains(needle), "{err} !~ {needle}");
    }
}

#[test]
fn duplicate_ids_are_rejected() {
    let json = r#"{"base_queue":[1],"missions":[
        {"id":1,"title":"a","prompt":"p","answer":["x"],"hint":"h"},
        {"id":1,"title":"b","prompt":"p","answer":["y"],"hint":"h"}
    ]}"#;
    assert!(matches!(
        MissionCatalog::from_json(json),
        Err(CatalogError::DuplicateId(1))
    ));
}

#[test]
fn embedded_catalog_ships_six_case_files() -> Result<()> {
    let catalog = MissionCatalog::load_from_static()?;
    ensure!(catalog.base_queue() == [1, 2, 3, 4]);
    ensure!(catalog.case_files().len() == 6);
    ensure!(catalog.missions().iter().all(|m| !m.hint.is_empty()));
    Ok(())
}

#[test]
fn config_documents_are_validated() {
    assert!(matches!(
        EngineConfig::from_json(r#"{"hard_deadline_secs": 0}"#),
        Err(ConfigError::ZeroDeadline { field: "hard" })
    ));
    assert!(matches!(
        EngineConfig::from_json(r#"{"integrity_alert_threshold": 101}"#),
        Err(ConfigError::AlertThreshold(101))
    ));
    assert!(matches!(
        EngineConfig::from_json(r#"{"storage_key": "  "}"#),
        Err(ConfigError::EmptyStorageKey)
    ));
    assert!(matches!(
        EngineConfig::from_json("[]"),
        Err(ConfigError::Json(_))
    ));
}
