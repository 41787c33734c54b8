//! Config loading and file-backed service integration tests

use std::sync::Arc;

use lifeline::{
    CrisisService, DryRunInvoker, EngineConfig, FileStore, RiskTier, SafetyPlanUpdate,
    UserProfile,
};

#[test]
fn test_default_config_roundtrips_through_yaml() {
    let yaml = EngineConfig::default().to_yaml().unwrap();
    let config = EngineConfig::from_yaml(&yaml).unwrap();

    assert_eq!(config.lexicon.buckets.len(), 4);
    assert_eq!(config.storage.max_crisis_events, 100);
    assert_eq!(config.storage.max_emergency_actions, 50);
    assert_eq!(config.intervention.primary_number, "988");
}

#[test]
fn test_partial_yaml_keeps_other_defaults() {
    let yaml = r#"
storage:
  max_crisis_events: 5
statistics:
  recent_window_days: 7
"#;
    let config = EngineConfig::from_yaml(yaml).unwrap();

    assert_eq!(config.storage.max_crisis_events, 5);
    assert_eq!(config.storage.max_emergency_actions, 50);
    assert_eq!(config.statistics.recent_window_days, 7);
    assert_eq!(config.lexicon.thresholds.critical, 15);
}

#[test]
fn test_invalid_yaml_rejected() {
    let yaml = r#"
storage:
  max_emergency_actions: 0
"#;
    assert!(EngineConfig::from_yaml(yaml).is_err());
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lifeline.yaml");
    std::fs::write(&path, "statistics:\n  top_indicators: 3\n").unwrap();

    let config = EngineConfig::from_file(&path).unwrap();
    assert_eq!(config.statistics.top_indicators, 3);

    assert!(EngineConfig::from_file(dir.path().join("missing.yaml")).is_err());
}

#[tokio::test]
async fn test_file_store_persists_across_services() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = EngineConfig::default();
    config.storage.max_crisis_events = 3;

    let first = CrisisService::new(
        config.clone(),
        Arc::new(FileStore::new(dir.path())),
        Arc::new(DryRunInvoker::new()),
    )
    .unwrap();
    for text in ["numb", "hopeless", "alone", "suicide"] {
        let assessment = first.analyze(text);
        first
            .handle_crisis_logged(&assessment, &UserProfile::for_user("user-1"))
            .await;
    }
    first
        .safety_plans()
        .create(SafetyPlanUpdate {
            warning_signs: Some(vec!["skipping meals".to_string()]),
            ..Default::default()
        })
        .await;

    let second = CrisisService::new(
        config,
        Arc::new(FileStore::new(dir.path())),
        Arc::new(DryRunInvoker::new()),
    )
    .unwrap();
    let events = second.event_log().crisis_events().await;
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].tier, RiskTier::Critical);

    let plan = second.safety_plans().get().await.unwrap();
    assert_eq!(plan.warning_signs, vec!["skipping meals".to_string()]);
    assert_eq!(plan.version, 1);
}
