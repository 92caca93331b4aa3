// tests/session_tests.rs
mod common;

use std::collections::HashMap;

use common::*;
use soil_calc::config::EngineConfig;
use soil_calc::error::InputError;
use soil_calc::io::ArchiveManifest;
use soil_calc::processing::SoilAnalyzer;
use soil_calc::session::{AnalysisSession, ChatSession, Role, DEFAULT_SYSTEM_MESSAGE, MAX_HISTORY};

/// Reports need a region and a window; selecting a new field drops old results
#[test]
fn test_analysis_session_lifecycle() {
    let analyzer = SoilAnalyzer::new(full_archive(), config()).unwrap();
    let mut session = AnalysisSession::new();

    assert_eq!(
        session.run_report(&analyzer).err(),
        Some(InputError::Unselected("region"))
    );
    session.select_region(field());
    assert_eq!(
        session.run_report(&analyzer).err(),
        Some(InputError::Unselected("time window"))
    );

    session.select_window(window());
    let evaluated = session.run_report(&analyzer).unwrap().score.evaluated;
    assert_eq!(evaluated, 13);
    assert!(session.last_report.is_some());

    session.period_days = 7;
    assert!(session.run_series(&analyzer).is_ok());
    assert!(session.last_series.is_some());

    session.select_region(field());
    assert!(session.last_report.is_none());
    assert!(session.last_series.is_none());

    session.reset();
    assert_eq!(session, AnalysisSession::new());
}

/// History keeps the system message and the most recent turns
#[test]
fn test_chat_history_bounded() {
    let mut chat = ChatSession::new(&EngineConfig::default());
    assert_eq!(chat.model, "models/gemini-1.5-flash");
    assert_eq!(chat.history().len(), 1);
    assert_eq!(chat.history()[0].content, DEFAULT_SYSTEM_MESSAGE);

    for i in 0..8 {
        chat.push_user(format!("question {i}"));
        chat.push_model(format!("answer {i}"));
    }
    let history = chat.history();
    assert_eq!(history.len(), MAX_HISTORY + 1);
    assert_eq!(history[0].role, Role::System);
    assert_eq!(history[1].content, "question 3");
    assert_eq!(chat.last_user_message().unwrap().content, "question 7");
    assert_eq!(chat.last_model_message().unwrap().content, "answer 7");

    chat.reset();
    assert_eq!(chat.history().len(), 1);
    assert!(chat.last_user_message().is_none());
}

/// Generation defaults
#[test]
fn test_chat_parameters() {
    let chat = ChatSession::new(&EngineConfig::default())
        .with_system_message("You are an agronomist.")
        .with_max_history(2);
    assert_eq!(chat.params.temperature, 0.7);
    assert_eq!(chat.params.top_p, 0.9);
    assert_eq!(chat.params.max_tokens, 150);
    assert_eq!(chat.params.presence_penalty, 0.0);
    assert!(chat.params.stop_sequences.is_empty());
    assert_eq!(chat.history()[0].content, "You are an agronomist.");

    let json = serde_json::to_value(&chat.params).unwrap();
    assert_eq!(json["safety_threshold"], "BLOCK_MEDIUM_AND_ABOVE");
}

/// Config files fill missing fields with defaults and never echo the key
#[test]
fn test_config_defaults_and_secret() {
    let config: EngineConfig =
        serde_json::from_str(r#"{"api_key": "secret", "cloud_threshold": 10}"#).unwrap();
    assert_eq!(config.cloud_threshold, 10.0);
    assert_eq!(config.relaxed_cloud_threshold, 30.0);
    assert_eq!(config.fallback_step_days, 5);
    assert_eq!(config.max_fallback_days, 30);
    assert_eq!(config.cec.intercept, 5.0);
    assert_eq!(config.api_key.as_deref(), Some("secret"));

    let written = serde_json::to_string(&config).unwrap();
    assert!(!written.contains("secret"));
}

/// Environment overrides and validation
#[test]
fn test_config_overrides() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SOIL_CALC_MODEL", "models/gemini-1.5-pro"),
        ("SOIL_CALC_CLOUD_THRESHOLD", "35"),
        ("SOIL_CALC_FALLBACK_STEP", "10"),
    ]);
    let mut config = EngineConfig::default();
    config
        .apply_vars(|name| vars.get(name).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(config.model, "models/gemini-1.5-pro");
    assert_eq!(config.cloud_threshold, 35.0);
    assert_eq!(config.fallback_step_days, 10);
    assert!(config.validate().is_ok());

    let mut bad = EngineConfig::default();
    assert!(bad
        .apply_vars(|name| (name == "SOIL_CALC_CLOUD_THRESHOLD").then(|| "cloudy".to_string()))
        .is_err());

    bad.cloud_threshold = 120.0;
    assert!(matches!(bad.validate(), Err(InputError::Config(_))));

    let zero_threads = EngineConfig {
        threads: Some(0),
        ..EngineConfig::default()
    };
    assert!(zero_threads.validate().is_err());
    assert!(SoilAnalyzer::new(soil_calc::LocalArchive::new(), zero_threads).is_err());
}

/// Manifests with inline bands build a working archive
#[test]
fn test_manifest_inline_bands() {
    let manifest: ArchiveManifest = serde_json::from_value(serde_json::json!({
        "scenes": [{
            "id": "S2_0605",
            "collection": "COPERNICUS/S2_SR_HARMONIZED",
            "date": "2024-06-05",
            "cloud_cover": 5.0,
            "grid": {"width": 2, "height": 1, "geo_transform": [9.0, 0.01, 0.0, 45.01, 0.0, -0.01]},
            "bands": {"B4": [1000, 1000], "B8": [3000, null]}
        }],
        "statics": [{
            "asset": "texture",
            "grid": {"width": 2, "height": 1, "geo_transform": [9.0, 0.01, 0.0, 45.01, 0.0, -0.01]},
            "bands": {"b0": [7, 7]}
        }]
    }))
    .unwrap();

    let archive = manifest.into_archive(std::path::Path::new(".")).unwrap();
    assert_eq!(archive.scene_count(), 1);

    let missing_grid: ArchiveManifest = serde_json::from_value(serde_json::json!({
        "scenes": [{
            "id": "x",
            "collection": "c",
            "date": "2024-06-05",
            "bands": {"B4": [1.0]}
        }]
    }))
    .unwrap();
    assert!(missing_grid.into_archive(std::path::Path::new(".")).is_err());

    let wrong_size: ArchiveManifest = serde_json::from_value(serde_json::json!({
        "scenes": [{
            "id": "x",
            "collection": "c",
            "date": "2024-06-05",
            "grid": {"width": 2, "height": 2, "geo_transform": [0.0, 1.0, 0.0, 0.0, 0.0, -1.0]},
            "bands": {"B4": [1.0]}
        }]
    }))
    .unwrap();
    assert!(wrong_size.into_archive(std::path::Path::new(".")).is_err());
}
