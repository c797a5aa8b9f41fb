use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.agent.default_max_turns, 20);
    assert_eq!(config.logging.level, "info");
    assert!(config.agent.system_instructions.is_none());
}

#[test]
fn test_agent_config_default() {
    let agent = AgentConfig::default();
    assert_eq!(agent.default_max_turns, 20);
    assert_eq!(agent.default_timeout_ms, 300_000);
    assert_eq!(agent.warning_lead_ms, 30_000);
    assert_eq!(agent.preview_chars, 80);
}

#[test]
fn test_logging_config_default() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.format, "pretty");
    assert!(!logging.is_json());
    assert!(logging.directory.is_none());
    assert!(logging.directory_path().is_none());
}

#[test]
fn test_logging_directory_expands_tilde() {
    let logging = LoggingConfig {
        directory: Some("~/.delegate/logs".to_string()),
        ..Default::default()
    };
    let path = logging.directory_path().unwrap();
    assert!(!path.to_string_lossy().starts_with('~'));
    assert!(path.ends_with(".delegate/logs"));
}

#[test]
fn test_session_config_conversion() {
    let mut config = Config::default();
    config.agent.warning_lead_ms = 1_500;
    config.agent.preview_chars = 40;

    let session = config.session_config();
    assert_eq!(session.warning_lead, Duration::from_millis(1_500));
    assert_eq!(session.preview_chars, 40);
}

#[test]
fn test_default_session_config_matches_runtime() {
    let session = Config::default().session_config();
    let runtime = SessionConfig::default();
    assert_eq!(session.warning_lead, runtime.warning_lead);
    assert_eq!(session.preview_chars, runtime.preview_chars);
}

#[test]
fn test_config_serialization_roundtrip() {
    let mut config = Config::default();
    config.agent.system_instructions = Some("Be brief.".to_string());
    config.logging.format = "json".to_string();

    let toml_str = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&toml_str).unwrap();
    assert_eq!(parsed.agent.system_instructions.as_deref(), Some("Be brief."));
    assert!(parsed.logging.is_json());
}
