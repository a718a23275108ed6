use llmwatch::config::{env_flag, Config};

// ==================== Default Values ====================

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.app_name, "llmwatch-demo");
    assert!(config.project_id.is_none());
    assert!(config.trace.enabled);
    assert_eq!(config.trace.otlp_endpoint, "http://localhost:4317");
    assert!(config.metrics.enabled);
    assert!(config.metrics.prometheus);
    assert!(config.logging.enabled);
    assert_eq!(config.logging.log_id, "otlpgenai");
    assert_eq!(config.logging.insert_id_hash, "sha256");
    assert!(!config.images.enabled);
    assert!(config.images.uri_prefix.is_none());
    assert_eq!(config.model.name, "gemini-1.5-flash");
    assert!(config.model.endpoint.is_none());
}

#[test]
fn test_log_name_requires_project() {
    let mut config = Config::default();
    assert!(config.log_name().is_none());

    config.project_id = Some("my-project".to_string());
    assert_eq!(
        config.log_name().as_deref(),
        Some("projects/my-project/logs/otlpgenai")
    );
}

// ==================== Serialization Roundtrip ====================

#[test]
fn test_config_serialize_deserialize_roundtrip() {
    let mut config = Config::default();
    config.app_name = "my-genai-app".to_string();
    config.project_id = Some("my-project".to_string());
    config.trace.otlp_endpoint = "http://collector:4317".to_string();
    config.logging.log_id = "custom-log".to_string();
    config.images.enabled = true;
    config.images.uri_prefix = Some("gs://bucket/prefix".to_string());
    config.model.endpoint = Some("http://localhost:11434/v1".to_string());

    let yaml = serde_yaml::to_string(&config).unwrap();
    let restored: Config = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(restored.app_name, "my-genai-app");
    assert_eq!(restored.project_id, Some("my-project".to_string()));
    assert_eq!(restored.trace.otlp_endpoint, "http://collector:4317");
    assert_eq!(restored.logging.log_id, "custom-log");
    assert!(restored.images.enabled);
    assert_eq!(restored.images.uri_prefix, Some("gs://bucket/prefix".to_string()));
    assert_eq!(
        restored.model.endpoint,
        Some("http://localhost:11434/v1".to_string())
    );
}

#[test]
fn test_config_save_load_roundtrip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    // Parent directories do not exist yet; save must create them.
    let path = dir.path().join("config").join("llmwatch").join("telemetry.yaml");

    let mut config = Config::default();
    config.app_name = "saved-app".to_string();
    config.project_id = Some("saved-project".to_string());
    config.logging.insert_id_hash = "sha512".to_string();

    config.save_to(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let restored: Config = serde_yaml::from_str(&content).unwrap();
    assert_eq!(restored.app_name, "saved-app");
    assert_eq!(restored.project_id, Some("saved-project".to_string()));
    assert_eq!(restored.logging.insert_id_hash, "sha512");
}

#[test]
fn test_config_deserialize_minimal() {
    // Empty section map: every field should come from serde defaults
    let config: Config = serde_yaml::from_str("{}").unwrap();

    assert_eq!(config.app_name, "llmwatch-demo");
    assert!(config.trace.enabled);
    assert!(config.logging.enabled);
    assert!(!config.images.enabled);
}

#[test]
fn test_config_deserialize_partial_section() {
    let yaml = r#"
app_name: partially-configured
trace:
  enabled: false
logging:
  log_id: otherlog
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.app_name, "partially-configured");
    assert!(!config.trace.enabled);
    // Unset fields inside a present section still get their defaults
    assert_eq!(config.trace.otlp_endpoint, "http://localhost:4317");
    assert_eq!(config.logging.log_id, "otherlog");
    assert_eq!(config.logging.insert_id_hash, "sha256");
}

#[test]
fn test_config_rejects_malformed_yaml() {
    let result: Result<Config, _> = serde_yaml::from_str("app_name: [not, a, string");
    assert!(result.is_err());
}

// ==================== Env Overrides ====================

#[test]
fn test_env_overrides_win_over_file_values() {
    // The only test touching these variables, so no cross-test races.
    std::env::set_var("GOOGLE_CLOUD_PROJECT", "env-project");
    std::env::set_var("LLMWATCH_METRICS_ENABLED", "false");
    std::env::set_var("LLMWATCH_LOGGING_ENABLED", "0");
    std::env::set_var("GCS_IMAGE_UPLOADING_ENABLED", "true");
    std::env::set_var("GCS_IMAGE_UPLOADING_URI_PREFIX", "gs://env-bucket");
    std::env::set_var("INSERT_ID_HASH_ALGORITHM", "sha512");
    std::env::set_var("OTEL_EXPORTER_OTLP_ENDPOINT", "http://env-collector:4317");

    let mut config = Config::default();
    config.project_id = Some("file-project".to_string());
    config.apply_env_overrides();

    assert_eq!(config.project_id, Some("env-project".to_string()));
    assert!(!config.metrics.enabled);
    assert!(!config.logging.enabled);
    assert!(config.images.enabled);
    assert_eq!(config.images.uri_prefix, Some("gs://env-bucket".to_string()));
    assert_eq!(config.logging.insert_id_hash, "sha512");
    assert_eq!(config.trace.otlp_endpoint, "http://env-collector:4317");

    std::env::remove_var("GOOGLE_CLOUD_PROJECT");
    std::env::remove_var("LLMWATCH_METRICS_ENABLED");
    std::env::remove_var("LLMWATCH_LOGGING_ENABLED");
    std::env::remove_var("GCS_IMAGE_UPLOADING_ENABLED");
    std::env::remove_var("GCS_IMAGE_UPLOADING_URI_PREFIX");
    std::env::remove_var("INSERT_ID_HASH_ALGORITHM");
    std::env::remove_var("OTEL_EXPORTER_OTLP_ENDPOINT");
}

// ==================== Env Flag Parsing ====================

#[test]
fn test_env_flag_accepts_one_and_true() {
    assert!(env_flag("1"));
    assert!(env_flag("true"));
    assert!(env_flag("True"));
    assert!(env_flag("TRUE"));
    assert!(env_flag(" true "));
}

#[test]
fn test_env_flag_rejects_everything_else() {
    assert!(!env_flag("0"));
    assert!(!env_flag("false"));
    assert!(!env_flag("yes"));
    assert!(!env_flag("on"));
    assert!(!env_flag(""));
    assert!(!env_flag("enabled"));
}
