use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::fs;
use log::info;

const DEFAULT_CONFIG_PATH: &str = "~/.config/llmwatch/telemetry.yaml";

/// Trace export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// OTLP gRPC collector endpoint
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            otlp_endpoint: default_otlp_endpoint(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Install the Prometheus recorder (served at /metrics)
    #[serde(default = "default_true")]
    pub prometheus: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prometheus: true,
        }
    }
}

/// Cloud Logging export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log ID component of the Cloud Logging log name
    #[serde(default = "default_log_id")]
    pub log_id: String,
    /// Hash algorithm for LogEntry insert IDs: sha256, sha512
    #[serde(default = "default_insert_id_hash")]
    pub insert_id_hash: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_id: default_log_id(),
            insert_id_hash: default_insert_id_hash(),
        }
    }
}

/// GCS image upload configuration (multi-modal traces)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImageUploadConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Destination prefix, e.g. gs://my-bucket or gs://my-bucket/some/prefix
    #[serde(default)]
    pub uri_prefix: Option<String>,
}

/// Model configuration for the demo workload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// OpenAI-compatible chat endpoint; offline generation when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_model_name")]
    pub name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            name: default_model_name(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name reported on spans and log entries
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Google Cloud project ID
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub trace: TraceConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub images: ImageUploadConfig,

    #[serde(default)]
    pub model: ModelConfig,
}

fn default_true() -> bool {
    true
}

fn default_app_name() -> String {
    "llmwatch-demo".to_string()
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_log_id() -> String {
    "otlpgenai".to_string()
}

fn default_insert_id_hash() -> String {
    "sha256".to_string()
}

fn default_model_name() -> String {
    "gemini-1.5-flash".to_string()
}

/// Parse env-style boolean toggles: only "1" and "true" (any case) enable.
pub fn env_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true")
}

impl Config {
    /// Load configuration from default path or create default,
    /// then apply environment overrides (env wins over file).
    pub fn load() -> Result<Self, anyhow::Error> {
        let config_path = expand_path(DEFAULT_CONFIG_PATH);

        let mut config = if config_path.exists() {
            info!("Loading configuration from: {:?}", config_path);
            let content = fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            info!("Configuration not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply the environment variables the telemetry layer honors.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(project) = std::env::var("GOOGLE_CLOUD_PROJECT") {
            if !project.is_empty() {
                self.project_id = Some(project);
            }
        }
        if let Ok(v) = std::env::var("LLMWATCH_METRICS_ENABLED") {
            self.metrics.enabled = env_flag(&v);
        }
        if let Ok(v) = std::env::var("LLMWATCH_LOGGING_ENABLED") {
            self.logging.enabled = env_flag(&v);
        }
        if let Ok(v) = std::env::var("GCS_IMAGE_UPLOADING_ENABLED") {
            self.images.enabled = env_flag(&v);
        }
        if let Ok(prefix) = std::env::var("GCS_IMAGE_UPLOADING_URI_PREFIX") {
            if !prefix.is_empty() {
                self.images.uri_prefix = Some(prefix);
            }
        }
        if let Ok(algo) = std::env::var("INSERT_ID_HASH_ALGORITHM") {
            if !algo.is_empty() {
                self.logging.insert_id_hash = algo;
            }
        }
        if let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
            if !endpoint.is_empty() {
                self.trace.otlp_endpoint = endpoint;
            }
        }
    }

    /// Save configuration to default path
    pub fn save(&self) -> Result<(), anyhow::Error> {
        self.save_to(&expand_path(DEFAULT_CONFIG_PATH))
    }

    /// Save configuration to the given path, creating parent directories
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), anyhow::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;

        info!("Configuration saved to: {:?}", path);
        Ok(())
    }

    /// Cloud Logging log name for this configuration
    pub fn log_name(&self) -> Option<String> {
        self.project_id
            .as_ref()
            .map(|p| format!("projects/{}/logs/{}", p, self.logging.log_id))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            project_id: None,
            trace: TraceConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
            images: ImageUploadConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

fn expand_path(path: &str) -> PathBuf {
    shellexpand::tilde(path).parse().unwrap()
}
