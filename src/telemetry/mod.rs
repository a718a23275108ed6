// Telemetry bootstrap for GenAI workloads on Google Cloud.
//
// One init() call wires up the three signals: spans through the OTLP
// exporter (Cloud Trace via a collector), metrics through Prometheus,
// and log records through the Cloud Logging pipeline. Image uploading
// for multi-modal traces rides along when configured.

pub mod error;
pub mod image_upload;
pub mod log_export;
pub mod log_layer;
pub mod metrics;

pub use error::{Result, TelemetryError};
pub use image_upload::{GcsImageUploader, ImageUploader, NoopImageUploader};
pub use metrics::Metrics;

use crate::config::Config;
use crate::gcp::AccessTokenProvider;
use log_export::{CloudLoggingExporter, LogChannel};
use log_layer::CloudLoggingLayer;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Handles to the running telemetry pipelines. Call [`TelemetryGuard::shutdown`]
/// before exit so batched spans and log records get flushed.
pub struct TelemetryGuard {
    pub metrics: Metrics,
    pub prometheus: Option<PrometheusHandle>,
    pub image_uploader: Arc<dyn ImageUploader>,
    log_channel: Option<LogChannel>,
    log_task: Option<JoinHandle<()>>,
    trace_enabled: bool,
}

impl TelemetryGuard {
    /// Flush pending exports and tear the pipelines down.
    pub async fn shutdown(mut self) {
        if let Some(channel) = self.log_channel.take() {
            channel.flush().await;
        }
        if let Some(task) = self.log_task.take() {
            task.abort();
        }
        if self.trace_enabled {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

/// Initialize telemetry per configuration. Must run inside a tokio runtime;
/// the OTLP batch exporter and the log pipeline spawn onto it.
pub fn init(config: &Config) -> Result<TelemetryGuard> {
    let http = reqwest::Client::new();
    let tokens = AccessTokenProvider::new(http.clone());
    let telemetry_metrics = Metrics::new();

    // Metrics first, so exporter counters themselves get recorded.
    let prometheus = if config.metrics.enabled && config.metrics.prometheus {
        Some(install_prometheus()?)
    } else {
        None
    };

    let otel_layer = if config.trace.enabled {
        let tracer = init_otlp_tracer(config)?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    let (log_layer, log_channel, log_task) = match (config.logging.enabled, &config.project_id) {
        (true, Some(project)) => {
            let exporter = CloudLoggingExporter::new(
                http.clone(),
                tokens.clone(),
                project,
                &config.logging.log_id,
                &config.logging.insert_id_hash,
            );
            let (channel, task) = LogChannel::spawn(exporter, telemetry_metrics.clone());
            let layer = CloudLoggingLayer::new(channel.clone(), &config.app_name);
            (Some(layer), Some(channel), Some(task))
        }
        (true, None) => {
            log::warn!("Cloud Logging export skipped: no project ID configured");
            (None, None, None)
        }
        (false, _) => (None, None, None),
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "llmwatch=info,tower=warn,axum=warn".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .with(log_layer)
        .try_init()
        .map_err(|e| TelemetryError::ExporterInit(e.to_string()))?;

    let image_uploader: Arc<dyn ImageUploader> = if config.images.enabled {
        let prefix = config
            .images
            .uri_prefix
            .as_deref()
            .unwrap_or_default();
        Arc::new(GcsImageUploader::new(
            prefix,
            http,
            tokens,
            telemetry_metrics.clone(),
        )?)
    } else {
        Arc::new(NoopImageUploader)
    };

    Ok(TelemetryGuard {
        metrics: telemetry_metrics,
        prometheus,
        image_uploader,
        log_channel,
        log_task,
        trace_enabled: config.trace.enabled,
    })
}

fn init_otlp_tracer(config: &Config) -> Result<opentelemetry_sdk::trace::Tracer> {
    use opentelemetry::trace::TracerProvider as _;

    let provider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(config.trace.otlp_endpoint.clone()),
        )
        .with_trace_config(opentelemetry_sdk::trace::Config::default().with_resource(
            Resource::new(vec![KeyValue::new("service.name", config.app_name.clone())]),
        ))
        .install_batch(opentelemetry_sdk::runtime::Tokio)
        .map_err(|e| TelemetryError::ExporterInit(e.to_string()))?;

    opentelemetry::global::set_tracer_provider(provider.clone());
    Ok(provider.tracer(env!("CARGO_PKG_NAME")))
}

fn install_prometheus() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::ExporterInit(e.to_string()))
}
