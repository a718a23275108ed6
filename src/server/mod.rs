// Local HTTP surface for the telemetry demo.
// Serves health, a JSON status summary, and the Prometheus scrape endpoint.

use crate::config::Config;
use crate::telemetry::{Metrics, TelemetryGuard};
use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::net::SocketAddr;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Clone)]
struct ServerState {
    config: Config,
    metrics: Metrics,
    prometheus: Option<PrometheusHandle>,
}

/// Serve until interrupted. Telemetry must already be initialized; the
/// guard's handles feed /status and /metrics.
pub async fn serve(server: &ServerConfig, config: &Config, guard: &TelemetryGuard) -> Result<()> {
    let state = ServerState {
        config: config.clone(),
        metrics: guard.metrics.clone(),
        prometheus: guard.prometheus.clone(),
    };

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], server.port)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("llmwatch server listening on http://{}", addr);
    tracing::info!("  GET /health  - Health check");
    tracing::info!("  GET /status  - Telemetry status (JSON)");
    tracing::info!("  GET /metrics - Prometheus metrics");

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: ServerState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/metrics", get(metrics))
        .layer(cors)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn status(State(state): State<ServerState>) -> impl IntoResponse {
    let m = &state.metrics;
    Json(json!({
        "app_name": state.config.app_name,
        "project_id": state.config.project_id,
        "trace_enabled": state.config.trace.enabled,
        "metrics_enabled": state.config.metrics.enabled,
        "logging_enabled": state.config.logging.enabled,
        "image_uploading_enabled": state.config.images.enabled,
        "counters": {
            "log_batches": m.get_log_batches(),
            "log_records_exported": m.get_log_records_exported(),
            "log_export_errors": m.get_log_export_errors(),
            "images_uploaded": m.get_images_uploaded(),
            "image_upload_errors": m.get_image_upload_errors(),
            "llm_requests": m.get_llm_requests(),
            "llm_errors": m.get_llm_errors(),
        }
    }))
}

async fn metrics(State(state): State<ServerState>) -> impl IntoResponse {
    match state.prometheus {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            "Prometheus recorder not installed\n".to_string(),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
    }
}
