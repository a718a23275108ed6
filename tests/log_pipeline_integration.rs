mod common;

use common::create_test_record;
use llmwatch::gcp::AccessTokenProvider;
use llmwatch::telemetry::log_export::{CloudLoggingExporter, LogChannel};
use llmwatch::telemetry::Metrics;
use std::time::Duration;

fn unreachable_exporter() -> CloudLoggingExporter {
    // Short timeout so failed exports surface quickly; no credentials are
    // available in tests, so every export attempt must fail.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let tokens = AccessTokenProvider::new(client.clone());
    CloudLoggingExporter::new(client, tokens, "test-project", "otlpgenai", "sha256")
}

#[tokio::test]
async fn test_flush_on_empty_channel_completes() {
    let metrics = Metrics::new();
    let (channel, task) = LogChannel::spawn(unreachable_exporter(), metrics.clone());

    channel.flush().await;
    assert_eq!(metrics.get_log_batches(), 0);
    assert_eq!(metrics.get_log_export_errors(), 0);

    drop(channel);
    let _ = task.await;
}

#[tokio::test]
async fn test_failed_export_counts_errors_not_batches() {
    let metrics = Metrics::new();
    let (channel, task) = LogChannel::spawn(unreachable_exporter(), metrics.clone());

    channel.send(create_test_record());
    channel.send(create_test_record());
    channel.flush().await;

    assert!(metrics.get_log_export_errors() >= 1);
    assert_eq!(metrics.get_log_batches(), 0);
    assert_eq!(metrics.get_log_records_exported(), 0);

    drop(channel);
    let _ = task.await;
}

#[tokio::test]
async fn test_channel_drains_on_close() {
    let metrics = Metrics::new();
    let (channel, task) = LogChannel::spawn(unreachable_exporter(), metrics.clone());

    channel.send(create_test_record());
    drop(channel);

    // The task flushes what is pending and exits once all senders are gone.
    let _ = tokio::time::timeout(Duration::from_secs(10), task).await;
    assert!(metrics.get_log_export_errors() >= 1);
}
