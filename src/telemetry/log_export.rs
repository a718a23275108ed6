// Cloud Logging export for OTLP-shaped log records.
//
// The Google Cloud OpenTelemetry exporters cover traces and metrics, but
// there is no official Cloud Logging exporter for the logs signal yet, so
// records are converted to LogEntry values and written through the
// entries:write REST endpoint directly.

use crate::gcp::AccessTokenProvider;
use crate::telemetry::error::{Result, TelemetryError};
use crate::telemetry::metrics::Metrics;
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256, Sha512};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const ENTRIES_WRITE_URL: &str = "https://logging.googleapis.com/v2/entries:write";

/// Identifies log entries written by this crate, and separates them from
/// any future official Cloud Logging exporter writing similar data.
pub const PROVENANCE_LABEL: &str = "rust-gcp-o11y-genai-sample";

/// Flush the pending batch when it reaches this many records.
const BATCH_SIZE: usize = 32;

/// Flush interval for partially filled batches.
const FLUSH_INTERVAL_MS: u64 = 1000;

/// All the relevant information needed to write a single log.
#[derive(Debug, Clone)]
pub struct OtlpLogRecord {
    pub body: Option<String>,
    pub severity_number: Option<u8>,
    pub severity_text: Option<String>,
    /// Unix timestamp in nanoseconds
    pub timestamp_nanos: i64,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub event_name: Option<String>,
    pub attributes: BTreeMap<String, Value>,
    pub resource_attributes: BTreeMap<String, Value>,
    pub scope_name: String,
    pub scope_version: Option<String>,
}

impl OtlpLogRecord {
    pub fn now(scope_name: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0);
        Self {
            body: None,
            severity_number: None,
            severity_text: None,
            timestamp_nanos: nanos,
            trace_id: None,
            span_id: None,
            event_name: None,
            attributes: BTreeMap::new(),
            resource_attributes: BTreeMap::new(),
            scope_name: scope_name.to_string(),
            scope_version: None,
        }
    }
}

/// Cloud Logging severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Default,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Map an OTel severity number (1..=24) onto Cloud Logging severities.
pub fn severity_from_number(number: u8) -> LogSeverity {
    match number {
        0 => LogSeverity::Default,
        1..=8 => LogSeverity::Debug,
        9..=12 => LogSeverity::Info,
        13..=16 => LogSeverity::Warning,
        17..=20 => LogSeverity::Error,
        _ => LogSeverity::Critical,
    }
}

/// Map an OTel severity text ("WARN2", "info", ...) onto Cloud Logging
/// severities. Trailing digits are the OTel fine-grained variants.
pub fn severity_from_text(text: &str) -> LogSeverity {
    let mut lower = text.trim().to_lowercase();
    while lower.ends_with(|c: char| c.is_ascii_digit()) {
        lower.pop();
    }
    match lower.as_str() {
        "trace" | "debug" => LogSeverity::Debug,
        "info" => LogSeverity::Info,
        "warn" | "warning" => LogSeverity::Warning,
        "error" => LogSeverity::Error,
        "fatal" => LogSeverity::Critical,
        _ => LogSeverity::Default,
    }
}

/// Severity of a record: the number wins over the text when both are set.
pub fn severity_of(record: &OtlpLogRecord) -> LogSeverity {
    if let Some(number) = record.severity_number {
        return severity_from_number(number);
    }
    if let Some(ref text) = record.severity_text {
        if !text.is_empty() {
            return severity_from_text(text);
        }
    }
    LogSeverity::Default
}

enum InsertIdHasher {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl InsertIdHasher {
    fn new(algorithm: &str) -> Self {
        match algorithm.to_lowercase().as_str() {
            "sha512" => Self::Sha512(Sha512::new()),
            "sha256" => Self::Sha256(Sha256::new()),
            other => {
                warn!("Unknown insert-id hash algorithm {:?}, using sha256", other);
                Self::Sha256(Sha256::new())
            }
        }
    }

    fn update(&mut self, data: &str) {
        match self {
            Self::Sha256(h) => h.update(data.as_bytes()),
            Self::Sha512(h) => h.update(data.as_bytes()),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Sha256(h) => format!("{:x}", h.finalize()),
            Self::Sha512(h) => format!("{:x}", h.finalize()),
        }
    }
}

fn hash_property(hasher: &mut InsertIdHasher, name: &str, value: Option<&str>) {
    hasher.update(&format!("{}={}", name, value.unwrap_or("(null)")));
}

/// Deterministic insert ID over the identifying content of a record.
/// Cloud Logging deduplicates retried writes on this value.
pub fn insert_id(record: &OtlpLogRecord, algorithm: &str) -> String {
    let mut hasher = InsertIdHasher::new(algorithm);

    let timestamp = record.timestamp_nanos.to_string();
    hash_property(&mut hasher, "event_name", record.event_name.as_deref());
    hash_property(&mut hasher, "timestamp", Some(&timestamp));
    hash_property(&mut hasher, "trace_id", record.trace_id.as_deref());
    hash_property(&mut hasher, "span_id", record.span_id.as_deref());

    // BTreeMap iteration is already key-sorted.
    for (key, value) in &record.attributes {
        hasher.update(&format!("attributes[\"{}\"]={}", key, value));
    }
    for (key, value) in &record.resource_attributes {
        hasher.update(&format!("resource.attributes[\"{}\"]={}", key, value));
    }

    hasher.finalize_hex()
}

/// A single Cloud Logging entry, in the entries:write wire shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub log_name: String,
    pub insert_id: String,
    pub severity: String,
    pub timestamp: String,
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    pub json_payload: Value,
}

fn rfc3339_from_nanos(nanos: i64) -> String {
    DateTime::<Utc>::from_timestamp_nanos(nanos).to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn payload_of(record: &OtlpLogRecord) -> Value {
    let mut log = serde_json::Map::new();
    if let Some(ref body) = record.body {
        log.insert("body".to_string(), json!(body));
    }
    if let Some(number) = record.severity_number {
        log.insert("severityNumber".to_string(), json!(number));
    }
    if let Some(ref text) = record.severity_text {
        log.insert("severityText".to_string(), json!(text));
    }
    if let Some(ref event) = record.event_name {
        log.insert("eventName".to_string(), json!(event));
    }
    log.insert("attributes".to_string(), json!(record.attributes));

    let mut scope = serde_json::Map::new();
    scope.insert("name".to_string(), json!(record.scope_name));
    if let Some(ref version) = record.scope_version {
        scope.insert("version".to_string(), json!(version));
    }

    json!({
        "otlp": {
            "v1": {
                "resource": { "attributes": record.resource_attributes },
                "instrumentationScope": scope,
                "log": log,
            }
        }
    })
}

/// Convert an OTLP log record into a Cloud Logging entry.
pub fn to_log_entry(
    record: &OtlpLogRecord,
    project: &str,
    log_id: &str,
    hash_algorithm: &str,
) -> LogEntry {
    let mut labels = BTreeMap::new();
    labels.insert("provenance".to_string(), PROVENANCE_LABEL.to_string());

    let trace = record
        .trace_id
        .as_ref()
        .map(|t| format!("projects/{}/traces/{}", project, t));

    LogEntry {
        log_name: format!("projects/{}/logs/{}", project, log_id),
        insert_id: insert_id(record, hash_algorithm),
        severity: severity_of(record).as_str().to_string(),
        timestamp: rfc3339_from_nanos(record.timestamp_nanos),
        labels,
        trace,
        span_id: record.span_id.clone(),
        json_payload: payload_of(record),
    }
}

/// Writes batches of log entries to Cloud Logging.
pub struct CloudLoggingExporter {
    client: reqwest::Client,
    tokens: AccessTokenProvider,
    project: String,
    log_id: String,
    hash_algorithm: String,
}

impl CloudLoggingExporter {
    pub fn new(
        client: reqwest::Client,
        tokens: AccessTokenProvider,
        project: &str,
        log_id: &str,
        hash_algorithm: &str,
    ) -> Self {
        Self {
            client,
            tokens,
            project: project.to_string(),
            log_id: log_id.to_string(),
            hash_algorithm: hash_algorithm.to_string(),
        }
    }

    /// Write one batch of records. Errors carry the HTTP status so retry
    /// policy can distinguish client from server failures.
    pub async fn export(&self, batch: &[OtlpLogRecord]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let entries: Vec<LogEntry> = batch
            .iter()
            .map(|r| to_log_entry(r, &self.project, &self.log_id, &self.hash_algorithm))
            .collect();

        let token = self.tokens.token().await?;
        let response = self
            .client
            .post(ENTRIES_WRITE_URL)
            .bearer_auth(token)
            .json(&json!({ "entries": entries }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TelemetryError::Export { status, message });
        }

        Ok(())
    }
}

enum LogMessage {
    Record(Box<OtlpLogRecord>),
    Flush(tokio::sync::oneshot::Sender<()>),
}

/// Sender half of the background log pipeline.
#[derive(Clone)]
pub struct LogChannel {
    tx: mpsc::UnboundedSender<LogMessage>,
}

impl LogChannel {
    /// Spawn the batching task. Records are flushed every second, when the
    /// pending batch reaches [`BATCH_SIZE`], or on an explicit [`flush`].
    /// The task drains and stops when every sender is gone.
    ///
    /// [`flush`]: LogChannel::flush
    pub fn spawn(exporter: CloudLoggingExporter, metrics: Metrics) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<LogMessage>();

        let handle = tokio::spawn(async move {
            let mut pending: Vec<OtlpLogRecord> = Vec::with_capacity(BATCH_SIZE);
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_millis(FLUSH_INTERVAL_MS));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    message = rx.recv() => {
                        match message {
                            Some(LogMessage::Record(record)) => {
                                pending.push(*record);
                                if pending.len() >= BATCH_SIZE {
                                    flush(&exporter, &metrics, &mut pending).await;
                                }
                            }
                            Some(LogMessage::Flush(done)) => {
                                flush(&exporter, &metrics, &mut pending).await;
                                let _ = done.send(());
                            }
                            None => {
                                flush(&exporter, &metrics, &mut pending).await;
                                break;
                            }
                        }
                    }
                    _ = ticker.tick() => {
                        flush(&exporter, &metrics, &mut pending).await;
                    }
                }
            }
        });

        (Self { tx }, handle)
    }

    /// Enqueue a record; drops silently if the pipeline has stopped.
    pub fn send(&self, record: OtlpLogRecord) {
        let _ = self.tx.send(LogMessage::Record(Box::new(record)));
    }

    /// Force out whatever is pending and wait for the write to complete.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        if self.tx.send(LogMessage::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn flush(exporter: &CloudLoggingExporter, metrics: &Metrics, pending: &mut Vec<OtlpLogRecord>) {
    if pending.is_empty() {
        return;
    }
    let batch: Vec<OtlpLogRecord> = pending.drain(..).collect();
    let count = batch.len() as u64;
    match exporter.export(&batch).await {
        Ok(()) => metrics.record_log_batch(count),
        Err(e) => {
            metrics.inc_log_export_errors();
            warn!("Cloud Logging export failed: {}", e);
        }
    }
}
