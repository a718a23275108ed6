use llmwatch::telemetry::log_export::OtlpLogRecord;
use serde_json::Value;
use std::collections::BTreeMap;

/// A fully populated log record with stable values, for deterministic
/// insert-ID and conversion assertions.
#[allow(dead_code)]
pub fn create_test_record() -> OtlpLogRecord {
    let mut attributes = BTreeMap::new();
    attributes.insert("gen_ai.system".to_string(), Value::from("llmwatch"));
    attributes.insert(
        "gen_ai.request.model".to_string(),
        Value::from("gemini-1.5-flash"),
    );

    let mut resource_attributes = BTreeMap::new();
    resource_attributes.insert("service.name".to_string(), Value::from("llmwatch-test"));

    OtlpLogRecord {
        body: Some("model call completed".to_string()),
        severity_number: Some(9),
        severity_text: Some("INFO".to_string()),
        timestamp_nanos: 1_700_000_000_000_000_000,
        trace_id: Some("0af7651916cd43dd8448eb211c80319c".to_string()),
        span_id: Some("b7ad6b7169203331".to_string()),
        event_name: Some("gen_ai.content.completion".to_string()),
        attributes,
        resource_attributes,
        scope_name: "llmwatch".to_string(),
        scope_version: Some("0.1.0".to_string()),
    }
}
