// tracing -> Cloud Logging bridge.
//
// Events recorded through `tracing` become OTLP-shaped log records and are
// handed to the background export pipeline in log_export.

use crate::telemetry::log_export::{LogChannel, OtlpLogRecord};
use opentelemetry::trace::TraceContextExt;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// OTel severity number for a tracing level.
fn severity_number_of(level: &Level) -> u8 {
    match *level {
        Level::TRACE => 1,
        Level::DEBUG => 5,
        Level::INFO => 9,
        Level::WARN => 13,
        Level::ERROR => 17,
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(rendered);
        } else {
            self.fields.insert(field.name().to_string(), Value::from(rendered));
        }
    }
}

/// Pull a string-valued `event.name` field out of the attribute map; it
/// names the log record itself and feeds the insert ID, so it must not
/// stay behind as an ordinary attribute.
fn take_event_name(fields: &mut BTreeMap<String, Value>) -> Option<String> {
    match fields.remove("event.name") {
        Some(Value::String(name)) => Some(name),
        Some(other) => {
            // Non-string values stay as a plain attribute.
            fields.insert("event.name".to_string(), other);
            None
        }
        None => None,
    }
}

/// Layer that forwards tracing events to the Cloud Logging pipeline.
pub struct CloudLoggingLayer {
    channel: LogChannel,
    scope_name: String,
    resource_attributes: BTreeMap<String, Value>,
}

impl CloudLoggingLayer {
    pub fn new(channel: LogChannel, service_name: &str) -> Self {
        let mut resource_attributes = BTreeMap::new();
        resource_attributes.insert("service.name".to_string(), Value::from(service_name));
        Self {
            channel,
            scope_name: env!("CARGO_PKG_NAME").to_string(),
            resource_attributes,
        }
    }
}

impl<S: Subscriber> Layer<S> for CloudLoggingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut record = OtlpLogRecord::now(&self.scope_name);
        record.severity_number = Some(severity_number_of(metadata.level()));
        record.severity_text = Some(metadata.level().to_string());
        record.body = visitor.message;
        record.attributes = visitor.fields;
        record.event_name = take_event_name(&mut record.attributes);
        record
            .attributes
            .insert("target".to_string(), Value::from(metadata.target()));
        record.resource_attributes = self.resource_attributes.clone();
        record.scope_version = Some(env!("CARGO_PKG_VERSION").to_string());

        // Correlate with the active OTel span, when one is recording.
        let otel_ctx = opentelemetry::Context::current();
        let span_ctx = otel_ctx.span().span_context().clone();
        if span_ctx.is_valid() {
            record.trace_id = Some(span_ctx.trace_id().to_string());
            record.span_id = Some(span_ctx.span_id().to_string());
        }

        self.channel.send(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_numbers_follow_otel_ranges() {
        assert_eq!(severity_number_of(&Level::TRACE), 1);
        assert_eq!(severity_number_of(&Level::INFO), 9);
        assert_eq!(severity_number_of(&Level::ERROR), 17);
    }

    #[test]
    fn test_event_name_lifted_out_of_attributes() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "event.name".to_string(),
            Value::from("gen_ai.content.completion"),
        );
        fields.insert("target".to_string(), Value::from("llmwatch::llm"));

        let name = take_event_name(&mut fields);

        assert_eq!(name.as_deref(), Some("gen_ai.content.completion"));
        assert!(!fields.contains_key("event.name"));
        assert!(fields.contains_key("target"));
    }

    #[test]
    fn test_non_string_event_name_stays_an_attribute() {
        let mut fields = BTreeMap::new();
        fields.insert("event.name".to_string(), Value::from(42));

        assert!(take_event_name(&mut fields).is_none());
        assert_eq!(fields.get("event.name"), Some(&Value::from(42)));
    }

    #[test]
    fn test_missing_event_name_yields_none() {
        let mut fields = BTreeMap::new();
        assert!(take_event_name(&mut fields).is_none());
        assert!(fields.is_empty());
    }
}
