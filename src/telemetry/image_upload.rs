// Image upload for multi-modal traces.
//
// Multi-modal GenAI workloads can produce images the instrumentation wants
// to persist; log entries and spans then reference the stored object. The
// GCS uploader writes them under a configured gs:// prefix, keyed by the
// trace and span they belong to. Uploads run in the background and are
// never allowed to fail the instrumented request.

use crate::gcp::AccessTokenProvider;
use crate::telemetry::error::{Result, TelemetryError};
use crate::telemetry::log_export::PROVENANCE_LABEL;
use crate::telemetry::metrics::Metrics;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::warn;
use serde_json::json;
use uuid::Uuid;

/// Destination for an image extracted from a trace.
pub trait ImageUploader: Send + Sync {
    /// Schedule the upload of a base64/data-URI payload, returning the URI
    /// where the content will be written.
    fn upload_base64_image(
        &self,
        trace_id: &str,
        span_id: &str,
        image_name: &str,
        image_data: &str,
    ) -> String;
}

/// Used when image uploading is disabled.
pub struct NoopImageUploader;

impl ImageUploader for NoopImageUploader {
    fn upload_base64_image(
        &self,
        _trace_id: &str,
        _span_id: &str,
        image_name: &str,
        _image_data: &str,
    ) -> String {
        warn!("Image uploading disabled; could not upload: {}", image_name);
        "/dev/null".to_string()
    }
}

/// File extension for a content type, empty when unknown.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => ".jpeg",
        "image/png" => ".png",
        "image/webp" => ".webp",
        "image/gif" => ".gif",
        "application/pdf" => ".pdf",
        "text/plain" => ".txt",
        _ => "",
    }
}

/// Decode an image payload into (content_type, bytes).
///
/// Accepts either a bare base64 string or a `data:` URI with an optional
/// charset parameter. Anything malformed degrades to the raw bytes as
/// text/plain rather than erroring, so a bad payload still leaves a
/// recognizable artifact next to its trace.
pub fn decode_data_uri(data: &str) -> (String, Vec<u8>) {
    let fallback = || ("text/plain".to_string(), data.as_bytes().to_vec());

    let Some(after_data) = data.strip_prefix("data:") else {
        return match BASE64.decode(data) {
            Ok(raw) => ("application/octet-stream".to_string(), raw),
            Err(_) => fallback(),
        };
    };

    if !after_data.contains('/') || !after_data.contains(';') {
        warn!("Malformed data URI");
        return fallback();
    }

    let Some((content_type, mut rest)) = after_data.split_once(';') else {
        warn!("Malformed data URI");
        return fallback();
    };
    if !content_type.contains('/') {
        warn!("Malformed data URI");
        return fallback();
    }

    if rest.starts_with("charset=") {
        let Some((_, after_charset)) = rest.split_once(';') else {
            warn!("Malformed data URI");
            return fallback();
        };
        rest = after_charset;
    }

    let Some(payload) = rest.strip_prefix("base64,") else {
        warn!("Malformed data URI");
        return fallback();
    };

    match BASE64.decode(payload) {
        Ok(raw) => (content_type.to_string(), raw),
        Err(e) => {
            warn!("Failed to decode image content: {}", e);
            fallback()
        }
    }
}

/// Split a gs:// URI into bucket and object name.
fn parse_gs_uri(uri: &str) -> Result<(String, String)> {
    let Some(path) = uri.strip_prefix("gs://") else {
        return Err(TelemetryError::InvalidUriPrefix(uri.to_string()));
    };
    match path.split_once('/') {
        Some((bucket, object)) if !bucket.is_empty() && !object.is_empty() => {
            Ok((bucket.to_string(), object.to_string()))
        }
        _ => Err(TelemetryError::InvalidUriPrefix(uri.to_string())),
    }
}

/// Uploads trace images to Google Cloud Storage in the background.
pub struct GcsImageUploader {
    uri_prefix: String,
    client: reqwest::Client,
    tokens: AccessTokenProvider,
    metrics: Metrics,
}

impl GcsImageUploader {
    /// The prefix must look like `gs://bucket` or `gs://bucket/some/prefix`,
    /// without a trailing slash.
    pub fn new(
        uri_prefix: &str,
        client: reqwest::Client,
        tokens: AccessTokenProvider,
        metrics: Metrics,
    ) -> Result<Self> {
        if uri_prefix.is_empty() {
            return Err(TelemetryError::InvalidUriPrefix(
                "must supply a non-empty GCS URI prefix".to_string(),
            ));
        }
        if !uri_prefix.starts_with("gs://") {
            return Err(TelemetryError::InvalidUriPrefix(format!(
                "{:?} must start with gs://",
                uri_prefix
            )));
        }
        if uri_prefix.ends_with('/') {
            return Err(TelemetryError::InvalidUriPrefix(format!(
                "{:?} must not end with /",
                uri_prefix
            )));
        }
        Ok(Self {
            uri_prefix: uri_prefix.to_string(),
            client,
            tokens,
            metrics,
        })
    }

    /// Destination object URI for one image.
    pub fn destination_uri(&self, trace_id: &str, span_id: &str, content_type: &str) -> String {
        let random_id = Uuid::new_v4().simple().to_string();
        let suffix = extension_for(content_type);
        format!(
            "{}/traces/{}/spans/{}/images/{}{}",
            self.uri_prefix, trace_id, span_id, random_id, suffix
        )
    }

    async fn write_object(
        client: &reqwest::Client,
        tokens: &AccessTokenProvider,
        destination_uri: &str,
        content_type: &str,
        payload: Vec<u8>,
        metadata: serde_json::Value,
    ) -> Result<()> {
        let (bucket, object) = parse_gs_uri(destination_uri)?;
        let token = tokens.token().await?;

        let upload_url = format!(
            "https://storage.googleapis.com/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            bucket,
            urlencoding::encode(&object)
        );
        let response = client
            .post(&upload_url)
            .bearer_auth(&token)
            .header("Content-Type", content_type)
            .body(payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TelemetryError::Export {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        // Metadata goes on in a second call; media uploads cannot carry it.
        let metadata_url = format!(
            "https://storage.googleapis.com/storage/v1/b/{}/o/{}",
            bucket,
            urlencoding::encode(&object)
        );
        let response = client
            .patch(&metadata_url)
            .bearer_auth(&token)
            .json(&json!({ "metadata": metadata }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TelemetryError::Export {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }
}

impl ImageUploader for GcsImageUploader {
    fn upload_base64_image(
        &self,
        trace_id: &str,
        span_id: &str,
        image_name: &str,
        image_data: &str,
    ) -> String {
        let (content_type, payload) = decode_data_uri(image_data);
        let destination_uri = self.destination_uri(trace_id, span_id, &content_type);

        let metadata = json!({
            // For linking back to the original trace.
            "trace_id": trace_id,
            "span_id": span_id,
            "original_image_name": image_name,
            "provenance": PROVENANCE_LABEL,
        });

        let client = self.client.clone();
        let tokens = self.tokens.clone();
        let metrics = self.metrics.clone();
        let destination = destination_uri.clone();
        tokio::spawn(async move {
            match Self::write_object(&client, &tokens, &destination, &content_type, payload, metadata)
                .await
            {
                Ok(()) => metrics.inc_images_uploaded(),
                Err(e) => {
                    metrics.inc_image_upload_errors();
                    warn!("Image upload to {} failed: {}", destination, e);
                }
            }
        });

        destination_uri
    }
}
