// Google Cloud access tokens for the REST exporters.
//
// Resolution order: the GOOGLE_OAUTH_ACCESS_TOKEN environment variable,
// then the GCE metadata server. Tokens are cached until shortly before
// their reported expiry.

use crate::telemetry::error::{Result, TelemetryError};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh this long before the token actually expires.
const EXPIRY_SLACK_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Bearer-token source shared by the Cloud Logging and GCS clients.
#[derive(Clone)]
pub struct AccessTokenProvider {
    client: reqwest::Client,
    cached: Arc<Mutex<Option<CachedToken>>>,
}

impl AccessTokenProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Get a valid bearer token, refreshing if needed.
    pub async fn token(&self) -> Result<String> {
        if let Ok(token) = std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN") {
            if !token.is_empty() {
                return Ok(token);
            }
        }

        let mut cached = self.cached.lock().await;
        if let Some(ref entry) = *cached {
            if entry.expires_at > Utc::now() {
                return Ok(entry.token.clone());
            }
        }

        let fresh = self.fetch_from_metadata_server().await?;
        *cached = Some(fresh.clone());
        Ok(fresh.token)
    }

    async fn fetch_from_metadata_server(&self) -> Result<CachedToken> {
        let response = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| TelemetryError::Auth(format!("metadata server unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(TelemetryError::Auth(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        let body: MetadataTokenResponse = response
            .json()
            .await
            .map_err(|e| TelemetryError::Auth(format!("bad token response: {}", e)))?;

        let lifetime = Duration::seconds((body.expires_in - EXPIRY_SLACK_SECS).max(0));
        Ok(CachedToken {
            token: body.access_token,
            expires_at: Utc::now() + lifetime,
        })
    }
}
