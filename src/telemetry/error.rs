// Telemetry error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid GCS URI prefix: {0}")]
    InvalidUriPrefix(String),

    #[error("Exporter initialization failed: {0}")]
    ExporterInit(String),

    #[error("Export failed (status {status}): {message}")]
    Export { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
