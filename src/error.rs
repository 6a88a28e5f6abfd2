//! Error types for the record layer, configuration and page loads.
//!
//! Record errors never reach the pages: the entity services log them,
//! raise a notification and hand back an empty default instead.

use thiserror::Error;

use crate::record::FieldError;

/// Failures talking to the remote record service.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Record service responded with HTTP {status}")]
    Status { status: u16 },

    #[error("{message}")]
    Remote { message: String },

    #[error("No record in the batch was accepted ({} failed)", failures.len())]
    Batch { failures: Vec<RecordFailure> },

    #[error("Malformed record payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One rejected entry of a batch create/update.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub message: Option<String>,
    pub errors: Vec<FieldError>,
}

impl RecordFailure {
    /// Human-readable lines, one per field error plus the entry message.
    pub fn messages(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field_label, e.message))
            .collect();
        if let Some(message) = &self.message {
            lines.push(message.clone());
        }
        lines
    }
}

/// Invalid or missing environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Page-level load failure, shown with a retry action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("{0} not found")]
    NotFound(&'static str),
}
