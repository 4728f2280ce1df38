//! Response envelopes
//!
//! Every IFTTT response body is either `{"data": <payload>}` or
//! `{"errors": [{"message": "...", "status": "SKIP"}]}`. The `status` key is
//! only written when the handler asked IFTTT not to retry.

use serde::{Deserialize, Serialize};

/// Successful response wrapper
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SuccessEnvelope<T> {
    /// Response payload
    pub data: T,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Status marker on an error entry
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    /// IFTTT should give up instead of retrying
    #[serde(rename = "SKIP")]
    Skip,
}

/// A single entry of an error envelope
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    /// Message shown to the user
    pub message: String,
    /// Present only for non-retryable errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ErrorStatus>,
}

/// Error response wrapper
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// Errors reported for this request (always exactly one when produced here)
    pub errors: Vec<ErrorEntry>,
}

impl ErrorEnvelope {
    /// Create an envelope carrying a single error
    pub fn new(message: impl Into<String>, skip: bool) -> Self {
        Self {
            errors: vec![ErrorEntry {
                message: message.into(),
                status: skip.then_some(ErrorStatus::Skip),
            }],
        }
    }

    /// Whether any entry carries the SKIP marker
    pub fn is_skip(&self) -> bool {
        self.errors
            .iter()
            .any(|entry| entry.status == Some(ErrorStatus::Skip))
    }
}

/// Encode a success payload into its wire form
pub fn encode_success<T: Serialize>(payload: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&SuccessEnvelope::new(payload))
}

/// Encode an error into its wire form
pub fn encode_error(message: &str, skip: bool) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&ErrorEnvelope::new(message, skip))
}
