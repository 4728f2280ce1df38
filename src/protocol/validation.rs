//! Field validation payloads
//!
//! A failed validation is a normal outcome and is reported inside a 200
//! response, never as an error envelope.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::HandlerError;

/// Per-field verdicts returned by a contextual validation
pub type ContextVerdicts = HashMap<String, Result<(), HandlerError>>;

/// Outcome of validating one field value
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldValidation {
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

impl From<Result<(), HandlerError>> for FieldValidation {
    fn from(verdict: Result<(), HandlerError>) -> Self {
        match verdict {
            Ok(()) => FieldValidation::valid(),
            Err(err) => FieldValidation::invalid(err.message()),
        }
    }
}

/// Convert handler verdicts into the payload of a contextual validation response
pub fn context_payload(verdicts: ContextVerdicts) -> HashMap<String, FieldValidation> {
    verdicts
        .into_iter()
        .map(|(field, verdict)| (field, FieldValidation::from(verdict)))
        .collect()
}
