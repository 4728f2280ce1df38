//! IFTTT Error Types
//!
//! This module defines the error types used across the crate: the crate-wide
//! [`Error`] returned by the dispatch engine, transport and notifier, and the
//! [`HandlerError`] that integrator-supplied triggers and actions return.

use http::StatusCode;
use thiserror::Error;

use crate::protocol::envelope::ErrorEnvelope;

/// Message sent back when a handler reports an invalid user token
pub const INVALID_TOKEN_MESSAGE: &str = "Token invalid";

/// Message sent back when a request could not be completed because of a panic
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Error";

/// Which family of handler a lookup was performed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// A polled trigger
    Trigger,
    /// An invokable action
    Action,
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerKind::Trigger => write!(f, "Trigger"),
            HandlerKind::Action => write!(f, "Action"),
        }
    }
}

/// The main Error type for the IFTTT library
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The inbound request body or path could not be parsed
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The claimed service key or the user token was rejected
    #[error("Token invalid")]
    InvalidToken,

    /// No handler is registered under the requested slug
    #[error("{kind} Not Registered")]
    HandlerNotRegistered {
        /// Handler family that was searched
        kind: HandlerKind,
        /// Slug that was requested
        slug: String,
    },

    /// A trigger or action reported an application error
    #[error("{message}")]
    Handler {
        /// Human readable message forwarded to IFTTT
        message: String,
        /// Whether IFTTT should give up instead of retrying
        skip: bool,
    },

    /// An optional capability (e.g. user info) was requested but not configured
    #[error("{0}")]
    Unsupported(String),

    /// The request matched none of the known endpoints
    #[error("Unknown request: {0}")]
    UnknownRoute(String),

    /// Too many entries were added to a realtime notification
    #[error("Too many notifications (limit {limit}). Try splitting them")]
    Capacity {
        /// Maximum number of entries a notification may carry
        limit: usize,
    },

    /// The realtime endpoint answered with a non-200 status
    #[error("Remote returned code {status} with: {body}")]
    Remote {
        /// HTTP status returned by the remote
        status: u16,
        /// Response body text
        body: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unrecovered fault while processing a request
    #[error("Internal Error")]
    Internal,
}

impl Error {
    /// Map an error to the HTTP status used when it reaches the wire
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::UnknownRoute(_) => StatusCode::NOT_FOUND,
            // Action failures are answered with 400 by the dispatcher itself.
            Error::Handler { .. }
            | Error::MalformedRequest(_)
            | Error::HandlerNotRegistered { .. }
            | Error::Unsupported(_)
            | Error::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Json(_)
            | Error::Io(_)
            | Error::Http(_)
            | Error::Capacity { .. }
            | Error::Remote { .. }
            | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error carries the "do not retry" signal
    pub fn is_skip(&self) -> bool {
        matches!(self, Error::Handler { skip: true, .. })
    }

    /// Create the wire error envelope for this error
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.to_string(), self.is_skip())
    }
}

/// Error returned by trigger, action and user-info handlers
///
/// The message is forwarded to IFTTT verbatim. `skip` tells IFTTT to give up
/// on an action instead of retrying it later.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    skip: bool,
    invalid_token: bool,
}

impl HandlerError {
    /// A retryable error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            skip: false,
            invalid_token: false,
        }
    }

    /// An error IFTTT should not retry
    pub fn skip(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            skip: true,
            invalid_token: false,
        }
    }

    /// The user's access token was not accepted
    pub fn invalid_token() -> Self {
        Self {
            message: INVALID_TOKEN_MESSAGE.to_string(),
            skip: false,
            invalid_token: true,
        }
    }

    /// Mark this error as non-retryable
    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_skip(&self) -> bool {
        self.skip
    }

    pub fn is_invalid_token(&self) -> bool {
        self.invalid_token
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        HandlerError::new(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        HandlerError::new(message)
    }
}

impl From<HandlerError> for Error {
    fn from(err: HandlerError) -> Self {
        if err.invalid_token {
            Error::InvalidToken
        } else {
            Error::Handler {
                message: err.message,
                skip: err.skip,
            }
        }
    }
}
