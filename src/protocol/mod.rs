//! IFTTT service API wire types
//!
//! This module contains the request kinds, payload types and response
//! envelopes exchanged with IFTTT, together with the header names the
//! protocol relies on.

pub mod action;
pub mod envelope;
pub mod kind;
pub mod notification;
pub mod options;
pub mod trigger;
pub mod user;
pub mod validation;

pub use action::{ActionInvokeRequest, ActionResult};
pub use envelope::{ErrorEntry, ErrorEnvelope, ErrorStatus, SuccessEnvelope};
pub use kind::RequestKind;
pub use notification::{MAX_NOTIFICATION_ENTRIES, Notification};
pub use options::{DynamicOption, OptionEntry};
pub use trigger::{
    DEFAULT_POLL_LIMIT, TriggerEvent, TriggerEventCollection, TriggerEventMeta, TriggerPollRequest,
};
pub use user::UserInfo;
pub use validation::{ContextVerdicts, FieldValidation};

/// Path prefix of every endpoint of the service API
pub const API_PREFIX: &str = "/ifttt/v1";

// Header names are kept in their canonical lowercase form.

/// Header carrying the shared service key (`IFTTT-Service-Key`)
pub const SERVICE_KEY_HEADER: &str = "ifttt-service-key";

/// Header carrying the request correlation id (`X-Request-ID`)
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Response header marking a trigger as realtime capable (`X-IFTTT-Realtime`)
pub const REALTIME_HEADER: &str = "x-ifttt-realtime";
