//! Trigger handler trait
//!
//! Integrators implement [`Trigger`] once per trigger slug and register it on
//! the service. Only `poll` is mandatory; the remaining hooks default to the
//! behaviour of a trigger without dynamic fields.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::HandlerError;
use crate::protocol::{ContextVerdicts, DynamicOption, TriggerEventCollection, TriggerPollRequest};
use crate::server::request::Request;

/// A trigger polled by IFTTT for new events
#[async_trait]
pub trait Trigger: Send + Sync + 'static {
    /// Return recent events for the polled trigger identity
    ///
    /// Returning an event that was reported before is harmless as long as its
    /// id is unchanged. Return [`HandlerError::invalid_token`] when the user's
    /// token in `request` is not accepted.
    async fn poll(
        &self,
        poll: &TriggerPollRequest,
        request: &Request,
    ) -> Result<TriggerEventCollection, HandlerError>;

    /// Dynamic options for the field named by `request.field_slug()`
    async fn options(&self, _request: &Request) -> Result<DynamicOption, HandlerError> {
        Ok(DynamicOption::new())
    }

    /// Validate a single field value
    ///
    /// An error is reported to the user as a validation message, not as a
    /// failed request.
    async fn validate_field(
        &self,
        _field_slug: &str,
        _value: &str,
        _request: &Request,
    ) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Validate a combination of field values, one verdict per field
    async fn validate_context(
        &self,
        values: &HashMap<String, String>,
        _request: &Request,
    ) -> Result<ContextVerdicts, HandlerError> {
        Ok(values.keys().map(|field| (field.clone(), Ok(()))).collect())
    }

    /// The trigger identity was deleted on IFTTT's side; stop tracking it
    async fn remove_identity(&self, _trigger_identity: &str) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Whether this trigger pushes realtime notifications
    fn is_realtime(&self) -> bool {
        false
    }
}
