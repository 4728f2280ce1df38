use async_trait::async_trait;

use crate::errors::HandlerError;
use crate::protocol::{ActionInvokeRequest, ActionResult, DynamicOption};
use crate::server::request::Request;

/// An action IFTTT can run on behalf of a user
#[async_trait]
pub trait Action: Send + Sync + 'static {
    /// Run the action
    ///
    /// For temporary failures return a plain [`HandlerError`] and IFTTT will
    /// retry later. For requests that can never succeed (conflicting fields,
    /// missing resources) return [`HandlerError::skip`] so IFTTT gives up and
    /// shows the message to the user.
    async fn handle(
        &self,
        invoke: &ActionInvokeRequest,
        request: &Request,
    ) -> Result<ActionResult, HandlerError>;

    /// Dynamic options for the field named by `request.field_slug()`
    async fn options(&self, _request: &Request) -> Result<DynamicOption, HandlerError> {
        Ok(DynamicOption::new())
    }
}
