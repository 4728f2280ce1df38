//! Dispatch engine
//!
//! Takes one raw HTTP request through the full cycle: parse, authenticate,
//! route to the capability matching its [`RequestKind`], and encode the
//! outcome. The whole cycle runs behind a panic barrier, so a misbehaving
//! handler costs one 500 response and nothing else.

use bytes::Bytes;
use futures::FutureExt;
use http::{Response, StatusCode};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::errors::{Error, HandlerKind};
use crate::protocol::validation::context_payload;
use crate::protocol::{
    ActionInvokeRequest, DEFAULT_POLL_LIMIT, FieldValidation, REALTIME_HEADER, RequestKind,
    TriggerPollRequest,
};
use crate::server::handlers::{Action, Trigger};
use crate::server::request::Request;
use crate::server::response;
use crate::server::service::Service;

impl Service {
    /// Handle one request from IFTTT
    ///
    /// Never fails: every outcome, including a panic inside a handler, is
    /// turned into a response.
    pub async fn dispatch(&self, request: http::Request<Bytes>) -> Response<Bytes> {
        match AssertUnwindSafe(self.process(&request)).catch_unwind().await {
            Ok(response) => response,
            Err(panic) => {
                error!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    panic_message = %panic_message(panic.as_ref()),
                    "Panic while processing request"
                );
                response::internal_error()
            }
        }
    }

    async fn process(&self, raw: &http::Request<Bytes>) -> Response<Bytes> {
        let path = raw.uri().path();

        let request = match Request::from_http(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!("Rejecting request {} {}: {}", raw.method(), path, e);
                return response::from_error(&e);
            }
        };

        debug!(
            kind = %request.kind(),
            slug = request.slug(),
            correlation_id = request.correlation_id(),
            authenticated = request.is_authenticated(),
            "Processing request {} {}",
            raw.method(),
            path
        );

        if !request.is_authenticated() && request.access_token() != self.service_key {
            warn!(
                correlation_id = request.correlation_id(),
                "Request {} refused due to incorrect claimed service key",
                path
            );
            return response::from_error(&Error::InvalidToken);
        }

        match self.route(&request, path).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    kind = %request.kind(),
                    slug = request.slug(),
                    correlation_id = request.correlation_id(),
                    "Request failed: {}",
                    e
                );
                response::from_error(&e)
            }
        }
    }

    async fn route(&self, request: &Request, path: &str) -> Result<Response<Bytes>, Error> {
        match request.kind() {
            RequestKind::ServiceStatus => Ok(self.service_status()),
            RequestKind::UserInfo => self.user_info(request).await,
            RequestKind::ActionInvoke => self.invoke_action(request).await,
            RequestKind::ActionDynamicOptions => self.action_options(request).await,
            RequestKind::TriggerFetch => self.poll_trigger(request).await,
            RequestKind::TriggerDynamicOptions => self.trigger_options(request).await,
            RequestKind::TriggerFieldValidation => self.validate_trigger_field(request).await,
            RequestKind::TriggerContextValidation => self.validate_trigger_context(request).await,
            RequestKind::TriggerDeleteNotify => self.remove_trigger_identity(request).await,
            RequestKind::Unknown => Err(Error::UnknownRoute(path.to_string())),
        }
    }

    fn service_status(&self) -> Response<Bytes> {
        if self.is_healthy() {
            response::empty(StatusCode::OK)
        } else {
            response::empty(StatusCode::SERVICE_UNAVAILABLE)
        }
    }

    async fn user_info(&self, request: &Request) -> Result<Response<Bytes>, Error> {
        let provider = self
            .user_info
            .as_ref()
            .ok_or_else(|| Error::Unsupported("User info not available".to_string()))?;
        let info = provider.user_info(request).await?;
        Ok(response::success(StatusCode::OK, &info))
    }

    async fn invoke_action(&self, request: &Request) -> Result<Response<Bytes>, Error> {
        let action = self.find_action(request.slug()).await?;
        let invoke = ActionInvokeRequest {
            action_fields: request.body_string_map("actionFields")?,
            user: request.body_string_map("user")?,
        };

        match action.handle(&invoke, request).await {
            Ok(result) => Ok(response::success(StatusCode::OK, &[result])),
            // Action failures, an invalid token included, are always a 400 envelope.
            Err(err) => {
                warn!(
                    slug = request.slug(),
                    correlation_id = request.correlation_id(),
                    skip = err.is_skip(),
                    invalid_token = err.is_invalid_token(),
                    "Action failed: {}",
                    err
                );
                Ok(response::error(
                    StatusCode::BAD_REQUEST,
                    err.message(),
                    err.is_skip(),
                ))
            }
        }
    }

    async fn action_options(&self, request: &Request) -> Result<Response<Bytes>, Error> {
        let action = self.find_action(request.slug()).await?;
        let options = action.options(request).await?;
        Ok(response::success(StatusCode::OK, &options))
    }

    async fn poll_trigger(&self, request: &Request) -> Result<Response<Bytes>, Error> {
        let trigger = self.find_trigger(request.slug()).await?;

        let limit = request
            .body_count("limit")?
            .unwrap_or(DEFAULT_POLL_LIMIT);
        let poll = TriggerPollRequest {
            trigger_identity: request.trigger_identity().to_string(),
            trigger_fields: request.body_string_map("triggerFields")?,
            limit,
            user: request.body_string_map("user")?,
        };

        let mut events = trigger.poll(&poll, request).await?;
        events.sort_newest_first();
        debug!(
            slug = request.slug(),
            trigger_identity = request.trigger_identity(),
            events = events.len(),
            "Trigger polled"
        );

        let mut response = response::success(StatusCode::OK, &events);
        if trigger.is_realtime() {
            response::set_header(&mut response, REALTIME_HEADER, "1");
        }
        Ok(response)
    }

    async fn trigger_options(&self, request: &Request) -> Result<Response<Bytes>, Error> {
        let trigger = self.find_trigger(request.slug()).await?;
        let options = trigger.options(request).await?;
        Ok(response::success(StatusCode::OK, &options))
    }

    async fn validate_trigger_field(&self, request: &Request) -> Result<Response<Bytes>, Error> {
        let trigger = self.find_trigger(request.slug()).await?;
        let value = request.body_str("value")?;
        let verdict = trigger
            .validate_field(request.field_slug(), value, request)
            .await;
        Ok(response::success(
            StatusCode::OK,
            &FieldValidation::from(verdict),
        ))
    }

    async fn validate_trigger_context(&self, request: &Request) -> Result<Response<Bytes>, Error> {
        let trigger = self.find_trigger(request.slug()).await?;
        let values = request.body_string_map("values")?;
        let verdicts = trigger.validate_context(&values, request).await?;
        Ok(response::success(
            StatusCode::OK,
            &context_payload(verdicts),
        ))
    }

    async fn remove_trigger_identity(&self, request: &Request) -> Result<Response<Bytes>, Error> {
        let trigger = self.find_trigger(request.slug()).await?;
        trigger.remove_identity(request.trigger_identity()).await?;
        Ok(response::empty(StatusCode::OK))
    }

    async fn find_trigger(&self, slug: &str) -> Result<Arc<dyn Trigger>, Error> {
        self.registry
            .trigger(slug)
            .await
            .ok_or_else(|| Error::HandlerNotRegistered {
                kind: HandlerKind::Trigger,
                slug: slug.to_string(),
            })
    }

    async fn find_action(&self, slug: &str) -> Result<Arc<dyn Action>, Error> {
        self.registry
            .action(slug)
            .await
            .ok_or_else(|| Error::HandlerNotRegistered {
                kind: HandlerKind::Action,
                slug: slug.to_string(),
            })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
