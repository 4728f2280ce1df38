//! IFTTT service side
//!
//! Classifies inbound requests, authenticates them, and dispatches them to
//! the registered trigger and action handlers.

mod dispatcher;
pub mod handlers;
pub mod registry;
pub mod request;
pub(crate) mod response;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use handlers::{Action, Trigger, UserInfoFn, UserInfoProvider};
pub use registry::HandlerRegistry;
pub use request::Request;
pub use router::{Route, classify};
pub use service::{HealthCheck, SERVICE_KEY_ENV, Service, ServiceBuilder};
