//! IFTTT Service Library
//!
//! This crate implements the service side of the IFTTT service API. IFTTT
//! calls a service over HTTP to poll triggers, run actions, fetch dynamic
//! field options and validate field values; the service may in turn push
//! realtime notifications telling IFTTT to poll right away.
//!
//! Integrators implement [`Trigger`] and [`Action`] for their slugs, register
//! them on a [`ServiceBuilder`], and serve the resulting [`Service`] with
//! [`transport::HttpServer`] or by feeding requests to [`Service::dispatch`]
//! from their own HTTP stack.

pub mod client;
pub mod errors;
pub mod protocol;
pub mod server;
pub mod transport;

// Re-export commonly used items
pub use client::{Notifier, NotifierOptions};
pub use errors::{Error, HandlerError};
pub use protocol::{
    ActionInvokeRequest, ActionResult, DynamicOption, Notification, RequestKind, TriggerEvent,
    TriggerEventCollection, TriggerPollRequest, UserInfo,
};
pub use server::{Action, HandlerRegistry, Request, Service, ServiceBuilder, Trigger};
pub use transport::{HttpServer, HttpServerOptions};
