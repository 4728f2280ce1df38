//! Outbound calls to IFTTT
//!
//! The only call a service makes on its own initiative is the realtime
//! notification, telling IFTTT to poll a trigger now.

pub mod notifier;

pub use notifier::{Notifier, NotifierOptions, REALTIME_ENDPOINT};
