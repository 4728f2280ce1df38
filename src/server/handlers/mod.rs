//! Handler traits implemented by integrators
//!
//! The dispatch engine only ever talks to these traits; concrete trigger,
//! action and user-info implementations live in the integrating application.

mod action;
pub use action::Action;

mod trigger;
pub use trigger::Trigger;

mod user;
pub use user::{UserInfoFn, UserInfoProvider};
