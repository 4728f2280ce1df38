//! Request classification
//!
//! Maps a method and path onto one of the fixed IFTTT endpoints. Each path
//! shape accepts exactly one method; a shape reached with another method is
//! classified as [`RequestKind::Unknown`].

use http::Method;

use crate::protocol::{API_PREFIX, RequestKind};

/// Result of classifying a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub kind: RequestKind,
    /// Trigger or action slug, empty when not applicable
    pub slug: String,
    /// Field slug, empty unless the route is field scoped
    pub field_slug: String,
    /// Trigger identity taken from the path, empty unless a delete notification
    pub trigger_identity: String,
}

impl Route {
    fn unknown() -> Self {
        Self::default()
    }

    fn new(kind: RequestKind, slug: &str) -> Self {
        Self {
            kind,
            slug: slug.to_string(),
            ..Self::default()
        }
    }

    fn with_field(mut self, field_slug: &str) -> Self {
        self.field_slug = field_slug.to_string();
        self
    }

    fn with_trigger_identity(mut self, trigger_identity: &str) -> Self {
        self.trigger_identity = trigger_identity.to_string();
        self
    }
}

/// Classify a request by method and path
///
/// The path may carry a query string, which is ignored.
pub fn classify(method: &Method, path: &str) -> Route {
    let path = path.split('?').next().unwrap_or_default();
    let Some(rest) = path.strip_prefix(API_PREFIX) else {
        return Route::unknown();
    };
    let Some(rest) = rest.strip_prefix('/') else {
        return Route::unknown();
    };

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Route::unknown();
    }

    // Most specific shapes first within each family.
    let (expected, route) = match segments.as_slice() {
        ["user", "info"] => (Method::GET, Route::new(RequestKind::UserInfo, "")),
        ["status"] => (Method::GET, Route::new(RequestKind::ServiceStatus, "")),
        ["triggers", slug, "trigger_identity", identity] => (
            Method::DELETE,
            Route::new(RequestKind::TriggerDeleteNotify, slug).with_trigger_identity(identity),
        ),
        ["triggers", slug, "fields", field, "options"] => (
            Method::POST,
            Route::new(RequestKind::TriggerDynamicOptions, slug).with_field(field),
        ),
        ["triggers", slug, "fields", field, "validate"] => (
            Method::POST,
            Route::new(RequestKind::TriggerFieldValidation, slug).with_field(field),
        ),
        ["triggers", slug, "validate"] => (
            Method::POST,
            Route::new(RequestKind::TriggerContextValidation, slug),
        ),
        ["triggers", slug] => (Method::POST, Route::new(RequestKind::TriggerFetch, slug)),
        ["actions", slug, "fields", field, "options"] => (
            Method::POST,
            Route::new(RequestKind::ActionDynamicOptions, slug).with_field(field),
        ),
        ["actions", slug] => (Method::POST, Route::new(RequestKind::ActionInvoke, slug)),
        _ => return Route::unknown(),
    };

    if *method != expected {
        return Route::unknown();
    }
    route
}
