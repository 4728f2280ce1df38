//! Type-safe definitions of the IFTTT request kinds.
//! Every inbound request is classified into exactly one of these.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Represents the endpoints defined by the IFTTT service API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// The request matched no known endpoint
    #[default]
    Unknown,

    /// Poll a trigger for new events
    TriggerFetch,

    /// A trigger identity was removed and needs no further notifications
    TriggerDeleteNotify,

    /// Dynamic options of a trigger field
    TriggerDynamicOptions,

    /// Validate a single trigger field
    TriggerFieldValidation,

    /// Validate a combination of trigger fields
    TriggerContextValidation,

    /// Run an action
    ActionInvoke,

    /// Dynamic options of an action field
    ActionDynamicOptions,

    /// Service availability check
    ServiceStatus,

    /// Information about the user owning the access token
    UserInfo,
}

impl RequestKind {
    /// Get the string representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Unknown => "unknown",
            RequestKind::TriggerFetch => "trigger_fetch",
            RequestKind::TriggerDeleteNotify => "trigger_delete_notify",
            RequestKind::TriggerDynamicOptions => "trigger_dynamic_options",
            RequestKind::TriggerFieldValidation => "trigger_field_validation",
            RequestKind::TriggerContextValidation => "trigger_context_validation",
            RequestKind::ActionInvoke => "action_invoke",
            RequestKind::ActionDynamicOptions => "action_dynamic_options",
            RequestKind::ServiceStatus => "service_status",
            RequestKind::UserInfo => "user_info",
        }
    }

    /// Check if this kind is served by a registered trigger
    pub fn is_trigger_kind(&self) -> bool {
        matches!(
            self,
            RequestKind::TriggerFetch
                | RequestKind::TriggerDeleteNotify
                | RequestKind::TriggerDynamicOptions
                | RequestKind::TriggerFieldValidation
                | RequestKind::TriggerContextValidation
        )
    }

    /// Check if this kind is served by a registered action
    pub fn is_action_kind(&self) -> bool {
        matches!(
            self,
            RequestKind::ActionInvoke | RequestKind::ActionDynamicOptions
        )
    }

    /// Check if the route carries a field slug
    pub fn is_field_scoped(&self) -> bool {
        matches!(
            self,
            RequestKind::TriggerDynamicOptions
                | RequestKind::TriggerFieldValidation
                | RequestKind::ActionDynamicOptions
        )
    }
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        let serialized = serde_json::to_string(&RequestKind::TriggerFetch).unwrap();
        assert_eq!(serialized, "\"trigger_fetch\"");

        let deserialized: RequestKind = serde_json::from_str("\"action_invoke\"").unwrap();
        assert_eq!(deserialized, RequestKind::ActionInvoke);
    }

    #[test]
    fn test_categorization() {
        assert!(RequestKind::TriggerFetch.is_trigger_kind());
        assert!(!RequestKind::TriggerFetch.is_action_kind());
        assert!(RequestKind::ActionDynamicOptions.is_action_kind());
        assert!(RequestKind::ActionDynamicOptions.is_field_scoped());
        assert!(!RequestKind::ServiceStatus.is_trigger_kind());
        assert!(!RequestKind::ServiceStatus.is_action_kind());
    }

    #[test]
    fn test_display() {
        assert_eq!(RequestKind::UserInfo.to_string(), "user_info");
        assert_eq!(RequestKind::default(), RequestKind::Unknown);
    }
}
