//! Action invocation types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A request from IFTTT to run an action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionInvokeRequest {
    /// Values of the action fields configured in the applet
    pub action_fields: HashMap<String, String>,
    /// IFTTT user metadata (e.g. timezone)
    pub user: HashMap<String, String>,
}

/// Result of a successful action
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    /// Identifies the resource created or modified by the action
    pub id: String,
    /// Optional link to that resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ActionResult {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
