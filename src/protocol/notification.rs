//! Realtime notifications
//!
//! A [`Notification`] tells IFTTT that triggers (by identity) or all triggers
//! of some users have new data and should be polled now. Send it with
//! [`crate::client::Notifier`].

use serde::ser::{Serialize, Serializer};

use crate::errors::Error;

/// Maximum number of user ids and trigger identities in one notification
pub const MAX_NOTIFICATION_ENTRIES: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    user_ids: Vec<String>,
    trigger_identities: Vec<String>,
}

impl Notification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user whose triggers should all be polled
    pub fn add_user(&mut self, user_id: impl Into<String>) -> Result<(), Error> {
        self.ensure_capacity()?;
        self.user_ids.push(user_id.into());
        Ok(())
    }

    /// Add a single trigger identity that should be polled
    pub fn add_trigger(&mut self, trigger_identity: impl Into<String>) -> Result<(), Error> {
        self.ensure_capacity()?;
        self.trigger_identities.push(trigger_identity.into());
        Ok(())
    }

    pub fn user_ids(&self) -> &[String] {
        &self.user_ids
    }

    pub fn trigger_identities(&self) -> &[String] {
        &self.trigger_identities
    }

    /// Combined number of entries
    pub fn len(&self) -> usize {
        self.user_ids.len() + self.trigger_identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_capacity(&self) -> Result<(), Error> {
        if self.len() >= MAX_NOTIFICATION_ENTRIES {
            return Err(Error::Capacity {
                limit: MAX_NOTIFICATION_ENTRIES,
            });
        }
        Ok(())
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "snake_case")]
enum WireEntry<'a> {
    TriggerIdentity(&'a str),
    UserId(&'a str),
}

#[derive(serde::Serialize)]
struct WireNotification<'a> {
    data: Vec<WireEntry<'a>>,
}

// Trigger identities are written before user ids.
impl Serialize for Notification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = self
            .trigger_identities
            .iter()
            .map(|id| WireEntry::TriggerIdentity(id))
            .chain(self.user_ids.iter().map(|id| WireEntry::UserId(id)))
            .collect();
        WireNotification { data }.serialize(serializer)
    }
}
