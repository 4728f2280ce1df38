//! Trigger polling types
//!
//! A poll returns a [`TriggerEventCollection`]. IFTTT deduplicates events by
//! `meta.id`, so handlers may safely report an event again as long as the id
//! is unchanged.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Key the event metadata is written under; an ingredient may not use it
pub const META_KEY: &str = "meta";

/// Number of events IFTTT asks for when the poll does not carry a `limit`
pub const DEFAULT_POLL_LIMIT: usize = 50;

/// A poll from IFTTT asking a trigger for recent events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPollRequest {
    /// Identity of the trigger instance being polled
    pub trigger_identity: String,
    /// Values of the trigger fields configured in the applet
    pub trigger_fields: HashMap<String, String>,
    /// Maximum number of events wanted; extra events are ignored by IFTTT
    pub limit: usize,
    /// IFTTT user metadata (e.g. timezone)
    pub user: HashMap<String, String>,
}

impl Default for TriggerPollRequest {
    fn default() -> Self {
        Self {
            trigger_identity: String::new(),
            trigger_fields: HashMap::new(),
            limit: DEFAULT_POLL_LIMIT,
            user: HashMap::new(),
        }
    }
}

/// Metadata of a trigger event
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TriggerEventMeta {
    /// Unique id of the event
    pub id: String,
    /// Creation or modification time of the resource behind the event
    #[serde(rename = "timestamp", with = "chrono::serde::ts_seconds")]
    pub occurred_at: DateTime<Utc>,
}

/// A single event returned from a poll
///
/// Ingredients are written inline next to the `meta` object. An ingredient
/// named `meta` is never written.
#[derive(Deserialize, Debug, Clone)]
pub struct TriggerEvent {
    #[serde(flatten)]
    pub ingredients: HashMap<String, String>,
    pub meta: TriggerEventMeta,
}

impl TriggerEvent {
    pub fn new(id: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            ingredients: HashMap::new(),
            meta: TriggerEventMeta {
                id: id.into(),
                occurred_at,
            },
        }
    }

    /// Add an ingredient to the event
    ///
    /// An ingredient keyed [`META_KEY`] is dropped on the wire.
    pub fn with_ingredient(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ingredients.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }
}

impl Serialize for TriggerEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ingredients: Vec<_> = self
            .ingredients
            .iter()
            .filter(|(key, _)| key.as_str() != META_KEY)
            .collect();

        let mut map = serializer.serialize_map(Some(ingredients.len() + 1))?;
        for (key, value) in ingredients {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(META_KEY, &self.meta)?;
        map.end()
    }
}

// Two events are the same event when their ids match.
impl PartialEq for TriggerEvent {
    fn eq(&self, other: &Self) -> bool {
        self.meta.id == other.meta.id
    }
}

impl Eq for TriggerEvent {}

impl Hash for TriggerEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.meta.id.hash(state);
    }
}

/// Events returned to a poll, sent newest first
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TriggerEventCollection(Vec<TriggerEvent>);

impl TriggerEventCollection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, event: TriggerEvent) {
        self.0.push(event);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TriggerEvent> {
        self.0.iter()
    }

    /// Order events by `occurred_at`, newest first. Ties keep no particular order.
    pub fn sort_newest_first(&mut self) {
        self.0
            .sort_unstable_by(|a, b| b.meta.occurred_at.cmp(&a.meta.occurred_at));
    }

    pub fn into_inner(self) -> Vec<TriggerEvent> {
        self.0
    }
}

impl From<Vec<TriggerEvent>> for TriggerEventCollection {
    fn from(events: Vec<TriggerEvent>) -> Self {
        Self(events)
    }
}

impl FromIterator<TriggerEvent> for TriggerEventCollection {
    fn from_iter<I: IntoIterator<Item = TriggerEvent>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TriggerEventCollection {
    type Item = TriggerEvent;
    type IntoIter = std::vec::IntoIter<TriggerEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TriggerEventCollection {
    type Item = &'a TriggerEvent;
    type IntoIter = std::slice::Iter<'a, TriggerEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
