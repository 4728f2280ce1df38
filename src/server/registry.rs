//! Handler registry
//!
//! Maps slugs to trigger and action handlers. Both maps exist from
//! construction on and sit behind read-write locks, so handlers may be
//! registered while requests are being served. Lookups hand out a cloned
//! `Arc` and never hold a lock across a handler call.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::server::handlers::{Action, Trigger};

/// Registry of trigger and action handlers, keyed by slug
///
/// A trigger and an action may share a slug; within one kind a later
/// registration replaces the earlier one.
#[derive(Default)]
pub struct HandlerRegistry {
    /// Triggers by slug
    triggers: RwLock<HashMap<String, Arc<dyn Trigger>>>,

    /// Actions by slug
    actions: RwLock<HashMap<String, Arc<dyn Action>>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            triggers: RwLock::new(HashMap::new()),
            actions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a trigger, returning the handler it replaced
    pub async fn register_trigger<T>(
        &self,
        slug: impl Into<String>,
        trigger: T,
    ) -> Option<Arc<dyn Trigger>>
    where
        T: Trigger,
    {
        self.register_trigger_arc(slug, Arc::new(trigger)).await
    }

    /// Register a shared trigger, returning the handler it replaced
    pub async fn register_trigger_arc(
        &self,
        slug: impl Into<String>,
        trigger: Arc<dyn Trigger>,
    ) -> Option<Arc<dyn Trigger>> {
        let slug = slug.into();
        info!("Registering trigger: {}", slug);
        let mut triggers = self.triggers.write().await;
        let previous = triggers.insert(slug, trigger);
        if previous.is_some() {
            debug!("Replaced an existing trigger registration");
        }
        previous
    }

    /// Register an action, returning the handler it replaced
    pub async fn register_action<A>(
        &self,
        slug: impl Into<String>,
        action: A,
    ) -> Option<Arc<dyn Action>>
    where
        A: Action,
    {
        self.register_action_arc(slug, Arc::new(action)).await
    }

    /// Register a shared action, returning the handler it replaced
    pub async fn register_action_arc(
        &self,
        slug: impl Into<String>,
        action: Arc<dyn Action>,
    ) -> Option<Arc<dyn Action>> {
        let slug = slug.into();
        info!("Registering action: {}", slug);
        let mut actions = self.actions.write().await;
        let previous = actions.insert(slug, action);
        if previous.is_some() {
            debug!("Replaced an existing action registration");
        }
        previous
    }

    /// Look up a trigger by slug
    pub async fn trigger(&self, slug: &str) -> Option<Arc<dyn Trigger>> {
        self.triggers.read().await.get(slug).cloned()
    }

    /// Look up an action by slug
    pub async fn action(&self, slug: &str) -> Option<Arc<dyn Action>> {
        self.actions.read().await.get(slug).cloned()
    }

    /// Slugs of all registered triggers, sorted
    pub async fn trigger_slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self.triggers.read().await.keys().cloned().collect();
        slugs.sort();
        slugs
    }

    /// Slugs of all registered actions, sorted
    pub async fn action_slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self.actions.read().await.keys().cloned().collect();
        slugs.sort();
        slugs
    }
}
