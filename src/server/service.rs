//! Service implementation
//!
//! The [`Service`] holds everything the dispatch engine needs: the shared
//! service key, the optional health check and user-info provider, and the
//! handler registry. It is configured through [`ServiceBuilder`] and is
//! read-only once built.

use std::sync::Arc;
use tracing::info;

use crate::client::{Notifier, NotifierOptions};
use crate::errors::Error;
use crate::server::handlers::{Action, Trigger, UserInfoFn, UserInfoProvider};
use crate::server::registry::HandlerRegistry;

/// Environment variable read by [`ServiceBuilder::from_env`]
pub const SERVICE_KEY_ENV: &str = "IFTTT_SERVICE_KEY";

/// Predicate reporting whether the service is functioning normally
pub type HealthCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// An IFTTT service: answers requests from IFTTT and routes them to handlers
pub struct Service {
    /// Shared secret IFTTT proves itself with
    pub(super) service_key: String,

    /// Health predicate; the service counts as healthy without one
    pub(super) health_check: Option<HealthCheck>,

    /// Provider answering user info requests
    pub(super) user_info: Option<Arc<dyn UserInfoProvider>>,

    /// Registered triggers and actions
    pub(super) registry: Arc<HandlerRegistry>,
}

impl Service {
    /// Create a new service builder
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    pub fn service_key(&self) -> &str {
        &self.service_key
    }

    /// Get the handler registry
    ///
    /// Registering through it while serving is safe; lookups never observe a
    /// half-updated map.
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Whether the health check (if any) reports the service as healthy
    pub fn is_healthy(&self) -> bool {
        self.health_check.as_ref().is_none_or(|check| check())
    }

    /// Whether user info requests can be answered
    pub fn has_user_info(&self) -> bool {
        self.user_info.is_some()
    }

    /// Create a realtime notifier that authenticates with this service's key
    pub fn notifier(&self) -> Result<Notifier, Error> {
        Notifier::new(self.service_key.clone())
    }

    /// Create a realtime notifier with custom options
    pub fn notifier_with_options(&self, options: NotifierOptions) -> Result<Notifier, Error> {
        Notifier::with_options(self.service_key.clone(), options)
    }
}

/// Builder for configuring and creating a [`Service`]
#[derive(Default)]
pub struct ServiceBuilder {
    /// Service key
    service_key: Option<String>,

    /// Health check
    health_check: Option<HealthCheck>,

    /// User info provider
    user_info: Option<Arc<dyn UserInfoProvider>>,

    /// Registry to use instead of a fresh one
    registry: Option<Arc<HandlerRegistry>>,

    /// Triggers to register during build
    triggers: Vec<(String, Arc<dyn Trigger>)>,

    /// Actions to register during build
    actions: Vec<(String, Arc<dyn Action>)>,
}

impl ServiceBuilder {
    /// Create a new service builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with the service key taken from `IFTTT_SERVICE_KEY`
    pub fn from_env() -> Self {
        let builder = Self::new();
        match std::env::var(SERVICE_KEY_ENV) {
            Ok(key) => builder.with_service_key(key),
            Err(_) => builder,
        }
    }

    /// Set the service key
    pub fn with_service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = Some(key.into());
        self
    }

    /// Set the health check
    pub fn with_health_check<F>(mut self, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.health_check = Some(Arc::new(check));
        self
    }

    /// Set the user info provider
    pub fn with_user_info<P>(mut self, provider: P) -> Self
    where
        P: UserInfoProvider,
    {
        self.user_info = Some(Arc::new(provider));
        self
    }

    /// Set the user info provider from an async closure
    pub fn with_user_info_fn<F>(self, provider: F) -> Self
    where
        UserInfoFn<F>: UserInfoProvider,
    {
        self.with_user_info(UserInfoFn(provider))
    }

    /// Use an existing registry
    pub fn with_registry(mut self, registry: Arc<HandlerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Register a trigger to be added during build
    pub fn register_trigger<T>(mut self, slug: impl Into<String>, trigger: T) -> Self
    where
        T: Trigger,
    {
        self.triggers.push((slug.into(), Arc::new(trigger)));
        self
    }

    /// Register an action to be added during build
    pub fn register_action<A>(mut self, slug: impl Into<String>, action: A) -> Self
    where
        A: Action,
    {
        self.actions.push((slug.into(), Arc::new(action)));
        self
    }

    /// Build the service with the configured options
    pub async fn build(self) -> Result<Service, Error> {
        let service_key = match self.service_key {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(Error::Config(format!(
                    "a service key is required (set it on the builder or via {})",
                    SERVICE_KEY_ENV
                )));
            }
        };

        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(HandlerRegistry::new()));

        for (slug, trigger) in self.triggers {
            registry.register_trigger_arc(slug, trigger).await;
        }
        for (slug, action) in self.actions {
            registry.register_action_arc(slug, action).await;
        }

        info!(
            triggers = ?registry.trigger_slugs().await,
            actions = ?registry.action_slugs().await,
            "IFTTT service built"
        );

        Ok(Service {
            service_key,
            health_check: self.health_check,
            user_info: self.user_info,
            registry,
        })
    }
}
