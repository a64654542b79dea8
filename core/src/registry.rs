//! Handler registry for config-driven router construction.
//!
//! The registry enables **generic config loading**: JSON/YAML config -> `Router<R>`
//! without domain-specific wiring code.
//!
//! # Architecture
//!
//! Each handler type registers itself via [`IntoHandler`]. At registration time the
//! concrete type `T` is monomorphized into a closure and erased behind `Box<dyn Fn>`:
//! early type erasure at registration, late invocation at load time.
//!
//! # Example
//!
//! ```
//! use serde::Deserialize;
//! use trail::prelude::*;
//! use trail::{HandlerRegistryBuilder, IntoHandler, RouterConfig};
//!
//! struct Greet { greeting: String }
//!
//! #[derive(Deserialize)]
//! struct GreetConfig { greeting: String }
//!
//! impl RouteHandler<String> for Greet {
//!     fn handle(&self, call: &RouteCall<'_>) -> Result<Flow<String>, HandlerError> {
//!         Ok(Flow::Continue(format!("{} {}", self.greeting, call.args.positional()[0])))
//!     }
//! }
//!
//! impl IntoHandler<String> for Greet {
//!     type Config = GreetConfig;
//!     fn from_config(config: GreetConfig) -> Result<Box<dyn RouteHandler<String>>, RouteError> {
//!         Ok(Box::new(Greet { greeting: config.greeting }))
//!     }
//! }
//!
//! let registry = HandlerRegistryBuilder::new()
//!     .handler::<Greet>("example.v1.Greet")
//!     .build();
//!
//! let config: RouterConfig = serde_json::from_str(r#"{
//!     "routes": [{
//!         "pattern": "hello/:name",
//!         "handler": { "type_url": "example.v1.Greet", "config": { "greeting": "hi" } }
//!     }]
//! }"#).unwrap();
//!
//! let router = registry.load_router(config).unwrap();
//! assert_eq!(router.change("hello/ada").unwrap(), Outcome::Handled("hi ada".into()));
//! ```

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{RouteConfig, RouterConfig, TypedConfig};
use crate::{Route, RouteError, RouteHandler, Router, MAX_ROUTES};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for handler types that can be constructed from configuration.
///
/// Each handler type knows its own config shape via the associated `Config` type.
/// The registry calls [`from_config`](Self::from_config) to construct the handler
/// at load time.
pub trait IntoHandler<R>: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct a handler from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if the config is semantically invalid.
    fn from_config(config: Self::Config) -> Result<Box<dyn RouteHandler<R>>, RouteError>;
}

/// Type-erased handler factory closure.
type BoxedHandlerFactory<R> = Box<
    dyn Fn(&serde_json::Value) -> Result<Box<dyn RouteHandler<R>>, RouteError> + Send + Sync,
>;

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`HandlerRegistry`].
///
/// Register handler types with their type URLs, then call [`build()`](Self::build)
/// to produce an immutable registry. No registration is possible after `build()`.
pub struct HandlerRegistryBuilder<R> {
    factories: HashMap<String, BoxedHandlerFactory<R>>,
}

impl<R: 'static> HandlerRegistryBuilder<R> {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a handler type with a type URL.
    ///
    /// The concrete type `T` is monomorphized here and erased behind a closure.
    /// At load time, the registry deserializes config as `T::Config` and calls
    /// `T::from_config()` to produce the handler.
    #[must_use]
    pub fn handler<T: IntoHandler<R>>(mut self, type_url: &str) -> Self {
        let url = type_url.to_owned();
        self.factories.insert(
            type_url.to_owned(),
            Box::new(move |value: &serde_json::Value| {
                let config: T::Config =
                    serde_json::from_value(value.clone()).map_err(|e| RouteError::InvalidConfig {
                        reason: format!("{url}: {e}"),
                    })?;
                T::from_config(config)
            }),
        );
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> HandlerRegistry<R> {
        HandlerRegistry {
            factories: self.factories,
        }
    }
}

impl<R: 'static> Default for HandlerRegistryBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable registry of handler factories.
///
/// Constructed via [`HandlerRegistryBuilder`]. Use [`load_router()`](Self::load_router)
/// to turn config into a runtime [`Router`].
pub struct HandlerRegistry<R> {
    factories: HashMap<String, BoxedHandlerFactory<R>>,
}

impl<R: 'static> HandlerRegistry<R> {
    /// Load a `Router` from configuration.
    ///
    /// Every route's handler is constructed and every pattern is compiled here, so a
    /// misconfigured router fails at load time rather than on first dispatch.
    ///
    /// # Errors
    ///
    /// - [`RouteError::TooManyRoutes`] — more than [`MAX_ROUTES`] routes
    /// - [`RouteError::UnknownTypeUrl`] — handler `type_url` not registered
    /// - [`RouteError::InvalidConfig`] — config deserialization or construction failed
    /// - [`RouteError::Pattern`] — a pattern or regex is malformed
    pub fn load_router(&self, config: RouterConfig) -> Result<Router<R>, RouteError> {
        if config.routes.len() > MAX_ROUTES {
            return Err(RouteError::TooManyRoutes {
                count: config.routes.len(),
                max: MAX_ROUTES,
            });
        }
        let router = config
            .routes
            .into_iter()
            .map(|route| self.load_route(route))
            .collect::<Result<Router<R>, _>>()?;
        debug!(routes = router.len(), "loaded router from config");
        Ok(router)
    }

    /// Load a single `Route` from configuration.
    ///
    /// # Errors
    ///
    /// Same as [`load_router()`](Self::load_router), minus the route count limit.
    pub fn load_route(&self, config: RouteConfig) -> Result<Route<R>, RouteError> {
        let source = config.pattern_source()?;
        let handler = self.resolve(&config.handler)?;
        let mut route = Route::from_boxed(source, handler);
        if let Some(name) = config.name {
            route = route.named(name);
        }
        route.compiled()?;
        Ok(route)
    }

    /// Returns the number of registered handler types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no handler types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns `true` if the given type URL is registered.
    #[must_use]
    pub fn contains(&self, type_url: &str) -> bool {
        self.factories.contains_key(type_url)
    }

    /// Returns the registered type URLs, sorted.
    #[must_use]
    pub fn type_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }

    fn resolve(&self, config: &TypedConfig) -> Result<Box<dyn RouteHandler<R>>, RouteError> {
        let factory =
            self.factories
                .get(&config.type_url)
                .ok_or_else(|| RouteError::UnknownTypeUrl {
                    type_url: config.type_url.clone(),
                    available: self.type_urls().into_iter().map(str::to_owned).collect(),
                })?;
        factory(&config.config)
    }
}

impl<R> std::fmt::Debug for HandlerRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut urls: Vec<&String> = self.factories.keys().collect();
        urls.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("type_urls", &urls)
            .finish()
    }
}
