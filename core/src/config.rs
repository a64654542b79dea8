//! Config types for config-driven router construction.
//!
//! These types mirror the runtime router types but are serde-deserializable,
//! enabling config-driven construction via [`HandlerRegistry::load_router()`](crate::HandlerRegistry::load_router).
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Loader method |
//! |-------------|-------------|---------------|
//! | [`RouterConfig`] | [`Router`](crate::Router) | `HandlerRegistry::load_router()` |
//! | [`RouteConfig`] | [`Route`](crate::Route) | `HandlerRegistry::load_route()` |
//! | [`TypedConfig`] | `Box<dyn RouteHandler<R>>` | via registry factory |
//!
//! # Example
//!
//! ```yaml
//! routes:
//!   - name: user
//!     pattern: "user/:id"
//!     handler: { type_url: "trail.test.v1.Echo" }
//!   - regex: "^legacy/(\\d+)$"
//!     handler: { type_url: "trail.test.v1.Reject" }
//!   - handler: { type_url: "trail.test.v1.Constant", config: { value: "fallback" } }
//! ```

use serde::Deserialize;

use crate::{PatternSource, RouteError};

/// Configuration for a [`Router`](crate::Router).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Routes in evaluation order.
    pub routes: Vec<RouteConfig>,
}

/// Configuration for a single [`Route`](crate::Route).
///
/// `pattern` and `regex` are mutually exclusive. A route with neither is a
/// catch-all.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Optional route name (used in logs, traces and errors).
    #[serde(default)]
    pub name: Option<String>,

    /// A route pattern (`user/:id`, `list/(:page/)`).
    #[serde(default)]
    pub pattern: Option<String>,

    /// A regex, used as-is with positional captures.
    #[serde(default)]
    pub regex: Option<String>,

    /// The handler, resolved through the registry.
    pub handler: TypedConfig,
}

impl RouteConfig {
    /// The pattern source this config describes.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if both `pattern` and `regex` are set,
    /// or [`RouteError::Pattern`] if the regex does not compile.
    pub fn pattern_source(&self) -> Result<PatternSource, RouteError> {
        match (&self.pattern, &self.regex) {
            (Some(_), Some(_)) => Err(RouteError::InvalidConfig {
                reason: format!(
                    "route {} sets both `pattern` and `regex` — pick one",
                    self.name.as_deref().unwrap_or("<unnamed>")
                ),
            }),
            (Some(pattern), None) => Ok(PatternSource::from(pattern.as_str())),
            (None, Some(regex)) => Ok(PatternSource::regex(regex)?),
            (None, None) => Ok(PatternSource::Any),
        }
    }
}

/// Reference to a registered handler type with its configuration.
///
/// - `type_url` identifies the registered type
/// - `config` carries the type-specific configuration payload
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypedConfig {
    /// The type URL identifying the registered handler type.
    /// Must match a `type_url` registered in the [`HandlerRegistry`](crate::HandlerRegistry).
    pub type_url: String,

    /// Type-specific configuration payload.
    /// Deserialized as the `Config` associated type of the registered [`IntoHandler`](crate::IntoHandler).
    #[serde(default = "default_config")]
    pub config: serde_json::Value,
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Empty configuration for handler types that need none.
///
/// Accepts any value (`{}`, `null`, etc.) and ignores it.
#[derive(Debug, Clone, Copy)]
pub struct UnitConfig;

impl<'de> Deserialize<'de> for UnitConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(UnitConfig)
    }
}
