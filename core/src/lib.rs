//! trail - Route-pattern matching, path synthesis and sequential dispatch
//!
//! A small routing engine: route patterns with named tokens and optional groups
//! are compiled into matchers, matched against paths, and the matched routes'
//! handlers are run left to right until one rejects.
//!
//! # Architecture
//!
//! - [`CompiledPattern`] — Parsed pattern + backtracking matcher (or a pre-built regex)
//! - [`RouteMatch`] — Coerced captures, positional and by token name
//! - [`Template`] / [`synthesize`] — Expand a pattern back into a path from a data bag
//! - [`Route<R>`] — Pattern + handler, compiled once on first use
//! - [`RouteHandler<R>`] — Handler contract returning [`Flow<R>`]
//! - [`Router<R>`] / [`dispatch`] — Sequential fold producing an [`Outcome<R>`]
//!
//! # Key Design Insights
//!
//! 1. **Rejection is a variant, not a value**: handlers return `Flow::Reject` to stop
//!    the chain. A handler that produces `false` keeps the chain going.
//!
//! 2. **Compile once**: a route's pattern is compiled on first use and cached in a
//!    `OnceLock`. Routes are `Send + Sync`; nested dispatches share the cache.
//!
//! 3. **Synthesis truncates**: an unresolved token cuts the synthesized path, so a
//!    `route/set` with partial data still yields a usable prefix.
//!
//! # Example
//!
//! ```
//! use trail::prelude::*;
//!
//! let router: Router<String> = Router::new()
//!     .with_route(Route::new("user/:id", handler_fn(|call| {
//!         let id = call.args.positional()[0].clone();
//!         Ok(Flow::Continue(format!("user {id}")))
//!     })))
//!     .with_route(Route::new("admin", handler_fn(|_| Ok(Flow::Reject))));
//!
//! let outcome = router.dispatch(&Operation::change("user/42")).unwrap();
//! assert_eq!(outcome, Outcome::Handled("user 42".to_string()));
//!
//! let outcome = router.dispatch(&Operation::change("admin")).unwrap();
//! assert!(outcome.is_rejected());
//! ```
//!
//! # Features
//!
//! - `serde` — `Serialize`/`Deserialize` for [`RouteValue`]
//! - `registry` — Config-driven router construction from JSON/YAML via type URLs

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod dispatch;
mod handler;
mod pattern;
mod route;
mod route_match;
mod route_value;
mod synthesize;
mod trace;

#[cfg(feature = "registry")]
mod config;
#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use dispatch::{dispatch, Operation, OperationKind, Outcome, Router};
pub use handler::{handler_fn, Flow, HandlerError, HandlerFn, RouteArgs, RouteCall, RouteHandler};
pub use pattern::{CompiledPattern, PatternSource};
pub use route::Route;
pub use route_match::RouteMatch;
pub use route_value::{RouteData, RouteValue};
pub use synthesize::{synthesize, Template};

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use config::{RouteConfig, RouterConfig, TypedConfig, UnitConfig};
#[cfg(feature = "registry")]
pub use registry::{HandlerRegistry, HandlerRegistryBuilder, IntoHandler};

// Trace types
pub use trace::{DispatchStep, DispatchTrace, StepFlow};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use trail::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core types
        dispatch,
        handler_fn,
        synthesize,
        CompiledPattern,
        // Trace types
        DispatchStep,
        DispatchTrace,
        Flow,
        // Errors
        HandlerError,
        Operation,
        OperationKind,
        Outcome,
        PatternError,
        PatternSource,
        Route,
        RouteArgs,
        RouteCall,
        RouteData,
        RouteError,
        // Traits
        RouteHandler,
        RouteMatch,
        RouteValue,
        Router,
        StepFlow,
        Template,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length of a route pattern, template or regex source.
pub const MAX_PATTERN_LENGTH: usize = 4096;

/// Maximum number of tokens in a single pattern.
///
/// Bounds the capture slots cloned on every backtracking step.
pub const MAX_TOKENS: usize = 64;

/// Maximum number of routes loaded from a single config.
///
/// Only enforced by the config loader; a [`Router`] built in code is not capped.
pub const MAX_ROUTES: usize = 1024;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from parsing a pattern or template.
///
/// Cached alongside the compiled form, so it is `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// A `(` without `)` or a `)` without `(`.
    #[error("unbalanced group in pattern \"{pattern}\" at byte {position}")]
    Unbalanced {
        /// The pattern that failed to parse.
        pattern: String,
        /// Byte offset of the offending parenthesis.
        position: usize,
    },
    /// A `(` inside an open group.
    #[error("nested group in pattern \"{pattern}\" at byte {position} — groups cannot contain groups")]
    NestedGroup {
        /// The pattern that failed to parse.
        pattern: String,
        /// Byte offset of the inner `(`.
        position: usize,
    },
    /// A group with nothing inside.
    #[error("empty group in pattern \"{pattern}\" at byte {position}")]
    EmptyGroup {
        /// The pattern that failed to parse.
        pattern: String,
        /// Byte offset of the `(`.
        position: usize,
    },
    /// The same token name declared twice.
    #[error("token \":{name}\" appears more than once in pattern \"{pattern}\"")]
    DuplicateToken {
        /// The pattern that failed to parse.
        pattern: String,
        /// The repeated token name.
        name: String,
    },
    /// The pattern exceeds [`MAX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// The pattern declares more than [`MAX_TOKENS`] tokens.
    #[error("pattern has {count} tokens, but maximum allowed is {max}")]
    TooManyTokens {
        /// Actual token count.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// A regex source failed to compile.
    #[error("invalid regex \"{pattern}\": {reason}")]
    InvalidRegex {
        /// The regex that failed to compile.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },
}

/// Errors from dispatching an operation or loading a router.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The operation type is neither `route/change` nor `route/set`.
    #[error("unsupported operation \"{kind}\" — expected \"route/change\" or \"route/set\"")]
    UnsupportedOperation {
        /// The operation type as given.
        kind: String,
    },
    /// A route's pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),
    /// A handler returned an error. The dispatch stopped at this route.
    #[error("handler for route {index} ({route}) failed")]
    Handler {
        /// Position of the route in the dispatched sequence.
        index: usize,
        /// Route name, or its pattern if unnamed.
        route: String,
        /// The handler's error.
        #[source]
        source: HandlerError,
    },
    /// Configuration deserialization or construction failed.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },
    /// A handler type URL was not found in the registry.
    #[error("unknown handler type URL \"{type_url}\"{}", registered_hint(.available))]
    UnknownTypeUrl {
        /// The unregistered type URL.
        type_url: String,
        /// Type URLs that are registered.
        available: Vec<String>,
    },
    /// The config declares more than [`MAX_ROUTES`] routes.
    #[error("config has {count} routes, but maximum allowed is {max}")]
    TooManyRoutes {
        /// Actual route count.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
}

fn registered_hint(available: &[String]) -> String {
    if available.is_empty() {
        " — no handler types are registered".to_owned()
    } else {
        format!(" — registered: {}", available.join(", "))
    }
}
