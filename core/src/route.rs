//! `Route` — One pattern + handler candidate
//!
//! A route's pattern is compiled the first time it is needed and cached in a
//! write-once cell. Later dispatches, nested dispatches and other threads all
//! read the same compiled form; it is never rebuilt or invalidated.

use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use crate::{CompiledPattern, PatternError, PatternSource, RouteHandler};

/// A route candidate: a pattern, its lazily compiled matcher, and a handler.
///
/// # Example
///
/// ```
/// use trail::{handler_fn, Flow, Route};
///
/// let route: Route<()> = Route::new("user/:id", handler_fn(|_| Ok(Flow::Continue(()))))
///     .named("user");
///
/// assert!(!route.is_compiled());
/// assert_eq!(route.compiled().unwrap().tokens(), &["id".to_string()]);
/// assert!(route.is_compiled());
/// ```
pub struct Route<R> {
    name: Option<String>,
    pattern: PatternSource,
    compiled: OnceLock<Result<CompiledPattern, PatternError>>,
    handler: Box<dyn RouteHandler<R>>,
}

impl<R> Route<R> {
    /// Create a route from a pattern and a handler.
    pub fn new(pattern: impl Into<PatternSource>, handler: impl RouteHandler<R> + 'static) -> Self {
        Self::from_boxed(pattern.into(), Box::new(handler))
    }

    /// Create a catch-all route (no pattern).
    pub fn any(handler: impl RouteHandler<R> + 'static) -> Self {
        Self::from_boxed(PatternSource::Any, Box::new(handler))
    }

    /// Create a route from an already boxed handler.
    #[must_use]
    pub fn from_boxed(pattern: PatternSource, handler: Box<dyn RouteHandler<R>>) -> Self {
        Self {
            name: None,
            pattern,
            compiled: OnceLock::new(),
            handler,
        }
    }

    /// Name the route (used in logs, traces and errors).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The route name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The pattern source as given.
    #[must_use]
    pub fn pattern(&self) -> &PatternSource {
        &self.pattern
    }

    /// The compiled pattern, compiling it on first access.
    ///
    /// Compilation happens at most once per route; a compilation error is cached too.
    ///
    /// # Errors
    ///
    /// Returns the [`PatternError`] if the pattern is malformed.
    pub fn compiled(&self) -> Result<&CompiledPattern, PatternError> {
        self.compiled
            .get_or_init(|| {
                debug!(route = ?self.name, pattern = %self.pattern, "compiling route pattern");
                CompiledPattern::compile(&self.pattern)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns `true` once the pattern has been compiled (successfully or not).
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// The route's handler.
    #[must_use]
    pub fn handler(&self) -> &dyn RouteHandler<R> {
        self.handler.as_ref()
    }

    /// Label used when reporting this route: its name, or its pattern.
    pub(crate) fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.pattern.to_string())
    }
}

impl<R> fmt::Debug for Route<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("pattern", &self.pattern.to_string())
            .field("compiled", &self.is_compiled())
            .finish_non_exhaustive()
    }
}
