//! `RouteHandler` — The callable side of a route
//!
//! A handler is invoked with a [`RouteCall`] describing the match and returns a
//! [`Flow`]: either continue with a result, or reject and stop the chain.
//! The handler is its own receiver: whatever state it needs lives in `self`.

use crate::{OperationKind, RouteMatch, RouteValue};

/// Error type handlers may fail with. Propagated to the caller untouched.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// What a handler wants the dispatcher to do next.
///
/// `Reject` is distinct from any result value: a handler that legitimately
/// produces `false` returns `Flow::Continue(false)` and the chain goes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<R> {
    /// Record this result and keep evaluating later routes.
    Continue(R),
    /// Stop the chain. No later route is evaluated.
    Reject,
}

/// Arguments passed to a handler, shaped by the operation kind.
#[derive(Debug, Clone, Copy)]
pub enum RouteArgs<'a> {
    /// `route/change`: coerced captures by position, then the extra arguments.
    Change {
        /// Coerced capture values in pattern order.
        captures: &'a [RouteValue],
        /// Extra arguments supplied with the operation.
        extra: &'a [RouteValue],
    },
    /// `route/set`: the full match, then the extra arguments.
    Set {
        /// The full match for the synthesized path.
        matched: &'a RouteMatch,
        /// Extra arguments supplied with the operation.
        extra: &'a [RouteValue],
    },
}

impl<'a> RouteArgs<'a> {
    /// Extra arguments supplied with the operation.
    #[must_use]
    pub fn extra(&self) -> &'a [RouteValue] {
        match *self {
            Self::Change { extra, .. } | Self::Set { extra, .. } => extra,
        }
    }

    /// The full match, for `route/set` calls.
    #[must_use]
    pub fn route_match(&self) -> Option<&'a RouteMatch> {
        match *self {
            Self::Change { .. } => None,
            Self::Set { matched, .. } => Some(matched),
        }
    }

    /// Flattened positional argument list.
    ///
    /// For `route/change` this is the captures followed by the extra arguments.
    /// For `route/set` the match is not a value, so only its captures are listed
    /// before the extra arguments.
    #[must_use]
    pub fn positional(&self) -> Vec<RouteValue> {
        let captures = match *self {
            Self::Change { captures, .. } => captures,
            Self::Set { matched, .. } => matched.values(),
        };
        captures.iter().chain(self.extra()).cloned().collect()
    }
}

/// A single handler invocation.
#[derive(Debug, Clone, Copy)]
pub struct RouteCall<'a> {
    /// Position of the route in the dispatched sequence.
    pub index: usize,
    /// Route name, if one was given.
    pub route: Option<&'a str>,
    /// The operation being dispatched.
    pub kind: OperationKind,
    /// The effective path (synthesized for `route/set`).
    pub path: &'a str,
    /// Handler arguments.
    pub args: RouteArgs<'a>,
}

/// Handles a matched route.
///
/// Implemented for any [`HandlerFn`] built with [`handler_fn`], so plain closures
/// work as handlers:
///
/// ```
/// use trail::{handler_fn, Flow, Operation, Route, Router, RouteValue};
///
/// let router = Router::new().with_route(Route::new(
///     "user/:id",
///     handler_fn(|call| {
///         let id = call.args.positional()[0].clone();
///         Ok(Flow::Continue(id))
///     }),
/// ));
///
/// let outcome = router.dispatch(&Operation::change("user/7")).unwrap();
/// assert_eq!(outcome.into_value(), Some(RouteValue::Int(7)));
/// ```
pub trait RouteHandler<R>: Send + Sync {
    /// Handle one call.
    ///
    /// # Errors
    ///
    /// Any error aborts the dispatch and is returned to the caller.
    fn handle(&self, call: &RouteCall<'_>) -> Result<Flow<R>, HandlerError>;
}

impl<R> RouteHandler<R> for Box<dyn RouteHandler<R>> {
    fn handle(&self, call: &RouteCall<'_>) -> Result<Flow<R>, HandlerError> {
        (**self).handle(call)
    }
}

/// A handler backed by a closure. Built with [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap a closure as a [`RouteHandler`].
pub fn handler_fn<R, F>(f: F) -> HandlerFn<F>
where
    F: Fn(&RouteCall<'_>) -> Result<Flow<R>, HandlerError> + Send + Sync,
{
    HandlerFn { f }
}

impl<R, F> RouteHandler<R> for HandlerFn<F>
where
    F: Fn(&RouteCall<'_>) -> Result<Flow<R>, HandlerError> + Send + Sync,
{
    fn handle(&self, call: &RouteCall<'_>) -> Result<Flow<R>, HandlerError> {
        (self.f)(call)
    }
}

impl<F> std::fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}
