//! Sequential dispatch — fold an operation over an ordered list of routes
//!
//! Every matching route's handler runs in order. The accumulated [`Outcome`] is
//! the last handler result; once a handler rejects, no later route is evaluated.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::trace::{DispatchStep, DispatchTrace, StepFlow};
use crate::{
    synthesize, Flow, PatternError, Route, RouteArgs, RouteCall, RouteData, RouteError, RouteValue,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Operation
// ═══════════════════════════════════════════════════════════════════════════════

/// The kind of routing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// `route/change`: match the given path as-is.
    Change,
    /// `route/set`: synthesize the path from a template and a data bag first.
    Set,
}

impl OperationKind {
    /// The event type string for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Change => "route/change",
            Self::Set => "route/set",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "route/change" => Ok(Self::Change),
            "route/set" => Ok(Self::Set),
            other => Err(RouteError::UnsupportedOperation {
                kind: other.to_owned(),
            }),
        }
    }
}

/// An operation to dispatch.
///
/// For [`OperationKind::Set`] the path is a template, expanded with the data bag
/// before matching.
///
/// # Example
///
/// ```
/// use trail::{Operation, OperationKind, RouteData, RouteValue};
///
/// let mut data = RouteData::new();
/// data.insert("id".into(), RouteValue::Int(7));
///
/// let op = Operation::set("user/:id/:tab", data).with_arg("extra");
/// assert_eq!(op.kind(), OperationKind::Set);
/// assert_eq!(op.effective_path().unwrap(), "user/7/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    kind: OperationKind,
    path: String,
    data: RouteData,
    args: Vec<RouteValue>,
}

impl Operation {
    /// A `route/change` operation for a concrete path.
    #[must_use]
    pub fn change(path: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Change,
            path: path.into(),
            data: RouteData::new(),
            args: Vec::new(),
        }
    }

    /// A `route/set` operation for a template and its data bag.
    #[must_use]
    pub fn set(template: impl Into<String>, data: RouteData) -> Self {
        Self {
            kind: OperationKind::Set,
            path: template.into(),
            data,
            args: Vec::new(),
        }
    }

    /// Build an operation from an event type string.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnsupportedOperation`] if `kind` is neither
    /// `route/change` nor `route/set`.
    pub fn from_event(
        kind: &str,
        path: impl Into<String>,
        data: RouteData,
        args: Vec<RouteValue>,
    ) -> Result<Self, RouteError> {
        Ok(Self {
            kind: kind.parse()?,
            path: path.into(),
            data,
            args,
        })
    }

    /// Append one extra handler argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<RouteValue>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append extra handler arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = RouteValue>) -> Self {
        self.args.extend(args);
        self
    }

    /// The operation kind.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The path (or template, for `route/set`) as given.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The data bag used for synthesis.
    #[must_use]
    pub fn data(&self) -> &RouteData {
        &self.data
    }

    /// Extra arguments appended to every handler call.
    #[must_use]
    pub fn args(&self) -> &[RouteValue] {
        &self.args
    }

    /// The path routes are matched against.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if a `route/set` template is malformed.
    pub fn effective_path(&self) -> Result<String, PatternError> {
        match self.kind {
            OperationKind::Change => Ok(self.path.clone()),
            OperationKind::Set => synthesize(&self.path, &self.data),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Outcome
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    /// No route matched (or no route was given).
    NoMatch,
    /// The last matching handler's result.
    Handled(R),
    /// A handler rejected; later routes were not evaluated.
    Rejected,
}

impl<R> Outcome<R> {
    /// Returns `true` if a handler rejected.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Returns `true` if at least one handler ran and none rejected.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// Returns `true` if no route matched.
    #[must_use]
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }

    /// The handled result, if any.
    #[must_use]
    pub fn value(&self) -> Option<&R> {
        match self {
            Self::Handled(v) => Some(v),
            Self::NoMatch | Self::Rejected => None,
        }
    }

    /// Consume the outcome, returning the handled result, if any.
    #[must_use]
    pub fn into_value(self) -> Option<R> {
        match self {
            Self::Handled(v) => Some(v),
            Self::NoMatch | Self::Rejected => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Dispatch
// ═══════════════════════════════════════════════════════════════════════════════

/// Dispatch an operation over an ordered sequence of routes.
///
/// The candidates are snapshotted up front. Each route's pattern is compiled on
/// first use; a compile error aborts the dispatch. Handler errors abort it too
/// and are returned as [`RouteError::Handler`].
///
/// # Errors
///
/// Returns a [`RouteError`] if the `route/set` template or a route pattern is
/// malformed, or if a handler fails.
///
/// # Example
///
/// ```
/// use trail::{dispatch, handler_fn, Flow, Operation, Outcome, Route};
///
/// let routes: Vec<Route<&str>> = vec![
///     Route::new("a", handler_fn(|_| Ok(Flow::Continue("first")))),
///     Route::any(handler_fn(|_| Ok(Flow::Continue("last")))),
/// ];
///
/// let outcome = dispatch(&Operation::change("a"), &routes).unwrap();
/// assert_eq!(outcome, Outcome::Handled("last"));
/// ```
pub fn dispatch<'c, R: 'c>(
    op: &Operation,
    candidates: impl IntoIterator<Item = &'c Route<R>>,
) -> Result<Outcome<R>, RouteError> {
    run(op, candidates, None).map(|run| run.outcome)
}

struct Run<R> {
    path: String,
    outcome: Outcome<R>,
    skipped: usize,
}

fn run<'c, R: 'c>(
    op: &Operation,
    candidates: impl IntoIterator<Item = &'c Route<R>>,
    mut steps: Option<&mut Vec<DispatchStep>>,
) -> Result<Run<R>, RouteError> {
    let path = op.effective_path()?;
    let routes: Vec<&Route<R>> = candidates.into_iter().collect();
    debug!(kind = %op.kind, path = %path, routes = routes.len(), "dispatching");

    let mut outcome = Outcome::NoMatch;
    let mut skipped = 0;

    for (index, route) in routes.iter().enumerate() {
        let compiled = route.compiled()?;

        let Some(matched) = compiled.match_path(&path) else {
            trace!(index, route = %route.label(), "no match");
            record(&mut steps, index, route, None);
            continue;
        };

        trace!(index, route = %route.label(), captures = ?matched.values(), "matched");
        let args = match op.kind {
            OperationKind::Change => RouteArgs::Change {
                captures: matched.values(),
                extra: &op.args,
            },
            OperationKind::Set => RouteArgs::Set {
                matched: &matched,
                extra: &op.args,
            },
        };
        let call = RouteCall {
            index,
            route: route.name(),
            kind: op.kind,
            path: &path,
            args,
        };

        let flow = route
            .handler()
            .handle(&call)
            .map_err(|source| RouteError::Handler {
                index,
                route: route.label(),
                source,
            })?;

        match flow {
            Flow::Continue(value) => {
                record(&mut steps, index, route, Some(StepFlow::Continued));
                outcome = Outcome::Handled(value);
            }
            Flow::Reject => {
                record(&mut steps, index, route, Some(StepFlow::Rejected));
                outcome = Outcome::Rejected;
                skipped = routes.len() - index - 1;
                debug!(index, route = %route.label(), skipped, "rejected, stopping dispatch");
                break;
            }
        }
    }

    Ok(Run {
        path,
        outcome,
        skipped,
    })
}

fn record<R>(
    steps: &mut Option<&mut Vec<DispatchStep>>,
    index: usize,
    route: &Route<R>,
    flow: Option<StepFlow>,
) {
    if let Some(steps) = steps {
        steps.push(DispatchStep {
            index,
            route: route.name().map(str::to_owned),
            pattern: route.pattern().to_string(),
            matched: flow.is_some(),
            flow,
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Router
// ═══════════════════════════════════════════════════════════════════════════════

/// An ordered list of routes.
///
/// Routes are evaluated in insertion order. A router is `Send + Sync` and can be
/// dispatched from several threads, or re-entrantly from inside a handler.
///
/// # Example
///
/// ```
/// use trail::prelude::*;
///
/// let router: Router<i64> = Router::new()
///     .with_route(Route::new("page/:n", handler_fn(|call| {
///         Ok(Flow::Continue(call.args.positional()[0].as_int().unwrap_or(0)))
///     })));
///
/// assert_eq!(router.change("page/3").unwrap(), Outcome::Handled(3));
/// assert_eq!(router.change("other").unwrap(), Outcome::NoMatch);
/// ```
pub struct Router<R> {
    routes: Vec<Route<R>>,
}

impl<R> Router<R> {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append a route, builder style.
    #[must_use]
    pub fn with_route(mut self, route: Route<R>) -> Self {
        self.routes.push(route);
        self
    }

    /// Append a route.
    pub fn push(&mut self, route: Route<R>) {
        self.routes.push(route);
    }

    /// The routes, in evaluation order.
    #[must_use]
    pub fn routes(&self) -> &[Route<R>] {
        &self.routes
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the router has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Compile every route pattern now.
    ///
    /// # Errors
    ///
    /// Returns the first [`PatternError`] encountered.
    pub fn validate(&self) -> Result<(), PatternError> {
        for route in &self.routes {
            route.compiled()?;
        }
        Ok(())
    }

    /// Dispatch an operation over this router's routes.
    ///
    /// # Errors
    ///
    /// See [`dispatch`].
    pub fn dispatch(&self, op: &Operation) -> Result<Outcome<R>, RouteError> {
        dispatch(op, &self.routes)
    }

    /// Dispatch an event given by its type string.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnsupportedOperation`] for an unknown type, before
    /// any route is evaluated. Otherwise see [`dispatch`].
    pub fn dispatch_event(
        &self,
        kind: &str,
        path: &str,
        data: RouteData,
        args: Vec<RouteValue>,
    ) -> Result<Outcome<R>, RouteError> {
        self.dispatch(&Operation::from_event(kind, path, data, args)?)
    }

    /// Dispatch and record every evaluated route.
    ///
    /// # Errors
    ///
    /// See [`dispatch`].
    pub fn dispatch_with_trace(&self, op: &Operation) -> Result<DispatchTrace<R>, RouteError> {
        let mut steps = Vec::with_capacity(self.routes.len());
        let run = run(op, &self.routes, Some(&mut steps))?;
        Ok(DispatchTrace {
            kind: op.kind,
            path: run.path,
            outcome: run.outcome,
            steps,
            skipped: run.skipped,
        })
    }

    /// Shorthand for dispatching [`Operation::change`].
    ///
    /// # Errors
    ///
    /// See [`dispatch`].
    pub fn change(&self, path: &str) -> Result<Outcome<R>, RouteError> {
        self.dispatch(&Operation::change(path))
    }

    /// Shorthand for dispatching [`Operation::set`].
    ///
    /// # Errors
    ///
    /// See [`dispatch`].
    pub fn set(&self, template: &str, data: RouteData) -> Result<Outcome<R>, RouteError> {
        self.dispatch(&Operation::set(template, data))
    }
}

impl<R> Default for Router<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FromIterator<Route<R>> for Router<R> {
    fn from_iter<I: IntoIterator<Item = Route<R>>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

impl<R> Extend<Route<R>> for Router<R> {
    fn extend<I: IntoIterator<Item = Route<R>>>(&mut self, iter: I) {
        self.routes.extend(iter);
    }
}

impl<'a, R> IntoIterator for &'a Router<R> {
    type Item = &'a Route<R>;
    type IntoIter = std::slice::Iter<'a, Route<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

impl<R> fmt::Debug for Router<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .finish()
    }
}
