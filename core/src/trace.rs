//! Dispatch trace types for debugging router behavior.
//!
//! A [`DispatchTrace`] records the same outcome [`Router::dispatch`](crate::Router::dispatch)
//! returns, plus one [`DispatchStep`] per route that was evaluated. Routes after a
//! rejection are not evaluated and are only counted in `skipped`.
//!
//! # Example
//!
//! ```
//! use trail::prelude::*;
//!
//! let router: Router<u32> = Router::new()
//!     .with_route(Route::new("a/:x", handler_fn(|_| Ok(Flow::Continue(1)))))
//!     .with_route(Route::new("b", handler_fn(|_| Ok(Flow::Continue(2)))));
//!
//! let trace = router.dispatch_with_trace(&Operation::change("a/1")).unwrap();
//! assert_eq!(trace.outcome, Outcome::Handled(1));
//! assert!(trace.steps[0].matched);
//! assert!(!trace.steps[1].matched);
//! ```

use std::fmt;

use crate::{OperationKind, Outcome};

/// Trace of a full dispatch.
///
/// `outcome` always equals what `dispatch()` returns for the same operation.
pub struct DispatchTrace<R> {
    /// The operation kind.
    pub kind: OperationKind,
    /// The effective path (synthesized for `route/set`).
    pub path: String,
    /// The final outcome.
    pub outcome: Outcome<R>,
    /// One step per evaluated route, in order.
    pub steps: Vec<DispatchStep>,
    /// Routes not evaluated because the chain was rejected.
    pub skipped: usize,
}

impl<R> DispatchTrace<R> {
    /// Number of routes whose handler ran.
    #[must_use]
    pub fn invoked(&self) -> usize {
        self.steps.iter().filter(|s| s.flow.is_some()).count()
    }
}

impl<R: fmt::Debug> fmt::Debug for DispatchTrace<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTrace")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("outcome", &self.outcome)
            .field("steps", &self.steps)
            .field("skipped", &self.skipped)
            .finish()
    }
}

impl<R: fmt::Debug> fmt::Display for DispatchTrace<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.kind, self.path)?;
        for step in &self.steps {
            writeln!(f, "  {step}")?;
        }
        if self.skipped > 0 {
            writeln!(f, "  ({} route(s) skipped after reject)", self.skipped)?;
        }
        write!(f, "=> {:?}", self.outcome)
    }
}

/// One route's evaluation in a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchStep {
    /// Position in the dispatched sequence (0-based).
    pub index: usize,
    /// Route name, if any.
    pub route: Option<String>,
    /// Pattern source as written (`*` for catch-all).
    pub pattern: String,
    /// Did the pattern match the effective path?
    pub matched: bool,
    /// What the handler asked for, if it ran.
    pub flow: Option<StepFlow>,
}

impl fmt::Display for DispatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.pattern)?;
        if let Some(name) = &self.route {
            write!(f, " ({name})")?;
        }
        match self.flow {
            _ if !self.matched => f.write_str(": no match"),
            Some(StepFlow::Continued) => f.write_str(": continued"),
            Some(StepFlow::Rejected) => f.write_str(": rejected"),
            None => f.write_str(": matched"),
        }
    }
}

/// Handler decision recorded in a [`DispatchStep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFlow {
    /// `Flow::Continue`
    Continued,
    /// `Flow::Reject`
    Rejected,
}
