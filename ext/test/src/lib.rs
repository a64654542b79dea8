//! trail-test: Test handlers for conformance testing
//!
//! Provides small, predictable [`RouteHandler`] implementations whose results are
//! plain strings, so fixtures can state expected outcomes as text.
//! This is the reference extension that demonstrates how to build trail handler crates.
//!
//! # Example
//!
//! ```
//! use trail_test::prelude::*;
//!
//! let router: Router<String> = Router::new()
//!     .with_route(Route::new("user/:id", Echo::new("user")))
//!     .with_route(Route::new("admin", Reject));
//!
//! assert_eq!(router.change("user/7").unwrap(), Outcome::Handled("user(7)".into()));
//! assert!(router.change("admin").unwrap().is_rejected());
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use trail::prelude::*;

#[cfg(feature = "fixtures")]
pub mod config_fixture;
#[cfg(feature = "fixtures")]
pub mod fixture;

/// Type URL for [`Echo`].
pub const ECHO_TYPE_URL: &str = "trail.test.v1.Echo";
/// Type URL for [`Reject`].
pub const REJECT_TYPE_URL: &str = "trail.test.v1.Reject";
/// Type URL for [`Constant`].
pub const CONSTANT_TYPE_URL: &str = "trail.test.v1.Constant";
/// Type URL for [`Fail`].
pub const FAIL_TYPE_URL: &str = "trail.test.v1.Fail";

/// Render positional handler arguments as `label(a,b,c)`.
#[must_use]
pub fn render(label: &str, args: &[RouteValue]) -> String {
    let values: Vec<String> = args.iter().map(RouteValue::to_string).collect();
    format!("{label}({})", values.join(","))
}

/// Continues with its label and the positional arguments, rendered by [`render`].
#[derive(Debug, Clone)]
pub struct Echo {
    label: String,
}

impl Echo {
    /// Create an echo handler.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl RouteHandler<String> for Echo {
    fn handle(&self, call: &RouteCall<'_>) -> Result<Flow<String>, HandlerError> {
        Ok(Flow::Continue(render(&self.label, &call.args.positional())))
    }
}

/// Always rejects.
#[derive(Debug, Clone, Copy)]
pub struct Reject;

impl RouteHandler<String> for Reject {
    fn handle(&self, _: &RouteCall<'_>) -> Result<Flow<String>, HandlerError> {
        Ok(Flow::Reject)
    }
}

/// Always continues with the same value.
#[derive(Debug, Clone)]
pub struct Constant {
    value: String,
}

impl Constant {
    /// Create a constant handler.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl RouteHandler<String> for Constant {
    fn handle(&self, _: &RouteCall<'_>) -> Result<Flow<String>, HandlerError> {
        Ok(Flow::Continue(self.value.clone()))
    }
}

/// Always fails with the given message.
#[derive(Debug, Clone)]
pub struct Fail {
    message: String,
}

impl Fail {
    /// Create a failing handler.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl RouteHandler<String> for Fail {
    fn handle(&self, _: &RouteCall<'_>) -> Result<Flow<String>, HandlerError> {
        Err(self.message.clone().into())
    }
}

/// Wraps another handler and records every call as `index:path`.
///
/// Clones share the same log, so a clone kept by the test can inspect calls made
/// through the router.
#[derive(Clone)]
pub struct Recorder<H> {
    inner: H,
    calls: Arc<Mutex<Vec<String>>>,
}

impl<H> Recorder<H> {
    /// Wrap a handler.
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            calls: Arc::default(),
        }
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<H: RouteHandler<String>> RouteHandler<String> for Recorder<H> {
    fn handle(&self, call: &RouteCall<'_>) -> Result<Flow<String>, HandlerError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{}:{}", call.index, call.path));
        self.inner.handle(call)
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{render, Constant, Echo, Fail, Recorder, Reject};
    pub use trail::prelude::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry support (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "registry")]
mod configs {
    use serde::Deserialize;
    use trail::{IntoHandler, RouteError, RouteHandler, UnitConfig};

    use super::{Constant, Echo, Fail, Reject};

    /// Configuration for [`Echo`].
    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct EchoConfig {
        /// Label prefixed to the rendered arguments.
        #[serde(default)]
        pub label: String,
    }

    /// Configuration for [`Constant`].
    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct ConstantConfig {
        /// The value every call continues with.
        pub value: String,
    }

    /// Configuration for [`Fail`].
    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct FailConfig {
        /// The error message.
        pub message: String,
    }

    impl IntoHandler<String> for Echo {
        type Config = EchoConfig;

        fn from_config(config: EchoConfig) -> Result<Box<dyn RouteHandler<String>>, RouteError> {
            Ok(Box::new(Echo::new(config.label)))
        }
    }

    impl IntoHandler<String> for Reject {
        type Config = UnitConfig;

        fn from_config(_: UnitConfig) -> Result<Box<dyn RouteHandler<String>>, RouteError> {
            Ok(Box::new(Reject))
        }
    }

    impl IntoHandler<String> for Constant {
        type Config = ConstantConfig;

        fn from_config(
            config: ConstantConfig,
        ) -> Result<Box<dyn RouteHandler<String>>, RouteError> {
            Ok(Box::new(Constant::new(config.value)))
        }
    }

    impl IntoHandler<String> for Fail {
        type Config = FailConfig;

        fn from_config(config: FailConfig) -> Result<Box<dyn RouteHandler<String>>, RouteError> {
            if config.message.is_empty() {
                return Err(RouteError::InvalidConfig {
                    reason: "Fail.message must not be empty".into(),
                });
            }
            Ok(Box::new(Fail::new(config.message)))
        }
    }
}

#[cfg(feature = "registry")]
pub use configs::{ConstantConfig, EchoConfig, FailConfig};

/// Register all trail-test handlers with the given builder.
///
/// - `trail.test.v1.Echo` → [`Echo`]
/// - `trail.test.v1.Reject` → [`Reject`]
/// - `trail.test.v1.Constant` → [`Constant`]
/// - `trail.test.v1.Fail` → [`Fail`]
#[cfg(feature = "registry")]
#[must_use]
pub fn register(
    builder: trail::HandlerRegistryBuilder<String>,
) -> trail::HandlerRegistryBuilder<String> {
    builder
        .handler::<Echo>(ECHO_TYPE_URL)
        .handler::<Reject>(REJECT_TYPE_URL)
        .handler::<Constant>(CONSTANT_TYPE_URL)
        .handler::<Fail>(FAIL_TYPE_URL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_renders_positional_args() {
        let router: Router<String> = Router::new().with_route(Route::new("a/:x/:y", Echo::new("a")));
        let op = Operation::change("a/1/true").with_arg("extra");
        assert_eq!(
            router.dispatch(&op).unwrap(),
            Outcome::Handled("a(1,true,extra)".into())
        );
    }

    #[test]
    fn constant_and_reject() {
        let router: Router<String> = Router::new()
            .with_route(Route::any(Constant::new("c")))
            .with_route(Route::new("stop", Reject));
        assert_eq!(router.change("go").unwrap(), Outcome::Handled("c".into()));
        assert_eq!(router.change("stop").unwrap(), Outcome::Rejected);
    }

    #[test]
    fn fail_propagates() {
        let router: Router<String> = Router::new().with_route(Route::any(Fail::new("nope")));
        let err = router.change("x").unwrap_err();
        assert!(matches!(err, RouteError::Handler { index: 0, .. }));
    }

    #[test]
    fn recorder_shares_log_with_clones() {
        let first = Recorder::new(Constant::new("a"));
        let second = Recorder::new(Reject);
        let third = Recorder::new(Constant::new("c"));
        let router: Router<String> = Router::new()
            .with_route(Route::any(first.clone()))
            .with_route(Route::any(second.clone()))
            .with_route(Route::any(third.clone()));

        assert!(router.change("p").unwrap().is_rejected());
        assert_eq!(first.calls(), vec!["0:p"]);
        assert_eq!(second.calls(), vec!["1:p"]);
        assert!(third.calls().is_empty());
    }

    #[cfg(feature = "registry")]
    #[test]
    fn register_adds_every_handler() {
        let registry = register(trail::HandlerRegistryBuilder::new()).build();
        assert_eq!(
            registry.type_urls(),
            vec![CONSTANT_TYPE_URL, ECHO_TYPE_URL, FAIL_TYPE_URL, REJECT_TYPE_URL]
        );
    }
}
