//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the trail engine. Routes are built in
//! code from the test handlers; see [`config_fixture`](crate::config_fixture) for
//! the registry-driven path.

use serde::Deserialize;
use trail::prelude::*;

use crate::{Constant, Echo, Fail, Reject};

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub routes: Vec<RouteSpec>,
    pub cases: Vec<TestCase>,
}

/// One route: an optional pattern (or regex) and what its handler does.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub handler: HandlerSpec,
}

/// Handler behavior, one variant per test handler.
///
/// Written as `reject` or as a one-key map such as `{ echo: user }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerSpec {
    Echo(String),
    Constant(String),
    Fail(String),
    Reject,
}

/// Test case
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    /// Event type; `route/change` when omitted.
    #[serde(default = "default_op")]
    pub op: String,
    pub path: String,
    #[serde(default)]
    pub data: RouteData,
    #[serde(default)]
    pub args: Vec<RouteValue>,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub expect: Expect,
}

fn default_op() -> String {
    OperationKind::Change.as_str().to_owned()
}

/// Expected dispatch result: `no_match`, `rejected`, `{ handled: v }` or `{ error: kind }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
    NoMatch,
    Handled(String),
    Rejected,
    /// An error of the given kind: `unsupported_operation`, `pattern` or `handler`.
    Error(String),
}

impl Expect {
    /// Classify a dispatch result.
    #[must_use]
    pub fn from_result(result: Result<Outcome<String>, RouteError>) -> Self {
        match result {
            Ok(Outcome::NoMatch) => Self::NoMatch,
            Ok(Outcome::Handled(value)) => Self::Handled(value),
            Ok(Outcome::Rejected) => Self::Rejected,
            Err(err) => Self::Error(error_kind(&err).to_owned()),
        }
    }
}

/// Short name of a [`RouteError`] variant, as used in fixtures.
#[must_use]
pub fn error_kind(err: &RouteError) -> &'static str {
    match err {
        RouteError::UnsupportedOperation { .. } => "unsupported_operation",
        RouteError::Pattern(_) => "pattern",
        RouteError::Handler { .. } => "handler",
        RouteError::InvalidConfig { .. } => "invalid_config",
        RouteError::UnknownTypeUrl { .. } => "unknown_type_url",
        RouteError::TooManyRoutes { .. } => "too_many_routes",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder: Convert specs to trail types
// ═══════════════════════════════════════════════════════════════════════════════

impl RouteSpec {
    /// Build a trail Route from this spec.
    pub fn build(&self) -> Result<Route<String>, RouteError> {
        let source = match (&self.pattern, &self.regex) {
            (Some(_), Some(_)) => {
                return Err(RouteError::InvalidConfig {
                    reason: "route sets both pattern and regex".into(),
                })
            }
            (Some(pattern), None) => PatternSource::from(pattern.as_str()),
            (None, Some(regex)) => PatternSource::regex(regex)?,
            (None, None) => PatternSource::Any,
        };
        let handler: Box<dyn RouteHandler<String>> = match &self.handler {
            HandlerSpec::Echo(label) => Box::new(Echo::new(label)),
            HandlerSpec::Constant(value) => Box::new(Constant::new(value)),
            HandlerSpec::Fail(message) => Box::new(Fail::new(message)),
            HandlerSpec::Reject => Box::new(Reject),
        };
        let route = Route::from_boxed(source, handler);
        Ok(match &self.name {
            Some(name) => route.named(name),
            None => route,
        })
    }
}

impl TestCase {
    /// Dispatch this case against a router.
    pub fn dispatch(&self, router: &Router<String>) -> Result<Outcome<String>, RouteError> {
        router.dispatch_event(&self.op, &self.path, self.data.clone(), self.args.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Expect,
    pub actual: Expect,
}

/// Run cases against a router.
pub fn run_cases(router: &Router<String>, cases: &[TestCase]) -> Vec<CaseResult> {
    cases
        .iter()
        .map(|case| {
            let actual = Expect::from_result(case.dispatch(router));
            CaseResult {
                case_name: case.name.clone(),
                passed: actual == case.expect,
                expected: case.expect.clone(),
                actual,
            }
        })
        .collect()
}

/// Panic on the first failed case.
pub fn assert_results(fixture: &str, results: &[CaseResult]) {
    for result in results {
        assert!(
            result.passed,
            "Fixture '{}' case '{}' failed: expected {:?}, got {:?}",
            fixture, result.case_name, result.expected, result.actual
        );
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Build the router described by this fixture
    pub fn router(&self) -> Result<Router<String>, RouteError> {
        self.routes.iter().map(RouteSpec::build).collect()
    }

    /// Run all test cases and return results
    pub fn run(&self) -> Result<Vec<CaseResult>, RouteError> {
        Ok(run_cases(&self.router()?, &self.cases))
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self
            .run()
            .unwrap_or_else(|e| panic!("Fixture '{}' failed to build: {e}", self.name));
        assert_results(&self.name, &results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
name: inline
routes:
  - pattern: "user/:id"
    handler: { echo: user }
  - pattern: admin
    handler: reject
cases:
  - name: user
    path: user/7
    expect: { handled: "user(7)" }
  - name: admin
    path: admin
    expect: rejected
  - name: miss
    path: other
    expect: no_match
  - name: bad op
    op: route/unknown
    path: user/7
    expect: { error: unsupported_operation }
"#;

    #[test]
    fn parses_and_runs_inline_fixture() {
        let fixture = Fixture::from_yaml(FIXTURE).unwrap();
        assert_eq!(fixture.routes.len(), 2);
        let results = fixture.run().unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn handler_and_expect_read_plain_and_map_forms() {
        let spec: RouteSpec = serde_yaml::from_str("handler: { echo: user }").unwrap();
        assert!(matches!(spec.handler, HandlerSpec::Echo(ref label) if label == "user"));

        let spec: RouteSpec = serde_yaml::from_str("handler: reject").unwrap();
        assert!(matches!(spec.handler, HandlerSpec::Reject));

        let case: TestCase =
            serde_yaml::from_str("{ name: a, path: x, expect: { handled: \"v(1)\" } }").unwrap();
        assert_eq!(case.expect, Expect::Handled("v(1)".into()));

        let case: TestCase =
            serde_yaml::from_str("{ name: b, path: x, expect: { error: pattern } }").unwrap();
        assert_eq!(case.expect, Expect::Error("pattern".into()));

        let case: TestCase = serde_yaml::from_str("{ name: c, path: x, expect: no_match }").unwrap();
        assert_eq!(case.expect, Expect::NoMatch);
        assert_eq!(case.op, "route/change");
    }

    #[test]
    fn multi_document_yaml() {
        let yaml = format!("{FIXTURE}\n---\n{FIXTURE}");
        assert_eq!(Fixture::from_yaml_multi(&yaml).unwrap().len(), 2);
    }
}
