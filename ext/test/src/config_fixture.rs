//! Config conformance fixture runner.
//!
//! Loads YAML fixtures that use the **registry config format** (the same JSON/YAML
//! shape as [`RouterConfig`](trail::RouterConfig)). This tests the config-driven
//! loading path: YAML → `RouterConfig` → `HandlerRegistry::load_router()` → dispatch.
//!
//! Unlike the [`fixture`](crate::fixture) module (which builds routes in code), this
//! module exercises the production config loading pipeline.

use serde::Deserialize;

use crate::fixture::TestCase;

/// A config conformance test fixture.
///
/// The `config` field is the raw YAML/JSON value that gets deserialized as
/// `RouterConfig`.
#[derive(Debug, Deserialize)]
pub struct ConfigFixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub config: serde_json::Value,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    /// Parsing or loading the config must fail with this error kind.
    #[serde(default)]
    pub expect_error: Option<String>,
}

impl ConfigFixture {
    /// Parse a single config fixture from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple config fixtures from a YAML file with `---` separators.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }
}
