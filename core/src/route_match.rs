//! `RouteMatch` — Captured values from a successful pattern match

use crate::RouteValue;

/// The result of matching a path against a compiled pattern.
///
/// Holds the matched text, one coerced value per capture group (positional),
/// and the token names of the pattern so values can also be looked up by name.
/// Pre-built regex matchers have no token names; their groups are positional only.
///
/// # Example
///
/// ```
/// use trail::{CompiledPattern, RouteValue};
///
/// let pattern = CompiledPattern::parse("user/:id/:admin").unwrap();
/// let m = pattern.match_path("user/42/true").unwrap();
///
/// assert_eq!(m.get("id"), Some(&RouteValue::Int(42)));
/// assert_eq!(m.values(), &[RouteValue::Int(42), RouteValue::Bool(true)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    matched: String,
    values: Vec<RouteValue>,
    names: Vec<String>,
}

impl RouteMatch {
    /// Build a match from raw capture slots, coercing every captured value.
    ///
    /// Slots that did not participate in the match become [`RouteValue::None`].
    pub(crate) fn from_captures<'a>(
        matched: &str,
        captures: impl IntoIterator<Item = Option<&'a str>>,
        names: &[String],
    ) -> Self {
        Self {
            matched: matched.to_owned(),
            values: captures
                .into_iter()
                .map(|c| c.map_or(RouteValue::None, RouteValue::coerce))
                .collect(),
            names: names.to_vec(),
        }
    }

    /// The full text covered by the match.
    #[must_use]
    pub fn matched(&self) -> &str {
        &self.matched
    }

    /// Coerced values in capture order.
    #[must_use]
    pub fn values(&self) -> &[RouteValue] {
        &self.values
    }

    /// Token names declared by the pattern, aligned with [`values()`](Self::values).
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Value at a capture position (0-based).
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&RouteValue> {
        self.values.get(index)
    }

    /// Value captured for a named token.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RouteValue> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.values.get(i))
    }

    /// Iterate over `(name, value)` pairs for named tokens.
    pub fn named(&self) -> impl Iterator<Item = (&str, &RouteValue)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Number of capture positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the match captured nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
