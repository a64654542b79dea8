//! `RouteValue` — Values captured from paths and supplied to templates
//!
//! Captured token text is coerced into a `RouteValue` before it reaches a
//! handler, and template data bags hold `RouteValue`s that are stringified on
//! substitution. Coercion is purely syntactic: no locale, no floats.

use std::collections::HashMap;
use std::fmt;

/// Data bag used to expand templates: token name → value.
pub type RouteData = HashMap<String, RouteValue>;

/// A captured or supplied route value.
///
/// # Variants
///
/// - `None` — No value (an optional token that did not participate in the match)
/// - `Bool` — `true` / `false`, matched case-insensitively
/// - `Int` — A run of decimal digits that fits in `i64`
/// - `String` — Anything else, verbatim
///
/// # Example
///
/// ```
/// use trail::RouteValue;
///
/// assert_eq!(RouteValue::coerce("TRUE"), RouteValue::Bool(true));
/// assert_eq!(RouteValue::coerce("42"), RouteValue::Int(42));
/// assert_eq!(RouteValue::coerce("abc123"), RouteValue::String("abc123".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RouteValue {
    /// No value.
    #[default]
    None,

    /// Boolean value.
    Bool(bool),

    /// Integer value.
    Int(i64),

    /// String value.
    String(String),
}

impl RouteValue {
    /// Coerce captured text into a typed value.
    ///
    /// `true`/`false` (any case) become [`RouteValue::Bool`]; a non-empty run of
    /// ASCII digits becomes [`RouteValue::Int`]; everything else, including digit
    /// runs too large for `i64`, stays a [`RouteValue::String`].
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return Self::Int(n);
            }
        }
        Self::String(raw.to_owned())
    }

    /// Returns `true` if this value can be substituted into a template.
    ///
    /// A value is present when it is not `None` and its string form is not empty.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::None => false,
            Self::String(s) => !s.is_empty(),
            Self::Bool(_) | Self::Int(_) => true,
        }
    }

    /// Try to get the value as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => Option::None,
        }
    }

    /// Try to get the value as an integer.
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => Option::None,
        }
    }

    /// Try to get the value as a boolean.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => Option::None,
        }
    }
}

impl fmt::Display for RouteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<String> for RouteValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for RouteValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<i64> for RouteValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for RouteValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<RouteValue>> From<Option<T>> for RouteValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::None, Into::into)
    }
}
