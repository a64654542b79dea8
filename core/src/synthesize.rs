//! Path synthesis — expanding route templates with a data bag
//!
//! Templates use the pattern language of [`CompiledPattern`](crate::CompiledPattern).
//! Expansion substitutes every token with `value + "/"`, collapses duplicate
//! slashes, and cuts the path just before the first token (or group) that
//! could not be resolved. The result is always a usable prefix: nothing after
//! an unknown value is considered determinable.

use crate::pattern::{parse, token_names, Segment};
use crate::{PatternError, RouteData, RouteValue};

/// A parsed route template.
///
/// # Example
///
/// ```
/// use trail::{RouteData, RouteValue, Template};
///
/// let template = Template::parse("user/(:id/)profile").unwrap();
///
/// assert_eq!(template.expand(&RouteData::new()), "user/");
///
/// let mut data = RouteData::new();
/// data.insert("id".into(), RouteValue::from("7"));
/// assert_eq!(template.expand(&data), "user/7/profile");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the template is malformed.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        Ok(Self {
            source: template.to_owned(),
            segments: parse(template)?,
        })
    }

    /// The template as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Token names in declaration order.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        token_names(&self.segments)
    }

    /// Expand the template with values from `data`.
    ///
    /// A group expands only if every token inside it resolves; otherwise the
    /// group counts as missed. Runs of `/` are collapsed, and the path is cut
    /// before the first missed token or group.
    #[must_use]
    pub fn expand(&self, data: &RouteData) -> String {
        let mut path = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Token { name, .. } => match resolve(data, name) {
                    Some(value) => push_value(&mut path, value),
                    None => break,
                },
                Segment::Group(body) => match expand_group(body, data) {
                    Some(expanded) => {
                        path.push_str(&expanded);
                        path.push('/');
                    }
                    None => break,
                },
            }
        }

        collapse_slashes(&path)
    }
}

/// Expand a template string in one step.
///
/// # Errors
///
/// Returns a [`PatternError`] if the template is malformed.
pub fn synthesize(template: &str, data: &RouteData) -> Result<String, PatternError> {
    Ok(Template::parse(template)?.expand(data))
}

fn resolve<'d>(data: &'d RouteData, name: &str) -> Option<&'d RouteValue> {
    data.get(name).filter(|value| value.is_present())
}

fn push_value(path: &mut String, value: &RouteValue) {
    path.push_str(&value.to_string());
    path.push('/');
}

fn expand_group(body: &[Segment], data: &RouteData) -> Option<String> {
    let mut expanded = String::new();
    for segment in body {
        match segment {
            Segment::Literal(text) => expanded.push_str(text),
            Segment::Token { name, .. } => push_value(&mut expanded, resolve(data, name)?),
            // The parser rejects nested groups.
            Segment::Group(_) => unreachable!("group inside a group"),
        }
    }
    Some(expanded)
}

fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' && previous_slash {
            continue;
        }
        previous_slash = c == '/';
        collapsed.push(c);
    }
    collapsed
}
