//! Pattern compiler — route patterns to structured matchers
//!
//! The pattern language is deliberately small:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `user/` | literal text (case-insensitive, no metacharacters) |
//! | `:id` | token: one or more word characters, then `/` or end of path |
//! | `:id?` | optional token |
//! | `(:id/)` | group: matched or skipped as a unit |
//!
//! A trailing `/` written right after a token belongs to the token. Patterns are
//! parsed into segments and compiled into a tiny instruction program run by a
//! backtracking matcher. Failed `(instruction, position)` states are memoised, so
//! matching stays linear in `pattern × path` even with many optional parts.
//!
//! The same parser backs template expansion in [`Template`](crate::Template).

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use tracing::trace;

use crate::{PatternError, RouteMatch, MAX_PATTERN_LENGTH, MAX_TOKENS};

// ═══════════════════════════════════════════════════════════════════════════════
// Pattern source
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a route's matcher comes from.
///
/// # Example
///
/// ```
/// use trail::PatternSource;
///
/// let any = PatternSource::Any;
/// let source = PatternSource::from("user/:id");
/// let regex = PatternSource::regex(r"^legacy/(\d+)$").unwrap();
///
/// assert_eq!(any.to_string(), "*");
/// assert_eq!(source.to_string(), "user/:id");
/// assert_eq!(regex.to_string(), r"regex(^legacy/(\d+)$)");
/// ```
#[derive(Debug, Clone)]
pub enum PatternSource {
    /// No pattern: matches every path.
    Any,
    /// A pre-built regex, used as-is. Capture groups are positional only.
    Regex(Regex),
    /// A pattern string, compiled on first use.
    Source(String),
}

impl PatternSource {
    /// Build a regex source.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidRegex`] if the regex does not compile, or
    /// [`PatternError::PatternTooLong`] if it exceeds [`MAX_PATTERN_LENGTH`].
    pub fn regex(pattern: &str) -> Result<Self, PatternError> {
        check_length(pattern)?;
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| PatternError::InvalidRegex {
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for PatternSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Regex(re) => write!(f, "regex({})", re.as_str()),
            Self::Source(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PatternSource {
    fn from(s: &str) -> Self {
        Self::Source(s.to_owned())
    }
}

impl From<String> for PatternSource {
    fn from(s: String) -> Self {
        Self::Source(s)
    }
}

impl From<Regex> for PatternSource {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Parser
// ═══════════════════════════════════════════════════════════════════════════════

/// One parsed element of a pattern or template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Token { name: String, optional: bool },
    /// Contains only literals and tokens.
    Group(Vec<Segment>),
}

#[inline]
fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn check_length(pattern: &str) -> Result<(), PatternError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(PatternError::PatternTooLong {
            len: pattern.len(),
            max: MAX_PATTERN_LENGTH,
        });
    }
    Ok(())
}

struct Parser<'p> {
    pattern: &'p str,
    top: Vec<Segment>,
    group: Option<(usize, Vec<Segment>)>,
}

impl<'p> Parser<'p> {
    fn push(&mut self, segment: Segment) {
        match &mut self.group {
            Some((_, body)) => body.push(segment),
            None => self.top.push(segment),
        }
    }

    fn push_literal(&mut self, start: usize, end: usize) {
        if start < end {
            self.push(Segment::Literal(self.pattern[start..end].to_owned()));
        }
    }

    fn run(mut self) -> Result<Vec<Segment>, PatternError> {
        let pattern = self.pattern;
        let bytes = pattern.as_bytes();
        let mut literal_start = 0;
        let mut i = 0;

        // Only ASCII bytes are special, so every split point is a char boundary.
        while i < bytes.len() {
            match bytes[i] {
                b':' if bytes.get(i + 1).is_some_and(|b| is_word(*b)) => {
                    self.push_literal(literal_start, i);
                    let start = i + 1;
                    let mut end = start;
                    while end < bytes.len() && is_word(bytes[end]) {
                        end += 1;
                    }
                    let name = pattern[start..end].to_owned();
                    i = end;
                    let optional = bytes.get(i) == Some(&b'?');
                    if optional {
                        i += 1;
                    }
                    if bytes.get(i) == Some(&b'/') {
                        i += 1;
                    }
                    self.push(Segment::Token { name, optional });
                    literal_start = i;
                }
                b'(' => {
                    if self.group.is_some() {
                        return Err(PatternError::NestedGroup {
                            pattern: self.pattern.to_owned(),
                            position: i,
                        });
                    }
                    self.push_literal(literal_start, i);
                    self.group = Some((i, Vec::new()));
                    i += 1;
                    literal_start = i;
                }
                b')' => {
                    self.push_literal(literal_start, i);
                    let Some((open, body)) = self.group.take() else {
                        return Err(PatternError::Unbalanced {
                            pattern: self.pattern.to_owned(),
                            position: i,
                        });
                    };
                    if body.is_empty() {
                        return Err(PatternError::EmptyGroup {
                            pattern: self.pattern.to_owned(),
                            position: open,
                        });
                    }
                    self.top.push(Segment::Group(body));
                    i += 1;
                    if bytes.get(i) == Some(&b'?') {
                        i += 1;
                    }
                    literal_start = i;
                }
                _ => i += 1,
            }
        }

        if let Some((open, _)) = self.group {
            return Err(PatternError::Unbalanced {
                pattern: self.pattern.to_owned(),
                position: open,
            });
        }
        self.push_literal(literal_start, bytes.len());
        Ok(self.top)
    }
}

/// Parse a pattern into segments and validate its token list.
pub(crate) fn parse(pattern: &str) -> Result<Vec<Segment>, PatternError> {
    check_length(pattern)?;
    let segments = Parser {
        pattern,
        top: Vec::new(),
        group: None,
    }
    .run()?;

    let names = token_names(&segments);
    if names.len() > MAX_TOKENS {
        return Err(PatternError::TooManyTokens {
            count: names.len(),
            max: MAX_TOKENS,
        });
    }
    let mut seen = HashSet::with_capacity(names.len());
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(PatternError::DuplicateToken {
                pattern: pattern.to_owned(),
                name: name.clone(),
            });
        }
    }
    Ok(segments)
}

/// Token names in declaration order.
pub(crate) fn token_names(segments: &[Segment]) -> Vec<String> {
    let mut names = Vec::new();
    for segment in segments {
        match segment {
            Segment::Literal(_) => {}
            Segment::Token { name, .. } => names.push(name.clone()),
            Segment::Group(body) => names.extend(token_names(body)),
        }
    }
    names
}

// ═══════════════════════════════════════════════════════════════════════════════
// Program
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
enum Inst {
    /// Consume this text, ASCII case-insensitively.
    Literal(String),
    /// Capture a word run into the slot, then consume `/` or require end of path.
    Token(usize),
    /// Try `pc + 1` first, then jump to the target.
    Split(usize),
    /// Succeed if the whole path was consumed.
    Match,
}

#[derive(Debug, Clone)]
struct Program {
    insts: Vec<Inst>,
    slots: usize,
}

type Slots = Vec<Option<(usize, usize)>>;

impl Program {
    fn compile(segments: &[Segment]) -> Self {
        let mut insts = Vec::new();
        let mut slots = 0;
        for segment in segments {
            Self::emit(segment, &mut insts, &mut slots);
        }
        insts.push(Inst::Match);
        Self { insts, slots }
    }

    fn emit(segment: &Segment, insts: &mut Vec<Inst>, slots: &mut usize) {
        match segment {
            Segment::Literal(text) => insts.push(Inst::Literal(text.clone())),
            Segment::Token { optional, .. } => {
                let split = optional.then(|| {
                    insts.push(Inst::Split(0));
                    insts.len() - 1
                });
                insts.push(Inst::Token(*slots));
                *slots += 1;
                if let Some(split) = split {
                    insts[split] = Inst::Split(insts.len());
                }
            }
            Segment::Group(body) => {
                let split = insts.len();
                insts.push(Inst::Split(0));
                for inner in body {
                    Self::emit(inner, insts, slots);
                }
                insts[split] = Inst::Split(insts.len());
            }
        }
    }

    fn captures<'a>(&self, path: &'a str) -> Option<Vec<Option<&'a str>>> {
        let mut slots = vec![None; self.slots];
        let mut failed = HashSet::new();
        if !self.step(0, 0, path.as_bytes(), &mut slots, &mut failed) {
            return None;
        }
        Some(
            slots
                .into_iter()
                .map(|slot| slot.map(|(start, end)| &path[start..end]))
                .collect(),
        )
    }

    fn step(
        &self,
        mut pc: usize,
        mut pos: usize,
        input: &[u8],
        slots: &mut Slots,
        failed: &mut HashSet<(usize, usize)>,
    ) -> bool {
        loop {
            match &self.insts[pc] {
                Inst::Literal(text) => {
                    let end = pos + text.len();
                    match input.get(pos..end) {
                        Some(window) if window.eq_ignore_ascii_case(text.as_bytes()) => pos = end,
                        _ => return false,
                    }
                }
                Inst::Token(slot) => {
                    let run = input[pos..].iter().take_while(|b| is_word(**b)).count();
                    if run == 0 {
                        return false;
                    }
                    let end = pos + run;
                    slots[*slot] = Some((pos, end));
                    pos = match input.get(end) {
                        Some(b'/') => end + 1,
                        None => end,
                        Some(_) => return false,
                    };
                }
                Inst::Split(skip) => {
                    // Failure of a state never depends on captured slots.
                    if failed.contains(&(pc, pos)) {
                        return false;
                    }
                    let saved = slots.clone();
                    if self.step(pc + 1, pos, input, slots, failed) {
                        return true;
                    }
                    *slots = saved;
                    if self.step(*skip, pos, input, slots, failed) {
                        return true;
                    }
                    failed.insert((pc, pos));
                    return false;
                }
                Inst::Match => return pos == input.len(),
            }
            pc += 1;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Compiled pattern
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum PathMatcher {
    Any,
    Regex(Regex),
    Program(Program),
}

/// A compiled matcher plus the ordered token names of its pattern.
///
/// Matching is anchored at both ends and ASCII case-insensitive for literals.
/// Captured values keep their original case and are coerced into
/// [`RouteValue`](crate::RouteValue)s.
///
/// # Example
///
/// ```
/// use trail::{CompiledPattern, RouteValue};
///
/// let pattern = CompiledPattern::parse("user/(:id/)profile").unwrap();
/// assert_eq!(pattern.tokens(), &["id".to_string()]);
///
/// let m = pattern.match_path("user/7/profile").unwrap();
/// assert_eq!(m.get("id"), Some(&RouteValue::Int(7)));
///
/// let m = pattern.match_path("USER/profile").unwrap();
/// assert_eq!(m.get("id"), Some(&RouteValue::None));
///
/// assert!(pattern.match_path("user/7/settings").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    matcher: PathMatcher,
    tokens: Vec<String>,
}

impl CompiledPattern {
    /// Compile a pattern source.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if a pattern string is malformed or exceeds limits.
    pub fn compile(source: &PatternSource) -> Result<Self, PatternError> {
        match source {
            PatternSource::Any => Ok(Self::any()),
            PatternSource::Regex(re) => Ok(Self {
                matcher: PathMatcher::Regex(re.clone()),
                tokens: Vec::new(),
            }),
            PatternSource::Source(pattern) => Self::parse(pattern),
        }
    }

    /// Compile a pattern string.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the pattern is malformed or exceeds limits.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let segments = parse(pattern)?;
        let tokens = token_names(&segments);
        let program = Program::compile(&segments);
        trace!(
            pattern,
            tokens = ?tokens,
            instructions = program.insts.len(),
            "compiled route pattern"
        );
        Ok(Self {
            matcher: PathMatcher::Program(program),
            tokens,
        })
    }

    /// A matcher that accepts every path.
    #[must_use]
    pub fn any() -> Self {
        Self {
            matcher: PathMatcher::Any,
            tokens: Vec::new(),
        }
    }

    /// Token names in declaration order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns `true` if the path matches.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        match &self.matcher {
            PathMatcher::Any => true,
            PathMatcher::Regex(re) => re.is_match(path),
            PathMatcher::Program(program) => program.captures(path).is_some(),
        }
    }

    /// Match a path, returning coerced captures on success.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        match &self.matcher {
            PathMatcher::Any => Some(RouteMatch::from_captures(path, [], &[])),
            PathMatcher::Regex(re) => {
                let caps = re.captures(path)?;
                let matched = caps.get(0).map_or("", |m| m.as_str());
                Some(RouteMatch::from_captures(
                    matched,
                    caps.iter().skip(1).map(|c| c.map(|m| m.as_str())),
                    &[],
                ))
            }
            PathMatcher::Program(program) => {
                let captures = program.captures(path)?;
                Some(RouteMatch::from_captures(path, captures, &self.tokens))
            }
        }
    }
}
