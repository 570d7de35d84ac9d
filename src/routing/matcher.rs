//! Route matching logic.
//!
//! # Responsibilities
//! - Match a namespace prefix on whole path segments
//! - Match exact path shapes (literal, numeric and alternative segments)
//! - Combine conditions with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Matching works on parsed segments, so trailing slashes never matter
//! - No regex to guarantee O(n) matching

use crate::routing::path::{is_numeric, RequestPath};

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &RequestPath<'_>) -> bool;
}

/// Matches a namespace: the path starts with the given segments.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    segments: Vec<String>,
}

impl PrefixMatcher {
    /// Create a prefix matcher from a path such as `/films` or `/me`.
    pub fn new(prefix: &str) -> Self {
        Self {
            segments: prefix
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Matcher for PrefixMatcher {
    fn matches(&self, path: &RequestPath<'_>) -> bool {
        let segments = path.segments();
        segments.len() >= self.segments.len()
            && self.segments.iter().zip(segments).all(|(want, seg)| want == seg)
    }
}

/// One position in a [`ShapeMatcher`].
#[derive(Debug, Clone)]
enum Segment {
    Literal(&'static str),
    OneOf(&'static [&'static str]),
    Numeric,
}

impl Segment {
    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(lit) => segment == *lit,
            Segment::OneOf(options) => options.contains(&segment),
            Segment::Numeric => is_numeric(segment),
        }
    }
}

/// Matches a path of an exact shape, e.g. `/films/<int>/acteurs`.
///
/// Built segment by segment; [`ShapeMatcher::rest`] lets any number of
/// further segments follow (including none).
#[derive(Debug, Clone, Default)]
pub struct ShapeMatcher {
    segments: Vec<Segment>,
    open: bool,
}

impl ShapeMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(mut self, value: &'static str) -> Self {
        self.segments.push(Segment::Literal(value));
        self
    }

    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.segments.push(Segment::OneOf(values));
        self
    }

    pub fn numeric(mut self) -> Self {
        self.segments.push(Segment::Numeric);
        self
    }

    pub fn rest(mut self) -> Self {
        self.open = true;
        self
    }
}

impl Matcher for ShapeMatcher {
    fn matches(&self, path: &RequestPath<'_>) -> bool {
        let segments = path.segments();
        let length_ok = if self.open {
            segments.len() >= self.segments.len()
        } else {
            segments.len() == self.segments.len()
        };

        length_ok
            && self
                .segments
                .iter()
                .zip(segments)
                .all(|(shape, segment)| shape.matches(segment))
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &RequestPath<'_>) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}
