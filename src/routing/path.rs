//! Sanitized, segment-split request paths.
//!
//! Every matcher works on whole segments, never on raw substrings, so
//! `/filmsx` can never be mistaken for `/films`. Parsing also rejects
//! paths that could escape an upstream's namespace once forwarded.

use thiserror::Error;

/// Why a request path was refused before routing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path must start with '/'")]
    NotAbsolute,

    #[error("path contains an empty segment")]
    EmptySegment,

    #[error("path contains a parent-directory segment")]
    Traversal,
}

/// The path of an inbound request, split into segments.
///
/// A single trailing slash is ignored: `/films/1/acteurs/` and
/// `/films/1/acteurs` produce the same segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath<'a> {
    raw: &'a str,
    segments: Vec<&'a str>,
}

impl<'a> RequestPath<'a> {
    /// Parse a path (without query string).
    pub fn parse(raw: &'a str) -> Result<Self, PathError> {
        let rest = raw.strip_prefix('/').ok_or(PathError::NotAbsolute)?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        if rest.is_empty() {
            return Ok(Self {
                raw,
                segments: Vec::new(),
            });
        }

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment);
            }
            if is_parent_segment(segment) {
                return Err(PathError::Traversal);
            }
            segments.push(segment);
        }

        Ok(Self { raw, segments })
    }

    /// The path exactly as received.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// True if the path starts with all of `prefix`'s segments.
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.segments.len() >= prefix.len()
            && self.segments.iter().zip(prefix).all(|(seg, want)| seg == want)
    }

    /// The raw remainder after the first `count` segments, always rooted.
    ///
    /// `/bot/chat` minus one segment is `/chat`; `/bot` minus one is `/`.
    pub fn strip_segments(&self, count: usize) -> String {
        let mut rest = self.raw;
        for _ in 0..count.min(self.segments.len()) {
            rest = rest.trim_start_matches('/');
            rest = rest.find('/').map_or("", |i| &rest[i..]);
        }
        if rest.is_empty() {
            "/".to_string()
        } else {
            rest.to_string()
        }
    }
}

/// `..`, including percent-encoded spellings such as `%2e%2E` or `.%2e`.
fn is_parent_segment(segment: &str) -> bool {
    if segment.len() > 6 {
        return false;
    }
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == ".."
}

/// A non-empty run of ASCII digits.
pub fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}
