//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the ordered route rules
//! - Sanitize the request path before any rule sees it
//! - Resolve a request path to a local endpoint or a forwarding decision
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan, first match wins; order is part of the contract
//! - Explicit NotFound rather than silent default
//! - A pure function of the path: no request state, no caching

use thiserror::Error;

use crate::routing::matcher::{Matcher, PrefixMatcher};
use crate::routing::path::{PathError, RequestPath};
use crate::upstream::Upstream;

/// Endpoints answered by the gateway itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalEndpoint {
    Health,
}

/// A conditional branch of a content-aware target.
#[derive(Debug)]
pub struct Branch {
    pub name: &'static str,
    pub matcher: Box<dyn Matcher>,
    pub upstream: Upstream,
}

/// How a matched rule picks its destination.
#[derive(Debug)]
pub enum Target {
    /// Answered locally, never proxied.
    Local(LocalEndpoint),
    /// Always the same upstream.
    Upstream(Upstream),
    /// Ordered branches over the full path, first match wins, else `default`.
    ByShape {
        branches: Vec<Branch>,
        default: Upstream,
    },
}

/// Path transformation applied before forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Forward the path unchanged.
    Keep,
    /// Drop the rule's prefix segments (`/bot/chat` → `/chat`).
    StripPrefix,
}

/// A single entry of the route table.
#[derive(Debug)]
pub struct RouteRule {
    name: &'static str,
    prefix: &'static str,
    prefix_matcher: PrefixMatcher,
    matcher: Option<Box<dyn Matcher>>,
    target: Target,
    rewrite: Rewrite,
}

impl RouteRule {
    /// A rule matching every path under `prefix`.
    pub fn new(name: &'static str, prefix: &'static str, target: Target) -> Self {
        Self {
            name,
            prefix,
            prefix_matcher: PrefixMatcher::new(prefix),
            matcher: None,
            target,
            rewrite: Rewrite::Keep,
        }
    }

    /// Additional condition on top of the prefix.
    pub fn with_matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    pub fn with_rewrite(mut self, rewrite: Rewrite) -> Self {
        self.rewrite = rewrite;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn rewrite(&self) -> Rewrite {
        self.rewrite
    }

    fn matches(&self, path: &RequestPath<'_>) -> bool {
        self.prefix_matcher.matches(path)
            && self.matcher.as_ref().map_or(true, |m| m.matches(path))
    }

    fn prefix_len(&self) -> usize {
        self.prefix.split('/').filter(|s| !s.is_empty()).count()
    }
}

/// Resolved destination of a proxied request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forward {
    /// Rule (or branch) that produced the decision, for logs and metrics.
    pub route: &'static str,
    pub upstream: Upstream,
    /// Path and query to request from the upstream.
    pub path_and_query: String,
}

/// Outcome of routing a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Local(LocalEndpoint),
    Forward(Forward),
}

/// Why a request could not be routed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("malformed request path: {0}")]
    MalformedPath(#[from] PathError),

    #[error("no route matches the request path")]
    NotFound,
}

/// Ordered, immutable route table.
#[derive(Debug)]
pub struct Router {
    rules: Vec<RouteRule>,
}

impl Router {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Resolve a request target (`/path?query`) to a routing decision.
    pub fn resolve(&self, path_and_query: &str) -> Result<RouteDecision, RouteError> {
        let (raw_path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };
        let path = RequestPath::parse(raw_path)?;

        let rule = self
            .rules
            .iter()
            .find(|rule| rule.matches(&path))
            .ok_or(RouteError::NotFound)?;

        let (route, upstream) = match &rule.target {
            Target::Local(endpoint) => return Ok(RouteDecision::Local(*endpoint)),
            Target::Upstream(upstream) => (rule.name, *upstream),
            Target::ByShape { branches, default } => branches
                .iter()
                .find(|branch| branch.matcher.matches(&path))
                .map(|branch| (branch.name, branch.upstream))
                .unwrap_or((rule.name, *default)),
        };

        let mut forwarded = match rule.rewrite {
            Rewrite::Keep => path.as_str().to_string(),
            Rewrite::StripPrefix => path.strip_segments(rule.prefix_len()),
        };
        if let Some(query) = query {
            forwarded.push('?');
            forwarded.push_str(query);
        }

        Ok(RouteDecision::Forward(Forward {
            route,
            upstream,
            path_and_query: forwarded,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::ShapeMatcher;

    fn router() -> Router {
        Router::new(vec![
            RouteRule::new("health", "/health", Target::Local(LocalEndpoint::Health))
                .with_matcher(ShapeMatcher::new().literal("health")),
            RouteRule::new(
                "films",
                "/films",
                Target::ByShape {
                    branches: vec![Branch {
                        name: "casting",
                        matcher: Box::new(
                            ShapeMatcher::new().literal("films").numeric().literal("acteurs"),
                        ),
                        upstream: Upstream::Actor,
                    }],
                    default: Upstream::Film,
                },
            ),
            RouteRule::new("bot", "/bot", Target::Upstream(Upstream::Bot))
                .with_rewrite(Rewrite::StripPrefix),
        ])
    }

    fn forward(router: &Router, path: &str) -> Forward {
        match router.resolve(path).unwrap() {
            RouteDecision::Forward(f) => f,
            other => panic!("expected a forward for {}, got {:?}", path, other),
        }
    }

    #[test]
    fn test_first_match_wins_within_branches() {
        let router = router();
        let f = forward(&router, "/films/1/acteurs");
        assert_eq!((f.route, f.upstream), ("casting", Upstream::Actor));
        let f = forward(&router, "/films/1");
        assert_eq!((f.route, f.upstream), ("films", Upstream::Film));
    }

    #[test]
    fn test_health_requires_exact_path() {
        let router = router();
        assert_eq!(
            router.resolve("/health").unwrap(),
            RouteDecision::Local(LocalEndpoint::Health)
        );
        assert_eq!(router.resolve("/health/deep"), Err(RouteError::NotFound));
    }

    #[test]
    fn test_query_is_preserved() {
        let router = router();
        assert_eq!(forward(&router, "/films?page=2&q=a").path_and_query, "/films?page=2&q=a");
        assert_eq!(forward(&router, "/bot/chat?lang=fr").path_and_query, "/chat?lang=fr");
        assert_eq!(forward(&router, "/bot?x=1").path_and_query, "/?x=1");
    }

    #[test]
    fn test_malformed_and_unknown() {
        let router = router();
        assert_eq!(
            router.resolve("/films/../bot"),
            Err(RouteError::MalformedPath(PathError::Traversal))
        );
        assert_eq!(router.resolve("/nope"), Err(RouteError::NotFound));
        assert_eq!(router.resolve("/"), Err(RouteError::NotFound));
    }
}
