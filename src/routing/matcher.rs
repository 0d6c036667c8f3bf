//! Request scope matching for pipeline stages.
//!
//! # Responsibilities
//! - Match path prefix (case-sensitive)
//! - Match leading path segments, with `*` standing for any one segment
//! - Match request method against a set
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Empty AND = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use axum::http::Method;

use crate::pipeline::RequestContext;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, ctx: &RequestContext) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, ctx: &RequestContext) -> bool {
        ctx.path.starts_with(&self.prefix)
    }
}

/// Matches the leading segments of the request path.
///
/// `/api/conversations/*/messages` matches `/api/conversations/42/messages`
/// and anything below it, but not `/api/conversations`.
#[derive(Debug, Clone)]
pub struct PathPatternMatcher {
    segments: Vec<String>,
}

impl PathPatternMatcher {
    pub fn new(pattern: &str) -> Self {
        Self {
            segments: split_segments(pattern).map(str::to_string).collect(),
        }
    }
}

impl Matcher for PathPatternMatcher {
    fn matches(&self, ctx: &RequestContext) -> bool {
        let mut path = split_segments(&ctx.path);
        self.segments.iter().all(|expected| match path.next() {
            Some(actual) => expected == "*" || expected == actual,
            None => false,
        })
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Matches any of a fixed set of methods.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    pub fn new(methods: Vec<Method>) -> Self {
        Self { methods }
    }

    /// Parse method names, skipping any that are not valid HTTP tokens.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let methods = names
            .iter()
            .filter_map(|name| match Method::from_bytes(name.as_ref().as_bytes()) {
                Ok(method) => Some(method),
                Err(_) => {
                    tracing::warn!(method = name.as_ref(), "Ignoring invalid method name");
                    None
                }
            })
            .collect();
        Self { methods }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, ctx: &RequestContext) -> bool {
        self.methods.contains(&ctx.method)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Shorthand for "method in set AND path starts with prefix".
    pub fn scope<S: AsRef<str>>(methods: &[S], prefix: &str) -> Self {
        Self::new(vec![
            Box::new(MethodMatcher::from_names(methods)),
            Box::new(PathPrefixMatcher::new(prefix)),
        ])
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, ctx: &RequestContext) -> bool {
        self.matchers.iter().all(|m| m.matches(ctx))
    }
}

/// Combines multiple matchers with OR semantics. Empty never matches.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn patterns<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self::new(
            patterns
                .iter()
                .map(|p| Box::new(PathPatternMatcher::new(p.as_ref())) as Box<dyn Matcher>)
                .collect(),
        )
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, ctx: &RequestContext) -> bool {
        self.matchers.iter().any(|m| m.matches(ctx))
    }
}
