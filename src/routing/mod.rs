//! Request scoping.
//!
//! # Data Flow
//! ```text
//! RequestContext (method, path)
//!     → matcher.rs (evaluate scope conditions)
//!     → bool: does this stage apply?
//! ```
//!
//! # Design Decisions
//! - Matchers compiled at pipeline build time, immutable at runtime
//! - No regex in hot path (prefix and segment matching only)
//! - Deterministic: same input always gives the same answer

pub mod matcher;

pub use matcher::{AndMatcher, AnyMatcher, Matcher, MethodMatcher, PathPatternMatcher, PathPrefixMatcher};
