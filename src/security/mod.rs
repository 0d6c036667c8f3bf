//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → authentication.rs (bearer token → Identity, anonymous on failure)
//!     → time_window.rs (local hour inside the access window?)
//!     → rate_limit.rs (per-IP sliding window on message writes)
//!     → role_gate.rs (mutations need an allowed role)
//!     → Pass to handlers
//! ```
//!
//! # Design Decisions
//! - Fail closed: missing identity or role means rejection
//! - Policy rejections are client errors, never server faults

pub mod authentication;
pub mod identity;
pub mod rate_limit;
pub mod role_gate;
pub mod time_window;

pub use authentication::{resolve_identity, Authenticator, StaticTokenAuthenticator};
pub use identity::{Identity, Role};
pub use rate_limit::{RateLimitStore, RateLimitSweeper, RateLimiter};
pub use role_gate::RoleGate;
pub use time_window::TimeWindowGate;
