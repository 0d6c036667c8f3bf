//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower-http layers)
//!     → request.rs (request ID, snapshot into RequestContext)
//!     → pipeline (logger → time window → rate limit → role gate)
//!     → response.rs (rejections → status + body)   or   chats handlers
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_context, X_REQUEST_ID};
pub use server::{GatewayServer, GatewayState};
