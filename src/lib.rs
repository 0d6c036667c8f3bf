//! Chat gateway library: a messaging API behind an ordered request pipeline.

pub mod chats;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use pipeline::{Outcome, Pipeline, Rejection, RequestContext, Stage};
