//! Request inspection.
//!
//! # Responsibilities
//! - Name the request ID header set by the tower-http layers
//! - Turn an axum request into the pipeline's `RequestContext`
//!
//! # Design Decisions
//! - The peer address comes from `ConnectInfo` when the server provides it
//! - The original request is left untouched; stages only see the snapshot

use std::net::SocketAddr;

use axum::{body::Body, extract::ConnectInfo, http::Request};

use crate::pipeline::{resolve_client, Clock, RequestContext};
use crate::security::identity::Identity;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Snapshot a request for the pipeline, stamping it with `clock`.
pub fn request_context(request: &Request<Body>, identity: Identity, clock: &dyn Clock) -> RequestContext {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    RequestContext::new(
        request.method().clone(),
        request.uri().path(),
        identity,
        resolve_client(request.headers(), peer),
        clock,
    )
}
