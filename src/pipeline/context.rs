//! The per-request view handed to every stage.

use std::fmt;
use std::net::IpAddr;
use std::time::Instant;

use axum::http::{HeaderMap, Method};
use chrono::{DateTime, Local};

use crate::pipeline::clock::Clock;
use crate::security::identity::Identity;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Key under which a client is rate limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKey {
    Ip(IpAddr),
    /// No usable address; all such requests share one bucket.
    Unresolved,
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientKey::Ip(ip) => write!(f, "{ip}"),
            ClientKey::Unresolved => f.write_str("unresolved"),
        }
    }
}

/// Immutable snapshot of an inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub identity: Identity,
    pub client: ClientKey,
    pub received_at: Instant,
    pub local_time: DateTime<Local>,
}

impl RequestContext {
    /// Build a context stamped with the clock's current time.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        identity: Identity,
        client: ClientKey,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            identity,
            client,
            received_at: clock.now(),
            local_time: clock.local_now(),
        }
    }
}

/// First `X-Forwarded-For` entry when it parses, else the peer address.
pub fn resolve_client(headers: &HeaderMap, peer: Option<IpAddr>) -> ClientKey {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    match forwarded.or(peer) {
        Some(ip) => ClientKey::Ip(ip),
        None => ClientKey::Unresolved,
    }
}
