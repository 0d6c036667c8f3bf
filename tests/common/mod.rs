//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use chat_gateway::config::{GatewayConfig, TokenConfig};
use chat_gateway::observability::request_log::MemorySink;
use chat_gateway::pipeline::ManualClock;
use chat_gateway::security::Role;
use chat_gateway::GatewayServer;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const MODERATOR_TOKEN: &str = "moderator-token";
pub const USER_TOKEN: &str = "user-token";
pub const ROLELESS_TOKEN: &str = "roleless-token";

/// Default config plus one token per interesting role.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.request_log.path = String::new();
    config.rate_limit.sweep_interval_secs = 0;
    config.auth.tokens = vec![
        token(ADMIN_TOKEN, "u-admin", "root", Some(Role::Admin)),
        token(MODERATOR_TOKEN, "u-mod", "mia", Some(Role::Moderator)),
        token(USER_TOKEN, "u-user", "sam", Some(Role::User)),
        token(ROLELESS_TOKEN, "u-none", "nobody", None),
    ];
    config
}

fn token(token: &str, user_id: &str, username: &str, role: Option<Role>) -> TokenConfig {
    TokenConfig {
        token: token.into(),
        user_id: user_id.into(),
        username: username.into(),
        role,
    }
}

pub struct Harness {
    pub server: GatewayServer,
    pub clock: Arc<ManualClock>,
    pub sink: Arc<MemorySink>,
}

impl Harness {
    /// Server whose clock reads `hour:00` local time.
    pub fn at_hour(config: GatewayConfig, hour: u32) -> Self {
        let clock = Arc::new(ManualClock::at_hour(hour).unwrap());
        let sink = Arc::new(MemorySink::default());
        let server = GatewayServer::with_parts(config, clock.clone(), sink.clone());
        Self { server, clock, sink }
    }

    pub fn router(&self) -> Router {
        self.server.router()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(self.router(), request).await
    }
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

/// Build a request; `body` is sent as JSON when present.
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    ip: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(ip) = ip {
        builder = builder.header("x-forwarded-for", ip);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Create an alice/bob conversation as admin and return its id.
pub async fn create_conversation(harness: &Harness) -> String {
    create_conversation_with(harness, &["alice", "bob"]).await
}

pub async fn create_conversation_with(harness: &Harness, participants: &[&str]) -> String {
    let (status, body) = harness
        .send(request(
            "POST",
            "/api/conversations",
            Some(ADMIN_TOKEN),
            Some("192.0.2.1"),
            Some(serde_json::json!({ "participants": participants })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["conversation_id"].as_str().unwrap().to_string()
}
