//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::security::identity::Role;

/// Root configuration for the chat gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request log sink.
    pub request_log: RequestLogConfig,

    /// Hour-of-day access window.
    pub time_window: TimeWindowConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Role-based authorization for mutating requests.
    pub role_gate: RoleGateConfig,

    /// Static bearer tokens.
    pub auth: AuthConfig,

    /// Messaging API settings.
    pub chats: ChatsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestLogConfig {
    /// Enable the request logger stage.
    pub enabled: bool,

    /// Append-only log file. Empty means "log through tracing".
    pub path: String,
}

impl Default for RequestLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "requests.log".to_string(),
        }
    }
}

/// Time-of-day access window, `[start_hour, end_hour)` in server local time.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeWindowConfig {
    /// Enable the time window gate.
    pub enabled: bool,

    /// First allowed hour (0-23).
    pub start_hour: u32,

    /// First disallowed hour (1-24). Smaller than `start_hour` wraps past midnight.
    pub end_hour: u32,
}

impl Default for TimeWindowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_hour: 18,
            end_hour: 21,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per client within the window.
    pub max_requests: usize,

    /// Sliding window length in seconds.
    pub window_secs: u64,

    /// Limited path patterns. Each matches by leading path segments, and a
    /// `*` segment matches any single segment.
    pub paths: Vec<String>,

    /// Methods counted as writes.
    pub methods: Vec<String>,

    /// Interval for dropping idle clients. 0 disables the sweeper.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 5,
            window_secs: 60,
            paths: vec![
                "/api/messages".to_string(),
                "/api/conversations/*/messages".to_string(),
            ],
            methods: vec![
                "POST".to_string(),
                "PUT".to_string(),
                "PATCH".to_string(),
                "DELETE".to_string(),
            ],
            sweep_interval_secs: 300,
        }
    }
}

/// Role gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoleGateConfig {
    /// Enable the role gate.
    pub enabled: bool,

    /// Protected path prefix.
    pub path_prefix: String,

    /// Methods that require an allowed role.
    pub methods: Vec<String>,

    /// Roles permitted to perform protected requests.
    pub allowed_roles: Vec<Role>,
}

impl Default for RoleGateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path_prefix: "/api/".to_string(),
            methods: vec!["POST".to_string(), "PUT".to_string(), "DELETE".to_string()],
            allowed_roles: vec![Role::Admin, Role::Moderator],
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer tokens and the identities they resolve to.
    pub tokens: Vec<TokenConfig>,
}

/// A single bearer token entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// The opaque bearer token.
    pub token: String,

    /// Stable user identifier.
    pub user_id: String,

    /// Display name written to the request log.
    pub username: String,

    /// Optional role; absent means "no role".
    #[serde(default)]
    pub role: Option<Role>,
}

/// Messaging API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatsConfig {
    /// Default page size for message listings.
    pub page_size: usize,

    /// Upper bound for a client-requested page size.
    pub max_page_size: usize,

    /// Restrict conversations and their messages to participants.
    /// Admins and moderators see everything; anonymous callers get 401.
    pub participants_only: bool,
}

impl Default for ChatsConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_page_size: 100,
            participants_only: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_policy() {
        let config = GatewayConfig::default();
        assert_eq!(config.time_window.start_hour, 18);
        assert_eq!(config.time_window.end_hour, 21);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.role_gate.allowed_roles, vec![Role::Admin, Role::Moderator]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [time_window]
            start_hour = 9

            [[auth.tokens]]
            token = "t1"
            user_id = "u1"
            username = "alice"
            role = "moderator"
            "#,
        )
        .unwrap();

        assert_eq!(config.time_window.start_hour, 9);
        assert_eq!(config.time_window.end_hour, 21);
        assert_eq!(config.auth.tokens.len(), 1);
        assert_eq!(config.auth.tokens[0].role, Some(Role::Moderator));
        assert_eq!(
            config.rate_limit.paths,
            vec!["/api/messages", "/api/conversations/*/messages"]
        );
        assert!(config.chats.participants_only);
    }
}
