//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (hours, limits, windows)
//! - Check that prefixes and methods are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::Method;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("time_window.start_hour {0} is outside 0-23")]
    StartHour(u32),
    #[error("time_window.end_hour {0} is outside 0-24")]
    EndHour(u32),
    #[error("time_window start and end hours are both {0}")]
    EmptyWindow(u32),
    #[error("{field} '{value}' must start with '/'")]
    Prefix { field: &'static str, value: String },
    #[error("{field} contains invalid method '{value}'")]
    Method { field: &'static str, value: String },
    #[error("rate_limit.paths is empty")]
    NoPaths,
    #[error("role_gate.allowed_roles is empty")]
    NoAllowedRoles,
    #[error("auth.tokens contains duplicate token for user '{0}'")]
    DuplicateToken(String),
    #[error("chats.page_size {page_size} exceeds chats.max_page_size {max_page_size}")]
    PageSize { page_size: usize, max_page_size: usize },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }

    let window = &config.time_window;
    if window.start_hour > 23 {
        errors.push(ValidationError::StartHour(window.start_hour));
    }
    if window.end_hour > 24 {
        errors.push(ValidationError::EndHour(window.end_hour));
    }
    if window.start_hour == window.end_hour {
        errors.push(ValidationError::EmptyWindow(window.start_hour));
    }

    let rate = &config.rate_limit;
    if rate.max_requests == 0 {
        errors.push(ValidationError::Zero { field: "rate_limit.max_requests" });
    }
    if rate.window_secs == 0 {
        errors.push(ValidationError::Zero { field: "rate_limit.window_secs" });
    }
    if rate.paths.is_empty() {
        errors.push(ValidationError::NoPaths);
    }
    for path in &rate.paths {
        check_prefix("rate_limit.paths", path, &mut errors);
    }
    check_methods("rate_limit.methods", &rate.methods, &mut errors);

    let roles = &config.role_gate;
    check_prefix("role_gate.path_prefix", &roles.path_prefix, &mut errors);
    check_methods("role_gate.methods", &roles.methods, &mut errors);
    if roles.allowed_roles.is_empty() {
        errors.push(ValidationError::NoAllowedRoles);
    }

    let mut seen = HashSet::new();
    for entry in &config.auth.tokens {
        if !seen.insert(entry.token.as_str()) {
            errors.push(ValidationError::DuplicateToken(entry.user_id.clone()));
        }
    }

    let chats = &config.chats;
    if chats.page_size == 0 {
        errors.push(ValidationError::Zero { field: "chats.page_size" });
    }
    if chats.page_size > chats.max_page_size {
        errors.push(ValidationError::PageSize {
            page_size: chats.page_size,
            max_page_size: chats.max_page_size,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_prefix(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if !value.starts_with('/') {
        errors.push(ValidationError::Prefix { field, value: value.to_string() });
    }
}

fn check_methods(field: &'static str, methods: &[String], errors: &mut Vec<ValidationError>) {
    for method in methods {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::Method { field, value: method.clone() });
        }
    }
}
