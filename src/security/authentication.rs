//! Authentication collaborator.
//!
//! Token verification itself is pluggable; the pipeline only needs a stable
//! [`Identity`] before the role gate runs. Anything that cannot be resolved
//! becomes [`Identity::Anonymous`].

use std::collections::HashMap;

use axum::http::{header, HeaderMap};

use crate::config::AuthConfig;
use crate::security::identity::Identity;

/// Resolves the caller of a request.
pub trait Authenticator: Send + Sync {
    /// Returns `None` when no identity could be established.
    fn authenticate(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Maps `Authorization: Bearer <token>` to identities from configuration.
#[derive(Debug, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenAuthenticator {
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    Identity::user(&entry.user_id, &entry.username, entry.role),
                )
            })
            .collect();
        Self { tokens }
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = bearer_token(headers)?;
        let identity = self.tokens.get(token).cloned();
        if identity.is_none() {
            tracing::debug!("Unknown bearer token presented");
        }
        identity
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Run an authenticator, treating "no answer" as anonymous.
pub fn resolve_identity(auth: &dyn Authenticator, headers: &HeaderMap) -> Identity {
    auth.authenticate(headers).unwrap_or_default()
}
