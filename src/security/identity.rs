//! Caller identity as seen by the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed set of roles a user account may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    Host,
    Guest,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Host => "host",
            Role::Guest => "guest",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "host" => Ok(Role::Host),
            "guest" => Ok(Role::Guest),
            "user" => Ok(Role::User),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Who is making the request. Attached to request extensions once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User {
        user_id: String,
        username: String,
        role: Option<Role>,
    },
}

impl Identity {
    pub fn user(user_id: impl Into<String>, username: impl Into<String>, role: Option<Role>) -> Self {
        Identity::User {
            user_id: user_id.into(),
            username: username.into(),
            role,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Identity::User { user_id, .. } => Some(user_id),
            Identity::Anonymous => None,
        }
    }

    /// `None` for anonymous callers and for users without a role.
    pub fn role(&self) -> Option<Role> {
        match self {
            Identity::User { role, .. } => *role,
            Identity::Anonymous => None,
        }
    }

    /// Name used in the request log.
    pub fn display_name(&self) -> &str {
        match self {
            Identity::User { username, .. } => username,
            Identity::Anonymous => "Anonymous",
        }
    }
}
