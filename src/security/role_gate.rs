//! Role-based authorization for mutating requests.

use crate::config::RoleGateConfig;
use crate::pipeline::{Next, Outcome, Rejection, RequestContext, Stage};
use crate::routing::{AndMatcher, Matcher};
use crate::security::identity::Role;

/// Fourth pipeline stage.
///
/// Inside its scope, anonymous callers get 401 and callers whose role is
/// missing or not allowed get 403. Outside its scope it does nothing.
pub struct RoleGate {
    scope: AndMatcher,
    allowed: Vec<Role>,
}

impl RoleGate {
    pub fn from_config(config: &RoleGateConfig) -> Self {
        Self {
            scope: AndMatcher::scope(&config.methods, &config.path_prefix),
            allowed: config.allowed_roles.clone(),
        }
    }

    fn permits(&self, role: Option<Role>) -> bool {
        role.is_some_and(|r| self.allowed.contains(&r))
    }
}

impl Stage for RoleGate {
    fn name(&self) -> &'static str {
        "role_gate"
    }

    fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Outcome {
        if !self.scope.matches(ctx) {
            return next.run(ctx);
        }

        if !ctx.identity.is_authenticated() {
            tracing::info!(path = %ctx.path, method = %ctx.method, "Unauthenticated mutating request");
            return Outcome::reject(self.name(), Rejection::Unauthenticated);
        }

        let role = ctx.identity.role();
        if !self.permits(role) {
            tracing::info!(
                user = ctx.identity.display_name(),
                role = role.map(|r| r.as_str()).unwrap_or("none"),
                path = %ctx.path,
                "Role not permitted"
            );
            return Outcome::reject(self.name(), Rejection::Forbidden);
        }

        next.run(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::context;
    use crate::pipeline::Pipeline;
    use crate::security::identity::Identity;
    use axum::http::Method;

    fn gate() -> Pipeline {
        Pipeline::builder()
            .stage(RoleGate::from_config(&RoleGateConfig::default()))
            .build()
    }

    fn as_user(method: Method, path: &str, role: Option<Role>) -> RequestContext {
        let mut ctx = context(method, path);
        ctx.identity = Identity::user("u-1", "sam", role);
        ctx
    }

    fn rejection(outcome: Outcome) -> Option<Rejection> {
        match outcome {
            Outcome::ShortCircuit { rejection, .. } => Some(rejection),
            Outcome::Dispatch => None,
        }
    }

    #[test]
    fn test_user_role_forbidden_admin_allowed() {
        let gate = gate();
        assert_eq!(
            rejection(gate.run(&as_user(Method::POST, "/api/messages", Some(Role::User)))),
            Some(Rejection::Forbidden)
        );
        assert!(gate.run(&as_user(Method::POST, "/api/messages", Some(Role::Admin))).is_dispatch());
        assert!(gate.run(&as_user(Method::DELETE, "/api/messages/1", Some(Role::Moderator))).is_dispatch());
    }

    #[test]
    fn test_anonymous_gets_401() {
        assert_eq!(
            rejection(gate().run(&context(Method::PUT, "/api/conversations/1"))),
            Some(Rejection::Unauthenticated)
        );
    }

    #[test]
    fn test_missing_role_fails_closed() {
        assert_eq!(
            rejection(gate().run(&as_user(Method::POST, "/api/conversations", None))),
            Some(Rejection::Forbidden)
        );
    }

    #[test]
    fn test_out_of_scope_requests_pass() {
        let gate = gate();
        assert!(gate.run(&context(Method::GET, "/api/messages")).is_dispatch());
        assert!(gate.run(&context(Method::PATCH, "/api/messages/1")).is_dispatch());
        assert!(gate.run(&context(Method::POST, "/login")).is_dispatch());
    }
}
