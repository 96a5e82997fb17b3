// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-based authorization decisions.
//!
//! Role sets are flat: matching is case-insensitive exact comparison against
//! a fixed predicate of acceptable names. There is no hierarchy, inheritance,
//! or wildcard support.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::claims::Identity;

/// Accepts the admin role family.
pub const ADMIN: RolePredicate = RolePredicate {
    accepted: &["admin", "administrators"],
    denial_message: "Admin role required",
};

/// Accepts the devops role family.
pub const DEVOPS: RolePredicate = RolePredicate {
    accepted: &["devops", "developers"],
    denial_message: "DevOps role required",
};

/// A set of acceptable role names for an endpoint.
#[derive(Debug, Clone, Copy)]
pub struct RolePredicate {
    accepted: &'static [&'static str],
    denial_message: &'static str,
}

/// Outcome of evaluating a role predicate against an identity.
///
/// `authenticated` lets callers distinguish "authenticate first" from
/// "insufficient role" even though the admin/devops HTTP surface collapses
/// both into 403. Other routes use 401 for missing identity; the mismatch is
/// part of the relay's long-standing wire contract.
#[derive(Debug, Clone)]
pub struct AccessDecision {
    pub allowed: bool,
    pub authenticated: bool,
    /// The role set that was evaluated, echoed back for diagnostics.
    pub roles: Vec<String>,
}

impl RolePredicate {
    /// Evaluate this predicate against the identity's role set.
    pub fn evaluate(&self, identity: &Identity) -> AccessDecision {
        let allowed = identity.roles.iter().any(|role| {
            self.accepted
                .iter()
                .any(|accepted| role.eq_ignore_ascii_case(accepted))
        });

        AccessDecision {
            allowed,
            authenticated: identity.is_authenticated(),
            roles: identity.roles.clone(),
        }
    }

    /// The 403 response for a failed decision.
    pub fn denied(&self, decision: AccessDecision) -> RoleDenied {
        RoleDenied {
            message: self.denial_message,
            your_roles: decision.roles,
        }
    }
}

/// 403 rejection carrying the caller's resolved role set for transparency.
#[derive(Debug)]
pub struct RoleDenied {
    message: &'static str,
    your_roles: Vec<String>,
}

/// Wire shape of the 403 body: `{error, message, yourRoles}`.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RoleDeniedBody {
    error: &'static str,
    message: &'static str,
    your_roles: Vec<String>,
}

impl IntoResponse for RoleDenied {
    fn into_response(self) -> Response {
        let body = Json(RoleDeniedBody {
            error: "Forbidden",
            message: self.message,
            your_roles: self.your_roles,
        });
        (StatusCode::FORBIDDEN, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::headers::HeaderIdentity;
    use axum::body::to_bytes;

    fn identity_with_roles(roles: &[&str]) -> Identity {
        let header = HeaderIdentity {
            username: Some("abishek".to_string()),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        };
        Identity::reconcile(header, None)
    }

    #[test]
    fn matching_role_allows() {
        let decision = ADMIN.evaluate(&identity_with_roles(&["admin"]));
        assert!(decision.allowed);
        assert!(decision.authenticated);
    }

    #[test]
    fn role_matching_is_case_insensitive() {
        assert!(ADMIN.evaluate(&identity_with_roles(&["Admin"])).allowed);
        assert!(ADMIN.evaluate(&identity_with_roles(&["ADMINISTRATORS"])).allowed);
        assert!(DEVOPS.evaluate(&identity_with_roles(&["DevOps"])).allowed);
    }

    #[test]
    fn no_partial_or_wildcard_matching() {
        assert!(!ADMIN.evaluate(&identity_with_roles(&["administrator"])).allowed);
        assert!(!ADMIN.evaluate(&identity_with_roles(&["admin-extra"])).allowed);
        assert!(!ADMIN.evaluate(&identity_with_roles(&["*"])).allowed);
    }

    #[test]
    fn wrong_role_denies_but_stays_authenticated() {
        let decision = ADMIN.evaluate(&identity_with_roles(&["devops"]));
        assert!(!decision.allowed);
        assert!(decision.authenticated);
        assert_eq!(decision.roles, vec!["devops"]);
    }

    #[test]
    fn empty_identity_denies_unauthenticated() {
        let identity = Identity::reconcile(HeaderIdentity::default(), None);
        let decision = ADMIN.evaluate(&identity);
        assert!(!decision.allowed);
        assert!(!decision.authenticated);
        assert!(decision.roles.is_empty());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let identity = identity_with_roles(&["devops"]);
        let first = ADMIN.evaluate(&identity);
        let second = ADMIN.evaluate(&identity);
        assert_eq!(first.allowed, second.allowed);
        assert_eq!(first.roles, second.roles);
    }

    #[tokio::test]
    async fn denial_response_carries_roles() {
        let decision = ADMIN.evaluate(&identity_with_roles(&["devops"]));
        let response = ADMIN.denied(decision).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "Forbidden");
        assert_eq!(body["message"], "Admin role required");
        assert_eq!(body["yourRoles"][0], "devops");
    }
}
