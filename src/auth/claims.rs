// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical identity record and the header/token reconciliation rule.
//!
//! A request can carry identity on two channels: proxy-injected headers and a
//! bearer token. The reconciler merges them field-by-field with the token
//! taking precedence. Note that the *structurally decoded* token is used here,
//! not the verified one; cryptographic verification is a separate opt-in
//! operation (`verify.rs`). That asymmetry is inherited from the original
//! relay and is a known trust gap: with no enforcing proxy upstream, a forged
//! token can influence identity display and role resolution.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::headers::HeaderIdentity;

/// Which channel the canonical identity was sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// At least one field came from a decodable bearer token.
    Token,
    /// Exclusively header-sourced, with an identifying attribute present.
    Headers,
    /// Neither channel carried a subject or email.
    None,
}

/// Canonical identity claim set, constructed fresh per request.
///
/// Token-only claims (`sub`, `iss`, `aud`, `exp`, `iat`) are omitted from the
/// wire format when the identity is header-sourced.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience as it appears in the token (string or array).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub aud: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    pub source: Provenance,
}

impl Identity {
    /// Merge the header candidate with an optionally decoded token payload.
    ///
    /// Precedence, per field: token claim first, header value as fallback.
    /// Roles resolve `roles` claim, then `groups` claim, then header roles,
    /// then empty. Without a decodable token the header candidate is used
    /// verbatim.
    pub fn reconcile(header: HeaderIdentity, token_payload: Option<&Value>) -> Self {
        match token_payload {
            Some(payload) => Self::from_token(header, payload),
            None => Self::from_header(header),
        }
    }

    /// True when the identity carries at least one identifying attribute.
    pub fn is_authenticated(&self) -> bool {
        self.source != Provenance::None
    }

    fn from_token(header: HeaderIdentity, payload: &Value) -> Self {
        let claim_str = |name: &str| payload.get(name).and_then(Value::as_str).map(str::to_string);

        Self {
            username: claim_str("sub").or(header.username),
            email: claim_str("email").or(header.email),
            given_name: claim_str("given_name")
                .or_else(|| claim_str("givenName"))
                .or(header.given_name),
            family_name: claim_str("family_name")
                .or_else(|| claim_str("familyName"))
                .or(header.family_name),
            roles: token_roles(payload).unwrap_or(header.roles),
            sub: claim_str("sub"),
            iss: claim_str("iss"),
            aud: payload.get("aud").cloned(),
            exp: payload.get("exp").and_then(Value::as_i64),
            iat: payload.get("iat").and_then(Value::as_i64),
            source: Provenance::Token,
        }
    }

    fn from_header(header: HeaderIdentity) -> Self {
        let source = if header.is_identified() {
            Provenance::Headers
        } else {
            Provenance::None
        };
        Self {
            username: header.username,
            email: header.email,
            given_name: header.given_name,
            family_name: header.family_name,
            // Roles are not identifying; a role-only header set still yields
            // Provenance::None but keeps the roles for diagnostics.
            roles: header.roles,
            sub: None,
            iss: None,
            aud: None,
            exp: None,
            iat: None,
            source,
        }
    }
}

/// Resolve the role set from a decoded token payload.
///
/// The `roles` claim wins over `groups`; the first present array claim is
/// taken, with non-string entries dropped.
pub fn token_roles(payload: &Value) -> Option<Vec<String>> {
    ["roles", "groups"].iter().find_map(|claim| {
        payload.get(*claim).and_then(Value::as_array).map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header_candidate() -> HeaderIdentity {
        HeaderIdentity {
            username: Some("header-user".to_string()),
            email: Some("header@example.com".to_string()),
            given_name: Some("Header".to_string()),
            family_name: Some("User".to_string()),
            roles: vec!["viewer".to_string()],
            source: "headers",
        }
    }

    #[test]
    fn token_sub_overrides_header_username() {
        let payload = json!({"sub": "token-user", "exp": 1700003600});
        let identity = Identity::reconcile(header_candidate(), Some(&payload));
        assert_eq!(identity.username.as_deref(), Some("token-user"));
        assert_eq!(identity.sub.as_deref(), Some("token-user"));
        assert_eq!(identity.source, Provenance::Token);
    }

    #[test]
    fn header_fields_persist_for_claims_absent_from_token() {
        let payload = json!({"sub": "token-user"});
        let identity = Identity::reconcile(header_candidate(), Some(&payload));
        assert_eq!(identity.email.as_deref(), Some("header@example.com"));
        assert_eq!(identity.given_name.as_deref(), Some("Header"));
        assert_eq!(identity.family_name.as_deref(), Some("User"));
    }

    #[test]
    fn token_roles_claim_wins_over_groups_and_header() {
        let payload = json!({"sub": "u", "roles": ["admin"], "groups": ["devops"]});
        let identity = Identity::reconcile(header_candidate(), Some(&payload));
        assert_eq!(identity.roles, vec!["admin"]);
    }

    #[test]
    fn groups_claim_used_when_roles_absent() {
        let payload = json!({"sub": "u", "groups": ["devops"]});
        let identity = Identity::reconcile(header_candidate(), Some(&payload));
        assert_eq!(identity.roles, vec!["devops"]);
    }

    #[test]
    fn header_roles_used_when_token_has_neither_claim() {
        let payload = json!({"sub": "u"});
        let identity = Identity::reconcile(header_candidate(), Some(&payload));
        assert_eq!(identity.roles, vec!["viewer"]);
    }

    #[test]
    fn snake_and_camel_case_name_claims_both_accepted() {
        let payload = json!({"sub": "u", "givenName": "Tok", "family_name": "En"});
        let identity = Identity::reconcile(HeaderIdentity::default(), Some(&payload));
        assert_eq!(identity.given_name.as_deref(), Some("Tok"));
        assert_eq!(identity.family_name.as_deref(), Some("En"));
    }

    #[test]
    fn no_token_uses_header_candidate_verbatim() {
        let identity = Identity::reconcile(header_candidate(), None);
        assert_eq!(identity.username.as_deref(), Some("header-user"));
        assert_eq!(identity.roles, vec!["viewer"]);
        assert_eq!(identity.source, Provenance::Headers);
        assert!(identity.sub.is_none());
        assert!(identity.exp.is_none());
    }

    #[test]
    fn empty_sources_yield_none_provenance() {
        let identity = Identity::reconcile(HeaderIdentity::default(), None);
        assert_eq!(identity.source, Provenance::None);
        assert!(!identity.is_authenticated());
    }

    #[test]
    fn role_only_headers_are_not_authenticated() {
        let header = HeaderIdentity {
            roles: vec!["admin".to_string()],
            ..Default::default()
        };
        let identity = Identity::reconcile(header, None);
        assert_eq!(identity.source, Provenance::None);
        assert_eq!(identity.roles, vec!["admin"]);
    }

    #[test]
    fn token_scalar_claims_carried_through() {
        let payload = json!({
            "sub": "u",
            "iss": "https://pingfederate:9031",
            "aud": "react-app",
            "exp": 1700003600,
            "iat": 1700000000
        });
        let identity = Identity::reconcile(HeaderIdentity::default(), Some(&payload));
        assert_eq!(identity.iss.as_deref(), Some("https://pingfederate:9031"));
        assert_eq!(identity.aud, Some(json!("react-app")));
        assert_eq!(identity.exp, Some(1700003600));
        assert_eq!(identity.iat, Some(1700000000));
    }

    #[test]
    fn serializes_with_camel_case_and_omits_absent_fields() {
        let identity = Identity::reconcile(header_candidate(), None);
        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(value["givenName"], "Header");
        assert_eq!(value["source"], "headers");
        assert!(value.get("sub").is_none());
        assert!(value.get("exp").is_none());
    }
}
