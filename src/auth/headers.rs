// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims extraction from proxy-injected headers.
//!
//! The reverse proxy (PingAccess) authenticates the user and injects identity
//! headers before forwarding the request. These headers are asserted, not
//! cryptographically verified; the relay trusts the proxy's network position.
//! Each field is read from a primary header with a legacy `X-PA-*` fallback.

use axum::http::HeaderMap;
use serde::Serialize;
use utoipa::ToSchema;

/// Primary/legacy header pairs for each identity field.
const USER_HEADERS: (&str, &str) = ("x-forwarded-user", "x-pa-subject");
const EMAIL_HEADERS: (&str, &str) = ("x-forwarded-email", "x-pa-email");
const GIVEN_NAME_HEADERS: (&str, &str) = ("x-forwarded-given-name", "x-pa-given-name");
const FAMILY_NAME_HEADERS: (&str, &str) = ("x-forwarded-family-name", "x-pa-family-name");
const GROUPS_HEADERS: (&str, &str) = ("x-forwarded-groups", "x-pa-groups");

/// Identity candidate lifted from proxy-injected headers.
///
/// Always constructible (possibly all-empty); never an error.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeaderIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    pub roles: Vec<String>,
    /// Always `"headers"`; part of the JSON wire format.
    pub source: &'static str,
}

impl HeaderIdentity {
    /// Build the header candidate from the request headers.
    ///
    /// Pure function of the input; unreadable (non-UTF-8) header values are
    /// treated as absent.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            username: header_value(headers, USER_HEADERS),
            email: header_value(headers, EMAIL_HEADERS),
            given_name: header_value(headers, GIVEN_NAME_HEADERS),
            family_name: header_value(headers, FAMILY_NAME_HEADERS),
            roles: header_value(headers, GROUPS_HEADERS)
                .map(|raw| parse_roles(&raw))
                .unwrap_or_default(),
            source: "headers",
        }
    }

    /// True when the candidate carries at least one identifying attribute.
    pub fn is_identified(&self) -> bool {
        self.username.is_some() || self.email.is_some()
    }
}

fn header_value(headers: &HeaderMap, (primary, legacy): (&str, &str)) -> Option<String> {
    headers
        .get(primary)
        .or_else(|| headers.get(legacy))
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a role header encoded as either a JSON array or a comma-separated
/// string. JSON is attempted first; on any parse failure the value is split on
/// commas, entries trimmed, and empty tokens dropped.
pub fn parse_roles(raw: &str) -> Vec<String> {
    if let Ok(roles) = serde_json::from_str::<Vec<String>>(raw) {
        return roles;
    }
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract the bearer token from the `Authorization` header.
///
/// The value must start with the literal `Bearer ` prefix (case-sensitive,
/// single space); anything else yields `None`, never an error.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
