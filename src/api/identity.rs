// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity endpoints: who the caller is, and a simple authenticated gate.

use axum::{http::HeaderMap, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::headers::bearer_token;
use crate::auth::verify::decode_unverified;
use crate::auth::{HeaderIdentity, Identity};
use crate::error::ApiError;

/// Response for GET /api/protected.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProtectedResponse {
    pub message: String,
    /// Header username, or "authenticated" for token-only callers.
    pub user: String,
    pub timestamp: String,
}

/// Current caller identity, reconciled from headers and bearer token.
///
/// The bearer token is only *structurally* decoded here; this endpoint
/// reports identity, it does not grant anything.
#[utoipa::path(
    get,
    path = "/api/whoami",
    tag = "Identity",
    responses(
        (status = 200, description = "Reconciled identity claim set", body = Identity),
        (status = 401, description = "No identity on either channel")
    )
)]
pub async fn whoami(headers: HeaderMap) -> Result<Json<Identity>, ApiError> {
    let header_user = HeaderIdentity::from_headers(&headers);

    if let Some(token) = bearer_token(&headers) {
        match decode_unverified(token) {
            Ok(payload) => {
                return Ok(Json(Identity::reconcile(header_user, Some(&payload))));
            }
            Err(e) => {
                // Undecodable token degrades to header-only identity.
                tracing::debug!(error = %e, "failed to decode bearer token");
            }
        }
    }

    if header_user.is_identified() {
        return Ok(Json(Identity::reconcile(header_user, None)));
    }

    Err(ApiError::unauthorized(
        "Not authenticated",
        "No user information found in headers or token",
    ))
}

/// Protected resource: requires any authentication signal.
///
/// A bearer token counts even if undecodable; the proxy in front is expected
/// to have enforced it. Header identity counts via the username field.
#[utoipa::path(
    get,
    path = "/api/protected",
    tag = "Identity",
    responses(
        (status = 200, description = "Caller is authenticated", body = ProtectedResponse),
        (status = 401, description = "No authentication present")
    )
)]
pub async fn protected(headers: HeaderMap) -> Result<Json<ProtectedResponse>, ApiError> {
    let header_user = HeaderIdentity::from_headers(&headers);
    let token = bearer_token(&headers);

    if token.is_none() && header_user.username.is_none() {
        return Err(ApiError::unauthorized(
            "Authentication required",
            "This endpoint requires authentication",
        ));
    }

    Ok(Json(ProtectedResponse {
        message: "You have access to this protected resource".to_string(),
        user: header_user
            .username
            .unwrap_or_else(|| "authenticated".to_string()),
        timestamp: Utc::now().to_rfc3339(),
    }))
}
