// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token inspection and verification endpoints.
//!
//! `token-info` is diagnostic: it reports the structural decode *and* the
//! verification outcome side by side, and never fails the HTTP call just
//! because verification failed. `verify-token` is the explicit trust check:
//! verification failure is a 401 there.

use axum::{extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::headers::bearer_token;
use crate::auth::verify::decode_unverified;
use crate::error::ApiError;
use crate::state::AppState;

/// Number of token characters echoed back before truncation.
const TOKEN_PREVIEW_LEN: usize = 50;

/// Response for GET /api/token-info.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfoResponse {
    /// Truncated token preview, never the full credential.
    pub access_token: String,
    /// Structurally decoded payload (unverified).
    #[schema(value_type = Object)]
    pub decoded_access_token: Value,
    /// Whether cryptographic verification succeeded.
    pub verified: bool,
    /// Human-readable verification failure, when `verified` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_error: Option<String>,
    pub issuer: Option<String>,
    #[schema(value_type = Object)]
    pub audience: Option<Value>,
    pub subject: Option<String>,
    /// RFC 3339 expiry, or null when the claim is absent.
    pub expiration: Option<String>,
    /// RFC 3339 issue time, or null when the claim is absent.
    pub issued_at: Option<String>,
}

/// Request body for POST /api/verify-token.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyTokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyTokenSuccess {
    pub valid: bool,
    #[schema(value_type = Object)]
    pub claims: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyTokenFailure {
    pub valid: bool,
    pub error: String,
}

/// Token details for debugging.
///
/// Verification failure is reported as a field, not an HTTP error: the
/// endpoint's purpose is inspection, and a broken token is still worth
/// showing.
#[utoipa::path(
    get,
    path = "/api/token-info",
    tag = "Tokens",
    responses(
        (status = 200, description = "Decode and verification outcome", body = TokenInfoResponse),
        (status = 400, description = "Token present but not decodable"),
        (status = 401, description = "No bearer token presented")
    )
)]
pub async fn token_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenInfoResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or_else(|| {
        ApiError::unauthorized(
            "No token provided",
            "Authorization header with Bearer token required",
        )
    })?;

    let decoded = decode_unverified(token)
        .map_err(|e| ApiError::bad_request("Invalid token", e.to_string()))?;

    let (verified, verification_error) = match state.verifier.verify(token).await {
        Ok(_) => (true, None),
        Err(e) => {
            tracing::debug!(error = %e, "token verification failed");
            (false, Some(e.to_string()))
        }
    };

    let claim_str = |name: &str| decoded.get(name).and_then(Value::as_str).map(str::to_string);
    let claim_ts = |name: &str| {
        decoded
            .get(name)
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.to_rfc3339())
    };

    Ok(Json(TokenInfoResponse {
        access_token: token_preview(token),
        verified,
        verification_error,
        issuer: claim_str("iss"),
        audience: decoded.get("aud").cloned(),
        subject: claim_str("sub"),
        expiration: claim_ts("exp"),
        issued_at: claim_ts("iat"),
        decoded_access_token: decoded,
    }))
}

/// Verify a token supplied in the request body.
#[utoipa::path(
    post,
    path = "/api/verify-token",
    tag = "Tokens",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Token is valid", body = VerifyTokenSuccess),
        (status = 400, description = "No token field in body"),
        (status = 401, description = "Verification failed", body = VerifyTokenFailure)
    )
)]
pub async fn verify_token(
    State(state): State<AppState>,
    Json(request): Json<VerifyTokenRequest>,
) -> axum::response::Response {
    let Some(token) = request.token else {
        return ApiError::bad_request("Token required", "Provide token in request body")
            .into_response();
    };

    match state.verifier.verify(&token).await {
        Ok(claims) => Json(VerifyTokenSuccess {
            valid: true,
            claims,
        })
        .into_response(),
        // Any verification failure is a 401 here, never a 500: the endpoint
        // answers "is this token valid", and the answer is no.
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(VerifyTokenFailure {
                valid: false,
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

fn token_preview(token: &str) -> String {
    let end = token.len().min(TOKEN_PREVIEW_LEN);
    format!("{}...", &token[..end])
}
