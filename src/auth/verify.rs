// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against the remote key set.
//!
//! Two independent operations exist on a token:
//!
//! - [`TokenVerifier::verify`]: cryptographic verification (signature via
//!   JWKS, issuer pinned to the trusted set, audience, expiry with zero
//!   leeway). Used by the explicit verify endpoint and reported as a field by
//!   the diagnostic endpoints.
//! - [`decode_unverified`]: structural decode with no signature or expiry
//!   check, used for identity display and reconciliation.

use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Validation};
use serde_json::Value;

use super::error::AuthError;
use super::jwks::JwksManager;

/// Verifies bearer tokens against the configured trust anchors.
///
/// Holds the immutable trust configuration (issuer set, audience) and the
/// shared key cache; cheap to clone.
#[derive(Clone)]
pub struct TokenVerifier {
    jwks: Arc<JwksManager>,
    trusted_issuers: Vec<String>,
    audience: String,
}

impl TokenVerifier {
    pub fn new(jwks: Arc<JwksManager>, trusted_issuers: Vec<String>, audience: String) -> Self {
        Self {
            jwks,
            trusted_issuers,
            audience,
        }
    }

    /// Shared key cache handle.
    pub fn jwks(&self) -> &Arc<JwksManager> {
        &self.jwks
    }

    /// Verify a token and return its full claim payload.
    ///
    /// The issuer must equal one member of the trusted set exactly; the
    /// audience must equal (or, if multi-valued, contain) the configured
    /// audience; the expiry must be in the future with no skew window.
    pub async fn verify(&self, token: &str) -> Result<Value, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

        let (decoding_key, algorithm) = self.jwks.resolve(header.kid.as_deref()).await?;

        let validation = self.validation_for(algorithm);
        let token_data =
            decode::<Value>(token, &decoding_key, &validation).map_err(map_jwt_error)?;

        Ok(token_data.claims)
    }

    fn validation_for(&self, algorithm: jsonwebtoken::Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&self.trusted_issuers);
        validation.set_audience(&[&self.audience]);
        // No grace window: an expired token fails immediately.
        validation.leeway = 0;
        validation
    }
}

/// Structurally decode a token without any verification.
///
/// No signature, issuer, audience, or expiry check is applied; an expired or
/// forged token still decodes. Callers needing a trust guarantee must use
/// [`TokenVerifier::verify`] instead.
pub fn decode_unverified(token: &str) -> Result<Value, AuthError> {
    let token_data = jsonwebtoken::dangerous::insecure_decode::<Value>(token)
        .map_err(|_| AuthError::MalformedToken)?;
    Ok(token_data.claims)
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::InvalidAudience,
        jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        _ => AuthError::MalformedToken,
    }
}
