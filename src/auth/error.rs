// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and verification errors.

use thiserror::Error;

/// Errors raised while verifying a bearer token or resolving its signing key.
///
/// These never reach the wire as-is: the endpoints report them either as a
/// `verified: false` field (token-info) or as the `error` string of a 401
/// body (verify-token), so only the `Display` text matters.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token is not structurally decodable as a JWT.
    #[error("Token is malformed")]
    MalformedToken,
    /// Token signature does not verify against the resolved key.
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// Token expiration is in the past.
    #[error("Token has expired")]
    TokenExpired,
    /// Token issuer is not in the trusted issuer set.
    #[error("Token issuer is not trusted")]
    InvalidIssuer,
    /// Token audience does not match the expected audience.
    #[error("Token audience is invalid")]
    InvalidAudience,
    /// Token `nbf` is in the future.
    #[error("Token is not yet valid")]
    TokenNotYetValid,
    /// The remote JWKS document could not be fetched or parsed.
    #[error("Failed to fetch JWKS: {0}")]
    JwksFetch(String),
    /// No key in the JWKS matches the token's key identifier.
    #[error("No matching key found in JWKS")]
    NoMatchingKey,
    /// Anything unexpected (key conversion, unsupported key type, ...).
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_is_stable() {
        assert_eq!(AuthError::TokenExpired.to_string(), "Token has expired");
        assert_eq!(
            AuthError::InvalidIssuer.to_string(),
            "Token issuer is not trusted"
        );
        assert_eq!(
            AuthError::JwksFetch("timeout".to_string()).to_string(),
            "Failed to fetch JWKS: timeout"
        );
    }
}
