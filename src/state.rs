// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{JwksManager, TokenVerifier};
use crate::config::Config;

/// Shared application state; cheap to clone.
///
/// The only mutable piece is the signing-key cache inside `JwksManager`;
/// identity is never cached across requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let jwks = Arc::new(
            JwksManager::new(config.jwks_url.as_str(), config.accept_invalid_certs)
                .with_cache_ttl(config.jwks_cache_ttl),
        );
        let verifier = TokenVerifier::new(
            Arc::clone(&jwks),
            config.trusted_issuers.clone(),
            config.audience.clone(),
        );
        Self {
            config: Arc::new(config),
            verifier,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::LogFormat;
    use std::time::Duration;

    pub(crate) fn test_config() -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            issuer_url: "https://pingfederate:9031".to_string(),
            jwks_url: url::Url::parse("https://pingfederate:9031/pf/JWKS").unwrap(),
            trusted_issuers: vec!["https://pingfederate:9031".to_string()],
            audience: "react-app".to_string(),
            accept_invalid_certs: false,
            jwks_cache_ttl: Duration::from_secs(300),
            log_format: LogFormat::Pretty,
        }
    }

    #[test]
    fn state_builds_from_config() {
        let state = AppState::new(test_config());
        assert_eq!(
            state.verifier.jwks().jwks_url(),
            "https://pingfederate:9031/pf/JWKS"
        );
        let clone = state.clone();
        assert_eq!(clone.config.audience, "react-app");
    }
}
