// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing key set: JWKS fetching and caching.
//!
//! One `JwksManager` lives for the process lifetime. The key set is fetched
//! lazily on first use and cached with a TTL. A token carrying an unknown key
//! identifier triggers one refresh-and-retry before failing; refresh is
//! fetch-and-replace, so concurrent refreshes are idempotent and safe to race.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Bound on the JWKS fetch round trip.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// JWKS manager with caching.
///
/// Fetches and caches the signing key set published by the authorization
/// server (e.g. PingFederate's `/pf/JWKS`).
#[derive(Clone)]
pub struct JwksManager {
    jwks_url: String,
    cache_ttl: Duration,
    cache: Arc<RwLock<Option<CacheEntry>>>,
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager.
    ///
    /// `accept_invalid_certs` disables TLS certificate verification for the
    /// JWKS fetch only. The lab PingFederate ships a self-signed certificate;
    /// this must stay off anywhere near production.
    pub fn new(jwks_url: impl Into<String>, accept_invalid_certs: bool) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .danger_accept_invalid_certs(accept_invalid_certs)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Pre-populate the cache with a known key set, bypassing the network.
    #[cfg(test)]
    pub(crate) fn with_preloaded_keys(self, jwks: JwkSet) -> Self {
        Self {
            cache: Arc::new(RwLock::new(Some(CacheEntry {
                jwks,
                fetched_at: Instant::now(),
            }))),
            ..self
        }
    }

    /// Resolve a decoding key for a token.
    ///
    /// With a `kid`, looks it up in the cached set; an unknown `kid` triggers
    /// exactly one refresh before failing with [`AuthError::NoMatchingKey`].
    /// Without a `kid`, the first usable key in the set is returned.
    pub async fn resolve(&self, kid: Option<&str>) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwks = self.get_jwks().await?;

        if let Some(key) = find_key(&jwks, kid) {
            return Ok(key);
        }

        // Key rotation may have outpaced the cache; refresh once and retry.
        tracing::debug!(kid = ?kid, "key not in cached JWKS, refreshing");
        let jwks = self.refresh().await?;
        find_key(&jwks, kid).ok_or(AuthError::NoMatchingKey)
    }

    /// Fetch the key set, serving from cache while fresh.
    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        self.refresh().await
    }

    /// Fetch the key set from the endpoint and replace the cache.
    pub async fn refresh(&self) -> Result<JwkSet, AuthError> {
        let jwks = self.fetch_jwks().await?;

        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });

        Ok(jwks)
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        tracing::debug!(url = %self.jwks_url, "fetching JWKS");

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::JwksFetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))
    }

    /// Check if the key set is currently cached and fresh.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        if let Some(entry) = &*cache {
            entry.fetched_at.elapsed() < self.cache_ttl
        } else {
            false
        }
    }
}

fn find_key(jwks: &JwkSet, kid: Option<&str>) -> Option<(DecodingKey, Algorithm)> {
    match kid {
        Some(kid) => jwks
            .keys
            .iter()
            .find(|k| k.common.key_id.as_deref() == Some(kid))
            .and_then(|jwk| jwk_to_decoding_key(jwk).ok()),
        None => jwks.keys.iter().find_map(|jwk| jwk_to_decoding_key(jwk).ok()),
    }
}

/// Convert a JWK to a DecodingKey.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(|e| AuthError::Internal(format!("Failed to create RSA key: {e}")))?;

            let alg = jwk
                .common
                .key_algorithm
                .map(|a| match a {
                    jsonwebtoken::jwk::KeyAlgorithm::RS256 => Algorithm::RS256,
                    jsonwebtoken::jwk::KeyAlgorithm::RS384 => Algorithm::RS384,
                    jsonwebtoken::jwk::KeyAlgorithm::RS512 => Algorithm::RS512,
                    _ => Algorithm::RS256, // Default for RSA
                })
                .unwrap_or(Algorithm::RS256);

            Ok((key, alg))
        }
        AlgorithmParameters::EllipticCurve(ec) => {
            let key = DecodingKey::from_ec_components(&ec.x, &ec.y)
                .map_err(|e| AuthError::Internal(format!("Failed to create EC key: {e}")))?;

            let alg = jwk
                .common
                .key_algorithm
                .map(|a| match a {
                    jsonwebtoken::jwk::KeyAlgorithm::ES256 => Algorithm::ES256,
                    jsonwebtoken::jwk::KeyAlgorithm::ES384 => Algorithm::ES384,
                    _ => Algorithm::ES256, // Default for EC
                })
                .unwrap_or(Algorithm::ES256);

            Ok((key, alg))
        }
        _ => Err(AuthError::Internal(
            "Unsupported key type in JWKS".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwks_manager_creation() {
        let manager = JwksManager::new("https://pingfederate:9031/pf/JWKS", false);
        assert_eq!(manager.jwks_url(), "https://pingfederate:9031/pf/JWKS");
    }

    #[test]
    fn custom_cache_ttl() {
        let manager = JwksManager::new("https://pingfederate:9031/pf/JWKS", false)
            .with_cache_ttl(Duration::from_secs(60));
        assert_eq!(manager.cache_ttl, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn cache_initially_empty() {
        let manager = JwksManager::new("https://pingfederate:9031/pf/JWKS", false);
        assert!(!manager.is_cached().await);
    }

    #[test]
    fn find_key_misses_on_empty_set() {
        let jwks = JwkSet { keys: vec![] };
        assert!(find_key(&jwks, Some("kid-1")).is_none());
        assert!(find_key(&jwks, None).is_none());
    }

    fn test_key_set() -> JwkSet {
        serde_json::from_str(include_str!("testdata/jwks.json")).unwrap()
    }

    #[tokio::test]
    async fn resolve_finds_preloaded_key_by_kid() {
        let manager = JwksManager::new("https://pingfederate:9031/pf/JWKS", false)
            .with_preloaded_keys(test_key_set());
        assert!(manager.is_cached().await);

        let (_, algorithm) = manager.resolve(Some("relay-test-key")).await.unwrap();
        assert_eq!(algorithm, Algorithm::RS256);
    }

    #[tokio::test]
    async fn resolve_without_kid_uses_first_usable_key() {
        let manager = JwksManager::new("https://pingfederate:9031/pf/JWKS", false)
            .with_preloaded_keys(test_key_set());
        assert!(manager.resolve(None).await.is_ok());
    }
}
