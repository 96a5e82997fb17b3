// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup into an
//! immutable [`Config`] that is shared read-only through `AppState`. Defaults
//! target the local lab compose setup only.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `PF_ISSUER_URL` | Authorization-server base URL (startup log) | `https://pingfederate:9031` |
//! | `PF_JWKS_URL` | JWKS endpoint for signature verification | `https://pingfederate:9031/pf/JWKS` |
//! | `TRUSTED_ISSUERS` | Comma-separated exact issuer values | `https://localhost:9031,https://pingfederate:9031` |
//! | `JWT_AUDIENCE` | Expected JWT audience claim | `react-app` |
//! | `TLS_ACCEPT_INVALID_CERTS` | Accept self-signed JWKS TLS (lab only) | `true` |
//! | `JWKS_CACHE_TTL_SECS` | Signing-key cache TTL | `300` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Logging output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address to bind.
    pub addr: SocketAddr,
    /// Authorization-server base URL; informational (startup banner).
    pub issuer_url: String,
    /// JWKS endpoint URL.
    pub jwks_url: Url,
    /// Exact issuer values accepted during verification.
    pub trusted_issuers: Vec<String>,
    /// Expected audience claim value.
    pub audience: String,
    /// Accept self-signed TLS on the JWKS fetch. The lab PingFederate ships
    /// a self-signed certificate; this is scoped to the JWKS client only and
    /// must stay off anywhere near production.
    pub accept_invalid_certs: bool,
    /// Signing-key cache TTL.
    pub jwks_cache_ttl: Duration,
    /// Logging output format.
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: format!("{e}"),
            })?;

        let addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e| ConfigError::Invalid {
                    key: "HOST",
                    reason: format!("{e}"),
                })?;

        let issuer_url =
            env::var("PF_ISSUER_URL").unwrap_or_else(|_| "https://pingfederate:9031".to_string());

        let jwks_url = env::var("PF_JWKS_URL")
            .unwrap_or_else(|_| "https://pingfederate:9031/pf/JWKS".to_string());
        let jwks_url = Url::parse(&jwks_url).map_err(|e| ConfigError::Invalid {
            key: "PF_JWKS_URL",
            reason: format!("{e}"),
        })?;

        let trusted_issuers = env::var("TRUSTED_ISSUERS")
            .unwrap_or_else(|_| "https://localhost:9031,https://pingfederate:9031".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if trusted_issuers.is_empty() {
            return Err(ConfigError::Invalid {
                key: "TRUSTED_ISSUERS",
                reason: "at least one trusted issuer is required".to_string(),
            });
        }

        let audience = env::var("JWT_AUDIENCE").unwrap_or_else(|_| "react-app".to_string());

        let accept_invalid_certs = env::var("TLS_ACCEPT_INVALID_CERTS")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let jwks_cache_ttl = env::var("JWKS_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(300));

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            addr,
            issuer_url,
            jwks_url,
            trusted_issuers,
            audience,
            accept_invalid_certs,
            jwks_cache_ttl,
            log_format,
        })
    }
}
