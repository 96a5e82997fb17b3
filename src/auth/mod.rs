// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity and Authorization Module
//!
//! The relay consumes two identity channels per request:
//!
//! 1. Proxy-injected headers (`X-Forwarded-*` / legacy `X-PA-*`), asserted by
//!    the IAM reverse proxy and trusted on network position alone.
//! 2. `Authorization: Bearer <JWT>`, verifiable against the authorization
//!    server's JWKS.
//!
//! ## Pipeline
//!
//! request headers → [`headers`] (extraction) → [`verify`] (optional decode /
//! verification) → [`claims`] (reconciliation) → [`roles`] (decision)
//!
//! ## Security
//!
//! - Identity display and role resolution use the *structurally decoded*
//!   token; cryptographic verification is opt-in per endpoint. With no
//!   enforcing proxy upstream, a forged token can influence identity display
//!   and role resolution. This is a known trust gap in the relay's contract;
//!   a hardened deployment must require verification before any allow/deny
//!   decision consumes token claims.
//! - JWKS fetching is cached and bounded by a request timeout; unknown key
//!   identifiers trigger at most one refresh per verification.

pub mod claims;
pub mod error;
pub mod headers;
pub mod jwks;
pub mod roles;
pub mod verify;

pub use claims::{Identity, Provenance};
pub use error::AuthError;
pub use headers::HeaderIdentity;
pub use jwks::JwksManager;
pub use verify::TokenVerifier;
