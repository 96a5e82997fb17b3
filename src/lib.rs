// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! IAM Relay - Header/Token Identity Relay Service
//!
//! A thin relay that sits behind an IAM reverse proxy (PingAccess-style) and
//! in front of demo frontends. It consumes identity from proxy-injected
//! headers and bearer tokens, reconciles the two, verifies tokens against the
//! authorization server's JWKS on demand, and serves role-gated endpoints.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Claims extraction, token verification, reconciliation, roles
//! - `config` - Environment-derived immutable configuration
//! - `state` - Shared application state

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
