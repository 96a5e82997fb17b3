// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-gated demo resources.
//!
//! Role resolution runs through the same reconciliation as `whoami`: token
//! roles (structurally decoded, unverified) win over header roles. Both "no
//! identity" and "wrong role" respond 403 on these two routes, while other
//! routes use 401 for missing identity. Clients depend on that status
//! mapping, so it stays; the decision value itself carries the distinction.

use axum::{http::HeaderMap, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::headers::bearer_token;
use crate::auth::roles::{self, RoleDenied, RolePredicate};
use crate::auth::verify::decode_unverified;
use crate::auth::{HeaderIdentity, Identity};

/// Response for GET /api/admin.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub message: String,
    pub admin_data: AdminData,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminData {
    pub total_users: u32,
    pub active_connections: u32,
    pub last_backup: String,
}

/// Response for GET /api/devops.
#[derive(Debug, Serialize, ToSchema)]
pub struct DevOpsResponse {
    pub message: String,
    pub deployments: Deployments,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Deployments {
    pub production: DeploymentStatus,
    pub staging: DeploymentStatus,
    pub development: DeploymentStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentStatus {
    pub status: String,
    pub version: String,
}

impl DeploymentStatus {
    fn new(status: &str, version: &str) -> Self {
        Self {
            status: status.to_string(),
            version: version.to_string(),
        }
    }
}

/// Resolve the caller's identity and evaluate a role predicate.
fn check_role(headers: &HeaderMap, predicate: RolePredicate) -> Result<Identity, RoleDenied> {
    let header_user = HeaderIdentity::from_headers(headers);
    let token_payload = bearer_token(headers).and_then(|t| decode_unverified(t).ok());
    let identity = Identity::reconcile(header_user, token_payload.as_ref());

    let decision = predicate.evaluate(&identity);
    if decision.allowed {
        Ok(identity)
    } else {
        Err(predicate.denied(decision))
    }
}

/// Admin resource: requires the `admin` or `administrators` role.
#[utoipa::path(
    get,
    path = "/api/admin",
    tag = "Resources",
    responses(
        (status = 200, description = "Caller holds an admin role", body = AdminResponse),
        (status = 403, description = "Missing identity or role; body echoes the evaluated role set")
    )
)]
pub async fn admin(headers: HeaderMap) -> Result<Json<AdminResponse>, RoleDenied> {
    check_role(&headers, roles::ADMIN)?;

    Ok(Json(AdminResponse {
        message: "Welcome, Administrator!".to_string(),
        admin_data: AdminData {
            total_users: 42,
            active_connections: 15,
            last_backup: Utc::now().to_rfc3339(),
        },
    }))
}

/// DevOps resource: requires the `devops` or `developers` role.
#[utoipa::path(
    get,
    path = "/api/devops",
    tag = "Resources",
    responses(
        (status = 200, description = "Caller holds a devops role", body = DevOpsResponse),
        (status = 403, description = "Missing identity or role; body echoes the evaluated role set")
    )
)]
pub async fn devops(headers: HeaderMap) -> Result<Json<DevOpsResponse>, RoleDenied> {
    check_role(&headers, roles::DEVOPS)?;

    Ok(Json(DevOpsResponse {
        message: "Welcome, DevOps Engineer!".to_string(),
        deployments: Deployments {
            production: DeploymentStatus::new("healthy", "1.2.3"),
            staging: DeploymentStatus::new("deploying", "1.2.4"),
            development: DeploymentStatus::new("healthy", "1.3.0-dev"),
        },
    }))
}
