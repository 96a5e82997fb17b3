// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Header echo endpoint for debugging proxy injection.
//!
//! Must never be exposed outside a development or lab configuration: it
//! reflects every inbound header, including credentials. Nothing in code
//! enforces that; operators gate it at the proxy.

use axum::{http::HeaderMap, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::auth::HeaderIdentity;

/// Response for GET /api/debug/headers.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebugHeadersResponse {
    /// Raw request headers (non-UTF-8 values rendered lossily).
    #[schema(value_type = Object)]
    pub headers: Value,
    /// The identity candidate the claims extractor sees.
    pub user_from_headers: HeaderIdentity,
}

/// Echo all received headers and the derived header identity.
#[utoipa::path(
    get,
    path = "/api/debug/headers",
    tag = "Debug",
    responses(
        (status = 200, description = "Raw headers and header-derived candidate", body = DebugHeadersResponse)
    )
)]
pub async fn debug_headers(headers: HeaderMap) -> Json<DebugHeadersResponse> {
    let user_from_headers = HeaderIdentity::from_headers(&headers);

    let mut echoed = Map::new();
    for (name, value) in &headers {
        let rendered = String::from_utf8_lossy(value.as_bytes()).into_owned();
        echoed.insert(name.as_str().to_string(), Value::String(rendered));
    }

    Json(DebugHeadersResponse {
        headers: Value::Object(echoed),
        user_from_headers,
    })
}
