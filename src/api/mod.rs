// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{claims::Provenance, HeaderIdentity, Identity};
use crate::state::AppState;

pub mod debug;
pub mod health;
pub mod identity;
pub mod resources;
pub mod tokens;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/whoami", get(identity::whoami))
        .route("/token-info", get(tokens::token_info))
        .route("/verify-token", post(tokens::verify_token))
        .route("/protected", get(identity::protected))
        .route("/admin", get(resources::admin))
        .route("/devops", get(resources::devops))
        .route("/debug/headers", get(debug::debug_headers))
        .with_state(state);

    // Layer order matters: the request id must be set before the trace layer
    // runs so it appears in spans, and propagated back onto the response.
    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        identity::whoami,
        identity::protected,
        tokens::token_info,
        tokens::verify_token,
        resources::admin,
        resources::devops,
        debug::debug_headers
    ),
    components(
        schemas(
            health::HealthResponse,
            Identity,
            Provenance,
            HeaderIdentity,
            identity::ProtectedResponse,
            tokens::TokenInfoResponse,
            tokens::VerifyTokenRequest,
            tokens::VerifyTokenSuccess,
            tokens::VerifyTokenFailure,
            resources::AdminResponse,
            resources::AdminData,
            resources::DevOpsResponse,
            resources::Deployments,
            resources::DeploymentStatus,
            debug::DebugHeadersResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Identity", description = "Caller identity and authenticated resources"),
        (name = "Tokens", description = "Bearer token inspection and verification"),
        (name = "Resources", description = "Role-gated demo resources"),
        (name = "Debug", description = "Development-only diagnostics")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_config;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::new(test_config()));
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        let app = router(AppState::new(test_config()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response
            .headers()
            .get("x-request-id")
            .expect("x-request-id header set on every response");
        assert!(!request_id.is_empty());
    }
}
