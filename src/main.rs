// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use iam_relay::api::router;
use iam_relay::config::{Config, LogFormat};
use iam_relay::state::AppState;

#[tokio::main]
async fn main() {
    let config = Config::from_env().expect("Failed to load configuration");

    init_tracing(config.log_format);

    tracing::info!(
        issuer = %config.issuer_url,
        jwks = %config.jwks_url,
        audience = %config.audience,
        "starting IAM relay backend-api"
    );
    if config.accept_invalid_certs {
        tracing::warn!("TLS certificate verification for the JWKS fetch is DISABLED (lab mode)");
    }

    let addr = config.addr;
    let state = AppState::new(config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!(%addr, "listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
