// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc};

use authgate_server::{
    api::router, config::Config, state::AppState, store::InMemoryUserStore, telemetry,
};

#[tokio::main]
async fn main() {
    let config = Config::from_env().expect("Invalid configuration");
    telemetry::init(config.log_format);

    if config.auth.jwt_secret.is_none() {
        tracing::warn!(
            "JWT_SECRET is not set; using a random signing secret, tokens will not survive a restart"
        );
    }

    let store = InMemoryUserStore::demo().expect("Failed to seed user store");
    tracing::info!(users = store.len(), "user store ready");

    let state = AppState::new(Arc::new(store), &config.auth);
    tracing::info!(
        strategy = ?state.login_strategy,
        token_ttl_secs = config.auth.token_ttl.num_seconds(),
        "authentication configured"
    );
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(%addr, "Authgate server listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
