// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, time::Duration};

use apple_auth_server::{
    api::router,
    config::{
        EnvSource, DEFAULT_HOST, DEFAULT_PORT, HOST_ENV, LOG_FORMAT_ENV, PORT_ENV,
        TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV,
    },
    logging::{init_tracing, LogFormat},
    providers::dev_token::build_http_client,
    state::AppState,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::info;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    init_tracing(LogFormat::parse(env::var(LOG_FORMAT_ENV).ok().as_deref()));

    // One pooled client for the lifetime of the process
    let http = build_http_client().expect("Failed to create HTTP client");
    let app = router(AppState::new(http, EnvSource::Process));

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port: u16 = env::var(PORT_ENV)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let handle = Handle::<SocketAddr>::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    match (env::var(TLS_CERT_PATH_ENV), env::var(TLS_KEY_PATH_ENV)) {
        (Ok(cert_path), Ok(key_path)) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .expect("Failed to install rustls crypto provider");

            let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
                .await
                .expect("Failed to load TLS certificate or key");

            info!(%addr, "Apple auth server listening on https");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        _ => {
            info!(%addr, "Apple auth server listening on http");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }
}

async fn shutdown_on_ctrl_c(handle: Handle<SocketAddr>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received, draining connections");
        handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
    }
}
