// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stand-ins for the developer token service, shared by unit tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{routing::get, Router};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

use crate::providers::dev_token::CREATE_DEV_TOKEN_PATH;

pub struct TokenService {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl TokenService {
    /// Requests received on the token path so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serve `body` on `GET /createAppleDevToken` from an ephemeral port.
pub async fn spawn_token_service(body: &'static str) -> TokenService {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().route(
        CREATE_DEV_TOKEN_PATH,
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                body
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TokenService {
        base_url: format!("http://{addr}"),
        hits,
    }
}

/// Base URL of a port nothing listens on.
pub async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Serve a response that announces more body bytes than it sends, then
/// closes the connection.
pub async fn spawn_truncated_body_service() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"Tok")
                .await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}")
}
