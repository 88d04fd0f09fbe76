// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use reqwest::Client;

use crate::config::EnvSource;

/// Process-wide, read-only handler state.
///
/// Per-request configuration is not stored here; it is resolved from `env`
/// on every request.
#[derive(Clone)]
pub struct AppState {
    /// Shared connection pool for the developer token service.
    pub http: Client,
    pub env: EnvSource,
}

impl AppState {
    pub fn new(http: Client, env: EnvSource) -> Self {
        Self { http, env }
    }
}
