// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{config::ConfigError, logging::error_chain, providers::DevTokenError};

/// Any failure of the authorization page pipeline.
///
/// Every variant is terminal for the request and becomes a plain-text 500
/// carrying the raw error message.
#[derive(Debug, thiserror::Error)]
pub enum AuthorizeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    DevToken(#[from] DevTokenError),

    #[error(transparent)]
    Render(#[from] minijinja::Error),
}

impl AuthorizeError {
    /// Stage label attached to the logged error.
    pub fn stage(&self) -> &'static str {
        match self {
            AuthorizeError::Config(_) => "initWithEnv",
            AuthorizeError::DevToken(e) => e.stage(),
            AuthorizeError::Render(_) => "render",
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AuthorizeError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            error_chain(&self),
        )
            .into_response()
    }
}
