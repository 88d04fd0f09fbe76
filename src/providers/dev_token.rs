// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client for the sibling service that hands out Apple Music developer
//! tokens. The service returns the stored token, minting a new one first if
//! needed; this side only fetches and decodes it.

use std::time::Duration;

use reqwest::{Client, Request};
use tracing::debug;

use crate::models::DeveloperTokenPayload;

pub const CREATE_DEV_TOKEN_PATH: &str = "/createAppleDevToken";

/// Upper bound on the whole token round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the process-wide HTTP client. Call once at startup.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(REQUEST_TIMEOUT).build()
}

#[derive(Debug, thiserror::Error)]
pub enum DevTokenError {
    /// The request could not be built, e.g. an empty or relative hostname.
    #[error(transparent)]
    Request(reqwest::Error),

    /// Sending the request failed.
    #[error(transparent)]
    Transport(reqwest::Error),

    /// The response body could not be read to the end.
    #[error(transparent)]
    Body(reqwest::Error),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl DevTokenError {
    /// Stage label used when the error is logged.
    pub fn stage(&self) -> &'static str {
        match self {
            DevTokenError::Request(_) => "appleDevToken Request",
            DevTokenError::Transport(_) => "appleDevToken Response",
            DevTokenError::Body(_) | DevTokenError::Decode(_) => "appleDevToken Decoder",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DevTokenClient {
    http: Client,
    hostname: String,
}

impl DevTokenClient {
    /// `http` is cheap to clone and shares its connection pool.
    pub fn new(http: Client, hostname: impl Into<String>) -> Self {
        Self {
            http,
            hostname: hostname.into(),
        }
    }

    /// `{hostname}/createAppleDevToken`. The hostname is used verbatim.
    pub fn endpoint(&self) -> String {
        format!("{}{CREATE_DEV_TOKEN_PATH}", self.hostname)
    }

    pub fn build_request(&self) -> Result<Request, DevTokenError> {
        self.http
            .get(self.endpoint())
            .build()
            .map_err(DevTokenError::Request)
    }

    /// Fetch and decode the current developer token.
    ///
    /// The response status is not checked; an error page from the token
    /// service fails at decoding.
    pub async fn fetch(&self) -> Result<DeveloperTokenPayload, DevTokenError> {
        let request = self.build_request()?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(DevTokenError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "Developer token service returned a non-success status");
        }

        let body = response.bytes().await.map_err(DevTokenError::Body)?;
        Ok(serde_json::from_slice(&body)?)
    }
}
