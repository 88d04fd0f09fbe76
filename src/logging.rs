// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Logging
//!
//! Two concerns live here:
//!
//! - [`init_tracing`] installs the global `tracing` subscriber (pretty or
//!   JSON, filtered by `RUST_LOG`).
//! - [`ErrorLogger`] reports handler failures as structured error events
//!   tagged with a pipeline stage and, when known, the inbound request.
//!
//! An `ErrorLogger` is either bound to a cloud project (initialized from the
//! `GCLOUD_CONFIG` service account) or the process-log fallback used when
//! that initialization fails. Both emit through `tracing`; the cloud variant
//! adds the project and log name so the collector can route the entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::context::RequestContext;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Output format for the process log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Anything other than `json` (case-insensitive) is pretty.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install the global tracing subscriber.
pub fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).init(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerInitError {
    #[error("error logger needs a project id")]
    EmptyProjectId,

    #[error("GCLOUD_CONFIG is not set")]
    MissingConfig,

    #[error("GCLOUD_CONFIG is not a valid service account document")]
    InvalidConfig(#[from] serde_json::Error),
}

/// The parts of a service account document the logger needs.
#[derive(Debug, Deserialize)]
struct ServiceAccount {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: String,
    client_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sink {
    Cloud {
        project_id: String,
        environment: String,
        client_email: String,
    },
    Process,
}

/// One reported failure, as emitted.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Pipeline stage that failed, e.g. `appleDevToken Decoder`.
    pub context: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestContext>,
}

#[derive(Debug, Clone)]
pub struct ErrorLogger {
    service: String,
    sink: Sink,
}

impl ErrorLogger {
    /// Bind a logger to `project_id` using the service account JSON in
    /// `gcloud_config`.
    pub fn init(
        project_id: &str,
        gcloud_config: &str,
        environment: &str,
        service: &str,
    ) -> Result<Self, LoggerInitError> {
        if project_id.is_empty() {
            return Err(LoggerInitError::EmptyProjectId);
        }
        if gcloud_config.trim().is_empty() {
            return Err(LoggerInitError::MissingConfig);
        }

        let account: ServiceAccount = serde_json::from_str(gcloud_config)?;

        Ok(Self {
            service: service.to_string(),
            sink: Sink::Cloud {
                project_id: project_id.to_string(),
                environment: environment.to_string(),
                client_email: account.client_email,
            },
        })
    }

    /// Fallback that only writes to the process log.
    pub fn process(service: &str) -> Self {
        Self {
            service: service.to_string(),
            sink: Sink::Process,
        }
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self.sink, Sink::Cloud { .. })
    }

    pub fn log_name(&self) -> Option<String> {
        match &self.sink {
            Sink::Cloud { project_id, .. } => {
                Some(format!("projects/{project_id}/logs/{}", self.service))
            }
            Sink::Process => None,
        }
    }

    /// Report `err` under the stage label `context`.
    ///
    /// The message includes the whole source chain.
    pub fn log_err(
        &self,
        err: &(dyn std::error::Error + 'static),
        context: &str,
        request: Option<&RequestContext>,
    ) -> ErrorEntry {
        let entry = ErrorEntry {
            timestamp: Utc::now(),
            service: self.service.clone(),
            log_name: self.log_name(),
            environment: match &self.sink {
                Sink::Cloud { environment, .. } => Some(environment.clone()),
                Sink::Process => None,
            },
            context: context.to_string(),
            error: error_chain(err),
            request: request.cloned(),
        };

        let method = request.map(|r| r.method.as_str()).unwrap_or_default();
        let uri = request.map(|r| r.uri.as_str()).unwrap_or_default();
        let request_id = request
            .and_then(|r| r.request_id.as_deref())
            .unwrap_or_default();

        match &self.sink {
            Sink::Cloud { client_email, .. } => error!(
                service = %entry.service,
                log_name = entry.log_name.as_deref().unwrap_or_default(),
                environment = entry.environment.as_deref().unwrap_or_default(),
                reporter = %client_email,
                context = %entry.context,
                method,
                uri,
                request_id,
                "{}",
                entry.error
            ),
            Sink::Process => error!(
                service = %entry.service,
                context = %entry.context,
                method,
                uri,
                request_id,
                "{}",
                entry.error
            ),
        }

        entry
    }
}

/// `err` followed by each of its sources, joined with `": "`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
