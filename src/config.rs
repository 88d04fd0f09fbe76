// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names and per-request configuration resolution.
//! Nothing here is cached: every authorization request resolves a fresh,
//! immutable [`RequestConfig`] and passes it down explicitly.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APPLE_TEAM_ID` | Apple developer team ID (presence check only) | Required |
//! | `ENVIRONMENT` | Deployment mode, `DEV` or `PROD` | Required |
//! | `FIREBASE_PROJECTID_DEV` / `_PROD` | Document store project | Required for the mode |
//! | `HOSTNAME_DEV` / `_PROD` | Base URL of the developer token service | Required for the mode |
//! | `APPLE_AUTH_TEMPLATE_PATH_DEV` / `_PROD` | Directory holding the `auth` template | Required for the mode |
//! | `GCLOUD_CONFIG` | Service account JSON for the error logger | Optional |
//! | `FIRESTORE_EMULATOR_HOST` | Point the store handle at an emulator | Optional |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; both set enables HTTPS | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, warn};

use crate::{
    logging::ErrorLogger,
    store::{DocumentStore, StoreError},
};

pub const APPLE_TEAM_ID_ENV: &str = "APPLE_TEAM_ID";
pub const ENVIRONMENT_ENV: &str = "ENVIRONMENT";
pub const FIREBASE_PROJECT_ID_ENV: &str = "FIREBASE_PROJECTID";
pub const HOSTNAME_ENV: &str = "HOSTNAME";
pub const TEMPLATE_PATH_ENV: &str = "APPLE_AUTH_TEMPLATE_PATH";
pub const GCLOUD_CONFIG_ENV: &str = "GCLOUD_CONFIG";
pub const FIRESTORE_EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Service name attached to every error log entry.
pub const SERVICE_NAME: &str = "AuthorizeWithApple";

/// Where configuration values are read from.
///
/// Production reads the process environment. Tests use a fixed map so they
/// never touch (or race on) the real environment.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    #[default]
    Process,
    Fixed(Arc<HashMap<String, String>>),
}

impl EnvSource {
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Fixed(Arc::new(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn var(&self, key: &str) -> Option<String> {
        match self {
            EnvSource::Process => std::env::var(key).ok(),
            EnvSource::Fixed(vars) => vars.get(key).cloned(),
        }
    }

    /// Unset and empty are treated the same.
    fn var_or_empty(&self, key: &str) -> String {
        self.var(key).unwrap_or_default()
    }
}

/// Deployment mode selected by `ENVIRONMENT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    Dev,
    Prod,
    Unrecognized(String),
}

impl Deployment {
    pub fn parse(value: &str) -> Self {
        match value {
            "DEV" => Deployment::Dev,
            "PROD" => Deployment::Prod,
            other => Deployment::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Deployment::Dev => "DEV",
            Deployment::Prod => "PROD",
            Deployment::Unrecognized(value) => value,
        }
    }

    /// Name of the mode-specific variant of `base`, e.g. `HOSTNAME_DEV`.
    fn variant_key(&self, base: &str) -> Option<String> {
        match self {
            Deployment::Dev => Some(format!("{base}_DEV")),
            Deployment::Prod => Some(format!("{base}_PROD")),
            Deployment::Unrecognized(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("authorizeWithApple: APPLE_TEAM_ID does not exist")]
    MissingTeamId,

    #[error("authorizeWithApple: document store initialization failed")]
    Store(#[from] StoreError),
}

/// Plain values resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub deployment: Deployment,
    pub project_id: String,
    pub hostname: String,
    pub template_path: String,
    pub gcloud_config: String,
}

impl Settings {
    /// Resolve settings for the current deployment mode.
    ///
    /// An unrecognized mode leaves project id, hostname and template path
    /// empty; the failure surfaces later, when those values are used.
    pub fn from_source(env: &EnvSource) -> Result<Self, ConfigError> {
        if env.var_or_empty(APPLE_TEAM_ID_ENV).is_empty() {
            return Err(ConfigError::MissingTeamId);
        }

        let deployment = Deployment::parse(&env.var_or_empty(ENVIRONMENT_ENV));
        let variant = |base: &str| {
            deployment
                .variant_key(base)
                .map(|key| env.var_or_empty(&key))
                .unwrap_or_default()
        };

        Ok(Self {
            project_id: variant(FIREBASE_PROJECT_ID_ENV),
            hostname: variant(HOSTNAME_ENV),
            template_path: variant(TEMPLATE_PATH_ENV),
            gcloud_config: env.var_or_empty(GCLOUD_CONFIG_ENV),
            deployment,
        })
    }
}

/// Everything one authorization request needs, built once per request.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub settings: Settings,
    /// Initialized for the selected project; the handler itself does not
    /// read or write documents.
    pub store: DocumentStore,
    pub logger: ErrorLogger,
}

impl RequestConfig {
    /// Store initialization failure is fatal. Logger initialization failure
    /// is not: it is reported to the process log and the process-log
    /// fallback is used instead.
    pub fn resolve(env: &EnvSource) -> Result<Self, ConfigError> {
        let settings = Settings::from_source(env)?;

        let emulator_host = env.var(FIRESTORE_EMULATOR_HOST_ENV);
        let store = DocumentStore::connect(&settings.project_id, emulator_host.as_deref())?;
        debug!(documents = %store.documents_url(), "Document store handle ready");

        let logger = match ErrorLogger::init(
            &settings.project_id,
            &settings.gcloud_config,
            settings.deployment.as_str(),
            SERVICE_NAME,
        ) {
            Ok(logger) => logger,
            Err(e) => {
                warn!(error = %e, "Error logger init failed, falling back to process log");
                ErrorLogger::process(SERVICE_NAME)
            }
        };

        Ok(Self {
            settings,
            store,
            logger,
        })
    }
}
