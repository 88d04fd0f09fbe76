// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Apple Auth - Apple Music authorization page service
//!
//! Serves one page: it fetches an Apple Music developer token from the
//! token service and renders it into the `auth` template so the browser can
//! run the MusicKit authorization flow.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum)
//! - `config` - Environment-driven, per-request configuration
//! - `providers` - Developer token service client
//! - `render` - HTML templates
//! - `logging` - Tracing setup and stage-tagged error reporting

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod providers;
pub mod render;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;
