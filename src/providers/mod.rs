// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Clients for services this server calls out to.

pub mod dev_token;

pub use dev_token::{DevTokenClient, DevTokenError};
