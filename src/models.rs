// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};

/// Developer token as returned by the token service and handed to the
/// `auth` template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeveloperTokenPayload {
    /// Signed Apple Music developer JWT. Opaque to this service.
    #[serde(rename = "Token", alias = "token")]
    pub token: String,
}
