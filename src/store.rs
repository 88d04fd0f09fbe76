// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Document store (Firestore) handle.
//!
//! Only the connection-level concerns live here: validating the project and
//! deriving the REST endpoints. Document reads and writes belong to the
//! services that own the data.

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_DATABASE: &str = "(default)";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("project id is empty")]
    EmptyProjectId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStore {
    project_id: String,
    base_url: String,
}

impl DocumentStore {
    /// Create a handle for `project_id`.
    ///
    /// When `emulator_host` is set (as `FIRESTORE_EMULATOR_HOST` does for the
    /// official clients) the handle talks plain HTTP to the emulator.
    pub fn connect(project_id: &str, emulator_host: Option<&str>) -> Result<Self, StoreError> {
        if project_id.is_empty() {
            return Err(StoreError::EmptyProjectId);
        }

        let base_url = match emulator_host.filter(|host| !host.is_empty()) {
            Some(host) => format!("http://{host}/v1"),
            None => FIRESTORE_BASE_URL.to_string(),
        };

        Ok(Self {
            project_id: project_id.to_string(),
            base_url,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Root of the document tree for this project.
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.base_url, self.project_id, DEFAULT_DATABASE
        )
    }
}
