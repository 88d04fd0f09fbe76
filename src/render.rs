// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTML template rendering.
//!
//! Templates are loaded lazily from a single directory. A template named
//! `auth` resolves to the first existing `auth{ext}` for the configured
//! extensions. Output is always HTML-escaped.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use minijinja::{AutoEscape, Environment, Error, ErrorKind};
use serde::Serialize;

pub const DEFAULT_EXTENSIONS: &[&str] = &[".tmpl", ".html"];

pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_extensions(directory, DEFAULT_EXTENSIONS)
    }

    pub fn with_extensions(directory: impl Into<PathBuf>, extensions: &[&str]) -> Self {
        let directory = directory.into();
        let extensions: Vec<String> = extensions.iter().map(|ext| ext.to_string()).collect();

        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_loader(move |name| load_template(&directory, &extensions, name));

        Self { env }
    }

    /// Render template `name` with `context`.
    pub fn html<S: Serialize>(&self, name: &str, context: S) -> Result<String, Error> {
        self.env.get_template(name)?.render(context)
    }
}

fn load_template(
    directory: &Path,
    extensions: &[String],
    name: &str,
) -> Result<Option<String>, Error> {
    for ext in extensions {
        let path = directory.join(format!("{name}{ext}"));
        match fs::read_to_string(&path) {
            Ok(source) => return Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template {}", path.display()),
                )
                .with_source(e))
            }
        }
    }
    Ok(None)
}
