// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Apple Music authorization page.
//!
//! ## Flow
//!
//! 1. Resolve configuration for this request from the environment
//! 2. `GET {hostname}/createAppleDevToken` on the token service
//! 3. Decode `{"Token": "..."}` from the response body
//! 4. Render the `auth` template with the token
//!
//! Any failure ends the request with a plain-text 500 and an error log entry
//! tagged with the failing stage. There are no retries.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};

use crate::{
    api::context::RequestContext,
    config::{RequestConfig, SERVICE_NAME},
    error::AuthorizeError,
    logging::ErrorLogger,
    providers::DevTokenClient,
    render::TemplateRenderer,
    state::AppState,
};

/// Template rendered on success.
pub const AUTH_TEMPLATE: &str = "auth";

/// Render the page that lets the browser authorize with Apple Music.
pub async fn authorize_with_apple(
    State(state): State<AppState>,
    context: RequestContext,
) -> Response {
    match authorize(&state, &context).await {
        Ok(page) => page.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn authorize(
    state: &AppState,
    context: &RequestContext,
) -> Result<Html<String>, AuthorizeError> {
    let config = match RequestConfig::resolve(&state.env) {
        Ok(config) => config,
        Err(e) => {
            let err = AuthorizeError::from(e);
            ErrorLogger::process(SERVICE_NAME).log_err(&err, err.stage(), Some(context));
            return Err(err);
        }
    };

    render_page(state, &config).await.inspect_err(|err| {
        config.logger.log_err(err, err.stage(), Some(context));
    })
}

async fn render_page(
    state: &AppState,
    config: &RequestConfig,
) -> Result<Html<String>, AuthorizeError> {
    let payload = DevTokenClient::new(state.http.clone(), &config.settings.hostname)
        .fetch()
        .await?;

    let renderer = TemplateRenderer::new(&config.settings.template_path);
    let page = renderer.html(AUTH_TEMPLATE, &payload)?;

    Ok(Html(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{tests::dev_vars, EnvSource, APPLE_TEAM_ID_ENV, ENVIRONMENT_ENV, GCLOUD_CONFIG_ENV},
        providers::dev_token::build_http_client,
        test_support::{refused_base_url, spawn_token_service},
    };
    use axum::{
        body::to_bytes,
        http::{header::CONTENT_TYPE, StatusCode},
    };
    use std::fs;
    use tempfile::TempDir;

    const AUTH_TMPL: &str =
        r#"<meta name="apple-music-developer-token" content="{{ Token }}">"#;

    fn template_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("auth.tmpl"), AUTH_TMPL).unwrap();
        dir
    }

    fn state_with(vars: Vec<(String, String)>) -> AppState {
        AppState::new(build_http_client().unwrap(), EnvSource::fixed(vars))
    }

    fn context() -> RequestContext {
        RequestContext {
            method: "GET".into(),
            uri: "/authorizeWithApple".into(),
            request_id: None,
        }
    }

    fn set(vars: &mut Vec<(String, String)>, key: &str, value: &str) {
        vars.retain(|(k, _)| k != key);
        vars.push((key.into(), value.into()));
    }

    async fn call(state: AppState) -> (StatusCode, String, String) {
        let response = authorize_with_apple(State(state), context()).await;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (
            status,
            content_type,
            String::from_utf8(body_bytes.to_vec()).unwrap(),
        )
    }

    #[tokio::test]
    async fn renders_page_with_token() {
        let service = spawn_token_service(r#"{"Token":"abc123"}"#).await;
        let templates = template_dir();
        let mut vars = dev_vars(&service.base_url, templates.path().to_str().unwrap());
        set(&mut vars, "HOSTNAME_PROD", "http://prod.invalid");

        let (status, content_type, body) = call(state_with(vars)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert!(body.contains(r#"content="abc123""#));
        assert_eq!(service.hits(), 1);
    }

    #[tokio::test]
    async fn missing_team_id_never_calls_token_service() {
        let service = spawn_token_service(r#"{"Token":"abc123"}"#).await;
        let templates = template_dir();
        let mut vars = dev_vars(&service.base_url, templates.path().to_str().unwrap());
        vars.retain(|(k, _)| k != APPLE_TEAM_ID_ENV);

        let (status, content_type, body) = call(state_with(vars)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(content_type.starts_with("text/plain"));
        assert!(body.contains("APPLE_TEAM_ID"));
        assert_eq!(service.hits(), 0);
    }

    #[tokio::test]
    async fn non_json_response_is_not_rendered() {
        let service = spawn_token_service("internal error").await;
        let templates = TempDir::new().unwrap();
        // Marker only present if rendering ran.
        fs::write(templates.path().join("auth.tmpl"), "RENDERED {{ Token }}").unwrap();
        let vars = dev_vars(&service.base_url, templates.path().to_str().unwrap());

        let (status, _, body) = call(state_with(vars)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("RENDERED"));
        assert_eq!(service.hits(), 1);
    }

    #[tokio::test]
    async fn transport_failure_returns_error_message() {
        let base_url = refused_base_url().await;
        let templates = template_dir();
        let vars = dev_vars(&base_url, templates.path().to_str().unwrap());

        let expected = build_http_client()
            .unwrap()
            .get(format!("{base_url}/createAppleDevToken"))
            .send()
            .await
            .unwrap_err()
            .to_string();

        let (status, _, body) = call(state_with(vars)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.starts_with(&expected), "{body:?} vs {expected:?}");
    }

    #[tokio::test]
    async fn unrecognized_environment_fails_visibly() {
        let service = spawn_token_service(r#"{"Token":"abc123"}"#).await;
        let templates = template_dir();
        let mut vars = dev_vars(&service.base_url, templates.path().to_str().unwrap());
        set(&mut vars, ENVIRONMENT_ENV, "STAGING");

        let (status, _, _) = call(state_with(vars)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(service.hits(), 0);
    }

    #[tokio::test]
    async fn empty_hostname_fails_at_request_construction() {
        let templates = template_dir();
        let vars = dev_vars("", templates.path().to_str().unwrap());

        let err = authorize(&state_with(vars), &context()).await.unwrap_err();

        assert_eq!(err.stage(), "appleDevToken Request");
    }

    #[tokio::test]
    async fn missing_template_is_a_render_error() {
        let service = spawn_token_service(r#"{"Token":"abc123"}"#).await;
        let templates = TempDir::new().unwrap();
        let vars = dev_vars(&service.base_url, templates.path().to_str().unwrap());

        let err = authorize(&state_with(vars), &context()).await.unwrap_err();

        assert_eq!(err.stage(), "render");
        assert_eq!(service.hits(), 1);
    }

    #[tokio::test]
    async fn logger_init_failure_does_not_block_success() {
        let service = spawn_token_service(r#"{"Token":"abc123"}"#).await;
        let templates = template_dir();
        let mut vars = dev_vars(&service.base_url, templates.path().to_str().unwrap());
        set(&mut vars, GCLOUD_CONFIG_ENV, "");

        let (status, _, body) = call(state_with(vars)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("abc123"));
    }

    #[tokio::test]
    async fn token_is_html_escaped() {
        let service = spawn_token_service(r#"{"Token":"\"><script>x</script>"}"#).await;
        let templates = template_dir();
        let vars = dev_vars(&service.base_url, templates.path().to_str().unwrap());

        let (status, _, body) = call(state_with(vars)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }
}
