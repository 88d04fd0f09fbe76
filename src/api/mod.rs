// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

pub mod apple_auth;
pub mod context;

pub const AUTHORIZE_PATH: &str = "/authorizeWithApple";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(apple_auth::authorize_with_apple))
        .route(AUTHORIZE_PATH, get(apple_auth::authorize_with_apple))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
