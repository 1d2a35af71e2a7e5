// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/auth` and `/auth/` (§6, Invariant 7). Auth CRUD itself
//! (`/api/auth`) is an external collaborator, out of scope here (§1).

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use quaero_core::Clock;
use quaero_wire::auth_redirect_location;

use crate::state::AppState;

pub fn router<C: Clock + Send + Sync + 'static>() -> Router<AppState<C>> {
    Router::new()
        .route("/auth", axum::routing::get(redirect))
        .route("/auth/", axum::routing::get(redirect))
}

async fn redirect(uri: axum::http::Uri) -> Response {
    let location = auth_redirect_location(uri.query());
    let mut response = StatusCode::PERMANENT_REDIRECT.into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(axum::http::header::LOCATION, value);
    }
    response
}
