// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/WebSocket surface (§6 External Interfaces).

mod auth;
mod job_definitions;
mod jobs;
mod ws;

use axum::Router;
use quaero_core::Clock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router<C: Clock + Send + Sync + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .merge(job_definitions::router())
        .merge(jobs::router())
        .merge(auth::router())
        .route("/ws", axum::routing::get(ws::handler::<C>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
