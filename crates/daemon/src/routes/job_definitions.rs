// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /api/job-definitions/{id}/execute` and `.../quick-crawl` (§6).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router};
use quaero_config::{any_pattern_matches, JobDefinition, OnError, StepSpec};
use quaero_core::Clock;
use quaero_engine::JobDefinitionOrchestrator;
use quaero_wire::{ExecuteResponse, QuickCrawlRequest};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router<C: Clock + Send + Sync + 'static>() -> Router<AppState<C>> {
    Router::new()
        .route("/api/job-definitions/:id/execute", axum::routing::post(execute::<C>))
        .route("/api/job-definitions/quick-crawl", axum::routing::post(quick_crawl::<C>))
}

async fn execute<C: Clock + Send + Sync + 'static>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ExecuteResponse>), ApiError> {
    let definition = state.definitions.get(&id).cloned().ok_or_else(|| ApiError::DefinitionNotFound(id))?;
    let job_id = launch(&state, definition).await?;
    Ok((StatusCode::ACCEPTED, Json(ExecuteResponse { job_id })))
}

async fn quick_crawl<C: Clock + Send + Sync + 'static>(
    State(state): State<AppState<C>>,
    Json(request): Json<QuickCrawlRequest>,
) -> Result<(StatusCode, Json<ExecuteResponse>), ApiError> {
    let definition = match state.definitions.find_crawler_by_url(&request.url) {
        Some(found) => clone_with_start_url(found, &request.url),
        None => ad_hoc_crawler_definition(&request.url),
    };
    let job_id = launch(&state, definition).await?;
    Ok((StatusCode::ACCEPTED, Json(ExecuteResponse { job_id })))
}

async fn launch<C: Clock + Send + Sync + 'static>(
    state: &AppState<C>,
    definition: JobDefinition,
) -> Result<quaero_core::JobId, ApiError> {
    let orchestrator =
        JobDefinitionOrchestrator::new(state.app.manager.clone(), state.app.step_managers.clone(), state.app.bus.clone());
    Ok(orchestrator.execute(definition).await?)
}

/// Scenario S4: clone the matched crawler definition, override `start_urls`
/// on every `crawler` step to `[url]`, keep everything else (include/exclude
/// patterns live alongside `start_urls` in the same flat option map).
fn clone_with_start_url(definition: &JobDefinition, url: &str) -> JobDefinition {
    let mut cloned = definition.clone();
    for spec in cloned.step.values_mut() {
        if spec.action == "crawler" {
            spec.options.insert("start_urls".to_string(), Value::Array(vec![Value::String(url.to_string())]));
        }
    }
    cloned
}

/// Fallback when no configured crawler's `url_patterns` matches (§6): a
/// single-step, ad-hoc definition crawling exactly `url`.
fn ad_hoc_crawler_definition(url: &str) -> JobDefinition {
    let mut step = indexmap::IndexMap::new();
    step.insert(
        "crawl".to_string(),
        StepSpec {
            action: "crawler".to_string(),
            description: Some("ad-hoc quick crawl".to_string()),
            depends: Vec::new(),
            on_error: OnError::Fail,
            options: std::collections::HashMap::from([(
                "start_urls".to_string(),
                Value::Array(vec![Value::String(url.to_string())]),
            )]),
        },
    );
    JobDefinition { id: "ad-hoc-quick-crawl".to_string(), name: "Quick crawl".to_string(), enabled: true, tags: Vec::new(), url_patterns: Vec::new(), schedule: None, step }
}
