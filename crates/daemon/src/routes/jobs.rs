// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /api/jobs*` and `POST /api/jobs/{id}/cancel` (§6), including the
//! tree-view construction described in §4.G.

use axum::extract::{Path, Query, State};
use axum::{Json, Router};
use quaero_core::{metadata_keys, Clock, JobId, JobStatus};
use quaero_engine::StateMonitor;
use quaero_store::{JobFilter, LogQuery};
use quaero_wire::{CancelResponse, JobListQuery, JobListResponse, JobTreeView, JobView, LogPageView, StepView};

use crate::error::ApiError;
use crate::state::AppState;

const TREE_LOG_LIMIT: usize = 100;

pub fn router<C: Clock + Send + Sync + 'static>() -> Router<AppState<C>> {
    Router::new()
        .route("/api/jobs", axum::routing::get(list::<C>))
        .route("/api/jobs/:id", axum::routing::get(get_one::<C>))
        .route("/api/jobs/:id/tree", axum::routing::get(tree::<C>))
        .route("/api/jobs/:id/tree/logs", axum::routing::get(tree_logs::<C>))
        .route("/api/jobs/:id/cancel", axum::routing::post(cancel::<C>))
}

async fn get_one<C: Clock + Send + Sync + 'static>(
    State(state): State<AppState<C>>,
    Path(id): Path<JobId>,
) -> Result<Json<JobView>, ApiError> {
    let job = state.app.manager.get_job(id)?;
    Ok(Json(JobView::from(&job)))
}

async fn list<C: Clock + Send + Sync + 'static>(
    State(state): State<AppState<C>>,
    Query(query): Query<JobListQuery>,
) -> Json<JobListResponse> {
    let filter = JobFilter { parent_id: query.parent_id, status: query.status, job_type: None };
    let jobs = state.app.manager.store().list_jobs(filter).iter().map(JobView::from).collect();
    Json(JobListResponse { jobs })
}

async fn cancel<C: Clock + Send + Sync + 'static>(
    State(state): State<AppState<C>>,
    Path(id): Path<JobId>,
) -> Result<Json<CancelResponse>, ApiError> {
    let monitor = StateMonitor::new(state.app.manager.clone());
    monitor.cancel_cascade(id)?;
    let job = state.app.manager.get_job(id)?;
    Ok(Json(CancelResponse { job_id: id, status: job.status }))
}

async fn tree<C: Clock + Send + Sync + 'static>(
    State(state): State<AppState<C>>,
    Path(id): Path<JobId>,
) -> Result<Json<JobTreeView>, ApiError> {
    let manager_job = state.app.manager.get_job(id)?;
    let step_names = step_definitions_order(&manager_job);
    let current_step = manager_job.metadata.get(metadata_keys::CURRENT_STEP_NAME).and_then(|v| v.as_str());

    let child_ids = state.app.manager.store().children_of(id);
    let step_jobs: Vec<_> = child_ids.into_iter().filter_map(|cid| state.app.manager.get_job(cid).ok()).collect();

    let steps = step_names
        .into_iter()
        .map(|step_name| {
            let step_job = step_jobs.iter().find(|j| j.step_name() == Some(step_name.as_str()));
            build_step_view(&state, &step_name, step_job, current_step)
        })
        .collect();

    Ok(Json(JobTreeView { manager: JobView::from(&manager_job), steps }))
}

fn step_definitions_order(manager_job: &quaero_core::Job) -> Vec<String> {
    manager_job
        .metadata
        .get(metadata_keys::STEP_DEFINITIONS)
        .and_then(|v| v.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("step_name").and_then(|v| v.as_str()).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn build_step_view<C: Clock + Send + Sync + 'static>(
    state: &AppState<C>,
    step_name: &str,
    step_job: Option<&quaero_core::Job>,
    current_step: Option<&str>,
) -> StepView {
    let Some(step_job) = step_job else {
        return StepView::new(step_name, None, None, Default::default(), LogPageView::new(vec![], 0), false);
    };
    let stats = state.app.manager.store().recompute_child_stats(step_job.id).unwrap_or_default();
    let page = state.app.manager.store().get_logs(step_job.id, LogQuery { limit: Some(TREE_LOG_LIMIT), ..Default::default() });
    let has_logs = !page.entries.is_empty();
    let expanded = step_job.status == JobStatus::Failed
        || step_job.status == JobStatus::Running
        || has_logs
        || current_step == Some(step_name);
    StepView::new(
        step_name,
        Some(step_job.id),
        Some(step_job.status),
        stats,
        LogPageView::new(page.entries, page.total_count),
        expanded,
    )
}

/// `step` selects which child step job's log tail to return, by the step
/// name recorded in `metadata.step_name`; with no `step`, `id` is read as
/// the target job id directly (used for leaf job log tails).
async fn tree_logs<C: Clock + Send + Sync + 'static>(
    State(state): State<AppState<C>>,
    Path(id): Path<JobId>,
    Query(params): Query<TreeLogsParams>,
) -> Result<Json<LogPageView>, ApiError> {
    let target = match &params.step {
        Some(step_name) => state
            .app
            .manager
            .store()
            .children_of(id)
            .into_iter()
            .filter_map(|cid| state.app.manager.get_job(cid).ok())
            .find(|j| j.step_name() == Some(step_name.as_str()))
            .map(|j| j.id)
            .ok_or_else(|| ApiError::StepNotFound(step_name.clone()))?,
        None => id,
    };
    let levels = params.level.as_deref().map(parse_levels);
    let query = LogQuery { levels, limit: None, after_line: params.after };
    let page = state.app.manager.store().get_logs(target, query);
    Ok(Json(LogPageView::new(page.entries, page.total_count)))
}

#[derive(Debug, serde::Deserialize)]
struct TreeLogsParams {
    #[serde(default)]
    step: Option<String>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    after: Option<u64>,
}

fn parse_levels(raw: &str) -> Vec<quaero_core::LogLevel> {
    raw.split(',').filter(|s| !s.is_empty()).map(quaero_core::LogLevel::normalize).collect()
}
