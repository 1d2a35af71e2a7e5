// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Placeholder Workers for the ten canonical action tags (§4.E, §1 "concrete
//! workers' I/O... out of scope, treated as external collaborators").
//!
//! A real deployment registers its own crawler/agent/search/etc. Workers in
//! `main` instead of these; they exist so `quaerod` runs standalone and
//! worker pools have something to claim and complete.

use async_trait::async_trait;
use quaero_core::Job;
use quaero_engine::{Worker, WorkerError, WorkerRegistry};
use tokio_util::sync::CancellationToken;
use tracing::info;

struct PlaceholderWorker {
    worker_type: &'static str,
}

#[async_trait]
impl Worker for PlaceholderWorker {
    fn worker_type(&self) -> &str {
        self.worker_type
    }

    fn validate(&self, _job: &Job) -> Result<(), WorkerError> {
        Ok(())
    }

    async fn execute(&self, job: &Job, _cancel: CancellationToken) -> Result<(), WorkerError> {
        info!(job_id = %job.id, worker_type = self.worker_type, "placeholder worker completing job immediately");
        Ok(())
    }
}

/// The ten action kinds named in §4.F, matching `quaero_engine::step_manager::standard_registry`.
pub const CANONICAL_WORKER_TYPES: &[&str] = &[
    "crawler",
    "agent",
    "search",
    "database_maintenance",
    "reindex",
    "transform",
    "places_search",
    "github_repo",
    "github_log",
    "web_search",
];

pub fn register_placeholder_workers(registry: &mut WorkerRegistry) {
    for worker_type in CANONICAL_WORKER_TYPES {
        registry.register(std::sync::Arc::new(PlaceholderWorker { worker_type }));
    }
}
