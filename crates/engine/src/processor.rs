// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job Processor / Worker pool (spec §4.E).
//!
//! One pool per `job_type`; each pool is a fixed number of tokio tasks that
//! block-with-timeout on [`quaero_store::JobStore::claim`], dispatch the
//! claimed job to the matching [`crate::worker::Worker`], and translate its
//! outcome back into a status transition. Sizing follows SPEC_FULL §C.2: a
//! CPU-shaped worker type defaults its pool to the host's core count,
//! everything else defaults to a fixed small pool tuned for I/O concurrency.

use std::sync::Arc;
use std::time::Duration;

use quaero_core::{Clock, Job, JobStatus};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::manager::JobManager;
use crate::worker::WorkerRegistry;

/// How often an idle pool worker retries `claim()` when the queue is empty
/// (§4.E "blocks-with-timeout").
const CLAIM_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Job types whose work is CPU-bound; everything else is treated as
/// I/O-shaped (SPEC_FULL §C.2).
const CPU_SHAPED_TYPES: &[&str] = &["transform", "reindex"];

/// Fixed pool size for I/O-shaped worker types (SPEC_FULL §C.2).
const IO_POOL_SIZE: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub size: usize,
}

impl PoolConfig {
    /// Resolves the default pool size for `job_type` per SPEC_FULL §C.2.
    pub fn default_for(job_type: &str) -> Self {
        let size = if CPU_SHAPED_TYPES.contains(&job_type) { num_cpus::get() } else { IO_POOL_SIZE };
        Self { size: size.max(1) }
    }
}

/// Runs one pool of cooperative executors for a single `job_type`
/// (§4.E "Pool size is per-worker-type").
pub struct JobProcessor<C: Clock> {
    manager: JobManager<C>,
    workers: WorkerRegistry,
}

impl<C: Clock + Send + Sync + 'static> JobProcessor<C> {
    pub fn new(manager: JobManager<C>, workers: WorkerRegistry) -> Self {
        Self { manager, workers }
    }

    /// Spawns `config.size` pull-loop tasks for `job_type`, each cancellable
    /// via `shutdown`. Returns their join handles so callers can await a
    /// clean drain.
    pub fn spawn_pool(
        &self,
        job_type: &str,
        config: PoolConfig,
        shutdown: CancellationToken,
    ) -> Vec<tokio::task::JoinHandle<()>> {
        let Some(worker) = self.workers.get(job_type) else {
            warn!(job_type, "no worker registered; pool not started");
            return Vec::new();
        };
        (0..config.size)
            .map(|lane| {
                let manager = self.manager.clone();
                let worker = worker.clone();
                let job_type = job_type.to_string();
                let shutdown = shutdown.clone();
                tokio::spawn(async move { pull_loop(manager, worker, job_type, lane, shutdown).await })
            })
            .collect()
    }
}

async fn pull_loop<C: Clock + Send + Sync + 'static>(
    manager: JobManager<C>,
    worker: Arc<dyn crate::worker::Worker>,
    job_type: String,
    lane: usize,
    shutdown: CancellationToken,
) {
    info!(job_type, lane, "worker pool lane started");
    loop {
        if shutdown.is_cancelled() {
            break;
        }
        let Some(job) = manager.store().claim(&job_type) else {
            tokio::select! {
                _ = sleep(CLAIM_POLL_INTERVAL) => continue,
                _ = shutdown.cancelled() => break,
            }
        };
        run_one(&manager, worker.as_ref(), job, shutdown.clone()).await;
    }
    info!(job_type, lane, "worker pool lane stopped");
}

/// Validates, executes, and translates one claimed job's outcome into a
/// status transition (§4.E "Execute").
async fn run_one<C: Clock + Send + Sync + 'static>(
    manager: &JobManager<C>,
    worker: &dyn crate::worker::Worker,
    job: Job,
    cancel: CancellationToken,
) {
    if let Err(err) = worker.validate(&job) {
        finish_failed(manager, job.id, err.to_string());
        return;
    }

    tokio::select! {
        result = worker.execute(&job, cancel.clone()) => {
            match result {
                Ok(()) => {
                    if let Err(err) = manager.update_status(job.id, JobStatus::Completed) {
                        error!(job_id = %job.id, error = %err, "failed to mark job completed");
                    }
                    let _ = manager.finish(job.id);
                }
                Err(err) => finish_failed(manager, job.id, err.to_string()),
            }
        }
        _ = cancel.cancelled() => {
            if let Err(err) = manager.update_status(job.id, JobStatus::Cancelled) {
                error!(job_id = %job.id, error = %err, "failed to mark job cancelled");
            }
            let _ = manager.finish(job.id);
        }
    }
}

fn finish_failed<C: Clock + Send + Sync + 'static>(manager: &JobManager<C>, job_id: quaero_core::JobId, error: String) {
    let _ = manager.add_job_log(job_id, "error", error.clone());
    if let Err(err) = manager.fail(job_id, error) {
        error!(job_id = %job_id, error = %err, "failed to mark job failed");
    }
    let _ = manager.finish(job_id);
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
