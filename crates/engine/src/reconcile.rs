// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup reconciliation sweep (SPEC_FULL §C.1, §7 "Storage failure during
//! status update"): running jobs whose `started_at` predates the threshold
//! are re-queued to `pending` exactly once, before any worker pool begins
//! pulling.

use quaero_core::{Clock, JobId};
use tracing::info;

use crate::manager::JobManager;

/// Default staleness threshold (SPEC_FULL §C.1): five minutes.
pub const DEFAULT_STALE_THRESHOLD_MS: u64 = 5 * 60 * 1000;

#[derive(Debug, Clone, Copy)]
pub struct ReconcileConfig {
    pub threshold_ms: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { threshold_ms: DEFAULT_STALE_THRESHOLD_MS }
    }
}

/// Runs the sweep once and logs what it requeued.
pub fn run_once<C: Clock + 'static>(manager: &JobManager<C>, config: ReconcileConfig) -> Vec<JobId> {
    let requeued = manager.store().reconcile_stale_running(config.threshold_ms);
    if !requeued.is_empty() {
        info!(count = requeued.len(), threshold_ms = config.threshold_ms, "reconciled stale running jobs");
    }
    requeued
}
