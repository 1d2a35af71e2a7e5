// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The State Monitor (spec §4.H): the authoritative aggregator of child
//! outcomes into parent progress and terminal state.
//!
//! Deferred step launch (§4.H "subscribe once per manager job... invoke the
//! Orchestrator to launch it") is handled directly by
//! [`crate::orchestrator::JobDefinitionOrchestrator::drive`] rather than
//! here, since both need the same per-manager `job_status_change` stream
//! and state machine — see `DESIGN.md`.

use quaero_bus::EventBus;
use quaero_core::{metadata_keys, Clock, Event, Job, JobId, JobStatus};
use serde_json::Value;

use crate::error::EngineResult;
use crate::manager::JobManager;

#[derive(Clone)]
pub struct StateMonitor<C: Clock> {
    manager: JobManager<C>,
}

/// Owns the Monitor's background task; dropping aborts it.
pub struct MonitorHandle {
    task: tokio::task::JoinHandle<()>,
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// An `on_error` fallen back to when a child carries no explicit policy
/// (i.e. it is a leaf job, not a step job): any single failure fails the
/// parent (§4.H step 4's default case).
fn child_fails_parent(child: &Job) -> bool {
    match child.status {
        JobStatus::Failed => {
            child.metadata.get("on_error").and_then(|v| v.as_str()).unwrap_or("fail") != "continue"
        }
        _ => false,
    }
}

/// §4.H step 4's "spawn completed" guard: a manager's `child_count` grows
/// incrementally as the Orchestrator launches steps one at a time, so
/// `ChildStats::is_quiescent()` alone can be true between two sequential
/// launches. Non-manager jobs (step and leaf jobs) spawn all their children
/// synchronously before their own status can change, so they need no such
/// guard and are always spawn-complete.
fn spawn_complete(job: &Job) -> bool {
    if !job.is_manager() {
        return true;
    }
    job.metadata.get(metadata_keys::ALL_STEPS_LAUNCHED).and_then(Value::as_bool).unwrap_or(false)
}

/// §4.H step 4 terminal-status computation, resolved per SPEC_FULL §C.4:
/// "cancelled wins" takes precedence over a concurrent failure observed in
/// the same `recomputeChildStats` snapshot (§7 "Cancellation vs failure").
fn compute_terminal_status(children: &[Job]) -> JobStatus {
    if children.iter().any(|c| c.status == JobStatus::Cancelled) {
        return JobStatus::Cancelled;
    }
    if children.iter().any(child_fails_parent) {
        return JobStatus::Failed;
    }
    JobStatus::Completed
}

impl<C: Clock + Send + Sync + 'static> StateMonitor<C> {
    pub fn new(manager: JobManager<C>) -> Self {
        Self { manager }
    }

    /// Spawns the subscriber loop (§4.H: "A long-lived consumer of
    /// `job_status_change`").
    pub fn spawn(&self, bus: &EventBus) -> Option<MonitorHandle> {
        let mut sub = bus.subscribe("job_status_change")?;
        let monitor = self.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = sub.recv().await {
                if let Event::JobStatusChange { job_id, .. } = event {
                    monitor.on_status_change(job_id);
                }
            }
        });
        Some(MonitorHandle { task })
    }

    /// Handles one `job_status_change` for job `J` (§4.H steps 1-4).
    fn on_status_change(&self, job_id: JobId) {
        let Ok(job) = self.manager.get_job(job_id) else { return };
        let Some(parent_id) = job.parent_id else { return };
        self.advance(parent_id);
    }

    /// Recomputes `parent`'s stats, publishes `parent_job_progress`, and —
    /// once the spawn is complete and no child is in flight — resolves and
    /// applies the parent's own terminal status. Publishing that status
    /// change re-enters this same logic for the parent's own parent
    /// (§4.H step 4 "recurse") because `update_status` itself publishes
    /// `job_status_change`, which this Monitor is also subscribed to.
    pub(crate) fn advance(&self, parent_id: JobId) {
        let Ok(parent) = self.manager.get_job(parent_id) else { return };
        let Ok(stats) = self.manager.store().recompute_child_stats(parent_id) else { return };
        let document_count = self.manager.store().sum_document_count(parent_id).unwrap_or(0);
        let progress_text = format!(
            "{} pending, {} running, {} completed, {} failed",
            stats.pending_children, stats.running_children, stats.completed_children, stats.failed_children
        );
        self.manager.bus().publish(Event::ParentJobProgress {
            job_id: parent_id,
            status: parent.status,
            total_children: stats.child_count,
            pending: stats.pending_children,
            running: stats.running_children,
            completed: stats.completed_children,
            failed: stats.failed_children,
            cancelled: stats.cancelled_children,
            document_count,
            progress_text,
            timestamp_ms: self.manager.store().epoch_ms(),
        });

        if parent.status.is_terminal() || !stats.is_quiescent() || !spawn_complete(&parent) {
            return;
        }

        let children: Vec<Job> =
            self.manager.store().children_of(parent_id).into_iter().filter_map(|id| self.manager.get_job(id).ok()).collect();
        let terminal_status = compute_terminal_status(&children);
        if self.manager.update_status(parent_id, terminal_status).is_ok() {
            let _ = self.manager.finish(parent_id);
        }
    }

    /// Cancellation cascade (§4.H, §5 "atomic per parent: all descendants
    /// are marked before the parent's own status flips"). DFS over the
    /// parent index via `descendants_of`, descendants first.
    pub fn cancel_cascade(&self, root: JobId) -> EngineResult<()> {
        for id in self.manager.store().descendants_of(root) {
            self.cancel_if_non_terminal(id)?;
        }
        self.cancel_if_non_terminal(root)?;
        Ok(())
    }

    fn cancel_if_non_terminal(&self, id: JobId) -> EngineResult<()> {
        let job = self.manager.get_job(id)?;
        if !job.status.is_terminal() {
            self.manager.update_status(id, JobStatus::Cancelled)?;
            self.manager.finish(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
