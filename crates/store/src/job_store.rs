// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job Store (spec §4.C): persistent `job_id -> Job` mapping plus
//! secondary indices by `parent_id` and `(status, type)`.
//!
//! Concurrency follows §5: writes on a per-job mutex, counter updates on a
//! per-parent mutex, reads snapshot-consistent. In-process this collapses to
//! a single `parking_lot::RwLock` guarding the row table plus per-job
//! `Mutex<()>` lock tokens used only to serialize the read-modify-write
//! sequences callers must not interleave (status CAS, log line allocation).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use quaero_bus::EventBus;
use quaero_core::{Clock, ChildStats, Event, Job, JobConfig, JobId, JobLogEntry, JobStatus, LogLevel};
use tracing::debug;

use crate::error::StoreError;

/// Optional filter for [`JobStore::list_jobs`].
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub parent_id: Option<JobId>,
    pub status: Option<JobStatus>,
    pub job_type: Option<String>,
}

/// Filter + pagination for [`JobStore::get_logs`] (§4.C `getLogs`).
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub levels: Option<Vec<LogLevel>>,
    pub limit: Option<usize>,
    pub after_line: Option<u64>,
}

/// A page of logs plus the total count so callers can render
/// "showing N of M" (§4.C).
#[derive(Debug, Clone)]
pub struct LogPage {
    pub entries: Vec<JobLogEntry>,
    pub total_count: u64,
}

/// Resolved step/manager context for a job, from walking `parent_id` (§4.C
/// `resolveJobContext`, §4.B stage 1).
#[derive(Debug, Clone, Default)]
pub struct JobContext {
    pub parent_job_id: Option<JobId>,
    pub manager_id: Option<JobId>,
    pub step_name: Option<String>,
}

/// Hierarchy depth bound: manager -> step -> leaf (§3 "Hierarchy is exactly
/// three levels").
const MAX_HIERARCHY_DEPTH: usize = 3;

struct Row {
    job: Job,
    children: Vec<JobId>,
}

struct Inner<C: Clock> {
    rows: RwLock<HashMap<JobId, Row>>,
    logs: RwLock<HashMap<JobId, Vec<JobLogEntry>>>,
    job_locks: Mutex<HashMap<JobId, Arc<Mutex<()>>>>,
    context_cache: RwLock<HashMap<JobId, JobContext>>,
    bus: EventBus,
    clock: C,
}

/// The Job Store. Cheaply cloneable; all clones share the same table.
pub struct JobStore<C: Clock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for JobStore<C> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<C: Clock> JobStore<C> {
    pub fn new(bus: EventBus, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                rows: RwLock::new(HashMap::new()),
                logs: RwLock::new(HashMap::new()),
                job_locks: Mutex::new(HashMap::new()),
                context_cache: RwLock::new(HashMap::new()),
                bus,
                clock,
            }),
        }
    }

    /// Current epoch milliseconds per this store's clock, for callers (the
    /// Log Pipeline's refresh aggregators) that need a timestamp without
    /// touching a job row.
    pub fn epoch_ms(&self) -> u64 {
        self.inner.clock.epoch_ms()
    }

    fn lock_for(&self, id: JobId) -> Arc<Mutex<()>> {
        self.inner.job_locks.lock().entry(id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// `createJob` (§4.C): assigns an id if empty, inserts with counters at
    /// zero. Fails on a duplicate id. Publishes `job_created`.
    pub fn create_job(&self, config: JobConfig) -> Result<Job, StoreError> {
        let id = config.id;
        let mut rows = self.inner.rows.write();
        if rows.contains_key(&id) {
            return Err(StoreError::DuplicateJob(id));
        }
        let job = Job::new(config, self.inner.clock.epoch_ms());
        rows.insert(id, Row { job: job.clone(), children: Vec::new() });
        if let Some(parent_id) = job.parent_id {
            if let Some(parent_row) = rows.get_mut(&parent_id) {
                parent_row.children.push(id);
            }
        }
        drop(rows);
        self.inner.bus.publish(Event::JobCreated {
            job_id: id,
            parent_id: job.parent_id,
            job_type: job.job_type.clone(),
            timestamp_ms: job.created_at_ms,
        });
        Ok(job)
    }

    pub fn get_job(&self, id: JobId) -> Result<Job, StoreError> {
        self.inner.rows.read().get(&id).map(|r| r.job.clone()).ok_or(StoreError::JobNotFound(id))
    }

    /// `updateJobStatus` (§4.C): atomic CAS rejecting transitions out of a
    /// terminal state. On success publishes `job_status_change` and, when
    /// terminal, the specific lifecycle event — in that order (Invariant 5).
    pub fn update_job_status(&self, id: JobId, new_status: JobStatus) -> Result<Job, StoreError> {
        self.update_job_status_with_error(id, new_status, None)
    }

    /// Same as [`Self::update_job_status`], but for `Failed` transitions
    /// allows supplying the error string that becomes the `job_failed`
    /// payload (§4.E "error -> updateJobStatus(failed)").
    pub fn update_job_status_with_error(
        &self,
        id: JobId,
        new_status: JobStatus,
        error: Option<String>,
    ) -> Result<Job, StoreError> {
        let guard = self.lock_for(id);
        let _held = guard.lock();
        let job = {
            let mut rows = self.inner.rows.write();
            let row = rows.get_mut(&id).ok_or(StoreError::JobNotFound(id))?;
            if row.job.status.is_terminal() {
                return Err(StoreError::TerminalTransitionRejected {
                    job_id: id,
                    current: row.job.status.to_string(),
                    attempted: new_status.to_string(),
                });
            }
            if new_status == JobStatus::Running && row.job.started_at_ms.is_none() {
                row.job.started_at_ms = Some(self.inner.clock.epoch_ms());
            }
            row.job.status = new_status;
            row.job.clone()
        };
        let now = self.inner.clock.epoch_ms();
        self.inner.bus.publish(Event::JobStatusChange { job_id: id, status: new_status, timestamp_ms: now });
        match new_status {
            JobStatus::Completed => {
                self.inner.bus.publish(Event::JobCompleted { job_id: id, timestamp_ms: now });
            }
            JobStatus::Failed => {
                self.inner.bus.publish(Event::JobFailed {
                    job_id: id,
                    error: error.unwrap_or_default(),
                    timestamp_ms: now,
                });
            }
            JobStatus::Cancelled => {
                self.inner.bus.publish(Event::JobCancelled { job_id: id, timestamp_ms: now });
            }
            _ => {}
        }
        Ok(job)
    }

    /// `setJobFinished` (§4.C): sets `finished_at`; idempotent.
    pub fn set_job_finished(&self, id: JobId) -> Result<(), StoreError> {
        let now = self.inner.clock.epoch_ms();
        let mut rows = self.inner.rows.write();
        let row = rows.get_mut(&id).ok_or(StoreError::JobNotFound(id))?;
        if row.job.finished_at_ms.is_none() {
            row.job.finished_at_ms = Some(now);
        }
        Ok(())
    }

    /// `incrementChildCount` (§4.C): used when spawning a child.
    pub fn increment_child_count(&self, parent_id: JobId, delta: u32) -> Result<(), StoreError> {
        let mut rows = self.inner.rows.write();
        let row = rows.get_mut(&parent_id).ok_or(StoreError::JobNotFound(parent_id))?;
        row.job.stats.child_count += delta;
        Ok(())
    }

    /// `recomputeChildStats` (§4.C, §4.H): the source of truth for progress
    /// numbers. Every bucket is COALESCEd to 0 by construction (§7 "NULL
    /// coalescing") — a parent with no children yet returns a fully zeroed,
    /// never-null struct.
    pub fn recompute_child_stats(&self, parent_id: JobId) -> Result<ChildStats, StoreError> {
        let mut rows = self.inner.rows.write();
        let parent = rows.get(&parent_id).ok_or(StoreError::JobNotFound(parent_id))?;
        let child_ids = parent.children.clone();
        let announced = parent.job.stats.child_count;
        let mut stats = ChildStats { child_count: announced, ..Default::default() };
        for child_id in &child_ids {
            if let Some(child) = rows.get(child_id) {
                match child.job.status {
                    JobStatus::Pending => stats.pending_children += 1,
                    JobStatus::Running => stats.running_children += 1,
                    JobStatus::Completed => stats.completed_children += 1,
                    JobStatus::Failed => stats.failed_children += 1,
                    JobStatus::Cancelled => stats.cancelled_children += 1,
                }
            }
        }
        if let Some(row) = rows.get_mut(&parent_id) {
            row.job.stats = stats;
        }
        Ok(stats)
    }

    /// Aggregates `document_count` across a parent's direct children, used
    /// by the Monitor's `parent_job_progress` payload.
    pub fn sum_document_count(&self, parent_id: JobId) -> Result<u64, StoreError> {
        let rows = self.inner.rows.read();
        let row = rows.get(&parent_id).ok_or(StoreError::JobNotFound(parent_id))?;
        Ok(row.children.iter().filter_map(|c| rows.get(c)).map(|c| c.job.document_count).sum())
    }

    pub fn set_document_count(&self, id: JobId, count: u64) -> Result<(), StoreError> {
        let mut rows = self.inner.rows.write();
        let row = rows.get_mut(&id).ok_or(StoreError::JobNotFound(id))?;
        row.job.document_count = count;
        Ok(())
    }

    pub fn set_metadata(&self, id: JobId, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Result<(), StoreError> {
        let mut rows = self.inner.rows.write();
        let row = rows.get_mut(&id).ok_or(StoreError::JobNotFound(id))?;
        row.job.metadata.insert(key.into(), value.into());
        Ok(())
    }

    /// `appendLog` (§4.C): allocates the next `line_number` under the
    /// per-job lock; normalization already happened upstream in the Log
    /// Pipeline.
    pub fn append_log(&self, job_id: JobId, level: LogLevel, message: String) -> Result<JobLogEntry, StoreError> {
        if self.inner.rows.read().get(&job_id).is_none() {
            return Err(StoreError::JobNotFound(job_id));
        }
        let guard = self.lock_for(job_id);
        let _held = guard.lock();
        let mut logs = self.inner.logs.write();
        let entries = logs.entry(job_id).or_default();
        let line_number = entries.last().map(|e| e.line_number + 1).unwrap_or(1);
        let entry = JobLogEntry { job_id, line_number, timestamp_ms: self.inner.clock.epoch_ms(), level, message };
        entries.push(entry.clone());
        Ok(entry)
    }

    /// `getLogs` (§4.C): ascending `line_number`, level-filtered, with a
    /// `total_count` reflecting the unfiltered per-job log size.
    pub fn get_logs(&self, job_id: JobId, query: LogQuery) -> LogPage {
        let logs = self.inner.logs.read();
        let all = logs.get(&job_id).cloned().unwrap_or_default();
        let total_count = all.len() as u64;
        let mut filtered: Vec<JobLogEntry> = all
            .into_iter()
            .filter(|e| query.after_line.map(|after| e.line_number > after).unwrap_or(true))
            .filter(|e| query.levels.as_ref().map(|levels| levels.contains(&e.level)).unwrap_or(true))
            .collect();
        if let Some(limit) = query.limit {
            filtered.truncate(limit);
        }
        LogPage { entries: filtered, total_count }
    }

    /// `resolveJobContext` (§4.C, §4.B stage 1): walk `parent_id` until a
    /// job whose metadata has `step_name` is found, bounded by the
    /// three-level hierarchy invariant. Caches the result per job id.
    pub fn resolve_job_context(&self, job_id: JobId) -> JobContext {
        if let Some(cached) = self.inner.context_cache.read().get(&job_id) {
            return cached.clone();
        }
        let rows = self.inner.rows.read();
        let mut context = JobContext::default();
        let Some(start) = rows.get(&job_id) else { return context };
        context.parent_job_id = start.job.parent_id;
        let mut current = start.job.parent_id;
        for _ in 0..MAX_HIERARCHY_DEPTH {
            let Some(current_id) = current else { break };
            let Some(row) = rows.get(&current_id) else { break };
            if let Some(step_name) = row.job.step_name() {
                context.step_name = Some(step_name.to_string());
            }
            if row.job.parent_id.is_none() {
                context.manager_id = Some(current_id);
            }
            current = row.job.parent_id;
        }
        drop(rows);
        self.inner.context_cache.write().insert(job_id, context.clone());
        context
    }

    pub fn list_jobs(&self, filter: JobFilter) -> Vec<Job> {
        self.inner
            .rows
            .read()
            .values()
            .map(|r| r.job.clone())
            .filter(|j| filter.parent_id.map(|p| j.parent_id == Some(p)).unwrap_or(true))
            .filter(|j| filter.status.map(|s| j.status == s).unwrap_or(true))
            .filter(|j| filter.job_type.as_deref().map(|t| j.job_type == t).unwrap_or(true))
            .collect()
    }

    /// Ordered ids of `parent_id`'s direct children, insertion order.
    pub fn children_of(&self, parent_id: JobId) -> Vec<JobId> {
        self.inner.rows.read().get(&parent_id).map(|r| r.children.clone()).unwrap_or_default()
    }

    /// DFS over the parent index, used by cancellation cascade (§4.H).
    pub fn descendants_of(&self, root: JobId) -> Vec<JobId> {
        let rows = self.inner.rows.read();
        let mut stack = rows.get(&root).map(|r| r.children.clone()).unwrap_or_default();
        let mut out = Vec::new();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(row) = rows.get(&id) {
                stack.extend(row.children.iter().copied());
            }
        }
        out
    }

    /// Claims the oldest `pending` job of `job_type`, atomically flipping it
    /// to `running` and publishing the status change (§4.E "Pull loop").
    pub fn claim(&self, job_type: &str) -> Option<Job> {
        let candidate = {
            let rows = self.inner.rows.read();
            rows.values()
                .filter(|r| r.job.job_type == job_type && r.job.status == JobStatus::Pending)
                .min_by_key(|r| r.job.created_at_ms)
                .map(|r| r.job.id)
        }?;
        match self.update_job_status(candidate, JobStatus::Running) {
            Ok(job) => {
                debug!(job_id = %job.id, job_type, "claimed job");
                Some(job)
            }
            Err(_) => None,
        }
    }

    /// Reconciliation sweep (SPEC_FULL §C.1): re-queues `running` jobs whose
    /// `started_at` predates `now - threshold_ms` back to `pending`, once.
    pub fn reconcile_stale_running(&self, threshold_ms: u64) -> Vec<JobId> {
        let now = self.inner.clock.epoch_ms();
        let stale: Vec<JobId> = self
            .inner
            .rows
            .read()
            .values()
            .filter(|r| r.job.status == JobStatus::Running)
            .filter(|r| r.job.started_at_ms.map(|s| now.saturating_sub(s) > threshold_ms).unwrap_or(false))
            .map(|r| r.job.id)
            .collect();
        let mut rows = self.inner.rows.write();
        for id in &stale {
            if let Some(row) = rows.get_mut(id) {
                row.job.status = JobStatus::Pending;
                row.job.started_at_ms = None;
            }
        }
        stale
    }

    /// Bulk purge of a job and its logs (§3 "deletion is only by bulk job
    /// purge").
    pub fn purge_job(&self, id: JobId) {
        self.inner.rows.write().remove(&id);
        self.inner.logs.write().remove(&id);
        self.inner.context_cache.write().remove(&id);
        self.inner.job_locks.lock().remove(&id);
    }
}

#[cfg(test)]
#[path = "job_store_tests.rs"]
mod tests;
