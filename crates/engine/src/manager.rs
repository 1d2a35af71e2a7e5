// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job Manager (spec §4.D): the thin façade over the Job Store that
//! every caller outside the Store uses. Workers and Step Managers receive
//! it by dependency injection (§9 "No ambient singletons").
//!
//! The dual-event publish on terminal transitions (Invariant 5) and the
//! `step_name`/`manager_id` resolution for log correlation already live in
//! [`quaero_store::JobStore`] and [`quaero_store::LogPipeline`]; this module
//! just gives callers one object to hold instead of two.

use quaero_bus::EventBus;
use quaero_core::{Clock, Event, Job, JobConfig, JobId, JobStatus};
use quaero_store::{JobContext, JobStore, LogPipeline, StoreError};

/// Thin façade over [`JobStore`] + [`LogPipeline`] (§4.D).
#[derive(Clone)]
pub struct JobManager<C: Clock> {
    store: JobStore<C>,
    logs: LogPipeline<C>,
    bus: EventBus,
}

impl<C: Clock + 'static> JobManager<C> {
    pub fn new(store: JobStore<C>, logs: LogPipeline<C>, bus: EventBus) -> Self {
        Self { store, logs, bus }
    }

    pub fn store(&self) -> &JobStore<C> {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn create_job(&self, config: JobConfig) -> Result<Job, StoreError> {
        self.store.create_job(config)
    }

    pub fn get_job(&self, id: JobId) -> Result<Job, StoreError> {
        self.store.get_job(id)
    }

    pub fn update_status(&self, id: JobId, status: JobStatus) -> Result<Job, StoreError> {
        self.store.update_job_status(id, status)
    }

    pub fn fail(&self, id: JobId, error: impl Into<String>) -> Result<Job, StoreError> {
        self.store.update_job_status_with_error(id, JobStatus::Failed, Some(error.into()))
    }

    pub fn finish(&self, id: JobId) -> Result<(), StoreError> {
        self.store.set_job_finished(id)
    }

    /// `addJobLog(ctx, jobID, level, message)` (§4.B), exposed on the Manager
    /// because it is the one entry point workers and Step Managers use.
    pub fn add_job_log(&self, job_id: JobId, level: &str, message: impl Into<String>) -> Result<(), StoreError> {
        self.logs.add_job_log(job_id, level, message)
    }

    pub fn resolve_job_context(&self, job_id: JobId) -> JobContext {
        self.store.resolve_job_context(job_id)
    }

    /// Creates a child row, which registers it under `parent_id` (set on
    /// `config`), and publishes `job_spawn` (§4.F step 5: "Publish
    /// `job_spawn` with parent/child ids after each spawn"). Indexing the
    /// child under its parent is `create_job`'s job alone — this does not
    /// also push onto the parent's `children` vec, or every spawned child
    /// would be double-counted by `recompute_child_stats`.
    pub fn spawn_child(&self, config: JobConfig, parent_id: JobId) -> Result<Job, StoreError> {
        let child = self.store.create_job(config)?;
        self.store.increment_child_count(parent_id, 1)?;
        self.bus.publish(Event::JobSpawn {
            parent_job_id: parent_id,
            child_job_id: child.id,
            timestamp_ms: self.store.epoch_ms(),
        });
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaero_bus::EventBus;
    use quaero_core::{FakeClock, JobConfig};
    use quaero_store::LogPipelineConfig;

    fn manager() -> JobManager<FakeClock> {
        let bus = EventBus::new();
        let clock = FakeClock::new();
        let store = JobStore::new(bus.clone(), clock);
        let logs = LogPipeline::new(store.clone(), bus.clone(), LogPipelineConfig::default());
        JobManager::new(store, logs, bus)
    }

    #[test]
    fn spawn_child_registers_and_counts() {
        let manager = manager();
        let parent = manager.create_job(JobConfig::new("manager", "root")).expect("create parent");
        let child = manager
            .spawn_child(JobConfig::new("crawler", "child").parent_id(parent.id), parent.id)
            .expect("spawn child");
        let stats = manager.store().recompute_child_stats(parent.id).expect("stats");
        assert_eq!(stats.child_count, 1);
        assert_eq!(stats.pending_children, 1);
        assert_eq!(manager.get_job(child.id).expect("get child").parent_id, Some(parent.id));
    }

    #[test]
    fn add_job_log_persists_through_pipeline() {
        let manager = manager();
        let job = manager.create_job(JobConfig::new("crawler", "leaf")).expect("create");
        manager.add_job_log(job.id, "info", "hello").expect("log");
        let page = manager.store().get_logs(job.id, Default::default());
        assert_eq!(page.total_count, 1);
    }
}
