// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use quaero_bus::EventBus;
use quaero_core::{FakeClock, Job, JobConfig};
use quaero_store::{JobStore, LogPipeline, LogPipelineConfig};
use std::time::Duration;

fn test_manager() -> JobManager<FakeClock> {
    let bus = EventBus::new();
    let clock = FakeClock::new();
    let store = JobStore::new(bus.clone(), clock);
    let logs = LogPipeline::new(store.clone(), bus.clone(), LogPipelineConfig::default());
    JobManager::new(store, logs, bus)
}

struct AlwaysOk;
#[async_trait]
impl crate::worker::Worker for AlwaysOk {
    fn worker_type(&self) -> &str {
        "echo"
    }
    fn validate(&self, _job: &Job) -> Result<(), crate::worker::WorkerError> {
        Ok(())
    }
    async fn execute(&self, _job: &Job, _cancel: CancellationToken) -> Result<(), crate::worker::WorkerError> {
        Ok(())
    }
}

struct AlwaysFail;
#[async_trait]
impl crate::worker::Worker for AlwaysFail {
    fn worker_type(&self) -> &str {
        "echo"
    }
    fn validate(&self, _job: &Job) -> Result<(), crate::worker::WorkerError> {
        Ok(())
    }
    async fn execute(&self, _job: &Job, _cancel: CancellationToken) -> Result<(), crate::worker::WorkerError> {
        Err("boom".into())
    }
}

#[tokio::test]
async fn successful_leaf_becomes_completed() {
    let manager = test_manager();
    let job = manager.create_job(JobConfig::new("echo", "leaf")).expect("create job");
    let mut registry = WorkerRegistry::new();
    registry.register(Arc::new(AlwaysOk));
    let processor = JobProcessor::new(manager.clone(), registry);
    let shutdown = CancellationToken::new();
    let handles = processor.spawn_pool("echo", PoolConfig { size: 1 }, shutdown.clone());

    let mut status = JobStatus::Pending;
    for _ in 0..200 {
        status = manager.get_job(job.id).expect("get job").status;
        if status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(status, JobStatus::Completed);
    shutdown.cancel();
    for handle in handles {
        let _ = handle.await;
    }
}

#[tokio::test]
async fn failing_leaf_becomes_failed_with_a_log_entry() {
    let manager = test_manager();
    let job = manager.create_job(JobConfig::new("echo", "leaf")).expect("create job");
    let mut registry = WorkerRegistry::new();
    registry.register(Arc::new(AlwaysFail));
    let processor = JobProcessor::new(manager.clone(), registry);
    let shutdown = CancellationToken::new();
    let handles = processor.spawn_pool("echo", PoolConfig { size: 1 }, shutdown.clone());

    let mut status = JobStatus::Pending;
    for _ in 0..200 {
        status = manager.get_job(job.id).expect("get job").status;
        if status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(status, JobStatus::Failed);
    let page = manager.store().get_logs(job.id, Default::default());
    assert_eq!(page.total_count, 1);
    shutdown.cancel();
    for handle in handles {
        let _ = handle.await;
    }
}

#[test]
fn pool_config_defaults_split_cpu_and_io_shaped_types() {
    assert_eq!(PoolConfig::default_for("transform").size, num_cpus::get().max(1));
    assert_eq!(PoolConfig::default_for("crawler").size, IO_POOL_SIZE);
}
