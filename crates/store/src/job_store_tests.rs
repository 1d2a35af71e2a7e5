// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use quaero_core::{FakeClock, JobConfig, JobStatus, LogLevel};

fn store() -> JobStore<FakeClock> {
    JobStore::new(EventBus::new(), FakeClock::new())
}

#[test]
fn create_job_assigns_zeroed_stats() {
    let store = store();
    let job = store.create_job(JobConfig::new("manager", "run-1")).unwrap();
    assert_eq!(job.stats.child_count, 0);
    assert_eq!(job.status, JobStatus::Pending);
}

#[test]
fn create_job_rejects_duplicate_id() {
    let store = store();
    let config = JobConfig::new("manager", "run-1");
    let id = config.id;
    store.create_job(config).unwrap();
    let dup = JobConfig::new("manager", "run-1").id(id);
    assert!(matches!(store.create_job(dup), Err(StoreError::DuplicateJob(_))));
}

#[test]
fn terminal_transitions_are_monotonic() {
    let store = store();
    let job = store.create_job(JobConfig::new("crawler", "leaf")).unwrap();
    store.update_job_status(job.id, JobStatus::Running).unwrap();
    store.update_job_status(job.id, JobStatus::Completed).unwrap();
    let err = store.update_job_status(job.id, JobStatus::Running).unwrap_err();
    assert!(matches!(err, StoreError::TerminalTransitionRejected { .. }));
}

#[test]
fn log_line_numbers_are_monotonic_starting_at_one() {
    let store = store();
    let job = store.create_job(JobConfig::new("crawler", "leaf")).unwrap();
    let e1 = store.append_log(job.id, LogLevel::Info, "a".into()).unwrap();
    let e2 = store.append_log(job.id, LogLevel::Info, "b".into()).unwrap();
    assert_eq!(e1.line_number, 1);
    assert_eq!(e2.line_number, 2);
}

#[test]
fn get_logs_filters_by_level_and_reports_total() {
    let store = store();
    let job = store.create_job(JobConfig::new("crawler", "leaf")).unwrap();
    store.append_log(job.id, LogLevel::Info, "a".into()).unwrap();
    store.append_log(job.id, LogLevel::Error, "b".into()).unwrap();
    let page = store.get_logs(job.id, LogQuery { levels: Some(vec![LogLevel::Error]), ..Default::default() });
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.total_count, 2);
}

#[test]
fn recompute_child_stats_coalesces_to_zero_with_no_children() {
    let store = store();
    let parent = store.create_job(JobConfig::new("manager", "run-1")).unwrap();
    let stats = store.recompute_child_stats(parent.id).unwrap();
    assert_eq!(stats, ChildStats::default());
}

#[test]
fn recompute_child_stats_counts_by_status() {
    let store = store();
    let parent = store.create_job(JobConfig::new("step", "step-a")).unwrap();
    store.increment_child_count(parent.id, 2).unwrap();
    let c1 = store.create_job(JobConfig::new("crawler", "c1").parent_id(parent.id)).unwrap();
    let c2 = store.create_job(JobConfig::new("crawler", "c2").parent_id(parent.id)).unwrap();
    store.update_job_status(c1.id, JobStatus::Running).unwrap();
    store.update_job_status(c1.id, JobStatus::Completed).unwrap();
    store.update_job_status(c2.id, JobStatus::Running).unwrap();
    let stats = store.recompute_child_stats(parent.id).unwrap();
    assert_eq!(stats.child_count, 2);
    assert_eq!(stats.completed_children, 1);
    assert_eq!(stats.running_children, 1);
    assert!(stats.is_quiescent() == false);
}

#[test]
fn resolve_job_context_walks_to_step_name() {
    let store = store();
    let manager = store.create_job(JobConfig::new("manager", "run-1")).unwrap();
    let step = store
        .create_job(JobConfig::new("crawler", "step-a").parent_id(manager.id).with_metadata("step_name", "step-a"))
        .unwrap();
    let leaf = store.create_job(JobConfig::new("crawler", "leaf").parent_id(step.id)).unwrap();
    let ctx = store.resolve_job_context(leaf.id);
    assert_eq!(ctx.step_name.as_deref(), Some("step-a"));
    assert_eq!(ctx.manager_id, Some(manager.id));
}

#[test]
fn claim_picks_oldest_pending_job_of_type() {
    let store = store();
    let j1 = store.create_job(JobConfig::new("crawler", "first")).unwrap();
    let _j2 = store.create_job(JobConfig::new("crawler", "second")).unwrap();
    let claimed = store.claim("crawler").unwrap();
    assert_eq!(claimed.id, j1.id);
    assert_eq!(claimed.status, JobStatus::Running);
}

#[test]
fn claim_returns_none_when_no_pending_jobs_of_type() {
    let store = store();
    assert!(store.claim("search").is_none());
}

#[test]
fn descendants_of_walks_full_subtree() {
    let store = store();
    let manager = store.create_job(JobConfig::new("manager", "run-1")).unwrap();
    let step = store.create_job(JobConfig::new("crawler", "step-a").parent_id(manager.id)).unwrap();
    let leaf = store.create_job(JobConfig::new("crawler", "leaf").parent_id(step.id)).unwrap();
    let descendants = store.descendants_of(manager.id);
    assert_eq!(descendants.len(), 2);
    assert!(descendants.contains(&step.id));
    assert!(descendants.contains(&leaf.id));
}

#[test]
fn reconcile_stale_running_requeues_old_jobs_as_pending() {
    let clock = FakeClock::new();
    let store = JobStore::new(EventBus::new(), clock.clone());
    let job = store.create_job(JobConfig::new("crawler", "leaf")).unwrap();
    store.update_job_status(job.id, JobStatus::Running).unwrap();
    clock.advance(std::time::Duration::from_secs(600));
    let requeued = store.reconcile_stale_running(300_000);
    assert_eq!(requeued, vec![job.id]);
    assert_eq!(store.get_job(job.id).unwrap().status, JobStatus::Pending);
}

#[test]
fn purge_job_removes_row_and_logs() {
    let store = store();
    let job = store.create_job(JobConfig::new("crawler", "leaf")).unwrap();
    store.append_log(job.id, LogLevel::Info, "a".into()).unwrap();
    store.purge_job(job.id);
    assert!(matches!(store.get_job(job.id), Err(StoreError::JobNotFound(_))));
}
