// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::collaborators::{EmptyDocumentStore, NoAuthStore};
use crate::step_manager::standard_registry;
use quaero_core::FakeClock;
use quaero_store::{JobStore, LogPipeline, LogPipelineConfig};
use std::sync::Arc;
use std::time::Duration;

fn test_orchestrator() -> (JobDefinitionOrchestrator<FakeClock>, JobManager<FakeClock>) {
    let bus = EventBus::new();
    let clock = FakeClock::new();
    let store = JobStore::new(bus.clone(), clock);
    let logs = LogPipeline::new(store.clone(), bus.clone(), LogPipelineConfig::default());
    let manager = JobManager::new(store, logs, bus.clone());
    let registry = standard_registry(manager.clone(), Arc::new(EmptyDocumentStore), Arc::new(NoAuthStore));
    (JobDefinitionOrchestrator::new(manager.clone(), registry, bus), manager)
}

/// Scenario S1: two-step DAG, `b` depends on `a`; both complete.
#[tokio::test]
async fn two_step_dag_runs_steps_in_dependency_order() {
    let (orchestrator, manager) = test_orchestrator();
    let toml = r#"
        id = "s1"
        name = "s1"
        [step.a]
        action = "crawler"
        start_urls = ["https://a.example"]
        [step.b]
        action = "crawler"
        depends = "a"
        start_urls = ["https://b.example"]
    "#;
    let definition = JobDefinition::load(toml).expect("valid definition");
    let manager_id = orchestrator.execute(definition).await.expect("execute");

    // Both step jobs should eventually exist as children of the manager.
    for _ in 0..200 {
        if manager.store().children_of(manager_id).len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let children = manager.store().children_of(manager_id);
    assert_eq!(children.len(), 2, "both step jobs should have been launched");
}

/// Scenario S2: step `a` fails with `on_error = continue`; `b` still runs.
#[tokio::test]
async fn failing_step_with_continue_allows_dependent_to_run() {
    let (orchestrator, manager) = test_orchestrator();
    let toml = r#"
        id = "s2"
        name = "s2"
        [step.a]
        action = "crawler"
        on_error = "continue"
        [step.b]
        action = "crawler"
        depends = "a"
        start_urls = ["https://b.example"]
    "#;
    // step.a has no start_urls, so its enumerator will fail validation -> step a fails.
    let definition = JobDefinition::load(toml).expect("valid definition");
    let manager_id = orchestrator.execute(definition).await.expect("execute");

    for _ in 0..200 {
        if manager.store().children_of(manager_id).len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let children = manager.store().children_of(manager_id);
    assert_eq!(children.len(), 2, "b must still be launched after a fails with on_error=continue");
}

/// Scenario S3: step `a` fails with `on_error = fail`; `b` is never spawned.
#[tokio::test]
async fn failing_step_with_fail_blocks_dependent_step() {
    let (orchestrator, manager) = test_orchestrator();
    let toml = r#"
        id = "s3"
        name = "s3"
        [step.a]
        action = "crawler"
        on_error = "fail"
        [step.b]
        action = "crawler"
        depends = "a"
        start_urls = ["https://b.example"]
    "#;
    let definition = JobDefinition::load(toml).expect("valid definition");
    let manager_id = orchestrator.execute(definition).await.expect("execute");

    // Give the orchestrator time to run to quiescence.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let children = manager.store().children_of(manager_id);
    assert_eq!(children.len(), 1, "only step a should have been spawned; b is never spawned");
}

#[tokio::test]
async fn unknown_action_fails_fast_before_any_job_row_is_created() {
    let (orchestrator, manager) = test_orchestrator();
    let toml = r#"
        id = "s4"
        name = "s4"
        [step.a]
        action = "not_a_real_action"
    "#;
    let definition = JobDefinition::load(toml).expect("valid definition");
    let err = orchestrator.execute(definition).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownAction(_)));
    assert!(manager.store().list_jobs(Default::default()).is_empty());
}

#[tokio::test]
async fn cyclic_dependency_is_rejected_before_manager_job_is_created() {
    let (orchestrator, manager) = test_orchestrator();
    let toml = r#"
        id = "s5"
        name = "s5"
        [step.a]
        action = "crawler"
        depends = "b"
        start_urls = ["https://a.example"]
        [step.b]
        action = "crawler"
        depends = "a"
        start_urls = ["https://b.example"]
    "#;
    // `load` runs validate(), which already rejects the cycle.
    let parse_err = JobDefinition::load(toml).unwrap_err();
    assert!(parse_err.to_string().contains("cycle"));
    assert!(manager.store().list_jobs(Default::default()).is_empty());
    let _ = &orchestrator; // orchestrator unused on this path; kept for symmetry
}
