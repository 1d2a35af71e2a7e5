// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::collaborators::{AuthStore, DocumentRef, DocumentStore, EmptyDocumentStore, NoAuthStore};
use crate::enumerator::SeedListEnumerator;
use quaero_bus::EventBus;
use quaero_config::JobDefinition;
use quaero_core::{FakeClock, JobStatus};
use quaero_store::{JobStore, LogPipeline, LogPipelineConfig};

fn test_manager() -> JobManager<FakeClock> {
    let bus = EventBus::new();
    let clock = FakeClock::new();
    let store = JobStore::new(bus.clone(), clock);
    let logs = LogPipeline::new(store.clone(), bus.clone(), LogPipelineConfig::default());
    JobManager::new(store, logs, bus)
}

fn parse_one_step(toml: &str) -> (JobId, IndexMap<String, StepSpec>) {
    let def = JobDefinition::load(toml).expect("valid definition");
    (JobId::new(), def.step)
}

#[tokio::test]
async fn seed_based_step_spawns_one_child_per_url() {
    let manager = test_manager();
    let step_manager = ActionStepManager::new(
        "crawler",
        std::sync::Arc::new(SeedListEnumerator),
        &[],
        manager.clone(),
        std::sync::Arc::new(EmptyDocumentStore),
        std::sync::Arc::new(NoAuthStore),
    );
    let toml = "id=\"d\"\nname=\"d\"\n[step.a]\naction=\"crawler\"\nstart_urls=[\"https://x.example\",\"https://y.example\"]\n";
    let (manager_job_id, defs) = parse_one_step(toml);
    manager.create_job(quaero_core::JobConfig::new("manager", "d").id(manager_job_id)).expect("create manager job");

    let step_id = step_manager
        .create_parent_job(StepContext {
            manager_job_id,
            step_name: "a",
            spec: defs.get("a").expect("step a"),
            step_definitions: &defs,
        })
        .await
        .expect("create parent job");

    let step = manager.get_job(step_id).expect("get step job");
    assert_eq!(step.status, JobStatus::Running);
    let stats = manager.store().recompute_child_stats(step_id).expect("stats");
    assert_eq!(stats.child_count, 2);
}

#[tokio::test]
async fn missing_required_option_fails_step_without_spawning() {
    let manager = test_manager();
    let step_manager = ActionStepManager::new(
        "crawler",
        std::sync::Arc::new(SeedListEnumerator),
        &[],
        manager.clone(),
        std::sync::Arc::new(EmptyDocumentStore),
        std::sync::Arc::new(NoAuthStore),
    );
    let toml = "id=\"d\"\nname=\"d\"\n[step.a]\naction=\"crawler\"\n";
    let (manager_job_id, defs) = parse_one_step(toml);
    manager.create_job(quaero_core::JobConfig::new("manager", "d").id(manager_job_id)).expect("create manager job");

    let step_id = step_manager
        .create_parent_job(StepContext {
            manager_job_id,
            step_name: "a",
            spec: defs.get("a").expect("step a"),
            step_definitions: &defs,
        })
        .await
        .expect("create_parent_job itself does not error");

    let step = manager.get_job(step_id).expect("get step job");
    assert_eq!(step.status, JobStatus::Failed);
    let stats = manager.store().recompute_child_stats(step_id).expect("stats");
    assert_eq!(stats.child_count, 0);
}

#[tokio::test]
async fn auth_resolution_failure_fails_the_step() {
    struct AlwaysMiss;
    #[async_trait::async_trait]
    impl AuthStore for AlwaysMiss {
        async fn resolve(&self, _auth_id: &str) -> Option<serde_json::Value> {
            None
        }
    }

    let manager = test_manager();
    let step_manager = ActionStepManager::new(
        "crawler",
        std::sync::Arc::new(SeedListEnumerator),
        &[],
        manager.clone(),
        std::sync::Arc::new(EmptyDocumentStore),
        std::sync::Arc::new(AlwaysMiss),
    );
    let toml = "id=\"d\"\nname=\"d\"\n[step.a]\naction=\"crawler\"\nstart_urls=[\"https://x.example\"]\nauth_id=\"missing-cred\"\n";
    let (manager_job_id, defs) = parse_one_step(toml);
    manager.create_job(quaero_core::JobConfig::new("manager", "d").id(manager_job_id)).expect("create manager job");

    let step_id = step_manager
        .create_parent_job(StepContext {
            manager_job_id,
            step_name: "a",
            spec: defs.get("a").expect("step a"),
            step_definitions: &defs,
        })
        .await
        .expect("create_parent_job itself does not error");

    assert_eq!(manager.get_job(step_id).expect("get step job").status, JobStatus::Failed);
}

#[tokio::test]
async fn filter_based_step_with_no_matches_completes_immediately() {
    let manager = test_manager();
    let step_manager = ActionStepManager::new(
        "agent",
        std::sync::Arc::new(crate::enumerator::FilterQueryEnumerator),
        &[],
        manager.clone(),
        std::sync::Arc::new(EmptyDocumentStore),
        std::sync::Arc::new(NoAuthStore),
    );
    let toml = "id=\"d\"\nname=\"d\"\n[step.a]\naction=\"agent\"\nfilter_tags=[\"x\"]\n";
    let (manager_job_id, defs) = parse_one_step(toml);
    manager.create_job(quaero_core::JobConfig::new("manager", "d").id(manager_job_id)).expect("create manager job");

    let step_id = step_manager
        .create_parent_job(StepContext {
            manager_job_id,
            step_name: "a",
            spec: defs.get("a").expect("step a"),
            step_definitions: &defs,
        })
        .await
        .expect("create parent job");

    let step = manager.get_job(step_id).expect("get step job");
    assert_eq!(step.status, JobStatus::Completed);
    assert_eq!(step.stats.child_count, 0);
}

struct OneDoc;
#[async_trait::async_trait]
impl DocumentStore for OneDoc {
    async fn query(
        &self,
        _filter_tags: &[String],
        _filter_created_after: Option<u64>,
        _filter_updated_after: Option<u64>,
        _filter_limit: Option<usize>,
    ) -> Vec<DocumentRef> {
        vec![DocumentRef { id: "doc-1".to_string(), payload: serde_json::json!({"title": "hi"}) }]
    }
}

#[tokio::test]
async fn filter_based_step_spawns_one_child_per_document() {
    let manager = test_manager();
    let step_manager = ActionStepManager::new(
        "agent",
        std::sync::Arc::new(crate::enumerator::FilterQueryEnumerator),
        &[],
        manager.clone(),
        std::sync::Arc::new(OneDoc),
        std::sync::Arc::new(NoAuthStore),
    );
    let toml = "id=\"d\"\nname=\"d\"\n[step.a]\naction=\"agent\"\nfilter_tags=[\"x\"]\n";
    let (manager_job_id, defs) = parse_one_step(toml);
    manager.create_job(quaero_core::JobConfig::new("manager", "d").id(manager_job_id)).expect("create manager job");

    let step_id = step_manager
        .create_parent_job(StepContext {
            manager_job_id,
            step_name: "a",
            spec: defs.get("a").expect("step a"),
            step_definitions: &defs,
        })
        .await
        .expect("create parent job");

    let stats = manager.store().recompute_child_stats(step_id).expect("stats");
    assert_eq!(stats.child_count, 1);
}

#[test]
fn registry_resolves_all_ten_canonical_actions() {
    let manager = test_manager();
    let registry = standard_registry(manager, std::sync::Arc::new(EmptyDocumentStore), std::sync::Arc::new(NoAuthStore));
    for action in [
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
    ] {
        assert!(registry.get(action).is_some(), "missing step manager for {action}");
    }
}
