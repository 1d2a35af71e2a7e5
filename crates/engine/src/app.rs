// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `App` wiring struct (spec §9 "Global state: only the registries
//! (worker and step-manager), the Event Bus, and the instance id. All owned
//! by an `App` value and injected downward. No ambient singletons.").
//!
//! `quaero-daemon` constructs exactly one `App` at startup and hands clones
//! of its parts to the Monitor, the Orchestrator, each worker pool, and the
//! HTTP/WebSocket handlers. Nothing here is reachable except through an
//! explicit reference.

use std::sync::Arc;

use quaero_bus::EventBus;
use quaero_core::Clock;

use crate::collaborators::{AuthStore, DocumentStore};
use crate::instance::ServerInstance;
use crate::manager::JobManager;
use crate::monitor::{MonitorHandle, StateMonitor};
use crate::processor::{JobProcessor, PoolConfig};
use crate::reconcile::{self, ReconcileConfig};
use crate::step_manager::StepManagerRegistry;
use crate::worker::WorkerRegistry;

/// Everything the daemon needs to serve requests and run background work,
/// constructed once and injected downward.
#[derive(Clone)]
pub struct App<C: Clock> {
    pub manager: JobManager<C>,
    pub bus: EventBus,
    pub workers: WorkerRegistry,
    pub step_managers: StepManagerRegistry<C>,
    pub instance: ServerInstance,
}

impl<C: Clock + Send + Sync + 'static> App<C> {
    pub fn new(
        manager: JobManager<C>,
        bus: EventBus,
        workers: WorkerRegistry,
        step_managers: StepManagerRegistry<C>,
    ) -> Self {
        Self { manager, bus, workers, step_managers, instance: ServerInstance::new() }
    }

    /// Composed from the configured collaborators, matching the factory
    /// used by `standard_registry` for wiring the ten canonical actions.
    pub fn with_standard_step_managers(
        manager: JobManager<C>,
        bus: EventBus,
        workers: WorkerRegistry,
        docs: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthStore>,
    ) -> Self {
        let step_managers = crate::step_manager::standard_registry(manager.clone(), docs, auth);
        Self::new(manager, bus, workers, step_managers)
    }

    /// Startup sequence (SPEC_FULL §C.1, §4.H, §4.I): reconcile stale
    /// running jobs, publish the instance beacon, then start the Monitor.
    /// Worker pools are started separately by the caller per registered
    /// worker type (pool sizing is per-type, §4.E).
    pub fn start_background_tasks(&self, reconcile_config: ReconcileConfig) -> Option<MonitorHandle> {
        reconcile::run_once(&self.manager, reconcile_config);
        self.instance.publish(&self.bus, self.manager.store().epoch_ms());
        let monitor = StateMonitor::new(self.manager.clone());
        monitor.spawn(&self.bus)
    }

    /// Spawns a worker pool for `job_type` at its SPEC_FULL §C.2 default
    /// size.
    pub fn spawn_default_pool(
        &self,
        job_type: &str,
        shutdown: tokio_util::sync::CancellationToken,
    ) -> Vec<tokio::task::JoinHandle<()>> {
        let processor = JobProcessor::new(self.manager.clone(), self.workers.clone());
        processor.spawn_pool(job_type, PoolConfig::default_for(job_type), shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{EmptyDocumentStore, NoAuthStore};
    use quaero_core::{FakeClock, JobConfig};
    use quaero_store::{JobStore, LogPipeline, LogPipelineConfig};

    fn test_app() -> App<FakeClock> {
        let bus = EventBus::new();
        let clock = FakeClock::new();
        let store = JobStore::new(bus.clone(), clock);
        let logs = LogPipeline::new(store.clone(), bus.clone(), LogPipelineConfig::default());
        let manager = JobManager::new(store, logs, bus.clone());
        App::with_standard_step_managers(
            manager,
            bus,
            WorkerRegistry::new(),
            Arc::new(EmptyDocumentStore),
            Arc::new(NoAuthStore),
        )
    }

    #[test]
    fn starting_background_tasks_publishes_a_fresh_instance_beacon() {
        let app = test_app();
        let bus = app.bus.clone();
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime");
        rt.block_on(async {
            let mut sub = bus.subscribe("status").expect("subscribe");
            let _handle = app.start_background_tasks(ReconcileConfig::default());
            let event = sub.recv().await.expect("status event");
            match event {
                quaero_core::Event::Status { server_instance_id, .. } => {
                    assert_eq!(server_instance_id, app.instance.id());
                }
                other => panic!("unexpected event: {other:?}"),
            }
        });
    }

    #[test]
    fn step_managers_cover_all_ten_canonical_actions() {
        let app = test_app();
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
            assert!(app.step_managers.get(action).is_some());
        }
        let _ = manager_job_type_smoke(&app);
    }

    fn manager_job_type_smoke(app: &App<FakeClock>) -> quaero_core::JobId {
        app.manager.create_job(JobConfig::new("manager", "smoke")).expect("create").id
    }
}
