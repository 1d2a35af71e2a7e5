// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quaero-engine: the orchestration core (spec §4.D-I).
//!
//! Owns nothing the Job Store doesn't already own; this crate is the layer
//! of behavior on top of `quaero-store`'s rows: the Job Manager façade, the
//! Worker and Step Manager seams and their registries, the Job Definition
//! Orchestrator that drives a job definition's DAG, the State Monitor that
//! aggregates child outcomes into parent progress and terminal status, the
//! Job Processor pool that pulls claimed work, the reconciliation sweep, and
//! the server instance beacon. `quaero-daemon` wires all of it together via
//! [`app::App`]; nothing here reaches for an ambient singleton.

pub mod app;
pub mod collaborators;
pub mod enumerator;
pub mod error;
pub mod instance;
pub mod manager;
pub mod monitor;
pub mod orchestrator;
pub mod processor;
pub mod reconcile;
pub mod step_manager;
pub mod worker;

pub use app::App;
pub use collaborators::{AuthStore, DocumentRef, DocumentStore, EmptyDocumentStore, NoAuthStore};
pub use enumerator::{FilterQueryEnumerator, SeedListEnumerator, SingleTaskEnumerator, WorkEnumerator, WorkItem};
pub use error::{EngineError, EngineResult};
pub use instance::ServerInstance;
pub use manager::JobManager;
pub use monitor::{MonitorHandle, StateMonitor};
pub use orchestrator::JobDefinitionOrchestrator;
pub use processor::{JobProcessor, PoolConfig};
pub use reconcile::ReconcileConfig;
pub use step_manager::{standard_registry, ActionStepManager, StepContext, StepManager, StepManagerRegistry};
pub use worker::{Worker, WorkerError, WorkerRegistry};
