// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worker capability set (spec §4.E) and its registry.
//!
//! A Worker is a polymorphic unit keyed by a string `type` tag and resolved
//! from a registry populated at startup (§9 "Polymorphic Workers... avoid
//! inheritance hierarchies; prefer tagged variants"). Concrete variants
//! (`crawler`, `agent`, `search`, ...) are plug-ins external to the engine;
//! this crate only defines the seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use quaero_core::Job;
use tokio_util::sync::CancellationToken;

/// Error returned by a failing [`Worker::execute`] or [`Worker::validate`].
/// The `Display` string becomes the final log entry on a failed leaf
/// (§4.E "error -> updateJobStatus(failed) with the error string written as
/// the final log entry").
pub type WorkerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// `getWorkerType() -> string`, `validate(job) -> error`,
/// `execute(ctx, job) -> error` (§4.E).
#[async_trait]
pub trait Worker: Send + Sync {
    fn worker_type(&self) -> &str;

    /// Cheap pre-flight check run before a claimed job is executed.
    /// Workers with nothing to validate may return `Ok(())` unconditionally.
    fn validate(&self, job: &Job) -> Result<(), WorkerError>;

    /// Executes the leaf job. `cancel` is observable within one heartbeat for
    /// an idle worker and at the next I/O yield otherwise (§5).
    async fn execute(&self, job: &Job, cancel: CancellationToken) -> Result<(), WorkerError>;
}

/// Registry of Workers by `worker_type`, populated once at daemon startup
/// (§9 "only the registries... owned by an `App` value and injected
/// downward. No ambient singletons").
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    workers: HashMap<String, Arc<dyn Worker>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, worker: Arc<dyn Worker>) {
        self.workers.insert(worker.worker_type().to_string(), worker);
    }

    pub fn get(&self, worker_type: &str) -> Option<Arc<dyn Worker>> {
        self.workers.get(worker_type).cloned()
    }

    pub fn worker_types(&self) -> Vec<String> {
        self.workers.keys().cloned().collect()
    }
}
