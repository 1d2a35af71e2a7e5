// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step Managers (spec §4.F): one per `action` tag, creating the step's
//! parent-of-children job and seeding its work queue.
//!
//! All ten action kinds named in §4.F share the same seven-step contract;
//! rather than ten near-duplicate structs this crate implements the
//! contract once as [`ActionStepManager`], parameterized by a
//! [`WorkEnumerator`] (§9 "avoid inheritance hierarchies; prefer tagged
//! variants"). The registry maps `action` strings to configured instances.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use quaero_config::StepSpec;
use quaero_core::{metadata_keys, Clock, JobConfig, JobId, JobStatus};
use serde_json::Value;
use tracing::{info, warn};

use crate::collaborators::{AuthStore, DocumentStore};
use crate::enumerator::WorkEnumerator;
use crate::error::{EngineError, EngineResult};
use crate::manager::JobManager;

/// Everything an [`ActionStepManager`] needs to create one step job
/// (§4.F contract steps 1-2).
pub struct StepContext<'a> {
    pub manager_job_id: JobId,
    pub step_name: &'a str,
    pub spec: &'a StepSpec,
    /// Insertion-ordered snapshot copied from the manager job's own
    /// metadata (§4.F step 1: "copied from manager").
    pub step_definitions: &'a IndexMap<String, StepSpec>,
}

/// `createParentJob(ctx, stepSpec, jobDefinition, managerJobID) ->
/// stepJobID`, `getManagerType() -> string` (§4.F).
#[async_trait::async_trait]
pub trait StepManager: Send + Sync {
    fn manager_type(&self) -> &str;

    async fn create_parent_job(&self, ctx: StepContext<'_>) -> EngineResult<JobId>;
}

fn step_definitions_snapshot(defs: &IndexMap<String, StepSpec>) -> Value {
    let entries: Vec<Value> = defs
        .iter()
        .map(|(name, spec)| {
            serde_json::json!({
                "step_name": name,
                "action": spec.action,
                "on_error": match spec.on_error {
                    quaero_config::OnError::Fail => "fail",
                    quaero_config::OnError::Continue => "continue",
                    quaero_config::OnError::Retry => "retry",
                },
                "depends": spec.depends,
            })
        })
        .collect();
    Value::Array(entries)
}

/// The shared seven-step implementation of §4.F, generic over the action's
/// enumeration strategy and an optional set of additional required options
/// beyond what the enumerator itself demands.
pub struct ActionStepManager<C: Clock> {
    action: String,
    enumerator: Arc<dyn WorkEnumerator>,
    extra_required: &'static [&'static str],
    manager: JobManager<C>,
    docs: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthStore>,
}

impl<C: Clock + 'static> ActionStepManager<C> {
    pub fn new(
        action: impl Into<String>,
        enumerator: Arc<dyn WorkEnumerator>,
        extra_required: &'static [&'static str],
        manager: JobManager<C>,
        docs: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthStore>,
    ) -> Self {
        Self { action: action.into(), enumerator, extra_required, manager, docs, auth }
    }

    async fn run(&self, step_id: JobId, step_name: &str, spec: &StepSpec) -> EngineResult<()> {
        spec.require(step_name, self.extra_required)?;
        spec.require(step_name, self.enumerator.required_options())?;

        if let Some(auth_value) = spec.option_str("auth_id") {
            let auth_id = auth_value.to_string();
            match self.auth.resolve(&auth_id).await {
                Some(blob) => self.manager.store().set_metadata(step_id, metadata_keys::AUTH_ID, blob)?,
                None => return Err(EngineError::AuthNotResolved(auth_id)),
            }
        }

        let items = self.enumerator.enumerate(spec, self.docs.as_ref()).await?;

        if items.is_empty() {
            // §4.F step 6: empty input set completes the step immediately.
            self.manager.update_status(step_id, JobStatus::Completed)?;
            self.manager.finish(step_id)?;
            return Ok(());
        }

        for item in items {
            let mut config = JobConfig::new(self.action.clone(), item.name).parent_id(step_id);
            for (key, value) in item.metadata {
                config = config.with_metadata(key, value);
            }
            self.manager.spawn_child(config, step_id)?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<C: Clock + 'static> StepManager for ActionStepManager<C> {
    fn manager_type(&self) -> &str {
        &self.action
    }

    async fn create_parent_job(&self, ctx: StepContext<'_>) -> EngineResult<JobId> {
        let on_error = match ctx.spec.on_error {
            quaero_config::OnError::Fail => "fail",
            quaero_config::OnError::Continue => "continue",
            quaero_config::OnError::Retry => "retry",
        };
        let config = JobConfig::new(self.action.clone(), ctx.step_name)
            .parent_id(ctx.manager_job_id)
            .with_metadata(metadata_keys::STEP_NAME, ctx.step_name)
            .with_metadata(metadata_keys::STEP_DEFINITIONS, step_definitions_snapshot(ctx.step_definitions))
            // Read back by the State Monitor (§4.H step 4) when aggregating
            // the manager job's status from its step children.
            .with_metadata("on_error", on_error);
        // Uses `spawn_child`, not `create_job`, so the manager job's own
        // `child_count`/`job_spawn` bookkeeping (§4.C, §8 Invariant 1) covers
        // step jobs the same way it covers leaf jobs one level down.
        let step_job = self.manager.spawn_child(config, ctx.manager_job_id)?;
        let step_id = step_job.id;
        self.manager.update_status(step_id, JobStatus::Running)?;

        if let Err(err) = self.run(step_id, ctx.step_name, ctx.spec).await {
            warn!(step = ctx.step_name, error = %err, "step spawn failed");
            self.manager.fail(step_id, err.to_string())?;
            self.manager.finish(step_id)?;
            // §4.F step 7: spawn failure does not advance the manager job
            // further; the Monitor decides its fate per on_error.
            return Ok(step_id);
        }
        info!(step = ctx.step_name, action = %self.action, job_id = %step_id, "step launched");
        Ok(step_id)
    }
}

/// Registry of Step Managers by `action` (§9 registries owned by `App`).
#[derive(Clone)]
pub struct StepManagerRegistry<C: Clock> {
    managers: HashMap<String, Arc<dyn StepManager>>,
    _clock: std::marker::PhantomData<C>,
}

impl<C: Clock + 'static> StepManagerRegistry<C> {
    pub fn new() -> Self {
        Self { managers: HashMap::new(), _clock: std::marker::PhantomData }
    }

    pub fn register(&mut self, manager: Arc<dyn StepManager>) {
        self.managers.insert(manager.manager_type().to_string(), manager);
    }

    pub fn get(&self, action: &str) -> Option<Arc<dyn StepManager>> {
        self.managers.get(action).cloned()
    }
}

impl<C: Clock + 'static> Default for StepManagerRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// The ten canonical action kinds named in §4.F, each wired to the
/// enumeration strategy matching its §4.F step-4 category.
pub fn standard_registry<C: Clock + 'static>(
    manager: JobManager<C>,
    docs: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthStore>,
) -> StepManagerRegistry<C> {
    use crate::enumerator::{FilterQueryEnumerator, SeedListEnumerator, SingleTaskEnumerator};

    let mut registry = StepManagerRegistry::new();
    let seed_actions = ["crawler", "search", "places_search", "github_repo", "github_log", "web_search"];
    for action in seed_actions {
        registry.register(Arc::new(ActionStepManager::new(
            action,
            Arc::new(SeedListEnumerator),
            &[],
            manager.clone(),
            docs.clone(),
            auth.clone(),
        )));
    }
    for action in ["agent", "transform"] {
        registry.register(Arc::new(ActionStepManager::new(
            action,
            Arc::new(FilterQueryEnumerator),
            &[],
            manager.clone(),
            docs.clone(),
            auth.clone(),
        )));
    }
    for action in ["database_maintenance", "reindex"] {
        registry.register(Arc::new(ActionStepManager::new(
            action,
            Arc::new(SingleTaskEnumerator),
            &[],
            manager.clone(),
            docs.clone(),
            auth.clone(),
        )));
    }
    registry
}

#[cfg(test)]
#[path = "step_manager_tests.rs"]
mod tests;
