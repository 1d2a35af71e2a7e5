// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job Definition Orchestrator (spec §4.G): topologically orders steps,
//! creates the root manager job, and launches each step in dependency
//! order, deferring steps whose predecessors haven't finished.
//!
//! Launching is asynchronous: [`JobDefinitionOrchestrator::execute`] returns
//! the manager job id immediately (§4.G "Return value to the caller:
//! `managerJobID`; the HTTP layer responds 202 Accepted immediately") and
//! drives the rest of the DAG on a spawned task.

use std::collections::{HashMap, HashSet};

use quaero_bus::EventBus;
use quaero_config::{JobDefinition, OnError};
use quaero_core::{metadata_keys, Clock, Event, JobConfig, JobId, JobStatus};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::manager::JobManager;
use crate::monitor::StateMonitor;
use crate::step_manager::{StepContext, StepManagerRegistry};

#[derive(Clone)]
pub struct JobDefinitionOrchestrator<C: Clock> {
    manager: JobManager<C>,
    step_managers: StepManagerRegistry<C>,
    bus: EventBus,
}

impl<C: Clock + Send + Sync + 'static> JobDefinitionOrchestrator<C> {
    pub fn new(manager: JobManager<C>, step_managers: StepManagerRegistry<C>, bus: EventBus) -> Self {
        Self { manager, step_managers, bus }
    }

    /// Validates the definition, creates the manager job, and spawns the
    /// background task that drives steps to completion (§4.G steps 1-5).
    pub async fn execute(&self, definition: JobDefinition) -> EngineResult<JobId> {
        definition.validate().map_err(|e| EngineError::Validation(e.to_string()))?;
        let order = definition.topological_order().map_err(|e| EngineError::Validation(e.to_string()))?;
        for spec in definition.step.values() {
            if self.step_managers.get(&spec.action).is_none() {
                return Err(EngineError::UnknownAction(spec.action.clone()));
            }
        }

        let manager_job = self.manager.create_job(
            JobConfig::new("manager", definition.name.clone())
                .with_metadata(metadata_keys::STEP_DEFINITIONS, step_definitions_json(&definition))
                .with_metadata(metadata_keys::ALL_STEPS_LAUNCHED, false),
        )?;
        let manager_id = manager_job.id;

        let orchestrator = self.clone();
        tokio::spawn(async move {
            orchestrator.drive(manager_id, definition, order).await;
        });
        Ok(manager_id)
    }

    /// Drives the DAG to completion: launches steps as their dependencies
    /// resolve, applies `on_error` policy, and retries once when requested
    /// (§4.G step 4, SPEC_FULL §C.3 "retry... capped at 1").
    async fn drive(&self, manager_id: JobId, definition: JobDefinition, order: Vec<String>) {
        let Some(mut status_sub) = self.bus.subscribe("job_status_change") else { return };
        let monitor = StateMonitor::new(self.manager.clone());

        let mut launched: HashMap<String, JobId> = HashMap::new();
        let mut terminal: HashMap<String, JobStatus> = HashMap::new();
        // Steps that will never be spawned because a predecessor with
        // `on_error = fail` (or `cancel`) ended that way (§4.G step 4,
        // Scenario S3 "b is never spawned"). Distinct from `terminal`
        // because no job row was ever created for these.
        let mut skipped: HashSet<String> = HashSet::new();
        let mut retried: HashSet<String> = HashSet::new();
        let mut all_launched_announced = false;

        loop {
            for step_name in &order {
                if launched.contains_key(step_name) || terminal.contains_key(step_name) || skipped.contains(step_name)
                {
                    continue;
                }
                let spec = &definition.step[step_name];
                let mut waiting = false;
                let mut blocked = false;
                for dep in &spec.depends {
                    if skipped.contains(dep) {
                        blocked = true;
                        continue;
                    }
                    match terminal.get(dep) {
                        Some(JobStatus::Completed) => {}
                        Some(JobStatus::Failed)
                            if definition.step.get(dep).map(|s| s.on_error) == Some(OnError::Continue) => {}
                        Some(_) => blocked = true,
                        None => waiting = true,
                    }
                }
                if blocked {
                    skipped.insert(step_name.clone());
                    continue;
                }
                if waiting {
                    continue;
                }
                match self.step_managers.get(&spec.action) {
                    Some(step_manager) => {
                        let step_id = step_manager
                            .create_parent_job(StepContext {
                                manager_job_id: manager_id,
                                step_name,
                                spec,
                                step_definitions: &definition.step,
                            })
                            .await;
                        match step_id {
                            Ok(id) => {
                                let _ = self.manager.store().set_metadata(
                                    manager_id,
                                    metadata_keys::CURRENT_STEP_NAME,
                                    step_name.clone(),
                                );
                                launched.insert(step_name.clone(), id);
                            }
                            Err(err) => {
                                warn!(step = %step_name, error = %err, "step launch failed");
                                terminal.insert(step_name.clone(), JobStatus::Failed);
                            }
                        }
                    }
                    None => {
                        terminal.insert(step_name.clone(), JobStatus::Failed);
                    }
                }
            }

            // §4.H step 4's "spawn completed" guard, surfaced for the
            // Monitor: true once every step has either been launched (its
            // job row exists, whatever its current status) or is
            // permanently skipped. The Monitor must not compute the
            // manager's terminal status before this is set, or it can
            // observe a transient quiescent moment between two sequential
            // step launches (§4.H, Invariant 4).
            if !all_launched_announced
                && order.iter().all(|step_name| launched.contains_key(step_name) || skipped.contains(step_name))
            {
                all_launched_announced = true;
                let _ = self.manager.store().set_metadata(manager_id, metadata_keys::ALL_STEPS_LAUNCHED, true);
                // A step launched (or failed to launch) synchronously within
                // this same pass can reach a terminal status before the
                // Monitor's own subscription gets scheduled to see it; give
                // it an immediate, race-free recheck rather than waiting on
                // that event to be independently picked up.
                monitor.advance(manager_id);
            }

            if order.iter().all(|step_name| skipped.contains(step_name) || terminal.contains_key(step_name)) {
                break;
            }

            let Some(event) = status_sub.recv().await else { break };
            let Event::JobStatusChange { job_id, status, .. } = event else { continue };
            if !status.is_terminal() {
                continue;
            }
            let Some(step_name) = launched.iter().find(|(_, id)| **id == job_id).map(|(n, _)| n.clone()) else {
                continue;
            };

            if status == JobStatus::Failed
                && definition.step.get(&step_name).map(|s| s.on_error) == Some(OnError::Retry)
                && retried.insert(step_name.clone())
            {
                info!(step = %step_name, "retrying failed step once");
                launched.remove(&step_name);
                continue;
            }
            terminal.insert(step_name, status);
        }
    }
}

fn step_definitions_json(definition: &JobDefinition) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = definition
        .step
        .iter()
        .map(|(name, spec)| {
            serde_json::json!({
                "step_name": name,
                "action": spec.action,
                "depends": spec.depends,
                "on_error": match spec.on_error {
                    OnError::Fail => "fail",
                    OnError::Continue => "continue",
                    OnError::Retry => "retry",
                },
            })
        })
        .collect();
    serde_json::Value::Array(entries)
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
