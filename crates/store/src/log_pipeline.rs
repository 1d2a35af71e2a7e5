// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Log Pipeline (spec §4.B): a two-stage pipeline turning domain log
//! calls into persisted rows plus a debounced UI refresh beacon.
//!
//! Stage 1 (Normalizer + Persister) is synchronous and lives on
//! [`LogPipeline::add_job_log`]. Stage 2 (Refresh Aggregator) is a pair of
//! background tasks ticking at a fixed cadence; spawn them with
//! [`LogPipeline::spawn_refresh_aggregator`] and
//! [`LogPipeline::spawn_step_refresh_aggregator`].
//!
//! Functions in this module that publish `refresh_logs`/`refresh_step_logs`
//! must never themselves call `add_job_log` — that would loop
//! log -> log_event -> flag -> refresh_logs -> (logged) -> log_event (§4.B).

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use quaero_bus::EventBus;
use quaero_core::{Clock, Event, JobId, LogLevel};

use crate::error::StoreError;
use crate::job_store::JobStore;

/// Aggregator tick cadence (§4.B: "a single goroutine/actor ticks at a
/// 1-second cadence").
pub const REFRESH_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct LogPipelineConfig {
    /// Logs at or above this level, after normalization, are mirrored onto
    /// the bus as `log_event` (§4.B stage 1 step iv).
    pub min_event_level: LogLevel,
}

impl Default for LogPipelineConfig {
    fn default() -> Self {
        Self { min_event_level: LogLevel::Debug }
    }
}

/// Stage 1: normalize, persist, resolve context, conditionally mirror to the
/// bus. Cheaply cloneable.
#[derive(Clone)]
pub struct LogPipeline<C: Clock> {
    store: JobStore<C>,
    bus: EventBus,
    config: LogPipelineConfig,
}

impl<C: Clock + 'static> LogPipeline<C> {
    pub fn new(store: JobStore<C>, bus: EventBus, config: LogPipelineConfig) -> Self {
        Self { store, bus, config }
    }

    /// `addJobLog(ctx, jobID, level, message)` (§4.B stage 1).
    pub fn add_job_log(&self, job_id: JobId, level: &str, message: impl Into<String>) -> Result<(), StoreError> {
        let message = message.into();
        let normalized = LogLevel::normalize(level);
        let context = self.store.resolve_job_context(job_id);
        let entry = self.store.append_log(job_id, normalized, message.clone())?;
        if normalized.rank() >= self.config.min_event_level.rank() {
            self.bus.publish(Event::LogEvent {
                job_id,
                parent_job_id: context.parent_job_id,
                manager_id: context.manager_id,
                step_name: context.step_name,
                level: normalized,
                message,
                timestamp_ms: entry.timestamp_ms,
            });
        }
        Ok(())
    }

    /// Spawns the process-wide refresh aggregator (§4.B stage 2, first
    /// paragraph). Subscribes to `log_event`, sets a flag on each arrival,
    /// and on each 1s tick emits `refresh_logs` only if the flag was set,
    /// then clears it. Returns a handle whose drop aborts the task.
    pub fn spawn_refresh_aggregator(&self) -> RefreshAggregatorHandle {
        let bus = self.bus.clone();
        let pending = Arc::new(AtomicBool::new(false));
        let pending_for_sub = pending.clone();
        let mut log_sub = match bus.subscribe("log_event") {
            Some(sub) => sub,
            None => return RefreshAggregatorHandle { task: None },
        };
        tokio::spawn(async move {
            while let Some(_event) = log_sub.recv().await {
                pending_for_sub.store(true, Ordering::Release);
            }
        });
        let store = self.store.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REFRESH_TICK);
            loop {
                ticker.tick().await;
                if pending.swap(false, Ordering::AcqRel) {
                    bus.publish(Event::RefreshLogs { timestamp_ms: store.epoch_ms() });
                }
            }
        });
        RefreshAggregatorHandle { task: Some(task) }
    }

    /// Spawns the per-job variant (§4.B "A parallel `refresh_step_logs`
    /// aggregator keys pending sets by `job_id`"). Emits a `refresh_step_logs`
    /// for each job that had activity within the window, then clears it.
    pub fn spawn_step_refresh_aggregator(&self) -> RefreshAggregatorHandle {
        let bus = self.bus.clone();
        let pending: Arc<Mutex<HashSet<JobId>>> = Arc::new(Mutex::new(HashSet::new()));
        let pending_for_sub = pending.clone();
        let mut log_sub = match bus.subscribe("log_event") {
            Some(sub) => sub,
            None => return RefreshAggregatorHandle { task: None },
        };
        tokio::spawn(async move {
            while let Some(event) = log_sub.recv().await {
                if let Some(job_id) = event.job_id() {
                    pending_for_sub.lock().insert(job_id);
                }
            }
        });
        let store = self.store.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REFRESH_TICK);
            loop {
                ticker.tick().await;
                let due: Vec<JobId> = std::mem::take(&mut *pending.lock()).into_iter().collect();
                for job_id in due {
                    bus.publish(Event::RefreshStepLogs { job_id, timestamp_ms: store.epoch_ms() });
                }
            }
        });
        RefreshAggregatorHandle { task: Some(task) }
    }
}

/// Owns a spawned aggregator task; dropping it cancels the task
/// (§4.B "Cancellation/timeout: aggregators stop on bus close").
pub struct RefreshAggregatorHandle {
    task: Option<tokio::task::JoinHandle<()>>,
}

impl Drop for RefreshAggregatorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "log_pipeline_tests.rs"]
mod tests;
