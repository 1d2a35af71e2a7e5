// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Job` row and its status/progress bookkeeping (spec §3).
//!
//! A `Job` is a node in a strictly three-level forest: manager job -> step
//! jobs -> child/leaf jobs. The same struct represents all three levels;
//! which level a row occupies is inferred from `parent_id` and whether
//! `metadata` carries a `step_name` key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::JobId;

/// Well-known metadata keys (§3 `Job.metadata`).
pub mod metadata_keys {
    pub const STEP_DEFINITIONS: &str = "step_definitions";
    pub const STEP_NAME: &str = "step_name";
    pub const CURRENT_STEP_NAME: &str = "current_step_name";
    pub const DOCUMENT_COUNT: &str = "document_count";
    pub const JOB_DEFINITION_ID: &str = "job_definition_id";
    pub const AUTH_ID: &str = "auth_id";

    /// Set by the Job Definition Orchestrator on a manager job once every
    /// step in its DAG has been either launched or permanently skipped
    /// (§4.G, §4.H step 4 "spawn completed"). Manager `child_count` grows
    /// incrementally as steps launch one at a time, so the Monitor must not
    /// treat a manager as quiescent from `ChildStats` alone — it also
    /// checks this flag, set only after the Orchestrator stops launching.
    pub const ALL_STEPS_LAUNCHED: &str = "all_steps_launched";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl JobStatus {
    /// A job is terminal iff its status is one of these three (§3 Invariants).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

/// Child-status counters maintained by the Monitor via `recomputeChildStats`
/// (§4.C, §4.H). All fields are coalesced to 0 — a parent with no children
/// yet still reports a fully-populated, zeroed struct rather than nulls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildStats {
    pub child_count: u32,
    pub pending_children: u32,
    pub running_children: u32,
    pub completed_children: u32,
    pub failed_children: u32,
    pub cancelled_children: u32,
}

impl ChildStats {
    /// §8 Invariant 1: `child_count >= pending+running+completed+failed+cancelled`.
    pub fn spawned_total(&self) -> u32 {
        self.pending_children
            + self.running_children
            + self.completed_children
            + self.failed_children
            + self.cancelled_children
    }

    /// True once every announced child has finished spawning and none are
    /// still pending or running (§4.H step 4's "spawn completed" guard).
    pub fn is_quiescent(&self) -> bool {
        self.pending_children == 0
            && self.running_children == 0
            && self.spawned_total() == self.child_count
    }
}

/// Configuration used to create a new [`Job`] row.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub id: JobId,
    pub parent_id: Option<JobId>,
    pub job_type: String,
    pub name: String,
    pub metadata: HashMap<String, Value>,
}

impl JobConfig {
    pub fn new(job_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            parent_id: None,
            job_type: job_type.into(),
            name: name.into(),
            metadata: HashMap::new(),
        }
    }

    crate::setters! {
        set { id: JobId }
        option { parent_id: JobId }
        into { job_type: String, name: String }
        set { metadata: HashMap<String, Value> }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A row in the Job Store (§3 `Job`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub parent_id: Option<JobId>,
    pub job_type: String,
    pub name: String,
    pub status: JobStatus,
    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub finished_at_ms: Option<u64>,
    pub stats: ChildStats,
    pub document_count: u64,
    pub metadata: HashMap<String, Value>,
}

impl Job {
    pub fn new(config: JobConfig, created_at_ms: u64) -> Self {
        Self {
            id: config.id,
            parent_id: config.parent_id,
            job_type: config.job_type,
            name: config.name,
            status: JobStatus::Pending,
            created_at_ms,
            started_at_ms: None,
            finished_at_ms: None,
            stats: ChildStats::default(),
            document_count: 0,
            metadata: config.metadata,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// A job is a "step job" iff its metadata carries a `step_name` (Glossary).
    pub fn step_name(&self) -> Option<&str> {
        self.metadata.get(metadata_keys::STEP_NAME).and_then(Value::as_str)
    }

    pub fn is_manager(&self) -> bool {
        self.job_type == "manager"
    }

    crate::builder! {
        pub struct JobBuilder => Job {
            set { id: JobId = JobId::new() }
            option { parent_id: JobId = None }
            into { job_type: String = "manager", name: String = "test-job" }
            set { status: JobStatus = JobStatus::Pending }
            set { created_at_ms: u64 = 0 }
            option { started_at_ms: u64 = None }
            option { finished_at_ms: u64 = None }
            set { stats: ChildStats = ChildStats::default() }
            set { document_count: u64 = 0 }
            set { metadata: HashMap<String, Value> = HashMap::new() }
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
