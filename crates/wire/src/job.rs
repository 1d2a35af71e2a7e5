// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job-shaped HTTP response DTOs (§6 `GET /api/jobs/{id}`, `GET /api/jobs?...`).

use quaero_core::{ChildStats, Job, JobId, JobStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The wire shape of a [`Job`] row, independent of its level in the
/// manager/step/leaf hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobView {
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

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            parent_id: job.parent_id,
            job_type: job.job_type.clone(),
            name: job.name.clone(),
            status: job.status,
            created_at_ms: job.created_at_ms,
            started_at_ms: job.started_at_ms,
            finished_at_ms: job.finished_at_ms,
            stats: job.stats,
            document_count: job.document_count,
            metadata: job.metadata.clone(),
        }
    }
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self::from(&job)
    }
}

/// `GET /api/jobs?parent_id=X&status=...` response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobListResponse {
    pub jobs: Vec<JobView>,
}

/// `POST /api/jobs/{id}/cancel` response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancelResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}
