// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use quaero_core::JobId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} already exists")]
    DuplicateJob(JobId),

    #[error("job {0} not found")]
    JobNotFound(JobId),

    /// §3 Invariant: terminal state is monotonic; transitions out of a
    /// terminal state are rejected.
    #[error("job {job_id} is already terminal in status {current}; cannot transition to {attempted}")]
    TerminalTransitionRejected { job_id: JobId, current: String, attempted: String },
}
