// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use quaero_config::ConfigError;
use quaero_core::JobId;
use quaero_store::StoreError;
use thiserror::Error;

/// Aggregated engine error (SPEC_FULL §B): every leaf error converts in via
/// `#[from]` so call sites can propagate with `?` through Orchestrator, Step
/// Manager, and Processor code alike.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown action \"{0}\"; no Step Manager registered for it")]
    UnknownAction(String),

    #[error("unknown worker type \"{0}\"; no Worker registered for it")]
    UnknownWorkerType(String),

    #[error("step \"{0}\" spawn failed: {1}")]
    SpawnFailed(String, String),

    #[error("auth credential \"{0}\" could not be resolved")]
    AuthNotResolved(String),

    #[error("job definition is invalid: {0}")]
    Validation(String),

    #[error("job {0} not found")]
    JobNotFound(JobId),
}

pub type EngineResult<T> = Result<T, EngineError>;
