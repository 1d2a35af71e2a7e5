// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quaero-store: the Job Store (§4.C) and Log Pipeline (§4.B).
//!
//! The Job Store exclusively owns all job rows and logs (§3 "Ownership").
//! Everything here is in-process: parent/child relationships are
//! maintained as indices, not an in-memory object graph (§9), so
//! cancellation cascades and aggregation are plain index lookups rather
//! than pointer-chasing through owned trees.

pub mod error;
pub mod job_store;
pub mod log_pipeline;

pub use error::StoreError;
pub use job_store::{JobContext, JobFilter, JobStore, LogPage, LogQuery};
pub use log_pipeline::{LogPipeline, LogPipelineConfig, RefreshAggregatorHandle, REFRESH_TICK};
