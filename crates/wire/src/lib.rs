// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Wire DTOs for the HTTP and WebSocket surface (§6 External Interfaces).
//!
//! Unlike the rest of the workspace, this crate only depends on
//! `quaero-core`: everything here is a serializable view type plus a
//! handful of pure transforms, built to be consumed by `quaero-daemon`'s
//! axum handlers and by any HTTP client of the daemon. No job-store or
//! event-bus access lives here.

pub mod auth;
pub mod http_error;
pub mod job;
pub mod log;
pub mod request;
pub mod tree;
pub mod ws;

pub use auth::auth_redirect_location;
pub use http_error::{ErrorBody, ErrorKind};
pub use job::{CancelResponse, JobListResponse, JobView};
pub use log::{LogEntryView, LogPageView};
pub use request::{ExecuteResponse, JobListQuery, QuickCrawlRequest};
pub use tree::{JobTreeView, StepView};
pub use ws::WsFrame;
