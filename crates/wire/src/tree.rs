// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tree-view response shapes (§4.G "Tree view construction", §6
//! `GET /api/jobs/{id}/tree`).
//!
//! The actual construction — walking step definitions in order, pulling each
//! step's job row and log tail, deciding which steps start "expanded" — is a
//! daemon-side concern with direct Job Store access. This module only fixes
//! the shape the daemon assembles into and serializes.

use quaero_core::{ChildStats, JobId, JobStatus};
use serde::{Deserialize, Serialize};

use crate::job::JobView;
use crate::log::LogPageView;

/// One step's worth of tree view, in step-definition order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepView {
    pub step_name: String,
    /// `None` until the step's job has been created (§4.D: steps run in
    /// sequence, so unreached steps have no row yet).
    pub job_id: Option<JobId>,
    pub status: Option<JobStatus>,
    pub stats: ChildStats,
    pub logs: LogPageView,
    /// Whether the client should render this step's log tail open by
    /// default (§4.G: the running step, or the first failed step).
    pub expanded: bool,
}

impl StepView {
    pub fn new(
        step_name: impl Into<String>,
        job_id: Option<JobId>,
        status: Option<JobStatus>,
        stats: ChildStats,
        logs: LogPageView,
        expanded: bool,
    ) -> Self {
        Self { step_name: step_name.into(), job_id, status, stats, logs, expanded }
    }
}

/// `GET /api/jobs/{id}/tree` response body: the manager job plus its steps
/// in definition order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobTreeView {
    pub manager: JobView,
    pub steps: Vec<StepView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaero_core::{Job, JobConfig};

    #[test]
    fn tree_view_round_trips_through_json() {
        let manager = Job::new(JobConfig::new("manager", "m"), 0);
        let tree = JobTreeView {
            manager: JobView::from(&manager),
            steps: vec![StepView::new(
                "crawl",
                None,
                None,
                ChildStats::default(),
                LogPageView::new(vec![], 0),
                false,
            )],
        };
        let json = serde_json::to_string(&tree).expect("serialize");
        let parsed: JobTreeView = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, tree);
    }
}
