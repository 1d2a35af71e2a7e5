// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response bodies for the job-launching endpoints (§6).

use quaero_core::{JobId, JobStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /api/job-definitions/{id}/execute` response body (202 Accepted).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecuteResponse {
    pub job_id: JobId,
}

/// `POST /api/job-definitions/quick-crawl` request body (§6, Scenario S4).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuickCrawlRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Value>,
}

/// `GET /api/jobs?parent_id=&status=` query parameters.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct JobListQuery {
    #[serde(default)]
    pub parent_id: Option<JobId>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_crawl_request_without_cookies_omits_the_field() {
        let request = QuickCrawlRequest { url: "https://example.com".into(), cookies: None };
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(!json.contains("cookies"));
    }

    #[test]
    fn job_list_query_defaults_to_no_filters() {
        let query: JobListQuery = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(query, JobListQuery::default());
    }
}
