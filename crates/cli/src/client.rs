// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the `quaerod` surface (§6), in the style of the
//! teacher's `DaemonClient`: one thin wrapper per endpoint, a single error
//! type callers match on rather than inspecting raw reqwest errors.

use quaero_wire::{CancelResponse, ErrorBody, ExecuteResponse, JobListResponse, JobTreeView, JobView, LogPageView, QuickCrawlRequest};

#[derive(Debug)]
pub enum ClientError {
    Unreachable(String, reqwest::Error),
    Api(ErrorBody),
    Decode(reqwest::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Unreachable(base_url, err) => write!(f, "could not reach quaerod at {base_url}: {err}"),
            ClientError::Api(body) => write!(f, "{}: {}", kind_label(body.kind), body.error),
            ClientError::Decode(err) => write!(f, "unexpected response from quaerod: {err}"),
        }
    }
}

impl std::error::Error for ClientError {}

fn kind_label(kind: quaero_wire::ErrorKind) -> &'static str {
    match kind {
        quaero_wire::ErrorKind::Validation => "validation error",
        quaero_wire::ErrorKind::NotFound => "not found",
        quaero_wire::ErrorKind::Conflict => "conflict",
    }
}

/// Talks to one `quaerod` instance over HTTP (§6 External Interfaces).
pub struct DaemonClient {
    base_url: String,
    http: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn decode<T: serde::de::DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, ClientError> {
        if response.status().is_success() {
            response.json().await.map_err(ClientError::Decode)
        } else {
            let body: ErrorBody = response.json().await.map_err(ClientError::Decode)?;
            Err(ClientError::Api(body))
        }
    }

    pub async fn execute(&self, definition_id: &str) -> Result<ExecuteResponse, ClientError> {
        let url = self.url(&format!("/api/job-definitions/{definition_id}/execute"));
        let response = self.http.post(url).send().await.map_err(|e| ClientError::Unreachable(self.base_url.clone(), e))?;
        self.decode(response).await
    }

    pub async fn quick_crawl(&self, url: &str) -> Result<ExecuteResponse, ClientError> {
        let request = QuickCrawlRequest { url: url.to_string(), cookies: None };
        let endpoint = self.url("/api/job-definitions/quick-crawl");
        let response = self
            .http
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Unreachable(self.base_url.clone(), e))?;
        self.decode(response).await
    }

    pub async fn get_job(&self, job_id: &str) -> Result<JobView, ClientError> {
        let url = self.url(&format!("/api/jobs/{job_id}"));
        let response = self.http.get(url).send().await.map_err(|e| ClientError::Unreachable(self.base_url.clone(), e))?;
        self.decode(response).await
    }

    pub async fn list_jobs(&self, parent_id: Option<&str>, status: Option<&str>) -> Result<JobListResponse, ClientError> {
        let url = with_query(self.url("/api/jobs"), &[("parent_id", parent_id), ("status", status)]);
        let response = self.http.get(url).send().await.map_err(|e| ClientError::Unreachable(self.base_url.clone(), e))?;
        self.decode(response).await
    }

    pub async fn tree(&self, job_id: &str) -> Result<JobTreeView, ClientError> {
        let url = self.url(&format!("/api/jobs/{job_id}/tree"));
        let response = self.http.get(url).send().await.map_err(|e| ClientError::Unreachable(self.base_url.clone(), e))?;
        self.decode(response).await
    }

    pub async fn tree_logs(
        &self,
        job_id: &str,
        step: Option<&str>,
        level: Option<&str>,
        after: Option<u64>,
    ) -> Result<LogPageView, ClientError> {
        let after = after.map(|n| n.to_string());
        let url = with_query(
            self.url(&format!("/api/jobs/{job_id}/tree/logs")),
            &[("step", step), ("level", level), ("after", after.as_deref())],
        );
        let response = self.http.get(url).send().await.map_err(|e| ClientError::Unreachable(self.base_url.clone(), e))?;
        self.decode(response).await
    }

    pub async fn cancel(&self, job_id: &str) -> Result<CancelResponse, ClientError> {
        let url = self.url(&format!("/api/jobs/{job_id}/cancel"));
        let response = self.http.post(url).send().await.map_err(|e| ClientError::Unreachable(self.base_url.clone(), e))?;
        self.decode(response).await
    }
}

/// Appends a `?`-prefixed query string built from the present `(key, value)`
/// pairs, in order, skipping absent ones. A pure helper so the query-string
/// shape is testable without a live server.
fn with_query(mut url: String, pairs: &[(&str, Option<&str>)]) -> String {
    let mut first = true;
    for (key, value) in pairs {
        let Some(value) = value else { continue };
        url.push(if first { '?' } else { '&' });
        first = false;
        url.push_str(key);
        url.push('=');
        url.push_str(value);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_query_omits_the_separator_when_every_pair_is_absent() {
        assert_eq!(with_query("http://x/api/jobs".to_string(), &[("parent_id", None), ("status", None)]), "http://x/api/jobs");
    }

    #[test]
    fn with_query_joins_present_pairs_with_ampersands() {
        let url = with_query("http://x/api/jobs".to_string(), &[("parent_id", Some("job-1")), ("status", Some("running"))]);
        assert_eq!(url, "http://x/api/jobs?parent_id=job-1&status=running");
    }

    #[test]
    fn with_query_skips_only_the_absent_pairs() {
        let url = with_query("http://x/api/jobs".to_string(), &[("parent_id", None), ("status", Some("failed"))]);
        assert_eq!(url, "http://x/api/jobs?status=failed");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed_before_joining_the_path() {
        let client = DaemonClient::new("http://x/");
        assert_eq!(client.url("/api/jobs"), "http://x/api/jobs");
    }

    #[test]
    fn kind_label_covers_every_error_kind() {
        assert_eq!(kind_label(quaero_wire::ErrorKind::Validation), "validation error");
        assert_eq!(kind_label(quaero_wire::ErrorKind::NotFound), "not found");
        assert_eq!(kind_label(quaero_wire::ErrorKind::Conflict), "conflict");
    }
}
