// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work-item enumeration strategies (spec §4.F step 4).
//!
//! "For *filter-based* actions (agent, transform), this is a query over the
//! Document Store... For *seed-based* actions (crawler, places_search), it
//! is derived from configured seeds." A third, administrative shape covers
//! `database_maintenance`/`reindex`, which take no input and always spawn
//! exactly one child.

use std::collections::HashMap;

use async_trait::async_trait;
use quaero_config::StepSpec;
use serde_json::Value;

use crate::collaborators::DocumentStore;
use crate::error::{EngineError, EngineResult};

/// One work item; becomes the metadata of a spawned child job.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub name: String,
    pub metadata: HashMap<String, Value>,
}

impl WorkItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), metadata: HashMap::new() }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Enumerates the work items for one step run (§4.F step 4).
#[async_trait]
pub trait WorkEnumerator: Send + Sync {
    /// Options that must be present on the `StepSpec` for this action,
    /// validated by the Step Manager before any child is created
    /// (§4.F step 2, §7 "Validation failure").
    fn required_options(&self) -> &'static [&'static str];

    async fn enumerate(&self, spec: &StepSpec, docs: &dyn DocumentStore) -> EngineResult<Vec<WorkItem>>;
}

/// Seed-based enumeration (§4.F step 4): one work item per entry of the
/// `start_urls` array, each carrying `url` in its metadata.
pub struct SeedListEnumerator;

#[async_trait]
impl WorkEnumerator for SeedListEnumerator {
    fn required_options(&self) -> &'static [&'static str] {
        &["start_urls"]
    }

    async fn enumerate(&self, spec: &StepSpec, _docs: &dyn DocumentStore) -> EngineResult<Vec<WorkItem>> {
        let urls = spec.option_array("start_urls");
        if urls.is_empty() {
            return Err(EngineError::Validation(
                "start_urls must contain at least one entry".to_string(),
            ));
        }
        Ok(urls.into_iter().enumerate().map(|(i, url)| WorkItem::new(format!("seed-{i}")).with("url", url)).collect())
    }
}

/// Filter-based enumeration (§4.F step 4): queries the Document Store with
/// `filter_tags`, `filter_created_after`, `filter_updated_after`, and
/// `filter_limit`, one work item per document returned.
pub struct FilterQueryEnumerator;

#[async_trait]
impl WorkEnumerator for FilterQueryEnumerator {
    fn required_options(&self) -> &'static [&'static str] {
        &[]
    }

    async fn enumerate(&self, spec: &StepSpec, docs: &dyn DocumentStore) -> EngineResult<Vec<WorkItem>> {
        let tags = spec.option_array("filter_tags");
        let created_after = spec.option_u64("filter_created_after");
        let updated_after = spec.option_u64("filter_updated_after");
        let limit = spec.option_u64("filter_limit").map(|l| l as usize);
        let found = docs.query(&tags, created_after, updated_after, limit).await;
        Ok(found.into_iter().map(|doc| WorkItem::new(doc.id).with("document", doc.payload)).collect())
    }
}

/// Administrative enumeration (§4.F, `database_maintenance`/`reindex`):
/// takes no input and always produces exactly one work item.
pub struct SingleTaskEnumerator;

#[async_trait]
impl WorkEnumerator for SingleTaskEnumerator {
    fn required_options(&self) -> &'static [&'static str] {
        &[]
    }

    async fn enumerate(&self, _spec: &StepSpec, _docs: &dyn DocumentStore) -> EngineResult<Vec<WorkItem>> {
        Ok(vec![WorkItem::new("task")])
    }
}
