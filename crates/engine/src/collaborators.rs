// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Abstract seams for the engine's external collaborators (spec §1 "Out of
//! scope... concrete workers' I/O..., storage engines", §3 `AuthCredential`,
//! §4.F step 4 "Document Store").
//!
//! The engine never embeds a database or an HTTP client; it only depends on
//! these traits so `quaero-daemon` can wire in whatever the deployment needs
//! (and tests can wire in fakes).

use async_trait::async_trait;
use serde_json::Value;

/// Resolves an `auth_id` (or a named credential) to an opaque blob that
/// flows into job metadata verbatim (§4.F step 3: "the credential blob
/// flows as job metadata, not via globals"). The engine never inspects the
/// blob's shape.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn resolve(&self, auth_id: &str) -> Option<Value>;
}

/// An `AuthStore` with nothing configured; every lookup misses. Used when a
/// Job Definition has no step referencing `auth_id`.
#[derive(Default, Clone, Copy)]
pub struct NoAuthStore;

#[async_trait]
impl AuthStore for NoAuthStore {
    async fn resolve(&self, _auth_id: &str) -> Option<Value> {
        None
    }
}

/// One document/work item returned by a [`DocumentStore`] filter query
/// (§4.F step 4 "filter-based actions... enumerate results form the work
/// items").
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub id: String,
    pub payload: Value,
}

/// Abstract query surface over the Document Store (§4.F step 4). Seed-based
/// actions (`crawler`, `places_search`) don't use this; they derive work
/// items directly from configured seeds in their Step Manager.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn query(
        &self,
        filter_tags: &[String],
        filter_created_after: Option<u64>,
        filter_updated_after: Option<u64>,
        filter_limit: Option<usize>,
    ) -> Vec<DocumentRef>;
}

/// A `DocumentStore` with nothing indexed; every filter query is empty,
/// which drives the "empty input set" path (§4.F step 6).
#[derive(Default, Clone, Copy)]
pub struct EmptyDocumentStore;

#[async_trait]
impl DocumentStore for EmptyDocumentStore {
    async fn query(
        &self,
        _filter_tags: &[String],
        _filter_created_after: Option<u64>,
        _filter_updated_after: Option<u64>,
        _filter_limit: Option<usize>,
    ) -> Vec<DocumentRef> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_auth_store_always_misses() {
        assert!(NoAuthStore.resolve("anything").await.is_none());
    }

    #[tokio::test]
    async fn empty_document_store_returns_no_work_items() {
        let results = EmptyDocumentStore.query(&[], None, None, None).await;
        assert!(results.is_empty());
    }
}
