// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared axum state: the `App` wiring struct plus the loaded Job
//! Definitions and secret key store, all behind one `Clone`-able handle
//! (§9 "no ambient singletons" — everything reachable from a handler comes
//! through this struct, injected by `main`).

use std::sync::Arc;

use quaero_config::{JobDefinitionRegistry, KeyStore};
use quaero_core::Clock;
use quaero_engine::App;

#[derive(Clone)]
pub struct AppState<C: Clock> {
    pub app: App<C>,
    pub definitions: Arc<JobDefinitionRegistry>,
    pub keys: Arc<KeyStore>,
}

impl<C: Clock + Send + Sync + 'static> AppState<C> {
    pub fn new(app: App<C>, definitions: JobDefinitionRegistry, keys: KeyStore) -> Self {
        Self { app, definitions: Arc::new(definitions), keys: Arc::new(keys) }
    }
}
