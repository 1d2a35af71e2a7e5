// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quaerod`: the engine's HTTP/WebSocket surface (§6), wired over an
//! in-memory `App` (§9 "no ambient singletons").
//!
//! Startup sequence: load Job Definitions and the secret key store from
//! disk, construct the `App`, run the reconciliation sweep and start the
//! Monitor, spawn one worker pool per canonical action (§4.E), then bind
//! and serve. `quaerod` is typically started directly; the `quaero` CLI
//! talks to it over HTTP rather than spawning it.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use quaero_bus::EventBus;
use quaero_config::{JobDefinitionRegistry, KeyStore};
use quaero_core::SystemClock;
use quaero_daemon::workers::register_placeholder_workers;
use quaero_daemon::{router, AppState};
use quaero_engine::{App, EmptyDocumentStore, NoAuthStore, ReconcileConfig, WorkerRegistry};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Background process that owns the event loop and dispatches work.
#[derive(Parser, Debug)]
#[command(name = "quaerod", version, about = "Quaero job scheduling daemon")]
struct Cli {
    /// Address to bind the HTTP/WebSocket surface to.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Directory of Job Definition `*.toml` files (§6 "Job Definition file").
    #[arg(long, default_value = "./job-definitions")]
    job_definitions_dir: PathBuf,

    /// Directory of secret key `*.toml` files (§6, §9 placeholder substitution).
    #[arg(long, default_value = "./keys")]
    keys_dir: PathBuf,

    /// Staleness threshold, in milliseconds, for the startup reconciliation
    /// sweep (§7, SPEC_FULL §C.1).
    #[arg(long, default_value_t = quaero_engine::reconcile::DEFAULT_STALE_THRESHOLD_MS)]
    reconcile_threshold_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let definitions = JobDefinitionRegistry::load_dir(&cli.job_definitions_dir)?;
    info!(count = definitions.all().count(), dir = %cli.job_definitions_dir.display(), "loaded job definitions");
    let keys = KeyStore::load_dir(&cli.keys_dir)?;

    let bus = EventBus::new();
    let clock = SystemClock;
    let store = quaero_store::JobStore::new(bus.clone(), clock);
    let logs = quaero_store::LogPipeline::new(store.clone(), bus.clone(), quaero_store::LogPipelineConfig::default());
    let manager = quaero_engine::JobManager::new(store, logs.clone(), bus.clone());

    let mut workers = WorkerRegistry::new();
    register_placeholder_workers(&mut workers);

    let app = App::with_standard_step_managers(
        manager,
        bus,
        workers,
        std::sync::Arc::new(EmptyDocumentStore),
        std::sync::Arc::new(NoAuthStore),
    );

    let _monitor = app.start_background_tasks(ReconcileConfig { threshold_ms: cli.reconcile_threshold_ms });
    let _refresh_logs = logs.spawn_refresh_aggregator();
    let _refresh_step_logs = logs.spawn_step_refresh_aggregator();

    let shutdown = CancellationToken::new();
    let mut pool_handles = Vec::new();
    for worker_type in quaero_daemon::workers::CANONICAL_WORKER_TYPES {
        pool_handles.extend(app.spawn_default_pool(worker_type, shutdown.clone()));
    }

    let state = AppState::new(app, definitions, keys);
    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    info!(addr = %cli.bind, "quaerod listening");

    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown_signal()).await?;

    shutdown.cancel();
    for handle in pool_handles {
        let _ = handle.await;
    }
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received shutdown signal");
}
