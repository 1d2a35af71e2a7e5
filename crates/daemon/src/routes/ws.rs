// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /ws` (§6 "WebSocket: server pushes typed frames `{type, payload}`").
//!
//! Every client connection fans in from its own set of per-topic bus
//! subscriptions into one outbound stream, mirroring the engine's own
//! `tokio::select!`-over-subscriptions shape (`processor.rs`, `monitor.rs`).

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use quaero_core::{Clock, Event};
use quaero_wire::WsFrame;
use tokio::sync::mpsc;
use tracing::debug;

use crate::state::AppState;

/// Every topic a connected client is fanned in from.
const TOPICS: &[&str] = &[
    "job_created",
    "job_status_change",
    "job_completed",
    "job_failed",
    "job_cancelled",
    "job_log",
    "job_spawn",
    "parent_job_progress",
    "crawler_job_progress",
    "refresh_logs",
    "refresh_step_logs",
    "status",
    "document_saved",
    "link_discovered",
];

pub async fn handler<C: Clock + Send + Sync + 'static>(
    State(state): State<AppState<C>>,
    upgrade: WebSocketUpgrade,
) -> Response {
    upgrade.on_upgrade(move |socket| run::<C>(socket, state))
}

async fn run<C: Clock + Send + Sync + 'static>(mut socket: WebSocket, state: AppState<C>) {
    let (tx, mut rx) = mpsc::channel::<Event>(256);
    let mut forwarders = Vec::new();
    for topic in TOPICS {
        let Some(mut sub) = state.app.bus.subscribe(*topic) else { break };
        let tx = tx.clone();
        forwarders.push(tokio::spawn(async move {
            while let Some(event) = sub.recv().await {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        }));
    }
    drop(tx);

    // Catch-up beacon so a freshly connected client learns the current
    // server instance id without waiting for the next restart (§4.I).
    let beacon = WsFrame::from_event(&Event::Status {
        server_instance_id: state.app.instance.id().to_string(),
        timestamp_ms: state.app.manager.store().epoch_ms(),
    });
    if send_frame(&mut socket, &beacon).await.is_err() {
        abort_all(forwarders);
        return;
    }

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                let frame = WsFrame::from_event(&event);
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        debug!(%err, "websocket client error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
    abort_all(forwarders);
}

fn abort_all(forwarders: Vec<tokio::task::JoinHandle<()>>) {
    for handle in forwarders {
        handle.abort();
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &WsFrame) -> Result<(), axum::Error> {
    let text = serde_json::to_string(frame).unwrap_or_else(|_| "{}".to_string());
    socket.send(Message::Text(text)).await
}
