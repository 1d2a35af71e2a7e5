// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The server instance beacon (spec §4.I): a fresh opaque id generated once
//! per process start, carried on every WebSocket `status` frame so clients
//! can detect a restart and purge stale job ids (§6, Scenario S5).

use quaero_bus::EventBus;
use quaero_core::Event;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ServerInstance {
    id: String,
}

impl ServerInstance {
    /// Generates a fresh instance id. Called exactly once at process startup
    /// (§9 "Global state: only the registries... and the instance id").
    pub fn new() -> Self {
        Self { id: Uuid::new_v4().to_string() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Publishes the `status` beacon (§4.I). The daemon's WebSocket layer
    /// re-sends this payload on every new client connection in addition to
    /// whatever this publish reaches.
    pub fn publish(&self, bus: &EventBus, timestamp_ms: u64) {
        bus.publish(Event::Status { server_instance_id: self.id.clone(), timestamp_ms });
    }
}

impl Default for ServerInstance {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_instances_never_collide() {
        assert_ne!(ServerInstance::new().id(), ServerInstance::new().id());
    }

    #[tokio::test]
    async fn publish_reaches_a_status_subscriber() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe("status").expect("subscribe");
        let instance = ServerInstance::new();
        instance.publish(&bus, 42);
        let event = sub.recv().await.expect("event");
        match event {
            Event::Status { server_instance_id, timestamp_ms } => {
                assert_eq!(server_instance_id, instance.id());
                assert_eq!(timestamp_ms, 42);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
