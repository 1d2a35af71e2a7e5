// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic-keyed pub/sub Event Bus (spec §4.A).
//!
//! Fan-out is non-blocking: publishers get one `try_send` attempt per
//! subscriber and never wait on a slow consumer. A full subscriber queue
//! drops the entry and bumps that subscriber's drop counter — back-pressure
//! must never propagate into workers or the log pipeline (§4.A rationale,
//! §7 "Bus overflow").

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use quaero_core::Event;
use tokio::sync::mpsc;

/// Queue capacity for the high-volume log topics (§4.A).
const LOG_TOPIC_CAPACITY: usize = 2000;
/// Queue capacity for every other ("control") topic.
const CONTROL_TOPIC_CAPACITY: usize = 256;

fn capacity_for(topic: &str) -> usize {
    match topic {
        "job_log" | "log_event" => LOG_TOPIC_CAPACITY,
        _ => CONTROL_TOPIC_CAPACITY,
    }
}

struct Subscriber {
    id: u64,
    sender: mpsc::Sender<Event>,
}

struct BusState {
    subscribers: HashMap<String, Vec<Subscriber>>,
    closed: bool,
}

/// The Event Bus. Cheaply cloneable; all clones share the same subscriber
/// table.
#[derive(Clone)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
    next_id: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState { subscribers: HashMap::new(), closed: false })),
            next_id: Arc::new(AtomicU64::new(1)),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to a topic (e.g. `"job_status_change"`, `"log_event"`).
    /// Returns `None` once the bus has been closed.
    pub fn subscribe(&self, topic: impl Into<String>) -> Option<Subscription> {
        let topic = topic.into();
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(capacity_for(&topic));
        state.subscribers.entry(topic.clone()).or_default().push(Subscriber { id, sender });
        Some(Subscription { topic, id, receiver, bus: self.clone() })
    }

    fn unsubscribe(&self, topic: &str, id: u64) {
        let mut state = self.state.lock();
        if let Some(subs) = state.subscribers.get_mut(topic) {
            subs.retain(|s| s.id != id);
        }
    }

    /// Non-blocking fan-out: one `try_send` per subscriber of `event.topic()`.
    /// A full queue drops the event and increments the global drop counter;
    /// a subscriber whose receiver has been dropped is pruned.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        let Some(subs) = state.subscribers.get_mut(topic) else { return };
        subs.retain_mut(|sub| match sub.sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(topic, "event bus subscriber queue full, dropping");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    /// Same fan-out as `publish`, but awaits delivery to every current
    /// subscriber. Used only by tests (§4.A) that need to observe an event
    /// deterministically before asserting on it.
    pub async fn publish_sync(&self, event: Event) {
        let topic = event.topic();
        let senders: Vec<mpsc::Sender<Event>> = {
            let state = self.state.lock();
            if state.closed {
                return;
            }
            state.subscribers.get(topic).map(|subs| subs.iter().map(|s| s.sender.clone()).collect()).unwrap_or_default()
        };
        for sender in senders {
            let _ = sender.send(event.clone()).await;
        }
    }

    /// Drains subscriber tables and refuses further publishes/subscribes.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.subscribers.clear();
        state.closed = true;
    }

    /// Total events dropped bus-wide for overflowing a subscriber queue
    /// (§7 "Bus overflow: counted, not surfaced").
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// A live subscription: a bounded receiver plus an explicit unsubscribe.
pub struct Subscription {
    topic: String,
    id: u64,
    receiver: mpsc::Receiver<Event>,
    bus: EventBus,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn unsubscribe(self) {
        self.bus.unsubscribe(&self.topic, self.id);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.topic, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaero_core::JobId;

    fn sample_event() -> Event {
        Event::JobStatusChange {
            job_id: JobId::new(),
            status: quaero_core::JobStatus::Running,
            timestamp_ms: 0,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_event_on_matching_topic() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe("job_status_change").unwrap();
        bus.publish(sample_event());
        let received = sub.recv().await.unwrap();
        assert_eq!(received.topic(), "job_status_change");
    }

    #[tokio::test]
    async fn subscriber_on_other_topic_does_not_receive() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe("job_completed").unwrap();
        bus.publish(sample_event());
        let outcome = tokio::time::timeout(std::time::Duration::from_millis(50), sub.recv()).await;
        assert!(outcome.is_err(), "no event should have arrived on an unrelated topic");
    }

    #[tokio::test]
    async fn single_subscriber_sees_fifo_order() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe("job_status_change").unwrap();
        for i in 0..5u64 {
            bus.publish(Event::JobStatusChange {
                job_id: JobId::new(),
                status: quaero_core::JobStatus::Running,
                timestamp_ms: i,
            });
        }
        let mut seen = Vec::new();
        for _ in 0..5 {
            if let Some(Event::JobStatusChange { timestamp_ms, .. }) = sub.recv().await {
                seen.push(timestamp_ms);
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn full_queue_drops_and_counts_without_blocking_publisher() {
        let bus = EventBus::new();
        let _sub = bus.subscribe("job_completed").unwrap();
        // job_completed is a control topic, capacity 256; overflow it.
        for _ in 0..300 {
            bus.publish(Event::JobCompleted { job_id: JobId::new(), timestamp_ms: 0 });
        }
        assert!(bus.dropped_count() > 0);
    }

    #[tokio::test]
    async fn unsubscribe_stops_further_delivery() {
        let bus = EventBus::new();
        let sub = bus.subscribe("job_completed").unwrap();
        sub.unsubscribe();
        // No subscribers left; publish must not panic or block.
        bus.publish(Event::JobCompleted { job_id: JobId::new(), timestamp_ms: 0 });
    }

    #[tokio::test]
    async fn closed_bus_refuses_subscribe_and_publish() {
        let bus = EventBus::new();
        bus.close();
        assert!(bus.subscribe("job_completed").is_none());
        // Should be a silent no-op, not a panic.
        bus.publish(Event::JobCompleted { job_id: JobId::new(), timestamp_ms: 0 });
    }

    #[tokio::test]
    async fn publish_sync_delivers_to_all_current_subscribers() {
        let bus = EventBus::new();
        let mut sub_a = bus.subscribe("job_completed").unwrap();
        let mut sub_b = bus.subscribe("job_completed").unwrap();
        bus.publish_sync(Event::JobCompleted { job_id: JobId::new(), timestamp_ms: 0 }).await;
        assert!(sub_a.recv().await.is_some());
        assert!(sub_b.recv().await.is_some());
    }
}
