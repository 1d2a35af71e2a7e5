// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket frame envelope (§6 "WebSocket: server pushes typed frames
//! `{type, payload}`").
//!
//! [`quaero_core::Event`] already tags itself with an internally-flattened
//! `type` field for bus/storage serialization. The WebSocket wire format
//! nests the rest of the event under a `payload` key instead, so browser
//! clients can dispatch on `frame.type` without destructuring every variant.

use quaero_core::Event;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WsFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
}

impl WsFrame {
    /// Builds the envelope for one outbound frame. Falls back to an empty
    /// payload object on the unreachable case that `Event`'s own derive
    /// fails to serialize, rather than panicking in a broadcast loop.
    pub fn from_event(event: &Event) -> Self {
        let kind = event.topic().to_string();
        let mut payload = serde_json::to_value(event).unwrap_or_else(|_| Value::Object(Default::default()));
        if let Value::Object(ref mut map) = payload {
            map.remove("type");
        }
        Self { kind, payload }
    }
}
