// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The domain `Event` carried by the Event Bus (§3 `Event`, §4.A).
//!
//! Shaped after the teacher's tagged event enum: one `#[serde(tag = "type")]`
//! variant per wire event, each carrying its own correlation fields, with a
//! `topic()`/`job_id()` dispatch pair rather than a match at every call site.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::JobId;
use crate::job::JobStatus;
use crate::log::LogLevel;

/// One entry per standard event type named in spec §4.A / §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "job_created")]
    JobCreated { job_id: JobId, parent_id: Option<JobId>, job_type: String, timestamp_ms: u64 },

    #[serde(rename = "job_status_change")]
    JobStatusChange { job_id: JobId, status: JobStatus, timestamp_ms: u64 },

    #[serde(rename = "job_completed")]
    JobCompleted { job_id: JobId, timestamp_ms: u64 },

    #[serde(rename = "job_failed")]
    JobFailed { job_id: JobId, error: String, timestamp_ms: u64 },

    #[serde(rename = "job_cancelled")]
    JobCancelled { job_id: JobId, timestamp_ms: u64 },

    /// Emitted whenever a log line is appended, regardless of level
    /// threshold (§4.E "job_log on errors" is a special case of this).
    #[serde(rename = "job_log")]
    JobLog { job_id: JobId, level: LogLevel, message: String, timestamp_ms: u64 },

    #[serde(rename = "job_spawn")]
    JobSpawn { parent_job_id: JobId, child_job_id: JobId, timestamp_ms: u64 },

    #[serde(rename = "parent_job_progress")]
    ParentJobProgress {
        job_id: JobId,
        status: JobStatus,
        total_children: u32,
        pending: u32,
        running: u32,
        completed: u32,
        failed: u32,
        cancelled: u32,
        document_count: u64,
        progress_text: String,
        timestamp_ms: u64,
    },

    /// Worker-emitted, opaque payload shape (§4.E, §6).
    #[serde(rename = "crawler_job_progress")]
    CrawlerJobProgress { job_id: JobId, payload: Value, timestamp_ms: u64 },

    /// Normalizer-emitted correlation-rich log event (§4.B stage 1).
    #[serde(rename = "log_event")]
    LogEvent {
        job_id: JobId,
        parent_job_id: Option<JobId>,
        manager_id: Option<JobId>,
        step_name: Option<String>,
        level: LogLevel,
        message: String,
        timestamp_ms: u64,
    },

    /// Debounced UI refresh signal (§4.B stage 2). Carries no job id: it is
    /// a single, process-wide beacon.
    #[serde(rename = "refresh_logs")]
    RefreshLogs { timestamp_ms: u64 },

    /// Per-job variant of the above.
    #[serde(rename = "refresh_step_logs")]
    RefreshStepLogs { job_id: JobId, timestamp_ms: u64 },

    /// Server instance beacon (§4.I).
    #[serde(rename = "status")]
    Status { server_instance_id: String, timestamp_ms: u64 },

    #[serde(rename = "document_saved")]
    DocumentSaved { job_id: JobId, payload: Value, timestamp_ms: u64 },

    #[serde(rename = "link_discovered")]
    LinkDiscovered { job_id: JobId, payload: Value, timestamp_ms: u64 },
}

impl Event {
    /// The bus topic this event publishes on, matching the wire `type` tag.
    pub fn topic(&self) -> &'static str {
        match self {
            Event::JobCreated { .. } => "job_created",
            Event::JobStatusChange { .. } => "job_status_change",
            Event::JobCompleted { .. } => "job_completed",
            Event::JobFailed { .. } => "job_failed",
            Event::JobCancelled { .. } => "job_cancelled",
            Event::JobLog { .. } => "job_log",
            Event::JobSpawn { .. } => "job_spawn",
            Event::ParentJobProgress { .. } => "parent_job_progress",
            Event::CrawlerJobProgress { .. } => "crawler_job_progress",
            Event::LogEvent { .. } => "log_event",
            Event::RefreshLogs { .. } => "refresh_logs",
            Event::RefreshStepLogs { .. } => "refresh_step_logs",
            Event::Status { .. } => "status",
            Event::DocumentSaved { .. } => "document_saved",
            Event::LinkDiscovered { .. } => "link_discovered",
        }
    }

    /// The job this event correlates to, if any (`RefreshLogs` and `Status`
    /// are process-wide and carry none).
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Event::JobCreated { job_id, .. }
            | Event::JobStatusChange { job_id, .. }
            | Event::JobCompleted { job_id, .. }
            | Event::JobFailed { job_id, .. }
            | Event::JobCancelled { job_id, .. }
            | Event::JobLog { job_id, .. }
            | Event::ParentJobProgress { job_id, .. }
            | Event::CrawlerJobProgress { job_id, .. }
            | Event::LogEvent { job_id, .. }
            | Event::RefreshStepLogs { job_id, .. }
            | Event::DocumentSaved { job_id, .. }
            | Event::LinkDiscovered { job_id, .. } => Some(*job_id),
            Event::JobSpawn { parent_job_id, .. } => Some(*parent_job_id),
            Event::RefreshLogs { .. } | Event::Status { .. } => None,
        }
    }

    /// Whether this event is one of the three specific terminal lifecycle
    /// events dual-published alongside `job_status_change` (§4.C, Invariant 5).
    pub fn is_terminal_lifecycle(&self) -> bool {
        matches!(self, Event::JobCompleted { .. } | Event::JobFailed { .. } | Event::JobCancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_matches_wire_tag_name() {
        let event = Event::JobSpawn {
            parent_job_id: JobId::new(),
            child_job_id: JobId::new(),
            timestamp_ms: 0,
        };
        assert_eq!(event.topic(), "job_spawn");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "job_spawn");
    }

    #[test]
    fn job_id_extracts_from_job_spawn_as_parent() {
        let parent = JobId::new();
        let event = Event::JobSpawn { parent_job_id: parent, child_job_id: JobId::new(), timestamp_ms: 0 };
        assert_eq!(event.job_id(), Some(parent));
    }

    #[test]
    fn process_wide_events_have_no_job_id() {
        let refresh = Event::RefreshLogs { timestamp_ms: 0 };
        assert_eq!(refresh.job_id(), None);
        let status = Event::Status { server_instance_id: "abc".into(), timestamp_ms: 0 };
        assert_eq!(status.job_id(), None);
    }

    #[test]
    fn terminal_lifecycle_events_are_flagged() {
        let completed = Event::JobCompleted { job_id: JobId::new(), timestamp_ms: 0 };
        assert!(completed.is_terminal_lifecycle());
        let status_change = Event::JobStatusChange {
            job_id: JobId::new(),
            status: JobStatus::Running,
            timestamp_ms: 0,
        };
        assert!(!status_change.is_terminal_lifecycle());
    }
}
