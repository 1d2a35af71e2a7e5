// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job log DTOs (§6 `GET /api/jobs/{id}/tree/logs`).

use quaero_core::{JobId, JobLogEntry, LogLevel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntryView {
    pub job_id: JobId,
    pub line_number: u64,
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub message: String,
}

impl From<&JobLogEntry> for LogEntryView {
    fn from(entry: &JobLogEntry) -> Self {
        Self {
            job_id: entry.job_id,
            line_number: entry.line_number,
            timestamp_ms: entry.timestamp_ms,
            level: entry.level,
            message: entry.message.clone(),
        }
    }
}

/// A bounded page of a step's log tail, as served by `tree/logs` (§4.G:
/// last-100 by default, with `total_count`/`earlier_count` so the client can
/// offer "load earlier").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogPageView {
    pub entries: Vec<LogEntryView>,
    pub total_count: u64,
    pub earlier_count: u64,
}

impl LogPageView {
    pub fn new(entries: Vec<JobLogEntry>, total_count: u64) -> Self {
        let entries: Vec<LogEntryView> = entries.iter().map(LogEntryView::from).collect();
        let earlier_count = total_count.saturating_sub(entries.len() as u64);
        Self { entries, total_count, earlier_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(line_number: u64) -> JobLogEntry {
        JobLogEntry {
            job_id: JobId::new(),
            line_number,
            timestamp_ms: 1,
            level: LogLevel::Info,
            message: format!("line {line_number}"),
        }
    }

    #[test]
    fn earlier_count_is_the_gap_between_total_and_the_returned_page() {
        let page = LogPageView::new(vec![entry(101), entry(102)], 102);
        assert_eq!(page.earlier_count, 100);
    }

    #[test]
    fn earlier_count_never_underflows_when_the_page_is_the_whole_log() {
        let page = LogPageView::new(vec![entry(1), entry(2)], 2);
        assert_eq!(page.earlier_count, 0);
    }
}
