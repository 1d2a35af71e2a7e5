// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain log levels and entries (§3 `JobLogEntry`, §7 "Log normalization").
//!
//! Distinct from process-level `tracing` diagnostics: these are the
//! per-job records that flow through the Log Pipeline and are persisted
//! by the Job Store.

use serde::{Deserialize, Serialize};

use crate::id::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

crate::simple_display! {
    LogLevel {
        Debug => "DBG",
        Info => "INF",
        Warn => "WRN",
        Error => "ERR",
    }
}

impl LogLevel {
    /// Normalizes an arbitrary, possibly-unknown level string to one of the
    /// four known levels. Unknown levels default to `Info` (§7).
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dbg" | "debug" | "trace" => LogLevel::Debug,
            "inf" | "info" => LogLevel::Info,
            "wrn" | "warn" | "warning" => LogLevel::Warn,
            "err" | "error" | "fatal" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    /// Ordering used for the `min_event_level` threshold (§4.B): debug <= info
    /// <= warn <= error.
    pub fn rank(self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warn => 2,
            LogLevel::Error => 3,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warn => "WRN",
            LogLevel::Error => "ERR",
        }
    }
}

/// A single append-only log line for a job (§3 `JobLogEntry`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLogEntry {
    pub job_id: JobId,
    /// Monotonic within a job, starts at 1. May have gaps under filtering
    /// (filtering happens at read time, not by renumbering).
    pub line_number: u64,
    /// Milliseconds since epoch; RFC3339/HH:MM:SS rendering is a
    /// presentation concern left to callers.
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_case_insensitive_and_accepts_aliases() {
        assert_eq!(LogLevel::normalize("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::normalize("warning"), LogLevel::Warn);
        assert_eq!(LogLevel::normalize("err"), LogLevel::Error);
        assert_eq!(LogLevel::normalize("  Debug "), LogLevel::Debug);
    }

    #[test]
    fn normalize_unknown_level_defaults_to_info() {
        assert_eq!(LogLevel::normalize("weird"), LogLevel::Info);
        assert_eq!(LogLevel::normalize(""), LogLevel::Info);
    }

    #[test]
    fn rank_orders_debug_below_error() {
        assert!(LogLevel::Debug.rank() < LogLevel::Info.rank());
        assert!(LogLevel::Info.rank() < LogLevel::Warn.rank());
        assert!(LogLevel::Warn.rank() < LogLevel::Error.rank());
    }

    #[test]
    fn as_code_matches_display() {
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            assert_eq!(level.as_code(), level.to_string());
        }
    }
}
