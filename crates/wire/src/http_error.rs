// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP error body shape (SPEC_FULL §C.6): every non-2xx JSON response is
//! `{error, kind, details}`, with `kind` restricted to three buckets so
//! clients can branch without parsing prose.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
}

impl ErrorKind {
    /// The HTTP status the daemon's error handler maps this kind to.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(default)]
    pub details: Value,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self { error: error.into(), kind, details: Value::Object(Default::default()) }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, error)
    }

    pub fn validation(error: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, error)
    }

    pub fn conflict(error: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_details_is_an_empty_object_not_null() {
        let body = ErrorBody::not_found("job abc123 not found");
        assert_eq!(body.details, Value::Object(Default::default()));
    }

    #[test]
    fn kind_serializes_to_the_three_documented_buckets() {
        assert_eq!(serde_json::to_value(ErrorKind::Validation).unwrap(), "validation");
        assert_eq!(serde_json::to_value(ErrorKind::NotFound).unwrap(), "not_found");
        assert_eq!(serde_json::to_value(ErrorKind::Conflict).unwrap(), "conflict");
    }

    #[test]
    fn conflict_maps_to_409() {
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
    }
}
