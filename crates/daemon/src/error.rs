// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps engine/store/config errors onto the `{error, kind, details}` HTTP
//! body (SPEC_FULL §C.6, §7 closing paragraph).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quaero_config::ConfigError;
use quaero_engine::EngineError;
use quaero_store::StoreError;
use quaero_wire::{ErrorBody, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("job definition \"{0}\" not found")]
    DefinitionNotFound(String),

    #[error("no step named \"{0}\" under this job")]
    StepNotFound(String),
}

impl ApiError {
    fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Engine(EngineError::Store(StoreError::JobNotFound(_))) => ErrorKind::NotFound,
            ApiError::Engine(EngineError::Store(StoreError::TerminalTransitionRejected { .. })) => {
                ErrorKind::Conflict
            }
            ApiError::Engine(EngineError::Store(StoreError::DuplicateJob(_))) => ErrorKind::Conflict,
            ApiError::Engine(EngineError::Validation(_) | EngineError::UnknownAction(_) | EngineError::AuthNotResolved(_)) => {
                ErrorKind::Validation
            }
            ApiError::Engine(EngineError::JobNotFound(_)) => ErrorKind::NotFound,
            ApiError::Engine(_) => ErrorKind::Validation,
            ApiError::Store(StoreError::JobNotFound(_)) => ErrorKind::NotFound,
            ApiError::Store(StoreError::TerminalTransitionRejected { .. } | StoreError::DuplicateJob(_)) => {
                ErrorKind::Conflict
            }
            ApiError::Config(_) => ErrorKind::Validation,
            ApiError::DefinitionNotFound(_) => ErrorKind::NotFound,
            ApiError::StepNotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(self.kind(), self.to_string());
        let status = StatusCode::from_u16(body.kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
