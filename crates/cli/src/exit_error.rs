// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code, so `main()` can
//! translate a failed command into `std::process::exit()` without every
//! command matching on the client error's shape itself.

use std::fmt;

use crate::client::ClientError;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<ClientError> for ExitError {
    fn from(err: ClientError) -> Self {
        let code = match &err {
            ClientError::Api(body) => match body.kind {
                quaero_wire::ErrorKind::NotFound => 2,
                quaero_wire::ErrorKind::Conflict => 3,
                quaero_wire::ErrorKind::Validation => 4,
            },
            ClientError::Unreachable(..) => 69, // EX_UNAVAILABLE
            ClientError::Decode(_) => 1,
        };
        ExitError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaero_wire::{ErrorBody, ErrorKind};

    #[test]
    fn not_found_maps_to_exit_code_2() {
        let err = ExitError::from(ClientError::Api(ErrorBody::new(ErrorKind::NotFound, "no such job")));
        assert_eq!(err.code, 2);
    }

    #[test]
    fn conflict_maps_to_exit_code_3() {
        let err = ExitError::from(ClientError::Api(ErrorBody::new(ErrorKind::Conflict, "already terminal")));
        assert_eq!(err.code, 3);
    }
}
