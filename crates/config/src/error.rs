// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Validation failures (§7 "Validation failure... fail fast... before any
/// job row is created").
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse job definition TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("step names must be unique; duplicate step \"{0}\"")]
    DuplicateStep(String),

    #[error("step \"{step}\" depends on unknown step \"{depends_on}\"")]
    UnknownDependency { step: String, depends_on: String },

    #[error("step dependency graph contains a cycle involving \"{0}\"")]
    CyclicDependency(String),

    #[error("unsupported nested configuration under step \"{step}\" key \"{key}\" (nested [step.X.config] and [[steps]] forms are not supported)")]
    NestedConfigRejected { step: String, key: String },

    #[error("step \"{step}\" is missing required option \"{key}\"")]
    MissingRequiredOption { step: String, key: String },

    #[error("step \"{0}\" has unknown action")]
    UnknownAction(String),

    #[error("key \"{existing_casing}\" already exists (case-insensitive match)")]
    DuplicateKey { existing_casing: String },

    #[error("failed to read keys directory {0}: {1}")]
    KeysDirRead(String, std::io::Error),
}
