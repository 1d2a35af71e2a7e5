// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The key/value secret store loaded from `./keys/*.toml` (§6, §8
//! Invariant 8, §9 "Placeholders `{key-name}`...resolved once...from the
//! case-insensitive key store during load").

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
struct KeyEntry {
    /// The casing as it first appeared on disk — surfaced in duplicate-key
    /// error messages (Invariant 8).
    original_key: String,
    value: String,
    #[allow(dead_code)]
    description: Option<String>,
}

/// Case-insensitive key/value store. Lookups normalize to lowercase
/// (Invariant 8: `Get(uppercase(k)) == Get(lowercase(k))`).
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    entries: HashMap<String, KeyEntry>,
}

fn placeholder_pattern() -> Regex {
    // Matches `{key-name}`-shaped placeholders the teacher's config loader
    // resolves in option strings before handing them to a Step Manager.
    Regex::new(r"\{([A-Za-z0-9_-]+)\}").expect("placeholder pattern is a fixed literal")
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.toml` file in `dir`. Each file is a table of
    /// `[key-name]` sections with `value` (required) and `description`
    /// (optional) fields (§6).
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let mut store = Self::new();
        if !dir.exists() {
            return Ok(store);
        }
        let read_dir = std::fs::read_dir(dir).map_err(|e| ConfigError::KeysDirRead(dir.display().to_string(), e))?;
        let mut paths: Vec<_> = read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("toml"))
            .collect();
        paths.sort();
        for path in paths {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| ConfigError::KeysDirRead(path.display().to_string(), e))?;
            store.load_file_contents(&contents)?;
        }
        Ok(store)
    }

    fn load_file_contents(&mut self, contents: &str) -> Result<(), ConfigError> {
        let root: toml::Value = toml::from_str(contents)?;
        let Some(table) = root.as_table() else { return Ok(()) };
        for (key, section) in table {
            let Some(section_table) = section.as_table() else { continue };
            let value = section_table.get("value").and_then(toml::Value::as_str).unwrap_or_default().to_string();
            let description = section_table.get("description").and_then(toml::Value::as_str).map(str::to_string);
            self.insert(key.clone(), value, description)?;
        }
        Ok(())
    }

    /// Inserts a key, rejecting a case-insensitive duplicate (§8 Invariant
    /// 8: "duplicate-insert across cases yields... the existing key's
    /// casing in the message").
    pub fn insert(&mut self, key: String, value: String, description: Option<String>) -> Result<(), ConfigError> {
        let lower = key.to_lowercase();
        if let Some(existing) = self.entries.get(&lower) {
            return Err(ConfigError::DuplicateKey { existing_casing: existing.original_key.clone() });
        }
        self.entries.insert(lower, KeyEntry { original_key: key, value, description });
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase()).map(|e| e.value.as_str())
    }

    /// Resolves every `{key-name}` placeholder in `input` exactly once,
    /// case-insensitively. Unresolvable placeholders are left verbatim.
    pub fn substitute(&self, input: &str) -> String {
        let pattern = placeholder_pattern();
        pattern
            .replace_all(input, |caps: &regex::Captures| {
                let key = &caps[1];
                self.get(key).map(str::to_string).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[cfg(test)]
#[path = "keystore_tests.rs"]
mod tests;
