// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Definition TOML parsing and DAG validation (§3 `JobDefinition`,
//! `StepSpec`; §6 "Job Definition file"; §9 "flat per-step map").

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::error::ConfigError;

/// `on_error` ∈ {fail, continue, retry} (§3 `StepSpec`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    Fail,
    Continue,
    Retry,
}

impl Default for OnError {
    fn default() -> Self {
        OnError::Fail
    }
}

impl OnError {
    fn parse(raw: Option<&str>) -> OnError {
        match raw.map(str::trim) {
            Some("continue") => OnError::Continue,
            Some("retry") => OnError::Retry,
            _ => OnError::Fail,
        }
    }
}

/// `StepSpec` (§3): action tag, dependency list, error policy, plus a flat
/// action-specific option map. Nested tables are rejected at parse time
/// (§9), so every value here is a scalar, string array, or number array.
#[derive(Debug, Clone)]
pub struct StepSpec {
    pub action: String,
    pub description: Option<String>,
    /// Parsed from the comma-separated `depends` string; empty when absent.
    pub depends: Vec<String>,
    pub on_error: OnError,
    pub options: HashMap<String, Value>,
}

impl StepSpec {
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.option(key).and_then(Value::as_str)
    }

    pub fn option_array(&self, key: &str) -> Vec<String> {
        self.option(key)
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    }

    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.option(key).and_then(Value::as_u64)
    }

    /// Validates that every key in `required` is present, producing a
    /// `validation` failure before any job row is created (§4.F step 2,
    /// §7 "Validation failure").
    pub fn require(&self, step_name: &str, required: &[&str]) -> Result<(), ConfigError> {
        for key in required {
            if !self.options.contains_key(*key) {
                return Err(ConfigError::MissingRequiredOption { step: step_name.to_string(), key: key.to_string() });
            }
        }
        Ok(())
    }
}

/// `JobDefinition` (§3): declarative template, `step` keys form the step
/// names.
#[derive(Debug, Clone)]
pub struct JobDefinition {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub tags: Vec<String>,
    pub url_patterns: Vec<String>,
    pub schedule: Option<String>,
    /// Insertion-ordered per §9 (mirrors the teacher's `indexmap`-backed
    /// ordered step maps) — the Orchestrator's tie-break on step name uses
    /// this only as a starting order, not as the authoritative order.
    pub step: IndexMap<String, StepSpec>,
}

const KNOWN_STEP_KEYS: &[&str] = &["action", "description", "depends", "on_error"];

fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.iter().map(toml_to_json).collect()),
        toml::Value::Table(_) => Value::Null, // rejected before reaching here
    }
}

/// True iff `value` contains, anywhere, a `Table` — i.e. a nested
/// `[step.X.config]` form (§9 "Nested... forms are explicitly not
/// supported").
fn contains_nested_table(value: &toml::Value) -> bool {
    match value {
        toml::Value::Table(_) => true,
        toml::Value::Array(arr) => arr.iter().any(contains_nested_table),
        _ => false,
    }
}

impl JobDefinition {
    /// Parses and structurally validates (nesting rejection, flat option
    /// extraction) but does not run graph validation — call
    /// [`Self::validate`] separately so callers can distinguish parse vs.
    /// graph errors if desired; `load` below always runs both.
    pub fn parse(toml_source: &str) -> Result<Self, ConfigError> {
        let root: toml::Value = toml::from_str(toml_source)?;
        let table = root.as_table().cloned().unwrap_or_default();

        let id = table.get("id").and_then(toml::Value::as_str).unwrap_or_default().to_string();
        let name = table.get("name").and_then(toml::Value::as_str).unwrap_or_default().to_string();
        let enabled = table.get("enabled").and_then(toml::Value::as_bool).unwrap_or(true);
        let tags = table
            .get("tags")
            .and_then(toml::Value::as_array)
            .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        let url_patterns = table
            .get("url_patterns")
            .and_then(toml::Value::as_array)
            .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        let schedule = table.get("schedule").and_then(toml::Value::as_str).map(str::to_string);

        let mut step = IndexMap::new();
        if let Some(steps_table) = table.get("step").and_then(toml::Value::as_table) {
            for (step_name, step_value) in steps_table {
                let step_table = step_value.as_table().cloned().unwrap_or_default();
                let action = step_table.get("action").and_then(toml::Value::as_str).unwrap_or_default().to_string();
                let description = step_table.get("description").and_then(toml::Value::as_str).map(str::to_string);
                let depends = step_table
                    .get("depends")
                    .and_then(toml::Value::as_str)
                    .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
                    .unwrap_or_default();
                let on_error = OnError::parse(step_table.get("on_error").and_then(toml::Value::as_str));

                let mut options = HashMap::new();
                for (key, value) in &step_table {
                    if KNOWN_STEP_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    if contains_nested_table(value) {
                        return Err(ConfigError::NestedConfigRejected { step: step_name.clone(), key: key.clone() });
                    }
                    options.insert(key.clone(), toml_to_json(value));
                }

                step.insert(step_name.clone(), StepSpec { action, description, depends, on_error, options });
            }
        }

        Ok(JobDefinition { id, name, enabled, tags, url_patterns, schedule, step })
    }

    /// Parses then validates (§4.G step 1): unique step names (guaranteed by
    /// map construction, checked anyway for TOML tables with duplicate
    /// literal keys across merged sections), `depends` references only
    /// existing steps, and the induced graph is a DAG.
    pub fn load(toml_source: &str) -> Result<Self, ConfigError> {
        let definition = Self::parse(toml_source)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (step_name, spec) in &self.step {
            for dep in &spec.depends {
                if !self.step.contains_key(dep) {
                    return Err(ConfigError::UnknownDependency { step: step_name.clone(), depends_on: dep.clone() });
                }
            }
        }
        self.topological_order().map(|_| ())
    }

    /// Kahn's algorithm, ties broken by step name (stable) (§4.G step 1).
    pub fn topological_order(&self) -> Result<Vec<String>, ConfigError> {
        let mut indegree: HashMap<&str, usize> =
            self.step.iter().map(|(name, spec)| (name.as_str(), spec.depends.len())).collect();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for (step_name, spec) in &self.step {
            for dep in &spec.depends {
                dependents.entry(dep.as_str()).or_default().push(step_name.as_str());
            }
        }

        let mut ready: VecDeque<&str> =
            indegree.iter().filter(|(_, &d)| d == 0).map(|(&name, _)| name).collect::<Vec<_>>().into();
        let mut ready_sorted: Vec<&str> = ready.drain(..).collect();
        ready_sorted.sort_unstable();
        let mut queue: VecDeque<&str> = ready_sorted.into();

        let mut order = Vec::with_capacity(self.step.len());
        let mut remaining = indegree.clone();
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(step_name) = queue.pop_front() {
            if !visited.insert(step_name) {
                continue;
            }
            order.push(step_name.to_string());
            let mut newly_ready = Vec::new();
            if let Some(deps) = dependents.get(step_name) {
                for &dependent in deps {
                    let entry = remaining.entry(dependent).or_insert(0);
                    *entry = entry.saturating_sub(1);
                    if *entry == 0 && !visited.contains(dependent) {
                        newly_ready.push(dependent);
                    }
                }
            }
            newly_ready.sort_unstable();
            for step in newly_ready {
                queue.push_back(step);
            }
        }

        if order.len() != self.step.len() {
            let stuck = self.step.keys().find(|k| !visited.contains(k.as_str())).cloned().unwrap_or_default();
            return Err(ConfigError::CyclicDependency(stuck));
        }
        Ok(order)
    }
}

/// Converts a wildcard `url_patterns` entry (`*` -> `.*`, anchored) into a
/// compiled [`Regex`] (§6 "quick-crawl routing").
pub fn wildcard_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(pattern).replace("\\*", ".*");
    Regex::new(&format!("^{escaped}$"))
}

/// True iff any of `patterns` matches `url` under wildcard-to-regex
/// semantics (§6 S4).
pub fn any_pattern_matches(patterns: &[String], url: &str) -> bool {
    patterns.iter().filter_map(|p| wildcard_to_regex(p).ok()).any(|re| re.is_match(url))
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
