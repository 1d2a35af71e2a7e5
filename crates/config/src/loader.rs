// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Definition directory loader (§6 "Job Definition file"), mirroring
//! [`crate::keystore::KeyStore::load_dir`]'s directory-scan shape.

use std::collections::HashMap;
use std::path::Path;

use crate::definition::JobDefinition;
use crate::error::ConfigError;

/// Every loaded [`JobDefinition`], keyed by its `id` field.
#[derive(Debug, Clone, Default)]
pub struct JobDefinitionRegistry {
    definitions: HashMap<String, JobDefinition>,
}

impl JobDefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.toml` file in `dir`, validating each as it loads
    /// (§4.G step 1: DAG validation happens at load, not at execute time).
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        if !dir.exists() {
            return Ok(registry);
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
            let definition = JobDefinition::load(&contents)?;
            registry.definitions.insert(definition.id.clone(), definition);
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&JobDefinition> {
        self.definitions.get(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &JobDefinition> {
        self.definitions.values()
    }

    /// The crawler definition whose `url_patterns` first matches `url`,
    /// in insertion order (§6 quick-crawl routing, Scenario S4).
    pub fn find_crawler_by_url(&self, url: &str) -> Option<&JobDefinition> {
        self.definitions
            .values()
            .filter(|def| def.step.values().any(|s| s.action == "crawler"))
            .find(|def| crate::definition::any_pattern_matches(&def.url_patterns, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_definition(dir: &Path, file_name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(file_name)).expect("create");
        file.write_all(contents.as_bytes()).expect("write");
    }

    #[test]
    fn loads_every_toml_file_in_the_directory_keyed_by_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_definition(
            dir.path(),
            "a.toml",
            "id = \"alpha\"\nname = \"Alpha\"\n\n[step.only]\naction = \"database_maintenance\"\n",
        );
        write_definition(
            dir.path(),
            "b.toml",
            "id = \"beta\"\nname = \"Beta\"\n\n[step.only]\naction = \"reindex\"\n",
        );

        let registry = JobDefinitionRegistry::load_dir(dir.path()).expect("load");
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("beta").is_some());
        assert_eq!(registry.all().count(), 2);
    }

    #[test]
    fn missing_directory_yields_an_empty_registry() {
        let registry = JobDefinitionRegistry::load_dir(Path::new("/nonexistent/path")).expect("load");
        assert_eq!(registry.all().count(), 0);
    }

    #[test]
    fn find_crawler_by_url_matches_wildcard_patterns() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_definition(
            dir.path(),
            "wiki.toml",
            "id = \"wiki\"\nname = \"Wiki\"\nurl_patterns = [\"*.atlassian.net/wiki/*\"]\n\n[step.crawl]\naction = \"crawler\"\n",
        );

        let registry = JobDefinitionRegistry::load_dir(dir.path()).expect("load");
        let found = registry.find_crawler_by_url("https://acme.atlassian.net/wiki/spaces/X/pages/1");
        assert_eq!(found.map(|d| d.id.as_str()), Some("wiki"));
        assert!(registry.find_crawler_by_url("https://unrelated.example.com").is_none());
    }
}
