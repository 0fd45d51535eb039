#![allow(dead_code)]

use modsync::config::{ConfigFile, CopyEntry, ProjectSection, RawConfigFile, WatchSection};

/// Builder for `RawConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                project: ProjectSection::default(),
                copy: Vec::new(),
                watch: WatchSection {
                    paths: vec!["src/**".to_string()],
                    exclude: Vec::new(),
                    rules: None,
                },
            },
        }
    }

    pub fn root(mut self, root: &str) -> Self {
        self.config.project.root = Some(root.to_string());
        self
    }

    pub fn with_copy(mut self, entry: CopyEntry) -> Self {
        self.config.copy.push(entry);
        self
    }

    pub fn watch_paths(mut self, patterns: &[&str]) -> Self {
        self.config.watch.paths = patterns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a `[[copy]]` entry.
pub struct CopyEntryBuilder {
    entry: CopyEntry,
}

impl CopyEntryBuilder {
    pub fn new(src: &str, dest: &str) -> Self {
        Self {
            entry: CopyEntry {
                src: src.to_string(),
                dest: dest.to_string(),
                timestamp: true,
                mode: true,
            },
        }
    }

    pub fn timestamp(mut self, val: bool) -> Self {
        self.entry.timestamp = val;
        self
    }

    pub fn mode(mut self, val: bool) -> Self {
        self.entry.mode = val;
        self
    }

    pub fn build(self) -> CopyEntry {
        self.entry
    }
}
