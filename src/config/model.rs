// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::validate::validate_config;
use crate::copy::CopyRule;
use crate::errors::{ModsyncError, Result};
use crate::paths::{expand_home, home_dir};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [project]
/// root = "."
/// manifest = "package.json"
///
/// [[copy]]
/// src = "SledgehammerLua/**"
/// dest = "~/zomboid/mods"
///
/// [[copy]]
/// src = "SledgehammerLua/**"
/// dest = "../prod/mods"
///
/// [watch]
/// paths = ["src/**"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub project: ProjectSection,

    /// `[[copy]]` entries, executed in file order.
    #[serde(default)]
    pub copy: Vec<CopyEntry>,

    #[serde(default)]
    pub watch: WatchSection,
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectSection {
    /// Directory that source and watch globs are relative to. Defaults to
    /// the working directory.
    #[serde(default)]
    pub root: Option<String>,

    /// Optional `package.json`-style manifest, read for log output only.
    #[serde(default)]
    pub manifest: Option<String>,
}

/// One `[[copy]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyEntry {
    pub src: String,

    /// Destination root. A leading `~/` is the user's home directory;
    /// relative paths are relative to the working directory.
    pub dest: String,

    #[serde(default = "default_true")]
    pub timestamp: bool,

    #[serde(default = "default_true")]
    pub mode: bool,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WatchSection {
    #[serde(default)]
    pub paths: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Indices into `[[copy]]` to run on change. All rules when omitted.
    #[serde(default)]
    pub rules: Option<Vec<usize>>,
}

fn default_true() -> bool {
    true
}

impl RawConfigFile {
    /// The configuration used when no config file is present.
    pub fn builtin() -> Self {
        let entry = |dest: &str| CopyEntry {
            src: "SledgehammerLua/**".to_string(),
            dest: dest.to_string(),
            timestamp: true,
            mode: true,
        };
        Self {
            project: ProjectSection {
                root: None,
                manifest: Some("package.json".to_string()),
            },
            copy: vec![entry("~/zomboid/mods"), entry("../prod/mods")],
            watch: WatchSection {
                paths: vec!["src/**".to_string()],
                exclude: Vec::new(),
                rules: None,
            },
        }
    }
}

/// Watch rule: what to watch and which copy rules a change re-runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRule {
    pub paths: Vec<String>,
    pub exclude: Vec<String>,
    /// Indices into [`ConfigFile::rules`], in execution order.
    pub triggered_rules: Vec<usize>,
}

/// Validated configuration with all paths resolved.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub root: PathBuf,
    pub manifest: Option<PathBuf>,
    pub rules: Vec<CopyRule>,
    pub watch: WatchRule,
}

impl ConfigFile {
    /// Validate `raw` and resolve destinations against `home`.
    pub fn resolve(raw: RawConfigFile, home: Option<&Path>) -> Result<Self> {
        validate_config(&raw)?;

        let root = PathBuf::from(raw.project.root.as_deref().unwrap_or("."));

        let rules = raw
            .copy
            .iter()
            .map(|entry| {
                let dest = expand_home(entry.dest.trim(), home).ok_or_else(|| {
                    ModsyncError::Config(format!(
                        "cannot resolve home directory for destination `{}`",
                        entry.dest
                    ))
                })?;
                Ok(CopyRule::new(entry.src.trim(), dest)
                    .preserve_timestamp(entry.timestamp)
                    .preserve_mode(entry.mode))
            })
            .collect::<Result<Vec<_>>>()?;

        let triggered_rules = raw
            .watch
            .rules
            .clone()
            .unwrap_or_else(|| (0..rules.len()).collect());

        Ok(Self {
            root,
            manifest: raw.project.manifest.map(PathBuf::from),
            rules,
            watch: WatchRule {
                paths: raw.watch.paths,
                exclude: raw.watch.exclude,
                triggered_rules,
            },
        })
    }

    /// The copy rules a watch-triggered pass runs, in order.
    pub fn triggered_rules(&self) -> Vec<CopyRule> {
        self.watch
            .triggered_rules
            .iter()
            .filter_map(|&i| self.rules.get(i).cloned())
            .collect()
    }
}

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ModsyncError;

    fn try_from(raw: RawConfigFile) -> Result<Self> {
        let home = home_dir();
        ConfigFile::resolve(raw, home.as_deref())
    }
}
