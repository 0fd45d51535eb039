// src/config/mod.rs

//! Configuration loading and validation for modsync.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to built-ins (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_for_run, load_from_path};
pub use model::{
    ConfigFile, CopyEntry, ProjectSection, RawConfigFile, WatchRule, WatchSection,
};
pub use validate::validate_config;
