// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling the `[watch]` `paths` / `exclude` glob patterns.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does **not** know about copy rules; it only turns filesystem changes
//! into `RuntimeEvent::SourceChanged` events.

pub mod patterns;
pub mod watcher;

pub use patterns::WatchProfile;
pub use watcher::{spawn_watcher, WatcherHandle};
