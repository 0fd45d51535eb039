// src/lib.rs

pub mod cli;
pub mod config;
pub mod copy;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod paths;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, Mode};
use crate::config::{load_for_run, ConfigFile};
use crate::copy::{run_copy, CopyRule};
use crate::engine::{CopyPassBackend, CoreRuntime, Runtime, RuntimeEvent};
use crate::errors::{ModsyncError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::{spawn_watcher, WatchProfile};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file or built-in)
/// - the initial copy pass (errors propagate)
/// - in watch mode: the file watcher, backend and runtime loop
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_for_run(args.config.as_deref().map(Path::new))?;

    if args.dry_run {
        print_dry_run(&cfg, args.mode);
        return Ok(());
    }

    if let Some(manifest_path) = &cfg.manifest {
        manifest::log_manifest(&cfg.root.join(manifest_path));
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let copied = run_initial_pass(Arc::clone(&fs), cfg.root.clone(), cfg.rules.clone()).await?;
    info!(copied, "initial copy pass complete");

    match args.mode {
        Mode::Copy => Ok(()),
        Mode::Watch => watch(&cfg, fs).await,
    }
}

/// Run one pass off the async threads and turn its report into a result.
pub async fn run_initial_pass(
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    rules: Vec<CopyRule>,
) -> Result<usize> {
    let report = tokio::task::spawn_blocking(move || run_copy(fs.as_ref(), &root, &rules))
        .await
        .map_err(|e| ModsyncError::Other(e.into()))?;
    report.into_result()
}

/// Subscribe to the watch set and re-copy on every change. Only returns on
/// setup failure or if the runtime loop ends.
pub async fn watch(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<()> {
    let profile = WatchProfile::new(&cfg.watch.paths, &cfg.watch.exclude)
        .map_err(|e| ModsyncError::WatchSetup(format!("{e:#}")))?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let _watcher_handle = spawn_watcher(&cfg.root, profile, rt_tx.clone())?;

    let backend = CopyPassBackend::new(fs, cfg.root.clone(), cfg.triggered_rules(), rt_tx);
    let runtime = Runtime::new(CoreRuntime::new(), rt_rx, backend);
    runtime.run().await?;
    Ok(())
}

/// Simple dry-run output: print resolved rules and the watch set.
fn print_dry_run(cfg: &ConfigFile, mode: Mode) {
    println!("modsync dry-run ({mode:?})");
    println!("  root = {}", cfg.root.display());
    if let Some(manifest) = &cfg.manifest {
        println!("  manifest = {}", manifest.display());
    }
    println!();

    println!("copy rules ({}):", cfg.rules.len());
    for (i, rule) in cfg.rules.iter().enumerate() {
        println!("  #{i} {rule}");
    }

    println!();
    println!("watch:");
    println!("  paths: {:?}", cfg.watch.paths);
    if !cfg.watch.exclude.is_empty() {
        println!("  exclude: {:?}", cfg.watch.exclude);
    }
    println!("  rules: {:?}", cfg.watch.triggered_rules);

    debug!("dry-run complete (nothing copied)");
}
