// tests/watch_live.rs

mod common;
use crate::common::{init_tracing, wait_for, write_file};

use std::error::Error;
use std::fs;
use std::sync::Arc;

use tempfile::tempdir;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use modsync::copy::CopyRule;
use modsync::engine::{CopyPassBackend, CoreRuntime, Runtime, RuntimeEvent};
use modsync::errors::ModsyncError;
use modsync::fs::RealFileSystem;
use modsync::watch::{spawn_watcher, WatchProfile};

type TestResult = Result<(), Box<dyn Error>>;

fn profile(watch: &[&str], exclude: &[&str]) -> WatchProfile {
    let watch: Vec<String> = watch.iter().map(|s| s.to_string()).collect();
    let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
    WatchProfile::new(&watch, &exclude).unwrap()
}

#[tokio::test]
async fn missing_watch_root_fails_setup() {
    let root = tempdir().unwrap();
    let (tx, _rx) = mpsc::channel::<RuntimeEvent>(8);

    match spawn_watcher(root.path(), profile(&["src/**"], &[]), tx) {
        Err(ModsyncError::WatchSetup(msg)) => assert!(msg.contains("does not exist")),
        other => panic!("expected WatchSetup error, got {other:?}"),
    }
}

#[tokio::test]
async fn file_change_under_watch_root_emits_source_changed() -> TestResult {
    init_tracing();
    let root = tempdir()?;
    fs::create_dir_all(root.path().join("src"))?;

    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(64);
    let handle = spawn_watcher(root.path(), profile(&["src/**"], &["src/**/*.swp"]), tx)?;
    assert_eq!(handle.roots().len(), 1);

    write_file(root.path(), "src/ignored.swp", b"swap");
    write_file(root.path(), "src/x.lua", b"return 1");

    let event = timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Some(RuntimeEvent::SourceChanged { path }) if path == "src/x.lua" => break path,
                Some(RuntimeEvent::SourceChanged { path }) => {
                    assert_ne!(path, "src/ignored.swp");
                }
                Some(_) => {}
                None => panic!("watcher channel closed"),
            }
        }
    })
    .await?;

    assert_eq!(event, "src/x.lua");
    Ok(())
}

#[tokio::test]
async fn watch_loop_recopies_after_a_change() -> TestResult {
    init_tracing();
    let root = tempdir()?;
    let out = tempdir()?;
    write_file(root.path(), "src/x.lua", b"v1");

    let rules = vec![CopyRule::new("src/**", out.path())];
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let _watcher = spawn_watcher(root.path(), profile(&["src/**"], &[]), tx.clone())?;
    let backend = CopyPassBackend::new(Arc::new(RealFileSystem), root.path(), rules, tx.clone());
    let runtime = tokio::spawn(Runtime::new(CoreRuntime::new(), rx, backend).run());

    write_file(root.path(), "src/x.lua", b"version two");

    let copied = out.path().join("src/x.lua");
    let seen = wait_for(Duration::from_secs(10), || {
        fs::read(&copied).map(|b| b == b"version two").unwrap_or(false)
    })
    .await;
    assert!(seen, "destination never picked up the change");

    tx.send(RuntimeEvent::ShutdownRequested).await?;
    let core = timeout(Duration::from_secs(5), runtime).await???;
    assert!(core.passes_started() >= 2);
    Ok(())
}
