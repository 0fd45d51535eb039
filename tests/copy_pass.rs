// tests/copy_pass.rs

mod common;
use crate::common::{init_tracing, write_file, write_mod_tree};

use std::error::Error;
use std::fs;
use std::path::Path;

use filetime::FileTime;
use tempfile::tempdir;

use modsync::copy::{run_copy, CopyRule};
use modsync::errors::ModsyncError;
use modsync::fs::RealFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

fn two_destination_rules(out: &Path) -> Vec<CopyRule> {
    vec![
        CopyRule::new("SledgehammerLua/**", out.join("D1")),
        CopyRule::new("SledgehammerLua/**", out.join("D2")),
    ]
}

fn mtime(path: &Path) -> FileTime {
    FileTime::from_last_modification_time(&fs::metadata(path).unwrap())
}

#[test]
fn mirrors_tree_into_every_destination() -> TestResult {
    init_tracing();
    let src = tempdir()?;
    let out = tempdir()?;
    write_mod_tree(src.path());

    let report = run_copy(&RealFileSystem, src.path(), &two_destination_rules(out.path()));

    assert!(report.is_success(), "unexpected failures: {:?}", report.failures);
    assert_eq!(report.files_copied, 4);
    assert_eq!(report.bytes_copied, 30);

    for dest in ["D1", "D2"] {
        let a = out.path().join(dest).join("SledgehammerLua/a.lua");
        let b = out.path().join(dest).join("SledgehammerLua/sub/b.lua");
        assert_eq!(fs::read(&a)?, b"print(1)\n\n");
        assert_eq!(fs::read(&b)?, b"x=1\n\n");
        assert_eq!(fs::metadata(&a)?.len(), 10);
        assert_eq!(fs::metadata(&b)?.len(), 5);
    }

    assert_eq!(report.into_result()?, 4);
    Ok(())
}

#[test]
fn second_pass_yields_identical_trees() -> TestResult {
    let src = tempdir()?;
    let out = tempdir()?;
    write_mod_tree(src.path());
    let rules = two_destination_rules(out.path());

    run_copy(&RealFileSystem, src.path(), &rules).into_result()?;
    let a = out.path().join("D1/SledgehammerLua/a.lua");
    let first = (fs::read(&a)?, mtime(&a));

    run_copy(&RealFileSystem, src.path(), &rules).into_result()?;
    let second = (fs::read(&a)?, mtime(&a));

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn preserves_modification_time_when_asked() -> TestResult {
    let src = tempdir()?;
    let out = tempdir()?;
    let file = write_file(src.path(), "SledgehammerLua/a.lua", b"0123456789");
    let old = FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_mtime(&file, old)?;

    let rules = vec![
        CopyRule::new("SledgehammerLua/**", out.path().join("keep")),
        CopyRule::new("SledgehammerLua/**", out.path().join("fresh")).preserve_timestamp(false),
    ];
    run_copy(&RealFileSystem, src.path(), &rules).into_result()?;

    assert_eq!(mtime(&out.path().join("keep/SledgehammerLua/a.lua")), old);
    assert_ne!(mtime(&out.path().join("fresh/SledgehammerLua/a.lua")), old);
    Ok(())
}

#[cfg(unix)]
#[test]
fn preserves_permission_bits_when_asked() -> TestResult {
    use std::os::unix::fs::PermissionsExt;

    let src = tempdir()?;
    let out = tempdir()?;
    let file = write_file(src.path(), "SledgehammerLua/run.sh", b"#!/bin/sh\n");
    fs::set_permissions(&file, fs::Permissions::from_mode(0o751))?;

    let rules = vec![CopyRule::new("SledgehammerLua/**", out.path())];
    run_copy(&RealFileSystem, src.path(), &rules).into_result()?;

    let mode = fs::metadata(out.path().join("SledgehammerLua/run.sh"))?
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o751);
    Ok(())
}

#[test]
fn overwrites_existing_destination_files() -> TestResult {
    let src = tempdir()?;
    let out = tempdir()?;
    write_mod_tree(src.path());
    write_file(out.path(), "SledgehammerLua/a.lua", b"a much longer stale file body");

    let rules = vec![CopyRule::new("SledgehammerLua/**", out.path())];
    run_copy(&RealFileSystem, src.path(), &rules).into_result()?;

    assert_eq!(fs::read(out.path().join("SledgehammerLua/a.lua"))?, b"print(1)\n\n");
    Ok(())
}

#[test]
fn creates_matched_empty_directories() -> TestResult {
    let src = tempdir()?;
    let out = tempdir()?;
    write_mod_tree(src.path());
    fs::create_dir_all(src.path().join("SledgehammerLua/media/textures"))?;

    let rules = vec![CopyRule::new("SledgehammerLua/**", out.path())];
    let report = run_copy(&RealFileSystem, src.path(), &rules);

    assert!(report.is_success());
    assert!(out.path().join("SledgehammerLua/media/textures").is_dir());
    Ok(())
}

#[test]
fn file_in_place_of_directory_fails_only_that_destination() -> TestResult {
    let src = tempdir()?;
    let out = tempdir()?;
    write_mod_tree(src.path());
    // D1/SledgehammerLua exists as a plain file.
    write_file(out.path(), "D1/SledgehammerLua", b"not a dir");

    let report = run_copy(&RealFileSystem, src.path(), &two_destination_rules(out.path()));

    assert!(!report.is_success());
    let d1 = out.path().join("D1");
    for failure in &report.failures {
        assert_eq!(failure.rule, 0);
        assert!(failure.path.starts_with(&d1), "unexpected path {:?}", failure.path);
    }

    // The second rule still ran in full.
    assert_eq!(fs::read(out.path().join("D2/SledgehammerLua/a.lua"))?, b"print(1)\n\n");
    assert_eq!(fs::read(out.path().join("D2/SledgehammerLua/sub/b.lua"))?, b"x=1\n\n");
    assert_eq!(report.files_copied, 2);

    match report.into_result() {
        Err(ModsyncError::CopyFailed { path, failures, .. }) => {
            assert!(path.starts_with(&d1));
            assert!(failures >= 1);
        }
        other => panic!("expected CopyFailed, got {other:?}"),
    }
    Ok(())
}

#[test]
fn unmatched_and_malformed_patterns_are_no_ops() -> TestResult {
    let src = tempdir()?;
    let out = tempdir()?;
    write_mod_tree(src.path());

    let rules = vec![
        CopyRule::new("NoSuchMod/**", out.path()),
        CopyRule::new("SledgehammerLua/[", out.path()),
        CopyRule::new("SledgehammerLua/*.lua", out.path()),
    ];
    let report = run_copy(&RealFileSystem, src.path(), &rules);

    assert!(report.is_success());
    assert_eq!(report.unmatched_rules, 2);
    // `*` stays in one directory, so only a.lua.
    assert_eq!(report.files_copied, 1);
    assert!(out.path().join("SledgehammerLua/a.lua").is_file());
    assert!(!out.path().join("SledgehammerLua/sub").exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn read_only_source_survives_repeated_passes() -> TestResult {
    use std::os::unix::fs::PermissionsExt;

    let src = tempdir()?;
    let out = tempdir()?;
    let file = write_file(src.path(), "SledgehammerLua/a.lua", b"v1");
    fs::set_permissions(&file, fs::Permissions::from_mode(0o444))?;
    let rules = vec![CopyRule::new("SledgehammerLua/**", out.path())];

    assert_eq!(run_copy(&RealFileSystem, src.path(), &rules).into_result()?, 1);

    fs::set_permissions(&file, fs::Permissions::from_mode(0o644))?;
    fs::write(&file, b"v2")?;
    fs::set_permissions(&file, fs::Permissions::from_mode(0o444))?;
    assert_eq!(run_copy(&RealFileSystem, src.path(), &rules).into_result()?, 1);

    let dest = out.path().join("SledgehammerLua/a.lua");
    assert_eq!(fs::read(&dest)?, b"v2");
    assert_eq!(fs::metadata(&dest)?.permissions().mode() & 0o777, 0o444);
    Ok(())
}

#[cfg(unix)]
#[test]
fn directory_mode_and_mtime_follow_the_source() -> TestResult {
    use std::os::unix::fs::PermissionsExt;

    let src = tempdir()?;
    let out = tempdir()?;
    write_mod_tree(src.path());
    let sub = src.path().join("SledgehammerLua/sub");
    fs::set_permissions(&sub, fs::Permissions::from_mode(0o750))?;
    let old = FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_mtime(&sub, old)?;

    let rules = vec![CopyRule::new("SledgehammerLua/**", out.path())];
    run_copy(&RealFileSystem, src.path(), &rules).into_result()?;

    let dest = out.path().join("SledgehammerLua/sub");
    assert_eq!(mtime(&dest), old);
    assert_eq!(fs::metadata(&dest)?.permissions().mode() & 0o777, 0o750);
    Ok(())
}

#[test]
fn empty_base_directory_is_mirrored() -> TestResult {
    let src = tempdir()?;
    let out = tempdir()?;
    fs::create_dir_all(src.path().join("SledgehammerLua"))?;

    let rules = vec![CopyRule::new("SledgehammerLua/**", out.path())];
    let report = run_copy(&RealFileSystem, src.path(), &rules);

    assert!(report.is_success());
    assert_eq!(report.unmatched_rules, 0);
    assert_eq!(report.dirs_created, 1);
    assert!(out.path().join("SledgehammerLua").is_dir());
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() -> TestResult {
    let src = tempdir()?;
    let out = tempdir()?;
    write_mod_tree(src.path());
    std::os::unix::fs::symlink(
        src.path().join("SledgehammerLua"),
        src.path().join("SledgehammerLua/sub/loop"),
    )?;

    let rules = vec![CopyRule::new("SledgehammerLua/**", out.path())];
    let report = run_copy(&RealFileSystem, src.path(), &rules);

    assert!(report.is_success(), "unexpected failures: {:?}", report.failures);
    assert_eq!(report.files_copied, 2);
    assert!(!out.path().join("SledgehammerLua/sub/loop").exists());
    Ok(())
}
