// src/fs/mod.rs

//! Filesystem seam for the copy pass.
//!
//! Methods return plain `io::Result`; the copy pass attaches the offending
//! path when it records a failure.

use std::fmt::Debug;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use filetime::FileTime;

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// True if `path` itself is a symbolic link (not followed).
    fn is_symlink(&self, path: &Path) -> bool;

    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Open `path` for writing, truncating any existing file. Permission bits
    /// of a newly created file are the platform default.
    fn create_write(&self, path: &Path) -> io::Result<Box<dyn Write + Send>>;

    /// Give the owner write access to an existing file or directory, so a
    /// read-only mode carried over by an earlier pass does not block the next
    /// one. A missing `path` is not an error.
    fn ensure_writable(&self, path: &Path) -> io::Result<()>;

    /// Set the access and modification times of `dst` to those of `src`.
    fn copy_times(&self, src: &Path, dst: &Path) -> io::Result<()>;

    /// Set the permission bits of `dst` to those of `src`.
    fn copy_permissions(&self, src: &Path, dst: &Path) -> io::Result<()>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            entries.push(entry?.path());
        }
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    // Not `fs::copy`: that would also carry the permission bits over, which
    // must only happen when the rule asks for it.
    fn create_write(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(fs::File::create(path)?))
    }

    fn ensure_writable(&self, path: &Path) -> io::Result<()> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err),
        };
        let mut perms = meta.permissions();
        if grant_owner_write(&mut perms) {
            fs::set_permissions(path, perms)?;
        }
        Ok(())
    }

    fn copy_times(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let meta = fs::metadata(src)?;
        let atime = FileTime::from_last_access_time(&meta);
        let mtime = FileTime::from_last_modification_time(&meta);
        filetime::set_file_times(dst, atime, mtime)
    }

    fn copy_permissions(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let meta = fs::metadata(src)?;
        fs::set_permissions(dst, meta.permissions())
    }
}

/// Add the owner write bit. Returns false when it was already set.
#[cfg(unix)]
fn grant_owner_write(perms: &mut fs::Permissions) -> bool {
    use std::os::unix::fs::PermissionsExt;
    let mode = perms.mode();
    if mode & 0o200 != 0 {
        return false;
    }
    perms.set_mode(mode | 0o200);
    true
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn grant_owner_write(perms: &mut fs::Permissions) -> bool {
    if !perms.readonly() {
        return false;
    }
    perms.set_readonly(false);
    true
}
