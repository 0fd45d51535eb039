// src/fs/mock.rs

//! In-memory filesystem for tests.
//!
//! Paths are stored exactly as given (no normalisation), so tests should use
//! the same spelling for setup and assertions. Writes to paths registered
//! with [`MockFileSystem::fail_writes_to`] fail with `PermissionDenied`;
//! reads from paths registered with [`MockFileSystem::fail_reads_from`] fail
//! the same way. Files and directories carry a Unix-style `mode` and an
//! integer `mtime`. Without the owner write bit a file cannot be opened for
//! writing and a directory cannot receive new entries.

use std::collections::{BTreeMap, HashSet};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::FileSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEntry {
    File {
        data: Vec<u8>,
        mtime: i64,
        mode: u32,
    },
    Dir {
        mtime: i64,
        mode: u32,
    },
}

#[derive(Debug, Default)]
struct MockState {
    entries: BTreeMap<PathBuf, MockEntry>,
    read_only: HashSet<PathBuf>,
    unreadable: HashSet<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

/// Default mode given to files created by `create_write`.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Default mode of directories created by setup helpers or `create_dir_all`.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Modification time given to files and directories the copy pass creates.
pub const FRESH_MTIME: i64 = -1;

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a file (and its parent directories) with the given metadata.
    pub fn add_file_with(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        mtime: i64,
        mode: u32,
    ) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.lock();
        if let Some(parent) = path.parent() {
            insert_dirs(&mut state.entries, parent, 0);
        }
        state.entries.insert(
            path,
            MockEntry::File {
                data: content.into(),
                mtime,
                mode,
            },
        );
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.add_file_with(path, content, 0, DEFAULT_FILE_MODE);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        insert_dirs(&mut state.entries, path.as_ref(), 0);
    }

    /// Add a directory (and its parents) and set its own metadata.
    pub fn add_dir_with(&self, path: impl AsRef<Path>, mtime: i64, mode: u32) {
        let path = path.as_ref();
        let mut state = self.lock();
        insert_dirs(&mut state.entries, path, 0);
        state
            .entries
            .insert(path.to_path_buf(), MockEntry::Dir { mtime, mode });
    }

    /// Make every later write to `path` fail.
    pub fn fail_writes_to(&self, path: impl AsRef<Path>) {
        self.lock().read_only.insert(path.as_ref().to_path_buf());
    }

    /// Make every later read of `path` fail.
    pub fn fail_reads_from(&self, path: impl AsRef<Path>) {
        self.lock().unreadable.insert(path.as_ref().to_path_buf());
    }

    pub fn entry(&self, path: impl AsRef<Path>) -> Option<MockEntry> {
        self.lock().entries.get(path.as_ref()).cloned()
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.entry(path) {
            Some(MockEntry::File { data, .. }) => Some(data),
            _ => None,
        }
    }

    /// All file paths currently stored under `root`.
    pub fn files_under(&self, root: impl AsRef<Path>) -> Vec<PathBuf> {
        let root = root.as_ref();
        self.lock()
            .entries
            .iter()
            .filter(|(p, e)| p.starts_with(root) && matches!(e, MockEntry::File { .. }))
            .map(|(p, _)| p.clone())
            .collect()
    }
}

/// Appends straight into the shared tree so partial writes stay visible.
struct MockWriter {
    state: Arc<Mutex<MockState>>,
    path: PathBuf,
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        match state.entries.get_mut(&self.path) {
            Some(MockEntry::File { data, .. }) => {
                data.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(not_found(&self.path)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn insert_dirs(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path, mtime: i64) {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        entries.entry(ancestor.to_path_buf()).or_insert(MockEntry::Dir {
            mtime,
            mode: DEFAULT_DIR_MODE,
        });
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
}

fn denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("permission denied: {}", path.display()),
    )
}

impl MockState {
    fn check_writable(&self, path: &Path) -> io::Result<()> {
        if self.read_only.contains(path) {
            return Err(denied(path));
        }
        Ok(())
    }

    /// New entries need the owner write bit on an existing parent directory.
    fn check_parent_writable(&self, path: &Path) -> io::Result<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        match self.entries.get(parent) {
            Some(MockEntry::Dir { mode, .. }) if mode & 0o200 == 0 => Err(denied(parent)),
            _ => Ok(()),
        }
    }

    /// Every ancestor of `path` must be a directory (or absent).
    fn check_parents(&self, path: &Path) -> io::Result<()> {
        for ancestor in path.ancestors().skip(1) {
            if let Some(MockEntry::File { .. }) = self.entries.get(ancestor) {
                return Err(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("{} is not a directory", ancestor.display()),
                ));
            }
        }
        Ok(())
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir { .. }))
    }

    fn is_symlink(&self, _path: &Path) -> bool {
        false
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::Dir { .. }) => Ok(state
                .entries
                .keys()
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect()),
            Some(MockEntry::File { .. }) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        state.check_parents(path)?;
        match state.entries.get(path) {
            Some(MockEntry::Dir { .. }) => return Ok(()),
            Some(MockEntry::File { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists and is a file", path.display()),
                ));
            }
            None => {}
        }
        state.check_writable(path)?;
        state.check_parent_writable(path)?;
        insert_dirs(&mut state.entries, path, FRESH_MTIME);
        Ok(())
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let state = self.lock();
        if state.unreadable.contains(path) {
            return Err(denied(path));
        }
        match state.entries.get(path) {
            Some(MockEntry::File { data, .. }) => Ok(Box::new(Cursor::new(data.clone()))),
            Some(MockEntry::Dir { .. }) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn create_write(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        let mut state = self.lock();
        state.check_writable(path)?;
        state.check_parents(path)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !state.entries.contains_key(parent) {
                return Err(not_found(parent));
            }
        }
        let (mtime, mode) = match state.entries.get(path) {
            Some(MockEntry::File { mode, .. }) if mode & 0o200 == 0 => {
                return Err(denied(path));
            }
            Some(MockEntry::File { mtime, mode, .. }) => (*mtime, *mode),
            Some(MockEntry::Dir { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::IsADirectory,
                    format!("{} is a directory", path.display()),
                ));
            }
            None => {
                state.check_parent_writable(path)?;
                (FRESH_MTIME, DEFAULT_FILE_MODE)
            }
        };
        state.entries.insert(
            path.to_path_buf(),
            MockEntry::File {
                data: Vec::new(),
                mtime,
                mode,
            },
        );
        Ok(Box::new(MockWriter {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
        }))
    }

    fn ensure_writable(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        state.check_writable(path)?;
        if let Some(MockEntry::File { mode, .. } | MockEntry::Dir { mode, .. }) =
            state.entries.get_mut(path)
        {
            *mode |= 0o200;
        }
        Ok(())
    }

    fn copy_times(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let mut state = self.lock();
        let (src_mtime, _) = metadata(&state, src)?;
        state.check_writable(dst)?;
        match state.entries.get_mut(dst) {
            Some(MockEntry::File { mtime, .. } | MockEntry::Dir { mtime, .. }) => {
                *mtime = src_mtime;
                Ok(())
            }
            None => Err(not_found(dst)),
        }
    }

    fn copy_permissions(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let mut state = self.lock();
        let (_, src_mode) = metadata(&state, src)?;
        state.check_writable(dst)?;
        match state.entries.get_mut(dst) {
            Some(MockEntry::File { mode, .. } | MockEntry::Dir { mode, .. }) => {
                *mode = src_mode;
                Ok(())
            }
            None => Err(not_found(dst)),
        }
    }
}

fn metadata(state: &MockState, path: &Path) -> io::Result<(i64, u32)> {
    match state.entries.get(path) {
        Some(MockEntry::File { mtime, mode, .. } | MockEntry::Dir { mtime, mode }) => {
            Ok((*mtime, *mode))
        }
        None => Err(not_found(path)),
    }
}
