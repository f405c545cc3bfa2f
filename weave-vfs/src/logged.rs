//! Logging wrapper for VFS operations

use crate::error::VfsResult;
use crate::VirtualFileSystem;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, trace, warn};

/// Wraps another file system, tracing every operation under the
/// `weave::vfs` target and counting reads per path.
pub struct LoggedFileSystem<F> {
    inner: F,
    reads: Mutex<BTreeMap<PathBuf, usize>>,
}

impl<F: VirtualFileSystem> LoggedFileSystem<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            reads: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of `read_file` calls made for `path`
    pub fn reads(&self, path: &Path) -> usize {
        self.reads
            .lock()
            .map(|reads| reads.get(path).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Total number of `read_file` calls
    pub fn total_reads(&self) -> usize {
        self.reads
            .lock()
            .map(|reads| reads.values().sum())
            .unwrap_or(0)
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: VirtualFileSystem> VirtualFileSystem for LoggedFileSystem<F> {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        if let Ok(mut reads) = self.reads.lock() {
            *reads.entry(path.to_path_buf()).or_insert(0) += 1;
        }
        let result = self.inner.read_file(path);
        match &result {
            Ok(bytes) => debug!(target: "weave::vfs", path = %path.display(), bytes = bytes.len(), "read_file"),
            Err(e) => warn!(target: "weave::vfs", path = %path.display(), error = %e, "read_file failed"),
        }
        result
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        debug!(target: "weave::vfs", path = %path.display(), bytes = content.len(), "write_file");
        self.inner.write_file(path, content)
    }

    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()> {
        debug!(target: "weave::vfs", from = %from.display(), to = %to.display(), "rename");
        self.inner.rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> VfsResult<()> {
        debug!(target: "weave::vfs", path = %path.display(), "remove_file");
        self.inner.remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        trace!(target: "weave::vfs", path = %path.display(), "create_dir_all");
        self.inner.create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        let result = self.inner.exists(path);
        trace!(target: "weave::vfs", path = %path.display(), result, "exists");
        result
    }

    fn is_file(&self, path: &Path) -> bool {
        let result = self.inner.is_file(path);
        trace!(target: "weave::vfs", path = %path.display(), result, "is_file");
        result
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<PathBuf>> {
        trace!(target: "weave::vfs", path = %path.display(), "read_dir");
        self.inner.read_dir(path)
    }
}
