//! In-memory file system implementation

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<String, Vec<u8>>,
    /// Directories created explicitly; parents of files are implicit
    dirs: BTreeSet<String>,
}

/// An in-memory file system implementation.
///
/// All files are stored in a `BTreeMap` keyed by a `/`-separated path,
/// making it suitable for tests and for builds that must not touch disk.
/// Clones share the same tree.
///
/// # Example
/// ```
/// use weave_vfs::{MemoryFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::with_files([("/ui/Widget.js", b"var widget;".to_vec())]);
/// assert!(fs.is_dir(Path::new("/ui")));
/// assert_eq!(fs.read_file(Path::new("/ui/Widget.js")).unwrap(), b"var widget;");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    tree: Arc<RwLock<Tree>>,
}

impl MemoryFileSystem {
    /// Create a new empty memory file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new memory file system pre-populated with files.
    ///
    /// # Arguments
    /// * `files` - Iterator of (path, content) tuples
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let fs = Self::new();
        if let Ok(mut tree) = fs.tree.write() {
            for (path, content) in files {
                tree.files
                    .insert(normalize(Path::new(path.as_ref())), content);
            }
        }
        fs
    }

    /// Paths of all files, sorted
    pub fn file_paths(&self) -> Vec<PathBuf> {
        match self.tree.read() {
            Ok(tree) => tree.files.keys().map(PathBuf::from).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn poisoned() -> VfsError {
        VfsError::Custom {
            message: String::from("Lock poisoned"),
        }
    }
}

/// Normalize a path for internal storage.
/// Uses forward slashes consistently and drops trailing separators.
fn normalize(path: &Path) -> String {
    let mut normalized = path.to_string_lossy().replace('\\', "/");
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

fn dir_prefix(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{}/", dir)
    }
}

impl Tree {
    fn is_dir(&self, dir: &str) -> bool {
        if self.dirs.contains(dir) {
            return true;
        }
        let prefix = dir_prefix(dir);
        self.files.keys().any(|key| key.starts_with(&prefix))
            || self.dirs.iter().any(|key| key.starts_with(&prefix))
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = normalize(path);
        let tree = self.tree.read().map_err(|_| Self::poisoned())?;

        tree.files
            .get(&normalized)
            .cloned()
            .ok_or(VfsError::NotFound { path: normalized })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let normalized = normalize(path);
        let mut tree = self.tree.write().map_err(|_| Self::poisoned())?;
        tree.files.insert(normalized, content.to_vec());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()> {
        let from = normalize(from);
        let mut tree = self.tree.write().map_err(|_| Self::poisoned())?;
        let content = tree
            .files
            .remove(&from)
            .ok_or(VfsError::NotFound { path: from })?;
        tree.files.insert(normalize(to), content);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> VfsResult<()> {
        let normalized = normalize(path);
        let mut tree = self.tree.write().map_err(|_| Self::poisoned())?;
        match tree.files.remove(&normalized) {
            Some(_) => Ok(()),
            None => Err(VfsError::NotFound { path: normalized }),
        }
    }

    fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        let normalized = normalize(path);
        let mut tree = self.tree.write().map_err(|_| Self::poisoned())?;
        tree.dirs.insert(normalized);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let normalized = normalize(path);
        match self.tree.read() {
            Ok(tree) => tree.files.contains_key(&normalized),
            Err(_) => false,
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let normalized = normalize(path);
        match self.tree.read() {
            Ok(tree) => tree.is_dir(&normalized),
            Err(_) => false,
        }
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<PathBuf>> {
        let normalized = normalize(path);
        let tree = self.tree.read().map_err(|_| Self::poisoned())?;
        if !tree.is_dir(&normalized) {
            return Err(VfsError::NotFound { path: normalized });
        }

        let prefix = dir_prefix(&normalized);
        let children: BTreeSet<String> = tree
            .files
            .keys()
            .chain(tree.dirs.iter())
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .filter(|name| !name.is_empty())
            .map(|name| format!("{}{}", prefix, name))
            .collect();

        Ok(children.into_iter().map(PathBuf::from).collect())
    }
}
