//! VirtualFileSystem trait definition

use crate::error::{VfsError, VfsResult};
use std::path::{Path, PathBuf};

/// Virtual File System trait
///
/// Provides a unified interface for file operations, decoupling the
/// compiler from specific file system implementations.
///
/// # Implementations
/// - `MemoryFileSystem`: In-memory file system
/// - `NativeFileSystem`: Native OS file system
/// - `LoggedFileSystem`: Tracing wrapper around another implementation
pub trait VirtualFileSystem: Send + Sync {
    /// Read file contents
    ///
    /// # Arguments
    /// * `path` - File path
    ///
    /// # Returns
    /// File contents as bytes, or VfsError
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Write file contents
    ///
    /// Creates the file if it doesn't exist, truncates it if it does.
    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    /// Move a file, replacing `to` if it exists
    fn rename(&self, from: &Path, to: &Path) -> VfsResult<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> VfsResult<()>;

    /// Create a directory and all missing parents
    fn create_dir_all(&self, path: &Path) -> VfsResult<()>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path exists and is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// List the direct children of a directory, sorted by path
    fn read_dir(&self, path: &Path) -> VfsResult<Vec<PathBuf>>;

    /// Read a file and decode it as UTF-8
    fn read_to_string(&self, path: &Path) -> VfsResult<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes).map_err(|_| VfsError::InvalidUtf8 {
            path: path.to_string_lossy().to_string(),
        })
    }
}
