//! Weave Virtual File System
//!
//! A virtual file system abstraction with multiple backend implementations.
//! The compiler reads sources and writes artifacts only through
//! [`VirtualFileSystem`], so whole builds can run in memory.
//!
//! # Usage
//! ```rust
//! use weave_vfs::{VirtualFileSystem, MemoryFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::new();
//! fs.write_file(Path::new("/src/Main.js"), b"cycle();").unwrap();
//! let content = fs.read_to_string(Path::new("/src/Main.js")).unwrap();
//! assert_eq!(content, "cycle();");
//! ```

mod error;
mod logged;
mod memory;
mod native;
mod r#trait;

pub use error::{VfsError, VfsResult};
pub use logged::LoggedFileSystem;
pub use memory::MemoryFileSystem;
pub use native::NativeFileSystem;
pub use r#trait::VirtualFileSystem;

/// Create a new memory-based file system.
pub fn memory_fs() -> MemoryFileSystem {
    MemoryFileSystem::new()
}

/// Create a new native file system.
pub fn native_fs() -> NativeFileSystem {
    NativeFileSystem::new()
}
