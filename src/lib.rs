//! Weave - single-file web asset compiler
//!
//! A source file mixes script with embedded `/*html*/`, `/*css*/` and
//! `/*js.string*/` blocks and pulls in modules through line-leading
//! `:import` directives. Weave resolves the module graph and weaves
//! everything into one HTML page (or an HTML/CSS/JS triple).
//!
//! # Architecture
//!
//! ```text
//! weave-config  - build / logging configuration (serde)
//! weave-vfs     - virtual file system (native, memory, logged)
//! weave-core    - scan → resolve → assemble → emit
//! weave-api     - one call per build invocation
//! weave-cli     - `weave` binary
//! ```
//!
//! # Quick Start
//!
//! ```
//! use std::path::Path;
//! use weave::{build, BuildConfig, MemoryFileSystem, VirtualFileSystem};
//!
//! let fs = MemoryFileSystem::new();
//! fs.write_file(Path::new("/app/main.js"), b"/*html*/<p>hi</p>/*~html*/\nstart();").unwrap();
//!
//! let config = BuildConfig {
//!     output_path: "/dist".into(),
//!     ..BuildConfig::default()
//! };
//! let output = build(Path::new("/app/main.js"), &config, &fs).unwrap();
//! assert_eq!(output.written_paths(), vec![Path::new("/dist/main.html").to_path_buf()]);
//! ```

// 重导出常用类型
pub use weave_api::{
    build, compile, current_dir, list_modules, Artifact, BuildConfig, BuildError, BuildOptions,
    BuildOutput, CompileOutput, ErrorDetails, ErrorReport, ListOptions, OutputDocument,
    OutputMode, Phase, WeaveError,
};
pub use weave_config::{ModuleBinding, NameMatching, NamespaceLayout, ProjectConfig};
pub use weave_vfs::{
    LoggedFileSystem, MemoryFileSystem, NativeFileSystem, VfsError, VirtualFileSystem,
};

pub use weave_api;
pub use weave_config;
pub use weave_vfs;
