//! 构建错误
//!
//! 每个变体都携带足够的上下文（文件、行号、模块名），
//! 调用方不需要再回头查源文件就能给出可操作的诊断。

use std::path::{Path, PathBuf};
use thiserror::Error;
use weave_config::Phase;
use weave_vfs::VfsError;

/// 构建过程中的错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// 块标记不配对、嵌套，或指令语法错误
    #[error("{}:{line}:{column}: malformed source: {message}", path.display())]
    MalformedBlock {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// 所有搜索根下都找不到被导入的模块
    #[error(
        "module '{name}' not found (imported from {}:{line}); searched: {}",
        importer.display(),
        join_paths(searched)
    )]
    ModuleNotFound {
        name: String,
        importer: PathBuf,
        line: usize,
        searched: Vec<PathBuf>,
    },

    /// 导入链成环，`chain` 首尾是同一个模块
    #[error("circular import: {}", chain.join(" → "))]
    CircularImport { chain: Vec<String> },

    /// 同一模块名绑定到了两个不同的文件
    #[error(
        "duplicate module '{name}': already bound to {}, cannot rebind to {}",
        existing.display(),
        conflicting.display()
    )]
    DuplicateModule {
        name: String,
        existing: PathBuf,
        conflicting: PathBuf,
    },

    /// 组装时发现 import 没有对应的已注册模块（解析阶段的缺陷）
    #[error("import of '{name}' in {} has no registered module", path.display())]
    UnresolvedImport { name: String, path: PathBuf },

    /// 文件读写错误
    #[error("I/O error: {}", io_message(path, source))]
    Io {
        path: PathBuf,
        #[source]
        source: VfsError,
    },

    /// 源文件不是合法的 UTF-8
    #[error("{} is not valid UTF-8", path.display())]
    InvalidUtf8 { path: PathBuf },
}

impl BuildError {
    /// 包装 VFS 错误；编码错误单独归类
    pub fn io(path: &Path, source: VfsError) -> Self {
        match source {
            VfsError::InvalidUtf8 { .. } => BuildError::InvalidUtf8 {
                path: path.to_path_buf(),
            },
            source => BuildError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// 错误所属的构建阶段；I/O 错误可能发生在任何阶段
    pub fn phase(&self) -> Option<Phase> {
        match self {
            BuildError::MalformedBlock { .. } => Some(Phase::Scan),
            BuildError::ModuleNotFound { .. }
            | BuildError::CircularImport { .. }
            | BuildError::DuplicateModule { .. } => Some(Phase::Resolve),
            BuildError::UnresolvedImport { .. } => Some(Phase::Assemble),
            BuildError::Io { .. } | BuildError::InvalidUtf8 { .. } => None,
        }
    }

    /// 相关源文件（如果有）
    pub fn path(&self) -> Option<&Path> {
        match self {
            BuildError::MalformedBlock { path, .. }
            | BuildError::UnresolvedImport { path, .. }
            | BuildError::Io { path, .. }
            | BuildError::InvalidUtf8 { path } => Some(path),
            BuildError::ModuleNotFound { importer, .. } => Some(importer),
            BuildError::DuplicateModule { conflicting, .. } => Some(conflicting),
            BuildError::CircularImport { .. } => None,
        }
    }

    /// 行号（如果有）
    pub fn line(&self) -> Option<usize> {
        match self {
            BuildError::MalformedBlock { line, .. } | BuildError::ModuleNotFound { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }

    /// 列号（如果有）
    pub fn column(&self) -> Option<usize> {
        match self {
            BuildError::MalformedBlock { column, .. } => Some(*column),
            _ => None,
        }
    }
}

/// VFS 错误本身带路径时不再重复
fn io_message(path: &Path, source: &VfsError) -> String {
    match source.path() {
        Some(_) => source.to_string(),
        None => format!("{}: {}", path.display(), source),
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no search paths)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = BuildError::MalformedBlock {
            path: PathBuf::from("app/main.js"),
            line: 3,
            column: 5,
            message: "unterminated '/*html*/' block".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "app/main.js:3:5: malformed source: unterminated '/*html*/' block"
        );
        assert_eq!(err.phase(), Some(Phase::Scan));
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.column(), Some(5));
    }

    #[test]
    fn test_not_found_lists_searched_paths() {
        let err = BuildError::ModuleNotFound {
            name: "ui.Missing".to_string(),
            importer: PathBuf::from("main.js"),
            line: 1,
            searched: vec![PathBuf::from("lib/ui/Missing.js"), PathBuf::from("vendor/ui/Missing.js")],
        };
        let message = err.to_string();
        assert!(message.contains("ui.Missing"));
        assert!(message.contains("main.js:1"));
        assert!(message.contains("lib/ui/Missing.js, vendor/ui/Missing.js"));
        assert_eq!(err.phase(), Some(Phase::Resolve));
        assert_eq!(err.path(), Some(Path::new("main.js")));
    }

    #[test]
    fn test_circular_chain() {
        let err = BuildError::CircularImport {
            chain: vec!["a.A".into(), "b.B".into(), "a.A".into()],
        };
        assert_eq!(err.to_string(), "circular import: a.A → b.B → a.A");
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_io_wraps_vfs_error() {
        let path = Path::new("/missing.js");
        let err = BuildError::io(
            path,
            VfsError::NotFound {
                path: "/missing.js".to_string(),
            },
        );
        assert_eq!(err.to_string(), "I/O error: Path not found: /missing.js");
        assert_eq!(err.phase(), None);
        assert_eq!(err.path(), Some(path));
    }

    #[test]
    fn test_io_message_names_path_once() {
        let err = BuildError::io(
            Path::new("/dist/main.html"),
            VfsError::Io {
                path: "/dist/main.html".to_string(),
                message: "disk full".to_string(),
            },
        );
        let message = err.to_string();
        assert_eq!(message.matches("/dist/main.html").count(), 1);
        assert_eq!(message, "I/O error: IO error on '/dist/main.html': disk full");

        let err = BuildError::io(
            Path::new("/dist/main.html"),
            VfsError::Custom {
                message: "Lock poisoned".to_string(),
            },
        );
        assert_eq!(err.to_string(), "I/O error: /dist/main.html: Lock poisoned");
    }

    #[test]
    fn test_invalid_utf8_is_classified() {
        let path = Path::new("/bad.js");
        let err = BuildError::io(
            path,
            VfsError::InvalidUtf8 {
                path: "/bad.js".to_string(),
            },
        );
        assert_eq!(
            err,
            BuildError::InvalidUtf8 {
                path: PathBuf::from("/bad.js")
            }
        );
    }
}
