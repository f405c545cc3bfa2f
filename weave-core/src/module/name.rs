//! 模块名与文件路径映射
//!
//! 模块名形如 `namespace.Identifier`，命名空间本身可以带点（`app.ui.Widget`），
//! 最后一个点之后是标识符。

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use weave_config::{BuildConfig, NameMatching, NamespaceLayout};

/// 模块名解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("module name is empty")]
    Empty,

    #[error("module name '{0}' has no namespace (expected namespace.Identifier)")]
    MissingNamespace(String),

    #[error("module name '{name}' contains an invalid segment '{segment}'")]
    InvalidSegment { name: String, segment: String },
}

/// 模块名
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleName {
    namespace: String,
    identifier: String,
}

impl ModuleName {
    pub fn parse(text: &str) -> Result<Self, NameError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NameError::Empty);
        }
        let (namespace, identifier) = text
            .rsplit_once('.')
            .ok_or_else(|| NameError::MissingNamespace(text.to_string()))?;

        for segment in namespace.split('.').chain(std::iter::once(identifier)) {
            if !is_name_segment(segment) {
                return Err(NameError::InvalidSegment {
                    name: text.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self {
            namespace: namespace.to_string(),
            identifier: identifier.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// 命名空间的各级（`app.ui` → `app`, `ui`）
    pub fn namespace_segments(&self) -> impl Iterator<Item = &str> {
        self.namespace.split('.')
    }

    /// `namespace.Identifier`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.namespace, self.identifier)
    }

    /// 注册表键
    pub fn key(&self, matching: NameMatching) -> String {
        match matching {
            NameMatching::Exact => self.qualified(),
            NameMatching::IgnoreCase => self.qualified().to_lowercase(),
        }
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.identifier)
    }
}

impl FromStr for ModuleName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// 模块名的一段：非空，`[A-Za-z0-9_$]+`
pub fn is_name_segment(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// JS 标识符（受限子集）：`[A-Za-z_$][A-Za-z0-9_$]*`
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// 模块名 → 文件路径 的映射规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePolicy {
    pub matching: NameMatching,
    pub layout: NamespaceLayout,
    pub extension: String,
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self {
            matching: NameMatching::Exact,
            layout: NamespaceLayout::Nested,
            extension: "js".to_string(),
        }
    }
}

impl NamePolicy {
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            matching: config.name_matching,
            layout: config.namespace_layout,
            extension: config.script_extension.trim_start_matches('.').to_string(),
        }
    }

    /// 模块相对搜索根的路径
    ///
    /// - Nested: `app.ui.Widget` → `app/ui/Widget.js`
    /// - Flat:   `app.ui.Widget` → `app.ui.Widget.js`
    pub fn relative_path(&self, name: &ModuleName) -> PathBuf {
        let file_name = match self.layout {
            NamespaceLayout::Nested => format!("{}.{}", name.identifier(), self.extension),
            NamespaceLayout::Flat => format!("{}.{}", name.qualified(), self.extension),
        };
        let mut path = PathBuf::new();
        if self.layout == NamespaceLayout::Nested {
            for segment in name.namespace_segments() {
                path.push(segment);
            }
        }
        path.push(file_name);
        path
    }
}

/// 词法规范化路径：去掉 `.`，折叠 `..`（不访问文件系统）
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}
