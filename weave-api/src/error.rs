//! API 错误类型
//!
//! 提供统一的错误类型、进程退出码和结构化错误报告。

use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use weave_core::BuildError;

/// Weave 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeaveError {
    /// 构建错误（结构化）
    #[error("{0}")]
    Build(#[from] BuildError),

    /// 配置或用法错误
    #[error("Config error: {0}")]
    Config(String),
}

impl WeaveError {
    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            WeaveError::Build(e) => e.phase().map(|p| p.as_str()).unwrap_or("io"),
            WeaveError::Config(_) => "config",
        }
    }

    /// 错误类型（可用于程序化处理）
    pub fn kind(&self) -> &'static str {
        match self {
            WeaveError::Build(BuildError::MalformedBlock { .. }) => "MalformedBlock",
            WeaveError::Build(BuildError::ModuleNotFound { .. }) => "ModuleNotFound",
            WeaveError::Build(BuildError::CircularImport { .. }) => "CircularImport",
            WeaveError::Build(BuildError::DuplicateModule { .. }) => "DuplicateModule",
            WeaveError::Build(BuildError::UnresolvedImport { .. }) => "UnresolvedImport",
            WeaveError::Build(BuildError::Io { .. }) => "Io",
            WeaveError::Build(BuildError::InvalidUtf8 { .. }) => "InvalidUtf8",
            WeaveError::Config(_) => "Config",
        }
    }

    /// 进程退出码
    pub fn exit_code(&self) -> i32 {
        match self {
            WeaveError::Build(BuildError::MalformedBlock { .. }) => 2,
            WeaveError::Build(BuildError::ModuleNotFound { .. }) => 3,
            WeaveError::Build(BuildError::CircularImport { .. }) => 4,
            WeaveError::Build(BuildError::DuplicateModule { .. }) => 5,
            WeaveError::Build(BuildError::Io { .. } | BuildError::InvalidUtf8 { .. }) => 6,
            WeaveError::Build(BuildError::UnresolvedImport { .. }) => 70,
            WeaveError::Config(_) => 64,
        }
    }

    /// 获取错误行号（如果有）
    pub fn line(&self) -> Option<usize> {
        match self {
            WeaveError::Build(e) => e.line(),
            WeaveError::Config(_) => None,
        }
    }

    /// 获取错误列号（如果有）
    pub fn column(&self) -> Option<usize> {
        match self {
            WeaveError::Build(e) => e.column(),
            WeaveError::Config(_) => None,
        }
    }

    /// 相关源文件（如果有）
    pub fn path(&self) -> Option<&Path> {
        match self {
            WeaveError::Build(e) => e.path(),
            WeaveError::Config(_) => None,
        }
    }

    /// 转换为结构化错误报告
    ///
    /// CLI 可以直接打印，上层应用可以序列化为 JSON。
    pub fn to_report(&self) -> ErrorReport {
        let details = match self {
            WeaveError::Build(BuildError::ModuleNotFound { name, searched, .. }) => {
                Some(ErrorDetails::NotFound {
                    module: name.clone(),
                    searched: searched.iter().map(|p| p.display().to_string()).collect(),
                })
            }
            WeaveError::Build(BuildError::CircularImport { chain }) => {
                Some(ErrorDetails::Cycle { chain: chain.clone() })
            }
            WeaveError::Build(BuildError::DuplicateModule {
                name,
                existing,
                conflicting,
            }) => Some(ErrorDetails::Duplicate {
                module: name.clone(),
                existing: existing.display().to_string(),
                conflicting: conflicting.display().to_string(),
            }),
            _ => None,
        };

        ErrorReport {
            phase: self.phase(),
            kind: self.kind(),
            path: self.path().map(|p| p.display().to_string()),
            line: self.line(),
            column: self.column(),
            message: self.to_string(),
            exit_code: self.exit_code(),
            details,
        }
    }
}

/// 结构化错误报告
///
/// 上层应用（CLI、编辑器插件）可以根据自己的需求格式化。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// 错误阶段: scan, resolve, assemble, emit, io, config
    pub phase: &'static str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// 错误行号（1-based，如果有）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 错误列号（1-based，如果有）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// 人类可读的错误消息
    pub message: String,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// 错误额外详情
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ErrorDetails {
    NotFound {
        module: String,
        searched: Vec<String>,
    },
    Cycle {
        chain: Vec<String>,
    },
    Duplicate {
        module: String,
        existing: String,
        conflicting: String,
    },
}

impl std::fmt::Display for ErrorReport {
    /// 默认的 CLI 友好格式
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.path, self.line, self.column) {
            (Some(path), Some(line), Some(col)) => {
                write!(f, "[{}:{}:{}] {} error: {}", path, line, col, self.phase, self.message)
            }
            (Some(path), Some(line), None) => {
                write!(f, "[{}:{}] {} error: {}", path, line, self.phase, self.message)
            }
            _ => write!(f, "[{}] error: {}", self.phase, self.message),
        }
    }
}
