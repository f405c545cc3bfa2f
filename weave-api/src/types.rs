//! API 输出类型

use std::path::PathBuf;
use std::sync::Arc;
use weave_core::{Artifact, ModuleHandle, OutputDocument};

/// 编译结果（尚未写出）
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// 规范化后的入口路径
    pub entry: PathBuf,
    pub document: OutputDocument,
    /// 入口依赖的模块，依赖优先
    pub modules: Vec<Arc<ModuleHandle>>,
    /// 扫描过的模块文件数
    pub scans: usize,
}

/// 构建结果
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub compiled: CompileOutput,
    /// 已写出的文件
    pub artifacts: Vec<Artifact>,
}

impl BuildOutput {
    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.artifacts.iter().map(|a| a.path.clone()).collect()
    }
}

/// `list` 的输出格式
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// 每行前缀
    pub prefix: String,
    /// 每行后缀
    pub suffix: String,
    /// 相对路径以此为基准转成绝对路径
    pub absolute_base: Option<PathBuf>,
}
