//! 测试辅助工具
//!
//! 在内存文件系统上跑完整的 scan → resolve → assemble 流程

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use weave_config::{BuildOptions, NameMatching};
use weave_core::{
    scan, Assembler, BuildError, ImportResolver, ModuleRegistry, NamePolicy, OutputDocument,
};
use weave_vfs::{MemoryFileSystem, VirtualFileSystem};

/// 创建测试用的内存文件系统
pub fn create_test_fs(files: &[(&str, &str)]) -> MemoryFileSystem {
    MemoryFileSystem::with_files(
        files
            .iter()
            .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec())),
    )
}

/// 一次构建的结果
pub struct Compiled {
    pub document: OutputDocument,
    pub registry: ModuleRegistry,
    pub scans: usize,
}

/// 从 `entry` 开始编译，搜索根为 `roots`
pub fn compile(
    vfs: &dyn VirtualFileSystem,
    entry: &str,
    roots: &[&str],
) -> Result<Compiled, BuildError> {
    compile_with(vfs, entry, roots, NamePolicy::default(), &BuildOptions::default())
}

pub fn compile_with(
    vfs: &dyn VirtualFileSystem,
    entry: &str,
    roots: &[&str],
    policy: NamePolicy,
    options: &BuildOptions,
) -> Result<Compiled, BuildError> {
    let entry_path = Path::new(entry);
    let text = vfs
        .read_to_string(entry_path)
        .map_err(|e| BuildError::io(entry_path, e))?;
    let source = scan(entry_path, text)?;

    let mut registry = ModuleRegistry::new(policy.matching);
    let roots: Vec<PathBuf> = roots.iter().map(PathBuf::from).collect();
    let mut resolver =
        ImportResolver::new(vfs, roots, policy).with_exclude_markers(&options.exclude_markers);
    resolver.resolve_imports(&source, &mut registry)?;

    let document = Assembler::new(&registry, options).assemble(&source)?;
    Ok(Compiled {
        document,
        registry,
        scans: resolver.scans(),
    })
}

/// 忽略大小写的命名策略
pub fn ignore_case() -> NamePolicy {
    NamePolicy {
        matching: NameMatching::IgnoreCase,
        ..NamePolicy::default()
    }
}
