//! 模块注册表
//!
//! 单次构建内有效；解析器通过 `&mut` 独占写入，
//! 已注册的模块以 `Arc<ModuleHandle>` 共享且不可变。
//!
//! `:include` / `:css` 引入的原样文件（附件）也记在这里，
//! 按文件路径去重，并记录是哪个源文件按什么顺序引入的。

use super::ModuleName;
use crate::error::BuildError;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};
use weave_config::NameMatching;

/// 编译完成的模块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHandle {
    pub name: ModuleName,
    /// 规范化后的文件路径
    pub path: PathBuf,
    /// 导出的符号（至少一个）
    pub exports: Vec<String>,
    /// 依赖（按 import 顺序）
    pub dependencies: Vec<ModuleName>,
    pub markup: Vec<String>,
    pub stylesheet: Vec<String>,
    /// 注册到命名空间的 IIFE
    pub script: String,
}

/// 附件内容进入文档的哪一部分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Script,
    Stylesheet,
    Markup,
}

impl AttachmentKind {
    /// 按扩展名判断：`.css` 样式，`.html`/`.htm` 标记，其余是脚本
    pub fn for_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "css" => AttachmentKind::Stylesheet,
            "html" | "htm" => AttachmentKind::Markup,
            _ => AttachmentKind::Script,
        }
    }
}

/// 原样引入的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// 规范化后的文件路径
    pub path: PathBuf,
    pub kind: AttachmentKind,
    pub text: String,
}

/// 模块注册表
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    matching: NameMatching,
    modules: BTreeMap<String, Arc<ModuleHandle>>,
    attachments: BTreeMap<PathBuf, Arc<Attachment>>,
    /// 源文件 → 它引入的附件（指令顺序）
    links: BTreeMap<PathBuf, Vec<PathBuf>>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new(NameMatching::Exact)
    }
}

impl ModuleRegistry {
    pub fn new(matching: NameMatching) -> Self {
        Self {
            matching,
            modules: BTreeMap::new(),
            attachments: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    pub fn matching(&self) -> NameMatching {
        self.matching
    }

    /// 注册模块
    ///
    /// 同名同路径视为重复注册，直接返回已有句柄；同名不同路径报错。
    pub fn register(&mut self, handle: ModuleHandle) -> Result<Arc<ModuleHandle>, BuildError> {
        if let Some(existing) = self.check(&handle.name, &handle.path)? {
            trace!(target: "weave::resolve", module = %handle.name, "Already registered");
            return Ok(existing);
        }
        let key = handle.name.key(self.matching);
        let handle = Arc::new(handle);
        debug!(
            target: "weave::resolve",
            module = %handle.name,
            path = %handle.path.display(),
            exports = ?handle.exports,
            "Registered module"
        );
        self.modules.insert(key, handle.clone());
        Ok(handle)
    }

    /// 检查 `name` 能否绑定到 `path`：未注册返回 `None`，同路径返回已有句柄
    pub fn check(
        &self,
        name: &ModuleName,
        path: &Path,
    ) -> Result<Option<Arc<ModuleHandle>>, BuildError> {
        match self.modules.get(&name.key(self.matching)) {
            None => Ok(None),
            Some(existing) if existing.path == path => Ok(Some(existing.clone())),
            Some(existing) => Err(BuildError::DuplicateModule {
                name: name.qualified(),
                existing: existing.path.clone(),
                conflicting: path.to_path_buf(),
            }),
        }
    }

    pub fn lookup(&self, name: &ModuleName) -> Option<Arc<ModuleHandle>> {
        self.modules.get(&name.key(self.matching)).cloned()
    }

    pub fn contains(&self, name: &ModuleName) -> bool {
        self.modules.contains_key(&name.key(self.matching))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// 按键排序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModuleHandle>> {
        self.modules.values()
    }

    /// 已加载的附件
    pub fn attachment(&self, path: &Path) -> Option<Arc<Attachment>> {
        self.attachments.get(path).cloned()
    }

    /// 记录 `source` 引入了 `attachment`；同一文件只保存一份
    pub fn attach(&mut self, source: &Path, attachment: Attachment) -> Arc<Attachment> {
        let path = attachment.path.clone();
        let attachment = self
            .attachments
            .entry(path.clone())
            .or_insert_with(|| Arc::new(attachment))
            .clone();
        self.link(source, &path);
        attachment
    }

    /// 记录 `source` 引入了已加载的附件 `path`；未加载时返回 false
    pub fn link(&mut self, source: &Path, path: &Path) -> bool {
        if !self.attachments.contains_key(path) {
            return false;
        }
        let linked = self.links.entry(source.to_path_buf()).or_default();
        if !linked.iter().any(|p| p == path) {
            trace!(target: "weave::resolve", source = %source.display(), attachment = %path.display(), "Linked attachment");
            linked.push(path.to_path_buf());
        }
        true
    }

    /// `source` 引入的附件，按指令顺序
    pub fn attachments_of(&self, source: &Path) -> Vec<Arc<Attachment>> {
        self.links
            .get(source)
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(|path| self.attachments.get(path).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 依赖优先的模块顺序（后序 DFS，按 import 顺序，结果确定）
    ///
    /// `importer` 是 `roots` 所在的文件，用于报告未注册的 import。
    pub fn dependency_order(
        &self,
        roots: &[ModuleName],
        importer: &Path,
    ) -> Result<Vec<Arc<ModuleHandle>>, BuildError> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut visiting = Vec::new();

        for root in roots {
            self.visit(root, importer, &mut visited, &mut visiting, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        name: &ModuleName,
        importer: &Path,
        visited: &mut HashSet<String>,
        visiting: &mut Vec<ModuleName>,
        order: &mut Vec<Arc<ModuleHandle>>,
    ) -> Result<(), BuildError> {
        let key = name.key(self.matching);
        if visited.contains(&key) {
            return Ok(());
        }
        if let Some(start) = visiting
            .iter()
            .position(|n| n.key(self.matching) == key)
        {
            let mut chain: Vec<String> = visiting[start..].iter().map(|n| n.qualified()).collect();
            chain.push(name.qualified());
            return Err(BuildError::CircularImport { chain });
        }

        let handle = self
            .lookup(name)
            .ok_or_else(|| BuildError::UnresolvedImport {
                name: name.qualified(),
                path: importer.to_path_buf(),
            })?;

        visiting.push(name.clone());
        for dependency in &handle.dependencies {
            self.visit(dependency, &handle.path, visited, visiting, order)?;
        }
        visiting.pop();

        visited.insert(key);
        order.push(handle);
        Ok(())
    }
}
