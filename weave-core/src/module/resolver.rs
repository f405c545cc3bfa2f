//! 导入解析器
//!
//! 从源文件的 `:import` 指令出发，按搜索根顺序定位模块文件，
//! 扫描、递归解析其依赖、编译后注册到 [`ModuleRegistry`]。
//!
//! 显式绑定先全部登记到绑定表，定位模块时绑定表优先于搜索根，
//! 所以绑定的先后顺序不影响结果。
//!
//! 循环依赖通过沿递归传递的导入链检测；已注册的模块直接复用，
//! 同一模块在一次构建中最多扫描一次。
//!
//! `:include` 先相对引入它的文件查找，再依次查搜索根；
//! `:css ns.Id` 按模块名映射到 `ns/Id.css` 在搜索根中查找。

use super::name::{normalize_path, NamePolicy};
use super::registry::{Attachment, AttachmentKind};
use super::{ModuleHandle, ModuleName, ModuleRegistry};
use crate::assembler::compile_module;
use crate::error::BuildError;
use crate::scanner::{scan, SegmentKind, SourceFile};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};
use weave_config::NameMatching;
use weave_vfs::VirtualFileSystem;

/// import 出现的位置
#[derive(Debug, Clone, Copy)]
struct Origin<'a> {
    path: &'a Path,
    line: usize,
}

/// 模块解析器
pub struct ImportResolver<'a> {
    vfs: &'a dyn VirtualFileSystem,
    roots: Vec<PathBuf>,
    policy: NamePolicy,
    /// 显式绑定：注册表键 → (模块名, 规范化路径)
    bindings: BTreeMap<String, (ModuleName, PathBuf)>,
    /// 内容含这些标记的附件被跳过
    exclude_markers: Vec<String>,
    /// 已扫描的模块文件数
    scans: usize,
}

impl<'a> ImportResolver<'a> {
    /// 创建解析器；`roots` 按优先级排列
    pub fn new(vfs: &'a dyn VirtualFileSystem, roots: Vec<PathBuf>, policy: NamePolicy) -> Self {
        let roots = roots.iter().map(|root| normalize_path(root)).collect();
        Self {
            vfs,
            roots,
            policy,
            bindings: BTreeMap::new(),
            exclude_markers: Vec::new(),
            scans: 0,
        }
    }

    /// 跳过内容含任一标记的 `:include` / `:css` 文件
    pub fn with_exclude_markers(mut self, markers: &[String]) -> Self {
        self.exclude_markers = markers.iter().filter(|m| !m.is_empty()).cloned().collect();
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn policy(&self) -> &NamePolicy {
        &self.policy
    }

    /// 本次构建中扫描过的模块文件数
    pub fn scans(&self) -> usize {
        self.scans
    }

    /// 解析 `source` 的全部 import 和附件（递归）
    pub fn resolve_imports(
        &mut self,
        source: &SourceFile,
        registry: &mut ModuleRegistry,
    ) -> Result<(), BuildError> {
        let mut chain = Vec::new();
        self.resolve_file(source, registry, &mut chain)
    }

    /// 把模块名显式绑定到文件（只登记，不加载）
    ///
    /// 同名同文件重复绑定是空操作；同名不同文件报 `DuplicateModule`。
    pub fn bind(&mut self, name: &ModuleName, path: &Path) -> Result<(), BuildError> {
        let path = normalize_path(path);
        let key = name.key(self.policy.matching);
        match self.bindings.get(&key) {
            Some((_, existing)) if *existing == path => {
                trace!(target: "weave::resolve", module = %name, "Binding already recorded");
                Ok(())
            }
            Some((_, existing)) => Err(BuildError::DuplicateModule {
                name: name.qualified(),
                existing: existing.clone(),
                conflicting: path,
            }),
            None => {
                debug!(target: "weave::resolve", module = %name, path = %path.display(), "Explicit binding");
                self.bindings.insert(key, (name.clone(), path));
                Ok(())
            }
        }
    }

    /// 加载全部显式绑定的模块；绑定之间的 import 走绑定表
    pub fn load_bindings(&mut self, registry: &mut ModuleRegistry) -> Result<(), BuildError> {
        let bound: Vec<(ModuleName, PathBuf)> = self.bindings.values().cloned().collect();
        for (name, path) in &bound {
            let origin = Origin { path, line: 0 };
            let mut chain = Vec::new();
            self.resolve(name, origin, registry, &mut chain)?;
        }
        Ok(())
    }

    fn resolve_file(
        &mut self,
        source: &SourceFile,
        registry: &mut ModuleRegistry,
        chain: &mut Vec<ModuleName>,
    ) -> Result<(), BuildError> {
        for segment in source.segments() {
            let origin = Origin {
                path: source.path(),
                line: source.line_of(segment),
            };
            match &segment.kind {
                SegmentKind::ImportDirective(name) => {
                    self.resolve(name, origin, registry, chain)?;
                }
                SegmentKind::IncludeDirective(path) => self.include(path, origin, registry)?,
                SegmentKind::StylesheetDirective(name) => self.stylesheet(name, origin, registry)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn resolve(
        &mut self,
        name: &ModuleName,
        origin: Origin<'_>,
        registry: &mut ModuleRegistry,
        chain: &mut Vec<ModuleName>,
    ) -> Result<Arc<ModuleHandle>, BuildError> {
        if let Some(handle) = registry.lookup(name) {
            trace!(target: "weave::resolve", module = %name, "Reusing registered module");
            return Ok(handle);
        }

        let matching = registry.matching();
        if let Some(start) = chain
            .iter()
            .position(|n| n.key(matching) == name.key(matching))
        {
            let mut cycle: Vec<String> = chain[start..].iter().map(|n| n.qualified()).collect();
            cycle.push(name.qualified());
            return Err(BuildError::CircularImport { chain: cycle });
        }

        let path = self.locate(name, origin)?;
        self.load(name, path, registry, chain)
    }

    /// 读取、扫描、递归解析并注册模块
    fn load(
        &mut self,
        name: &ModuleName,
        path: PathBuf,
        registry: &mut ModuleRegistry,
        chain: &mut Vec<ModuleName>,
    ) -> Result<Arc<ModuleHandle>, BuildError> {
        let text = self
            .vfs
            .read_to_string(&path)
            .map_err(|e| BuildError::io(&path, e))?;
        let source = scan(path, text)?;
        self.scans += 1;
        debug!(
            target: "weave::resolve",
            module = %name,
            path = %source.path().display(),
            depth = chain.len(),
            "Scanned module"
        );

        chain.push(name.clone());
        let resolved = self.resolve_file(&source, registry, chain);
        chain.pop();
        resolved?;

        let handle = compile_module(name, &source, registry)?;
        registry.register(handle)
    }

    /// 先查绑定表，再在搜索根中查找模块文件，先到先得
    fn locate(&self, name: &ModuleName, origin: Origin<'_>) -> Result<PathBuf, BuildError> {
        if let Some((_, path)) = self.bindings.get(&name.key(self.policy.matching)) {
            trace!(target: "weave::resolve", module = %name, path = %path.display(), "Bound module");
            return Ok(path.clone());
        }
        let relative = self.policy.relative_path(name);
        self.search(&name.qualified(), &self.roots, &relative, origin)
    }

    /// 依次在 `dirs` 下找 `relative`，都找不到时报告全部候选路径
    fn search(
        &self,
        wanted: &str,
        dirs: &[PathBuf],
        relative: &Path,
        origin: Origin<'_>,
    ) -> Result<PathBuf, BuildError> {
        let mut searched = Vec::with_capacity(dirs.len());

        for dir in dirs {
            let candidate = normalize_path(&dir.join(relative));
            trace!(target: "weave::resolve", wanted, candidate = %candidate.display(), "Trying");
            if self.vfs.is_file(&candidate) {
                return Ok(candidate);
            }
            if self.policy.matching == NameMatching::IgnoreCase {
                if let Some(found) = self.find_ignoring_case(dir, relative) {
                    return Ok(found);
                }
            }
            if !searched.contains(&candidate) {
                searched.push(candidate);
            }
        }

        Err(BuildError::ModuleNotFound {
            name: wanted.to_string(),
            importer: origin.path.to_path_buf(),
            line: origin.line,
            searched,
        })
    }

    /// `:include path`：引入者所在目录优先，然后是搜索根
    fn include(
        &self,
        path: &str,
        origin: Origin<'_>,
        registry: &mut ModuleRegistry,
    ) -> Result<(), BuildError> {
        let relative = Path::new(path);
        let found = if relative.is_absolute() {
            let absolute = normalize_path(relative);
            if !self.vfs.is_file(&absolute) {
                return Err(BuildError::ModuleNotFound {
                    name: path.to_string(),
                    importer: origin.path.to_path_buf(),
                    line: origin.line,
                    searched: vec![absolute],
                });
            }
            absolute
        } else {
            let base = origin
                .path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let mut dirs = vec![normalize_path(&base)];
            dirs.extend(self.roots.iter().cloned());
            self.search(path, &dirs, relative, origin)?
        };
        let kind = AttachmentKind::for_path(&found);
        self.attach(found, kind, origin, registry)
    }

    /// `:css ns.Id` → 搜索根下的 `ns/Id.css`
    fn stylesheet(
        &self,
        name: &ModuleName,
        origin: Origin<'_>,
        registry: &mut ModuleRegistry,
    ) -> Result<(), BuildError> {
        let policy = NamePolicy {
            extension: "css".to_string(),
            ..self.policy.clone()
        };
        let relative = policy.relative_path(name);
        let found = self.search(&name.qualified(), &self.roots, &relative, origin)?;
        self.attach(found, AttachmentKind::Stylesheet, origin, registry)
    }

    /// 读取附件（每个文件一次）并挂到引入它的源文件上
    fn attach(
        &self,
        path: PathBuf,
        kind: AttachmentKind,
        origin: Origin<'_>,
        registry: &mut ModuleRegistry,
    ) -> Result<(), BuildError> {
        if registry.link(origin.path, &path) {
            return Ok(());
        }

        let text = self
            .vfs
            .read_to_string(&path)
            .map_err(|e| BuildError::io(&path, e))?;
        if let Some(marker) = self
            .exclude_markers
            .iter()
            .find(|marker| text.contains(marker.as_str()))
        {
            debug!(target: "weave::resolve", path = %path.display(), marker = %marker, "Excluded attachment");
            return Ok(());
        }

        debug!(target: "weave::resolve", path = %path.display(), kind = ?kind, bytes = text.len(), "Loaded attachment");
        registry.attach(origin.path, Attachment { path, kind, text });
        Ok(())
    }

    /// 逐级列目录做大小写不敏感匹配
    fn find_ignoring_case(&self, root: &Path, relative: &Path) -> Option<PathBuf> {
        let mut current = root.to_path_buf();
        for component in relative.components() {
            let wanted = component.as_os_str().to_string_lossy().to_lowercase();
            let children = self.vfs.read_dir(&current).ok()?;
            current = children.into_iter().find(|child| {
                child
                    .file_name()
                    .map(|n| n.to_string_lossy().to_lowercase() == wanted)
                    .unwrap_or(false)
            })?;
        }
        self.vfs.is_file(&current).then_some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_config::NamespaceLayout;
    use weave_vfs::{LoggedFileSystem, MemoryFileSystem};

    fn fs(files: &[(&str, &str)]) -> MemoryFileSystem {
        MemoryFileSystem::with_files(files.iter().map(|(p, c)| (*p, c.as_bytes().to_vec())))
    }

    fn name(text: &str) -> ModuleName {
        ModuleName::parse(text).unwrap()
    }

    fn resolve_entry(
        vfs: &dyn VirtualFileSystem,
        roots: &[&str],
        policy: NamePolicy,
        entry: &str,
    ) -> (Result<(), BuildError>, ModuleRegistry, usize) {
        let mut registry = ModuleRegistry::new(policy.matching);
        let mut resolver =
            ImportResolver::new(vfs, roots.iter().map(PathBuf::from).collect(), policy);
        let source = scan("/app/main.js", entry).unwrap();
        let result = resolver.resolve_imports(&source, &mut registry);
        (result, registry, resolver.scans())
    }

    #[test]
    fn test_resolves_transitively() {
        let vfs = fs(&[
            ("/lib/ui/Widget.js", ":import ui.Base\nvar Widget = {};\n"),
            ("/lib/ui/Base.js", "var Base = {};\n"),
        ]);
        let (result, registry, scans) =
            resolve_entry(&vfs, &["/lib"], NamePolicy::default(), ":import ui.Widget\n");
        result.unwrap();
        assert_eq!(scans, 2);
        let widget = registry.lookup(&name("ui.Widget")).unwrap();
        assert_eq!(widget.path, PathBuf::from("/lib/ui/Widget.js"));
        assert_eq!(widget.dependencies, vec![name("ui.Base")]);
    }

    #[test]
    fn test_first_root_wins() {
        let vfs = fs(&[
            ("/a/ui/Widget.js", "var Widget = 'a';\n"),
            ("/b/ui/Widget.js", "var Widget = 'b';\n"),
        ]);
        let (result, registry, _) =
            resolve_entry(&vfs, &["/a", "/b"], NamePolicy::default(), ":import ui.Widget\n");
        result.unwrap();
        assert_eq!(
            registry.lookup(&name("ui.Widget")).unwrap().path,
            PathBuf::from("/a/ui/Widget.js")
        );
    }

    #[test]
    fn test_scans_each_module_once() {
        let vfs = LoggedFileSystem::new(fs(&[
            ("/lib/a/A.js", ":import c.C\nvar A;\n"),
            ("/lib/b/B.js", ":import c.C\nvar B;\n"),
            ("/lib/c/C.js", "var C;\n"),
        ]));
        let (result, registry, scans) = resolve_entry(
            &vfs,
            &["/lib"],
            NamePolicy::default(),
            ":import a.A\n:import b.B\n:import c.C\n",
        );
        result.unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(scans, 3);
        assert_eq!(vfs.reads(Path::new("/lib/c/C.js")), 1);
    }

    #[test]
    fn test_not_found_lists_candidates() {
        let vfs = fs(&[]);
        let (result, _, _) = resolve_entry(
            &vfs,
            &["/lib", "/vendor/../vendor"],
            NamePolicy::default(),
            "var x;\n:import ui.Missing\n",
        );
        assert_eq!(
            result.unwrap_err(),
            BuildError::ModuleNotFound {
                name: "ui.Missing".to_string(),
                importer: PathBuf::from("/app/main.js"),
                line: 2,
                searched: vec![
                    PathBuf::from("/lib/ui/Missing.js"),
                    PathBuf::from("/vendor/ui/Missing.js"),
                ],
            }
        );
    }

    #[test]
    fn test_cycle_reports_chain() {
        let vfs = fs(&[
            ("/lib/a/A.js", ":import b.B\n"),
            ("/lib/b/B.js", ":import a.A\n"),
        ]);
        let (result, registry, _) =
            resolve_entry(&vfs, &["/lib"], NamePolicy::default(), ":import a.A\n");
        assert_eq!(
            result.unwrap_err(),
            BuildError::CircularImport {
                chain: vec!["a.A".into(), "b.B".into(), "a.A".into()]
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_self_import_is_cycle() {
        let vfs = fs(&[("/lib/a/A.js", ":import a.A\n")]);
        let (result, _, _) = resolve_entry(&vfs, &["/lib"], NamePolicy::default(), ":import a.A\n");
        assert!(matches!(result, Err(BuildError::CircularImport { chain }) if chain == vec!["a.A", "a.A"]));
    }

    #[test]
    fn test_flat_layout() {
        let vfs = fs(&[("/lib/app.ui.Widget.js", "var Widget;\n")]);
        let policy = NamePolicy {
            layout: NamespaceLayout::Flat,
            ..NamePolicy::default()
        };
        let (result, registry, _) = resolve_entry(&vfs, &["/lib"], policy, ":import app.ui.Widget\n");
        result.unwrap();
        assert!(registry.contains(&name("app.ui.Widget")));
    }

    #[test]
    fn test_ignore_case_lookup() {
        let vfs = fs(&[("/lib/UI/widget.JS", "var Widget;\n")]);
        let policy = NamePolicy {
            matching: NameMatching::IgnoreCase,
            ..NamePolicy::default()
        };
        let (result, registry, _) =
            resolve_entry(&vfs, &["/lib"], policy, ":import ui.Widget\n:import Ui.WIDGET\n");
        result.unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.lookup(&name("ui.widget")).unwrap().path,
            PathBuf::from("/lib/UI/widget.JS")
        );
    }

    #[test]
    fn test_exact_matching_is_case_sensitive() {
        let vfs = fs(&[("/lib/UI/widget.JS", "var Widget;\n")]);
        let (result, _, _) = resolve_entry(&vfs, &["/lib"], NamePolicy::default(), ":import ui.Widget\n");
        assert!(matches!(result, Err(BuildError::ModuleNotFound { .. })));
    }

    #[test]
    fn test_bind_then_import_skips_search() {
        let vfs = fs(&[("/custom/widget.js", "var Widget;\n")]);
        let mut registry = ModuleRegistry::default();
        let mut resolver = ImportResolver::new(&vfs, Vec::new(), NamePolicy::default());
        resolver
            .bind(&name("ui.Widget"), Path::new("/custom/./widget.js"))
            .unwrap();
        resolver.load_bindings(&mut registry).unwrap();

        let source = scan("/main.js", ":import ui.Widget\n").unwrap();
        resolver.resolve_imports(&source, &mut registry).unwrap();
        assert_eq!(resolver.scans(), 1);
        assert_eq!(
            registry.lookup(&name("ui.Widget")).unwrap().path,
            PathBuf::from("/custom/widget.js")
        );
    }

    #[test]
    fn test_bind_duplicate() {
        let vfs = fs(&[("/one.js", "var W;\n"), ("/two.js", "var W;\n")]);
        let mut registry = ModuleRegistry::default();
        let mut resolver = ImportResolver::new(&vfs, Vec::new(), NamePolicy::default());

        resolver.bind(&name("ui.W"), Path::new("/one.js")).unwrap();
        resolver.bind(&name("ui.W"), Path::new("/./one.js")).unwrap();
        let err = resolver
            .bind(&name("ui.W"), Path::new("/two.js"))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateModule {
                name: "ui.W".to_string(),
                existing: PathBuf::from("/one.js"),
                conflicting: PathBuf::from("/two.js"),
            }
        );

        resolver.load_bindings(&mut registry).unwrap();
        assert_eq!(resolver.scans(), 1);
        assert_eq!(registry.len(), 1);
    }

    /// 绑定的模块互相 import 时，不依赖绑定顺序，也不去搜索根里找
    #[test]
    fn test_bindings_resolve_in_any_order() {
        let vfs = fs(&[
            ("/x/A.js", ":import b.B\nvar A = B;\n"),
            ("/y/B.js", "var B = 1;\n"),
        ]);
        let orders: [[(&str, &str); 2]; 2] = [
            [("b.B", "/y/B.js"), ("a.A", "/x/A.js")],
            [("a.A", "/x/A.js"), ("b.B", "/y/B.js")],
        ];

        for order in orders {
            let mut registry = ModuleRegistry::default();
            let mut resolver =
                ImportResolver::new(&vfs, vec![PathBuf::from("/nowhere")], NamePolicy::default());
            for (module, path) in order {
                resolver.bind(&name(module), Path::new(path)).unwrap();
            }
            resolver.load_bindings(&mut registry).unwrap();

            let source = scan("/main.js", ":import a.A\n").unwrap();
            resolver.resolve_imports(&source, &mut registry).unwrap();
            assert_eq!(resolver.scans(), 2, "order {:?}", order);
            assert_eq!(
                registry.lookup(&name("b.B")).unwrap().path,
                PathBuf::from("/y/B.js")
            );
        }
    }

    #[test]
    fn test_cycle_between_bindings() {
        let vfs = fs(&[("/x/A.js", ":import b.B\n"), ("/y/B.js", ":import a.A\n")]);
        let mut registry = ModuleRegistry::default();
        let mut resolver = ImportResolver::new(&vfs, Vec::new(), NamePolicy::default());
        resolver.bind(&name("b.B"), Path::new("/y/B.js")).unwrap();
        resolver.bind(&name("a.A"), Path::new("/x/A.js")).unwrap();

        let err = resolver.load_bindings(&mut registry).unwrap_err();
        assert_eq!(
            err,
            BuildError::CircularImport {
                chain: vec!["a.A".into(), "b.B".into(), "a.A".into()]
            }
        );
    }

    #[test]
    fn test_include_relative_to_importer_then_roots() {
        let vfs = fs(&[
            ("/lib/ui/Widget.js", ":include license.txt\n:include shared/reset.css\nvar Widget;\n"),
            ("/lib/ui/license.txt", "/* MIT */"),
            ("/lib/shared/reset.css", "*{margin:0}"),
        ]);
        let (result, registry, scans) =
            resolve_entry(&vfs, &["/lib"], NamePolicy::default(), ":import ui.Widget\n//:include ui/license.txt\n");
        result.unwrap();
        assert_eq!(scans, 1);

        let widget: Vec<(PathBuf, AttachmentKind)> = registry
            .attachments_of(Path::new("/lib/ui/Widget.js"))
            .iter()
            .map(|a| (a.path.clone(), a.kind))
            .collect();
        assert_eq!(
            widget,
            vec![
                (PathBuf::from("/lib/ui/license.txt"), AttachmentKind::Script),
                (PathBuf::from("/lib/shared/reset.css"), AttachmentKind::Stylesheet),
            ]
        );
        // 入口引用的是同一个文件，只保存一份
        let entry = registry.attachments_of(Path::new("/app/main.js"));
        assert_eq!(entry.len(), 1);
        assert!(Arc::ptr_eq(
            &entry[0],
            &registry.attachment(Path::new("/lib/ui/license.txt")).unwrap()
        ));
    }

    #[test]
    fn test_missing_include_lists_candidates() {
        let vfs = fs(&[]);
        let (result, _, _) =
            resolve_entry(&vfs, &["/lib"], NamePolicy::default(), "\n:include vendor/x.js\n");
        assert_eq!(
            result.unwrap_err(),
            BuildError::ModuleNotFound {
                name: "vendor/x.js".to_string(),
                importer: PathBuf::from("/app/main.js"),
                line: 2,
                searched: vec![
                    PathBuf::from("/app/vendor/x.js"),
                    PathBuf::from("/lib/vendor/x.js"),
                ],
            }
        );
    }

    #[test]
    fn test_css_directive_uses_namespace_layout() {
        let vfs = fs(&[("/lib/ui/Theme.css", ".theme{}"), ("/lib/ui/Theme.js", "var Theme;\n")]);
        let (result, registry, scans) =
            resolve_entry(&vfs, &["/lib"], NamePolicy::default(), ":css ui.Theme\n");
        result.unwrap();
        assert_eq!(scans, 0);
        let sheets = registry.attachments_of(Path::new("/app/main.js"));
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].path, PathBuf::from("/lib/ui/Theme.css"));
        assert_eq!(sheets[0].kind, AttachmentKind::Stylesheet);
        assert_eq!(sheets[0].text, ".theme{}");

        let (result, _, _) = resolve_entry(&vfs, &["/lib"], NamePolicy::default(), ":css ui.Nope\n");
        assert!(matches!(result, Err(BuildError::ModuleNotFound { name, .. }) if name == "ui.Nope"));
    }

    #[test]
    fn test_excluded_attachment_is_skipped() {
        let vfs = fs(&[
            ("/app/debug.js", "////!ignore!////\nconsole.log('x');"),
            ("/app/keep.js", "keep();"),
        ]);
        let mut registry = ModuleRegistry::default();
        let mut resolver = ImportResolver::new(&vfs, Vec::new(), NamePolicy::default())
            .with_exclude_markers(&["////!ignore!////".to_string()]);
        let source = scan("/app/main.js", ":include debug.js\n:include keep.js\n").unwrap();
        resolver.resolve_imports(&source, &mut registry).unwrap();

        let paths: Vec<PathBuf> = registry
            .attachments_of(Path::new("/app/main.js"))
            .iter()
            .map(|a| a.path.clone())
            .collect();
        assert_eq!(paths, vec![PathBuf::from("/app/keep.js")]);
    }

    #[test]
    fn test_malformed_module_propagates() {
        let vfs = fs(&[("/lib/ui/Bad.js", "/*css*/.a{}\n")]);
        let (result, _, _) = resolve_entry(&vfs, &["/lib"], NamePolicy::default(), ":import ui.Bad\n");
        match result.unwrap_err() {
            BuildError::MalformedBlock { path, line, .. } => {
                assert_eq!(path, PathBuf::from("/lib/ui/Bad.js"));
                assert_eq!(line, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_module() {
        let vfs = MemoryFileSystem::with_files([("/lib/ui/Bin.js", vec![0xff, 0xfe])]);
        let (result, _, _) = resolve_entry(&vfs, &["/lib"], NamePolicy::default(), ":import ui.Bin\n");
        assert_eq!(
            result.unwrap_err(),
            BuildError::InvalidUtf8 {
                path: PathBuf::from("/lib/ui/Bin.js")
            }
        );
    }
}
