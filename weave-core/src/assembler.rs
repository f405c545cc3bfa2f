//! 组装器
//!
//! 把入口文件和已注册的模块合成一个 [`OutputDocument`]：
//! 1. 模块按依赖顺序贡献 markup / stylesheet / script，
//!    每个模块的 `:include` / `:css` 附件排在它自己的内容之前
//! 2. 入口的附件，然后是入口的 markup、stylesheet（源码顺序）
//! 3. 入口脚本：`:import` 原位替换为别名绑定，`/*js.string*/` 变成字符串字面量

use crate::document::{join, OutputDocument};
use crate::error::BuildError;
use crate::module::name::is_identifier;
use crate::module::{AttachmentKind, ModuleHandle, ModuleName, ModuleRegistry};
use crate::scanner::{BlockKind, SegmentKind, SourceFile};
use crate::transform;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use weave_config::{BuildOptions, NameMatching};

/// 组装器
pub struct Assembler<'a> {
    registry: &'a ModuleRegistry,
    options: &'a BuildOptions,
}

impl<'a> Assembler<'a> {
    pub fn new(registry: &'a ModuleRegistry, options: &'a BuildOptions) -> Self {
        Self { registry, options }
    }

    pub fn assemble(&self, entry: &SourceFile) -> Result<OutputDocument, BuildError> {
        let roots: Vec<ModuleName> = entry.imports().map(|(name, _)| name.clone()).collect();
        let order = self.registry.dependency_order(&roots, entry.path())?;

        let mut doc = OutputDocument::new();
        let mut attached = HashSet::new();
        for module in &order {
            self.push_attachments(&mut doc, &module.path, &mut attached);
            let origin = module.name.qualified();
            for markup in &module.markup {
                doc.push_markup(origin.as_str(), markup);
            }
            for stylesheet in &module.stylesheet {
                doc.push_stylesheet(origin.as_str(), stylesheet);
            }
            doc.push_script(origin.as_str(), &module.script);
        }

        self.push_attachments(&mut doc, entry.path(), &mut attached);
        let origin = entry.path().display().to_string();
        for markup in entry.blocks(BlockKind::Markup) {
            doc.push_markup(origin.as_str(), markup);
        }
        for stylesheet in entry.blocks(BlockKind::Stylesheet) {
            doc.push_stylesheet(origin.as_str(), stylesheet);
        }
        let script = compile_script(entry, self.registry)?;
        doc.push_script(origin.as_str(), &script);

        self.post_process(&mut doc);
        info!(
            target: "weave::assemble",
            entry = %entry.path().display(),
            modules = order.len(),
            markup = doc.markup().len(),
            stylesheet = doc.stylesheet().len(),
            script = doc.script().len(),
            "Assembled document"
        );
        Ok(doc)
    }

    /// `source` 引入的附件；整个文档里每个文件只出现一次
    fn push_attachments(&self, doc: &mut OutputDocument, source: &Path, attached: &mut HashSet<PathBuf>) {
        for attachment in self.registry.attachments_of(source) {
            if !attached.insert(attachment.path.clone()) {
                continue;
            }
            let origin = attachment.path.display().to_string();
            match attachment.kind {
                AttachmentKind::Script => doc.push_script(origin.as_str(), &attachment.text),
                AttachmentKind::Stylesheet => doc.push_stylesheet(origin.as_str(), &attachment.text),
                AttachmentKind::Markup => doc.push_markup(origin.as_str(), &attachment.text),
            }
        }
    }

    fn post_process(&self, doc: &mut OutputDocument) {
        let options = self.options;

        if !options.strip_blocks.is_empty() {
            for fragment in doc.take_script() {
                let stripped =
                    transform::strip_blocks(&fragment.text, &options.strip_blocks, options.keep_lines);
                doc.push_script(fragment.origin, &stripped);
            }
            debug!(target: "weave::assemble", markers = ?options.strip_blocks, "Cut wrapped blocks");
        }

        if !options.strip_lines.is_empty() {
            for fragment in doc.take_script() {
                let stripped =
                    transform::strip_lines(&fragment.text, &options.strip_lines, options.keep_lines);
                doc.push_script(fragment.origin, &stripped);
            }
            debug!(target: "weave::assemble", markers = ?options.strip_lines, "Stripped marked lines");
        }

        if options.markup_to_script {
            let markup = doc.take_markup();
            if !markup.is_empty() {
                let callback = join(&doc.take_script());
                doc.push_script(
                    "markup-to-script",
                    &transform::markup_to_script(&join(&markup), &callback),
                );
                debug!(target: "weave::assemble", fragments = markup.len(), "Moved markup into script");
            }
        }

        if options.css_to_script {
            let stylesheet = doc.take_stylesheet();
            if !stylesheet.is_empty() {
                let callback = join(&doc.take_script());
                doc.push_script(
                    "css-to-script",
                    &transform::stylesheet_to_script(&join(&stylesheet), &callback),
                );
                debug!(target: "weave::assemble", fragments = stylesheet.len(), "Moved stylesheet into script");
            }
        }
    }
}

/// 编译模块：脚本体包进注册命名空间的 IIFE
pub(crate) fn compile_module(
    name: &ModuleName,
    source: &SourceFile,
    registry: &ModuleRegistry,
) -> Result<ModuleHandle, BuildError> {
    let mut exports = source.exports();
    if exports.is_empty() {
        exports.push(default_export(name, source.path(), registry.matching()));
    }

    let mut dependencies: Vec<ModuleName> = Vec::new();
    for (dependency, _) in source.imports() {
        if !dependencies.contains(dependency) {
            dependencies.push(dependency.clone());
        }
    }

    let body = compile_script(source, registry)?;
    let script = module_definition(name, &exports, &body);

    Ok(ModuleHandle {
        name: name.clone(),
        path: source.path().to_path_buf(),
        exports,
        dependencies,
        markup: source.blocks(BlockKind::Markup).map(str::to_string).collect(),
        stylesheet: source.blocks(BlockKind::Stylesheet).map(str::to_string).collect(),
        script,
    })
}

/// 按源码顺序拼接脚本
///
/// - Script: 原样
/// - StringTemplate: JS 字符串字面量
/// - ImportDirective: 别名绑定（保留缩进和换行）
/// - Export / Include / Stylesheet 指令、markup、stylesheet: 删除，只保留换行
pub(crate) fn compile_script(
    source: &SourceFile,
    registry: &ModuleRegistry,
) -> Result<String, BuildError> {
    let mut out = String::with_capacity(source.text().len());

    for segment in source.segments() {
        let raw = source.slice(segment);
        match &segment.kind {
            SegmentKind::Script(text) => out.push_str(text),
            SegmentKind::StringTemplate(text) => out.push_str(&transform::js_string_literal(text)),
            SegmentKind::ImportDirective(name) => {
                let handle = registry
                    .lookup(name)
                    .ok_or_else(|| BuildError::UnresolvedImport {
                        name: name.qualified(),
                        path: source.path().to_path_buf(),
                    })?;
                out.push_str(indentation(raw));
                out.push_str(&binding(&handle));
                if raw.ends_with('\n') {
                    out.push('\n');
                }
            }
            SegmentKind::ExportDirective(_)
            | SegmentKind::IncludeDirective(_)
            | SegmentKind::StylesheetDirective(_) => {
                if raw.ends_with('\n') {
                    out.push('\n');
                }
            }
            SegmentKind::Markup(_) | SegmentKind::Stylesheet(_) => {
                out.extend(raw.chars().filter(|c| *c == '\n'));
            }
        }
    }
    Ok(out)
}

/// 没有 `:export` 时导出的名字：模块标识符
///
/// 忽略大小写匹配时以文件名的拼写为准（`:import ui.widget` 找到 `ui/Widget.js` 导出 `Widget`）。
fn default_export(name: &ModuleName, path: &Path, matching: NameMatching) -> String {
    if matching == NameMatching::IgnoreCase {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let last = stem.rsplit('.').next().unwrap_or_default();
        if is_identifier(last) && last.eq_ignore_ascii_case(name.identifier()) {
            return last.to_string();
        }
    }
    name.identifier().to_string()
}

/// `var widget = ui.Widget;`，多个导出时逐个绑定成员
fn binding(handle: &ModuleHandle) -> String {
    let qualified = handle.name.qualified();
    match handle.exports.as_slice() {
        [single] => format!("var {} = {};", single, qualified),
        exports => exports
            .iter()
            .map(|export| format!("var {} = {}.{};", export, qualified, export))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// ```text
/// var ui = ui || {};
/// ui.Widget = (function () {
/// <body>
/// return widget;
/// }());
/// ```
fn module_definition(name: &ModuleName, exports: &[String], body: &str) -> String {
    let mut out = String::new();

    let mut prefix = String::new();
    for segment in name.namespace_segments() {
        if prefix.is_empty() {
            prefix.push_str(segment);
            out.push_str(&format!("var {0} = {0} || {{}};\n", prefix));
        } else {
            prefix.push('.');
            prefix.push_str(segment);
            out.push_str(&format!("{0} = {0} || {{}};\n", prefix));
        }
    }

    out.push_str(&format!("{} = (function () {{\n", name.qualified()));
    let body = body.trim_matches('\n');
    if !body.trim().is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    match exports {
        [single] => out.push_str(&format!("return {};\n", single)),
        exports => {
            let members: Vec<String> = exports.iter().map(|e| format!("{0}: {0}", e)).collect();
            out.push_str(&format!("return {{ {} }};\n", members.join(", ")));
        }
    }
    out.push_str("}());");
    out
}

fn indentation(line: &str) -> &str {
    let body = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - body.len()]
}
