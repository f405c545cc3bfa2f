//! 扫描结果：分段与源文件

use crate::kit::{LineIndex, SourcePosition};
use crate::module::ModuleName;
use once_cell::sync::OnceCell;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// 标记块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Markup,
    Stylesheet,
    StringTemplate,
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [
        BlockKind::Markup,
        BlockKind::Stylesheet,
        BlockKind::StringTemplate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Markup => "html",
            BlockKind::Stylesheet => "css",
            BlockKind::StringTemplate => "js.string",
        }
    }

    pub fn open_marker(&self) -> &'static str {
        match self {
            BlockKind::Markup => "/*html*/",
            BlockKind::Stylesheet => "/*css*/",
            BlockKind::StringTemplate => "/*js.string*/",
        }
    }

    pub fn close_marker(&self) -> &'static str {
        match self {
            BlockKind::Markup => "/*~html*/",
            BlockKind::Stylesheet => "/*~css*/",
            BlockKind::StringTemplate => "/*~js.string*/",
        }
    }

    /// `text` 是否以某个开标记开头
    pub fn opening_at(text: &str) -> Option<BlockKind> {
        Self::ALL
            .into_iter()
            .find(|kind| text.starts_with(kind.open_marker()))
    }

    /// `text` 是否以某个闭标记开头
    pub fn closing_at(text: &str) -> Option<BlockKind> {
        Self::ALL
            .into_iter()
            .find(|kind| text.starts_with(kind.close_marker()))
    }

    pub(crate) fn segment(&self, payload: &str) -> SegmentKind {
        let payload = payload.to_string();
        match self {
            BlockKind::Markup => SegmentKind::Markup(payload),
            BlockKind::Stylesheet => SegmentKind::Stylesheet(payload),
            BlockKind::StringTemplate => SegmentKind::StringTemplate(payload),
        }
    }
}

/// 分段内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// `/*html*/ … /*~html*/` 的内容
    Markup(String),
    /// `/*css*/ … /*~css*/` 的内容
    Stylesheet(String),
    /// 块与指令之外的文本
    Script(String),
    /// `:import ns.Id`
    ImportDirective(ModuleName),
    /// `:export a, b`
    ExportDirective(Vec<String>),
    /// `:include path`，`//= require <path>` 等价于 `:include path.js`
    IncludeDirective(String),
    /// `:css ns.Id`
    StylesheetDirective(ModuleName),
    /// `/*js.string*/ … /*~js.string*/` 的内容
    StringTemplate(String),
}

impl SegmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            SegmentKind::Markup(_) => "markup",
            SegmentKind::Stylesheet(_) => "stylesheet",
            SegmentKind::Script(_) => "script",
            SegmentKind::ImportDirective(_) => "import",
            SegmentKind::ExportDirective(_) => "export",
            SegmentKind::IncludeDirective(_) => "include",
            SegmentKind::StylesheetDirective(_) => "css",
            SegmentKind::StringTemplate(_) => "js.string",
        }
    }
}

/// 分段：内容 + 在源文件中的字节区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub span: Range<usize>,
}

impl Segment {
    pub fn new(kind: SegmentKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

/// 扫描完成的源文件（不可变）
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    segments: Vec<Segment>,
    lines: OnceCell<LineIndex>,
}

impl SourceFile {
    pub(crate) fn new(path: PathBuf, text: String, segments: Vec<Segment>) -> Self {
        Self {
            path,
            text,
            segments,
            lines: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// 分段对应的原文
    pub fn slice(&self, segment: &Segment) -> &str {
        &self.text[segment.span.clone()]
    }

    /// 字节偏移 → 行列（行索引首次使用时构建）
    pub fn position(&self, offset: usize) -> SourcePosition {
        self.lines
            .get_or_init(|| LineIndex::new(&self.text))
            .position(&self.text, offset)
    }

    /// 分段起始行号
    pub fn line_of(&self, segment: &Segment) -> usize {
        self.position(segment.span.start).line
    }

    /// 按源码顺序列出 import 指令
    pub fn imports(&self) -> impl Iterator<Item = (&ModuleName, &Segment)> {
        self.segments.iter().filter_map(|segment| match &segment.kind {
            SegmentKind::ImportDirective(name) => Some((name, segment)),
            _ => None,
        })
    }

    /// 按源码顺序列出 `:include` / `:css` 指令
    pub fn attachments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|segment| {
            matches!(
                segment.kind,
                SegmentKind::IncludeDirective(_) | SegmentKind::StylesheetDirective(_)
            )
        })
    }

    /// 所有 `:export` 指令声明的名字（按出现顺序，去重）
    pub fn exports(&self) -> Vec<String> {
        let mut exports: Vec<String> = Vec::new();
        for segment in &self.segments {
            if let SegmentKind::ExportDirective(names) = &segment.kind {
                for name in names {
                    if !exports.contains(name) {
                        exports.push(name.clone());
                    }
                }
            }
        }
        exports
    }

    /// 指定类型的块内容
    pub fn blocks(&self, kind: BlockKind) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(move |segment| match (&segment.kind, kind) {
            (SegmentKind::Markup(text), BlockKind::Markup)
            | (SegmentKind::Stylesheet(text), BlockKind::Stylesheet)
            | (SegmentKind::StringTemplate(text), BlockKind::StringTemplate) => Some(text.as_str()),
            _ => None,
        })
    }
}
