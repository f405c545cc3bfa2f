//! 块扫描器
//!
//! 单次线性扫描，把源文件切成有序、无缝隙、无重叠的分段：
//! - `/*html*/`、`/*css*/`、`/*js.string*/` 标记块（不允许嵌套）
//! - 行首的 `:import` / `:export` / `:include` / `:css` 指令（可带 `//` 前缀和行尾 `;`）
//! - `//= require <path>`，等价于 `:include path.js`
//! - 其余文本都是脚本

mod segment;

pub use segment::{BlockKind, Segment, SegmentKind, SourceFile};

use crate::error::BuildError;
use crate::kit::SourcePosition;
use crate::module::name::is_identifier;
use crate::module::ModuleName;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// 扫描源文件
pub fn scan(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<SourceFile, BuildError> {
    let path = path.into();
    let text = text.into();
    let segments = Scanner::new(&path, &text).run()?;
    debug!(
        target: "weave::scan",
        path = %path.display(),
        bytes = text.len(),
        segments = segments.len(),
        "Scanned source"
    );
    Ok(SourceFile::new(path, text, segments))
}

/// 行首指令关键字
const DIRECTIVES: [&str; 4] = [":import", ":export", ":include", ":css"];

struct Scanner<'a> {
    path: &'a Path,
    text: &'a str,
    segments: Vec<Segment>,
    /// 当前脚本片段的起点
    script_start: usize,
}

impl<'a> Scanner<'a> {
    fn new(path: &'a Path, text: &'a str) -> Self {
        Self {
            path,
            text,
            segments: Vec::new(),
            script_start: 0,
        }
    }

    fn run(mut self) -> Result<Vec<Segment>, BuildError> {
        let text = self.text;
        let mut cursor = 0;
        let mut line_start = true;

        while cursor < text.len() {
            if line_start {
                if let Some((kind, end)) = self.directive_at(cursor)? {
                    self.push(kind, cursor..end);
                    cursor = end;
                    continue;
                }
            }

            let rest = &text[cursor..];
            if rest.starts_with("/*") {
                if let Some(kind) = BlockKind::opening_at(rest) {
                    cursor = self.block(kind, cursor)?;
                    line_start = false;
                    continue;
                }
                if let Some(kind) = BlockKind::closing_at(rest) {
                    return Err(self.malformed(
                        cursor,
                        format!(
                            "'{}' has no matching '{}'",
                            kind.close_marker(),
                            kind.open_marker()
                        ),
                    ));
                }
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };
            cursor += ch.len_utf8();
            line_start = ch == '\n';
        }

        self.flush_script(text.len());
        Ok(self.segments)
    }

    /// 扫描从 `start` 开始的块，返回闭标记之后的偏移
    fn block(&mut self, kind: BlockKind, start: usize) -> Result<usize, BuildError> {
        let text = self.text;
        let body_start = start + kind.open_marker().len();
        let mut search = body_start;

        loop {
            let Some(relative) = text[search..].find("/*") else {
                return Err(self.malformed(
                    start,
                    format!(
                        "'{}' block is never closed (expected '{}')",
                        kind.open_marker(),
                        kind.close_marker()
                    ),
                ));
            };
            let at = search + relative;
            let rest = &text[at..];

            if rest.starts_with(kind.close_marker()) {
                let end = at + kind.close_marker().len();
                let payload = &text[body_start..at];
                self.push(kind.segment(payload), start..end);
                return Ok(end);
            }
            if let Some(inner) = BlockKind::opening_at(rest) {
                let outer_line = SourcePosition::locate(text, start).line;
                return Err(self.malformed(
                    at,
                    format!(
                        "'{}' opened inside the '{}' block from line {}; blocks cannot nest",
                        inner.open_marker(),
                        kind.open_marker(),
                        outer_line
                    ),
                ));
            }
            if let Some(other) = BlockKind::closing_at(rest) {
                let outer_line = SourcePosition::locate(text, start).line;
                return Err(self.malformed(
                    at,
                    format!(
                        "'{}' does not close the '{}' block from line {}",
                        other.close_marker(),
                        kind.open_marker(),
                        outer_line
                    ),
                ));
            }
            search = at + 2;
        }
    }

    /// 行首指令：返回分段内容和行尾（含换行符）偏移
    fn directive_at(&self, start: usize) -> Result<Option<(SegmentKind, usize)>, BuildError> {
        let end = self.text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(self.text.len());
        let line = &self.text[start..end];
        let body = line.trim_start_matches([' ', '\t']);
        let commented = body.starts_with("//");
        let body = body.strip_prefix("//").unwrap_or(body);
        let keyword_at = start + (line.len() - body.len());

        if commented {
            if let Some(rest) = body.strip_prefix('=') {
                return Ok(self.require(rest, keyword_at)?.map(|kind| (kind, end)));
            }
        }

        let Some((keyword, rest)) = DIRECTIVES
            .iter()
            .find_map(|keyword| body.strip_prefix(keyword).map(|rest| (*keyword, rest)))
        else {
            return Ok(None);
        };
        // `:imports` 之类不是指令
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return Ok(None);
        }
        let argument = rest.trim();
        let argument = argument.strip_suffix(';').unwrap_or(argument).trim_end();

        let kind = match keyword {
            ":import" => SegmentKind::ImportDirective(self.module_name(keyword, argument, keyword_at)?),
            ":css" => SegmentKind::StylesheetDirective(self.module_name(keyword, argument, keyword_at)?),
            ":include" => {
                let path = argument.split_whitespace().next().unwrap_or("");
                if path.is_empty() {
                    return Err(self.malformed(keyword_at, ":include directive names no file".to_string()));
                }
                SegmentKind::IncludeDirective(path.to_string())
            }
            _ => {
                let names: Vec<String> = argument
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
                if names.is_empty() {
                    return Err(self.malformed(keyword_at, ":export directive names nothing".to_string()));
                }
                if let Some(bad) = names.iter().find(|name| !is_identifier(name)) {
                    return Err(self.malformed(
                        keyword_at,
                        format!("invalid :export directive: '{}' is not an identifier", bad),
                    ));
                }
                SegmentKind::ExportDirective(names)
            }
        };

        trace!(target: "weave::scan", path = %self.path.display(), directive = %line.trim_end(), "Directive");
        Ok(Some((kind, end)))
    }

    fn module_name(&self, keyword: &str, argument: &str, at: usize) -> Result<ModuleName, BuildError> {
        ModuleName::parse(argument)
            .map_err(|e| self.malformed(at, format!("invalid {} directive: {}", keyword, e)))
    }

    /// `//= require <lib/jquery>` → `lib/jquery.js`；其他 `//=` 注释不是指令
    fn require(&self, rest: &str, at: usize) -> Result<Option<SegmentKind>, BuildError> {
        let Some(rest) = rest.trim_start().strip_prefix("require") else {
            return Ok(None);
        };
        if !rest.is_empty() && !rest.starts_with(|c: char| c.is_whitespace() || c == '<') {
            return Ok(None);
        }
        let rest = rest.trim();
        let path = match rest.strip_prefix('<') {
            Some(quoted) => quoted.split('>').next().unwrap_or("").trim(),
            None => rest.split_whitespace().next().unwrap_or(""),
        };
        let path = path.strip_suffix(';').unwrap_or(path);
        if path.is_empty() {
            return Err(self.malformed(at, "require directive names no file".to_string()));
        }
        Ok(Some(SegmentKind::IncludeDirective(format!("{}.js", path))))
    }

    fn push(&mut self, kind: SegmentKind, span: Range<usize>) {
        self.flush_script(span.start);
        self.script_start = span.end;
        self.segments.push(Segment::new(kind, span));
    }

    fn flush_script(&mut self, end: usize) {
        if end > self.script_start {
            let text = self.text[self.script_start..end].to_string();
            self.segments
                .push(Segment::new(SegmentKind::Script(text), self.script_start..end));
        }
        self.script_start = end;
    }

    fn malformed(&self, offset: usize, message: String) -> BuildError {
        let position = SourcePosition::locate(self.text, offset);
        BuildError::MalformedBlock {
            path: self.path.to_path_buf(),
            line: position.line,
            column: position.column,
            message,
        }
    }
}
