//! 源代码位置追踪
//!
//! 扫描器只记录字节区间；行列号在需要时（错误报告、诊断输出）才计算：
//! - line/column: 人类可读的错误显示（1-based，列按 Unicode 码点计数）
//! - byte_offset: 切片与区间运算（0-based）

/// 源代码位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePosition {
    /// 行号，1-based
    pub line: usize,
    /// 列号，1-based
    pub column: usize,
    /// 字节偏移，0-based
    pub byte_offset: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize, byte_offset: usize) -> Self {
        Self {
            line,
            column,
            byte_offset,
        }
    }

    /// 文件起始位置
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }

    /// 线性扫描计算 `offset` 处的位置（一次性查询用，例如错误报告）
    pub fn locate(text: &str, offset: usize) -> Self {
        let offset = clamp_to_boundary(text, offset);
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = text[line_start..offset].chars().count() + 1;
        Self::new(line, column, offset)
    }
}

/// 行首偏移表，用于反复的 offset → 行列 查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    /// 行数（末尾换行后的空行也计为一行）
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// `line`（1-based）的起始字节偏移
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|index| self.line_starts.get(index))
            .copied()
    }

    pub fn position(&self, text: &str, offset: usize) -> SourcePosition {
        let offset = clamp_to_boundary(text, offset);
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = text[line_start..offset].chars().count() + 1;
        SourcePosition::new(line, column, offset)
    }
}

fn clamp_to_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
