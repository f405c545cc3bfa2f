//! CLI 格式化输出
//!
//! 提供命令行友好的错误显示和源码上下文打印。

use weave_api::WeaveError;
use weave_config::LogFormat;
use weave_vfs::VirtualFileSystem;

/// 打印错误；有行号时显示源代码上下文
///
/// JSON 日志格式下输出结构化报告，便于工具集成。
pub fn print_error(e: &WeaveError, format: LogFormat, vfs: &dyn VirtualFileSystem) {
    if format == LogFormat::Json {
        match serde_json::to_string(&e.to_report()) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", e.to_report()),
        }
        return;
    }

    eprintln!("❌ {}", e);

    if let (Some(path), Some(line)) = (e.path(), e.line()) {
        if let Ok(source) = vfs.read_to_string(path) {
            eprintln!("  --> {}:{}", path.display(), line);
            eprint!("{}", source_context(&source, line, e.column()));
        }
    }
}

/// 打印源代码上下文（显示错误行前后几行）
pub fn print_source_context(source: &str, error_line: usize, error_col: Option<usize>) {
    eprint!("{}", source_context(source, error_line, error_col));
}

pub(crate) fn source_context(source: &str, error_line: usize, error_col: Option<usize>) -> String {
    const CONTEXT_LINES: usize = 2; // 错误行前后显示的上下文行数

    let lines: Vec<&str> = source.lines().collect();
    let total_lines = lines.len();
    let mut out = String::new();

    if error_line == 0 || error_line > total_lines {
        return out;
    }

    let start_line = error_line.saturating_sub(CONTEXT_LINES).max(1);
    let end_line = (error_line + CONTEXT_LINES).min(total_lines);
    let width = end_line.to_string().len();

    out.push_str(&format!("{}|--\n", "-".repeat(width + 1)));
    for line_idx in start_line..=end_line {
        out.push_str(&format!("{:>width$} | {}\n", line_idx, lines[line_idx - 1], width = width));
        if line_idx == error_line {
            if let Some(col) = error_col {
                out.push_str(&format!(
                    "{} | {}^\n",
                    " ".repeat(width),
                    " ".repeat(col.saturating_sub(1))
                ));
            }
        }
    }
    out.push_str(&format!("{}|--\n", "-".repeat(width + 1)));
    out
}
