//! 文本变换：JS 字符串字面量、行与包裹块剔除、样式/标记注入脚本、HTML 转义

/// 把文本转成双引号 JS 字符串字面量
///
/// 反斜杠、引号、控制字符需要转义；U+0200 以上的非字母数字字符
/// 转成 `\uXXXX`，避免输出文件的编码影响脚本。
pub fn js_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push('\t'),
            c if (c as u32) < 0x20 || c == '\u{2028}' || c == '\u{2029}' => {
                push_unicode_escape(&mut out, c)
            }
            c if (c as u32) > 0x200 && !c.is_alphanumeric() => push_unicode_escape(&mut out, c),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn push_unicode_escape(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        out.push_str(&format!("\\u{:04x}", unit));
    }
}

/// 剔除包含任一标记的行；`keep_lines` 时替换为空行以保持行号
pub fn strip_lines(text: &str, markers: &[String], keep_lines: bool) -> String {
    if markers.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if markers.iter().any(|marker| !marker.is_empty() && line.contains(marker.as_str())) {
            if keep_lines && line.ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(line);
        }
    }
    out
}

/// 剔除包裹块：闭标记 `/*~x*/` 对应的开标记是去掉第一个 `~` 的 `/*x*/`，
/// 从开标记到闭标记（含）整段删除；`keep_lines` 时保留其中的换行
///
/// 没有 `~` 的标记和找不到闭标记的开标记都原样保留。
pub fn strip_blocks(text: &str, end_markers: &[String], keep_lines: bool) -> String {
    let mut out = text.to_string();
    for end in end_markers {
        let start = end.replacen('~', "", 1);
        if start == *end || start.is_empty() {
            continue;
        }
        let mut cut = String::with_capacity(out.len());
        let mut rest = out.as_str();
        while let Some(open) = rest.find(start.as_str()) {
            let body = &rest[open + start.len()..];
            let Some(close) = body.find(end.as_str()) else {
                break;
            };
            cut.push_str(&rest[..open]);
            if keep_lines {
                let region = &rest[open..open + start.len() + close + end.len()];
                cut.extend(region.chars().filter(|c| *c == '\n'));
            }
            rest = &body[close + end.len()..];
        }
        cut.push_str(rest);
        out = cut;
    }
    out
}

/// 生成在 `<head>` 中插入 `<style>` 的脚本，插入完成后运行 `callback`
pub fn stylesheet_to_script(css: &str, callback: &str) -> String {
    injection_script(
        "head",
        &[
            "var node = document.createElement('style');",
            "node.setAttribute('type', 'text/css');",
            "node.appendChild(document.createTextNode(content));",
        ],
        css,
        callback,
    )
}

/// 生成在 `<body>` 末尾追加 `<div class="html-to-js">` 的脚本，完成后运行 `callback`
pub fn markup_to_script(html: &str, callback: &str) -> String {
    injection_script(
        "body",
        &[
            "var node = document.createElement('div');",
            "node.className = 'html-to-js';",
            "node.innerHTML = content;",
        ],
        html,
        callback,
    )
}

/// 轮询等待 `parent` 元素出现，创建节点后再执行回调
fn injection_script(parent: &str, create: &[&str], content: &str, callback: &str) -> String {
    let lines: Vec<String> = content
        .split_inclusive('\n')
        .map(|line| format!("            {}", js_string_literal(line)))
        .collect();

    let mut out = String::new();
    out.push_str("(function (callback) {\n");
    out.push_str("    var inject = function () {\n");
    out.push_str(&format!(
        "        var parent = document.getElementsByTagName('{}')[0];\n",
        parent
    ));
    out.push_str("        if (!parent) {\n");
    out.push_str("            setTimeout(inject, 15);\n");
    out.push_str("            return;\n");
    out.push_str("        }\n");
    out.push_str("        var content = [\n");
    out.push_str(&lines.join(",\n"));
    out.push_str("\n        ].join('');\n");
    for line in create {
        out.push_str("        ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("        parent.appendChild(node);\n");
    out.push_str("        if (callback) {\n");
    out.push_str("            callback();\n");
    out.push_str("        }\n");
    out.push_str("    };\n");
    out.push_str("    inject();\n");
    if callback.trim().is_empty() {
        out.push_str("}(null));");
    } else {
        out.push_str("}(function () {\n");
        out.push_str(callback.trim_end());
        out.push_str("\n}));");
    }
    out
}

/// 转义 `</tag`（不区分大小写），使片段不会提前闭合外层元素
pub fn escape_closing_tag(text: &str, tag: &str) -> String {
    let needle = format!("</{}", tag.to_ascii_lowercase());
    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (at, _) in lower.match_indices(&needle) {
        out.push_str(&text[last..at]);
        out.push_str("<\\/");
        last = at + 2;
    }
    out.push_str(&text[last..]);
    out
}

/// HTML 文本转义
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
