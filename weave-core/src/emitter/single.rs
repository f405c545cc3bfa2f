//! Single-file emitter - 一个自包含的 HTML 文档

use super::{document_head, Artifact, EmitPlan, Emitter};
use crate::document::OutputDocument;
use crate::transform::escape_closing_tag;
use weave_config::OutputMode;

/// 样式进 `<head>` 的 `<style>`，标记作为 `<body>` 内容，脚本放在末尾的 `<script>`
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleFileEmitter;

impl SingleFileEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Emitter for SingleFileEmitter {
    fn mode(&self) -> OutputMode {
        OutputMode::SingleFile
    }

    fn serialize(&self, doc: &OutputDocument, plan: &EmitPlan) -> Vec<Artifact> {
        let (dir, stem) = plan.layout();

        let mut html = document_head(&plan.title);
        let stylesheet = doc.stylesheet_text();
        if !stylesheet.is_empty() {
            html.push_str("<style>\n");
            html.push_str(&escape_closing_tag(&stylesheet, "style"));
            html.push_str("\n</style>\n");
        }
        html.push_str("</head>\n<body>\n");
        let markup = doc.markup_text();
        if !markup.is_empty() {
            html.push_str(&markup);
            html.push('\n');
        }
        let script = doc.script_text();
        if !script.is_empty() {
            html.push_str("<script>\n");
            html.push_str(&escape_closing_tag(&script, "script"));
            html.push_str("\n</script>\n");
        }
        html.push_str("</body>\n</html>\n");

        vec![Artifact::new(dir.join(format!("{}.html", stem)), "text/html", html)]
    }
}
