//! Split emitter - `<stem>.html` + `<stem>.css` + `<stem>.js`

use super::{document_head, Artifact, EmitPlan, Emitter};
use crate::document::OutputDocument;
use crate::transform::escape_html;
use weave_config::OutputMode;

#[derive(Debug, Clone, Copy, Default)]
pub struct SplitEmitter;

impl SplitEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Emitter for SplitEmitter {
    fn mode(&self) -> OutputMode {
        OutputMode::Split
    }

    fn serialize(&self, doc: &OutputDocument, plan: &EmitPlan) -> Vec<Artifact> {
        let (dir, stem) = plan.layout();
        let css_name = format!("{}.css", stem);
        let js_name = format!("{}.js", stem);

        let mut html = document_head(&plan.title);
        html.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\">\n",
            escape_html(&css_name)
        ));
        html.push_str("</head>\n<body>\n");
        let markup = doc.markup_text();
        if !markup.is_empty() {
            html.push_str(&markup);
            html.push('\n');
        }
        html.push_str(&format!("<script src=\"{}\"></script>\n", escape_html(&js_name)));
        html.push_str("</body>\n</html>\n");

        vec![
            Artifact::new(dir.join(format!("{}.html", stem)), "text/html", html),
            Artifact::new(dir.join(css_name), "text/css", with_newline(doc.stylesheet_text())),
            Artifact::new(
                dir.join(js_name),
                "application/javascript",
                with_newline(doc.script_text()),
            ),
        ]
    }
}

fn with_newline(mut text: String) -> String {
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
