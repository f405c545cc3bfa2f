//! 组装结果

/// 带来源的片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// 来源：模块名或文件路径
    pub origin: String,
    pub text: String,
}

impl Fragment {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }
}

/// 输出文档：有序的 markup / stylesheet / script 片段
///
/// 只有组装器可以写入。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDocument {
    markup: Vec<Fragment>,
    stylesheet: Vec<Fragment>,
    script: Vec<Fragment>,
}

impl OutputDocument {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn markup(&self) -> &[Fragment] {
        &self.markup
    }

    pub fn stylesheet(&self) -> &[Fragment] {
        &self.stylesheet
    }

    pub fn script(&self) -> &[Fragment] {
        &self.script
    }

    pub fn markup_text(&self) -> String {
        join(&self.markup)
    }

    pub fn stylesheet_text(&self) -> String {
        join(&self.stylesheet)
    }

    pub fn script_text(&self) -> String {
        join(&self.script)
    }

    pub fn is_empty(&self) -> bool {
        self.markup.is_empty() && self.stylesheet.is_empty() && self.script.is_empty()
    }

    pub(crate) fn push_markup(&mut self, origin: impl Into<String>, text: &str) {
        push(&mut self.markup, origin, text);
    }

    pub(crate) fn push_stylesheet(&mut self, origin: impl Into<String>, text: &str) {
        push(&mut self.stylesheet, origin, text);
    }

    pub(crate) fn push_script(&mut self, origin: impl Into<String>, text: &str) {
        push(&mut self.script, origin, text);
    }

    pub(crate) fn take_markup(&mut self) -> Vec<Fragment> {
        std::mem::take(&mut self.markup)
    }

    pub(crate) fn take_stylesheet(&mut self) -> Vec<Fragment> {
        std::mem::take(&mut self.stylesheet)
    }

    pub(crate) fn take_script(&mut self) -> Vec<Fragment> {
        std::mem::take(&mut self.script)
    }
}

/// 去掉首尾空行后非空才保留
fn push(fragments: &mut Vec<Fragment>, origin: impl Into<String>, text: &str) {
    let text = tidy(text);
    if !text.is_empty() {
        fragments.push(Fragment::new(origin, text));
    }
}

/// 去掉开头的空白行和末尾空白，保留首行缩进
fn tidy(text: &str) -> &str {
    let text = text.trim_end();
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }
    &text[start..]
}

pub(crate) fn join(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
