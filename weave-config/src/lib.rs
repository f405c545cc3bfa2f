//! Weave Config - Pure configuration data structures
//!
//! This crate contains only data structures, no global state.
//! It serves as the shared configuration vocabulary across all Weave crates,
//! and is also the schema of the `weave.json` project file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output layout of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// One self-contained HTML document
    #[default]
    SingleFile,
    /// Separate HTML, CSS and JS files
    Split,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::SingleFile => "single-file",
            OutputMode::Split => "split",
        }
    }
}

/// How module names are compared and looked up on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameMatching {
    /// `ui.Widget` and `ui.widget` are different modules
    #[default]
    Exact,
    /// Names are case-folded; files are matched case-insensitively
    IgnoreCase,
}

impl NameMatching {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameMatching::Exact => "exact",
            NameMatching::IgnoreCase => "ignore-case",
        }
    }
}

/// How a module name maps to a file below a search root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespaceLayout {
    /// `ui.Widget` → `ui/Widget.js`
    #[default]
    Nested,
    /// `ui.Widget` → `ui.Widget.js`
    Flat,
}

impl NamespaceLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamespaceLayout::Nested => "nested",
            NamespaceLayout::Flat => "flat",
        }
    }
}

/// Error returned when parsing one of the enum options from text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptionError {
    pub option: &'static str,
    pub value: String,
}

impl fmt::Display for ParseOptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}'", self.option, self.value)
    }
}

impl std::error::Error for ParseOptionError {}

impl FromStr for OutputMode {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-file" | "single" | "html" => Ok(OutputMode::SingleFile),
            "split" => Ok(OutputMode::Split),
            _ => Err(ParseOptionError {
                option: "output mode",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for NameMatching {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(NameMatching::Exact),
            "ignore-case" => Ok(NameMatching::IgnoreCase),
            _ => Err(ParseOptionError {
                option: "name matching",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for NamespaceLayout {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nested" => Ok(NamespaceLayout::Nested),
            "flat" => Ok(NamespaceLayout::Flat),
            _ => Err(ParseOptionError {
                option: "namespace layout",
                value: s.to_string(),
            }),
        }
    }
}

/// Post-processing switches applied by the assembler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildOptions {
    /// Script lines containing any of these markers are dropped (e.g. `/*D*/`)
    pub strip_lines: Vec<String>,
    /// Replace stripped lines with empty lines instead of removing them
    pub keep_lines: bool,
    /// Closing markers of script regions to cut, e.g. `/*~start*/` cuts
    /// everything from `/*start*/` through `/*~start*/`
    pub strip_blocks: Vec<String>,
    /// `:include` / `:css` files whose content contains any of these
    /// markers are left out, e.g. `/****!ignore!****/`
    pub exclude_markers: Vec<String>,
    /// Turn stylesheet fragments into a script injecting a `<style>` element
    pub css_to_script: bool,
    /// Turn markup fragments into a script appending them to `<body>`
    pub markup_to_script: bool,
}

/// An explicit module name → file binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleBinding {
    pub name: String,
    pub path: PathBuf,
}

/// Configuration of one build invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    /// Ordered module roots; empty means "the entry file's directory"
    pub module_search_paths: Vec<PathBuf>,
    pub output_mode: OutputMode,
    /// Output file (single-file, `.html`/`.htm`) or directory
    pub output_path: PathBuf,
    /// Extension of module source files, without the dot
    pub script_extension: String,
    pub name_matching: NameMatching,
    pub namespace_layout: NamespaceLayout,
    /// `<title>` of the generated document; defaults to the entry file stem
    pub title: Option<String>,
    /// Modules bound to explicit files, registered before the entry is resolved
    pub modules: Vec<ModuleBinding>,
    pub options: BuildOptions,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            module_search_paths: Vec::new(),
            output_mode: OutputMode::SingleFile,
            output_path: PathBuf::from("dist"),
            script_extension: String::from("js"),
            name_matching: NameMatching::Exact,
            namespace_layout: NamespaceLayout::Nested,
            title: None,
            modules: Vec::new(),
            options: BuildOptions::default(),
        }
    }
}

impl BuildConfig {
    /// Rebase every relative path on `base` (the directory of the config file)
    pub fn rebase(&mut self, base: &Path) {
        for root in &mut self.module_search_paths {
            *root = rebase_path(base, root);
        }
        self.output_path = rebase_path(base, &self.output_path);
        for binding in &mut self.modules {
            binding.path = rebase_path(base, &binding.path);
        }
    }
}

fn rebase_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Log level names accepted in `weave.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Silent,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ParseOptionError {
                option: "log level",
                value: s.to_string(),
            }),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(ParseOptionError {
                option: "log format",
                value: s.to_string(),
            }),
        }
    }
}

/// Per-phase level overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogTargets {
    pub scan: Option<LogLevel>,
    pub resolve: Option<LogLevel>,
    pub assemble: Option<LogLevel>,
    pub emit: Option<LogLevel>,
}

impl LogTargets {
    pub fn level_for(&self, phase: Phase) -> Option<LogLevel> {
        match phase {
            Phase::Scan => self.scan,
            Phase::Resolve => self.resolve,
            Phase::Assemble => self.assemble,
            Phase::Emit => self.emit,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Additionally append log lines to this file
    pub file: Option<PathBuf>,
    pub targets: LogTargets,
}

/// Build phase, used for phase-specific log targets and error reports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Scan,
    Resolve,
    Assemble,
    Emit,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Scan, Phase::Resolve, Phase::Assemble, Phase::Emit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Scan => "scan",
            Phase::Resolve => "resolve",
            Phase::Assemble => "assemble",
            Phase::Emit => "emit",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("weave::{}", self.as_str())
    }
}

/// Contents of a `weave.json` project file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Entry source file
    pub entry: Option<PathBuf>,
    #[serde(flatten)]
    pub build: BuildConfig,
    pub logging: LoggingConfig,
}

impl ProjectConfig {
    /// Parse a project file; relative paths are rebased on `base_dir`
    pub fn from_json(content: &str, base_dir: &Path) -> Result<Self, serde_json::Error> {
        let mut project: ProjectConfig = serde_json::from_str(content)?;
        project.build.rebase(base_dir);
        if let Some(entry) = project.entry.take() {
            project.entry = Some(rebase_path(base_dir, &entry));
        }
        if let Some(file) = project.logging.file.take() {
            project.logging.file = Some(rebase_path(base_dir, &file));
        }
        Ok(project)
    }
}
