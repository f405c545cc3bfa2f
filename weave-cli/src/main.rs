//! Weave CLI - Command line interface
//!
//! `weave build` 生成页面，`weave list` 按依赖顺序列出模块文件。
//! 配置来自 `weave.json`，命令行参数优先。

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};

mod config;
mod logging;
mod platform;

use crate::config::{load_project, LogConfig};
use crate::platform::print_error;
use weave_api::{build, current_dir, list_modules, ListOptions, WeaveError};
use weave_config::{
    BuildConfig, LogFormat, LogLevel, ModuleBinding, NameMatching, NamespaceLayout, OutputMode,
    ProjectConfig,
};
use weave_vfs::{LoggedFileSystem, NativeFileSystem};

/// 用法错误的退出码（与配置错误相同）；clap 默认的 2 已被 MalformedBlock 占用
const EXIT_USAGE: i32 = 64;

#[derive(Parser, Debug)]
#[command(
    name = "weave",
    about = "Weave - single-file web asset compiler",
    version
)]
struct Cli {
    /// Project file (default: ./weave.json if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Global log level: silent, error, warn, info, debug, trace
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Log format: pretty, compact, json
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile an entry file into a deployable page
    Build(BuildArgs),
    /// Print module files in dependency order, entry last
    List(ListArgs),
}

/// 两个子命令共用的解析参数
#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Entry source file (default: `entry` from weave.json)
    entry: Option<PathBuf>,

    /// Module search root, tried in order (repeatable)
    #[arg(short = 's', long = "search-path", value_name = "DIR")]
    search_paths: Vec<PathBuf>,

    /// Bind a module name to a file (repeatable)
    #[arg(long = "module", value_name = "NAME=PATH", value_parser = parse_binding)]
    modules: Vec<ModuleBinding>,

    /// Module name matching: exact, ignore-case
    #[arg(long, value_name = "MODE")]
    name_matching: Option<NameMatching>,

    /// Namespace to path mapping: nested, flat
    #[arg(long, value_name = "LAYOUT")]
    namespace_layout: Option<NamespaceLayout>,

    /// Extension of module files
    #[arg(long, value_name = "EXT")]
    script_extension: Option<String>,
}

#[derive(Args, Debug, Default)]
struct BuildArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output file (.html) or directory
    #[arg(short, long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Output mode: single-file, split
    #[arg(long, value_name = "MODE")]
    mode: Option<OutputMode>,

    /// Drop script lines containing this marker (repeatable)
    #[arg(long = "strip-lines", value_name = "MARKER")]
    strip_lines: Vec<String>,

    /// Keep stripped lines as empty lines
    #[arg(long)]
    keep_lines: bool,

    /// Cut script regions wrapped by this closing marker and its opening
    /// form without the first `~`, e.g. /*~debug*/ (repeatable)
    #[arg(long = "strip-blocks", value_name = "END_MARKER")]
    strip_blocks: Vec<String>,

    /// Leave out :include/:css files containing this marker (repeatable)
    #[arg(long = "exclude-files", value_name = "MARKER")]
    exclude_files: Vec<String>,

    /// Inject stylesheets from script instead of <style>
    #[arg(long)]
    css_to_script: bool,

    /// Inject markup from script instead of <body>
    #[arg(long)]
    markup_to_script: bool,

    /// Document title (default: entry file name)
    #[arg(long, value_name = "TITLE")]
    title: Option<String>,
}

#[derive(Args, Debug, Default)]
struct ListArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Text printed before each path
    #[arg(long, default_value = "")]
    prefix: String,

    /// Text printed after each path
    #[arg(long, default_value = "")]
    suffix: String,

    /// Print absolute paths
    #[arg(long)]
    absolute: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(EXIT_USAGE);
        }
        Err(e) => e.exit(),
    };
    let vfs = LoggedFileSystem::new(NativeFileSystem::new());

    let project = match load_project(cli.config.as_deref(), &vfs) {
        Ok(project) => project,
        Err(e) => {
            print_error(&e, cli.log_format.unwrap_or_default(), &vfs);
            process::exit(e.exit_code());
        }
    };

    let format = cli.log_format.unwrap_or(project.logging.format);
    let log_config = LogConfig::resolve(&project.logging, cli.log_level, cli.verbose);
    if let Err(e) = logging::init(&log_config, format, project.logging.file.as_deref()) {
        print_error(&e, format, &vfs);
        process::exit(e.exit_code());
    }

    let result = match cli.command {
        Command::Build(args) => handle_build(args, project, &vfs),
        Command::List(args) => handle_list(args, project, &vfs),
    };

    if let Err(e) = result {
        print_error(&e, format, &vfs);
        process::exit(e.exit_code());
    }
}

fn handle_build(
    args: BuildArgs,
    project: ProjectConfig,
    vfs: &LoggedFileSystem<NativeFileSystem>,
) -> Result<(), WeaveError> {
    let (entry, config) = merge_build(args, project)?;
    let output = build(&entry, &config, vfs)?;

    debug!(target: "weave::cli", reads = vfs.total_reads(), "File system reads");
    for path in output.written_paths() {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn handle_list(
    args: ListArgs,
    project: ProjectConfig,
    vfs: &LoggedFileSystem<NativeFileSystem>,
) -> Result<(), WeaveError> {
    let options = ListOptions {
        prefix: args.prefix,
        suffix: args.suffix,
        absolute_base: if args.absolute {
            Some(current_dir()?)
        } else {
            None
        },
    };
    let (entry, config) = merge_source(args.source, project)?;

    for line in list_modules(&entry, &config, vfs, &options)? {
        println!("{}", line);
    }
    Ok(())
}

/// 合并项目配置与 `build` 参数
fn merge_build(args: BuildArgs, project: ProjectConfig) -> Result<(PathBuf, BuildConfig), WeaveError> {
    let (entry, mut config) = merge_source(args.source, project)?;

    if let Some(out) = args.out {
        config.output_path = out;
    }
    if let Some(mode) = args.mode {
        config.output_mode = mode;
    }
    if let Some(title) = args.title {
        config.title = Some(title);
    }
    config.options.strip_lines.extend(args.strip_lines);
    config.options.keep_lines |= args.keep_lines;
    config.options.strip_blocks.extend(args.strip_blocks);
    config.options.exclude_markers.extend(args.exclude_files);
    config.options.css_to_script |= args.css_to_script;
    config.options.markup_to_script |= args.markup_to_script;

    Ok((entry, config))
}

/// 合并项目配置与解析参数；命令行的搜索路径整体替换配置中的
fn merge_source(
    args: SourceArgs,
    project: ProjectConfig,
) -> Result<(PathBuf, BuildConfig), WeaveError> {
    let entry = args.entry.or(project.entry).ok_or_else(|| {
        WeaveError::Config(String::from(
            "no entry file: pass one on the command line or set 'entry' in weave.json",
        ))
    })?;

    let mut config = project.build;
    if !args.search_paths.is_empty() {
        config.module_search_paths = args.search_paths;
    }
    config.modules.extend(args.modules);
    if let Some(matching) = args.name_matching {
        config.name_matching = matching;
    }
    if let Some(layout) = args.namespace_layout {
        config.namespace_layout = layout;
    }
    if let Some(extension) = args.script_extension {
        config.script_extension = extension;
    }

    info!(target: "weave::cli", entry = %entry.display(), "Configuration merged");
    Ok((entry, config))
}

/// 解析 `name=path` 形式的模块绑定
fn parse_binding(s: &str) -> Result<ModuleBinding, String> {
    match s.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
            Ok(ModuleBinding {
                name: name.trim().to_string(),
                path: PathBuf::from(path.trim()),
            })
        }
        _ => Err(format!("expected NAME=PATH, got '{}'", s)),
    }
}
