//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现分阶段日志控制。日志写到 stderr，
//! stdout 留给 `list` 等命令的输出。

use crate::config::LogConfig;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};
use weave_api::{Phase, WeaveError};
use weave_config::LogFormat;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Build filter targets
pub fn targets(log_config: &LogConfig) -> Targets {
    let mut targets = Targets::new().with_default(log_config.global);
    for phase in Phase::ALL {
        targets = targets.with_target(phase.target(), log_config.level_for(phase));
    }
    targets
        .with_target("weave::api", log_config.global)
        .with_target("weave::vfs", log_config.global)
        .with_target("weave::cli", log_config.global)
}

/// 使用指定格式和日志配置初始化日志系统；指定 `file` 时同时追加写入文件
pub fn init(
    log_config: &LogConfig,
    format: LogFormat,
    file: Option<&Path>,
) -> Result<(), WeaveError> {
    let targets = targets(log_config);
    let mut layers: Vec<BoxedLayer> = vec![create_format_layer(format, io::stderr, true)
        .with_filter(targets.clone())
        .boxed()];

    if let Some(path) = file {
        let file_handle = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                WeaveError::Config(format!("cannot open log file '{}': {}", path.display(), e))
            })?;
        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file_handle))
                .with_filter(targets)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| WeaveError::Config(format!("cannot initialize logging: {}", e)))
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(format: LogFormat, make_writer: F, ansi: bool) -> BoxedLayer
where
    W: io::Write + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_ansi(ansi)
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_ansi(ansi)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
    }
}
