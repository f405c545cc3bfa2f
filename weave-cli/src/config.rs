//! CLI 配置
//!
//! 项目文件 `weave.json` 的加载，以及日志配置（项目文件 + 命令行）的合并

use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use weave_api::{Phase, WeaveError};
use weave_config::{LogLevel, LoggingConfig, ProjectConfig};
use weave_vfs::VirtualFileSystem;

/// 默认项目文件名
pub const PROJECT_FILE: &str = "weave.json";

/// CLI 日志配置
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub global: LevelFilter,
    pub scan: Option<LevelFilter>,
    pub resolve: Option<LevelFilter>,
    pub assemble: Option<LevelFilter>,
    pub emit: Option<LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: LevelFilter::WARN,
            scan: None,
            resolve: None,
            assemble: None,
            emit: None,
        }
    }
}

impl LogConfig {
    /// 合并项目日志配置与命令行参数
    ///
    /// `--log-level` 覆盖项目文件中的全局级别；每个 `-v` 至少提升到 info/debug/trace。
    pub fn resolve(logging: &LoggingConfig, level: Option<LogLevel>, verbose: u8) -> Self {
        let mut global = level_filter(level.unwrap_or(logging.level));
        let floor = match verbose {
            0 => LevelFilter::OFF,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        if floor > global {
            global = floor;
        }
        Self {
            global,
            scan: logging.targets.scan.map(level_filter),
            resolve: logging.targets.resolve.map(level_filter),
            assemble: logging.targets.assemble.map(level_filter),
            emit: logging.targets.emit.map(level_filter),
        }
    }

    /// Get log level for a specific phase
    pub fn level_for(&self, phase: Phase) -> LevelFilter {
        let specific = match phase {
            Phase::Scan => self.scan,
            Phase::Resolve => self.resolve,
            Phase::Assemble => self.assemble,
            Phase::Emit => self.emit,
        };
        specific.unwrap_or(self.global)
    }
}

pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Silent => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

/// 加载项目文件
///
/// 显式指定的文件必须存在；未指定时尝试当前目录的 `weave.json`，不存在则用默认配置。
pub fn load_project(
    explicit: Option<&Path>,
    vfs: &dyn VirtualFileSystem,
) -> Result<ProjectConfig, WeaveError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(PROJECT_FILE);
            if !vfs.is_file(&default) {
                return Ok(ProjectConfig::default());
            }
            default
        }
    };

    let content = vfs
        .read_to_string(&path)
        .map_err(|e| WeaveError::Config(format!("cannot read '{}': {}", path.display(), e)))?;
    let base_dir = path.parent().unwrap_or(Path::new(""));
    ProjectConfig::from_json(&content, base_dir)
        .map_err(|e| WeaveError::Config(format!("failed to parse '{}': {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_config::LogTargets;
    use weave_vfs::MemoryFileSystem;

    #[test]
    fn test_log_config_defaults_to_project_level() {
        let logging = LoggingConfig {
            level: LogLevel::Info,
            targets: LogTargets {
                resolve: Some(LogLevel::Trace),
                ..LogTargets::default()
            },
            ..LoggingConfig::default()
        };
        let config = LogConfig::resolve(&logging, None, 0);
        assert_eq!(config.global, LevelFilter::INFO);
        assert_eq!(config.level_for(Phase::Resolve), LevelFilter::TRACE);
        assert_eq!(config.level_for(Phase::Emit), LevelFilter::INFO);
    }

    #[test]
    fn test_cli_level_and_verbose() {
        let logging = LoggingConfig::default();
        assert_eq!(
            LogConfig::resolve(&logging, Some(LogLevel::Silent), 0).global,
            LevelFilter::OFF
        );
        assert_eq!(
            LogConfig::resolve(&logging, Some(LogLevel::Error), 2).global,
            LevelFilter::DEBUG
        );
        assert_eq!(
            LogConfig::resolve(&logging, Some(LogLevel::Trace), 1).global,
            LevelFilter::TRACE
        );
    }

    #[test]
    fn test_load_project_missing_default_is_ok() {
        let vfs = MemoryFileSystem::new();
        assert_eq!(load_project(None, &vfs).unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_load_project_explicit_missing_is_error() {
        let vfs = MemoryFileSystem::new();
        let err = load_project(Some(Path::new("/site/weave.json")), &vfs).unwrap_err();
        assert_eq!(err.exit_code(), 64);
    }

    #[test]
    fn test_load_project_rebases_paths() {
        let vfs = MemoryFileSystem::with_files([(
            "/site/weave.json",
            br#"{ "entry": "src/main.js", "moduleSearchPaths": ["lib"], "outputMode": "split" }"#
                .to_vec(),
        )]);
        let project = load_project(Some(Path::new("/site/weave.json")), &vfs).unwrap();
        assert_eq!(project.entry, Some(PathBuf::from("/site/src/main.js")));
        assert_eq!(project.build.module_search_paths, vec![PathBuf::from("/site/lib")]);
    }

    #[test]
    fn test_load_project_bad_json() {
        let vfs = MemoryFileSystem::with_files([("/weave.json", b"{ nope".to_vec())]);
        let err = load_project(Some(Path::new("/weave.json")), &vfs).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
