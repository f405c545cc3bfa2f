//! Weave API - Build orchestration layer
//!
//! Provides the unified build interface:
//! - `compile(entry, &config, vfs)`: scan, resolve and assemble, no output
//! - `build(entry, &config, vfs)`: compile, then emit through the VFS
//! - `list_modules(entry, &config, vfs, &options)`: index mode
//!
//! Every call is one independent build; nothing is cached across calls.

pub mod error;
pub mod types;

pub use error::{ErrorDetails, ErrorReport, WeaveError};
pub use types::{BuildOutput, CompileOutput, ListOptions};

pub use weave_config;
pub use weave_config::{BuildConfig, BuildOptions, OutputMode, Phase};
pub use weave_core::{Artifact, BuildError, OutputDocument};

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use weave_core::module::normalize_path;
use weave_core::{
    emitter_for, scan, Assembler, EmitPlan, ImportResolver, ModuleName, ModuleRegistry,
    NamePolicy, SourceFile,
};
use weave_vfs::{VfsError, VirtualFileSystem};

/// Entry file plus every module it transitively imports
struct Resolved {
    source: SourceFile,
    registry: ModuleRegistry,
    scans: usize,
}

impl Resolved {
    fn roots(&self) -> Vec<ModuleName> {
        self.source.imports().map(|(name, _)| name.clone()).collect()
    }
}

/// Compile without writing anything
pub fn compile(
    entry: &Path,
    config: &BuildConfig,
    vfs: &dyn VirtualFileSystem,
) -> Result<CompileOutput, WeaveError> {
    info!(target: "weave::api", entry = %entry.display(), "Starting compile");
    let resolved = resolve(entry, config, vfs)?;

    let document = Assembler::new(&resolved.registry, &config.options).assemble(&resolved.source)?;
    let modules = resolved
        .registry
        .dependency_order(&resolved.roots(), resolved.source.path())?;

    Ok(CompileOutput {
        entry: resolved.source.path().to_path_buf(),
        document,
        modules,
        scans: resolved.scans,
    })
}

/// Compile and emit
///
/// Artifacts are written only after the whole pipeline succeeded.
pub fn build(
    entry: &Path,
    config: &BuildConfig,
    vfs: &dyn VirtualFileSystem,
) -> Result<BuildOutput, WeaveError> {
    let compiled = compile(entry, config, vfs)?;

    let plan = EmitPlan::for_entry(&compiled.entry, &config.output_path, config.title.as_deref());
    let emitter = emitter_for(config.output_mode);
    let artifacts = emitter.emit(&compiled.document, &plan, vfs)?;

    info!(
        target: "weave::api",
        entry = %compiled.entry.display(),
        modules = compiled.modules.len(),
        scans = compiled.scans,
        artifacts = artifacts.len(),
        "Build completed"
    );
    Ok(BuildOutput {
        compiled,
        artifacts,
    })
}

/// Index mode: module files in dependency order, entry last
///
/// Files pulled in with `:include` / `:css` are listed right before the
/// file that pulls them in, each one once.
pub fn list_modules(
    entry: &Path,
    config: &BuildConfig,
    vfs: &dyn VirtualFileSystem,
    options: &ListOptions,
) -> Result<Vec<String>, WeaveError> {
    let resolved = resolve(entry, config, vfs)?;
    let modules = resolved
        .registry
        .dependency_order(&resolved.roots(), resolved.source.path())?;

    let mut paths: Vec<PathBuf> = Vec::new();
    let sources = modules
        .iter()
        .map(|module| module.path.as_path())
        .chain(std::iter::once(resolved.source.path()));
    for source in sources {
        for attachment in resolved.registry.attachments_of(source) {
            if !paths.contains(&attachment.path) {
                paths.push(attachment.path.clone());
            }
        }
        paths.push(source.to_path_buf());
    }

    Ok(paths
        .into_iter()
        .map(|path| {
            let path = match &options.absolute_base {
                Some(base) if path.is_relative() => normalize_path(&base.join(path)),
                _ => path,
            };
            format!("{}{}{}", options.prefix, path.display(), options.suffix)
        })
        .collect())
}

/// Search roots: the configured ones, or the entry's directory
fn search_roots(entry: &Path, config: &BuildConfig) -> Vec<PathBuf> {
    if !config.module_search_paths.is_empty() {
        return config.module_search_paths.clone();
    }
    match entry.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => vec![parent.to_path_buf()],
        _ => vec![PathBuf::from(".")],
    }
}

fn resolve(
    entry: &Path,
    config: &BuildConfig,
    vfs: &dyn VirtualFileSystem,
) -> Result<Resolved, WeaveError> {
    let entry = normalize_path(entry);
    let text = vfs
        .read_to_string(&entry)
        .map_err(|e| BuildError::io(&entry, e))?;
    let source = scan(entry.clone(), text)?;

    let roots = search_roots(&entry, config);
    debug!(target: "weave::api", roots = ?roots, "Module search roots");

    let mut registry = ModuleRegistry::new(config.name_matching);
    let mut resolver = ImportResolver::new(vfs, roots, NamePolicy::from_config(config))
        .with_exclude_markers(&config.options.exclude_markers);

    // 先登记全部绑定再加载，绑定之间的 import 与顺序无关
    for binding in &config.modules {
        let name = ModuleName::parse(&binding.name).map_err(|e| {
            WeaveError::Config(format!("invalid module binding '{}': {}", binding.name, e))
        })?;
        resolver.bind(&name, &binding.path)?;
    }
    resolver.load_bindings(&mut registry)?;
    resolver.resolve_imports(&source, &mut registry)?;

    Ok(Resolved {
        source,
        registry,
        scans: resolver.scans(),
    })
}

/// Absolute base for `ListOptions`: the process working directory
pub fn current_dir() -> Result<PathBuf, WeaveError> {
    std::env::current_dir().map_err(|e| {
        let here = Path::new(".");
        WeaveError::Build(BuildError::io(here, VfsError::from_io(here, e)))
    })
}
