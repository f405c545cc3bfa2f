//! Emitters serialize an [`OutputDocument`] into deployable artifacts
//! and write them through the VFS.
//!
//! Serialization is pure and happens for every artifact before the first
//! write. Writing is staged: artifacts land in temporary siblings and are
//! renamed into place only after every one of them was written.

mod single;
mod split;

pub use single::SingleFileEmitter;
pub use split::SplitEmitter;

use crate::document::OutputDocument;
use crate::error::BuildError;
use crate::transform::escape_html;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use weave_config::OutputMode;
use weave_vfs::{VfsResult, VirtualFileSystem};

const STAGING_SUFFIX: &str = ".weave-tmp";
const BACKUP_SUFFIX: &str = ".weave-bak";

/// A serialized output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    /// MIME type
    pub content_type: &'static str,
    pub content: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, content_type: &'static str, content: String) -> Self {
        Self {
            path: path.into(),
            content_type,
            content,
        }
    }
}

/// Where and how to emit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitPlan {
    /// `outputPath`: a directory, or an `.html` file in single-file mode
    pub output_path: PathBuf,
    /// Entry file stem, used to name artifacts
    pub stem: String,
    pub title: String,
}

impl EmitPlan {
    /// Plan for `entry`; the title defaults to the entry stem
    pub fn for_entry(entry: &Path, output_path: impl Into<PathBuf>, title: Option<&str>) -> Self {
        let stem = entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index".to_string());
        Self {
            output_path: output_path.into(),
            title: title.map(str::to_string).unwrap_or_else(|| stem.clone()),
            stem,
        }
    }

    /// Output directory and file stem: an `.html`/`.htm` output path names
    /// the page itself, anything else is a directory
    pub(crate) fn layout(&self) -> (PathBuf, String) {
        if is_html_path(&self.output_path) {
            let dir = self
                .output_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let stem = self
                .output_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.stem.clone());
            (dir, stem)
        } else {
            (self.output_path.clone(), self.stem.clone())
        }
    }
}

/// Emitter trait
pub trait Emitter {
    fn mode(&self) -> OutputMode;

    /// Serialize the document; pure
    fn serialize(&self, doc: &OutputDocument, plan: &EmitPlan) -> Vec<Artifact>;

    /// Write serialized artifacts, creating parent directories
    ///
    /// 先全部写到同目录的临时文件，全部成功后再逐个改名。
    /// 任何一步失败都会删掉临时文件并恢复被替换的旧文件，目标路径保持原样。
    fn write(&self, artifacts: &[Artifact], vfs: &dyn VirtualFileSystem) -> Result<(), BuildError> {
        let mut staged: Vec<PathBuf> = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let temp = sibling(&artifact.path, STAGING_SUFFIX);
            if let Err(e) = stage(artifact, &temp, vfs) {
                discard(&staged, vfs);
                return Err(e);
            }
            staged.push(temp);
        }

        let mut committed: Vec<Commit> = Vec::with_capacity(artifacts.len());
        for (index, (artifact, temp)) in artifacts.iter().zip(&staged).enumerate() {
            match commit(&artifact.path, temp, vfs) {
                Ok(done) => committed.push(done),
                Err(e) => {
                    discard(&staged[index..], vfs);
                    roll_back(&committed, vfs);
                    return Err(BuildError::io(&artifact.path, e));
                }
            }
        }

        for (artifact, done) in artifacts.iter().zip(&committed) {
            if let Some(backup) = &done.backup {
                discard(std::slice::from_ref(backup), vfs);
            }
            debug!(
                target: "weave::emit",
                path = %artifact.path.display(),
                bytes = artifact.content.len(),
                content_type = artifact.content_type,
                "Wrote artifact"
            );
        }
        Ok(())
    }

    /// Serialize everything, then write
    fn emit(
        &self,
        doc: &OutputDocument,
        plan: &EmitPlan,
        vfs: &dyn VirtualFileSystem,
    ) -> Result<Vec<Artifact>, BuildError> {
        let artifacts = self.serialize(doc, plan);
        self.write(&artifacts, vfs)?;
        info!(
            target: "weave::emit",
            mode = self.mode().as_str(),
            artifacts = artifacts.len(),
            "Emitted"
        );
        Ok(artifacts)
    }
}

/// Emitter for an output mode
pub fn emitter_for(mode: OutputMode) -> Box<dyn Emitter> {
    match mode {
        OutputMode::SingleFile => Box::new(SingleFileEmitter::new()),
        OutputMode::Split => Box::new(SplitEmitter::new()),
    }
}

/// 同目录的兄弟文件：`page.html` → `page.html<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn stage(artifact: &Artifact, temp: &Path, vfs: &dyn VirtualFileSystem) -> Result<(), BuildError> {
    if let Some(parent) = artifact.path.parent() {
        if !parent.as_os_str().is_empty() {
            vfs.create_dir_all(parent)
                .map_err(|e| BuildError::io(parent, e))?;
        }
    }
    vfs.write_file(temp, artifact.content.as_bytes())
        .map_err(|e| BuildError::io(&artifact.path, e))
}

/// 已改名到位的产物；`backup` 是被替换的旧文件
struct Commit {
    path: PathBuf,
    backup: Option<PathBuf>,
}

fn commit(path: &Path, temp: &Path, vfs: &dyn VirtualFileSystem) -> VfsResult<Commit> {
    let backup = if vfs.is_file(path) {
        let backup = sibling(path, BACKUP_SUFFIX);
        vfs.rename(path, &backup)?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = vfs.rename(temp, path) {
        if let Some(backup) = &backup {
            restore(backup, path, vfs);
        }
        return Err(e);
    }
    Ok(Commit {
        path: path.to_path_buf(),
        backup,
    })
}

fn roll_back(committed: &[Commit], vfs: &dyn VirtualFileSystem) {
    for done in committed.iter().rev() {
        discard(std::slice::from_ref(&done.path), vfs);
        if let Some(backup) = &done.backup {
            restore(backup, &done.path, vfs);
        }
    }
}

fn restore(backup: &Path, path: &Path, vfs: &dyn VirtualFileSystem) {
    if let Err(e) = vfs.rename(backup, path) {
        warn!(target: "weave::emit", path = %path.display(), error = %e, "Failed to restore previous file");
    }
}

fn discard(paths: &[PathBuf], vfs: &dyn VirtualFileSystem) {
    for path in paths {
        if let Err(e) = vfs.remove_file(path) {
            warn!(target: "weave::emit", path = %path.display(), error = %e, "Failed to remove file");
        }
    }
}

pub(crate) fn is_html_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            ext == "html" || ext == "htm"
        })
        .unwrap_or(false)
}

/// `<!DOCTYPE html>` through the opening `<head>` contents
pub(crate) fn document_head(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n",
        escape_html(title)
    )
}
