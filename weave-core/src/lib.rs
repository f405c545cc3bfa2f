//! Weave Core
//!
//! 单文件 Web 资源编译器的核心：
//! - [`scanner`]: 把源文件切成 markup / stylesheet / script / 指令分段
//! - [`module`]: 模块名、注册表、`:import` 递归解析
//! - [`assembler`]: 合成 [`OutputDocument`]
//! - [`emitter`]: 序列化为单个 HTML 或 HTML/CSS/JS 三件套
//!
//! 数据流：Scanner → ImportResolver（经 ModuleRegistry 递归调用 Scanner）
//! → Assembler → Emitter。

pub mod assembler;
pub mod document;
pub mod emitter;
pub mod error;
pub mod kit;
pub mod module;
pub mod scanner;
pub mod transform;

pub use assembler::Assembler;
pub use document::{Fragment, OutputDocument};
pub use emitter::{emitter_for, Artifact, EmitPlan, Emitter, SingleFileEmitter, SplitEmitter};
pub use error::BuildError;
pub use kit::{LineIndex, SourcePosition};
pub use module::{
    Attachment, AttachmentKind, ImportResolver, ModuleHandle, ModuleName, ModuleRegistry, NamePolicy,
};
pub use scanner::{scan, BlockKind, Segment, SegmentKind, SourceFile};
