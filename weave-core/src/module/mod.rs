//! 模块系统
//!
//! - [`name`]: 模块名、名字到文件路径的映射
//! - [`registry`]: 单次构建内的模块注册表
//! - [`resolver`]: 递归解析 `:import`

pub mod name;
pub mod registry;
pub mod resolver;

pub use name::{normalize_path, ModuleName, NameError, NamePolicy};
pub use registry::{Attachment, AttachmentKind, ModuleHandle, ModuleRegistry};
pub use resolver::ImportResolver;
