//! 测试辅助工具
//!
//! 提供端到端测试的辅助函数

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use weave::{BuildConfig, MemoryFileSystem, VirtualFileSystem};

/// 创建测试用的内存文件系统
pub fn create_test_fs(files: &[(&str, &str)]) -> MemoryFileSystem {
    MemoryFileSystem::with_files(
        files
            .iter()
            .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec())),
    )
}

/// 搜索根为 `roots`、输出到 `out` 的构建配置
pub fn config(roots: &[&str], out: &str) -> BuildConfig {
    BuildConfig {
        module_search_paths: roots.iter().map(PathBuf::from).collect(),
        output_path: PathBuf::from(out),
        ..BuildConfig::default()
    }
}

/// 读取生成的文件
pub fn read(fs: &dyn VirtualFileSystem, path: &str) -> String {
    fs.read_to_string(Path::new(path))
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path, e))
}

/// 一个 ui 组件模块，导出 `widget`
pub const WIDGET: &str = "\
:export widget
/*css*/.widget{border:1px solid}/*~css*/
/*html*/<template id=\"widget\"><span></span></template>/*~html*/
var widget = {
    mount: function (id) {
        document.getElementById(id).className = 'widget'; /*D*/
    }
};
";

/// 导入 `ui.Widget` 的入口文件
pub const ENTRY: &str = "\
/*html*/<div id=\"x\"></div>/*~html*/
/*css*/#x{color:red}/*~css*/
:import ui.Widget
widget.mount(\"x\");
";
