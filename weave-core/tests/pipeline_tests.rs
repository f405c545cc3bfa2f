//! 端到端组装测试

mod common;

use common::{compile, compile_with, create_test_fs, ignore_case};
use std::path::{Path, PathBuf};
use weave_config::BuildOptions;
use weave_core::{emitter_for, BuildError, EmitPlan, NamePolicy};
use weave_vfs::{LoggedFileSystem, VirtualFileSystem};

const WIDGET: &str = "\
:export widget
/*css*/.widget{border:1px solid}/*~css*/
var widget = {
    mount: function (id) {
        document.getElementById(id).className = 'widget';
    }
};
";

const ENTRY: &str = "\
/*html*/<div id=\"x\"></div>/*~html*/
/*css*/#x{color:red}/*~css*/
:import ui.Widget
widget.mount(\"x\");
";

#[test]
fn test_widget_scenario() {
    let fs = create_test_fs(&[("/app/main.js", ENTRY), ("/lib/ui/Widget.js", WIDGET)]);
    let compiled = compile(&fs, "/app/main.js", &["/lib"]).unwrap();
    let doc = &compiled.document;

    assert_eq!(doc.markup_text(), "<div id=\"x\"></div>");
    assert!(doc.stylesheet_text().contains("#x{color:red}"));

    let script = doc.script_text();
    let defined = script.find("ui.Widget = (function () {").unwrap();
    let bound = script.find("var widget = ui.Widget;").unwrap();
    let used = script.find("widget.mount(\"x\");").unwrap();
    assert!(defined < bound);
    assert!(bound < used);
}

#[test]
fn test_single_file_output_is_byte_identical() {
    let fs = create_test_fs(&[("/app/main.js", ENTRY), ("/lib/ui/Widget.js", WIDGET)]);
    let emitter = emitter_for(Default::default());
    let plan = EmitPlan::for_entry(Path::new("/app/main.js"), "/dist", None);

    let first = compile(&fs, "/app/main.js", &["/lib"]).unwrap();
    emitter.emit(&first.document, &plan, &fs).unwrap();
    let before = fs.read_file(Path::new("/dist/main.html")).unwrap();

    let second = compile(&fs, "/app/main.js", &["/lib"]).unwrap();
    emitter.emit(&second.document, &plan, &fs).unwrap();
    let after = fs.read_file(Path::new("/dist/main.html")).unwrap();

    assert_eq!(before, after);
}

#[test]
fn test_diamond_scans_once() {
    let fs = LoggedFileSystem::new(create_test_fs(&[
        ("/main.js", ":import ui.Left\n:import ui.Right\n"),
        ("/lib/ui/Left.js", ":import ui.Base\nvar Left = Base;\n"),
        ("/lib/ui/Right.js", ":import ui.Base\nvar Right = Base;\n"),
        ("/lib/ui/Base.js", "var Base = {};\n"),
    ]));
    let compiled = compile(&fs, "/main.js", &["/lib"]).unwrap();

    assert_eq!(compiled.scans, 3);
    assert_eq!(fs.reads(Path::new("/lib/ui/Base.js")), 1);

    let script = compiled.document.script_text();
    let base = script.find("ui.Base = (function").unwrap();
    let left = script.find("ui.Left = (function").unwrap();
    let right = script.find("ui.Right = (function").unwrap();
    assert!(base < left && left < right);
    assert_eq!(script.matches("ui.Base = (function").count(), 1);
}

#[test]
fn test_cycle_rejected_whichever_entry() {
    let files = [
        ("/lib/a/A.js", ":import b.B\nvar A;\n"),
        ("/lib/b/B.js", ":import a.A\nvar B;\n"),
        ("/entry_a.js", ":import a.A\n"),
        ("/entry_b.js", ":import b.B\n"),
    ];
    let fs = create_test_fs(&files);

    for (entry, expected) in [
        ("/entry_a.js", vec!["a.A", "b.B", "a.A"]),
        ("/entry_b.js", vec!["b.B", "a.A", "b.B"]),
        ("/lib/a/A.js", vec!["b.B", "a.A", "b.B"]),
    ] {
        match compile(&fs, entry, &["/lib"]) {
            Err(BuildError::CircularImport { chain }) => assert_eq!(chain, expected, "entry {}", entry),
            Err(other) => panic!("entry {}: unexpected error {}", entry, other),
            Ok(_) => panic!("entry {}: cycle not detected", entry),
        }
    }
}

#[test]
fn test_missing_module() {
    let fs = create_test_fs(&[("/main.js", "// header\n:import ui.Nowhere\n")]);
    let err = compile(&fs, "/main.js", &["/lib", "/vendor"]).err().unwrap();
    match err {
        BuildError::ModuleNotFound {
            name,
            importer,
            line,
            searched,
        } => {
            assert_eq!(name, "ui.Nowhere");
            assert_eq!(importer, PathBuf::from("/main.js"));
            assert_eq!(line, 2);
            assert_eq!(
                searched,
                vec![
                    PathBuf::from("/lib/ui/Nowhere.js"),
                    PathBuf::from("/vendor/ui/Nowhere.js")
                ]
            );
        }
        other => panic!("unexpected {}", other),
    }
}

#[test]
fn test_unterminated_block_in_entry() {
    let fs = create_test_fs(&[("/page.js", "/*html*/<p>")]);
    let err = compile(&fs, "/page.js", &[]).err().unwrap();
    assert!(matches!(
        err,
        BuildError::MalformedBlock { ref path, line: 1, .. } if path == Path::new("/page.js")
    ));
}

#[test]
fn test_missing_entry_is_io_error() {
    let fs = create_test_fs(&[]);
    let err = compile(&fs, "/nope.js", &[]).err().unwrap();
    assert!(matches!(err, BuildError::Io { .. }));
}

#[test]
fn test_ignore_case_resolution() {
    let fs = create_test_fs(&[
        ("/main.js", ":import UI.widget\n:import ui.Widget\n"),
        ("/lib/ui/Widget.js", "var Widget;\n"),
    ]);
    let compiled = compile_with(&fs, "/main.js", &["/lib"], ignore_case(), &BuildOptions::default()).unwrap();
    assert_eq!(compiled.registry.len(), 1);
    assert_eq!(compiled.scans, 1);
}

#[test]
fn test_ignore_case_default_export_uses_file_name() {
    let fs = create_test_fs(&[
        ("/main.js", ":import ui.widget\nWidget.render();\n"),
        ("/lib/ui/Widget.js", "function Widget() {}\n"),
    ]);
    let compiled = compile_with(&fs, "/main.js", &["/lib"], ignore_case(), &BuildOptions::default()).unwrap();
    let script = compiled.document.script_text();

    assert!(script.contains("return Widget;"));
    assert!(script.contains("var Widget = ui.widget;"));
    assert!(!script.contains("return widget;"));
}

#[test]
fn test_include_and_css_directives() {
    let fs = create_test_fs(&[
        (
            "/app/main.js",
            "//:include ../vendor/license.txt\n:css ui.Theme\n:import ui.Widget\n/*css*/#x{}/*~css*/\nstart();\n",
        ),
        ("/vendor/license.txt", "/* MIT */"),
        ("/lib/ui/Theme.css", "body{margin:0}"),
        ("/lib/ui/Widget.js", "//= require <polyfill>\n:include debug.js\n:export widget\nvar widget = {};\n"),
        ("/lib/ui/polyfill.js", "window.ready = true;"),
        ("/lib/ui/debug.js", "##!ignore!##"),
    ]);
    let options = BuildOptions {
        exclude_markers: vec!["##!ignore!##".to_string()],
        ..BuildOptions::default()
    };
    let compiled =
        compile_with(&fs, "/app/main.js", &["/lib"], NamePolicy::default(), &options).unwrap();
    let doc = &compiled.document;

    let origins: Vec<&str> = doc.script().iter().map(|f| f.origin.as_str()).collect();
    assert_eq!(
        origins,
        vec!["/lib/ui/polyfill.js", "ui.Widget", "/vendor/license.txt", "/app/main.js"]
    );
    assert_eq!(doc.stylesheet_text(), "body{margin:0}\n#x{}");
    assert!(!doc.script_text().contains("require"));
    assert!(!doc.script_text().contains("##!ignore!##"));
}

#[test]
fn test_string_template_and_strip_lines() {
    let fs = create_test_fs(&[(
        "/main.js",
        "var tpl = /*js.string*/<li class=\"item\">{name}</li>/*~js.string*/;\nconsole.log(tpl); /*D*/\nrender(tpl);\n",
    )]);
    let options = BuildOptions {
        strip_lines: vec!["/*D*/".to_string()],
        ..BuildOptions::default()
    };
    let compiled = compile_with(&fs, "/main.js", &[], NamePolicy::default(), &options).unwrap();
    assert_eq!(
        compiled.document.script_text(),
        "var tpl = \"<li class=\\\"item\\\">{name}</li>\";\nrender(tpl);"
    );
}

#[test]
fn test_css_to_script_leaves_no_style() {
    let fs = create_test_fs(&[("/app/main.js", ENTRY), ("/lib/ui/Widget.js", WIDGET)]);
    let options = BuildOptions {
        css_to_script: true,
        ..BuildOptions::default()
    };
    let compiled =
        compile_with(&fs, "/app/main.js", &["/lib"], NamePolicy::default(), &options).unwrap();
    assert!(compiled.document.stylesheet().is_empty());

    let plan = EmitPlan::for_entry(Path::new("/app/main.js"), "/dist/page.html", None);
    let artifacts = emitter_for(Default::default()).serialize(&compiled.document, &plan);
    assert!(!artifacts[0].content.contains("<style>"));
    assert!(artifacts[0].content.contains("#x{color:red}"));
}
