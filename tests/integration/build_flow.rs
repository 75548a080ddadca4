//! End-to-end configuration builds

use crate::integration::test_utils::Project;
use serde_json::json;
use webpack_helper::constants::{DEV, PROD, TEST_CSS, USE_STYLE};
use webpack_helper::prelude::*;

#[test]
fn test_typical_application_build() {
    let project = Project::new();
    project
        .module("resolve.json", r#"{"extensions": [".js", ".jsx"]}"#)
        .module("plugins/html.json", r#"{"name": "HtmlWebpackPlugin"}"#);
    let root = project.root().to_string_lossy().to_string();
    let h = project.helper();

    h.set("devtool", "source-map").unwrap();
    h.output().named().unwrap().clean().unwrap().by_mode().unwrap();
    h.entry().with_main().unwrap();
    h.entry().add("admin", EntryOptions::default()).unwrap();
    h.module().css(None).unwrap();
    h.module().extract_images().unwrap();
    h.load(["resolve"]).unwrap();
    h.plugin(["plugins", "html"]).unwrap();

    let conf = h
        .entry_point()(json!({}), json!({"mode": "production"}))
        .unwrap();

    assert_eq!(
        conf,
        json!({
            "devtool": "source-map",
            "output": {
                "filename": "[name].js",
                "clean": true,
                "path": format!("{}/dist/prod", root)
            },
            "entry": {
                "main": format!("{}/src/main.js", root),
                "admin": {
                    "dependOn": "main",
                    "import": format!("{}/src/admin.js", root)
                }
            },
            "optimization": {"runtimeChunk": "single"},
            "module": {"rules": [
                {"test": r"/\.css$/i", "use": ["style-loader", "css-loader"]},
                {"test": r"/\.(jpe?g|png|webp|heic|heif|gif|jif?f)$/i", "type": "asset/resource"}
            ]},
            "resolve": {"extensions": [".js", ".jsx"]},
            "plugins": [{"name": "HtmlWebpackPlugin"}]
        })
    );
}

#[test]
fn test_custom_rules_and_nesting() {
    let h = Helper::new(HelperOptions::new("/project")).unwrap();
    let js = h
        .module()
        .add(RuleSpec::from_value(json!({"test": r"/\.m?js$/", "exclude": "/node_modules/"})).unwrap())
        .unwrap();
    js.use_value(json!({"loader": "babel-loader"})).unwrap();
    let err = js.use_value("other-loader").unwrap_err();
    assert!(matches!(err, HelperError::Path(PathError::TypeConflict { .. })));

    let styles = js.add(r"/\.less$/").unwrap();
    styles.one_of("/inline/").unwrap().set_type("asset/inline").unwrap();
    styles.one_of("/raw/").unwrap().set_type("asset/source").unwrap();

    let conf = h.conf().unwrap();
    assert_eq!(
        conf["module"]["rules"],
        json!([
            {"test": r"/\.m?js$/", "exclude": "/node_modules/", "use": {"loader": "babel-loader"}},
            {"test": r"/\.less$/", "oneOf": [
                {"test": "/inline/", "type": "asset/inline"},
                {"test": "/raw/", "type": "asset/source"}
            ]}
        ])
    );
    assert_eq!(styles.location().to_string(), "module.rules.1");
    assert_eq!(styles.get("oneOf.1.type").unwrap(), Some(json!("asset/source")));
}

#[test]
fn test_constants_are_shared_by_every_section() {
    let h = Helper::new(HelperOptions::new("/project")).unwrap();
    let rule = h.module().add("x").unwrap();
    let from_rule = rule.constants().unwrap();
    let from_entry = h.entry().constants().unwrap();
    assert!(std::sync::Arc::ptr_eq(&from_rule, &from_entry));
    assert_eq!(from_rule.get(DEV), Some("development"));
    assert_eq!(from_rule.get(PROD), Some("production"));
    assert_eq!(from_entry.get(TEST_CSS), Some(r"/\.css$/i"));
    assert_eq!(h.constants().get(USE_STYLE), Some("style-loader"));
}
