//! Integration tests for Configuration System

use std::path::PathBuf;
use tempfile::TempDir;
use webpack_helper::config::{ConfigLoader, PROJECT_FILE};
use webpack_helper::prelude::*;

#[test]
fn test_project_file_drives_helper_layout() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join(PROJECT_FILE),
        r#"
[paths]
src_path = "client"
dest_path = "public"
conf_path = "build"
"#,
    )
    .unwrap();
    std::fs::create_dir_all(temp_dir.path().join("build")).unwrap();
    std::fs::write(
        temp_dir.path().join("build").join("stats.json"),
        r#""errors-only""#,
    )
    .unwrap();

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    let helper = Helper::new(config.helper_options(temp_dir.path())).unwrap();

    assert_eq!(
        helper.resolve_source(["index.js"]),
        temp_dir.path().join("client").join("index.js")
    );
    assert_eq!(
        helper.resolve_destination(["prod"]),
        temp_dir.path().join("public").join("prod")
    );
    helper.load(["stats"]).unwrap();
    assert_eq!(helper.get("stats").unwrap(), Some(serde_json::json!("errors-only")));
}

#[test]
fn test_explicit_file_with_root() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("custom.toml");
    std::fs::write(
        &config_file,
        r#"
[paths]
root_path = "/srv/app"

[logging]
level = "info"
output = "stdout"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.paths.root_path, Some(PathBuf::from("/srv/app")));
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.output, "stdout");

    let options = config.helper_options(temp_dir.path());
    assert_eq!(options.root_path, Some(PathBuf::from("/srv/app")));
    let helper = Helper::new(options).unwrap();
    assert_eq!(helper.root(), PathBuf::from("/srv/app").as_path());
}

#[test]
fn test_invalid_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("bad.toml");
    std::fs::write(
        &config_file,
        r#"
[logging]
format = "xml"
"#,
    )
    .unwrap();

    let err = ConfigLoader::load_from_file(&config_file).unwrap_err();
    assert!(matches!(err, HelperError::Configuration(ref msg) if msg.contains("xml")));
}
