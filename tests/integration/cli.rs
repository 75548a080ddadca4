//! Integration tests for the wph command line

use crate::integration::test_utils::Project;
use clap::Parser;
use serde_json::{json, Value};
use std::process::Command;
use webpack_helper::cli::{Cli, RunContext};
use webpack_helper::Section;

fn run(args: &[&str]) -> Value {
    let cli = Cli::try_parse_from(args).unwrap();
    let context = RunContext::new(&cli).unwrap();
    serde_json::from_str(&context.execute(&cli).unwrap()).unwrap()
}

#[test]
fn test_env_and_mode_reach_lifecycle_handlers() {
    let project = Project::new();
    let root = project.root().to_string_lossy().to_string();

    let cli = Cli::try_parse_from([
        "wph", "--root", root.as_str(), "--mode", "production", "--env", "analyze", "--env",
        "target=web",
    ])
    .unwrap();
    let context = RunContext::new(&cli).unwrap();
    context.helper().on("webpack", |helper, args| {
        helper.set_at(
            &"seen".into(),
            json!({"env": args[0].clone(), "argv": args[1].clone()}),
            &webpack_helper::WriteOptions::replace(),
        )
    });
    let tree: Value = serde_json::from_str(&context.execute(&cli).unwrap()).unwrap();

    assert_eq!(
        tree["seen"],
        json!({
            "env": {"analyze": true, "target": "web"},
            "argv": {"mode": "production"}
        })
    );
}

#[test]
fn test_loads_apply_in_order() {
    let project = Project::new();
    project
        .module("base.json", r#"{"devtool": "eval", "stats": "normal"}"#)
        .module("prod/overrides.json", r#"{"devtool": false}"#);
    let root = project.root().to_string_lossy().to_string();

    let tree = run(&["wph", "--root", root.as_str(), "--load", "base"]);
    assert_eq!(tree["base"], json!({"devtool": "eval", "stats": "normal"}));

    let tree = run(&["wph", "--root", root.as_str(), "--load", "prod/overrides"]);
    assert_eq!(tree, json!({"prod": {"overrides": {"devtool": false}}}));
}

#[test]
fn test_binary_prints_json_and_fails_cleanly() {
    let project = Project::new();
    project
        .module("resolve.toml", "extensions = [\".js\"]\n")
        .module("banner.json", r#""built by wph""#);
    let root = project.root().to_string_lossy().to_string();

    let output = Command::new(env!("CARGO_BIN_EXE_wph"))
        .args(["--root", root.as_str(), "--quiet", "--load", "resolve", "--pretty"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let tree: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree, json!({"resolve": {"extensions": [".js"]}}));

    let output = Command::new(env!("CARGO_BIN_EXE_wph"))
        .args(["--root", root.as_str(), "--quiet", "--plugin", "banner"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid plugin module"), "stderr: {}", stderr);
}
