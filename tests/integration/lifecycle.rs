//! Integration tests for event dispatch and the build lifecycle

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use webpack_helper::prelude::*;

fn helper() -> Helper {
    Helper::new(HelperOptions::new("/project")).unwrap()
}

#[test]
fn test_handlers_run_in_order_and_late_ones_wait() {
    let h = helper();
    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let added = Arc::new(AtomicBool::new(false));

    let (l1, l3, flag) = (log.clone(), log.clone(), added.clone());
    h.on("build", move |helper: &Helper, _args: &[Value]| {
        l1.lock().push("h1".to_string());
        if !flag.swap(true, Ordering::SeqCst) {
            let l3 = l3.clone();
            helper.on("build", move |_: &Helper, _: &[Value]| {
                l3.lock().push("h3".to_string());
                Ok(())
            });
        }
        Ok(())
    });
    let l2 = log.clone();
    h.on("build", move |_: &Helper, _: &[Value]| {
        l2.lock().push("h2".to_string());
        Ok(())
    });

    h.trigger("build", &[]).unwrap();
    assert_eq!(*log.lock(), vec!["h1", "h2"]);
    assert_eq!(h.handler_count("build"), 3);

    h.trigger("build", &[]).unwrap();
    assert_eq!(*log.lock(), vec!["h1", "h2", "h1", "h2", "h3"]);
}

#[test]
fn test_first_failure_stops_dispatch() {
    let h = helper();
    let ran = Arc::new(AtomicBool::new(false));
    h.on("webpack", |_: &Helper, _: &[Value]| {
        Err(HelperError::handler("webpack", "no entry defined"))
    });
    let flag = ran.clone();
    h.on("webpack", move |_: &Helper, _: &[Value]| {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    });

    let err = h.finish(json!({}), json!({})).unwrap_err();
    assert!(matches!(err, HelperError::Handler { ref event, .. } if event == "webpack"));
    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn test_unknown_event_is_a_no_op() {
    let h = helper();
    h.trigger("nobody-listens", &[json!(1)]).unwrap();
    assert_eq!(h.handler_count("nobody-listens"), 0);
}

#[test]
fn test_finish_passes_env_and_argv() {
    let h = helper();
    h.on(h.lifecycle_event(), |helper: &Helper, args: &[Value]| {
        assert_eq!(args.len(), 2);
        if args[0]["analyze"] == json!(true) {
            helper.set("profile", true)?;
        }
        if let Some(mode) = args[1].get("mode") {
            helper.set("mode", mode.clone())?;
        }
        Ok(())
    });

    let conf = h
        .finish(json!({"analyze": true}), json!({"mode": "production"}))
        .unwrap();
    assert_eq!(conf, json!({"profile": true, "mode": "production"}));
}

#[test]
fn test_output_path_follows_mode() {
    let cases = [
        (json!({"mode": "production"}), None, "/project/dist/prod"),
        (json!({}), Some("development"), "/project/dist/dev"),
        (json!({"mode": "none"}), Some("development"), "/project/dist/none"),
        (json!({}), None, "/project/dist/none"),
    ];
    for (argv, tree_mode, expected) in cases {
        let h = helper();
        if let Some(mode) = tree_mode {
            h.set("mode", mode).unwrap();
        }
        h.output().by_mode().unwrap();
        let conf = h.finish(json!({}), argv).unwrap();
        assert_eq!(conf["output"]["path"], json!(expected));
    }
}

#[test]
fn test_explicit_output_path_is_kept() {
    let h = helper();
    h.output().set("path", "/custom").unwrap().by_mode().unwrap();
    let conf = h.finish(json!({}), json!({"mode": "production"})).unwrap();
    assert_eq!(conf["output"]["path"], json!("/custom"));
}

#[test]
fn test_entry_point_can_run_twice() {
    let h = helper();
    let runs = Arc::new(Mutex::new(0));
    let counter = runs.clone();
    h.on("webpack", move |_: &Helper, _: &[Value]| {
        *counter.lock() += 1;
        Ok(())
    });
    h.set("mode", "development").unwrap();

    let build = h.entry_point();
    let first = build(json!({}), json!({})).unwrap();
    let second = build(json!({}), json!({})).unwrap();
    assert_eq!(first, second);
    assert_eq!(*runs.lock(), 2);
}
