//! Integration tests for statement registration and cross-linking

use serde_json::json;
use std::sync::Arc;
use webpack_helper::prelude::*;

/// Minimal statement writing under its own name
#[derive(Debug)]
struct Named {
    top: TopHandle,
    name: &'static str,
}

impl Section for Named {
    fn top(&self) -> Result<Helper, HelperError> {
        self.top.upgrade()
    }

    fn namespace(&self) -> Option<&str> {
        Some(self.name)
    }
}

impl Statement for Named {
    fn handle(&self) -> &TopHandle {
        &self.top
    }
}

fn register(helper: &Helper, names: &[&'static str]) {
    for &name in names {
        helper
            .add_statement(name, |top| Named { top, name })
            .unwrap();
    }
}

#[test]
fn test_registration_order_does_not_matter() {
    let names = ["x", "y", "z"];
    for order in [["x", "y", "z"], ["z", "y", "x"]] {
        let helper = Helper::new(HelperOptions::new("/project")).unwrap();
        register(&helper, &order);

        for from in names {
            let statement = helper.statement_as::<Named>(from).unwrap();
            for to in names {
                let sibling = statement.sibling_as::<Named>(to).unwrap();
                assert_eq!(sibling.name, to);
                assert!(sibling.handle().belongs_to(&helper));
            }
        }

        let expected: Vec<String> = ["output", "entry", "module"]
            .iter()
            .chain(order.iter())
            .map(|s| s.to_string())
            .collect();
        assert_eq!(helper.statement_names(), expected);
    }
}

#[test]
fn test_siblings_write_into_their_own_namespace() {
    let helper = Helper::new(HelperOptions::new("/project")).unwrap();
    register(&helper, &["resolve", "devServer"]);

    let resolve = helper.statement_as::<Named>("resolve").unwrap();
    resolve.set("extensions", json!([".js"])).unwrap();
    resolve
        .sibling_as::<Named>("devServer")
        .unwrap()
        .set("port", 8080)
        .unwrap();
    resolve
        .sibling("output")
        .unwrap()
        .set_at(&ConfPath::parse("publicPath"), json!("/"), &WriteOptions::replace())
        .unwrap();

    assert_eq!(
        helper.snapshot(),
        json!({
            "resolve": {"extensions": [".js"]},
            "devServer": {"port": 8080},
            "output": {"publicPath": "/"}
        })
    );
    // anchored at the root, so the whole tree
    assert_eq!(resolve.conf().unwrap(), helper.snapshot());
}

#[test]
fn test_duplicate_and_foreign_statements_are_rejected() {
    let helper = Helper::new(HelperOptions::new("/project")).unwrap();
    let other = Helper::new(HelperOptions::new("/elsewhere")).unwrap();

    let err = helper
        .add_statement("entry", |top| Named { top, name: "entry" })
        .unwrap_err();
    assert!(matches!(err, HelperError::DuplicateRegistration(name) if name == "entry"));

    let foreign: Arc<dyn Statement> = Arc::new(Named {
        top: other.handle(),
        name: "stats",
    });
    let err = helper.add_statement_instance("stats", foreign).unwrap_err();
    assert!(matches!(err, HelperError::InvalidStatement(_)));
    assert!(helper.statement("stats").is_none());

    let own: Arc<dyn Statement> = Arc::new(Named {
        top: helper.handle(),
        name: "stats",
    });
    helper.add_statement_instance("stats", own).unwrap();
    assert!(helper.statement("stats").is_some());
}

#[test]
fn test_statement_outliving_its_helper() {
    let helper = Helper::new(HelperOptions::new("/project")).unwrap();
    let named = helper
        .add_statement("late", |top| Named { top, name: "late" })
        .unwrap();
    drop(helper);

    assert!(matches!(named.top(), Err(HelperError::Configuration(_))));
    assert!(named.set("a", 1).is_err());
    assert!(named.sibling("entry").is_err());
}

#[test]
fn test_wrong_type_lookup() {
    let helper = Helper::new(HelperOptions::new("/project")).unwrap();
    let err = helper.statement_as::<Named>("output").unwrap_err();
    assert!(matches!(err, HelperError::Configuration(_)));
    assert!(helper.statement_as::<Named>("missing").is_err());
}
