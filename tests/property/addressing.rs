//! Property-based tests for tree addressing

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use webpack_helper::addressing::{read, write, ReadOptions, WriteOptions};
use webpack_helper::{ConfPath, PathError};

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,5}"
}

fn segments(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), min..=max)
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-zA-Z ./]{0,12}".prop_map(Value::from),
    ]
}

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        scalar(),
        prop::collection::vec(scalar(), 0..4).prop_map(Value::from),
        (segment(), scalar()).prop_map(|(k, v)| json!({ k: v })),
    ]
}

fn empty_tree() -> Value {
    Value::Object(Map::new())
}

/// Writing then reading the same path gives back the written value
#[test]
fn test_write_read_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(segments(1, 5), leaf_value(), any::<bool>()),
            |(segs, value, merge)| {
                let path = ConfPath::from_segments(segs);
                let options = if merge {
                    WriteOptions::merge()
                } else {
                    WriteOptions::replace()
                };
                let mut tree = empty_tree();
                write(&mut tree, &path, value.clone(), &options).unwrap();

                let back = read(&tree, &path, &ReadOptions::default()).unwrap();
                prop_assert_eq!(back, Some(value));
                Ok(())
            },
        )
        .unwrap();
}

/// Dotted and pre-split forms address the same location
#[test]
fn test_dotted_and_split_paths_agree() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(segments(0, 5), scalar()), |(segs, value)| {
            let split = ConfPath::from_segments(segs.clone());
            let dotted = ConfPath::parse(&segs.join("."));
            prop_assert_eq!(&split, &dotted);
            prop_assert_eq!(dotted.to_string(), segs.join("."));

            if !segs.is_empty() {
                let mut a = empty_tree();
                let mut b = empty_tree();
                write(&mut a, &split, value.clone(), &WriteOptions::merge()).unwrap();
                write(&mut b, &dotted, value, &WriteOptions::merge()).unwrap();
                prop_assert_eq!(a, b);
            }
            Ok(())
        })
        .unwrap();
}

/// Writes to two different leaves under a shared prefix keep both
#[test]
fn test_sibling_leaves_survive() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(segments(0, 3), segment(), segment(), scalar(), scalar()),
            |(prefix, a, b, va, vb)| {
                prop_assume!(a != b);
                let base = ConfPath::from_segments(prefix);
                let pa = base.child(a);
                let pb = base.child(b);

                let mut tree = empty_tree();
                write(&mut tree, &pa, va.clone(), &WriteOptions::merge()).unwrap();
                write(&mut tree, &pb, vb.clone(), &WriteOptions::merge()).unwrap();

                prop_assert_eq!(read(&tree, &pa, &ReadOptions::default()).unwrap(), Some(va));
                prop_assert_eq!(read(&tree, &pb, &ReadOptions::default()).unwrap(), Some(vb));
                Ok(())
            },
        )
        .unwrap();
}

/// A scalar in the way fails the write and leaves the tree unchanged
#[test]
fn test_scalar_intermediate_conflicts() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(segments(1, 3), segments(1, 3), scalar(), leaf_value(), any::<bool>()),
            |(prefix, rest, blocker, value, merge)| {
                let base = ConfPath::from_segments(prefix);
                let deeper = base.join(&ConfPath::from_segments(rest));
                let options = if merge {
                    WriteOptions::merge()
                } else {
                    WriteOptions::replace()
                };

                let mut tree = empty_tree();
                write(&mut tree, &base, blocker, &WriteOptions::replace()).unwrap();
                let before = tree.clone();

                let err = write(&mut tree, &deeper, value, &options).unwrap_err();
                let is_conflict = matches!(err, PathError::TypeConflict { .. });
                prop_assert!(is_conflict);
                prop_assert_eq!(tree, before);
                Ok(())
            },
        )
        .unwrap();
}
