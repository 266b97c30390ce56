//! Field-level structural comparison of JSON documents.
//!
//! [`compare`] walks expected and actual values in lockstep and collects a
//! [`FieldDiff`] for every location where they disagree. An empty diff list
//! means the documents match. The comparator never fails on parsed input;
//! callers are responsible for reporting unparseable documents before
//! comparison.

use crate::types::FieldDiff;
use serde_json::Value;

/// Deep-compare two JSON values, returning all field-level differences.
///
/// Paths are dot-separated object keys with bracketed array indices
/// (`items[2].name`); a difference at the document root uses `(root)`.
pub fn compare(expected: &Value, actual: &Value) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();
    compare_values("", expected, actual, &mut diffs);
    diffs
}

fn compare_values(path: &str, expected: &Value, actual: &Value, diffs: &mut Vec<FieldDiff>) {
    match (expected, actual) {
        (Value::Null, Value::Null) => {}
        // A null opposite a concrete value reads as an absent side.
        (Value::Null, _) => push_diff(diffs, path, None, Some(actual.clone())),
        (_, Value::Null) => push_diff(diffs, path, Some(expected.clone()), None),

        (Value::Object(exp), Value::Object(act)) => {
            // Every expected key: recurse when present, one-sided diff when
            // missing from actual.
            for (key, expected_val) in exp {
                let child = join_path(path, key);
                match act.get(key) {
                    Some(actual_val) => compare_values(&child, expected_val, actual_val, diffs),
                    None => push_diff(diffs, &child, Some(expected_val.clone()), None),
                }
            }
            // Keys only present in actual.
            for (key, actual_val) in act {
                if !exp.contains_key(key) {
                    let child = join_path(path, key);
                    push_diff(diffs, &child, None, Some(actual_val.clone()));
                }
            }
        }

        (Value::Array(exp), Value::Array(act)) => {
            for i in 0..exp.len().max(act.len()) {
                let child = format!("{path}[{i}]");
                match (exp.get(i), act.get(i)) {
                    (Some(e), Some(a)) => compare_values(&child, e, a, diffs),
                    (Some(e), None) => push_diff(diffs, &child, Some(e.clone()), None),
                    (None, Some(a)) => push_diff(diffs, &child, None, Some(a.clone())),
                    (None, None) => unreachable!("index bounded by max length"),
                }
            }
        }

        (Value::Bool(e), Value::Bool(a)) => {
            if e != a {
                push_both(diffs, path, expected, actual);
            }
        }
        (Value::String(e), Value::String(a)) => {
            if e != a {
                push_both(diffs, path, expected, actual);
            }
        }
        // Numbers compare by decoded numeric value, so 1 and 1.0 are equal.
        (Value::Number(e), Value::Number(a)) => {
            if e.as_f64() != a.as_f64() {
                push_both(diffs, path, expected, actual);
            }
        }

        // Kind mismatch: one diff at this path, no recursion.
        _ => push_both(diffs, path, expected, actual),
    }
}

fn push_both(diffs: &mut Vec<FieldDiff>, path: &str, expected: &Value, actual: &Value) {
    push_diff(diffs, path, Some(expected.clone()), Some(actual.clone()));
}

fn push_diff(
    diffs: &mut Vec<FieldDiff>,
    path: &str,
    expected: Option<Value>,
    actual: Option<Value>,
) {
    diffs.push(FieldDiff {
        path: path_or_root(path),
        expected,
        actual,
    });
}

fn join_path(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

fn path_or_root(path: &str) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}
