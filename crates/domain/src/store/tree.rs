//! Path operations on a JSON document tree.
//!
//! Objects are interior nodes, anything else is a leaf. Setting a path
//! creates missing parents; setting `null` removes the path and any
//! parents it leaves empty.

use serde_json::{Map, Value};

/// Returns the node at `path`, if any.
pub fn get_at<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.split('/') {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

/// Stores `value` at `path`, replacing anything there.
pub fn set_at(root: &mut Value, path: &str, value: Value) {
    if value.is_null() {
        remove_at(root, path);
        return;
    }

    let mut segments: Vec<&str> = path.split('/').collect();
    let Some(last) = segments.pop() else {
        return;
    };

    let mut node = root;
    for segment in segments {
        node = ensure_object(node)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node).insert(last.to_string(), value);
}

/// Removes `path` and returns what was stored there. Parents left without
/// children are removed too, matching a store that only keeps leaves.
pub fn remove_at(root: &mut Value, path: &str) -> Option<Value> {
    let segments: Vec<&str> = path.split('/').collect();
    remove_segments(root, &segments)
}

fn remove_segments(node: &mut Value, segments: &[&str]) -> Option<Value> {
    let (first, rest) = segments.split_first()?;
    let map = node.as_object_mut()?;
    if rest.is_empty() {
        return map.remove(*first);
    }

    let child = map.get_mut(*first)?;
    let removed = remove_segments(child, rest)?;
    if child.as_object().is_some_and(|m| m.is_empty()) {
        map.remove(*first);
    }
    Some(removed)
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}
