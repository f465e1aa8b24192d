//! Reference discovery inside data documents
//!
//! Walks a document and collects the objects that point elsewhere: `$ref`
//! objects pointing at other bundle documents, and resource descriptors
//! (`provider: resource` with a `path`) pointing at external files. A
//! matched object is recorded and not descended into.

use serde_json::{Map, Value};

/// An object found at `pointer` inside a document
#[derive(Debug, Clone, PartialEq)]
pub struct Located<'a> {
    /// `/`-delimited path of object keys and array indices from the root
    pub pointer: String,
    pub object: &'a Map<String, Value>,
}

/// Collect every object carrying a `$ref` key, in traversal order
pub fn find_refs(document: &Value) -> Vec<Located<'_>> {
    let mut found = Vec::new();
    walk(document, String::new(), &is_ref, &mut found);
    found
}

/// Collect every `{"provider": "resource", "path": ...}` descriptor
pub fn find_resource_paths(document: &Value) -> Vec<Located<'_>> {
    let mut found = Vec::new();
    walk(document, String::new(), &is_resource, &mut found);
    found
}

fn is_ref(object: &Map<String, Value>) -> bool {
    object.contains_key("$ref")
}

fn is_resource(object: &Map<String, Value>) -> bool {
    object.get("provider").and_then(Value::as_str) == Some("resource")
        && object.contains_key("path")
}

fn walk<'a>(
    value: &'a Value,
    pointer: String,
    matches: &dyn Fn(&Map<String, Value>) -> bool,
    found: &mut Vec<Located<'a>>,
) {
    match value {
        Value::Object(object) if matches(object) => {
            found.push(Located { pointer, object });
        }
        Value::Object(object) => {
            for (key, child) in object {
                walk(child, format!("{}/{}", pointer, key), matches, found);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, format!("{}/{}", pointer, index), matches, found);
            }
        }
        _ => {}
    }
}
