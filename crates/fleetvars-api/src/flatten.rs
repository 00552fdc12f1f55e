// Nested JSON → flat dotted-key map.

use serde_json::{Map, Value};

/// Recursively flatten nested JSON objects into dotted keys.
///
/// `{"organization": {"__id": 3}}` becomes `{"organization.__id": 3}`.
/// Only objects are descended into; arrays and scalars are kept as-is
/// under their key.
pub fn flatten_json(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(&mut out, None, map);
    out
}

fn flatten_into(out: &mut Map<String, Value>, prefix: Option<&str>, map: &Map<String, Value>) {
    for (key, value) in map {
        let path = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(child) => flatten_into(out, Some(&path), child),
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}
