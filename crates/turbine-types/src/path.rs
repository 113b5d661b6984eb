//! Dotted field paths over JSON values (`"address.city"`, `"items.0.sku"`).

use serde_json::{Map, Value};

/// JSON kind of `value` as it appears in type-mismatch errors.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A path addresses something only if every segment is non-empty.
pub(crate) fn is_valid(path: &str) -> bool {
    path.split('.').all(|segment| !segment.is_empty())
}

pub(crate) fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if !is_valid(path) {
        return None;
    }
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `value` at `path`, creating missing intermediate objects.
///
/// A `null` node on the way is replaced by an object. On failure returns the
/// kind of the node that could not be descended into.
pub(crate) fn assign(root: &mut Value, path: &str, value: Value) -> Result<(), &'static str> {
    if !is_valid(path) {
        return Err("empty path");
    }
    let mut segments = path.split('.').peekable();
    let mut node = root;
    while let Some(segment) = segments.next() {
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
        let last = segments.peek().is_none();
        let kind = kind_name(node);
        node = match node {
            Value::Object(map) => {
                if last {
                    map.insert(segment.to_string(), value);
                    return Ok(());
                }
                map.entry(segment.to_string()).or_insert(Value::Null)
            }
            Value::Array(items) => {
                let Some(slot) = segment.parse::<usize>().ok().and_then(|i| items.get_mut(i))
                else {
                    return Err(kind);
                };
                if last {
                    *slot = value;
                    return Ok(());
                }
                slot
            }
            _ => return Err(kind),
        };
    }
    Err("empty path")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_nested_members_and_indices() {
        let v = json!({"a": {"b": [10, {"c": true}]}});
        assert_eq!(lookup(&v, "a.b.0"), Some(&json!(10)));
        assert_eq!(lookup(&v, "a.b.1.c"), Some(&json!(true)));
        assert_eq!(lookup(&v, "a.x"), None);
        assert_eq!(lookup(&v, "a.b.9"), None);
        assert_eq!(lookup(&v, ""), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(kind_name(&json!(null)), "null");
        assert_eq!(kind_name(&json!(1.5)), "number");
        assert_eq!(kind_name(&json!({"a": 1})), "object");
    }

    #[test]
    fn empty_segments_address_nothing() {
        let mut v = json!({"": 1, "a": {"": 2}});
        for path in ["", "a.", ".a", "a..b"] {
            assert!(!is_valid(path), "{path}");
            assert_eq!(lookup(&v, path), None, "{path}");
            assert_eq!(assign(&mut v, path, json!("x")), Err("empty path"), "{path}");
        }
        assert_eq!(v, json!({"": 1, "a": {"": 2}}));
    }

    #[test]
    fn assign_creates_intermediate_objects() {
        let mut v = json!({});
        assign(&mut v, "address.city", json!("Lisbon")).unwrap();
        assert_eq!(v, json!({"address": {"city": "Lisbon"}}));
    }

    #[test]
    fn assign_turns_null_root_into_object() {
        let mut v = Value::Null;
        assign(&mut v, "id", json!(1)).unwrap();
        assert_eq!(v, json!({"id": 1}));
    }

    #[test]
    fn assign_replaces_array_slot() {
        let mut v = json!({"tags": ["a", "b"]});
        assign(&mut v, "tags.1", json!("z")).unwrap();
        assert_eq!(v, json!({"tags": ["a", "z"]}));
        assert_eq!(assign(&mut v, "tags.5", json!("q")), Err("array"));
    }

    #[test]
    fn assign_into_scalar_reports_kind() {
        let mut v = json!({"name": "ada"});
        assert_eq!(assign(&mut v, "name.first", json!("A")), Err("string"));
        let mut scalar = json!(3);
        assert_eq!(assign(&mut scalar, "x", json!(1)), Err("number"));
    }
}
