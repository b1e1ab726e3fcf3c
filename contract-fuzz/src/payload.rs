// contract-fuzz/src/payload.rs
//! Helpers for reading and rewriting fields of a JSON payload.
//!
//! Field names are paths whose object keys are joined with `#`
//! (`address#city`). Arrays are transparent: reads look at the first
//! element, writes touch every element. All writers return a new value and
//! leave their input untouched.

use serde_json::{Map, Value};

use crate::constants::FIELD_SEPARATOR;

/// True for payloads with nothing to mutate
pub fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Read the value at `field`, if present
pub fn get_field<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    field
        .split(FIELD_SEPARATOR)
        .try_fold(payload, |current, segment| descend(current, segment))
}

/// Whether `field` resolves to a value in the payload
pub fn is_field_set(payload: &Value, field: &str) -> bool {
    get_field(payload, field).is_some()
}

fn descend<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => items.first().and_then(|first| descend(first, key)),
        _ => None,
    }
}

/// Text form of a value: strings as-is, null as empty, everything else as JSON
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Return a copy of `payload` where the value at `field` is replaced by `f(old)`.
/// Unknown fields leave the copy unchanged.
pub fn map_field(payload: &Value, field: &str, f: &dyn Fn(&Value) -> Value) -> Value {
    let mut copy = payload.clone();
    let segments: Vec<&str> = field.split(FIELD_SEPARATOR).collect();
    map_in_place(&mut copy, &segments, f);
    copy
}

/// Return a copy of `payload` where the value at `field` is `new_value`
pub fn replace_field(payload: &Value, field: &str, new_value: Value) -> Value {
    map_field(payload, field, &|_| new_value.clone())
}

fn map_in_place(value: &mut Value, segments: &[&str], f: &dyn Fn(&Value) -> Value) {
    let Some((head, rest)) = segments.split_first() else {
        let new_value = f(&*value);
        *value = new_value;
        return;
    };

    match value {
        Value::Object(map) => {
            if let Some(child) = map.get_mut(*head) {
                map_in_place(child, rest, f);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                map_in_place(item, segments, f);
            }
        }
        _ => {}
    }
}

/// Return a copy of `payload` without `field`
pub fn remove_field(payload: &Value, field: &str) -> Value {
    let mut copy = payload.clone();
    let segments: Vec<&str> = field.split(FIELD_SEPARATOR).collect();
    if let Some((last, parents)) = segments.split_last() {
        with_parent_objects(&mut copy, parents, &mut |map: &mut Map<String, Value>| {
            map.remove(*last);
        });
    }
    copy
}

/// Return a copy of `payload` with `key: value` added next to `field`
pub fn insert_next_to(payload: &Value, field: &str, key: &str, value: Value) -> Value {
    let mut copy = payload.clone();
    let segments: Vec<&str> = field.split(FIELD_SEPARATOR).collect();
    if let Some((_, parents)) = segments.split_last() {
        with_parent_objects(&mut copy, parents, &mut |map: &mut Map<String, Value>| {
            map.insert(key.to_string(), value.clone());
        });
    }
    copy
}

fn with_parent_objects(value: &mut Value, parents: &[&str], f: &mut dyn FnMut(&mut Map<String, Value>)) {
    match value {
        Value::Array(items) => {
            for item in items.iter_mut() {
                with_parent_objects(item, parents, f);
            }
        }
        Value::Object(map) => match parents.split_first() {
            None => f(map),
            Some((head, rest)) => {
                if let Some(child) = map.get_mut(*head) {
                    with_parent_objects(child, rest, f);
                }
            }
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_empty_payload() {
        assert!(is_empty_payload(&Value::Null));
        assert!(is_empty_payload(&json!({})));
        assert!(is_empty_payload(&json!([])));
        assert!(is_empty_payload(&json!("  ")));
        assert!(!is_empty_payload(&json!({"a": 1})));
    }

    #[test]
    fn test_get_nested_and_array_fields() {
        let payload = json!({
            "name": "ok",
            "address": {"city": "Cluj"},
            "items": [{"sku": "A1"}, {"sku": "B2"}]
        });

        assert_eq!(get_field(&payload, "name"), Some(&json!("ok")));
        assert_eq!(get_field(&payload, "address#city"), Some(&json!("Cluj")));
        assert_eq!(get_field(&payload, "items#sku"), Some(&json!("A1")));
        assert!(!is_field_set(&payload, "address#zip"));
    }

    #[test]
    fn test_replace_field_returns_new_payload() {
        let payload = json!({"name": "ok", "items": [{"sku": "A1"}, {"sku": "B2"}]});

        let replaced = replace_field(&payload, "items#sku", json!("X"));
        assert_eq!(replaced, json!({"name": "ok", "items": [{"sku": "X"}, {"sku": "X"}]}));
        assert_eq!(payload["items"][0]["sku"], json!("A1"));

        let unknown = replace_field(&payload, "missing", json!("X"));
        assert_eq!(unknown, payload);
    }

    #[test]
    fn test_map_field_sees_old_value() {
        let payload = json!({"name": "ok"});
        let mapped = map_field(&payload, "name", &|old| json!(format!("{}!", value_to_text(old))));
        assert_eq!(mapped, json!({"name": "ok!"}));
    }

    #[test]
    fn test_remove_and_insert_next_to() {
        let payload = json!({"user": {"name": "ok", "age": 3}});

        assert_eq!(remove_field(&payload, "user#age"), json!({"user": {"name": "ok"}}));
        assert_eq!(
            insert_next_to(&payload, "user#name", "extra", json!(1)),
            json!({"user": {"name": "ok", "age": 3, "extra": 1}})
        );
        assert_eq!(
            insert_next_to(&json!({"a": 1}), "a", "b", json!(2)),
            json!({"a": 1, "b": 2})
        );
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!("x")), "x");
        assert_eq!(value_to_text(&json!(12)), "12");
        assert_eq!(value_to_text(&Value::Null), "");
    }
}
