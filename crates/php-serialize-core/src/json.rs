//! JSON conversion for PHP values.
//!
//! This module provides conversion from `PhpValue` to JSON using serde_json.
//! Enable the `serde` feature to use this module.

use bstr::ByteSlice;
use serde_json::{json, Map, Value as JsonValue};

use crate::types::{PhpValue, Visibility};

/// Convert a PHP value to a JSON value.
///
/// # Mapping Rules
///
/// | PHP Type | JSON Type |
/// |----------|-----------|
/// | `null` | `null` |
/// | `bool` | `boolean` |
/// | `int` | `number` |
/// | `float` | `number` (`null` for NaN, `"Infinity"`/`"-Infinity"` for infinities) |
/// | `string` | `string` (lossy UTF-8 conversion) |
/// | `array` (keys `0..n-1`) | `array` |
/// | `array` (other keys) | `object` |
/// | `object` | `object` with `__class__` field |
///
/// Object property names are demangled: protected properties become
/// `*name` and private ones `Class::name`.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes, to_json};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = from_bytes(data).unwrap();
/// let json = to_json(&php_value);
/// assert_eq!(json, serde_json::json!({"name": "Alice", "age": 30}));
/// ```
pub fn to_json(value: &PhpValue) -> JsonValue {
    match value {
        PhpValue::Null => JsonValue::Null,
        PhpValue::Bool(b) => JsonValue::Bool(*b),
        PhpValue::Int(i) => json!(*i),
        PhpValue::Float(f) => {
            if f.is_nan() {
                JsonValue::Null
            } else if f.is_infinite() {
                if f.is_sign_positive() {
                    json!("Infinity")
                } else {
                    json!("-Infinity")
                }
            } else {
                json!(*f)
            }
        }
        PhpValue::String(s) => JsonValue::String(s.to_str_lossy().into_owned()),
        PhpValue::Array(items) => {
            let is_indexed = items.iter().enumerate().all(|(i, (k, _))| {
                matches!(k, PhpValue::Int(idx) if *idx == i as i64)
            });

            if is_indexed {
                JsonValue::Array(items.iter().map(|(_, v)| to_json(v)).collect())
            } else {
                let mut map = Map::new();
                for (k, v) in items {
                    map.insert(json_key(k), to_json(v));
                }
                JsonValue::Object(map)
            }
        }
        PhpValue::Object { class_name, .. } => {
            let mut map = Map::new();
            map.insert("__class__".to_string(), json!(class_name));

            for prop in value.properties() {
                let key = match prop.visibility {
                    Visibility::Private => match prop.declaring_class {
                        Some(ref class) => format!("{}::{}", class, prop.name),
                        None => prop.name.into_owned(),
                    },
                    Visibility::Protected => format!("*{}", prop.name),
                    Visibility::Public => prop.name.into_owned(),
                };
                map.insert(key, to_json(prop.value));
            }

            JsonValue::Object(map)
        }
    }
}

fn json_key(key: &PhpValue) -> String {
    match key {
        PhpValue::String(s) => s.to_str_lossy().into_owned(),
        other => other.to_string(),
    }
}

/// Convert a PHP value to a JSON string.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes, json::to_json_string};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = from_bytes(data).unwrap();
/// let json_str = to_json_string(&php_value).unwrap();
/// assert!(json_str.contains(r#""name":"Alice""#));
/// assert!(json_str.contains(r#""age":30"#));
/// ```
pub fn to_json_string(value: &PhpValue) -> serde_json::Result<String> {
    serde_json::to_string(&to_json(value))
}

/// Convert a PHP value to a pretty-printed JSON string.
pub fn to_json_string_pretty(value: &PhpValue) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&to_json(value))
}

#[cfg(test)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;
    use crate::from_bytes;

    #[test]
    fn test_simple_types() {
        assert_eq!(to_json(&PhpValue::Null), JsonValue::Null);
        assert_eq!(to_json(&PhpValue::Bool(true)), JsonValue::Bool(true));
        assert_eq!(to_json(&PhpValue::Int(42)), json!(42));
        assert_eq!(to_json(&PhpValue::Float(3.14)), json!(3.14));
        assert_eq!(to_json(&PhpValue::Float(f64::NAN)), JsonValue::Null);
    }

    #[test]
    fn test_indexed_array() {
        let value = from_bytes(b"a:2:{i:0;s:3:\"foo\";i:1;s:3:\"bar\";}").unwrap();
        assert_eq!(to_json(&value), json!(["foo", "bar"]));
    }

    #[test]
    fn test_mixed_array() {
        // Non-sequential keys -> object
        let value = from_bytes(b"a:2:{i:0;s:3:\"foo\";i:5;s:3:\"bar\";}").unwrap();
        assert_eq!(to_json(&value), json!({"0": "foo", "5": "bar"}));
    }

    #[test]
    fn test_nested() {
        let data = b"a:1:{s:4:\"user\";a:2:{s:4:\"name\";s:5:\"Alice\";s:3:\"age\";i:30;}}";
        let value = from_bytes(data).unwrap();
        assert_eq!(to_json(&value), json!({"user": {"name": "Alice", "age": 30}}));
    }

    #[test]
    fn test_object_visibility() {
        let data = b"O:4:\"Test\":3:{s:3:\"pub\";i:1;s:10:\"\x00Test\x00priv\";i:2;s:7:\"\x00*\x00prot\";i:3;}";
        let value = from_bytes(data).unwrap();
        assert_eq!(
            to_json(&value),
            json!({"__class__": "Test", "pub": 1, "Test::priv": 2, "*prot": 3})
        );
    }
}
