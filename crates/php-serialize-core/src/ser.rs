//! Serialize any `serde::Serialize` type in PHP serialize format.
//!
//! Enable the `serde` feature to use this module. Rust values map onto PHP
//! values as follows:
//!
//! | Rust | PHP |
//! |------|-----|
//! | `()`, `None`, unit structs | `N;` |
//! | `bool` | `b:` |
//! | integers that fit in `i64` | `i:` |
//! | `f32`, `f64` | `d:` |
//! | `char`, `str`, byte slices | `s:` |
//! | sequences, tuples | array keyed `0..n-1` |
//! | maps | array; keys must serialize to an integer, string or bool |
//! | structs | `O:` with the struct name as class name |
//! | enum variants | variant name, or a one-entry array keyed by it |
//!
//! Anything else fails with [`EncodeError::UnsupportedType`].

use std::fmt;
use std::io::Write;

use serde::ser::{self, Serialize};

use crate::encoder::{encode, to_bytes};
use crate::error::EncodeError;
use crate::types::PhpValue;

type Result<T> = std::result::Result<T, EncodeError>;

impl ser::Error for EncodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        EncodeError::Custom(msg.to_string())
    }
}

/// Convert a serializable value into a [`PhpValue`].
///
/// ```rust
/// use php_serialize_core::{ser::to_value, PhpValue};
///
/// let value = to_value(&vec![Some("a"), None]).unwrap();
/// assert_eq!(value, PhpValue::list(vec![PhpValue::from("a"), PhpValue::Null]));
/// ```
pub fn to_value<T: ?Sized + Serialize>(value: &T) -> Result<PhpValue> {
    value.serialize(Serializer)
}

/// Serialize a value to PHP serialize bytes.
pub fn to_vec<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    to_bytes(&to_value(value)?)
}

/// Serialize a value into a writer.
pub fn to_writer<W: Write, T: ?Sized + Serialize>(writer: W, value: &T) -> Result<()> {
    encode(&to_value(value)?, writer)
}

/// A serde serializer producing [`PhpValue`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Serializer;

fn out_of_range(type_name: &str, v: impl fmt::Display) -> EncodeError {
    EncodeError::unsupported(type_name).with_context(format!("{} does not fit in a PHP integer", v))
}

/// Map keys follow PHP's offset rules: integers and strings as-is, booleans
/// as `0`/`1`.
fn map_key(key: PhpValue) -> Result<PhpValue> {
    match key {
        PhpValue::Int(_) | PhpValue::String(_) => Ok(key),
        PhpValue::Bool(b) => Ok(PhpValue::Int(i64::from(b))),
        other => Err(EncodeError::unsupported(other.type_name()).with_context("map key")),
    }
}

fn tagged(variant: &'static str, value: PhpValue) -> PhpValue {
    PhpValue::Array(vec![(PhpValue::from(variant), value)])
}

impl ser::Serializer for Serializer {
    type Ok = PhpValue;
    type Error = EncodeError;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<PhpValue> {
        Ok(PhpValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<PhpValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<PhpValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<PhpValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<PhpValue> {
        Ok(PhpValue::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<PhpValue> {
        i64::try_from(v)
            .map(PhpValue::Int)
            .map_err(|_| out_of_range("i128", v))
    }

    fn serialize_u8(self, v: u8) -> Result<PhpValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<PhpValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<PhpValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<PhpValue> {
        i64::try_from(v)
            .map(PhpValue::Int)
            .map_err(|_| out_of_range("u64", v))
    }

    fn serialize_u128(self, v: u128) -> Result<PhpValue> {
        i64::try_from(v)
            .map(PhpValue::Int)
            .map_err(|_| out_of_range("u128", v))
    }

    fn serialize_f32(self, v: f32) -> Result<PhpValue> {
        Ok(PhpValue::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<PhpValue> {
        Ok(PhpValue::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<PhpValue> {
        Ok(PhpValue::String(v.to_string().into_bytes()))
    }

    fn serialize_str(self, v: &str) -> Result<PhpValue> {
        Ok(PhpValue::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<PhpValue> {
        Ok(PhpValue::from(v))
    }

    fn serialize_none(self) -> Result<PhpValue> {
        Ok(PhpValue::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<PhpValue> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<PhpValue> {
        Ok(PhpValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<PhpValue> {
        Ok(PhpValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<PhpValue> {
        Ok(PhpValue::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<PhpValue> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<PhpValue> {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeStruct> {
        Ok(SerializeStruct {
            class_name: name,
            properties: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            fields: Vec::with_capacity(len),
        })
    }
}

#[doc(hidden)]
pub struct SerializeVec {
    items: Vec<PhpValue>,
}

#[doc(hidden)]
pub struct SerializeTupleVariant {
    variant: &'static str,
    items: Vec<PhpValue>,
}

#[doc(hidden)]
pub struct SerializeMap {
    entries: Vec<(PhpValue, PhpValue)>,
    next_key: Option<PhpValue>,
}

#[doc(hidden)]
pub struct SerializeStruct {
    class_name: &'static str,
    properties: Vec<(PhpValue, PhpValue)>,
}

#[doc(hidden)]
pub struct SerializeStructVariant {
    variant: &'static str,
    fields: Vec<(PhpValue, PhpValue)>,
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = PhpValue;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<PhpValue> {
        Ok(PhpValue::list(self.items))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = PhpValue;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<PhpValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = PhpValue;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<PhpValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = PhpValue;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn end(self) -> Result<PhpValue> {
        Ok(tagged(self.variant, PhpValue::list(self.items)))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = PhpValue;
    type Error = EncodeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.next_key = Some(map_key(key.serialize(Serializer)?)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| EncodeError::Custom("map value serialized before its key".into()))?;
        self.entries.push((key, value.serialize(Serializer)?));
        Ok(())
    }

    fn end(self) -> Result<PhpValue> {
        Ok(PhpValue::Array(self.entries))
    }
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = PhpValue;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.properties
            .push((PhpValue::from(key), value.serialize(Serializer)?));
        Ok(())
    }

    fn end(self) -> Result<PhpValue> {
        Ok(PhpValue::Object {
            class_name: self.class_name.to_owned(),
            properties: self.properties,
        })
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = PhpValue;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.fields.push((PhpValue::from(key), value.serialize(Serializer)?));
        Ok(())
    }

    fn end(self) -> Result<PhpValue> {
        Ok(tagged(self.variant, PhpValue::Array(self.fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use serde::Serialize;

    use crate::decoder::from_bytes;

    #[derive(Serialize)]
    struct User {
        name: String,
        age: u32,
        tags: Vec<&'static str>,
    }

    #[derive(Serialize)]
    enum Event {
        Ping,
        Move(i32, i32),
        Rename { to: String },
    }

    #[test]
    fn test_struct_becomes_object() {
        let user = User {
            name: "Alice".into(),
            age: 30,
            tags: vec!["admin"],
        };
        let bytes = to_vec(&user).unwrap();
        assert_eq!(
            bytes,
            br#"O:4:"User":3:{s:4:"name";s:5:"Alice";s:3:"age";i:30;s:4:"tags";a:1:{i:0;s:5:"admin";}}"#
        );

        let decoded = from_bytes(&bytes).unwrap();
        assert_eq!(decoded.class_name(), Some("User"));
        assert_eq!(decoded.get("age"), Some(&PhpValue::Int(30)));
    }

    #[test]
    fn test_enum_variants() {
        assert_eq!(to_value(&Event::Ping).unwrap(), PhpValue::from("Ping"));
        assert_eq!(
            to_vec(&Event::Move(1, -2)).unwrap(),
            br#"a:1:{s:4:"Move";a:2:{i:0;i:1;i:1;i:-2;}}"#
        );
        assert_eq!(
            to_value(&Event::Rename { to: "x".into() }).unwrap(),
            PhpValue::map(vec![("Rename", PhpValue::map(vec![("to", "x")]))])
        );
    }

    #[test]
    fn test_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(2, "two");
        map.insert(1, "one");
        assert_eq!(to_vec(&map).unwrap(), br#"a:2:{i:1;s:3:"one";i:2;s:3:"two";}"#);

        let mut flags = BTreeMap::new();
        flags.insert(true, 1);
        assert_eq!(to_vec(&flags).unwrap(), b"a:1:{i:1;i:1;}");
    }

    #[test]
    fn test_unsupported_map_key() {
        let mut map = BTreeMap::new();
        map.insert((1, 2), "pair");
        let err = to_value(&map).unwrap_err();
        assert_eq!(err.to_string(), "unsupported type: array (map key)");
    }

    #[test]
    fn test_integer_out_of_range() {
        assert_eq!(to_value(&u64::from(u32::MAX)).unwrap(), PhpValue::Int(4_294_967_295));
        let err = to_value(&u64::MAX).unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedType { ref type_name, .. } if type_name == "u64"));
    }

    #[test]
    fn test_options_and_units() {
        assert_eq!(to_vec(&None::<i32>).unwrap(), b"N;");
        assert_eq!(to_vec(&Some(1.5)).unwrap(), b"d:1.5;");
        assert_eq!(to_vec(&()).unwrap(), b"N;");
        assert_eq!(to_vec(&'é').unwrap(), "s:2:\"é\";".as_bytes());
    }

    #[test]
    fn test_to_writer_appends() {
        let mut out = Vec::new();
        to_writer(&mut out, &1).unwrap();
        to_writer(&mut out, &"a").unwrap();
        assert_eq!(out, b"i:1;s:1:\"a\";");
    }
}
