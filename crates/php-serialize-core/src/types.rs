//! PHP value types.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use bstr::ByteSlice;
use memchr::memchr;

/// A value that can be written to or read from PHP's serialize format.
///
/// Arrays and objects keep their entries as an ordered list of key/value
/// pairs, so insertion order and key types survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PhpValue {
    /// PHP null value.
    #[default]
    Null,

    /// PHP boolean value.
    Bool(bool),

    /// PHP integer value.
    Int(i64),

    /// PHP float/double value.
    Float(f64),

    /// PHP string value. PHP strings are byte strings and may hold any byte,
    /// including NUL and invalid UTF-8.
    String(Vec<u8>),

    /// PHP array value (ordered map).
    /// Keys are `Int` or `String`; other key shapes are normalised on encode.
    Array(Vec<(PhpValue, PhpValue)>),

    /// PHP object value.
    Object {
        /// The class name of the object.
        class_name: String,
        /// Property names and values, in declaration order. Names are kept
        /// exactly as serialized, visibility mangling included.
        properties: Vec<(PhpValue, PhpValue)>,
    },
}

/// A view over one object property with its visibility decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct PhpProperty<'a> {
    /// Property name without the visibility prefix.
    pub name: Cow<'a, str>,
    /// Property visibility.
    pub visibility: Visibility,
    /// For private properties, the class that declared it.
    pub declaring_class: Option<Cow<'a, str>>,
    /// Property value.
    pub value: &'a PhpValue,
}

/// PHP property visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Public property.
    Public,
    /// Protected property (prefixed with `\0*\0`).
    Protected,
    /// Private property (prefixed with `\0ClassName\0`).
    Private,
}

impl PhpValue {
    /// Build a string value from raw bytes or text.
    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        PhpValue::String(bytes.into())
    }

    /// Build an array from an ordered sequence, keyed `0..n-1`.
    ///
    /// ```rust
    /// use php_serialize_core::{to_bytes, PhpValue};
    ///
    /// let list = PhpValue::list(vec!["a", "b"]);
    /// assert_eq!(to_bytes(&list).unwrap(), br#"a:2:{i:0;s:1:"a";i:1;s:1:"b";}"#);
    /// ```
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PhpValue>,
    {
        PhpValue::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (PhpValue::Int(i as i64), v.into()))
                .collect(),
        )
    }

    /// Build an array from key/value pairs, preserving their order.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<PhpValue>,
        V: Into<PhpValue>,
    {
        PhpValue::Array(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an object from a class name and ordered fields.
    pub fn object<I, K, V>(class_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<PhpValue>,
        V: Into<PhpValue>,
    {
        PhpValue::Object {
            class_name: class_name.into(),
            properties: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Check if the value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, PhpValue::Null)
    }

    /// Check if the value is a boolean.
    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, PhpValue::Bool(_))
    }

    /// Check if the value is an integer.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, PhpValue::Int(_))
    }

    /// Check if the value is a float.
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, PhpValue::Float(_))
    }

    /// Check if the value is a string.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, PhpValue::String(_))
    }

    /// Check if the value is an array.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, PhpValue::Array(_))
    }

    /// Check if the value is an object.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, PhpValue::Object { .. })
    }

    /// Get the value as a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PhpValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as an integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PhpValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PhpValue::Float(f) => Some(*f),
            PhpValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PhpValue::String(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    /// Get the value as a UTF-8 string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhpValue::String(s) => std::str::from_utf8(s).ok(),
            _ => None,
        }
    }

    /// Get the entries of an array.
    #[inline]
    pub fn as_array(&self) -> Option<&[(PhpValue, PhpValue)]> {
        match self {
            PhpValue::Array(a) => Some(a.as_slice()),
            _ => None,
        }
    }

    /// Get the class name of an object.
    #[inline]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            PhpValue::Object { class_name, .. } => Some(class_name),
            _ => None,
        }
    }

    /// Look up an array entry or object property by string key.
    ///
    /// Object properties match on their demangled name.
    pub fn get(&self, key: &str) -> Option<&PhpValue> {
        match self {
            PhpValue::Array(items) => items
                .iter()
                .find(|(k, _)| k.as_bytes() == Some(key.as_bytes()))
                .map(|(_, v)| v),
            PhpValue::Object { .. } => self
                .properties()
                .find(|p| p.name == key)
                .map(|p| p.value),
            _ => None,
        }
    }

    /// Convert the array to a HashMap if all keys are strings or integers.
    pub fn as_string_map(&self) -> Option<HashMap<String, &PhpValue>> {
        let arr = self.as_array()?;
        let mut map = HashMap::with_capacity(arr.len());
        for (k, v) in arr {
            let key = match k {
                PhpValue::String(s) => s.to_str_lossy().into_owned(),
                PhpValue::Int(i) => i.to_string(),
                _ => return None,
            };
            map.insert(key, v);
        }
        Some(map)
    }

    /// Convert an array keyed exactly `0..n-1`, in order, into its values.
    ///
    /// Any other value is handed back unchanged as the error.
    ///
    /// ```rust
    /// use php_serialize_core::{from_bytes, PhpValue};
    ///
    /// let value = from_bytes(b"a:2:{i:0;i:1;i:1;i:2;}").unwrap();
    /// assert_eq!(value.into_list().unwrap(), vec![PhpValue::Int(1), PhpValue::Int(2)]);
    /// ```
    pub fn into_list(self) -> std::result::Result<Vec<PhpValue>, PhpValue> {
        match self {
            PhpValue::Array(items) => {
                let sequential = items
                    .iter()
                    .enumerate()
                    .all(|(i, (k, _))| matches!(k, PhpValue::Int(idx) if *idx == i as i64));
                if sequential {
                    Ok(items.into_iter().map(|(_, v)| v).collect())
                } else {
                    Err(PhpValue::Array(items))
                }
            }
            other => Err(other),
        }
    }

    /// Iterate over an object's properties with visibility decoded.
    ///
    /// Yields nothing for non-objects. Integer property names are rendered
    /// in decimal.
    pub fn properties(&self) -> impl Iterator<Item = PhpProperty<'_>> {
        let properties: &[(PhpValue, PhpValue)] = match self {
            PhpValue::Object { properties, .. } => properties.as_slice(),
            _ => &[],
        };
        properties.iter().map(|(name, value)| {
            let (name, visibility, declaring_class) = match name {
                PhpValue::String(bytes) => split_property_name(bytes),
                other => (Cow::Owned(other.to_string()), Visibility::Public, None),
            };
            PhpProperty {
                name,
                visibility,
                declaring_class,
                value,
            }
        })
    }

    /// Get a type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PhpValue::Null => "null",
            PhpValue::Bool(_) => "boolean",
            PhpValue::Int(_) => "integer",
            PhpValue::Float(_) => "float",
            PhpValue::String(_) => "string",
            PhpValue::Array(_) => "array",
            PhpValue::Object { .. } => "object",
        }
    }
}

/// Split a serialized property name into name, visibility and declaring class.
///
/// Private: `\0ClassName\0prop`, protected: `\0*\0prop`, anything else is public.
fn split_property_name(name: &[u8]) -> (Cow<'_, str>, Visibility, Option<Cow<'_, str>>) {
    if name.first() == Some(&0) {
        if let Some(second_null) = memchr(0, &name[1..]) {
            let prefix = &name[1..1 + second_null];
            let actual_name = name[2 + second_null..].to_str_lossy();

            if prefix == b"*" {
                return (actual_name, Visibility::Protected, None);
            }
            return (actual_name, Visibility::Private, Some(prefix.to_str_lossy()));
        }
    }
    (name.to_str_lossy(), Visibility::Public, None)
}

/// Strip the visibility prefix from a serialized property name.
///
/// Accepts PHP's `\0*\0prop` and `\0Class\0prop` forms, and the same
/// forms with spaces in place of the NULs as they show up in dumps.
///
/// ```rust
/// use php_serialize_core::unmangle_property_name;
///
/// assert_eq!(unmangle_property_name(b"\x00*\x00prot"), b"prot");
/// assert_eq!(unmangle_property_name(b" Foo priv"), b"priv");
/// assert_eq!(unmangle_property_name(b"pub"), b"pub");
/// ```
pub fn unmangle_property_name(name: &[u8]) -> &[u8] {
    match name.first() {
        Some(&sep @ (0 | b' ')) => match memchr(sep, &name[1..]) {
            Some(i) => &name[i + 2..],
            None => name,
        },
        _ => name,
    }
}

impl fmt::Display for PhpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpValue::Null => write!(f, "null"),
            PhpValue::Bool(b) => write!(f, "{}", b),
            PhpValue::Int(i) => write!(f, "{}", i),
            PhpValue::Float(fl) => write!(f, "{}", fl),
            PhpValue::String(s) => write!(f, "\"{}\"", s.as_bstr()),
            PhpValue::Array(arr) => {
                write!(f, "[")?;
                write_entries(f, arr)?;
                write!(f, "]")
            }
            PhpValue::Object {
                class_name,
                properties,
            } => {
                write!(f, "{}{{", class_name)?;
                write_entries(f, properties)?;
                write!(f, "}}")
            }
        }
    }
}

fn write_entries(f: &mut fmt::Formatter<'_>, entries: &[(PhpValue, PhpValue)]) -> fmt::Result {
    for (i, (k, v)) in entries.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{} => {}", k, v)?;
    }
    Ok(())
}

impl From<bool> for PhpValue {
    fn from(b: bool) -> Self {
        PhpValue::Bool(b)
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for PhpValue {
                fn from(i: $t) -> Self {
                    PhpValue::Int(i64::from(i))
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, u16, u32);

impl From<f32> for PhpValue {
    fn from(f: f32) -> Self {
        PhpValue::Float(f64::from(f))
    }
}

impl From<f64> for PhpValue {
    fn from(f: f64) -> Self {
        PhpValue::Float(f)
    }
}

impl From<&str> for PhpValue {
    fn from(s: &str) -> Self {
        PhpValue::String(s.as_bytes().to_vec())
    }
}

impl From<String> for PhpValue {
    fn from(s: String) -> Self {
        PhpValue::String(s.into_bytes())
    }
}

impl From<&[u8]> for PhpValue {
    fn from(b: &[u8]) -> Self {
        PhpValue::String(b.to_vec())
    }
}

impl<T: Into<PhpValue>> From<Option<T>> for PhpValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(PhpValue::Null, Into::into)
    }
}

impl<T: Into<PhpValue>> From<Vec<T>> for PhpValue {
    fn from(items: Vec<T>) -> Self {
        PhpValue::list(items)
    }
}
