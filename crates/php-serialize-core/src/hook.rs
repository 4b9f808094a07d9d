//! Object construction during decoding.
//!
//! Every `O:` entry the decoder reads is handed to an [`ObjectHook`] together
//! with its class name and ordered fields. The hook decides what value takes
//! the object's place in the result.

use std::error::Error;

use crate::types::PhpValue;

/// Result returned by an object hook.
pub type HookResult = std::result::Result<PhpValue, Box<dyn Error + Send + Sync>>;

/// Turns a decoded class name and its fields into a value.
///
/// Closures with the matching signature implement this trait:
///
/// ```rust
/// use php_serialize_core::{Decoder, PhpValue, SliceSource};
///
/// let hook = |name: &str, fields: Vec<(PhpValue, PhpValue)>| -> php_serialize_core::HookResult {
///     match name {
///         "Point" => Ok(PhpValue::Array(fields)),
///         other => Err(format!("unknown class {other}").into()),
///     }
/// };
/// let mut decoder = Decoder::new(SliceSource::new(br#"O:5:"Point":1:{s:1:"x";i:1;}"#)).with_hook(hook);
/// let value = decoder.decode().unwrap();
/// assert_eq!(value, PhpValue::map(vec![("x", 1)]));
/// ```
pub trait ObjectHook {
    /// Build the value for one decoded object.
    fn construct(&self, class_name: &str, fields: Vec<(PhpValue, PhpValue)>) -> HookResult;
}

impl<F> ObjectHook for F
where
    F: Fn(&str, Vec<(PhpValue, PhpValue)>) -> HookResult,
{
    fn construct(&self, class_name: &str, fields: Vec<(PhpValue, PhpValue)>) -> HookResult {
        self(class_name, fields)
    }
}

/// The default hook: keeps the fields and tags them with the class name.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedObject;

impl ObjectHook for TaggedObject {
    #[inline]
    fn construct(&self, class_name: &str, fields: Vec<(PhpValue, PhpValue)>) -> HookResult {
        Ok(PhpValue::Object {
            class_name: class_name.to_owned(),
            properties: fields,
        })
    }
}
