//! PHP serialize encoder.
//!
//! Values are written straight to an [`io::Write`] sink as they are walked;
//! nothing is buffered beyond what the sink itself does. If encoding fails
//! part way, whatever reached the sink is incomplete and should be discarded.

use std::io::{self, Write};

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::error::EncodeError;
use crate::grammar::{
    self, CLOSE_BRACE, OPEN_BRACE, QUOTE, SEMICOLON, TAG_ARRAY, TAG_OBJECT, TAG_STRING,
};
use crate::types::PhpValue;

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 512;

/// Encoder configuration options.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Maximum nesting depth for arrays and objects.
    pub max_depth: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// A PHP serialize encoder writing to a sink.
pub struct Encoder<W> {
    writer: W,
    config: EncoderConfig,
    depth: usize,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder with the default configuration.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, EncoderConfig::default())
    }

    /// Create an encoder with a custom configuration.
    pub fn with_config(writer: W, config: EncoderConfig) -> Self {
        Self {
            writer,
            config,
            depth: 0,
        }
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Unwrap the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write one value.
    pub fn encode(&mut self, value: &PhpValue) -> Result<(), EncodeError> {
        self.depth = 0;
        self.encode_value(value)
    }

    fn encode_value(&mut self, value: &PhpValue) -> Result<(), EncodeError> {
        match value {
            PhpValue::Null => self.writer.write_all(b"N;")?,
            PhpValue::Bool(b) => self.writer.write_all(if *b { b"b:1;" } else { b"b:0;" })?,
            PhpValue::Int(i) => write!(self.writer, "i:{};", i)?,
            PhpValue::Float(f) => write!(self.writer, "d:{};", grammar::format_float(*f))?,
            PhpValue::String(s) => self.write_string(s)?,
            PhpValue::Array(items) => {
                #[cfg(feature = "tracing")]
                trace!(entries = items.len(), depth = self.depth, "Encoding array");

                write!(self.writer, "{}:{}:", char::from(TAG_ARRAY), items.len())?;
                self.write_entries(items)?;
            }
            PhpValue::Object {
                class_name,
                properties,
            } => {
                #[cfg(feature = "tracing")]
                trace!(class_name = %class_name, fields = properties.len(), "Encoding object");

                write!(self.writer, "{}:{}:", char::from(TAG_OBJECT), class_name.len())?;
                self.writer.write_all(&[QUOTE])?;
                self.writer.write_all(class_name.as_bytes())?;
                write!(self.writer, "\":{}:", properties.len())?;
                self.write_entries(properties)?;
            }
        }
        Ok(())
    }

    /// `s:<byte length>:"<bytes>";`
    fn write_string(&mut self, bytes: &[u8]) -> io::Result<()> {
        write!(self.writer, "{}:{}:", char::from(TAG_STRING), bytes.len())?;
        self.writer.write_all(&[QUOTE])?;
        self.writer.write_all(bytes)?;
        self.writer.write_all(&[QUOTE, SEMICOLON])
    }

    /// `{<key><value>...}`
    fn write_entries(&mut self, entries: &[(PhpValue, PhpValue)]) -> Result<(), EncodeError> {
        if self.depth >= self.config.max_depth {
            return Err(EncodeError::MaxDepthExceeded(self.config.max_depth));
        }
        self.depth += 1;

        self.writer.write_all(&[OPEN_BRACE])?;
        for (key, value) in entries {
            self.write_key(key)?;
            self.encode_value(value)?;
        }
        self.writer.write_all(&[CLOSE_BRACE])?;

        self.depth -= 1;
        Ok(())
    }

    /// Write an array key, casting it the way PHP casts array offsets.
    ///
    /// Booleans become `0`/`1`, null becomes `""`, floats are truncated
    /// toward zero. Arrays and objects cannot be keys.
    fn write_key(&mut self, key: &PhpValue) -> Result<(), EncodeError> {
        match key {
            PhpValue::Int(i) => write!(self.writer, "i:{};", i)?,
            PhpValue::String(s) => self.write_string(s)?,
            PhpValue::Bool(b) => write!(self.writer, "i:{};", i64::from(*b))?,
            PhpValue::Null => self.write_string(b"")?,
            PhpValue::Float(f) => write!(self.writer, "i:{};", f.trunc() as i64)?,
            PhpValue::Array(_) | PhpValue::Object { .. } => {
                return Err(EncodeError::unsupported(key.type_name()).with_context("array key"));
            }
        }
        Ok(())
    }
}

/// Write `value` to `writer` in PHP serialize format.
///
/// Pass `&mut writer` to keep using the writer; several values written this
/// way can be read back one by one with a [`Decoder`](crate::Decoder).
pub fn encode<W: Write>(value: &PhpValue, writer: W) -> Result<(), EncodeError> {
    Encoder::new(writer).encode(value)
}

/// Serialize a value to bytes.
///
/// ```rust
/// use php_serialize_core::{to_bytes, PhpValue};
///
/// let value = PhpValue::map(vec![("b", 1), ("a", 2)]);
/// assert_eq!(to_bytes(&value).unwrap(), br#"a:2:{s:1:"b";i:1;s:1:"a";i:2;}"#);
/// ```
pub fn to_bytes(value: &PhpValue) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode(value, &mut out)?;
    Ok(out)
}
