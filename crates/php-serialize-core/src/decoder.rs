//! Streaming PHP unserialize decoder.
//!
//! The decoder pulls bytes from a [`Source`] strictly forward, one grammar
//! element at a time, and stops right after the terminator of the value it
//! was asked for. Nothing past that terminator is read, so a single source
//! can carry a sequence of concatenated values.
//!
//! Each value moves through the same states: read the type tag, read the
//! length or scalar token, read the payload, check the terminator. Array and
//! object entries recurse into the same sequence. Any mismatch aborts the
//! whole call; partially built values are dropped.
//!
//! # Tracing Support
//!
//! Enable the `tracing` feature for decode instrumentation:
//!
//! ```toml
//! php-serialize-core = { version = "0.1", features = ["tracing"] }
//! ```

use std::io::{self, Read};

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace, warn};

use crate::error::{ErrorKind, MalformedInputError, Result};
use crate::grammar::{
    self, CLOSE_BRACE, COLON, MAX_NUMBER_LEN, OPEN_BRACE, QUOTE, SEMICOLON, TAG_ARRAY, TAG_BOOL,
    TAG_FLOAT, TAG_INT, TAG_NULL, TAG_OBJECT, TAG_STRING,
};
use crate::hook::{ObjectHook, TaggedObject};
use crate::source::{SliceSource, Source};
use crate::types::PhpValue;

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 512;

/// Payload bytes are read in chunks of this size, so a bogus length prefix
/// cannot force a huge allocation before the input runs out.
const READ_CHUNK: usize = 64 * 1024;

/// Decoder configuration options.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum nesting depth for arrays and objects.
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// A streaming PHP unserialize decoder.
pub struct Decoder<S, H = TaggedObject> {
    /// Input bytes.
    source: S,
    /// Builds values for `O:` entries.
    hook: H,
    /// Decoder configuration.
    config: DecoderConfig,
    /// Bytes consumed from the source so far.
    pos: usize,
    /// Current nesting depth.
    depth: usize,
}

impl<S: Source> Decoder<S> {
    /// Create a decoder with the default configuration and object hook.
    pub fn new(source: S) -> Self {
        Self::with_config(source, DecoderConfig::default())
    }

    /// Create a decoder with a custom configuration.
    pub fn with_config(source: S, config: DecoderConfig) -> Self {
        Self {
            source,
            hook: TaggedObject,
            config,
            pos: 0,
            depth: 0,
        }
    }
}

impl<S: Source, H: ObjectHook> Decoder<S, H> {
    /// Replace the object-construction hook.
    pub fn with_hook<H2: ObjectHook>(self, hook: H2) -> Decoder<S, H2> {
        Decoder {
            source: self.source,
            hook,
            config: self.config,
            pos: self.pos,
            depth: self.depth,
        }
    }

    /// Total bytes consumed from the source.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Unwrap the underlying source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Decode the next value from the source.
    ///
    /// On success the source is positioned immediately after the value's
    /// terminator. After an error its position is unspecified.
    #[cfg_attr(feature = "tracing", instrument(skip(self), fields(pos = self.pos)))]
    pub fn decode(&mut self) -> Result<PhpValue> {
        #[cfg(feature = "tracing")]
        debug!(pos = self.pos, "Starting PHP unserialize");

        self.depth = 0;
        let result = self.decode_value();

        #[cfg(feature = "tracing")]
        match &result {
            Ok(value) => debug!(value_type = value.type_name(), consumed = self.pos, "Decode completed"),
            Err(e) => warn!(error = %e, "Decode failed"),
        }

        result
    }

    /// Decode a single value at the current position.
    #[cfg_attr(feature = "tracing", instrument(skip(self), level = "trace", fields(pos = self.pos, depth = self.depth)))]
    fn decode_value(&mut self) -> Result<PhpValue> {
        if self.depth > self.config.max_depth {
            #[cfg(feature = "tracing")]
            warn!(depth = self.depth, max_depth = self.config.max_depth, "Max depth exceeded");
            return Err(self.error(ErrorKind::MaxDepthExceeded(self.config.max_depth), self.pos));
        }

        let tag_pos = self.pos;
        let tag = self.read_byte()?;

        #[cfg(feature = "tracing")]
        trace!(type_marker = %char::from(tag), pos = tag_pos, "Decoding value");

        match tag {
            TAG_NULL => {
                self.expect_byte(SEMICOLON)?;
                Ok(PhpValue::Null)
            }
            TAG_BOOL => self.decode_bool(),
            TAG_INT => self.decode_int(),
            TAG_FLOAT => self.decode_float(),
            TAG_STRING => self.decode_string(),
            TAG_ARRAY => self.decode_array(),
            TAG_OBJECT => self.decode_object(tag_pos),
            _ => {
                #[cfg(feature = "tracing")]
                warn!(type_byte = %char::from(tag), pos = tag_pos, "Unknown type marker");
                Err(self.error(ErrorKind::UnknownType(char::from(tag)), tag_pos))
            }
        }
    }

    /// `b:<0|1>;` after the tag.
    fn decode_bool(&mut self) -> Result<PhpValue> {
        self.expect_byte(COLON)?;
        let value_pos = self.pos;
        let value = match self.read_byte()? {
            b'0' => false,
            b'1' => true,
            other => {
                return Err(self.error(
                    ErrorKind::InvalidBoolean(char::from(other).to_string()),
                    value_pos,
                ))
            }
        };
        self.expect_byte(SEMICOLON)?;
        Ok(PhpValue::Bool(value))
    }

    /// `i:<value>;` after the tag.
    fn decode_int(&mut self) -> Result<PhpValue> {
        self.expect_byte(COLON)?;
        let (token, start) = self.read_token(SEMICOLON)?;
        grammar::parse_int(&token)
            .map(PhpValue::Int)
            .ok_or_else(|| self.error(ErrorKind::InvalidInteger(token), start))
    }

    /// `d:<value>;` after the tag.
    fn decode_float(&mut self) -> Result<PhpValue> {
        self.expect_byte(COLON)?;
        let (token, start) = self.read_token(SEMICOLON)?;
        grammar::parse_float(&token)
            .map(PhpValue::Float)
            .ok_or_else(|| self.error(ErrorKind::InvalidFloat(token), start))
    }

    /// `s:<len>:"<data>";` after the tag.
    ///
    /// The length prefix is authoritative: exactly `len` bytes are taken as
    /// the payload whatever they contain, then `";` must follow.
    fn decode_string(&mut self) -> Result<PhpValue> {
        self.expect_byte(COLON)?;
        let len = self.read_length(COLON)?;
        self.expect_byte(QUOTE)?;
        let data = self.read_payload(len)?;
        self.expect_byte(QUOTE)?;
        self.expect_byte(SEMICOLON)?;
        Ok(PhpValue::String(data))
    }

    /// `a:<count>:{<key><value>...}` after the tag.
    fn decode_array(&mut self) -> Result<PhpValue> {
        self.expect_byte(COLON)?;
        let count = self.read_length(COLON)?;
        self.expect_byte(OPEN_BRACE)?;
        let items = self.decode_entries(count)?;
        self.expect_byte(CLOSE_BRACE)?;
        Ok(PhpValue::Array(items))
    }

    /// `O:<namelen>:"<name>":<count>:{<prop>...}` after the tag.
    fn decode_object(&mut self, start: usize) -> Result<PhpValue> {
        self.expect_byte(COLON)?;
        let name_len = self.read_length(COLON)?;
        self.expect_byte(QUOTE)?;

        let name_start = self.pos;
        let name_bytes = self.read_payload(name_len)?;
        let class_name = String::from_utf8(name_bytes)
            .map_err(|_| self.error(ErrorKind::InvalidUtf8, name_start))?;

        self.expect_byte(QUOTE)?;
        self.expect_byte(COLON)?;
        let count = self.read_length(COLON)?;
        self.expect_byte(OPEN_BRACE)?;
        let fields = self.decode_entries(count)?;
        self.expect_byte(CLOSE_BRACE)?;

        #[cfg(feature = "tracing")]
        trace!(class_name = %class_name, fields = fields.len(), "Constructing object");

        self.hook.construct(&class_name, fields).map_err(|e| {
            self.error(ErrorKind::ObjectHook(e.to_string()), start)
                .with_context(format!("class {}", class_name))
        })
    }

    /// Decode `count` key/value pairs. Keys must be integers or strings.
    fn decode_entries(&mut self, count: usize) -> Result<Vec<(PhpValue, PhpValue)>> {
        self.depth += 1;
        // Cap initial allocation
        let mut items = Vec::with_capacity(count.min(1024));

        for _ in 0..count {
            let key_pos = self.pos;
            let key = self.decode_value()?;
            if !matches!(key, PhpValue::Int(_) | PhpValue::String(_)) {
                return Err(self.error(ErrorKind::InvalidArrayKey(key.type_name()), key_pos));
            }
            let value = self.decode_value()?;
            items.push((key, value));
        }

        self.depth -= 1;
        Ok(items)
    }

    // Byte-level helpers

    /// Read and consume one byte.
    #[inline]
    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        let n = self
            .source
            .read_bytes(&mut byte)
            .map_err(|e| self.io_error(&e))?;
        if n == 0 {
            return Err(self.error(ErrorKind::UnexpectedEof, self.pos));
        }
        self.pos += 1;
        Ok(byte[0])
    }

    /// Expect a specific byte, returning an error if it doesn't match.
    #[inline]
    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        let byte = self.read_byte()?;
        if byte != expected {
            return Err(self.make_unexpected_char_error(expected, byte));
        }
        Ok(())
    }

    /// Create an unexpected character error for the byte just consumed.
    #[cold]
    #[inline(never)]
    fn make_unexpected_char_error(&self, expected: u8, found: u8) -> MalformedInputError {
        self.error(
            ErrorKind::UnexpectedChar {
                expected: char::from(expected),
                found: char::from(found),
            },
            self.pos - 1,
        )
    }

    /// Read a numeric token up to and including `delimiter`.
    ///
    /// Hitting any other delimiter byte first is reported as a missing
    /// `delimiter` at that byte. Returns the token and its start position.
    fn read_token(&mut self, delimiter: u8) -> Result<(String, usize)> {
        let start = self.pos;
        let mut token = String::new();
        loop {
            let byte = self.read_byte()?;
            if byte == delimiter {
                return Ok((token, start));
            }
            if matches!(byte, COLON | SEMICOLON | QUOTE | OPEN_BRACE | CLOSE_BRACE) {
                return Err(self.make_unexpected_char_error(delimiter, byte));
            }
            // bytes >= 0x80 widen to two UTF-8 bytes
            if token.len() >= MAX_NUMBER_LEN {
                return Err(self
                    .error(ErrorKind::UnexpectedChar {
                        expected: char::from(delimiter),
                        found: char::from(byte),
                    }, self.pos - 1)
                    .with_context("numeric token too long"));
            }
            token.push(char::from(byte));
        }
    }

    /// Read a length or count prefix terminated by `delimiter`.
    fn read_length(&mut self, delimiter: u8) -> Result<usize> {
        let (token, start) = self.read_token(delimiter)?;
        grammar::parse_length(&token).ok_or_else(|| self.error(ErrorKind::InvalidLength(token), start))
    }

    /// Read exactly `len` raw bytes.
    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>> {
        let start = self.pos;
        let mut buf = Vec::with_capacity(len.min(READ_CHUNK));
        while buf.len() < len {
            let filled = buf.len();
            let chunk = (len - filled).min(READ_CHUNK);
            buf.resize(filled + chunk, 0);
            let n = self
                .source
                .read_bytes(&mut buf[filled..])
                .map_err(|e| self.io_error(&e))?;
            self.pos += n;
            if n < chunk {
                return Err(self
                    .error(
                        ErrorKind::StringLengthMismatch {
                            expected: len,
                            found: filled + n,
                        },
                        start,
                    )
                    .with_context("declared length runs past end of input"));
            }
        }
        Ok(buf)
    }

    /// Build an error at `position`, with a preview when the source keeps its input.
    #[cold]
    fn error(&self, kind: ErrorKind, position: usize) -> MalformedInputError {
        let err = MalformedInputError::new(kind, position);
        match self.source.window(position) {
            Some((window, offset)) => err.with_input_preview(window, offset),
            None => err,
        }
    }

    #[cold]
    fn io_error(&self, e: &io::Error) -> MalformedInputError {
        MalformedInputError::new(
            ErrorKind::Io {
                kind: e.kind(),
                message: e.to_string(),
            },
            self.pos,
        )
    }
}

/// Decode one value from `source`, returning it with the number of bytes consumed.
///
/// Bytes after the value's terminator are left in the source.
///
/// ```rust
/// use php_serialize_core::{decode, PhpValue};
///
/// let (value, consumed) = decode(&b"i:42;i:7;"[..]).unwrap();
/// assert_eq!(value, PhpValue::Int(42));
/// assert_eq!(consumed, 5);
/// ```
pub fn decode<S: Source>(source: S) -> Result<(PhpValue, usize)> {
    let mut decoder = Decoder::new(source);
    let value = decoder.decode()?;
    Ok((value, decoder.position()))
}

/// Decode one value from a reader, consuming exactly its bytes.
///
/// Pass `&mut reader` to keep using the reader afterwards. Wrap unbuffered
/// readers in [`std::io::BufReader`]; the decoder reads token bytes singly.
pub fn from_reader<R: Read>(reader: R) -> Result<PhpValue> {
    Decoder::new(reader).decode()
}

/// Decode PHP serialized data from bytes.
///
/// Trailing bytes after the first value are ignored; use [`decode`] to learn
/// how many bytes the value took.
///
/// ```rust
/// use php_serialize_core::from_bytes;
///
/// let value = from_bytes(b"i:42;").unwrap();
/// assert_eq!(value.as_int(), Some(42));
/// ```
#[inline]
pub fn from_bytes(data: &[u8]) -> Result<PhpValue> {
    from_bytes_with_config(data, DecoderConfig::default())
}

/// Decode PHP serialized data from bytes with custom configuration.
///
/// ```rust
/// use php_serialize_core::{from_bytes_with_config, DecoderConfig};
///
/// let config = DecoderConfig { max_depth: 1 };
/// assert!(from_bytes_with_config(b"a:1:{i:0;a:1:{i:0;a:0:{}}}", config).is_err());
/// ```
#[inline]
pub fn from_bytes_with_config(data: &[u8], config: DecoderConfig) -> Result<PhpValue> {
    #[cfg(feature = "tracing")]
    trace!(data_len = data.len(), ?config, "from_bytes_with_config called");

    Decoder::with_config(SliceSource::new(data), config).decode()
}

#[cfg(test)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;
    use crate::hook::HookResult;
    use std::io::Cursor;

    #[test]
    fn test_null() {
        assert_eq!(from_bytes(b"N;").unwrap(), PhpValue::Null);
    }

    #[test]
    fn test_bool() {
        assert_eq!(from_bytes(b"b:0;").unwrap(), PhpValue::Bool(false));
        assert_eq!(from_bytes(b"b:1;").unwrap(), PhpValue::Bool(true));
        let err = from_bytes(b"b:2;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidBoolean("2".into()));
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_int() {
        assert_eq!(from_bytes(b"i:0;").unwrap(), PhpValue::Int(0));
        assert_eq!(from_bytes(b"i:42;").unwrap(), PhpValue::Int(42));
        assert_eq!(from_bytes(b"i:-123;").unwrap(), PhpValue::Int(-123));
        assert_eq!(
            from_bytes(b"i:9223372036854775807;").unwrap(),
            PhpValue::Int(i64::MAX)
        );
    }

    #[test]
    fn test_float() {
        assert_eq!(from_bytes(b"d:0;").unwrap(), PhpValue::Float(0.0));
        assert_eq!(from_bytes(b"d:3.14;").unwrap(), PhpValue::Float(3.14));
        assert_eq!(from_bytes(b"d:-2.5;").unwrap(), PhpValue::Float(-2.5));
        assert_eq!(from_bytes(b"d:1.0E+25;").unwrap(), PhpValue::Float(1e25));
        assert!(matches!(from_bytes(b"d:INF;").unwrap(), PhpValue::Float(f) if f.is_infinite() && f.is_sign_positive()));
        assert!(matches!(from_bytes(b"d:-INF;").unwrap(), PhpValue::Float(f) if f.is_infinite() && f.is_sign_negative()));
        assert!(matches!(from_bytes(b"d:NAN;").unwrap(), PhpValue::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_string() {
        assert_eq!(from_bytes(b"s:0:\"\";").unwrap(), PhpValue::string(""));
        assert_eq!(from_bytes(b"s:5:\"hello\";").unwrap(), PhpValue::string("hello"));
    }

    #[test]
    fn test_string_korean() {
        // "한글" = 6 bytes in UTF-8
        let korean = b"s:6:\"\xed\x95\x9c\xea\xb8\x80\";";
        let result = from_bytes(korean).unwrap();
        assert_eq!(result.as_str(), Some("한글"));
    }

    #[test]
    fn test_string_with_semicolon() {
        let result = from_bytes(b"s:11:\"hello;world\";").unwrap();
        assert_eq!(result.as_str(), Some("hello;world"));
    }

    #[test]
    fn test_string_with_quotes() {
        // Length is authoritative, embedded `";` is payload
        let result = from_bytes(b"s:9:\"say \"hi\";\";").unwrap();
        assert_eq!(result.as_str(), Some("say \"hi\";"));
    }

    #[test]
    fn test_special_string_binary() {
        let data = b"s:5:\"a\x00b\x00c\";";
        let result = from_bytes(data).unwrap();
        assert_eq!(result.as_bytes(), Some(b"a\x00b\x00c".as_slice()));
    }

    #[test]
    fn test_array_empty() {
        assert_eq!(from_bytes(b"a:0:{}").unwrap(), PhpValue::Array(vec![]));
    }

    #[test]
    fn test_array_indexed() {
        let result = from_bytes(b"a:2:{i:0;s:3:\"foo\";i:1;s:3:\"bar\";}").unwrap();
        let items = result.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].0, PhpValue::Int(0));
        assert_eq!(items[0].1.as_str(), Some("foo"));
        assert_eq!(items[1].0, PhpValue::Int(1));
        assert_eq!(items[1].1.as_str(), Some("bar"));
    }

    #[test]
    fn test_array_keeps_order_and_key_types() {
        let result = from_bytes(br#"a:3:{s:1:"b";i:1;s:1:"a";i:2;s:1:"5";i:3;}"#).unwrap();
        let keys: Vec<_> = result.as_array().unwrap().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            vec![PhpValue::string("b"), PhpValue::string("a"), PhpValue::string("5")]
        );
    }

    #[test]
    fn test_array_non_sequential_keys() {
        let result = from_bytes(b"a:2:{i:5;s:1:\"a\";i:10;s:1:\"b\";}").unwrap();
        let items = result.as_array().unwrap();
        assert_eq!(items[0].0, PhpValue::Int(5));
        assert_eq!(items[1].0, PhpValue::Int(10));
    }

    #[test]
    fn test_array_invalid_key() {
        let err = from_bytes(b"a:1:{d:1.5;i:1;}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArrayKey("float"));
        assert_eq!(err.position, 5);
    }

    #[test]
    fn test_object_default_hook() {
        let result = from_bytes(br#"O:3:"Foo":1:{s:1:"x";i:5;}"#).unwrap();
        assert_eq!(result, PhpValue::object("Foo", vec![("x", 5)]));
    }

    #[test]
    fn test_object_custom_hook() {
        let hook = |name: &str, fields: Vec<(PhpValue, PhpValue)>| -> HookResult {
            assert_eq!(name, "Foo");
            assert_eq!(fields, vec![(PhpValue::string("x"), PhpValue::Int(5))]);
            Ok(PhpValue::string("built Foo"))
        };
        let data = br#"a:1:{i:0;O:3:"Foo":1:{s:1:"x";i:5;}}"#;
        let mut decoder = Decoder::new(SliceSource::new(data)).with_hook(hook);
        let result = decoder.decode().unwrap();
        assert_eq!(result, PhpValue::list(vec!["built Foo"]));
    }

    #[test]
    fn test_object_hook_rejects() {
        let hook = |name: &str, _: Vec<(PhpValue, PhpValue)>| -> HookResult {
            Err(format!("unknown class {}", name).into())
        };
        let data = br#"O:7:"WP_User":1:{s:8:"username";s:5:"admin";}"#;
        let err = Decoder::new(SliceSource::new(data))
            .with_hook(hook)
            .decode()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ObjectHook("unknown class WP_User".into()));
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_object_private_protected_names_kept_raw() {
        let data = b"O:4:\"Test\":2:{s:10:\"\x00Test\x00priv\";i:1;s:7:\"\x00*\x00prot\";i:2;}";
        let result = from_bytes(data).unwrap();
        assert_eq!(result.class_name(), Some("Test"));
        assert_eq!(result.get("priv"), Some(&PhpValue::Int(1)));
        assert_eq!(result.get("prot"), Some(&PhpValue::Int(2)));
    }

    #[test]
    fn test_nested_array_depth() {
        let mut data = String::from("s:4:\"leaf\";");
        for _ in 0..100 {
            data = format!("a:1:{{s:1:\"k\";{}}}", data);
        }
        let result = from_bytes(data.as_bytes()).unwrap();
        assert!(result.is_array());
    }

    #[test]
    fn test_max_depth_exceeded() {
        let mut data = String::from("N;");
        for _ in 0..10 {
            data = format!("a:1:{{i:0;{}}}", data);
        }
        let err = from_bytes_with_config(data.as_bytes(), DecoderConfig { max_depth: 4 }).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaxDepthExceeded(4));
    }

    #[test]
    fn test_error_invalid_type() {
        let err = from_bytes(b"X:1;").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownType('X')));
        assert_eq!(err.position, 0);
        assert!(err.input_preview.is_some());
    }

    #[test]
    fn test_error_truncated_array() {
        let err = from_bytes(b"a:2:{i:0;i:1;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEof);
        assert_eq!(err.position, 13);
    }

    #[test]
    fn test_error_length_overrun() {
        let err = from_bytes(b"s:5:\"ab\";").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::StringLengthMismatch {
                expected: 5,
                found: 4
            }
        );
        assert_eq!(err.position, 5);
    }

    #[test]
    fn test_error_length_underrun() {
        let err = from_bytes(b"s:2:\"abc\";").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnexpectedChar {
                expected: '"',
                found: 'c'
            }
        );
        assert_eq!(err.position, 7);
    }

    #[test]
    fn test_error_truncated_string() {
        assert!(from_bytes(b"s:10:\"hello").unwrap_err().is_eof());
    }

    #[test]
    fn test_error_invalid_int() {
        let err = from_bytes(b"i:abc;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInteger("abc".into()));
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_error_token_too_long() {
        let mut data = b"i:a".to_vec();
        data.extend(std::iter::repeat(0xFF).take(1000));
        data.push(b';');
        let err = from_bytes(&data).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedChar { expected: ';', .. }));
        assert_eq!(err.context.as_deref(), Some("numeric token too long"));
        assert!(err.position < 40);

        let err = from_bytes(format!("i:{};", "1".repeat(100)).as_bytes()).unwrap_err();
        assert_eq!(err.context.as_deref(), Some("numeric token too long"));
        assert_eq!(err.position, 2 + 64);
    }

    #[test]
    fn test_array_entries_in_wire_order() {
        let data = br#"a:4:{s:3:"foo";i:1;i:7;s:1:"x";s:3:"bar";i:2;i:0;N;}"#;
        let pairs = from_bytes(data).unwrap().as_array().unwrap().to_vec();
        assert_eq!(
            pairs,
            vec![
                (PhpValue::string("foo"), PhpValue::Int(1)),
                (PhpValue::Int(7), PhpValue::string("x")),
                (PhpValue::string("bar"), PhpValue::Int(2)),
                (PhpValue::Int(0), PhpValue::Null),
            ]
        );
    }

    #[test]
    fn test_error_invalid_float() {
        let err = from_bytes(b"d:1.2.3;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFloat("1.2.3".into()));
    }

    #[test]
    fn test_error_missing_semicolon() {
        let err = from_bytes(b"i:12:").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnexpectedChar {
                expected: ';',
                found: ':'
            }
        );
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_error_negative_length() {
        let err = from_bytes(b"s:-1:\"\";").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidLength("-1".into()));
    }

    #[test]
    fn test_error_missing_closing_brace() {
        let err = from_bytes(b"a:1:{i:0;i:1;i:2;}").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnexpectedChar {
                expected: '}',
                found: 'i'
            }
        );
    }

    #[test]
    fn test_trailing_bytes_left_alone() {
        let (value, consumed) = decode(SliceSource::new(b"b:1;garbage")).unwrap();
        assert_eq!(value, PhpValue::Bool(true));
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_stream_of_values() {
        let data = br#"a:2:{i:0;i:1;i:1;i:2;}s:3:"foo";"#;
        let mut decoder = Decoder::new(SliceSource::new(data));
        assert_eq!(decoder.decode().unwrap(), PhpValue::list(vec![1, 2]));
        assert_eq!(decoder.position(), 22);
        assert_eq!(decoder.decode().unwrap(), PhpValue::string("foo"));
        assert_eq!(decoder.position(), data.len());
        assert!(decoder.get_ref().remaining().is_empty());
    }

    #[test]
    fn test_reader_left_after_terminator() {
        let mut cursor = Cursor::new(b"i:1;N;".to_vec());
        assert_eq!(from_reader(&mut cursor).unwrap(), PhpValue::Int(1));
        assert_eq!(cursor.position(), 4);
        assert_eq!(from_reader(&mut cursor).unwrap(), PhpValue::Null);
        assert!(from_reader(&mut cursor).unwrap_err().is_eof());
    }

    #[test]
    fn test_reader_io_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }
        let err = from_reader(Broken).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Io { kind: io::ErrorKind::ConnectionReset, .. }));
    }
}
