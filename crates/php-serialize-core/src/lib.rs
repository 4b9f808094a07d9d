//! Encoder and streaming decoder for PHP's `serialize()` format.
//!
//! This crate reads and writes the textual format produced by PHP's
//! `serialize()` and consumed by `unserialize()`, for exchanging data with
//! PHP systems that store or transmit values this way.
//!
//! # Features
//!
//! - **Byte-exact strings** - Length prefixes count bytes, payloads may hold any byte
//! - **Order preserving** - Array and object entries keep their insertion order and key types
//! - **Streaming decode** - Reads from any `io::Read`, never past the value's terminator
//! - **Round-trip floats** - Shortest representation that parses back to the same `f64`
//! - **Object hooks** - Caller-supplied construction of decoded `O:` entries
//! - **Detailed errors** - Precise error positions and messages
//!
//! # Quick Start
//!
//! ```rust
//! use php_serialize_core::{from_bytes, to_bytes, PhpValue};
//!
//! let value = PhpValue::map(vec![("name", PhpValue::from("Alice")), ("age", PhpValue::Int(30))]);
//! let bytes = to_bytes(&value).unwrap();
//! assert_eq!(bytes, br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#);
//!
//! let decoded = from_bytes(&bytes).unwrap();
//! assert_eq!(decoded, value);
//! assert_eq!(decoded.get("name").and_then(PhpValue::as_str), Some("Alice"));
//! ```
//!
//! # Reading a Stream
//!
//! ```rust
//! use std::io::Cursor;
//! use php_serialize_core::{from_reader, PhpValue};
//!
//! let mut stream = Cursor::new(b"i:1;s:3:\"foo\";".to_vec());
//! assert_eq!(from_reader(&mut stream).unwrap(), PhpValue::Int(1));
//! assert_eq!(from_reader(&mut stream).unwrap(), PhpValue::from("foo"));
//! ```
//!
//! # Supported Types
//!
//! | PHP Type | Rust Type |
//! |----------|-----------|
//! | `null` | `PhpValue::Null` |
//! | `bool` | `PhpValue::Bool(bool)` |
//! | `int` | `PhpValue::Int(i64)` |
//! | `float` | `PhpValue::Float(f64)` |
//! | `string` | `PhpValue::String(Vec<u8>)` |
//! | `array` | `PhpValue::Array(Vec<(PhpValue, PhpValue)>)` |
//! | `object` | `PhpValue::Object { class_name, properties }` |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::inline_always)]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod grammar;
pub mod hook;
pub mod source;
pub mod types;

#[cfg(feature = "serde")]
pub mod json;
#[cfg(feature = "serde")]
pub mod ser;

pub use decoder::{decode, from_bytes, from_bytes_with_config, from_reader, Decoder, DecoderConfig};
pub use encoder::{encode, to_bytes, Encoder, EncoderConfig};
pub use error::{EncodeError, ErrorKind, MalformedInputError, Result};
pub use grammar::is_serialized;
pub use hook::{HookResult, ObjectHook, TaggedObject};
pub use source::{SliceSource, Source};
pub use types::{unmangle_property_name, PhpProperty, PhpValue, Visibility};

#[cfg(feature = "serde")]
pub use json::to_json;
