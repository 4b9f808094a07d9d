//! Error types for PHP serialization.
//!
//! Decoding failures carry the byte position where the input stopped
//! matching the grammar, plus optional context to help debug bad payloads.
//! Encoding failures name the value shape that has no PHP representation.

use std::fmt;
use std::io;

use bstr::ByteSlice;
use thiserror::Error;

/// The error returned when decoding malformed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct MalformedInputError {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// The byte position where the error occurred.
    pub position: usize,
    /// Optional context about what was being decoded.
    pub context: Option<String>,
    /// Preview of input around error position for debugging.
    pub input_preview: Option<String>,
}

impl fmt::Display for MalformedInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.position)?;
        if let Some(ref ctx) = self.context {
            write!(f, " ({})", ctx)?;
        }
        if let Some(ref preview) = self.input_preview {
            write!(f, "\n{}", preview)?;
        }
        Ok(())
    }
}

/// Specific kinds of decoding errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Expected a specific character but found something else.
    #[error("expected '{expected}', found '{found}'")]
    UnexpectedChar {
        /// The character that was expected.
        expected: char,
        /// The character that was found.
        found: char,
    },

    /// Unknown type marker.
    #[error("unknown type marker '{0}'")]
    UnknownType(char),

    /// Invalid integer value.
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Invalid length or count prefix.
    #[error("invalid length: {0}")]
    InvalidLength(String),

    /// Invalid float value.
    #[error("invalid float: {0}")]
    InvalidFloat(String),

    /// Invalid boolean value.
    #[error("invalid boolean value: {0}")]
    InvalidBoolean(String),

    /// Fewer payload bytes were available than the length prefix declared.
    #[error("string length mismatch: expected {expected}, found {found}")]
    StringLengthMismatch {
        /// The declared length in bytes.
        expected: usize,
        /// The number of bytes actually available.
        found: usize,
    },

    /// Class name is not valid UTF-8.
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,

    /// Array key was neither an integer nor a string.
    #[error("invalid array key type: expected string or integer, found {0}")]
    InvalidArrayKey(&'static str),

    /// Nesting depth exceeded.
    #[error("maximum nesting depth ({0}) exceeded")]
    MaxDepthExceeded(usize),

    /// The object-construction hook rejected a decoded object.
    #[error("object hook failed: {0}")]
    ObjectHook(String),

    /// The underlying source failed for a reason other than end of input.
    #[error("read failed: {message}")]
    Io {
        /// The kind reported by the source.
        kind: io::ErrorKind,
        /// The source's error message.
        message: String,
    },
}

impl MalformedInputError {
    /// Create a new error with the given kind and position.
    #[inline]
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            context: None,
            input_preview: None,
        }
    }

    /// Add context to the error.
    #[inline]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add input preview around the error position for debugging.
    ///
    /// `window` is the input surrounding the error and `offset` the index of
    /// the offending byte inside it.
    #[cold]
    pub fn with_input_preview(mut self, window: &[u8], offset: usize) -> Self {
        if window.is_empty() {
            return self;
        }
        let prefix = &window[..offset.min(window.len())];
        let caret = prefix.to_str_lossy().chars().count();

        let mut result = window.to_str_lossy().into_owned();
        result.push('\n');
        result.push_str(&" ".repeat(caret));
        result.push('^');

        self.input_preview = Some(result);
        self
    }

    /// Whether decoding failed because the input ended early.
    pub fn is_eof(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::UnexpectedEof | ErrorKind::StringLengthMismatch { .. }
        )
    }
}

/// Result type alias for decoding.
pub type Result<T> = std::result::Result<T, MalformedInputError>;

/// The error returned when a value cannot be encoded.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The value has no PHP serialize representation.
    #[error("unsupported type: {type_name}{}", context_suffix(.context))]
    UnsupportedType {
        /// The name of the offending value's type.
        type_name: String,
        /// Where in the value it was found.
        context: Option<String>,
    },

    /// Nesting depth exceeded.
    #[error("maximum nesting depth ({0}) exceeded")]
    MaxDepthExceeded(usize),

    /// A `Serialize` implementation reported an error.
    #[error("{0}")]
    Custom(String),

    /// The sink failed.
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

impl EncodeError {
    /// Create an unsupported type error for the named type.
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        EncodeError::UnsupportedType {
            type_name: type_name.into(),
            context: None,
        }
    }

    /// Add context to an unsupported type error. Other variants are returned unchanged.
    pub fn with_context(self, ctx: impl Into<String>) -> Self {
        match self {
            EncodeError::UnsupportedType { type_name, .. } => EncodeError::UnsupportedType {
                type_name,
                context: Some(ctx.into()),
            },
            other => other,
        }
    }
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(ctx) => format!(" ({})", ctx),
        None => String::new(),
    }
}
