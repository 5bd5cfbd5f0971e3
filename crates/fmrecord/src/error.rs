//! Error types for fmrecord

use std::fmt;
use thiserror::Error;

/// Position in source document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in the source document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }
}

/// Categorized XML syntax failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlErrorKind {
    UnexpectedEof,
    InvalidToken,
    InvalidName,
    InvalidEntity,
    InvalidUtf8,
    MismatchedTag { expected: String, found: String },
    UnexpectedClosingTag { name: String },
    DuplicateAttribute { name: String },
    TrailingContent,
    NoRootElement,
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
}

impl fmt::Display for XmlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::InvalidName => write!(f, "invalid name"),
            Self::InvalidEntity => write!(f, "invalid xml entity"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "expected </{expected}>, found </{found}>")
            }
            Self::UnexpectedClosingTag { name } => write!(f, "unexpected closing tag </{name}>"),
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::TrailingContent => write!(f, "content after the root element"),
            Self::NoRootElement => write!(f, "document has no root element"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
        }
    }
}

/// Main error type for fmrecord
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    /// Malformed document; never retried
    #[error("xml error at {}: {message}", .span.start)]
    XmlParse {
        kind: XmlErrorKind,
        span: Span,
        message: String,
    },

    /// Nonzero status reported by the server
    #[error("server returned error code {code}")]
    Server { code: i64 },

    /// A value was rejected by a field's coercion, bounds or validators
    #[error("\"{value}\" is an invalid value for {field} ({kind}): {reason}")]
    FieldValidation {
        field: String,
        kind: &'static str,
        value: String,
        reason: String,
    },

    /// Invalid schema or field declaration
    #[error("schema error: {0}")]
    Schema(String),

    #[error("{model} has no field named {field}")]
    UnknownField { model: String, field: String },

    #[error("cannot compare {0}")]
    Incomparable(String),

    /// Remote file or storage failure
    #[error("file error: {0}")]
    File(String),

    /// Failure reported by an export destination
    #[error("export error: {0}")]
    Export(String),
}

impl Error {
    pub fn xml(kind: XmlErrorKind, pos: Pos) -> Self {
        let message = kind.to_string();
        Self::XmlParse {
            kind,
            span: Span::at(pos),
            message,
        }
    }

    pub fn xml_with_message(kind: XmlErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self::XmlParse {
            kind,
            span,
            message: message.into(),
        }
    }

    pub const fn server(code: i64) -> Self {
        Self::Server { code }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// The server status code, if this is a server error
    pub const fn server_code(&self) -> Option<i64> {
        match self {
            Self::Server { code } => Some(*code),
            _ => None,
        }
    }

    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::FieldValidation { .. })
    }

    /// Name of the offending field for validation errors
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::FieldValidation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type alias for fmrecord
pub type Result<T> = std::result::Result<T, Error>;
