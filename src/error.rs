//! Structured error taxonomy for the codec: a *parser-error* (reader side),
//! a *format-error* (writer side), an *unsupported* class, and the
//! `Incomplete` control signal of the segmented reader.

use crate::pointer::Pointer;
use std::fmt;

/// Byte offset plus line/column, as produced by the segment-aware reader.
/// The non-segmented reader still fills this in -- it just never needs to
/// roll it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub byte_in_line: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, byte {} (offset {})",
            self.line, self.byte_in_line, self.offset
        )
    }
}

/// The JSON value kind a primitive read was attempting to produce, carried
/// by `ParserError` when applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
    Decimal,
    String,
    Bool,
    DateTime,
    TimeSpan,
    Guid,
    Version,
    Uri,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Decimal => "decimal",
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::DateTime => "date-time",
            ValueKind::TimeSpan => "timespan",
            ValueKind::Guid => "guid",
            ValueKind::Version => "version",
            ValueKind::Uri => "uri",
        };
        f.write_str(s)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("unpaired UTF-16 surrogate")]
    UnpairedSurrogate,
    #[error("control character 0x{0:02x} is not allowed inside a string")]
    UnescapedControl(u8),
    #[error("a byte order mark is not permitted at the start of input")]
    UnexpectedBom,
    #[error("mismatched container close")]
    MismatchedContainer,
    #[error("a trailing comma is not allowed here")]
    TrailingComma,
    #[error("nesting depth {depth} exceeds the configured ceiling of {max}")]
    DepthExceeded { depth: u32, max: u32 },
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("invalid literal")]
    UnknownLiteral,
    #[error("comments are not allowed")]
    CommentsDisallowed,
    #[error("expected {0}")]
    Unexpected(&'static str),
    #[error("no member named '{0}' and no extension-data slot to receive it")]
    NoSuchMember(String),
}

/// A parse failure, located by byte position and -- when the failure
/// occurred while materializing a composite member -- by the member path
/// that was being read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub position: Position,
    pub value_kind: Option<ValueKind>,
    pub path: Pointer,
}

impl ParserError {
    pub fn new(kind: ParserErrorKind, position: Position) -> Self {
        ParserError {
            kind,
            position,
            value_kind: None,
            path: Pointer::root(),
        }
    }

    pub fn with_value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = Some(kind);
        self
    }

    pub fn with_path(mut self, path: Pointer) -> Self {
        self.path = path;
        self
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.position)?;
        if let Some(vk) = self.value_kind {
            write!(f, " while parsing a {vk}")?;
        }
        if !self.path.is_root() {
            write!(f, " at '{}'", self.path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParserError {}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    #[error("value is not finite (NaN or +/-infinity) and cannot be written as JSON")]
    NonFiniteFloat,
    #[error("writer nesting depth {depth} exceeds the configured ceiling of {max}")]
    DepthExceeded { depth: u32, max: u32 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedError {
    #[error("symbol width of {0} bytes is not supported; only 1 (UTF-8) and 2 (UTF-16) are")]
    SymbolWidth(usize),
    #[error("'{0}' is abstract and has no recognized collection contract; it cannot be deserialized")]
    AbstractType(&'static str),
}

/// `Incomplete` is the segmented reader's control signal, not an error: it
/// means "this segment ended mid-token, roll back and feed me more bytes."
/// Kept out of `Error` so a caller's `match` over real failure kinds never
/// has to carry a non-error arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incomplete;

pub type TokenResult<T> = Result<T, TokenOutcome>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    Err(ParserError),
    Incomplete,
}

impl From<ParserError> for TokenOutcome {
    fn from(e: ParserError) -> Self {
        TokenOutcome::Err(e)
    }
}

/// Aggregate error returned by the top-level convenience entry points
/// (`to_vec`/`from_slice` and friends in `lib.rs`).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parser(#[from] ParserError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedError),
}
