//! Forward-only, zero-copy (on the UTF-8 lane) JSON token scanner.
//!
//! The bulk of the grammar (whitespace, numbers, `true`/`false`/`null`,
//! comments, structural characters) is lane-generic: every comparison is
//! against an ASCII code point via `Symbol::as_u32`, which is valid
//! regardless of whether a symbol is a UTF-8 byte or a UTF-16 code unit.
//! Only string-content materialization differs by lane (the u8 lane can
//! slice directly into the source; the u16 lane must convert), so that
//! piece is factored into the `LaneOps` trait and implemented once per
//! lane in `lane.rs`.

mod bitstack;
mod lane;

pub use bitstack::BitStack;
pub use lane::LaneOps;

use crate::error::{ParserError, ParserErrorKind, Position, TokenOutcome, TokenResult};
use crate::symbol::Symbol;

/// How the reader treats `//` and `/* */` comments, which RFC 8259 does not
/// permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommentHandling {
    #[default]
    Disallow,
    Skip,
    Preserve,
}

#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    pub comment_handling: CommentHandling,
    pub allow_trailing_commas: bool,
    pub max_depth: u32,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            comment_handling: CommentHandling::Disallow,
            allow_trailing_commas: false,
            max_depth: crate::depth::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Either a zero-copy slice of the source or an owned, decoded string.
/// Strings take the `Owned` path whenever they contain an escape (any
/// lane) or whenever the source lane isn't UTF-8 (since `&[u16]` can't be
/// reinterpreted as `&str`).
#[derive(Debug, Clone, PartialEq)]
pub enum Text<'a> {
    Borrowed(&'a str),
    Owned(String),
}

impl<'a> Text<'a> {
    pub fn as_str(&self) -> &str {
        match self {
            Text::Borrowed(s) => s,
            Text::Owned(s) => s.as_str(),
        }
    }

    pub fn into_owned(self) -> String {
        match self {
            Text::Borrowed(s) => s.to_string(),
            Text::Owned(s) => s,
        }
    }
}

/// A validated, not-yet-converted number literal. The reader only checks
/// grammar; turning `text` into a concrete `i64`/`f64`/`Decimal` is
/// `codec::number`'s job; deferring that lets an integer-typed member skip
/// float parsing entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral<'a> {
    pub text: Text<'a>,
    pub is_float: bool,
}

/// A single raw tokenization event, used by `skip_value` and by
/// `next_raw_checked` (the segmented-reader demonstration). The composite
/// generator, which knows its own grammar position, instead calls the more
/// specific `read_begin_object`/`read_property_name`/... methods below.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Str(Text<'a>),
    Number(NumberLiteral<'a>),
    Bool(bool),
    Null,
    Comment(Text<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TokenKind {
    #[default]
    None,
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    PropertyName,
    String,
    Number,
    True,
    False,
    Null,
    Comment,
}

#[derive(Debug, Clone)]
struct FrameState {
    is_object: bool,
    seen_item: bool,
}

/// Snapshot of all mutable reader state, used to roll back a partially
/// consumed token when the segmented reader runs out of input mid-token.
#[derive(Debug, Clone)]
struct Snapshot {
    pos: usize,
    line: u32,
    byte_in_line: u32,
    bits: BitStack,
    frames: Vec<FrameState>,
    last_token: TokenKind,
}

pub struct Reader<'a, S: Symbol> {
    input: &'a [S],
    pos: usize,
    base_offset: usize,
    line: u32,
    byte_in_line: u32,
    bits: BitStack,
    frames: Vec<FrameState>,
    options: ReaderOptions,
    last_token: TokenKind,
    is_final: bool,
}

/// Carries line/column/depth/frame state across a segment boundary; handed
/// back by `Reader::into_state` and consumed by `Reader::resume`.
#[derive(Debug, Clone)]
pub struct ReaderState {
    base_offset: usize,
    line: u32,
    byte_in_line: u32,
    bits: BitStack,
    frames: Vec<FrameState>,
    last_token: TokenKind,
}

impl<'a, S: Symbol + LaneOps> Reader<'a, S> {
    pub fn new(input: &'a [S]) -> Result<Self, ParserError> {
        Self::with_options(input, ReaderOptions::default())
    }

    pub fn with_options(input: &'a [S], options: ReaderOptions) -> Result<Self, ParserError> {
        if S::has_bom(input) {
            return Err(ParserError::new(
                ParserErrorKind::UnexpectedBom,
                Position::default(),
            ));
        }
        Ok(Reader {
            input,
            pos: 0,
            base_offset: 0,
            line: 1,
            byte_in_line: 0,
            bits: BitStack::new(),
            frames: Vec::new(),
            options,
            last_token: TokenKind::None,
            is_final: true,
        })
    }

    /// Constructs a non-final (segmented) reader, which reports
    /// `Incomplete` instead of an end-of-input error.
    pub fn new_segment(input: &'a [S], is_final: bool) -> Result<Self, ParserError> {
        let mut r = Self::new(input)?;
        r.is_final = is_final;
        Ok(r)
    }

    pub fn resume(state: ReaderState, input: &'a [S], is_final: bool) -> Self {
        Reader {
            input,
            pos: 0,
            base_offset: state.base_offset,
            line: state.line,
            byte_in_line: state.byte_in_line,
            bits: state.bits,
            frames: state.frames,
            options: ReaderOptions::default(),
            last_token: state.last_token,
            is_final,
        }
    }

    pub fn into_state(&self) -> ReaderState {
        ReaderState {
            base_offset: self.base_offset + self.pos,
            line: self.line,
            byte_in_line: self.byte_in_line,
            bits: self.bits.clone(),
            frames: self.frames.clone(),
            last_token: self.last_token,
        }
    }

    pub fn depth(&self) -> usize {
        self.bits.depth()
    }

    /// Charges one extra unit against the same depth pool
    /// `read_begin_object`/`read_begin_array` draw from, for
    /// recursion-candidate types whose own container nesting shouldn't be
    /// the only thing bounding how deep they can recurse.
    pub fn enter_recursion_guard(&mut self) -> Result<(), ParserError> {
        if self.bits.depth() + 1 > self.options.max_depth as usize {
            return Err(self.err(ParserErrorKind::DepthExceeded {
                depth: self.bits.depth() as u32 + 1,
                max: self.options.max_depth,
            }));
        }
        self.bits.push(true);
        Ok(())
    }

    pub fn exit_recursion_guard(&mut self) {
        self.bits.pop();
    }

    pub fn position(&self) -> Position {
        Position {
            offset: self.base_offset + self.pos,
            line: self.line,
            byte_in_line: self.byte_in_line,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.pos,
            line: self.line,
            byte_in_line: self.byte_in_line,
            bits: self.bits.clone(),
            frames: self.frames.clone(),
            last_token: self.last_token,
        }
    }

    fn restore(&mut self, s: Snapshot) {
        self.pos = s.pos;
        self.line = s.line;
        self.byte_in_line = s.byte_in_line;
        self.bits = s.bits;
        self.frames = s.frames;
        self.last_token = s.last_token;
    }

    fn err(&self, kind: ParserErrorKind) -> ParserError {
        ParserError::new(kind, self.position())
    }

    fn eof(&self) -> ParserError {
        self.err(ParserErrorKind::UnexpectedEof)
    }

    /// Position as if `self.pos` were `idx`. Used by `LaneOps::scan_string`,
    /// which advances its own local cursor before committing it back via
    /// `advance_to`. Strings can't contain a raw newline (the control-byte
    /// check rejects one before we'd get here), so no line is ever crossed
    /// mid-scan.
    fn position_at(&self, idx: usize) -> Position {
        Position {
            offset: self.base_offset + idx,
            line: self.line,
            byte_in_line: self.byte_in_line + ((idx - self.pos) as u32) * S::WIDTH as u32,
        }
    }

    /// Commits a lane scanner's local cursor back into reader state.
    fn advance_to(&mut self, new_pos: usize) {
        self.byte_in_line += ((new_pos - self.pos) as u32) * S::WIDTH as u32;
        self.pos = new_pos;
    }

    #[inline]
    fn peek_raw(&self) -> Option<S> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    fn advance_one(&mut self) {
        if self.peek_raw().map(|s| s.as_u32()) == Some('\n' as u32) {
            self.line += 1;
            self.byte_in_line = 0;
        } else {
            self.byte_in_line += S::WIDTH as u32;
        }
        self.pos += 1;
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.advance_one();
        }
    }

    /// Consumes whitespace and, per `self.options.comment_handling`,
    /// comments. Returns the last comment's text when `Preserve` mode
    /// surfaces one the caller should act on; most callers ignore it.
    fn skip_ws_and_comments(&mut self) -> Result<Option<Text<'a>>, ParserError> {
        loop {
            while let Some(c) = self.peek_raw() {
                match c.as_u32() {
                    0x20 | 0x09 | 0x0d | 0x0a => self.advance_one(),
                    _ => break,
                }
            }
            match self.peek_raw().map(|s| s.as_u32()) {
                Some(c) if c == '/' as u32 => {
                    match self.options.comment_handling {
                        CommentHandling::Disallow => return Err(self.err(ParserErrorKind::CommentsDisallowed)),
                        CommentHandling::Skip => {
                            self.consume_comment()?;
                            continue;
                        }
                        CommentHandling::Preserve => {
                            return Ok(Some(self.consume_comment()?));
                        }
                    }
                }
                _ => return Ok(None),
            }
        }
    }

    fn consume_comment(&mut self) -> Result<Text<'a>, ParserError> {
        let start = self.pos;
        self.advance_one(); // '/'
        match self.peek_raw().map(|s| s.as_u32()) {
            Some(c) if c == '/' as u32 => {
                self.advance_one();
                while let Some(c) = self.peek_raw() {
                    if c.as_u32() == '\n' as u32 {
                        break;
                    }
                    self.advance_one();
                }
            }
            Some(c) if c == '*' as u32 => {
                self.advance_one();
                loop {
                    match self.peek_raw().map(|s| s.as_u32()) {
                        None => return Err(self.eof()),
                        Some(c) if c == '*' as u32 => {
                            self.advance_one();
                            if self.peek_raw().map(|s| s.as_u32()) == Some('/' as u32) {
                                self.advance_one();
                                break;
                            }
                        }
                        Some(_) => self.advance_one(),
                    }
                }
            }
            _ => return Err(self.err(ParserErrorKind::Unexpected("'/' or '*' to start a comment"))),
        }
        Ok(S::ascii_text(self.input, start, self.pos))
    }

    fn expect_ascii(&mut self, b: u8) -> Result<(), ParserError> {
        match self.peek_raw() {
            Some(s) if s.as_u32() == b as u32 => {
                self.advance_one();
                Ok(())
            }
            Some(_) => Err(self.err(ParserErrorKind::Unexpected("a different character"))),
            None => Err(self.eof()),
        }
    }

    // ---- object grammar ----

    pub fn read_begin_object(&mut self) -> Result<(), ParserError> {
        self.skip_ws_and_comments()?;
        self.expect_ascii(b'{')?;
        if self.bits.depth() + 1 > self.options.max_depth as usize {
            return Err(self.err(ParserErrorKind::DepthExceeded {
                depth: self.bits.depth() as u32 + 1,
                max: self.options.max_depth,
            }));
        }
        self.bits.push(true);
        self.frames.push(FrameState { is_object: true, seen_item: false });
        self.last_token = TokenKind::BeginObject;
        Ok(())
    }

    /// Returns `true` if the object ended (consuming `}`); `false` if a
    /// comma was consumed and the caller should read another property.
    pub fn read_end_object_or_comma(&mut self) -> Result<bool, ParserError> {
        self.skip_ws_and_comments()?;
        let frame = self.frames.last().expect("read_end_object_or_comma called outside an object");
        match self.peek_raw().map(|s| s.as_u32()) {
            Some(c) if c == '}' as u32 => {
                self.close_container(true)?;
                Ok(true)
            }
            Some(c) if c == ',' as u32 && frame.seen_item => {
                self.advance_one();
                self.skip_ws_and_comments()?;
                if self.peek_raw().map(|s| s.as_u32()) == Some('}' as u32) {
                    if !self.options.allow_trailing_commas {
                        return Err(self.err(ParserErrorKind::TrailingComma));
                    }
                    self.close_container(true)?;
                    return Ok(true);
                }
                self.last_token = TokenKind::None;
                Ok(false)
            }
            Some(_) => Err(self.err(ParserErrorKind::Unexpected("',' or '}'"))),
            None => Err(self.eof()),
        }
    }

    pub fn read_property_name(&mut self) -> Result<Text<'a>, ParserError> {
        self.skip_ws_and_comments()?;
        self.expect_ascii(b'"')?;
        let name = S::scan_string(self)?;
        self.last_token = TokenKind::PropertyName;
        self.frames.last_mut().unwrap().seen_item = true;
        self.skip_ws_and_comments()?;
        self.expect_ascii(b':')?;
        Ok(name)
    }

    // ---- array grammar ----

    pub fn read_begin_array(&mut self) -> Result<(), ParserError> {
        self.skip_ws_and_comments()?;
        self.expect_ascii(b'[')?;
        if self.bits.depth() + 1 > self.options.max_depth as usize {
            return Err(self.err(ParserErrorKind::DepthExceeded {
                depth: self.bits.depth() as u32 + 1,
                max: self.options.max_depth,
            }));
        }
        self.bits.push(false);
        self.frames.push(FrameState { is_object: false, seen_item: false });
        self.last_token = TokenKind::BeginArray;
        Ok(())
    }

    /// Peeks whether the array is empty or already closed, without
    /// requiring a preceding comma. Call before reading the first element.
    pub fn peek_end_array(&mut self) -> Result<bool, ParserError> {
        self.skip_ws_and_comments()?;
        Ok(self.peek_raw().map(|s| s.as_u32()) == Some(']' as u32))
    }

    /// Peeks whether the object is empty or already closed, without
    /// requiring a preceding comma. Call before reading the first member.
    pub fn peek_end_object(&mut self) -> Result<bool, ParserError> {
        self.skip_ws_and_comments()?;
        Ok(self.peek_raw().map(|s| s.as_u32()) == Some('}' as u32))
    }

    pub fn read_end_array_or_comma(&mut self) -> Result<bool, ParserError> {
        self.skip_ws_and_comments()?;
        let frame = self.frames.last().expect("read_end_array_or_comma called outside an array");
        match self.peek_raw().map(|s| s.as_u32()) {
            Some(c) if c == ']' as u32 => {
                self.close_container(false)?;
                Ok(true)
            }
            Some(c) if c == ',' as u32 && frame.seen_item => {
                self.advance_one();
                self.skip_ws_and_comments()?;
                if self.peek_raw().map(|s| s.as_u32()) == Some(']' as u32) {
                    if !self.options.allow_trailing_commas {
                        return Err(self.err(ParserErrorKind::TrailingComma));
                    }
                    self.close_container(false)?;
                    return Ok(true);
                }
                Ok(false)
            }
            Some(_) => Err(self.err(ParserErrorKind::Unexpected("',' or ']'"))),
            None => Err(self.eof()),
        }
    }

    fn close_container(&mut self, is_object: bool) -> Result<(), ParserError> {
        match self.bits.pop() {
            Some(found) if found == is_object => {
                self.advance_one();
                self.frames.pop();
                self.last_token = if is_object { TokenKind::EndObject } else { TokenKind::EndArray };
                Ok(())
            }
            Some(_) | None => Err(self.err(ParserErrorKind::MismatchedContainer)),
        }
    }

    /// Marks that an item was read in the innermost (array) frame, so the
    /// next `,`/`]` decision knows a comma is now required before another.
    fn note_item_read(&mut self) {
        if let Some(f) = self.frames.last_mut() {
            if !f.is_object {
                f.seen_item = true;
            }
        }
    }

    // ---- values ----

    /// Reads one JSON value (scalar or the opening token of a composite).
    /// The caller recurses for `BeginObject`/`BeginArray`.
    pub fn read_value_token(&mut self) -> Result<Event<'a>, ParserError> {
        self.skip_ws_and_comments()?;
        let ev = match self.peek_raw().map(|s| s.as_u32()) {
            Some(c) if c == '{' as u32 => {
                self.read_begin_object()?;
                return Ok(Event::BeginObject);
            }
            Some(c) if c == '[' as u32 => {
                self.read_begin_array()?;
                return Ok(Event::BeginArray);
            }
            Some(c) if c == '"' as u32 => {
                self.advance_one();
                let s = S::scan_string(self)?;
                self.last_token = TokenKind::String;
                Event::Str(s)
            }
            Some(c) if c == 't' as u32 => {
                self.match_literal(b"true")?;
                self.last_token = TokenKind::True;
                Event::Bool(true)
            }
            Some(c) if c == 'f' as u32 => {
                self.match_literal(b"false")?;
                self.last_token = TokenKind::False;
                Event::Bool(false)
            }
            Some(c) if c == 'n' as u32 => {
                self.match_literal(b"null")?;
                self.last_token = TokenKind::Null;
                Event::Null
            }
            Some(c) if c == '-' as u32 || (b'0'..=b'9').contains(&(c as u8)) && c < 0x80 => {
                let lit = self.scan_number()?;
                self.last_token = TokenKind::Number;
                Event::Number(lit)
            }
            Some(_) => return Err(self.err(ParserErrorKind::Unexpected("a JSON value"))),
            None => return Err(self.eof()),
        };
        self.note_item_read();
        Ok(ev)
    }

    fn match_literal(&mut self, lit: &'static [u8]) -> Result<(), ParserError> {
        for &expected in lit {
            match self.peek_raw() {
                Some(s) if s.as_u32() == expected as u32 => self.advance_one(),
                Some(_) => return Err(self.err(ParserErrorKind::UnknownLiteral)),
                None => return Err(self.eof()),
            }
        }
        Ok(())
    }

    fn scan_number(&mut self) -> Result<NumberLiteral<'a>, ParserError> {
        let start = self.pos;
        let mut is_float = false;

        if self.peek_raw().map(|s| s.as_u32()) == Some('-' as u32) {
            self.advance_one();
        }
        match self.peek_raw().map(|s| s.as_u32()) {
            Some(c) if c == '0' as u32 => {
                self.advance_one();
                if let Some(c) = self.peek_raw().map(|s| s.as_u32()) {
                    if (b'0'..=b'9').contains(&(c as u8)) && c < 0x80 {
                        return Err(self.err(ParserErrorKind::InvalidNumber));
                    }
                }
            }
            Some(c) if (b'1'..=b'9').contains(&(c as u8)) && c < 0x80 => {
                self.advance_one();
                while let Some(c) = self.peek_raw().map(|s| s.as_u32()) {
                    if (b'0'..=b'9').contains(&(c as u8)) && c < 0x80 {
                        self.advance_one();
                    } else {
                        break;
                    }
                }
            }
            Some(_) => return Err(self.err(ParserErrorKind::InvalidNumber)),
            None => return Err(self.eof()),
        }
        if self.peek_raw().map(|s| s.as_u32()) == Some('.' as u32) {
            is_float = true;
            self.advance_one();
            let digit_start = self.pos;
            while let Some(c) = self.peek_raw().map(|s| s.as_u32()) {
                if (b'0'..=b'9').contains(&(c as u8)) && c < 0x80 {
                    self.advance_one();
                } else {
                    break;
                }
            }
            if self.pos == digit_start {
                return Err(self.err(ParserErrorKind::InvalidNumber));
            }
        }
        if let Some(c) = self.peek_raw().map(|s| s.as_u32()) {
            if c == 'e' as u32 || c == 'E' as u32 {
                is_float = true;
                self.advance_one();
                if let Some(c) = self.peek_raw().map(|s| s.as_u32()) {
                    if c == '+' as u32 || c == '-' as u32 {
                        self.advance_one();
                    }
                }
                let digit_start = self.pos;
                while let Some(c) = self.peek_raw().map(|s| s.as_u32()) {
                    if (b'0'..=b'9').contains(&(c as u8)) && c < 0x80 {
                        self.advance_one();
                    } else {
                        break;
                    }
                }
                if self.pos == digit_start {
                    return Err(self.err(ParserErrorKind::InvalidNumber));
                }
            }
        }

        Ok(NumberLiteral {
            text: S::ascii_text(self.input, start, self.pos),
            is_float,
        })
    }

    /// Advances past an entire value -- a primitive token, or a container
    /// and everything inside it -- without materializing it.
    pub fn skip_value(&mut self) -> Result<(), ParserError> {
        match self.read_value_token()? {
            Event::BeginObject => {
                if !self.peek_raw().is_some() {
                    return Err(self.eof());
                }
                loop {
                    self.skip_ws_and_comments()?;
                    if self.peek_raw().map(|s| s.as_u32()) == Some('}' as u32) {
                        self.close_container(true)?;
                        break;
                    }
                    let _ = self.read_property_name()?;
                    self.skip_value()?;
                    if self.read_end_object_or_comma()? {
                        break;
                    }
                }
            }
            Event::BeginArray => {
                if self.peek_end_array()? {
                    self.close_container(false)?;
                } else {
                    loop {
                        self.skip_value()?;
                        if self.read_end_array_or_comma()? {
                            break;
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Tokenizes exactly one raw event, rolling back and reporting
    /// `Incomplete` if this is a non-final segment and the event is only
    /// partially present. The composite generator uses the more specific
    /// methods above instead, which assume a fully buffered document.
    pub fn next_raw_checked(&mut self) -> TokenResult<Event<'a>> {
        let snap = self.snapshot();
        match self.read_value_token() {
            Ok(ev) => Ok(ev),
            Err(e) if !self.is_final && e.kind == ParserErrorKind::UnexpectedEof => {
                self.restore(snap);
                Err(TokenOutcome::Incomplete)
            }
            Err(e) => Err(TokenOutcome::Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_values(json: &str) -> Vec<Event<'static>> {
        let leaked: &'static str = Box::leak(json.to_string().into_boxed_str());
        let mut r = Reader::<u8>::new(leaked.as_bytes()).unwrap();
        let mut out = Vec::new();
        out.push(r.read_value_token().unwrap());
        out
    }

    #[test]
    fn reads_scalars() {
        assert_eq!(read_values("true")[0], Event::Bool(true));
        assert_eq!(read_values("null")[0], Event::Null);
        assert!(matches!(read_values("\"hi\"")[0], Event::Str(_)));
        assert!(matches!(read_values("1.5e10")[0], Event::Number(NumberLiteral { is_float: true, .. })));
    }

    #[test]
    fn rejects_leading_zero() {
        let mut r = Reader::<u8>::new(b"01").unwrap();
        assert!(r.read_value_token().is_err());
    }

    #[test]
    fn rejects_bare_dot() {
        let mut r = Reader::<u8>::new(b".5").unwrap();
        assert!(r.read_value_token().is_err());
    }

    #[test]
    fn object_round_trip_tokens() {
        let mut r = Reader::<u8>::new(br#"{"a":1,"b":2}"#).unwrap();
        r.read_begin_object().unwrap();
        assert_eq!(r.read_property_name().unwrap().as_str(), "a");
        assert_eq!(r.read_value_token().unwrap(), Event::Number(NumberLiteral { text: Text::Borrowed("1"), is_float: false }));
        assert!(!r.read_end_object_or_comma().unwrap());
        assert_eq!(r.read_property_name().unwrap().as_str(), "b");
        let _ = r.read_value_token().unwrap();
        assert!(r.read_end_object_or_comma().unwrap());
    }

    #[test]
    fn depth_exceeded_at_65_nested_arrays() {
        let json = "[".repeat(65) + &"]".repeat(65);
        let mut r = Reader::<u8>::new(json.as_bytes()).unwrap();
        let mut err = None;
        for _ in 0..65 {
            if let Err(e) = r.read_begin_array() {
                err = Some(e);
                break;
            }
        }
        assert!(matches!(err.unwrap().kind, ParserErrorKind::DepthExceeded { .. }));
    }

    #[test]
    fn trailing_comma_rejected_by_default() {
        let mut r = Reader::<u8>::new(b"[1,]").unwrap();
        r.read_begin_array().unwrap();
        let _ = r.read_value_token().unwrap();
        assert!(r.read_end_array_or_comma().is_err());
    }

    #[test]
    fn trailing_comma_allowed_when_enabled() {
        let mut opts = ReaderOptions::default();
        opts.allow_trailing_commas = true;
        let mut r = Reader::<u8>::with_options(b"[1,]", opts).unwrap();
        r.read_begin_array().unwrap();
        let _ = r.read_value_token().unwrap();
        assert!(r.read_end_array_or_comma().unwrap());
    }

    #[test]
    fn comments_in_skip_mode() {
        let mut opts = ReaderOptions::default();
        opts.comment_handling = CommentHandling::Skip;
        let json = "/* c */ { /* c */ \"a\" /* c */ : 1 // c\n }";
        let mut r = Reader::<u8>::with_options(json.as_bytes(), opts).unwrap();
        r.read_begin_object().unwrap();
        assert_eq!(r.read_property_name().unwrap().as_str(), "a");
        let _ = r.read_value_token().unwrap();
        assert!(r.read_end_object_or_comma().unwrap());
    }

    #[test]
    fn rejects_byte_order_mark() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"{}");
        let err = Reader::<u8>::new(&bytes).unwrap_err();
        assert_eq!(err.kind, ParserErrorKind::UnexpectedBom);
    }

    #[test]
    fn incomplete_rolls_back() {
        let mut r = Reader::<u8>::new_segment(b"{\"a\":", false).unwrap();
        r.read_begin_object().unwrap();
        let before = r.pos;
        match r.next_raw_checked() {
            Err(TokenOutcome::Incomplete) => {}
            other => panic!("expected Incomplete, got {other:?}"),
        }
        assert_eq!(r.pos, before);
    }
}
