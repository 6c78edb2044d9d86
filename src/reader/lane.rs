//! The one piece of tokenization that genuinely differs by symbol width:
//! turning a run of symbols between the opening and closing quote into a
//! `Text`. The u8 lane can borrow straight out of the source; the u16 lane
//! always has to build an owned `String`.

use super::{Reader, Text};
use crate::codec::escape::{combine_surrogates, decode_hex4, is_high_surrogate, is_low_surrogate};
use crate::error::{ParserError, ParserErrorKind};
use crate::symbol::Symbol;

pub trait LaneOps: Symbol + Sized {
    fn has_bom(input: &[Self]) -> bool;

    /// Slices out an already-validated, ASCII-only run (a number literal,
    /// a keyword, a comment body) as `Text`.
    fn ascii_text<'a>(input: &'a [Self], start: usize, end: usize) -> Text<'a>;

    /// Scans a string body starting just past the opening `"`, leaving the
    /// reader positioned just past the closing `"`.
    fn scan_string<'a>(r: &mut Reader<'a, Self>) -> Result<Text<'a>, ParserError>;
}

impl LaneOps for u8 {
    fn has_bom(input: &[u8]) -> bool {
        input.starts_with(&[0xEF, 0xBB, 0xBF])
    }

    fn ascii_text<'a>(input: &'a [u8], start: usize, end: usize) -> Text<'a> {
        Text::Borrowed(std::str::from_utf8(&input[start..end]).expect("ascii run is valid utf-8"))
    }

    fn scan_string<'a>(r: &mut Reader<'a, u8>) -> Result<Text<'a>, ParserError> {
        let input = r.input;
        let start = r.pos;
        let mut i = start;
        let mut run_start = start;
        let mut owned: Option<String> = None;

        loop {
            if i >= input.len() {
                return Err(ParserError::new(ParserErrorKind::UnexpectedEof, r.position_at(i)));
            }
            let b = input[i];
            if b == b'"' {
                let text = match owned {
                    Some(mut s) => {
                        s.push_str(utf8_run(input, run_start, i, r)?);
                        Text::Owned(s)
                    }
                    None => Text::Borrowed(utf8_run(input, start, i, r)?),
                };
                r.advance_to(i + 1);
                return Ok(text);
            }
            if b == b'\\' {
                let run = utf8_run(input, run_start, i, r)?.to_string();
                let buf = owned.get_or_insert_with(String::new);
                buf.push_str(&run);
                i += 1;
                if i >= input.len() {
                    return Err(ParserError::new(ParserErrorKind::UnexpectedEof, r.position_at(i)));
                }
                i = apply_escape(input, i, buf, r)?;
                run_start = i;
                continue;
            }
            if b < 0x20 {
                return Err(ParserError::new(ParserErrorKind::UnescapedControl(b), r.position_at(i)));
            }
            i += 1;
        }
    }
}

fn utf8_run<'a>(
    input: &'a [u8],
    start: usize,
    end: usize,
    r: &Reader<'a, u8>,
) -> Result<&'a str, ParserError> {
    std::str::from_utf8(&input[start..end])
        .map_err(|_| ParserError::new(ParserErrorKind::Unexpected("invalid utf-8 in string"), r.position_at(end)))
}

/// Applies the escape sequence starting at `input[i]` (the character right
/// after the backslash), pushing the decoded character(s) onto `buf` and
/// returning the index just past the escape.
fn apply_escape(
    input: &[u8],
    i: usize,
    buf: &mut String,
    r: &Reader<'_, u8>,
) -> Result<usize, ParserError> {
    let esc = input[i];
    match esc {
        b'"' => {
            buf.push('"');
            Ok(i + 1)
        }
        b'\\' => {
            buf.push('\\');
            Ok(i + 1)
        }
        b'/' => {
            buf.push('/');
            Ok(i + 1)
        }
        b'b' => {
            buf.push('\u{8}');
            Ok(i + 1)
        }
        b'f' => {
            buf.push('\u{c}');
            Ok(i + 1)
        }
        b'n' => {
            buf.push('\n');
            Ok(i + 1)
        }
        b'r' => {
            buf.push('\r');
            Ok(i + 1)
        }
        b't' => {
            buf.push('\t');
            Ok(i + 1)
        }
        b'u' => {
            let mut j = i + 1;
            if j + 4 > input.len() {
                return Err(ParserError::new(ParserErrorKind::UnexpectedEof, r.position_at(j)));
            }
            let unit = decode_hex4(&input[j..j + 4], r.position_at(j))?;
            j += 4;
            if is_high_surrogate(unit) {
                if j + 6 > input.len() || input[j] != b'\\' || input[j + 1] != b'u' {
                    return Err(ParserError::new(ParserErrorKind::UnpairedSurrogate, r.position_at(j)));
                }
                let low = decode_hex4(&input[j + 2..j + 6], r.position_at(j))?;
                if !is_low_surrogate(low) {
                    return Err(ParserError::new(ParserErrorKind::UnpairedSurrogate, r.position_at(j)));
                }
                buf.push(combine_surrogates(unit, low));
                Ok(j + 6)
            } else if is_low_surrogate(unit) {
                Err(ParserError::new(ParserErrorKind::UnpairedSurrogate, r.position_at(j)))
            } else {
                buf.push(char::from_u32(unit as u32).expect("non-surrogate code unit is a valid scalar"));
                Ok(j)
            }
        }
        _ => Err(ParserError::new(ParserErrorKind::InvalidEscape, r.position_at(i))),
    }
}

impl LaneOps for u16 {
    fn has_bom(input: &[u16]) -> bool {
        input.first().copied() == Some(0xFEFF)
    }

    fn ascii_text<'a>(input: &'a [u16], start: usize, end: usize) -> Text<'a> {
        let s: String = input[start..end].iter().map(|&u| u as u8 as char).collect();
        Text::Owned(s)
    }

    fn scan_string<'a>(r: &mut Reader<'a, u16>) -> Result<Text<'a>, ParserError> {
        let input = r.input;
        let start = r.pos;
        let mut i = start;
        let mut run_start = start;
        let mut buf = String::new();

        loop {
            if i >= input.len() {
                return Err(ParserError::new(ParserErrorKind::UnexpectedEof, r.position_at(i)));
            }
            let u = input[i];
            if u == b'"' as u16 {
                push_utf16_run(input, run_start, i, &mut buf, r)?;
                r.advance_to(i + 1);
                return Ok(Text::Owned(buf));
            }
            if u == b'\\' as u16 {
                push_utf16_run(input, run_start, i, &mut buf, r)?;
                i += 1;
                if i >= input.len() {
                    return Err(ParserError::new(ParserErrorKind::UnexpectedEof, r.position_at(i)));
                }
                i = apply_escape_wide(input, i, &mut buf, r)?;
                run_start = i;
                continue;
            }
            if u < 0x20 {
                return Err(ParserError::new(ParserErrorKind::UnescapedControl(u as u8), r.position_at(i)));
            }
            i += 1;
        }
    }
}

fn push_utf16_run(
    input: &[u16],
    start: usize,
    end: usize,
    buf: &mut String,
    r: &Reader<'_, u16>,
) -> Result<(), ParserError> {
    let decoded = String::from_utf16(&input[start..end])
        .map_err(|_| ParserError::new(ParserErrorKind::Unexpected("unpaired utf-16 surrogate in string"), r.position_at(end)))?;
    buf.push_str(&decoded);
    Ok(())
}

fn apply_escape_wide(
    input: &[u16],
    i: usize,
    buf: &mut String,
    r: &Reader<'_, u16>,
) -> Result<usize, ParserError> {
    let esc = input[i];
    let esc_byte = if esc <= 0x7f { esc as u8 } else { 0 };
    match esc_byte {
        b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {
            let ch = match esc_byte {
                b'"' => '"',
                b'\\' => '\\',
                b'/' => '/',
                b'b' => '\u{8}',
                b'f' => '\u{c}',
                b'n' => '\n',
                b'r' => '\r',
                b't' => '\t',
                _ => unreachable!(),
            };
            buf.push(ch);
            Ok(i + 1)
        }
        b'u' => {
            let mut j = i + 1;
            if j + 4 > input.len() {
                return Err(ParserError::new(ParserErrorKind::UnexpectedEof, r.position_at(j)));
            }
            let mut hex = [0u8; 4];
            for (k, slot) in hex.iter_mut().enumerate() {
                let unit = input[j + k];
                if unit > 0xff {
                    return Err(ParserError::new(ParserErrorKind::InvalidEscape, r.position_at(j + k)));
                }
                *slot = unit as u8;
            }
            let unit = decode_hex4(&hex, r.position_at(j))?;
            j += 4;
            if is_high_surrogate(unit) {
                if j + 6 > input.len() || input[j] != b'\\' as u16 || input[j + 1] != b'u' as u16 {
                    return Err(ParserError::new(ParserErrorKind::UnpairedSurrogate, r.position_at(j)));
                }
                let mut low_hex = [0u8; 4];
                for (k, slot) in low_hex.iter_mut().enumerate() {
                    let unit = input[j + 2 + k];
                    if unit > 0xff {
                        return Err(ParserError::new(ParserErrorKind::InvalidEscape, r.position_at(j + 2 + k)));
                    }
                    *slot = unit as u8;
                }
                let low = decode_hex4(&low_hex, r.position_at(j))?;
                if !is_low_surrogate(low) {
                    return Err(ParserError::new(ParserErrorKind::UnpairedSurrogate, r.position_at(j)));
                }
                buf.push(combine_surrogates(unit, low));
                Ok(j + 6)
            } else if is_low_surrogate(unit) {
                Err(ParserError::new(ParserErrorKind::UnpairedSurrogate, r.position_at(j)))
            } else {
                buf.push(char::from_u32(unit as u32).expect("non-surrogate code unit is a valid scalar"));
                Ok(j)
            }
        }
        _ => Err(ParserError::new(ParserErrorKind::InvalidEscape, r.position_at(i))),
    }
}
