//! JSON number grammar: reading a validated literal span into a concrete
//! Rust numeric type, and writing one back out.
//!
//! The reader only validates grammar and hands back a raw `&str`/`String`
//! span (`NumberLiteral`); turning that into a value is deferred here so a
//! caller that only wants an integer never pays for a float parse.

use crate::error::{FormatError, ParserError, ParserErrorKind, Position};
use crate::reader::NumberLiteral;
use crate::symbol::Symbol;
use crate::writer::Writer;
use bigdecimal::BigDecimal;
use std::cmp::Ordering;
use std::str::FromStr;

/// The dynamic numeric representation used by `Value`. Concrete
/// member types (`i32`, `f64`, ...) bypass this entirely and convert from
/// `NumberLiteral` directly.
#[derive(Debug, Clone)]
pub enum Number {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Decimal(BigDecimal),
}

impl Number {
    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Unsigned(n) => *n as f64,
            Number::Signed(n) => *n as f64,
            Number::Float(n) => *n,
            Number::Decimal(n) => n.to_string().parse().unwrap_or(f64::NAN),
        }
    }

    /// Parses a reader-validated number literal into the narrowest
    /// representation that holds it: unsigned if non-negative and it fits,
    /// signed if negative and it fits, float otherwise.
    pub fn from_literal(lit: &NumberLiteral<'_>, pos: Position) -> Result<Number, ParserError> {
        let text = lit.text.as_str();
        if lit.is_float {
            return text
                .parse::<f64>()
                .map(Number::Float)
                .map_err(|_| ParserError::new(ParserErrorKind::InvalidNumber, pos));
        }
        if let Some(rest) = text.strip_prefix('-') {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Number::Signed(n));
            }
            let _ = rest;
            return text
                .parse::<f64>()
                .map(Number::Float)
                .map_err(|_| ParserError::new(ParserErrorKind::InvalidNumber, pos));
        }
        if let Ok(n) = text.parse::<u64>() {
            return Ok(Number::Unsigned(n));
        }
        text.parse::<f64>()
            .map(Number::Float)
            .map_err(|_| ParserError::new(ParserErrorKind::InvalidNumber, pos))
    }

    pub fn write<S: Symbol + crate::writer::Pooled>(&self, w: &mut Writer<S>) -> Result<(), FormatError> {
        match self {
            Number::Unsigned(n) => w.write_verbatim(n.to_string().as_bytes()),
            Number::Signed(n) => w.write_verbatim(n.to_string().as_bytes()),
            Number::Float(n) => write_float(w, *n)?,
            Number::Decimal(n) => w.write_verbatim(n.to_string().as_bytes()),
        }
        Ok(())
    }
}

/// Parses a reader-validated literal as an arbitrary-precision decimal,
/// preserving every significant digit the literal carried.
pub fn decimal_from_literal(lit: &NumberLiteral<'_>, pos: Position) -> Result<BigDecimal, ParserError> {
    BigDecimal::from_str(lit.text.as_str()).map_err(|_| ParserError::new(ParserErrorKind::InvalidNumber, pos))
}

pub fn write_decimal<S: Symbol + crate::writer::Pooled>(w: &mut Writer<S>, d: &BigDecimal) {
    w.write_verbatim(d.to_string().as_bytes());
}

/// Writes a finite `f64` using Rust's shortest-round-trip `Debug`
/// formatting, which (unlike `Display`) always includes a decimal point or
/// exponent so the emitted literal can't be mistaken for an integer.
fn write_float<S: Symbol + crate::writer::Pooled>(w: &mut Writer<S>, n: f64) -> Result<(), FormatError> {
    if !n.is_finite() {
        return Err(FormatError::NonFiniteFloat);
    }
    if n == 0.0 {
        w.write_verbatim(b"0.0");
        return Ok(());
    }
    w.write_verbatim(format!("{:?}", n).as_bytes());
    Ok(())
}

fn f64_cmp(lhs: f64, rhs: f64) -> Ordering {
    lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal)
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Unsigned(a), Number::Unsigned(b)) => a == b,
            (Number::Signed(a), Number::Signed(b)) => a == b,
            (Number::Decimal(a), Number::Decimal(b)) => a == b,
            _ => f64_cmp(self.as_f64(), other.as_f64()) == Ordering::Equal,
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Unsigned(a), Number::Unsigned(b)) => Some(a.cmp(b)),
            (Number::Signed(a), Number::Signed(b)) => Some(a.cmp(b)),
            (Number::Decimal(a), Number::Decimal(b)) => a.partial_cmp(b),
            _ => Some(f64_cmp(self.as_f64(), other.as_f64())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Text;

    fn lit(s: &'static str, is_float: bool) -> NumberLiteral<'static> {
        NumberLiteral { text: Text::Borrowed(s), is_float }
    }

    #[test]
    fn parses_unsigned_signed_and_float() {
        assert_eq!(Number::from_literal(&lit("42", false), Position::default()).unwrap(), Number::Unsigned(42));
        assert_eq!(Number::from_literal(&lit("-42", false), Position::default()).unwrap(), Number::Signed(-42));
        assert!(matches!(Number::from_literal(&lit("1.5", true), Position::default()).unwrap(), Number::Float(f) if f == 1.5));
    }

    #[test]
    fn min_i64_round_trips() {
        let n = Number::from_literal(&lit("-9223372036854775808", false), Position::default()).unwrap();
        assert_eq!(n, Number::Signed(i64::MIN));
        let mut w = Writer::<u8>::new();
        n.write(&mut w).unwrap();
        assert_eq!(w.finalize_string(), "-9223372036854775808");
    }

    #[test]
    fn huge_unsigned_literal_does_not_overflow_i64() {
        let n = Number::from_literal(&lit("18446744073709551615", false), Position::default()).unwrap();
        assert_eq!(n, Number::Unsigned(u64::MAX));
    }

    #[test]
    fn rejects_non_finite_float_on_write() {
        let mut w = Writer::<u8>::new();
        let err = Number::Float(f64::NAN).write(&mut w).unwrap_err();
        assert!(matches!(err, FormatError::NonFiniteFloat));
    }

    #[test]
    fn decimal_preserves_precision() {
        let d = decimal_from_literal(&lit("1.00000000000000000000000001", true), Position::default()).unwrap();
        assert_eq!(d.to_string(), "1.00000000000000000000000001");
    }
}
