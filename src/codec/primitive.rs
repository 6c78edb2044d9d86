//! Date/time, timespan, GUID, version, and URI primitive codecs.
//! Each of these rides inside a JSON string, so parsing and
//! formatting operate on plain `&str`/`String` rather than a symbol lane --
//! the lane-generic quoting is handled by the caller via
//! `codec::escape::write_escaped_string` or, since every format here is
//! ASCII-only by construction, a direct quoted `write_verbatim`.

use crate::error::{ParserError, ParserErrorKind, Position, ValueKind};
use crate::symbol::Symbol;
use crate::writer::{Pooled, Writer};
use time::{Date, Month, PrimitiveDateTime, Time, UtcOffset};

fn err(pos: Position, vk: ValueKind, msg: &'static str) -> ParserError {
    ParserError::new(ParserErrorKind::Unexpected(msg), pos).with_value_kind(vk)
}

fn write_quoted<S: Symbol + Pooled>(w: &mut Writer<S>, s: &str) {
    w.write_quote();
    w.write_verbatim(s.as_bytes());
    w.write_quote();
}

// ---------------------------------------------------------------------
// DateTime
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeKind {
    Utc,
    Offset(UtcOffset),
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub primitive: PrimitiveDateTime,
    pub kind: DateTimeKind,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    i: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Cursor { bytes: s.as_bytes(), i: 0 }
    }

    fn take_digits(&mut self, exactly: usize) -> Option<u32> {
        if self.i + exactly > self.bytes.len() {
            return None;
        }
        let mut v: u32 = 0;
        for k in 0..exactly {
            let b = self.bytes[self.i + k];
            if !b.is_ascii_digit() {
                return None;
            }
            v = v * 10 + (b - b'0') as u32;
        }
        self.i += exactly;
        Some(v)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.bytes.get(self.i) == Some(&b) {
            self.i += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.i).copied()
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.i..]
    }
}

/// Parses `YYYY-MM-DDThh:mm[:ss[.fraction]][Z|+-hh:mm]`. Fractional
/// seconds: up to 16 digits accepted, the first 7 (100ns resolution) kept,
/// right-padded with zeros if fewer were given.
pub fn parse_date_time(s: &str, pos: Position) -> Result<DateTime, ParserError> {
    let bad = || err(pos, ValueKind::DateTime, "malformed ISO-8601 date-time");
    let mut c = Cursor::new(s);

    let year = c.take_digits(4).ok_or_else(bad)?;
    if !c.eat(b'-') {
        return Err(bad());
    }
    let month = c.take_digits(2).ok_or_else(bad)?;
    if !c.eat(b'-') {
        return Err(bad());
    }
    let day = c.take_digits(2).ok_or_else(bad)?;
    if !(c.eat(b'T') || c.eat(b't')) {
        return Err(bad());
    }
    let hour = c.take_digits(2).ok_or_else(bad)?;
    if !c.eat(b':') {
        return Err(bad());
    }
    let minute = c.take_digits(2).ok_or_else(bad)?;

    let mut second = 0u32;
    let mut nanosecond = 0u32;
    if c.eat(b':') {
        second = c.take_digits(2).ok_or_else(bad)?;
        if c.eat(b'.') {
            let start = c.i;
            while c.peek().map(|b| b.is_ascii_digit()).unwrap_or(false) {
                c.i += 1;
            }
            let frac = std::str::from_utf8(&c.bytes[start..c.i]).unwrap();
            if frac.is_empty() || frac.len() > 16 {
                return Err(bad());
            }
            let mut seven: String = frac.chars().take(7).collect();
            while seven.len() < 7 {
                seven.push('0');
            }
            let hundred_ns: u32 = seven.parse().map_err(|_| bad())?;
            nanosecond = hundred_ns * 100;
        }
    }

    let kind = match c.peek() {
        None => DateTimeKind::Unspecified,
        Some(b'Z') | Some(b'z') => {
            c.i += 1;
            DateTimeKind::Utc
        }
        Some(b'+') | Some(b'-') => {
            let sign = if c.peek() == Some(b'-') { -1 } else { 1 };
            c.i += 1;
            let oh = c.take_digits(2).ok_or_else(bad)?;
            if !c.eat(b':') {
                return Err(bad());
            }
            let om = c.take_digits(2).ok_or_else(bad)?;
            let total_minutes = sign * (oh as i32 * 60 + om as i32);
            let offset = UtcOffset::from_whole_seconds(total_minutes * 60).map_err(|_| bad())?;
            DateTimeKind::Offset(offset)
        }
        Some(_) => return Err(bad()),
    };
    if !c.rest().is_empty() {
        return Err(bad());
    }

    let month = Month::try_from(month as u8).map_err(|_| bad())?;
    let date = Date::from_calendar_date(year as i32, month, day as u8).map_err(|_| bad())?;
    let time = Time::from_hms_nano(hour as u8, minute as u8, second as u8, nanosecond).map_err(|_| bad())?;
    Ok(DateTime { primitive: PrimitiveDateTime::new(date, time), kind })
}

pub fn format_date_time(dt: &DateTime) -> String {
    let d = dt.primitive.date();
    let t = dt.primitive.time();
    let hundred_ns = t.nanosecond() / 100;
    let mut s = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:07}",
        d.year(),
        u8::from(d.month()),
        d.day(),
        t.hour(),
        t.minute(),
        t.second(),
        hundred_ns
    );
    match dt.kind {
        DateTimeKind::Utc => s.push('Z'),
        DateTimeKind::Unspecified => {}
        DateTimeKind::Offset(o) => {
            let total = o.whole_minutes();
            let sign = if total < 0 { '-' } else { '+' };
            let total = total.abs();
            s.push_str(&format!("{}{:02}:{:02}", sign, total / 60, total % 60));
        }
    }
    s
}

pub fn write_date_time<S: Symbol + Pooled>(w: &mut Writer<S>, dt: &DateTime) {
    write_quoted(w, &format_date_time(dt));
}

// ---------------------------------------------------------------------
// TimeSpan
// ---------------------------------------------------------------------

/// A signed duration in 100ns ticks, matching the grammar
/// `[-][d.]hh:mm:ss[.fffffff]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub ticks: i64,
}

const TICKS_PER_SECOND: i64 = 10_000_000;
const TICKS_PER_MINUTE: i64 = TICKS_PER_SECOND * 60;
const TICKS_PER_HOUR: i64 = TICKS_PER_MINUTE * 60;
const TICKS_PER_DAY: i64 = TICKS_PER_HOUR * 24;

pub fn parse_time_span(s: &str, pos: Position) -> Result<TimeSpan, ParserError> {
    let bad = || err(pos, ValueKind::TimeSpan, "malformed timespan");
    let mut c = Cursor::new(s);
    let negative = c.eat(b'-');

    // Try to find an optional "D." day prefix by looking for a '.' before
    // the first ':'.
    let rest = std::str::from_utf8(c.rest()).map_err(|_| bad())?;
    let colon_pos = rest.find(':').ok_or_else(bad)?;
    let dot_before_colon = rest[..colon_pos].find('.');

    let days: i64 = if let Some(dot) = dot_before_colon {
        let d: i64 = rest[..dot].parse().map_err(|_| bad())?;
        c.i += dot + 1;
        d
    } else {
        0
    };

    let hour = c.take_digits(2).ok_or_else(bad)?;
    if !c.eat(b':') {
        return Err(bad());
    }
    let minute = c.take_digits(2).ok_or_else(bad)?;
    if !c.eat(b':') {
        return Err(bad());
    }
    let second = c.take_digits(2).ok_or_else(bad)?;

    let mut ticks_frac = 0i64;
    if c.eat(b'.') {
        let start = c.i;
        while c.peek().map(|b| b.is_ascii_digit()).unwrap_or(false) {
            c.i += 1;
        }
        let frac = std::str::from_utf8(&c.bytes[start..c.i]).unwrap();
        if frac.is_empty() {
            return Err(bad());
        }
        let mut seven: String = frac.chars().take(7).collect();
        while seven.len() < 7 {
            seven.push('0');
        }
        ticks_frac = seven.parse().map_err(|_| bad())?;
    }
    if !c.rest().is_empty() {
        return Err(bad());
    }

    let total = days * TICKS_PER_DAY
        + hour as i64 * TICKS_PER_HOUR
        + minute as i64 * TICKS_PER_MINUTE
        + second as i64 * TICKS_PER_SECOND
        + ticks_frac;
    Ok(TimeSpan { ticks: if negative { -total } else { total } })
}

pub fn format_time_span(ts: &TimeSpan) -> String {
    let negative = ts.ticks < 0;
    let mut remaining = ts.ticks.unsigned_abs() as i64;
    let days = remaining / TICKS_PER_DAY;
    remaining %= TICKS_PER_DAY;
    let hours = remaining / TICKS_PER_HOUR;
    remaining %= TICKS_PER_HOUR;
    let minutes = remaining / TICKS_PER_MINUTE;
    remaining %= TICKS_PER_MINUTE;
    let seconds = remaining / TICKS_PER_SECOND;
    let frac = remaining % TICKS_PER_SECOND;

    let mut s = String::new();
    if negative {
        s.push('-');
    }
    if days != 0 {
        s.push_str(&format!("{}.", days));
    }
    s.push_str(&format!("{:02}:{:02}:{:02}.{:07}", hours, minutes, seconds, frac));
    s
}

pub fn write_time_span<S: Symbol + Pooled>(w: &mut Writer<S>, ts: &TimeSpan) {
    write_quoted(w, &format_time_span(ts));
}

// ---------------------------------------------------------------------
// Guid
// ---------------------------------------------------------------------

pub fn parse_guid(s: &str, pos: Position) -> Result<uuid::Uuid, ParserError> {
    let bytes = s.as_bytes();
    let hyphenated = bytes.len() == 36
        && bytes[8] == b'-'
        && bytes[13] == b'-'
        && bytes[18] == b'-'
        && bytes[23] == b'-';
    if !hyphenated {
        return Err(err(pos, ValueKind::Guid, "expected 36-char hyphenated GUID"));
    }
    uuid::Uuid::parse_str(s).map_err(|_| err(pos, ValueKind::Guid, "invalid GUID"))
}

pub fn write_guid<S: Symbol + Pooled>(w: &mut Writer<S>, id: &uuid::Uuid) {
    write_quoted(w, &id.hyphenated().to_string());
}

// ---------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------

/// `major.minor[.build[.revision]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

pub fn parse_version(s: &str, pos: Position) -> Result<Version, ParserError> {
    let bad = || err(pos, ValueKind::Version, "malformed version");
    let mut parts = s.split('.');
    let major: u32 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let minor: u32 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let build = parts.next().map(|p| p.parse::<u32>()).transpose().map_err(|_| bad())?;
    let revision = parts.next().map(|p| p.parse::<u32>()).transpose().map_err(|_| bad())?;
    if parts.next().is_some() {
        return Err(bad());
    }
    if revision.is_some() && build.is_none() {
        return Err(bad());
    }
    Ok(Version { major, minor, build, revision })
}

pub fn format_version(v: &Version) -> String {
    let mut s = format!("{}.{}", v.major, v.minor);
    if let Some(b) = v.build {
        s.push_str(&format!(".{}", b));
        if let Some(r) = v.revision {
            s.push_str(&format!(".{}", r));
        }
    }
    s
}

pub fn write_version<S: Symbol + Pooled>(w: &mut Writer<S>, v: &Version) {
    write_quoted(w, &format_version(v));
}

// ---------------------------------------------------------------------
// Uri
// ---------------------------------------------------------------------

/// A URI, validated on construction but stored and round-tripped in its
/// exact original string form rather than a re-encoded/normalized one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri(String);

impl Uri {
    pub fn parse(s: &str, pos: Position) -> Result<Uri, ParserError> {
        url::Url::parse(s).map_err(|_| err(pos, ValueKind::Uri, "invalid URI"))?;
        Ok(Uri(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn write_uri<S: Symbol + Pooled>(w: &mut Writer<S>, uri: &Uri) {
    crate::codec::escape::write_escaped_string(w, uri.as_str(), crate::codec::escape::EscapeMode::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_time_round_trips_utc() {
        let dt = parse_date_time("2024-03-05T10:30:00Z", Position::default()).unwrap();
        assert_eq!(format_date_time(&dt), "2024-03-05T10:30:00.0000000Z");
    }

    #[test]
    fn date_time_fraction_truncated_and_padded() {
        let dt = parse_date_time("2024-03-05T10:30:00.123456789Z", Position::default()).unwrap();
        assert_eq!(format_date_time(&dt), "2024-03-05T10:30:00.1234567Z");

        let dt = parse_date_time("2024-03-05T10:30:00.5Z", Position::default()).unwrap();
        assert_eq!(format_date_time(&dt), "2024-03-05T10:30:00.5000000Z");
    }

    #[test]
    fn date_time_offset() {
        let dt = parse_date_time("2024-03-05T10:30:00-05:30", Position::default()).unwrap();
        assert_eq!(format_date_time(&dt), "2024-03-05T10:30:00.0000000-05:30");
    }

    #[test]
    fn time_span_round_trips_with_days() {
        let ts = parse_time_span("-1.02:03:04.5000000", Position::default()).unwrap();
        assert_eq!(format_time_span(&ts), "-1.02:03:04.5000000");
    }

    #[test]
    fn time_span_without_days() {
        let ts = parse_time_span("02:03:04", Position::default()).unwrap();
        assert_eq!(format_time_span(&ts), "02:03:04.0000000");
    }

    #[test]
    fn guid_requires_hyphenated_form() {
        assert!(parse_guid("not-a-guid", Position::default()).is_err());
        let g = parse_guid("550e8400-e29b-41d4-a716-446655440000", Position::default()).unwrap();
        assert_eq!(g.hyphenated().to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn version_parses_all_lengths() {
        assert_eq!(parse_version("1.2", Position::default()).unwrap(), Version { major: 1, minor: 2, build: None, revision: None });
        assert_eq!(format_version(&parse_version("1.2.3.4", Position::default()).unwrap()), "1.2.3.4");
        assert!(parse_version("1.2..4", Position::default()).is_err());
    }

    #[test]
    fn uri_round_trips_exact_string() {
        let u = Uri::parse("https://example.com/a?b=c", Position::default()).unwrap();
        assert_eq!(u.as_str(), "https://example.com/a?b=c");
    }
}
