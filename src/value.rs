//! The `dynamic`/schemaless surface. A tagged union over
//! {null, bool, number, string, array, object}, with the numeric
//! representation resolver-configurable between narrow machine types and
//! `Decimal`.
//!
//! Object member order follows insertion order, so `Value::Object` is
//! backed by `IndexMap` rather than a hash map with undefined iteration
//! order.

use crate::codec::escape::{write_escaped_string, EscapeMode};
use crate::codec::number::Number;
use crate::error::ParserError;
use crate::pointer::Pointer;
use crate::reader::{Event, LaneOps, Reader};
use crate::symbol::Symbol;
use crate::writer::{Pooled, Writer};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Signed(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Number::Unsigned(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::Float(n))
    }
}

/// Writes a `Value` tree recursively. Used both for the untyped/`dynamic`
/// surface and by `format::composite` for any member whose declared type
/// is `Value` itself (the schemaless escape hatch a declared member can
/// opt into).
pub fn write_value<S: Symbol + Pooled>(w: &mut Writer<S>, value: &Value, escape_mode: EscapeMode) -> Result<(), crate::error::FormatError> {
    match value {
        Value::Null => w.write_null(),
        Value::Bool(b) => w.write_bool(*b),
        Value::Number(n) => n.write(w)?,
        Value::String(s) => write_escaped_string(w, s, escape_mode),
        Value::Array(items) => {
            w.begin_array()?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    w.write_value_separator();
                }
                write_value(w, item, escape_mode)?;
            }
            w.end_array();
        }
        Value::Object(map) => {
            w.begin_object()?;
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    w.write_value_separator();
                }
                write_escaped_string(w, k, escape_mode);
                w.write_name_separator();
                write_value(w, v, escape_mode)?;
            }
            w.end_object();
        }
    }
    Ok(())
}

/// Reads one `Value` tree, recursing into nested containers. Mirrors
/// `Reader::skip_value`'s container-walking shape but materializes instead
/// of discarding.
pub fn read_value<'a, S: Symbol + LaneOps>(r: &mut Reader<'a, S>) -> Result<Value, ParserError> {
    read_value_at(r, &Pointer::root())
}

/// Reads one `Value` tree the way `read_value` does, but attaches `path` to
/// any error that bubbles up without one already -- the deepest member
/// being read when a failure occurs wins, since outer recursions only
/// attach their own path when the inner one left it at the root.
fn read_value_at<'a, S: Symbol + LaneOps>(r: &mut Reader<'a, S>, path: &Pointer) -> Result<Value, ParserError> {
    read_value_inner(r, path).map_err(|e| if e.path.is_root() { e.with_path(path.clone()) } else { e })
}

fn read_value_inner<'a, S: Symbol + LaneOps>(r: &mut Reader<'a, S>, path: &Pointer) -> Result<Value, ParserError> {
    match r.read_value_token()? {
        Event::Null => Ok(Value::Null),
        Event::Bool(b) => Ok(Value::Bool(b)),
        Event::Str(s) => Ok(Value::String(s.into_owned())),
        Event::Number(lit) => Ok(Value::Number(Number::from_literal(&lit, r.position())?)),
        Event::BeginObject => {
            let mut map = IndexMap::new();
            loop {
                if r.peek_end_object()? {
                    r.read_end_object_or_comma()?;
                    break;
                }
                let name = r.read_property_name()?.into_owned();
                let member_path = path.pushed_property(&name);
                let value = read_value_at(r, &member_path)?;
                map.insert(name, value);
                if r.read_end_object_or_comma()? {
                    break;
                }
            }
            Ok(Value::Object(map))
        }
        Event::BeginArray => {
            let mut items = Vec::new();
            if r.peek_end_array()? {
                r.read_end_array_or_comma()?;
            } else {
                let mut index = 0;
                loop {
                    let item_path = path.pushed_index(index);
                    items.push(read_value_at(r, &item_path)?);
                    index += 1;
                    if r.read_end_array_or_comma()? {
                        break;
                    }
                }
            }
            Ok(Value::Array(items))
        }
        Event::EndObject | Event::EndArray | Event::Comment(_) => unreachable!("read_value_token never yields these"),
    }
}
