//! Generic composite serializer/deserializer.
//!
//! Unlike a reflection-free codegen pipeline that emits one closure pair
//! per type, these are plain generic functions over `T: Described`; the
//! compiler monomorphizes one copy per `T` actually used. What the cache
//! in `resolver.rs` saves is the `TypeDescription<T>` these functions walk,
//! not the functions themselves.

use crate::dispatch::PropertyDispatch;
use crate::error::{ParserError, ParserErrorKind};
use crate::model::{Described, TypeDescription};
use crate::reader::{LaneOps, Reader};
use crate::symbol::Symbol;
use crate::value::{read_value, write_value, Value};
use crate::writer::{Pooled, Writer};
use std::sync::Arc;

use super::resolver::{FormatterCache, ResolverPolicy};

/// Converts an already-in-memory `T` into a `Value` tree, applying
/// `exclude-null`/`should-serialize` member filtering and folding in
/// extension data. Does not touch a
/// writer -- this is the piece a hand-written `Described` impl reaches for
/// when one of its own members is itself a composite type, so nesting
/// composes without the outer type needing to know the inner type's shape.
pub fn to_value<T: Described + Send + Sync + 'static>(value: &T, cache: &FormatterCache, width: u8, policy: &ResolverPolicy) -> Value {
    let desc = cache.get_or_build::<T>(width, policy);
    Value::Object(members_to_map(&desc, value, policy))
}

fn members_to_map<T>(desc: &TypeDescription<T>, value: &T, policy: &ResolverPolicy) -> indexmap::IndexMap<String, Value> {
    let mut map = indexmap::IndexMap::new();
    for member in &desc.members {
        if !member.readable {
            continue;
        }
        let v = (member.get)(value);
        if (member.exclude_null || policy.exclude_nulls) && v.is_null() {
            continue;
        }
        if let Some(pred) = &member.should_serialize {
            if !pred(value) {
                continue;
            }
        }
        map.insert(member.json_name.clone(), v);
    }
    if let Some(ext) = &desc.extension_data {
        for (name, v) in (ext.get)(value) {
            if map.contains_key(&name) {
                continue;
            }
            map.insert(name, v);
        }
    }
    map
}

/// Inverse of `to_value`: builds a `T` from a `Value::Object`, routing each
/// entry through the member dispatcher and falling back to extension data
/// or skip.
pub fn from_value<T: Described + Send + Sync + 'static>(
    value: Value,
    cache: &FormatterCache,
    width: u8,
    policy: &ResolverPolicy,
) -> Result<T, ParserError> {
    let desc = cache.get_or_build::<T>(width, policy);
    let Value::Object(map) = value else {
        return Err(ParserError::new(ParserErrorKind::Unexpected("an object"), crate::error::Position::default()));
    };
    materialize(&desc, map)
}

fn materialize<T>(desc: &Arc<TypeDescription<T>>, map: indexmap::IndexMap<String, Value>) -> Result<T, ParserError> {
    let names = desc.escaped_names();
    let dispatch = PropertyDispatch::build(&names);
    let mut slots: Vec<Option<Value>> = (0..desc.members.len()).map(|_| None).collect();
    let mut extension: indexmap::IndexMap<String, Value> = indexmap::IndexMap::new();

    for (name, v) in map {
        match dispatch.dispatch(name.as_bytes()) {
            Some(idx) => slots[idx] = Some(v),
            None => {
                extension.insert(name, v);
            }
        }
    }

    build_from_slots(desc, slots, extension)
}

fn build_from_slots<T>(
    desc: &Arc<TypeDescription<T>>,
    mut slots: Vec<Option<Value>>,
    extension: indexmap::IndexMap<String, Value>,
) -> Result<T, ParserError> {
    if let Some(ctor) = &desc.constructor {
        let args = ctor
            .member_indices
            .iter()
            .map(|&i| slots[i].take().unwrap_or(Value::Null))
            .collect();
        let mut out = (ctor.build)(args);
        apply_remaining(desc, &mut out, slots, extension);
        Ok(out)
    } else if let Some(default) = &desc.default {
        let mut out = default();
        apply_remaining(desc, &mut out, slots, extension);
        Ok(out)
    } else {
        Err(ParserError::new(
            ParserErrorKind::Unexpected("a type with a constructor or default constructor"),
            crate::error::Position::default(),
        ))
    }
}

fn apply_remaining<T>(desc: &TypeDescription<T>, out: &mut T, slots: Vec<Option<Value>>, extension: indexmap::IndexMap<String, Value>) {
    for (member, slot) in desc.members.iter().zip(slots.into_iter()) {
        if !member.writable {
            continue;
        }
        if let Some(v) = slot {
            (member.set)(out, v);
        }
    }
    if let Some(ext) = &desc.extension_data {
        for (name, v) in extension {
            (ext.insert)(out, name, v);
        }
    }
}

/// Serializes `value` directly onto `w`, going through `Value` for each
/// member rather than recursing through a boxed per-type closure. Types
/// marked `is_recursion_candidate` charge an extra unit against the
/// writer's depth budget, on top of the one `begin_object`/`end_object`
/// already charges, so self-referential structures hit the ceiling at a
/// shallower level than their raw container nesting would suggest.
pub fn serialize_composite<T, S>(
    w: &mut Writer<S>,
    value: &T,
    cache: &FormatterCache,
    width: u8,
    policy: &ResolverPolicy,
) -> Result<(), crate::error::FormatError>
where
    T: Described + Send + Sync + 'static,
    S: Symbol + Pooled,
{
    let desc = cache.get_or_build::<T>(width, policy);
    if desc.is_recursion_candidate {
        w.enter_depth()?;
    }
    let result = write_composite_object(w, value, cache, width, policy);
    if desc.is_recursion_candidate {
        w.exit_depth();
    }
    result
}

fn write_composite_object<T, S>(
    w: &mut Writer<S>,
    value: &T,
    cache: &FormatterCache,
    width: u8,
    policy: &ResolverPolicy,
) -> Result<(), crate::error::FormatError>
where
    T: Described + Send + Sync + 'static,
    S: Symbol + Pooled,
{
    let Value::Object(map) = to_value(value, cache, width, policy) else {
        unreachable!("to_value always returns Value::Object");
    };
    w.begin_object()?;
    for (i, (name, v)) in map.iter().enumerate() {
        if i > 0 {
            w.write_value_separator();
        }
        w.write_quote();
        w.write_verbatim(name.as_bytes());
        w.write_quote();
        w.write_name_separator();
        write_value(w, v, policy.escape_mode)?;
    }
    w.end_object();
    Ok(())
}

/// Deserializes a `T` by reading one full object off `r`. Mirrors
/// `serialize_composite`'s extra depth charge for recursion-candidate
/// types on the reader side.
pub fn deserialize_composite<'a, T, S>(
    r: &mut Reader<'a, S>,
    cache: &FormatterCache,
    width: u8,
    policy: &ResolverPolicy,
) -> Result<T, ParserError>
where
    T: Described + Send + Sync + 'static,
    S: Symbol + LaneOps,
{
    let desc = cache.get_or_build::<T>(width, policy);
    if desc.is_recursion_candidate {
        r.enter_recursion_guard()?;
    }
    let value = read_value(r);
    if desc.is_recursion_candidate {
        r.exit_recursion_guard();
    }
    from_value(value?, cache, width, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::TypeDescriptionBuilder;
    use crate::model::NamingConvention;
    use crate::reader::Reader;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl Described for Point {
        fn describe(convention: NamingConvention) -> TypeDescription<Point> {
            TypeDescriptionBuilder::new(convention)
                .member(
                    "X",
                    |p: &Point| Value::from(p.x),
                    |p: &mut Point, v| {
                        if let Value::Number(n) = v {
                            p.x = n.as_f64() as i64;
                        }
                    },
                )
                .member(
                    "Y",
                    |p: &Point| Value::from(p.y),
                    |p: &mut Point, v| {
                        if let Value::Number(n) = v {
                            p.y = n.as_f64() as i64;
                        }
                    },
                )
                .default_constructor(|| Point { x: 0, y: 0 })
                .build()
        }
    }

    #[test]
    fn round_trips_through_bytes() {
        let cache = FormatterCache::new();
        let policy = ResolverPolicy::default();
        let p = Point { x: 3, y: -4 };

        let mut w = Writer::<u8>::new();
        serialize_composite(&mut w, &p, &cache, 1, &policy).unwrap();
        let bytes = w.finalize();
        assert_eq!(bytes, b"{\"x\":3,\"y\":-4}");

        let mut r = Reader::<u8>::new(&bytes).unwrap();
        let back: Point = deserialize_composite(&mut r, &cache, 1, &policy).unwrap();
        assert_eq!(back, Point { x: 3, y: -4 });
    }

    #[test]
    fn unset_members_keep_default_constructor_values() {
        let cache = FormatterCache::new();
        let policy = ResolverPolicy::default();
        let mut r = Reader::<u8>::new(br#"{"x":7}"#).unwrap();
        let p: Point = deserialize_composite(&mut r, &cache, 1, &policy).unwrap();
        assert_eq!(p, Point { x: 7, y: 0 });
    }

    #[derive(Debug, PartialEq)]
    struct Node {
        value: i64,
    }

    impl Described for Node {
        fn describe(convention: NamingConvention) -> TypeDescription<Node> {
            TypeDescriptionBuilder::new(convention)
                .member(
                    "Value",
                    |n: &Node| Value::from(n.value),
                    |n: &mut Node, v| {
                        if let Value::Number(num) = v {
                            n.value = num.as_f64() as i64;
                        }
                    },
                )
                .default_constructor(|| Node { value: 0 })
                .recursion_candidate()
                .build()
        }
    }

    #[test]
    fn recursion_candidate_consumes_an_extra_unit_of_writer_depth() {
        let cache = FormatterCache::new();
        let policy = ResolverPolicy::default();
        let mut w = Writer::<u8>::with_max_depth(1);
        let err = serialize_composite(&mut w, &Node { value: 1 }, &cache, 1, &policy).unwrap_err();
        assert!(matches!(err, crate::error::FormatError::DepthExceeded { .. }));
    }

    #[test]
    fn recursion_candidate_consumes_an_extra_unit_of_reader_depth() {
        let cache = FormatterCache::new();
        let policy = ResolverPolicy::default();
        let mut opts = crate::reader::ReaderOptions::default();
        opts.max_depth = 1;
        let mut r = Reader::<u8>::with_options(br#"{"value":1}"#, opts).unwrap();
        let err = deserialize_composite::<Node, _>(&mut r, &cache, 1, &policy).unwrap_err();
        assert!(matches!(err.kind, ParserErrorKind::DepthExceeded { .. }));
    }
}
