pub mod codec;
pub mod depth;
pub mod dispatch;
pub mod describe;
pub mod error;
pub mod format;
pub mod model;
pub mod pointer;
pub mod reader;
pub mod symbol;
pub mod value;
pub mod writer;

pub use describe::{MemberBuilder, TypeDescriptionBuilder};
pub use error::{Error, FormatError, ParserError, UnsupportedError};
pub use format::{FormatterCache, ResolverPolicy};
pub use model::{Described, NamingConvention, TypeDescription};
pub use pointer::Pointer;
pub use reader::Reader;
pub use value::Value;
pub use writer::Writer;

use format::composite::{deserialize_composite, serialize_composite};

/// Serializes `value` to a freshly-allocated UTF-8 byte vector using the
/// default resolver policy. Thin glue over the resolver cache and the
/// composite generator -- the minimal surface needed to actually run the
/// engine end to end.
pub fn to_vec<T: Described + Send + Sync + 'static>(value: &T) -> Result<Vec<u8>, Error> {
    to_vec_with(value, &ResolverPolicy::default())
}

pub fn to_vec_with<T: Described + Send + Sync + 'static>(value: &T, policy: &ResolverPolicy) -> Result<Vec<u8>, Error> {
    let cache = FormatterCache::new();
    let mut w = Writer::<u8>::with_max_depth(policy.max_depth);
    serialize_composite(&mut w, value, &cache, 1, policy)?;
    Ok(w.finalize())
}

/// Serializes `value` to an owned `String`. See `to_vec`.
pub fn to_string<T: Described + Send + Sync + 'static>(value: &T) -> Result<String, Error> {
    to_string_with(value, &ResolverPolicy::default())
}

pub fn to_string_with<T: Described + Send + Sync + 'static>(value: &T, policy: &ResolverPolicy) -> Result<String, Error> {
    let cache = FormatterCache::new();
    let mut w = Writer::<u8>::with_max_depth(policy.max_depth);
    serialize_composite(&mut w, value, &cache, 1, policy)?;
    Ok(w.finalize_string())
}

/// Deserializes a `T` from a complete UTF-8 byte slice using the default
/// resolver policy.
pub fn from_slice<T: Described + Send + Sync + 'static>(input: &[u8]) -> Result<T, Error> {
    from_slice_with(input, &ResolverPolicy::default())
}

pub fn from_slice_with<T: Described + Send + Sync + 'static>(input: &[u8], policy: &ResolverPolicy) -> Result<T, Error> {
    let cache = FormatterCache::new();
    let options = reader_options(policy);
    let mut r = Reader::<u8>::with_options(input, options)?;
    deserialize_composite(&mut r, &cache, 1, policy).map_err(|e| {
        tracing::warn!(error = %e, "deserialize failed");
        Error::from(e)
    })
}

/// Deserializes a `T` from a complete `str`. Equivalent to `from_slice` on
/// the UTF-8 lane; kept separate so callers don't have to reach for
/// `.as_bytes()` themselves.
pub fn from_str<T: Described + Send + Sync + 'static>(input: &str) -> Result<T, Error> {
    from_slice(input.as_bytes())
}

pub fn from_str_with<T: Described + Send + Sync + 'static>(input: &str, policy: &ResolverPolicy) -> Result<T, Error> {
    from_slice_with(input.as_bytes(), policy)
}

fn reader_options(policy: &ResolverPolicy) -> reader::ReaderOptions {
    reader::ReaderOptions {
        comment_handling: policy.comment_handling,
        allow_trailing_commas: policy.allow_trailing_commas,
        max_depth: policy.max_depth,
    }
}
