//! Formatter composition and resolution.
//!
//! `resolver` owns the policy type and the process-wide cache that maps
//! (type, symbol width, policy) to a materialized `TypeDescription`.
//! `composite` owns the generic serialize/deserialize algorithm that walks
//! a `TypeDescription` to move between a `T` and the wire.

pub mod composite;
pub mod resolver;

pub use composite::{deserialize_composite, serialize_composite};
pub use resolver::{FormatterCache, ResolverPolicy};
