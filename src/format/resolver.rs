//! Resolver policy and the process-wide formatter cache.
//!
//! The cache only ever stores a `TypeDescription<T>` (not a boxed
//! serialize/deserialize closure pair): because `format::composite`'s
//! generators are plain generic functions over `T: Described` rather than
//! per-type trait objects, the only per-(type, policy) artifact expensive
//! enough to be worth caching is the description itself. `serialize`/
//! `deserialize` fall out of monomorphization instead of being stored.

use crate::codec::escape::EscapeMode;
use crate::model::{Described, NamingConvention, TypeDescription};
use crate::reader::CommentHandling;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

/// One resolver: naming convention, null handling, escape mode, and the
/// reader-side leniency knobs, all folded into a single cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolverPolicy {
    pub naming: NamingConvention,
    pub exclude_nulls: bool,
    pub escape_mode: EscapeMode,
    pub allow_trailing_commas: bool,
    pub comment_handling: CommentHandling,
    pub max_depth: u32,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        ResolverPolicy {
            naming: NamingConvention::default(),
            exclude_nulls: false,
            escape_mode: EscapeMode::default(),
            allow_trailing_commas: false,
            comment_handling: CommentHandling::default(),
            max_depth: crate::depth::DEFAULT_MAX_DEPTH,
        }
    }
}

type Slot = Arc<OnceLock<Arc<dyn Any + Send + Sync>>>;

/// Maps (type identity, symbol width, resolver) to a cached
/// `TypeDescription`. Reads are lock-free past the first request; inserts
/// race safely -- two threads building the same entry both reserve a slot
/// before either runs `T::describe`, and `OnceLock` lets only the first of
/// them actually build it, so concurrent cache inserts stay idempotent.
pub struct FormatterCache {
    entries: DashMap<(TypeId, u8, ResolverPolicy), Slot>,
}

impl FormatterCache {
    pub fn new() -> Self {
        FormatterCache { entries: DashMap::new() }
    }

    /// `width` distinguishes the UTF-8 (`1`) and UTF-16 (`2`) symbol lanes;
    /// a type described once is still cached separately per lane, since a
    /// resolver's naming convention can in principle render differently
    /// depending on lane-specific casing helpers a future extension might add.
    pub fn get_or_build<T: Described + Send + Sync + 'static>(&self, width: u8, policy: &ResolverPolicy) -> Arc<TypeDescription<T>> {
        let key = (TypeId::of::<T>(), width, policy.clone());
        let slot = self.entries.entry(key).or_insert_with(|| Arc::new(OnceLock::new())).clone();
        let boxed = slot.get_or_init(|| {
            tracing::debug!(symbol_width = width, naming = ?policy.naming, "building type description");
            Arc::new(T::describe(policy.naming)) as Arc<dyn Any + Send + Sync>
        });
        boxed.clone().downcast::<TypeDescription<T>>().expect("TypeId uniquely determines T within a cache key")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FormatterCache {
    fn default() -> Self {
        FormatterCache::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::TypeDescriptionBuilder;
    use crate::value::Value;

    struct Point {
        x: i64,
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
                .default_constructor(|| Point { x: 0 })
                .build()
        }
    }

    #[test]
    fn builds_once_and_reuses_the_cached_description() {
        let cache = FormatterCache::new();
        let policy = ResolverPolicy::default();
        let a = cache.get_or_build::<Point>(1, &policy);
        let b = cache.get_or_build::<Point>(1, &policy);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn separate_symbol_widths_get_separate_entries() {
        let cache = FormatterCache::new();
        let policy = ResolverPolicy::default();
        cache.get_or_build::<Point>(1, &policy);
        cache.get_or_build::<Point>(2, &policy);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn distinct_policies_get_distinct_entries() {
        let cache = FormatterCache::new();
        let a = ResolverPolicy::default();
        let mut b = ResolverPolicy::default();
        b.exclude_nulls = true;
        cache.get_or_build::<Point>(1, &a);
        cache.get_or_build::<Point>(1, &b);
        assert_eq!(cache.len(), 2);
    }
}
