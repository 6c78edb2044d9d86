//! Type-description model.
//!
//! Built once per (type, resolver) and then reused for every subsequent
//! serialize/deserialize of that type. Member access is erased through
//! `Value` rather than through per-field generated code (no derive macro
//! here), which keeps the composite generator in `format::composite`
//! generic over any `T: Described` without code generation -- the cost is
//! one `Value` round-trip per member instead of a fully monomorphized
//! accessor, the tradeoff `format::composite`'s doc comment explains.

use crate::value::Value;

/// How a member's Rust identifier becomes its JSON name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NamingConvention {
    #[default]
    AsDeclared,
    CamelCase,
    SnakeCase,
    /// `ADA_CASE`: all-uppercase with underscore word separators. Named
    /// `AdaCase` here (not `ADA_CASE`) to avoid colliding with Rust's own
    /// naming-convention terminology for enum variants.
    AdaCase,
}

impl NamingConvention {
    pub fn apply(&self, declared: &str) -> String {
        match self {
            NamingConvention::AsDeclared => declared.to_string(),
            NamingConvention::CamelCase => to_camel_case(declared),
            NamingConvention::SnakeCase => to_snake_case(declared),
            NamingConvention::AdaCase => to_snake_case(declared).to_uppercase(),
        }
    }
}

fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in s.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn to_camel_case(s: &str) -> String {
    let words = split_words(s);
    let mut out = String::new();
    for (i, w) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(&w.to_lowercase());
        } else {
            let mut chars = w.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(&chars.as_str().to_lowercase());
            }
        }
    }
    out
}

fn to_snake_case(s: &str) -> String {
    split_words(s).iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("_")
}

/// One readable/writable member of a composite type.
pub struct MemberDescriptor<T> {
    pub declared_name: &'static str,
    pub json_name: String,
    /// Precomputed `"name":` bytes, written verbatim by the serializer.
    pub emission_plan: Vec<u8>,
    pub readable: bool,
    pub writable: bool,
    pub exclude_null: bool,
    pub is_nullable: bool,
    pub should_serialize: Option<Box<dyn Fn(&T) -> bool + Send + Sync>>,
    pub get: Box<dyn Fn(&T) -> Value + Send + Sync>,
    pub set: Box<dyn Fn(&mut T, Value) + Send + Sync>,
}

impl<T> MemberDescriptor<T> {
    pub fn new(
        declared_name: &'static str,
        convention: NamingConvention,
        get: Box<dyn Fn(&T) -> Value + Send + Sync>,
        set: Box<dyn Fn(&mut T, Value) + Send + Sync>,
    ) -> Self {
        let json_name = convention.apply(declared_name);
        let mut emission_plan = Vec::with_capacity(json_name.len() + 3);
        emission_plan.push(b'"');
        emission_plan.extend_from_slice(json_name.as_bytes());
        emission_plan.push(b'"');
        emission_plan.push(b':');
        MemberDescriptor {
            declared_name,
            json_name,
            emission_plan,
            readable: true,
            writable: true,
            exclude_null: false,
            is_nullable: false,
            should_serialize: None,
            get,
            set,
        }
    }

    pub fn exclude_null(mut self) -> Self {
        self.exclude_null = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn should_serialize(mut self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.should_serialize = Some(Box::new(pred));
        self
    }
}

/// A mapping-from-string-to-`Value` slot receiving properties not matched
/// by any declared member.
pub struct ExtensionDataDescriptor<T> {
    pub get: Box<dyn Fn(&T) -> indexmap::IndexMap<String, Value> + Send + Sync>,
    pub insert: Box<dyn Fn(&mut T, String, Value) + Send + Sync>,
}

/// Positional constructor parameter -> member-index mapping, used when a
/// type has no default constructor.
pub struct ConstructorDescriptor<T> {
    pub member_indices: Vec<usize>,
    pub build: Box<dyn Fn(Vec<Value>) -> T + Send + Sync>,
}

/// The full per-(type, resolver) description.
pub struct TypeDescription<T> {
    pub members: Vec<MemberDescriptor<T>>,
    pub extension_data: Option<ExtensionDataDescriptor<T>>,
    pub constructor: Option<ConstructorDescriptor<T>>,
    pub default: Option<Box<dyn Fn() -> T + Send + Sync>>,
    pub is_recursion_candidate: bool,
}

impl<T> TypeDescription<T> {
    pub fn escaped_names(&self) -> Vec<Vec<u8>> {
        self.members.iter().map(|m| m.json_name.as_bytes().to_vec()).collect()
    }
}

/// Implemented (by hand, or by a future derive macro) for every composite
/// type that participates in the formatter graph.
pub trait Described: Sized {
    fn describe(convention: NamingConvention) -> TypeDescription<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_conventions_convert_as_expected() {
        assert_eq!(NamingConvention::CamelCase.apply("FirstName"), "firstName");
        assert_eq!(NamingConvention::SnakeCase.apply("FirstName"), "first_name");
        assert_eq!(NamingConvention::AdaCase.apply("FirstName"), "FIRST_NAME");
        assert_eq!(NamingConvention::AsDeclared.apply("FirstName"), "FirstName");
    }

    #[test]
    fn emission_plan_is_precomputed() {
        let m: MemberDescriptor<()> = MemberDescriptor::new(
            "Count",
            NamingConvention::CamelCase,
            Box::new(|_| Value::Null),
            Box::new(|_, _| {}),
        );
        assert_eq!(m.emission_plan, b"\"count\":");
    }
}
