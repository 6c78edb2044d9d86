//! A small ambient builder over `model::TypeDescription`. Reflection-based
//! construction is out of scope, so every `Described` impl still writes its
//! own member list by hand -- this just removes the repetition of computing
//! emission plans and defaults.

use crate::model::{ConstructorDescriptor, ExtensionDataDescriptor, MemberDescriptor, NamingConvention, TypeDescription};
use crate::value::Value;
use indexmap::IndexMap;

pub struct TypeDescriptionBuilder<T> {
    convention: NamingConvention,
    members: Vec<MemberDescriptor<T>>,
    extension_data: Option<ExtensionDataDescriptor<T>>,
    constructor: Option<ConstructorDescriptor<T>>,
    default: Option<Box<dyn Fn() -> T + Send + Sync>>,
    is_recursion_candidate: bool,
}

impl<T> TypeDescriptionBuilder<T> {
    pub fn new(convention: NamingConvention) -> Self {
        TypeDescriptionBuilder {
            convention,
            members: Vec::new(),
            extension_data: None,
            constructor: None,
            default: None,
            is_recursion_candidate: false,
        }
    }

    pub fn member(
        mut self,
        declared_name: &'static str,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut T, Value) + Send + Sync + 'static,
    ) -> MemberBuilder<T> {
        let desc = MemberDescriptor::new(declared_name, self.convention, Box::new(get), Box::new(set));
        MemberBuilder { parent: self, desc }
    }

    pub fn extension_data(
        mut self,
        get: impl Fn(&T) -> IndexMap<String, Value> + Send + Sync + 'static,
        insert: impl Fn(&mut T, String, Value) + Send + Sync + 'static,
    ) -> Self {
        self.extension_data = Some(ExtensionDataDescriptor { get: Box::new(get), insert: Box::new(insert) });
        self
    }

    pub fn constructor(mut self, member_indices: Vec<usize>, build: impl Fn(Vec<Value>) -> T + Send + Sync + 'static) -> Self {
        self.constructor = Some(ConstructorDescriptor { member_indices, build: Box::new(build) });
        self
    }

    pub fn default_constructor(mut self, default: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.default = Some(Box::new(default));
        self
    }

    pub fn recursion_candidate(mut self) -> Self {
        self.is_recursion_candidate = true;
        self
    }

    pub fn build(self) -> TypeDescription<T> {
        TypeDescription {
            members: self.members,
            extension_data: self.extension_data,
            constructor: self.constructor,
            default: self.default,
            is_recursion_candidate: self.is_recursion_candidate,
        }
    }
}

/// Returned by `TypeDescriptionBuilder::member` so `.exclude_null()`,
/// `.nullable()`, `.should_serialize(...)` read naturally before the next
/// `.member(...)` or `.build()`.
pub struct MemberBuilder<T> {
    parent: TypeDescriptionBuilder<T>,
    desc: MemberDescriptor<T>,
}

impl<T> MemberBuilder<T> {
    pub fn exclude_null(mut self) -> Self {
        self.desc = self.desc.exclude_null();
        self
    }

    pub fn nullable(mut self) -> Self {
        self.desc = self.desc.nullable();
        self
    }

    pub fn should_serialize(mut self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.desc = self.desc.should_serialize(pred);
        self
    }

    fn finish(mut self) -> TypeDescriptionBuilder<T> {
        self.parent.members.push(self.desc);
        self.parent
    }

    pub fn member(
        self,
        declared_name: &'static str,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut T, Value) + Send + Sync + 'static,
    ) -> MemberBuilder<T> {
        self.finish().member(declared_name, get, set)
    }

    pub fn extension_data(
        self,
        get: impl Fn(&T) -> IndexMap<String, Value> + Send + Sync + 'static,
        insert: impl Fn(&mut T, String, Value) + Send + Sync + 'static,
    ) -> TypeDescriptionBuilder<T> {
        self.finish().extension_data(get, insert)
    }

    pub fn constructor(self, member_indices: Vec<usize>, build: impl Fn(Vec<Value>) -> T + Send + Sync + 'static) -> TypeDescriptionBuilder<T> {
        self.finish().constructor(member_indices, build)
    }

    pub fn default_constructor(self, default: impl Fn() -> T + Send + Sync + 'static) -> TypeDescriptionBuilder<T> {
        self.finish().default_constructor(default)
    }

    pub fn recursion_candidate(self) -> TypeDescriptionBuilder<T> {
        self.finish().recursion_candidate()
    }

    pub fn build(self) -> TypeDescription<T> {
        self.finish().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i64,
        y: i64,
    }

    #[test]
    fn builds_a_two_member_description() {
        let desc: TypeDescription<Point> = TypeDescriptionBuilder::new(NamingConvention::CamelCase)
            .member("X", |p: &Point| Value::from(p.x), |p: &mut Point, v| {
                if let Value::Number(n) = v {
                    p.x = n.as_f64() as i64;
                }
            })
            .member("Y", |p: &Point| Value::from(p.y), |p: &mut Point, v| {
                if let Value::Number(n) = v {
                    p.y = n.as_f64() as i64;
                }
            })
            .default_constructor(|| Point { x: 0, y: 0 })
            .build();

        assert_eq!(desc.members.len(), 2);
        assert_eq!(desc.members[0].json_name, "x");
        assert_eq!(desc.members[1].emission_plan, b"\"y\":");
    }
}
