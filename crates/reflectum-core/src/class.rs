//! Metaclass: per-type reflection metadata and inheritance casting.
//!
//! A [`Class`] describes one declared type: its ordered properties,
//! functions, constructors, and base-class edges. Each base edge carries the
//! byte offset needed to reinterpret a derived-layout pointer as a
//! base-layout pointer, so multiple independently-offset bases are supported.
//! Casting resolves a path through these edges at cast time instead of
//! relying on any compiler-computed layout.

use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::function::Function;
use crate::kind::Kind;
use crate::object::ObjectHandle;
use crate::property::{Property, PropertyVariant};
use crate::type_hash::TypeHash;
use crate::value::Value;
use crate::visitor::ClassVisitor;

/// An inheritance edge from a derived class to one of its bases.
pub struct BaseEdge {
    class: Arc<Class>,
    offset: isize,
}

impl BaseEdge {
    /// Create a base edge with the byte offset of the base subobject inside
    /// the derived layout.
    pub fn new(class: Arc<Class>, offset: isize) -> Self {
        Self { class, offset }
    }

    /// The base class.
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Byte offset applied when adjusting a derived pointer to this base.
    pub fn offset(&self) -> isize {
        self.offset
    }
}

/// Erased constructor factory: builds an owned handle from arguments.
pub type Factory = Arc<dyn Fn(&[Value], &Arc<Class>) -> Result<ObjectHandle, Error>>;

/// One declared constructor of a class.
pub struct Constructor {
    params: Vec<Kind>,
    factory: Factory,
}

impl Constructor {
    /// Create a constructor from its parameter kinds and factory.
    pub fn new(
        params: Vec<Kind>,
        factory: impl Fn(&[Value], &Arc<Class>) -> Result<ObjectHandle, Error> + 'static,
    ) -> Self {
        Self {
            params,
            factory: Arc::new(factory),
        }
    }

    /// Declared parameter kinds.
    pub fn params(&self) -> &[Kind] {
        &self.params
    }

    /// Whether the supplied arguments satisfy this constructor: the count
    /// must match and each argument kind must be acceptable for its slot.
    pub fn matches(&self, args: &[Value]) -> bool {
        args.len() == self.params.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| param.accepts(arg.kind()))
    }
}

/// Reflection metadata for one declared type.
pub struct Class {
    name: String,
    type_hash: TypeHash,
    properties: Vec<Arc<Property>>,
    property_index: FxHashMap<String, usize>,
    functions: Vec<Arc<Function>>,
    function_index: FxHashMap<String, usize>,
    constructors: Vec<Constructor>,
    bases: Vec<BaseEdge>,
}

impl Class {
    /// Assemble a class from its members.
    ///
    /// Property and function names must each be unique within the class;
    /// a duplicate fails with [`Error::AlreadyCreated`].
    pub fn new(
        name: impl Into<String>,
        type_hash: TypeHash,
        properties: Vec<Property>,
        functions: Vec<Function>,
        constructors: Vec<Constructor>,
        bases: Vec<BaseEdge>,
    ) -> Result<Self, Error> {
        let name = name.into();
        let mut property_index = FxHashMap::default();
        for (i, property) in properties.iter().enumerate() {
            if property_index
                .insert(property.name().to_string(), i)
                .is_some()
            {
                return Err(Error::AlreadyCreated {
                    name: format!("{}::{}", name, property.name()),
                });
            }
        }
        let mut function_index = FxHashMap::default();
        for (i, function) in functions.iter().enumerate() {
            if function_index
                .insert(function.name().to_string(), i)
                .is_some()
            {
                return Err(Error::AlreadyCreated {
                    name: format!("{}::{}", name, function.name()),
                });
            }
        }
        Ok(Self {
            name,
            type_hash,
            properties: properties.into_iter().map(Arc::new).collect(),
            property_index,
            functions: functions.into_iter().map(Arc::new).collect(),
            function_index,
            constructors,
            bases,
        })
    }

    /// The declared class name, unique within a registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identity hash of the native type this class describes.
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Number of declared properties.
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Arc<Property>> {
        self.properties.iter()
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Result<&Arc<Property>, Error> {
        self.property_index
            .get(name)
            .map(|&i| &self.properties[i])
            .ok_or_else(|| Error::PropertyNotFound {
                class: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Number of declared functions.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &Arc<Function>> {
        self.functions.iter()
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Result<&Arc<Function>, Error> {
        self.function_index
            .get(name)
            .map(|&i| &self.functions[i])
            .ok_or_else(|| Error::FunctionNotFound {
                class: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Declared base edges.
    pub fn bases(&self) -> &[BaseEdge] {
        &self.bases
    }

    /// Accumulated byte offset from this class's layout to the given base,
    /// searching the inheritance graph upward. `Some(0)` for the class
    /// itself.
    pub fn offset_to(&self, target: TypeHash) -> Option<isize> {
        if self.type_hash == target {
            return Some(0);
        }
        self.bases
            .iter()
            .find_map(|edge| edge.class.offset_to(target).map(|o| o + edge.offset))
    }

    /// Whether `other` lies on a base-or-derived path from this class.
    pub fn is_related_to(&self, other: &Class) -> bool {
        self.offset_to(other.type_hash).is_some() || other.offset_to(self.type_hash).is_some()
    }

    /// Construct an instance.
    ///
    /// Constructors are scanned in declaration order and the first whose
    /// [`Constructor::matches`] holds is used. First-match, not best-match:
    /// with overlapping signatures the earliest declared one wins even when a
    /// later one fits more precisely.
    pub fn construct(self: &Arc<Self>, args: &[Value]) -> Result<ObjectHandle, Error> {
        for constructor in &self.constructors {
            if constructor.matches(args) {
                return (constructor.factory)(args, self);
            }
        }
        Err(Error::NoMatchingConstructor {
            class: self.name.clone(),
            args: args.iter().map(Value::kind).collect(),
        })
    }

    /// Destroy a constructed instance, reversing the allocation made by
    /// [`construct`](Self::construct).
    ///
    /// The handle must be bound to this class; non-owning handles release
    /// nothing.
    pub fn destroy(&self, object: ObjectHandle) -> Result<(), Error> {
        if object.get_class()?.type_hash() != self.type_hash {
            return Err(Error::InvalidObject {
                class: object.get_class()?.name().to_string(),
                requested: self.name.clone(),
            });
        }
        drop(object);
        Ok(())
    }

    /// Walk the class shape: properties in declaration order, then
    /// functions, each double-dispatched to the visitor's most specific
    /// handler.
    pub fn accept(&self, visitor: &mut dyn ClassVisitor) {
        for property in &self.properties {
            match property.variant() {
                PropertyVariant::Simple(_) => visitor.visit_simple(property),
                PropertyVariant::Array { .. } => visitor.visit_array(property),
                PropertyVariant::Enum { .. } => visitor.visit_enum(property),
                PropertyVariant::User { .. } => visitor.visit_user(property),
            }
        }
        for function in &self.functions {
            visitor.visit_function(function);
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("type_hash", &self.type_hash)
            .field("properties", &self.properties.len())
            .field("functions", &self.functions.len())
            .field("constructors", &self.constructors.len())
            .field("bases", &self.bases.len())
            .finish()
    }
}

/// Adjust a pointer between related class layouts.
///
/// Searches the inheritance graph in either direction for a path between
/// `source` and `target`: upcasts accumulate the declared offsets, downcasts
/// apply them negated. Fails with [`Error::UnrelatedClasses`] when no path
/// exists.
pub fn class_cast(
    ptr: NonNull<u8>,
    source: &Class,
    target: &Class,
) -> Result<NonNull<u8>, Error> {
    let offset = source
        .offset_to(target.type_hash())
        .or_else(|| target.offset_to(source.type_hash()).map(|o| -o))
        .ok_or_else(|| Error::UnrelatedClasses {
            from: source.name().to_string(),
            to: target.name().to_string(),
        })?;
    // SAFETY: the accumulated offset stays inside the allocation of the most
    // derived object, as declared with the base edges.
    Ok(unsafe { NonNull::new_unchecked(ptr.as_ptr().offset(offset)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(name: &str, bases: Vec<BaseEdge>) -> Arc<Class> {
        Arc::new(
            Class::new(
                name,
                TypeHash::of_class(name),
                Vec::new(),
                Vec::new(),
                Vec::new(),
                bases,
            )
            .unwrap(),
        )
    }

    #[test]
    fn offset_accumulates_along_the_base_chain() {
        let a = bare("A", vec![]);
        let b = bare("B", vec![BaseEdge::new(a.clone(), 8)]);
        let c = bare("C", vec![BaseEdge::new(b.clone(), 16)]);

        assert_eq!(c.offset_to(c.type_hash()), Some(0));
        assert_eq!(c.offset_to(b.type_hash()), Some(16));
        assert_eq!(c.offset_to(a.type_hash()), Some(24));
        assert_eq!(a.offset_to(c.type_hash()), None);
    }

    #[test]
    fn multiple_bases_resolve_independently() {
        let b1 = bare("Base1", vec![]);
        let b2 = bare("Base2", vec![]);
        let d = bare(
            "Derived",
            vec![
                BaseEdge::new(b1.clone(), 0),
                BaseEdge::new(b2.clone(), 12),
            ],
        );

        assert_eq!(d.offset_to(b1.type_hash()), Some(0));
        assert_eq!(d.offset_to(b2.type_hash()), Some(12));
        assert!(d.is_related_to(&b2));
        assert!(b2.is_related_to(&d));
        assert!(!b1.is_related_to(&b2));
    }

    #[test]
    fn cast_between_unrelated_classes_fails() {
        let a = bare("A", vec![]);
        let b = bare("B", vec![]);
        let mut dummy = 0u64;
        let ptr = NonNull::from(&mut dummy).cast::<u8>();
        let err = class_cast(ptr, &a, &b).unwrap_err();
        assert_eq!(
            err,
            Error::UnrelatedClasses {
                from: "A".into(),
                to: "B".into(),
            }
        );
    }

    #[test]
    fn down_cast_negates_the_accumulated_offset() {
        let base = bare("Base", vec![]);
        let derived = bare("Derived", vec![BaseEdge::new(base.clone(), 16)]);

        let mut storage = [0u8; 32];
        let derived_ptr = NonNull::from(&mut storage[0]);
        let base_ptr = class_cast(derived_ptr, &derived, &base).unwrap();
        assert_eq!(
            base_ptr.as_ptr() as usize,
            derived_ptr.as_ptr() as usize + 16
        );
        let back = class_cast(base_ptr, &base, &derived).unwrap();
        assert_eq!(back, derived_ptr);
    }

    #[test]
    fn duplicate_property_name_is_rejected() {
        use crate::property::{Accessor, AccessFlags};

        let make = |name: &str| {
            Property::new(
                "Dup",
                name,
                Kind::Int,
                AccessFlags::READ,
                PropertyVariant::Simple(Accessor::Constant(Value::Int(0))),
            )
        };
        let err = Class::new(
            "Dup",
            TypeHash::of_class("Dup"),
            vec![make("x"), make("x")],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::AlreadyCreated {
                name: "Dup::x".into()
            }
        );
    }

    #[test]
    fn member_lookup_errors_carry_owner_and_name() {
        let class = bare("Point", vec![]);
        assert_eq!(
            class.property("z").unwrap_err(),
            Error::PropertyNotFound {
                class: "Point".into(),
                name: "z".into(),
            }
        );
        assert_eq!(
            class.function("norm").unwrap_err(),
            Error::FunctionNotFound {
                class: "Point".into(),
                name: "norm".into(),
            }
        );
    }
}
