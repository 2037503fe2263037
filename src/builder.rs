//! Fluent builders for declaring classes and enums.
//!
//! A builder is typed over the native type being described; it wraps the
//! caller's typed closures into the erased accessor closures the core
//! dispatches through. Dynamic gates (`readable_if`, `writable_if`,
//! `callable_if`) apply to the most recently added member.
//!
//! # Example
//!
//! ```
//! use reflectum::{ClassBuilder, Kind, Reflect, Value};
//!
//! #[derive(Clone)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! impl Reflect for Point {
//!     fn type_name() -> &'static str {
//!         "Point"
//!     }
//! }
//!
//! let class = ClassBuilder::<Point>::new("Point")
//!     .constructor(&[Kind::Int, Kind::Int], |args| {
//!         Ok(Point {
//!             x: args[0].to::<i64>()?,
//!             y: args[1].to::<i64>()?,
//!         })
//!     })
//!     .property("x", Kind::Int, |p| Value::from(p.x), |p, v| {
//!         p.x = v.to::<i64>()?;
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(class.property_count(), 1);
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use reflectum_core::{
    AccessFlags, Accessor, ArrayAccessor, BaseEdge, Class, Constructor, EnumMeta, EnumPair,
    EnumValue, Error, Function, Kind, ObjectHandle, Property, PropertyVariant, Reflect, TypeHash,
    Value,
};

fn wrap_getter<T: Reflect>(
    get: impl Fn(&T) -> Value + 'static,
) -> impl Fn(&ObjectHandle) -> Result<Value, Error> + 'static {
    move |object: &ObjectHandle| Ok(get(&*object.get_as::<T>()?))
}

fn wrap_setter<T: Reflect>(
    set: impl Fn(&mut T, Value) -> Result<(), Error> + 'static,
) -> impl Fn(&mut ObjectHandle, Value) -> Result<(), Error> + 'static {
    move |object, value| set(object.get_as_mut::<T>()?, value)
}

fn wrap_predicate<T: Reflect>(
    predicate: impl Fn(&T) -> bool + 'static,
) -> impl Fn(&ObjectHandle) -> bool + 'static {
    move |object| match object.get_as::<T>() {
        Ok(target) => predicate(&target),
        Err(_) => false,
    }
}

/// Builder for declaring a metaclass over a native type.
///
/// Members keep the order they are added in; that order is observable
/// through iteration, visitation, and constructor matching.
pub struct ClassBuilder<T: Reflect + Clone> {
    name: String,
    properties: Vec<Property>,
    functions: Vec<Function>,
    constructors: Vec<Constructor>,
    bases: Vec<BaseEdge>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect + Clone> ClassBuilder<T> {
    /// Start declaring a class under the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            functions: Vec::new(),
            constructors: Vec::new(),
            bases: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declare a base class with the byte offset of the base subobject
    /// inside `T`'s layout (usually `std::mem::offset_of!`).
    pub fn base(mut self, class: &Arc<Class>, offset: usize) -> Self {
        self.bases.push(BaseEdge::new(class.clone(), offset as isize));
        self
    }

    /// Declare a constructor. Constructors are tried in declaration order
    /// and the first whose parameter kinds accept the arguments wins.
    pub fn constructor(
        mut self,
        params: &[Kind],
        factory: impl Fn(&[Value]) -> Result<T, Error> + 'static,
    ) -> Self {
        self.constructors.push(Constructor::new(
            params.to_vec(),
            move |args, class| ObjectHandle::owned(class, factory(args)?),
        ));
        self
    }

    /// Declare a read-write scalar property.
    pub fn property(
        mut self,
        name: impl Into<String>,
        kind: Kind,
        get: impl Fn(&T) -> Value + 'static,
        set: impl Fn(&mut T, Value) -> Result<(), Error> + 'static,
    ) -> Self {
        self.properties.push(Property::new(
            self.name.clone(),
            name,
            kind,
            AccessFlags::READ | AccessFlags::WRITE,
            PropertyVariant::Simple(Accessor::Bound {
                get: Arc::new(wrap_getter(get)),
                set: Some(Arc::new(wrap_setter(set))),
            }),
        ));
        self
    }

    /// Declare a read-only scalar property.
    pub fn read_only(
        mut self,
        name: impl Into<String>,
        kind: Kind,
        get: impl Fn(&T) -> Value + 'static,
    ) -> Self {
        self.properties.push(Property::new(
            self.name.clone(),
            name,
            kind,
            AccessFlags::READ,
            PropertyVariant::Simple(Accessor::Bound {
                get: Arc::new(wrap_getter(get)),
                set: None,
            }),
        ));
        self
    }

    /// Declare a constant property, independent of the instance.
    pub fn constant(mut self, name: impl Into<String>, value: Value) -> Self {
        let kind = value.kind();
        self.properties.push(Property::new(
            self.name.clone(),
            name,
            kind,
            AccessFlags::READ,
            PropertyVariant::Simple(Accessor::Constant(value)),
        ));
        self
    }

    /// Declare a read-write property holding a member of a declared enum.
    pub fn enum_property(
        mut self,
        name: impl Into<String>,
        meta: &Arc<EnumMeta>,
        get: impl Fn(&T) -> i64 + 'static,
        set: impl Fn(&mut T, i64) -> Result<(), Error> + 'static,
    ) -> Self {
        let getter_meta = meta.clone();
        self.properties.push(Property::new(
            self.name.clone(),
            name,
            Kind::Enum,
            AccessFlags::READ | AccessFlags::WRITE,
            PropertyVariant::Enum {
                meta: meta.clone(),
                accessor: Accessor::Bound {
                    get: Arc::new(move |object: &ObjectHandle| {
                        let value = get(&*object.get_as::<T>()?);
                        Ok(Value::Enum(EnumValue::new(value, getter_meta.clone())))
                    }),
                    set: Some(Arc::new(move |object: &mut ObjectHandle, value: Value| {
                        set(object.get_as_mut::<T>()?, value.to::<i64>()?)
                    })),
                },
            },
        ));
        self
    }

    /// Declare a read-write property holding an instance of another declared
    /// class, enabling recursive navigation.
    pub fn user_property(
        mut self,
        name: impl Into<String>,
        class: &Arc<Class>,
        get: impl Fn(&T) -> Result<ObjectHandle, Error> + 'static,
        set: impl Fn(&mut T, ObjectHandle) -> Result<(), Error> + 'static,
    ) -> Self {
        self.properties.push(Property::new(
            self.name.clone(),
            name,
            Kind::User,
            AccessFlags::READ | AccessFlags::WRITE,
            PropertyVariant::User {
                class: class.clone(),
                accessor: Accessor::Bound {
                    get: Arc::new(move |object: &ObjectHandle| {
                        Ok(Value::User(get(&*object.get_as::<T>()?)?))
                    }),
                    set: Some(Arc::new(move |object: &mut ObjectHandle, value: Value| {
                        set(object.get_as_mut::<T>()?, value.to::<ObjectHandle>()?)
                    })),
                },
            },
        ));
        self
    }

    /// Declare a fixed-size array property.
    pub fn array_property(
        mut self,
        name: impl Into<String>,
        element_kind: Kind,
        size: impl Fn(&T) -> usize + 'static,
        get: impl Fn(&T, usize) -> Value + 'static,
        set: impl Fn(&mut T, usize, Value) -> Result<(), Error> + 'static,
    ) -> Self {
        self.properties.push(Property::new(
            self.name.clone(),
            name,
            Kind::Array,
            AccessFlags::READ | AccessFlags::WRITE,
            PropertyVariant::Array {
                element_kind,
                accessor: ArrayAccessor::fixed(
                    move |object: &ObjectHandle| Ok(size(&*object.get_as::<T>()?)),
                    move |object: &ObjectHandle, index| Ok(get(&*object.get_as::<T>()?, index)),
                    move |object: &mut ObjectHandle, index, value| {
                        set(object.get_as_mut::<T>()?, index, value)
                    },
                ),
            },
        ));
        self
    }

    /// Declare a dynamically resizable array property.
    #[allow(clippy::too_many_arguments)]
    pub fn resizable_array_property(
        mut self,
        name: impl Into<String>,
        element_kind: Kind,
        size: impl Fn(&T) -> usize + 'static,
        get: impl Fn(&T, usize) -> Value + 'static,
        set: impl Fn(&mut T, usize, Value) -> Result<(), Error> + 'static,
        insert: impl Fn(&mut T, usize, Value) -> Result<(), Error> + 'static,
        remove: impl Fn(&mut T, usize) -> Result<(), Error> + 'static,
    ) -> Self {
        self.properties.push(Property::new(
            self.name.clone(),
            name,
            Kind::Array,
            AccessFlags::READ | AccessFlags::WRITE,
            PropertyVariant::Array {
                element_kind,
                accessor: ArrayAccessor::fixed(
                    move |object: &ObjectHandle| Ok(size(&*object.get_as::<T>()?)),
                    move |object: &ObjectHandle, index| Ok(get(&*object.get_as::<T>()?, index)),
                    move |object: &mut ObjectHandle, index, value| {
                        set(object.get_as_mut::<T>()?, index, value)
                    },
                )
                .resizable(
                    move |object: &mut ObjectHandle, index, value| {
                        insert(object.get_as_mut::<T>()?, index, value)
                    },
                    move |object: &mut ObjectHandle, index| {
                        remove(object.get_as_mut::<T>()?, index)
                    },
                ),
            },
        ));
        self
    }

    /// Declare a function.
    pub fn function(
        mut self,
        name: impl Into<String>,
        return_kind: Kind,
        params: &[Kind],
        body: impl Fn(&mut T, &[Value]) -> Result<Value, Error> + 'static,
    ) -> Self {
        self.functions.push(Function::new(
            self.name.clone(),
            name,
            return_kind,
            params.to_vec(),
            move |object: &mut ObjectHandle, args: &[Value]| body(object.get_as_mut::<T>()?, args),
        ));
        self
    }

    /// Gate reads of the most recently added property on a per-object
    /// predicate.
    pub fn readable_if(mut self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        if let Some(property) = self.properties.pop() {
            self.properties
                .push(property.with_readable_if(wrap_predicate(predicate)));
        }
        self
    }

    /// Gate writes of the most recently added property on a per-object
    /// predicate.
    pub fn writable_if(mut self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        if let Some(property) = self.properties.pop() {
            self.properties
                .push(property.with_writable_if(wrap_predicate(predicate)));
        }
        self
    }

    /// Gate calls of the most recently added function on a per-object
    /// predicate.
    pub fn callable_if(mut self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        if let Some(function) = self.functions.pop() {
            self.functions
                .push(function.with_callable_if(wrap_predicate(predicate)));
        }
        self
    }

    /// Assemble the class. Fails when two members share a name.
    pub fn build(self) -> Result<Class, Error> {
        Class::new(
            self.name,
            T::type_hash(),
            self.properties,
            self.functions,
            self.constructors,
            self.bases,
        )
    }
}

/// Builder for declaring enum metadata over a native type.
pub struct EnumBuilder<T: 'static> {
    name: String,
    pairs: Vec<EnumPair>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> EnumBuilder<T> {
    /// Start declaring an enum under the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pairs: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Add a member. Order is preserved.
    pub fn value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.pairs.push(EnumPair::new(name, value));
        self
    }

    /// Assemble the metadata. Fails when two members share a name or a
    /// value.
    pub fn build(self) -> Result<EnumMeta, Error> {
        EnumMeta::new(
            self.name,
            TypeHash::of_enum(std::any::type_name::<T>()),
            self.pairs,
        )
    }
}
