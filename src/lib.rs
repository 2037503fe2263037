//! Reflectum: a runtime reflection metaobject engine.
//!
//! Declares classes and enums as runtime-queryable metadata and works with
//! their instances through a type-erased layer. The facade re-exports the
//! core model ([`Value`], [`ObjectHandle`], [`Class`], [`EnumMeta`]), the
//! registries, and the fluent declaration builders.
//!
//! # Example
//!
//! ```
//! use reflectum::{ClassBuilder, Kind, Reflect, Registry, Value};
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
//! # fn main() -> Result<(), reflectum::Error> {
//! let mut registry = Registry::new();
//! registry.declare_class(
//!     ClassBuilder::<Point>::new("Point")
//!         .constructor(&[Kind::Int, Kind::Int], |args| {
//!             Ok(Point {
//!                 x: args[0].to::<i64>()?,
//!                 y: args[1].to::<i64>()?,
//!             })
//!         })
//!         .property("x", Kind::Int, |p| Value::from(p.x), |p, v| {
//!             p.x = v.to::<i64>()?;
//!             Ok(())
//!         })
//!         .property("y", Kind::Int, |p| Value::from(p.y), |p, v| {
//!             p.y = v.to::<i64>()?;
//!             Ok(())
//!         })
//!         .build()?,
//! )?;
//!
//! let class = registry.class_by_name("Point")?;
//! let mut point = class.construct(&[Value::Int(3), Value::Int(4)])?;
//! assert_eq!(point.get("x")?, Value::Int(3));
//! point.set("y", Value::Int(10))?;
//! assert_eq!(point.get("y")?, Value::Int(10));
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::{ClassBuilder, EnumBuilder};
pub use reflectum_core::{
    class_cast, hash_constants, AccessFlags, Accessor, ArrayAccessor, BaseEdge, Class,
    ClassVisitor, Constructor, EnumMeta, EnumPair, EnumValue, Error, Factory, FromValue, Function,
    FunctionBody, Getter, Kind, ObjectHandle, Predicate, Property, PropertyVariant, Reflect,
    Setter, TypeHash, TypedRef, Value, ValueVisitor,
};
pub use reflectum_registry::{Registry, RegistryObserver};
