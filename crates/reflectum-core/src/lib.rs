//! Core of the reflectum metaobject engine.
//!
//! This crate provides the runtime-queryable description of declared types
//! and the type-erased layer for working with their instances:
//!
//! - [`Value`] / [`Kind`] - tagged value union with conversion, visitation,
//!   and a total order.
//! - [`ObjectHandle`] - type-erased instance reference backed by one of three
//!   ownership strategies (by-reference, by-copy, by-parent-property).
//! - [`Property`] / [`Function`] - named, typed, gated accessors and
//!   invocables bound to an owner class.
//! - [`Class`] - per-type metadata with constructors and base edges carrying
//!   byte offsets for inheritance pointer adjustment ([`class_cast`]).
//! - [`EnumMeta`] - ordered bidirectional name/value tables.
//!
//! Registries mapping names and type identities to this metadata live in the
//! companion `reflectum-registry` crate.
//!
//! The engine is single-threaded-cooperative: nothing here locks, suspends,
//! performs I/O, or retries. Every failure is a typed [`Error`] raised at the
//! point of detection.

mod class;
mod enum_meta;
mod error;
mod function;
mod kind;
mod object;
mod property;
mod reflect;
mod type_hash;
mod value;
mod visitor;

pub use class::{class_cast, BaseEdge, Class, Constructor, Factory};
pub use enum_meta::{EnumMeta, EnumPair};
pub use error::Error;
pub use function::{Function, FunctionBody};
pub use kind::Kind;
pub use object::{ObjectHandle, TypedRef};
pub use property::{
    AccessFlags, Accessor, ArrayAccessor, Getter, Predicate, Property, PropertyVariant, Setter,
};
pub use reflect::Reflect;
pub use type_hash::{hash_constants, TypeHash};
pub use value::{EnumValue, FromValue, Value};
pub use visitor::{ClassVisitor, ValueVisitor};
