//! Tagged value type with conversion and visitation.
//!
//! [`Value`] is the unified runtime representation flowing through property
//! reads, writes, and function calls. A value is immutable once constructed
//! and its tag always matches the live payload.
//!
//! Ordering is total: values of the same kind compare structurally (reals
//! through a total float order), values of differing kinds compare by the
//! fixed kind rank. No coercion is ever attempted during comparison.

use std::fmt;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::enum_meta::EnumMeta;
use crate::error::Error;
use crate::kind::Kind;
use crate::object::ObjectHandle;
use crate::visitor::ValueVisitor;

/// A member of a declared enum, carrying its owning metadata so the member
/// name stays resolvable.
#[derive(Debug, Clone)]
pub struct EnumValue {
    value: i64,
    meta: Arc<EnumMeta>,
}

impl EnumValue {
    /// Create an enum value bound to its owning enum metadata.
    pub fn new(value: i64, meta: Arc<EnumMeta>) -> Self {
        Self { value, meta }
    }

    /// The integer value.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// The owning enum metadata.
    pub fn meta(&self) -> &Arc<EnumMeta> {
        &self.meta
    }

    /// Resolve the member name through the owning enum.
    pub fn name(&self) -> Result<&str, Error> {
        self.meta.name_of(self.value)
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.meta.type_hash() == other.meta.type_hash()
    }
}

impl Eq for EnumValue {}

/// Tagged union over the supported kinds.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The empty value.
    #[default]
    None,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Real(f64),
    /// UTF-8 string.
    String(String),
    /// A member of a declared enum.
    Enum(EnumValue),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// An instance of a declared class.
    User(ObjectHandle),
}

impl Value {
    /// The kind tag of the held payload.
    pub fn kind(&self) -> Kind {
        match self {
            Value::None => Kind::None,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Real(_) => Kind::Real,
            Value::String(_) => Kind::String,
            Value::Enum(_) => Kind::Enum,
            Value::Array(_) => Kind::Array,
            Value::User(_) => Kind::User,
        }
    }

    /// Check if this is the empty value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Convert to a concrete type.
    ///
    /// When the held kind already matches the requested kind this is an
    /// identity copy; otherwise the per-kind converter runs. Raises
    /// [`Error::BadType`] when no converter exists and [`Error::EmptyValue`]
    /// when the value is empty.
    pub fn to<T: FromValue>(&self) -> Result<T, Error> {
        T::from_value(self)
    }

    /// Double-dispatch to the visitor handler matching the held kind.
    ///
    /// The dispatch is an exhaustive match over the closed kind set; the
    /// visitor provides an explicit handler for the empty kind.
    pub fn visit<V: ValueVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Value::None => visitor.visit_none(),
            Value::Bool(v) => visitor.visit_bool(*v),
            Value::Int(v) => visitor.visit_int(*v),
            Value::Real(v) => visitor.visit_real(*v),
            Value::String(v) => visitor.visit_string(v),
            Value::Enum(v) => visitor.visit_enum(v),
            Value::Array(v) => visitor.visit_array(v),
            Value::User(v) => visitor.visit_user(v),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (Value::None, Value::None) => std::cmp::Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Real(a), Value::Real(b)) => OrderedFloat(*a).cmp(&OrderedFloat(*b)),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Enum(a), Value::Enum(b)) => a
                .value()
                .cmp(&b.value())
                .then_with(|| a.meta().type_hash().cmp(&b.meta().type_hash())),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::User(a), Value::User(b)) => a.cmp(b),
            // Differing kinds: stable kind-rank order, no coercion.
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Enum(v) => match v.name() {
                Ok(name) => f.write_str(name),
                Err(_) => write!(f, "{}", v.value()),
            },
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::User(handle) => write!(f, "{handle}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<ObjectHandle> for Value {
    fn from(v: ObjectHandle) -> Self {
        Value::User(v)
    }
}

/// Conversion from a [`Value`] to a concrete Rust type.
///
/// Implementations cover the identity case plus the supported cross-kind
/// converters. Converting the empty value always fails.
pub trait FromValue: Sized {
    /// The kind this conversion targets, used in error diagnostics.
    const KIND: Kind;

    /// Convert from the given value.
    fn from_value(value: &Value) -> Result<Self, Error>;
}

fn mismatch<T: FromValue>(value: &Value) -> Error {
    match value {
        Value::None => Error::EmptyValue { requested: T::KIND },
        other => Error::BadType {
            held: other.kind(),
            requested: T::KIND,
        },
    }
}

impl FromValue for Value {
    const KIND: Kind = Kind::None;

    fn from_value(value: &Value) -> Result<Self, Error> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    const KIND: Kind = Kind::Bool;

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            Value::Real(v) => Ok(*v != 0.0),
            Value::String(s) => match s.as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(mismatch::<Self>(value)),
            },
            Value::Enum(e) => Ok(e.value() != 0),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for i64 {
    const KIND: Kind = Kind::Int;

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Bool(v) => Ok(*v as i64),
            Value::Int(v) => Ok(*v),
            Value::Real(v) => Ok(*v as i64),
            Value::String(s) => s.parse().map_err(|_| mismatch::<Self>(value)),
            Value::Enum(e) => Ok(e.value()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for f64 {
    const KIND: Kind = Kind::Real;

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
            Value::Int(v) => Ok(*v as f64),
            Value::Real(v) => Ok(*v),
            Value::String(s) => s.parse().map_err(|_| mismatch::<Self>(value)),
            Value::Enum(e) => Ok(e.value() as f64),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for String {
    const KIND: Kind = Kind::String;

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Bool(v) => Ok(v.to_string()),
            Value::Int(v) => Ok(v.to_string()),
            Value::Real(v) => Ok(v.to_string()),
            Value::String(s) => Ok(s.clone()),
            Value::Enum(e) => Ok(e
                .name()
                .map(str::to_string)
                .unwrap_or_else(|_| e.value().to_string())),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for EnumValue {
    const KIND: Kind = Kind::Enum;

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Enum(e) => Ok(e.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for Vec<Value> {
    const KIND: Kind = Kind::Array;

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Array(items) => Ok(items.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for ObjectHandle {
    const KIND: Kind = Kind::User;

    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::User(handle) => Ok(handle.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enum_meta::EnumPair;
    use crate::type_hash::TypeHash;

    fn color() -> Arc<EnumMeta> {
        Arc::new(
            EnumMeta::new(
                "Color",
                TypeHash::of_enum("Color"),
                vec![EnumPair::new("Red", 0), EnumPair::new("Green", 1)],
            )
            .unwrap(),
        )
    }

    #[test]
    fn identity_conversion_returns_the_held_payload() {
        assert_eq!(Value::Int(42).to::<i64>().unwrap(), 42);
        assert_eq!(Value::Bool(true).to::<bool>().unwrap(), true);
        assert_eq!(Value::from("hi").to::<String>().unwrap(), "hi");
    }

    #[test]
    fn cross_kind_conversions() {
        assert_eq!(Value::Int(3).to::<f64>().unwrap(), 3.0);
        assert_eq!(Value::Real(2.9).to::<i64>().unwrap(), 2);
        assert_eq!(Value::from("18").to::<i64>().unwrap(), 18);
        assert_eq!(Value::from("true").to::<bool>().unwrap(), true);
        assert_eq!(Value::Bool(true).to::<i64>().unwrap(), 1);
        assert_eq!(Value::Int(5).to::<String>().unwrap(), "5");
    }

    #[test]
    fn enum_value_converts_to_int_and_name() {
        let v = Value::Enum(EnumValue::new(1, color()));
        assert_eq!(v.to::<i64>().unwrap(), 1);
        assert_eq!(v.to::<String>().unwrap(), "Green");
    }

    #[test]
    fn unparseable_string_is_a_type_mismatch() {
        let err = Value::from("not a number").to::<i64>().unwrap_err();
        assert_eq!(
            err,
            Error::BadType {
                held: Kind::String,
                requested: Kind::Int,
            }
        );
    }

    #[test]
    fn empty_value_never_converts() {
        assert_eq!(
            Value::None.to::<i64>().unwrap_err(),
            Error::EmptyValue {
                requested: Kind::Int
            }
        );
        assert_eq!(
            Value::None.to::<String>().unwrap_err(),
            Error::EmptyValue {
                requested: Kind::String
            }
        );
    }

    #[test]
    fn same_kind_values_compare_structurally() {
        assert!(Value::Int(1) < Value::Int(2));
        assert!(Value::from("a") < Value::from("b"));
        assert_eq!(Value::Real(1.5), Value::Real(1.5));
        assert!(Value::Real(f64::NAN) == Value::Real(f64::NAN));
    }

    #[test]
    fn differing_kinds_compare_by_kind_rank() {
        // A huge int still sorts below any real, and any string sorts above
        // both; coercion never participates in ordering.
        assert!(Value::Int(i64::MAX) < Value::Real(0.0));
        assert!(Value::Real(f64::MAX) < Value::from(""));
        assert!(Value::None < Value::Bool(false));
    }

    #[test]
    fn visitation_dispatches_on_the_held_kind() {
        struct KindName;

        impl ValueVisitor for KindName {
            type Output = &'static str;

            fn visit_none(&mut self) -> &'static str {
                "none"
            }
            fn visit_bool(&mut self, _: bool) -> &'static str {
                "bool"
            }
            fn visit_int(&mut self, _: i64) -> &'static str {
                "int"
            }
            fn visit_real(&mut self, _: f64) -> &'static str {
                "real"
            }
            fn visit_string(&mut self, _: &str) -> &'static str {
                "string"
            }
            fn visit_enum(&mut self, _: &EnumValue) -> &'static str {
                "enum"
            }
            fn visit_array(&mut self, _: &[Value]) -> &'static str {
                "array"
            }
            fn visit_user(&mut self, _: &ObjectHandle) -> &'static str {
                "user"
            }
        }

        assert_eq!(Value::None.visit(&mut KindName), "none");
        assert_eq!(Value::Int(1).visit(&mut KindName), "int");
        assert_eq!(Value::Array(vec![]).visit(&mut KindName), "array");
    }

    #[test]
    fn display_formats_per_kind() {
        assert_eq!(Value::None.to_string(), "none");
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::from("x").to_string(), "x");
        assert_eq!(Value::Enum(EnumValue::new(0, color())).to_string(), "Red");
    }
}
