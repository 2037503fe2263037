//! Double-dispatch visitors for values and metaclass members.
//!
//! Visitation is the mechanism external consumers (serializers, editors,
//! binding layers) use to enumerate a value's kind or a class's shape without
//! switching on type tags themselves.

use crate::function::Function;
use crate::object::ObjectHandle;
use crate::property::Property;
use crate::value::{EnumValue, Value};

/// Visitor over the closed set of value kinds.
///
/// [`Value::visit`] dispatches to the handler matching the held kind. Every
/// handler is required, including [`visit_none`](Self::visit_none): there is
/// no implicit default for the empty kind.
pub trait ValueVisitor {
    /// Result produced per visited value.
    type Output;

    /// Handle the empty value.
    fn visit_none(&mut self) -> Self::Output;

    /// Handle a boolean payload.
    fn visit_bool(&mut self, value: bool) -> Self::Output;

    /// Handle an integer payload.
    fn visit_int(&mut self, value: i64) -> Self::Output;

    /// Handle a floating-point payload.
    fn visit_real(&mut self, value: f64) -> Self::Output;

    /// Handle a string payload.
    fn visit_string(&mut self, value: &str) -> Self::Output;

    /// Handle an enum-member payload.
    fn visit_enum(&mut self, value: &EnumValue) -> Self::Output;

    /// Handle an array payload.
    fn visit_array(&mut self, values: &[Value]) -> Self::Output;

    /// Handle an object-handle payload.
    fn visit_user(&mut self, object: &ObjectHandle) -> Self::Output;
}

/// Visitor over the members of a metaclass.
///
/// [`Class::accept`](crate::Class::accept) walks properties in declared
/// order, then functions, dispatching each property to the most specific
/// handler for its variant. The specific handlers default to the generic
/// [`visit_property`](Self::visit_property) fallback, so a consumer that does
/// not care about variants overrides only that.
pub trait ClassVisitor {
    /// Handle a simple (scalar) property.
    fn visit_simple(&mut self, property: &Property) {
        self.visit_property(property);
    }

    /// Handle an array property.
    fn visit_array(&mut self, property: &Property) {
        self.visit_property(property);
    }

    /// Handle an enum property.
    fn visit_enum(&mut self, property: &Property) {
        self.visit_property(property);
    }

    /// Handle a user (nested class) property.
    fn visit_user(&mut self, property: &Property) {
        self.visit_property(property);
    }

    /// Generic fallback for properties without a specific handler.
    fn visit_property(&mut self, _property: &Property) {}

    /// Handle a function.
    fn visit_function(&mut self, _function: &Function) {}
}
