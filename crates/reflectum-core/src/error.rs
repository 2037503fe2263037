//! Typed errors for the metaobject engine.
//!
//! Every failure carries enough structured context (names, owning class or
//! enum, offending kind pair, index and bound) to form a diagnostic without
//! string parsing. Propagation is immediate and local: nothing is retried or
//! logged internally; each violation is raised at the point of detection.

use thiserror::Error;

use crate::kind::Kind;

/// Errors raised by lookups, gated access, conversion, construction, and
/// inheritance casting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No class with the given name (or type identity) is declared.
    #[error("class not found: {name}")]
    ClassNotFound {
        /// The requested class name.
        name: String,
    },

    /// No enum with the given name (or type identity) is declared.
    #[error("enum not found: {name}")]
    EnumNotFound {
        /// The requested enum name.
        name: String,
    },

    /// A class has no property with the requested name.
    #[error("class '{class}' has no property '{name}'")]
    PropertyNotFound {
        /// The owning class.
        class: String,
        /// The requested property name.
        name: String,
    },

    /// A class has no function with the requested name.
    #[error("class '{class}' has no function '{name}'")]
    FunctionNotFound {
        /// The owning class.
        class: String,
        /// The requested function name.
        name: String,
    },

    /// An enum has no member with the requested name.
    #[error("enum '{owner}' has no member named '{name}'")]
    EnumNameNotFound {
        /// The owning enum.
        owner: String,
        /// The requested member name.
        name: String,
    },

    /// An enum has no member with the requested value.
    #[error("enum '{owner}' has no member with value {value}")]
    EnumValueNotFound {
        /// The owning enum.
        owner: String,
        /// The requested member value.
        value: i64,
    },

    /// A class, enum, or member with the same name or identity already
    /// exists.
    #[error("'{name}' has already been created")]
    AlreadyCreated {
        /// The colliding name.
        name: String,
    },

    /// The property's read gate (static flag AND dynamic predicate) failed.
    #[error("property '{property}' of class '{class}' is not readable")]
    ForbiddenRead {
        /// The owning class.
        class: String,
        /// The property name.
        property: String,
    },

    /// The property's write gate (static flag AND dynamic predicate) failed.
    #[error("property '{property}' of class '{class}' is not writable")]
    ForbiddenWrite {
        /// The owning class.
        class: String,
        /// The property name.
        property: String,
    },

    /// The function's call gate (static flag AND dynamic predicate) failed.
    #[error("function '{function}' of class '{class}' is not callable")]
    ForbiddenCall {
        /// The owning class.
        class: String,
        /// The function name.
        function: String,
    },

    /// No converter exists between the held and requested kinds.
    #[error("cannot convert {held} value to {requested}")]
    BadType {
        /// The kind actually held.
        held: Kind,
        /// The kind requested.
        requested: Kind,
    },

    /// The empty value was asked to convert to a concrete kind.
    #[error("cannot convert the empty value to {requested}")]
    EmptyValue {
        /// The kind requested.
        requested: Kind,
    },

    /// An array index was outside the current size.
    #[error("index {index} is out of bounds (size {size})")]
    OutOfBounds {
        /// The offending index.
        index: usize,
        /// The array size at the time of access.
        size: usize,
    },

    /// No declared constructor matched the supplied arguments.
    #[error("no constructor of class '{class}' matches the supplied arguments {args:?}")]
    NoMatchingConstructor {
        /// The class being constructed.
        class: String,
        /// The kinds of the supplied arguments.
        args: Vec<Kind>,
    },

    /// A cast was requested between classes with no base-or-derived path.
    #[error("classes '{from}' and '{to}' are not related")]
    UnrelatedClasses {
        /// The source class.
        from: String,
        /// The target class.
        to: String,
    },

    /// Typed extraction requested a type unrelated to the handle's class.
    #[error("object of class '{class}' cannot be viewed as '{requested}'")]
    InvalidObject {
        /// The class the handle is bound to.
        class: String,
        /// The requested type name.
        requested: String,
    },

    /// The empty object handle was used where a bound object is required.
    #[error("empty object handle used where a bound object is required")]
    EmptyObject,

    /// A call supplied fewer arguments than the function declares.
    #[error("function '{function}' expects {expected} argument(s), got {got}")]
    NotEnoughArguments {
        /// The function name.
        function: String,
        /// The declared parameter count.
        expected: usize,
        /// The number of arguments supplied.
        got: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = Error::BadType {
            held: Kind::String,
            requested: Kind::Int,
        };
        assert_eq!(err.to_string(), "cannot convert string value to int");

        let err = Error::OutOfBounds { index: 7, size: 3 };
        assert_eq!(err.to_string(), "index 7 is out of bounds (size 3)");

        let err = Error::PropertyNotFound {
            class: "Point".into(),
            name: "z".into(),
        };
        assert_eq!(err.to_string(), "class 'Point' has no property 'z'");
    }
}
