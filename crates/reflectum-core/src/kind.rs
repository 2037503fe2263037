//! Closed kind enumeration for reflected values.

use std::fmt;

/// The kind of payload a [`Value`](crate::Value) carries, or the declared
/// type of a property, parameter, or return slot.
///
/// The declaration order is the fixed kind rank used when ordering values of
/// differing kinds. Same-kind values compare structurally instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// The empty value.
    None,
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit floating point.
    Real,
    /// UTF-8 string.
    String,
    /// A member of a declared enum.
    Enum,
    /// An ordered sequence of values.
    Array,
    /// An instance of a declared class, held through an object handle.
    User,
}

impl Kind {
    /// Human-readable kind name, as used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Kind::None => "none",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Real => "real",
            Kind::String => "string",
            Kind::Enum => "enum",
            Kind::Array => "array",
            Kind::User => "user",
        }
    }

    /// Whether this kind belongs to the freely inter-convertible numeric
    /// family (bool, int, real).
    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::Bool | Kind::Int | Kind::Real)
    }

    /// Whether an argument of kind `arg` is acceptable where this kind is
    /// declared. Used by constructor matching: exact kinds always match,
    /// numeric kinds match each other, and enum slots accept plain ints.
    pub fn accepts(self, arg: Kind) -> bool {
        if self == arg {
            return true;
        }
        match self {
            Kind::Bool | Kind::Int | Kind::Real => arg.is_numeric(),
            Kind::Enum => arg == Kind::Int,
            _ => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_rank_follows_declaration_order() {
        assert!(Kind::None < Kind::Bool);
        assert!(Kind::Bool < Kind::Int);
        assert!(Kind::Int < Kind::Real);
        assert!(Kind::Real < Kind::String);
        assert!(Kind::String < Kind::Enum);
        assert!(Kind::Enum < Kind::Array);
        assert!(Kind::Array < Kind::User);
    }

    #[test]
    fn numeric_family_accepts_itself() {
        assert!(Kind::Int.accepts(Kind::Bool));
        assert!(Kind::Real.accepts(Kind::Int));
        assert!(Kind::Bool.accepts(Kind::Real));
        assert!(!Kind::String.accepts(Kind::Int));
        assert!(Kind::Enum.accepts(Kind::Int));
        assert!(!Kind::Enum.accepts(Kind::Real));
        assert!(Kind::User.accepts(Kind::User));
    }

    #[test]
    fn kind_names() {
        assert_eq!(Kind::None.name(), "none");
        assert_eq!(Kind::User.to_string(), "user");
    }
}
