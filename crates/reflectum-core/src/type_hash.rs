//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit hash uniquely identifying a declared class or
//! enum. Hashes are computed deterministically from the Rust type path, so
//! identity never depends on declaration order and the same native type
//! always maps to the same hash.

use std::fmt;

use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
///
/// These constants keep the hash domains of classes and enums disjoint even
/// when a class and an enum share a name.
pub mod hash_constants {
    /// Domain marker for class identity hashes.
    pub const CLASS: u64 = 0x7f4a2c9150e8b36d;

    /// Domain marker for enum identity hashes.
    pub const ENUM: u64 = 0x3b19d8e647a0c5f2;
}

/// A deterministic 64-bit hash identifying a declared type.
///
/// Computed from the Rust type path of the native type being reflected. The
/// same input always produces the same hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a class identity hash from a type path.
    pub fn of_class(type_path: &str) -> Self {
        TypeHash(xxh64(type_path.as_bytes(), hash_constants::CLASS))
    }

    /// Create an enum identity hash from a type path.
    pub fn of_enum(type_path: &str) -> Self {
        TypeHash(xxh64(type_path.as_bytes(), hash_constants::ENUM))
    }

    /// Check if this is the empty hash.
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(TypeHash::of_class("demo::Point"), TypeHash::of_class("demo::Point"));
        assert_ne!(TypeHash::of_class("demo::Point"), TypeHash::of_class("demo::Line"));
    }

    #[test]
    fn class_and_enum_domains_are_disjoint() {
        assert_ne!(TypeHash::of_class("Color"), TypeHash::of_enum("Color"));
    }

    #[test]
    fn empty_hash() {
        assert!(TypeHash::EMPTY.is_empty());
        assert!(!TypeHash::of_class("X").is_empty());
    }
}
