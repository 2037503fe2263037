//! Enum metadata.
//!
//! [`EnumMeta`] describes a declared enumeration: an ordered list of
//! name/value pairs with bidirectional lookup. Names and values are each
//! unique within one enum.

use crate::error::Error;
use crate::type_hash::TypeHash;

/// A single named member of a declared enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumPair {
    /// Member name.
    pub name: String,
    /// Integer value.
    pub value: i64,
}

impl EnumPair {
    /// Create a new enum member.
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Metadata for a declared enumeration type.
///
/// Members keep their declaration order; lookup works in both directions.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMeta {
    name: String,
    type_hash: TypeHash,
    pairs: Vec<EnumPair>,
}

impl EnumMeta {
    /// Create enum metadata from an ordered member list.
    ///
    /// Fails with [`Error::AlreadyCreated`] if two members share a name or a
    /// value.
    pub fn new(
        name: impl Into<String>,
        type_hash: TypeHash,
        pairs: Vec<EnumPair>,
    ) -> Result<Self, Error> {
        let name = name.into();
        for (i, pair) in pairs.iter().enumerate() {
            for earlier in &pairs[..i] {
                if earlier.name == pair.name || earlier.value == pair.value {
                    return Err(Error::AlreadyCreated {
                        name: format!("{}::{}", name, pair.name),
                    });
                }
            }
        }
        Ok(Self {
            name,
            type_hash,
            pairs,
        })
    }

    /// The declared enum name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identity hash of the native enum type.
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Number of declared members.
    pub fn size(&self) -> usize {
        self.pairs.len()
    }

    /// Members in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = &EnumPair> {
        self.pairs.iter()
    }

    /// Member at the given declaration index.
    pub fn pair(&self, index: usize) -> Result<&EnumPair, Error> {
        self.pairs.get(index).ok_or(Error::OutOfBounds {
            index,
            size: self.pairs.len(),
        })
    }

    /// Whether a member with the given name exists.
    pub fn has_name(&self, name: &str) -> bool {
        self.pairs.iter().any(|p| p.name == name)
    }

    /// Whether a member with the given value exists.
    pub fn has_value(&self, value: i64) -> bool {
        self.pairs.iter().any(|p| p.value == value)
    }

    /// Look up a member value by name.
    pub fn value(&self, name: &str) -> Result<i64, Error> {
        self.pairs
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
            .ok_or_else(|| Error::EnumNameNotFound {
                owner: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Look up a member name by value.
    pub fn name_of(&self, value: i64) -> Result<&str, Error> {
        self.pairs
            .iter()
            .find(|p| p.value == value)
            .map(|p| p.name.as_str())
            .ok_or_else(|| Error::EnumValueNotFound {
                owner: self.name.clone(),
                value,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color() -> EnumMeta {
        EnumMeta::new(
            "Color",
            TypeHash::of_enum("Color"),
            vec![
                EnumPair::new("Red", 0),
                EnumPair::new("Green", 1),
                EnumPair::new("Blue", 2),
            ],
        )
        .unwrap()
    }

    #[test]
    fn bidirectional_lookup() {
        let meta = color();
        assert_eq!(meta.value("Green").unwrap(), 1);
        assert_eq!(meta.name_of(1).unwrap(), "Green");
    }

    #[test]
    fn missing_name_raises_with_owner() {
        let err = color().value("Purple").unwrap_err();
        assert_eq!(
            err,
            Error::EnumNameNotFound {
                owner: "Color".into(),
                name: "Purple".into(),
            }
        );
    }

    #[test]
    fn missing_value_raises_with_owner() {
        let err = color().name_of(42).unwrap_err();
        assert_eq!(
            err,
            Error::EnumValueNotFound {
                owner: "Color".into(),
                value: 42,
            }
        );
    }

    #[test]
    fn duplicate_member_name_is_rejected() {
        let err = EnumMeta::new(
            "Dup",
            TypeHash::of_enum("Dup"),
            vec![EnumPair::new("A", 0), EnumPair::new("A", 1)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::AlreadyCreated { .. }));
    }

    #[test]
    fn duplicate_member_value_is_rejected() {
        let err = EnumMeta::new(
            "Dup",
            TypeHash::of_enum("Dup"),
            vec![EnumPair::new("A", 0), EnumPair::new("B", 0)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::AlreadyCreated { .. }));
    }

    #[test]
    fn declaration_order_is_kept() {
        let meta = color();
        let names: Vec<_> = meta.pairs().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Red", "Green", "Blue"]);
        assert_eq!(meta.pair(2).unwrap().value, 2);
        assert!(meta.pair(3).is_err());
    }
}
