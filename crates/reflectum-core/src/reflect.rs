//! Reflect trait for types exposed to the metaobject engine.
//!
//! Every native type described by a metaclass or meta-enum implements
//! [`Reflect`], which provides its stable identity hash. Identity is derived
//! from the Rust type path, never from the declared metaclass name, so
//! declaring the same native type twice collides on identity even under
//! different names.
//!
//! # Example
//!
//! ```
//! use reflectum_core::{Reflect, TypeHash};
//!
//! #[derive(Clone)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Reflect for Point {
//!     fn type_name() -> &'static str {
//!         "Point"
//!     }
//! }
//!
//! assert_eq!(Point::type_hash(), TypeHash::of_class(std::any::type_name::<Point>()));
//! ```

use crate::type_hash::TypeHash;

/// Trait for native types that can be described by a metaclass.
///
/// `type_name` is the name used when raising diagnostics about the type
/// before (or without) a metaclass being declared for it; the declared
/// metaclass name is chosen separately at declaration time.
pub trait Reflect: 'static {
    /// The diagnostic name of this type.
    fn type_name() -> &'static str;

    /// The identity hash of this type, derived from its Rust type path.
    fn type_hash() -> TypeHash {
        TypeHash::of_class(std::any::type_name::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    impl Reflect for Widget {
        fn type_name() -> &'static str {
            "Widget"
        }
    }

    #[test]
    fn identity_comes_from_the_type_path() {
        assert_eq!(
            Widget::type_hash(),
            TypeHash::of_class(std::any::type_name::<Widget>())
        );
        assert_eq!(Widget::type_name(), "Widget");
    }
}
