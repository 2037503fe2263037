//! Registry - process-wide class and enum metadata tables.
//!
//! This module provides [`Registry`], the central storage mapping both type
//! identity and declared name to metaclass/enum metadata. It replaces the
//! hidden global registries of classic reflection engines with an explicitly
//! constructed context: the application root creates one at startup, passes
//! it to whoever declares or resolves types, and tears it down at shutdown.
//!
//! # Storage model
//!
//! Each registry keeps two parallel indexes per entity family: identity
//! (`TypeHash`) to entry, and declared name to identity. The indexes always
//! agree on membership; `declare` fails when either collides and `undeclare`
//! clears both.
//!
//! # Thread safety
//!
//! `Registry` is **not thread-safe** by design. Declaration and teardown run
//! in deterministic startup/shutdown phases while lookups dominate in
//! between; mutation takes `&mut self`, so interleaving misuse is a compile
//! error rather than a data race. A concurrent embedding wraps the registry
//! in its own synchronization (e.g. `RwLock<Registry>`).
//!
//! # Example
//!
//! ```
//! use reflectum_core::{Class, Reflect, TypeHash};
//! use reflectum_registry::Registry;
//!
//! #[derive(Clone)]
//! struct Point;
//!
//! impl Reflect for Point {
//!     fn type_name() -> &'static str {
//!         "Point"
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! let class = Class::new(
//!     "Point",
//!     Point::type_hash(),
//!     Vec::new(),
//!     Vec::new(),
//!     Vec::new(),
//!     Vec::new(),
//! )
//! .unwrap();
//! registry.declare_class(class).unwrap();
//!
//! assert!(registry.class_by_name("Point").is_ok());
//! assert!(registry.class_of::<Point>().is_ok());
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;

use reflectum_core::{Class, EnumMeta, Error, Reflect, TypeHash};

use crate::observer::{ObserverSet, RegistryObserver};

/// Class and enum metadata tables with observer fan-out.
#[derive(Default)]
pub struct Registry {
    classes: FxHashMap<TypeHash, Arc<Class>>,
    class_names: FxHashMap<String, TypeHash>,
    enums: FxHashMap<TypeHash, Arc<EnumMeta>>,
    enum_names: FxHashMap<String, TypeHash>,
    observers: ObserverSet,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Classes
    // ==========================================================================

    /// Declare a class.
    ///
    /// Fails with [`Error::AlreadyCreated`] when either the type identity or
    /// the declared name is already present. Observers are notified after
    /// both indexes are updated.
    pub fn declare_class(&mut self, class: Class) -> Result<Arc<Class>, Error> {
        if self.classes.contains_key(&class.type_hash())
            || self.class_names.contains_key(class.name())
        {
            return Err(Error::AlreadyCreated {
                name: class.name().to_string(),
            });
        }
        let class = Arc::new(class);
        self.class_names
            .insert(class.name().to_string(), class.type_hash());
        self.classes.insert(class.type_hash(), class.clone());
        self.observers.notify(|o| o.class_added(&class));
        Ok(class)
    }

    /// Undeclare a class by name.
    ///
    /// Observers are notified before the entry leaves the indexes.
    pub fn undeclare_class(&mut self, name: &str) -> Result<(), Error> {
        let hash = *self
            .class_names
            .get(name)
            .ok_or_else(|| Error::ClassNotFound {
                name: name.to_string(),
            })?;
        // The name index guarantees the identity entry exists.
        let class = self.classes[&hash].clone();
        self.observers.notify(|o| o.class_removed(&class));
        self.classes.remove(&hash);
        self.class_names.remove(name);
        Ok(())
    }

    /// Look up a class by declared name.
    pub fn class_by_name(&self, name: &str) -> Result<&Arc<Class>, Error> {
        self.class_names
            .get(name)
            .and_then(|hash| self.classes.get(hash))
            .ok_or_else(|| Error::ClassNotFound {
                name: name.to_string(),
            })
    }

    /// Look up a class by type identity.
    pub fn class_by_hash(&self, hash: TypeHash) -> Result<&Arc<Class>, Error> {
        self.classes.get(&hash).ok_or_else(|| Error::ClassNotFound {
            name: hash.to_string(),
        })
    }

    /// Look up the class declared for a native type.
    pub fn class_of<T: Reflect>(&self) -> Result<&Arc<Class>, Error> {
        self.classes
            .get(&T::type_hash())
            .ok_or_else(|| Error::ClassNotFound {
                name: T::type_name().to_string(),
            })
    }

    /// Number of declared classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Declared classes, in no particular order.
    pub fn classes(&self) -> impl Iterator<Item = &Arc<Class>> {
        self.classes.values()
    }

    // ==========================================================================
    // Enums
    // ==========================================================================

    /// Declare an enum.
    ///
    /// Same collision rules as [`declare_class`](Self::declare_class).
    pub fn declare_enum(&mut self, meta: EnumMeta) -> Result<Arc<EnumMeta>, Error> {
        if self.enums.contains_key(&meta.type_hash())
            || self.enum_names.contains_key(meta.name())
        {
            return Err(Error::AlreadyCreated {
                name: meta.name().to_string(),
            });
        }
        let meta = Arc::new(meta);
        self.enum_names
            .insert(meta.name().to_string(), meta.type_hash());
        self.enums.insert(meta.type_hash(), meta.clone());
        self.observers.notify(|o| o.enum_added(&meta));
        Ok(meta)
    }

    /// Undeclare an enum by name, notifying observers before removal.
    pub fn undeclare_enum(&mut self, name: &str) -> Result<(), Error> {
        let hash = *self
            .enum_names
            .get(name)
            .ok_or_else(|| Error::EnumNotFound {
                name: name.to_string(),
            })?;
        let meta = self.enums[&hash].clone();
        self.observers.notify(|o| o.enum_removed(&meta));
        self.enums.remove(&hash);
        self.enum_names.remove(name);
        Ok(())
    }

    /// Look up an enum by declared name.
    pub fn enum_by_name(&self, name: &str) -> Result<&Arc<EnumMeta>, Error> {
        self.enum_names
            .get(name)
            .and_then(|hash| self.enums.get(hash))
            .ok_or_else(|| Error::EnumNotFound {
                name: name.to_string(),
            })
    }

    /// Look up an enum by type identity.
    pub fn enum_by_hash(&self, hash: TypeHash) -> Result<&Arc<EnumMeta>, Error> {
        self.enums.get(&hash).ok_or_else(|| Error::EnumNotFound {
            name: hash.to_string(),
        })
    }

    /// Number of declared enums.
    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    /// Declared enums, in no particular order.
    pub fn enums(&self) -> impl Iterator<Item = &Arc<EnumMeta>> {
        self.enums.values()
    }

    // ==========================================================================
    // Observers
    // ==========================================================================

    /// Register an observer. The registry holds it weakly and never extends
    /// its lifetime.
    pub fn add_observer(&mut self, observer: &Arc<dyn RegistryObserver>) {
        self.observers.add(observer);
    }

    /// Unregister an observer. Removing one that was never registered is a
    /// no-op.
    pub fn remove_observer(&mut self, observer: &Arc<dyn RegistryObserver>) {
        self.observers.remove(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use reflectum_core::{EnumPair, Reflect};

    #[derive(Clone)]
    struct Player;

    impl Reflect for Player {
        fn type_name() -> &'static str {
            "Player"
        }
    }

    fn bare_class(name: &str, hash: TypeHash) -> Class {
        Class::new(name, hash, Vec::new(), Vec::new(), Vec::new(), Vec::new()).unwrap()
    }

    fn color() -> EnumMeta {
        EnumMeta::new(
            "Color",
            TypeHash::of_enum("Color"),
            vec![EnumPair::new("Red", 0), EnumPair::new("Green", 1)],
        )
        .unwrap()
    }

    #[test]
    fn name_and_identity_lookups_agree() {
        let mut registry = Registry::new();
        registry
            .declare_class(bare_class("Player", Player::type_hash()))
            .unwrap();

        let by_name = registry.class_by_name("Player").unwrap().clone();
        let by_type = registry.class_of::<Player>().unwrap().clone();
        let by_hash = registry.class_by_hash(Player::type_hash()).unwrap().clone();
        assert!(Arc::ptr_eq(&by_name, &by_type));
        assert!(Arc::ptr_eq(&by_name, &by_hash));
    }

    #[test]
    fn duplicate_name_fails() {
        let mut registry = Registry::new();
        registry
            .declare_class(bare_class("Player", TypeHash::of_class("a::Player")))
            .unwrap();
        let err = registry
            .declare_class(bare_class("Player", TypeHash::of_class("b::Player")))
            .unwrap_err();
        assert_eq!(
            err,
            Error::AlreadyCreated {
                name: "Player".into()
            }
        );
    }

    #[test]
    fn duplicate_identity_fails_even_under_a_new_name() {
        let mut registry = Registry::new();
        registry
            .declare_class(bare_class("Player", Player::type_hash()))
            .unwrap();
        let err = registry
            .declare_class(bare_class("Hero", Player::type_hash()))
            .unwrap_err();
        assert_eq!(err, Error::AlreadyCreated { name: "Hero".into() });
    }

    #[test]
    fn undeclare_clears_both_indexes() {
        let mut registry = Registry::new();
        registry
            .declare_class(bare_class("Player", Player::type_hash()))
            .unwrap();
        registry.undeclare_class("Player").unwrap();

        assert!(registry.class_by_name("Player").is_err());
        assert!(registry.class_of::<Player>().is_err());
        assert_eq!(registry.class_count(), 0);

        let err = registry.undeclare_class("Player").unwrap_err();
        assert_eq!(
            err,
            Error::ClassNotFound {
                name: "Player".into()
            }
        );
    }

    #[test]
    fn enum_declaration_and_lookup() {
        let mut registry = Registry::new();
        registry.declare_enum(color()).unwrap();

        assert_eq!(registry.enum_by_name("Color").unwrap().value("Green").unwrap(), 1);
        assert!(registry.enum_by_hash(TypeHash::of_enum("Color")).is_ok());
        assert!(registry.declare_enum(color()).is_err());

        registry.undeclare_enum("Color").unwrap();
        assert_eq!(registry.enum_count(), 0);
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl RegistryObserver for Recorder {
        fn class_added(&self, class: &Arc<Class>) {
            self.events.borrow_mut().push(format!("+class {}", class.name()));
        }
        fn class_removed(&self, class: &Arc<Class>) {
            self.events.borrow_mut().push(format!("-class {}", class.name()));
        }
        fn enum_added(&self, meta: &Arc<EnumMeta>) {
            self.events.borrow_mut().push(format!("+enum {}", meta.name()));
        }
        fn enum_removed(&self, meta: &Arc<EnumMeta>) {
            self.events.borrow_mut().push(format!("-enum {}", meta.name()));
        }
    }

    #[test]
    fn observers_see_adds_and_removes_in_order() {
        let mut registry = Registry::new();
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn RegistryObserver> = recorder.clone();
        registry.add_observer(&observer);

        registry
            .declare_class(bare_class("Player", Player::type_hash()))
            .unwrap();
        registry.declare_enum(color()).unwrap();
        registry.undeclare_enum("Color").unwrap();
        registry.undeclare_class("Player").unwrap();

        assert_eq!(
            *recorder.events.borrow(),
            ["+class Player", "+enum Color", "-enum Color", "-class Player"]
        );
    }

    #[test]
    fn removed_observer_is_silent_and_unknown_removal_is_a_noop() {
        let mut registry = Registry::new();
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn RegistryObserver> = recorder.clone();

        // Never registered: removal is a no-op.
        registry.remove_observer(&observer);

        registry.add_observer(&observer);
        registry.remove_observer(&observer);
        registry
            .declare_class(bare_class("Player", Player::type_hash()))
            .unwrap();
        assert!(recorder.events.borrow().is_empty());
    }
}
