//! Observer fan-out for registry mutations.

use std::sync::{Arc, Weak};

use reflectum_core::{Class, EnumMeta};

/// Observer notified synchronously on every class or enum add/remove.
///
/// All handlers default to no-ops so an observer implements only what it
/// cares about. Removal notifications fire before the entry leaves the
/// registry, so the metadata is still resolvable inside the handler.
pub trait RegistryObserver {
    /// A class was declared.
    fn class_added(&self, _class: &Arc<Class>) {}

    /// A class is about to be undeclared.
    fn class_removed(&self, _class: &Arc<Class>) {}

    /// An enum was declared.
    fn enum_added(&self, _meta: &Arc<EnumMeta>) {}

    /// An enum is about to be undeclared.
    fn enum_removed(&self, _meta: &Arc<EnumMeta>) {}
}

/// Non-owning set of observers.
///
/// Observers are held weakly: the registry never extends their lifetime, and
/// entries whose owner dropped are pruned during notification.
#[derive(Default)]
pub(crate) struct ObserverSet {
    observers: Vec<Weak<dyn RegistryObserver>>,
}

impl ObserverSet {
    /// Add an observer. Registering the same observer twice notifies it
    /// twice.
    pub(crate) fn add(&mut self, observer: &Arc<dyn RegistryObserver>) {
        self.observers.push(Arc::downgrade(observer));
    }

    /// Remove an observer. Removing one that was never registered is a
    /// no-op.
    pub(crate) fn remove(&mut self, observer: &Arc<dyn RegistryObserver>) {
        let target = Arc::downgrade(observer);
        self.observers.retain(|o| !Weak::ptr_eq(o, &target));
    }

    /// Notify every live observer, dropping dead entries on the way.
    pub(crate) fn notify(&mut self, mut call: impl FnMut(&dyn RegistryObserver)) {
        self.observers.retain(|weak| match weak.upgrade() {
            Some(observer) => {
                call(observer.as_ref());
                true
            }
            None => false,
        });
    }
}
