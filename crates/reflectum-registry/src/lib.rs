//! Class and enum registries for the reflectum metaobject engine.
//!
//! Provides [`Registry`], the explicit context mapping type identity and
//! declared name to metadata, and [`RegistryObserver`] for synchronous
//! add/remove notification.

mod observer;
mod registry;

pub use observer::RegistryObserver;
pub use registry::Registry;
