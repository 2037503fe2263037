//! Gated, typed property accessors.
//!
//! A [`Property`] is a named, typed attribute bound to an owner class. Both
//! reads and writes are gated twice: a static access flag declared with the
//! property AND a dynamic per-object predicate evaluated at access time.
//! Writes additionally route back through the object handle so that
//! by-parent-property propagation applies uniformly to every property kind.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::class::Class;
use crate::enum_meta::EnumMeta;
use crate::error::Error;
use crate::kind::Kind;
use crate::object::ObjectHandle;
use crate::value::Value;

bitflags! {
    /// Static access flags declared with a property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessFlags: u8 {
        /// The property may be read.
        const READ = 1;
        /// The property may be written.
        const WRITE = 1 << 1;
    }
}

/// Erased getter over an object handle.
pub type Getter = Arc<dyn Fn(&ObjectHandle) -> Result<Value, Error>>;

/// Erased setter over an object handle.
pub type Setter = Arc<dyn Fn(&mut ObjectHandle, Value) -> Result<(), Error>>;

/// Per-object dynamic gate evaluated on every access.
pub type Predicate = Arc<dyn Fn(&ObjectHandle) -> bool>;

/// How a scalar-shaped property produces and consumes its value.
pub enum Accessor {
    /// A fixed value independent of the object.
    Constant(Value),
    /// Functions of the object.
    Bound {
        /// Getter, always present.
        get: Getter,
        /// Setter; absence makes the property statically read-only.
        set: Option<Setter>,
    },
}

impl Accessor {
    fn has_setter(&self) -> bool {
        matches!(self, Accessor::Bound { set: Some(_), .. })
    }
}

/// Element-wise accessors of an array property.
pub struct ArrayAccessor {
    size: Arc<dyn Fn(&ObjectHandle) -> Result<usize, Error>>,
    get: Arc<dyn Fn(&ObjectHandle, usize) -> Result<Value, Error>>,
    set: Arc<dyn Fn(&mut ObjectHandle, usize, Value) -> Result<(), Error>>,
    insert: Option<Arc<dyn Fn(&mut ObjectHandle, usize, Value) -> Result<(), Error>>>,
    remove: Option<Arc<dyn Fn(&mut ObjectHandle, usize) -> Result<(), Error>>>,
}

impl ArrayAccessor {
    /// Fixed-size array accessors.
    pub fn fixed(
        size: impl Fn(&ObjectHandle) -> Result<usize, Error> + 'static,
        get: impl Fn(&ObjectHandle, usize) -> Result<Value, Error> + 'static,
        set: impl Fn(&mut ObjectHandle, usize, Value) -> Result<(), Error> + 'static,
    ) -> Self {
        Self {
            size: Arc::new(size),
            get: Arc::new(get),
            set: Arc::new(set),
            insert: None,
            remove: None,
        }
    }

    /// Mark the array as dynamically resizable by supplying insert/remove.
    pub fn resizable(
        mut self,
        insert: impl Fn(&mut ObjectHandle, usize, Value) -> Result<(), Error> + 'static,
        remove: impl Fn(&mut ObjectHandle, usize) -> Result<(), Error> + 'static,
    ) -> Self {
        self.insert = Some(Arc::new(insert));
        self.remove = Some(Arc::new(remove));
        self
    }
}

/// The shape-specific part of a property.
pub enum PropertyVariant {
    /// A scalar property.
    Simple(Accessor),
    /// An indexed sequence with an element kind.
    Array {
        /// Kind of each element.
        element_kind: Kind,
        /// Element accessors.
        accessor: ArrayAccessor,
    },
    /// A property holding a member of a declared enum.
    Enum {
        /// The bound enum metadata.
        meta: Arc<EnumMeta>,
        /// Value accessor.
        accessor: Accessor,
    },
    /// A property holding an instance of a declared class.
    User {
        /// The bound class, enabling recursive navigation.
        class: Arc<Class>,
        /// Value accessor.
        accessor: Accessor,
    },
}

/// A named, typed, gated-access attribute of a metaclass.
pub struct Property {
    owner: String,
    name: String,
    kind: Kind,
    access: AccessFlags,
    readable_if: Option<Predicate>,
    writable_if: Option<Predicate>,
    variant: PropertyVariant,
}

impl Property {
    /// Create a property bound to its owner class name.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        kind: Kind,
        access: AccessFlags,
        variant: PropertyVariant,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            kind,
            access,
            readable_if: None,
            writable_if: None,
            variant,
        }
    }

    /// Attach a dynamic read gate.
    pub fn with_readable_if(mut self, predicate: impl Fn(&ObjectHandle) -> bool + 'static) -> Self {
        self.readable_if = Some(Arc::new(predicate));
        self
    }

    /// Attach a dynamic write gate.
    pub fn with_writable_if(mut self, predicate: impl Fn(&ObjectHandle) -> bool + 'static) -> Self {
        self.writable_if = Some(Arc::new(predicate));
        self
    }

    /// Property name, unique within its owner class.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owner class.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Declared value kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Static access flags.
    pub fn access(&self) -> AccessFlags {
        self.access
    }

    /// Shape-specific part.
    pub fn variant(&self) -> &PropertyVariant {
        &self.variant
    }

    /// The bound class of a user-kind property.
    pub fn user_class(&self) -> Option<&Arc<Class>> {
        match &self.variant {
            PropertyVariant::User { class, .. } => Some(class),
            _ => None,
        }
    }

    /// The bound enum of an enum-kind property.
    pub fn enum_meta(&self) -> Option<&Arc<EnumMeta>> {
        match &self.variant {
            PropertyVariant::Enum { meta, .. } => Some(meta),
            _ => None,
        }
    }

    /// Whether an array property supports insert/remove.
    pub fn dynamic(&self) -> bool {
        match &self.variant {
            PropertyVariant::Array { accessor, .. } => accessor.insert.is_some(),
            _ => false,
        }
    }

    /// Read gate: static READ flag AND dynamic predicate.
    pub fn readable(&self, object: &ObjectHandle) -> bool {
        self.access.contains(AccessFlags::READ)
            && self.readable_if.as_ref().is_none_or(|p| p(object))
    }

    /// Write gate: static WRITE flag, a setter to write with, AND the
    /// dynamic predicate.
    pub fn writable(&self, object: &ObjectHandle) -> bool {
        self.access.contains(AccessFlags::WRITE)
            && self.has_setter()
            && self.writable_if.as_ref().is_none_or(|p| p(object))
    }

    fn has_setter(&self) -> bool {
        match &self.variant {
            PropertyVariant::Simple(accessor) => accessor.has_setter(),
            PropertyVariant::Array { .. } => true,
            PropertyVariant::Enum { accessor, .. } => accessor.has_setter(),
            PropertyVariant::User { accessor, .. } => accessor.has_setter(),
        }
    }

    /// Read the property value.
    ///
    /// Fails with [`Error::ForbiddenRead`] when the read gate is closed.
    /// Array properties materialize their elements into a single
    /// [`Value::Array`].
    pub fn get(&self, object: &ObjectHandle) -> Result<Value, Error> {
        if !self.readable(object) {
            return Err(Error::ForbiddenRead {
                class: self.owner.clone(),
                property: self.name.clone(),
            });
        }
        match &self.variant {
            PropertyVariant::Simple(accessor)
            | PropertyVariant::Enum { accessor, .. }
            | PropertyVariant::User { accessor, .. } => match accessor {
                Accessor::Constant(value) => Ok(value.clone()),
                Accessor::Bound { get, .. } => get(object),
            },
            PropertyVariant::Array { accessor, .. } => {
                let size = (accessor.size)(object)?;
                let mut items = Vec::with_capacity(size);
                for index in 0..size {
                    items.push((accessor.get)(object, index)?);
                }
                Ok(Value::Array(items))
            }
        }
    }

    /// Write the property value.
    ///
    /// Fails with [`Error::ForbiddenWrite`] when the write gate is closed;
    /// otherwise routes through the object handle so holder write-back
    /// semantics apply.
    pub fn set(&self, object: &mut ObjectHandle, value: Value) -> Result<(), Error> {
        if !self.writable(object) {
            return Err(Error::ForbiddenWrite {
                class: self.owner.clone(),
                property: self.name.clone(),
            });
        }
        object.write_through(self, value)
    }

    /// The ungated setter, invoked by the handle's write path.
    pub(crate) fn raw_set(&self, object: &mut ObjectHandle, value: Value) -> Result<(), Error> {
        match &self.variant {
            PropertyVariant::Simple(accessor)
            | PropertyVariant::Enum { accessor, .. }
            | PropertyVariant::User { accessor, .. } => match accessor {
                Accessor::Bound { set: Some(set), .. } => set(object, value),
                _ => Err(Error::ForbiddenWrite {
                    class: self.owner.clone(),
                    property: self.name.clone(),
                }),
            },
            PropertyVariant::Array { accessor, .. } => {
                let items = value.to::<Vec<Value>>()?;
                let size = (accessor.size)(object)?;
                if items.len() != size && accessor.insert.is_none() {
                    return Err(Error::OutOfBounds {
                        index: items.len(),
                        size,
                    });
                }
                // Shrink or grow a resizable array to the incoming length.
                if let Some(remove) = &accessor.remove {
                    for index in (items.len()..size).rev() {
                        remove(object, index)?;
                    }
                }
                for (index, item) in items.into_iter().enumerate() {
                    if index < size {
                        (accessor.set)(object, index, item)?;
                    } else if let Some(insert) = &accessor.insert {
                        insert(object, index, item)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn array_accessor(&self) -> Result<&ArrayAccessor, Error> {
        match &self.variant {
            PropertyVariant::Array { accessor, .. } => Ok(accessor),
            _ => Err(Error::BadType {
                held: self.kind,
                requested: Kind::Array,
            }),
        }
    }

    /// Current element count of an array property.
    pub fn array_size(&self, object: &ObjectHandle) -> Result<usize, Error> {
        let accessor = self.array_accessor()?;
        if !self.readable(object) {
            return Err(Error::ForbiddenRead {
                class: self.owner.clone(),
                property: self.name.clone(),
            });
        }
        (accessor.size)(object)
    }

    /// Read one element of an array property.
    pub fn array_get(&self, object: &ObjectHandle, index: usize) -> Result<Value, Error> {
        let accessor = self.array_accessor()?;
        if !self.readable(object) {
            return Err(Error::ForbiddenRead {
                class: self.owner.clone(),
                property: self.name.clone(),
            });
        }
        let size = (accessor.size)(object)?;
        if index >= size {
            return Err(Error::OutOfBounds { index, size });
        }
        (accessor.get)(object, index)
    }

    /// Write one element of an array property.
    pub fn array_set(
        &self,
        object: &mut ObjectHandle,
        index: usize,
        value: Value,
    ) -> Result<(), Error> {
        let accessor = self.array_accessor()?;
        if !self.writable(object) {
            return Err(Error::ForbiddenWrite {
                class: self.owner.clone(),
                property: self.name.clone(),
            });
        }
        let size = (accessor.size)(object)?;
        if index >= size {
            return Err(Error::OutOfBounds { index, size });
        }
        (accessor.set)(object, index, value)?;
        object.write_back()
    }

    /// Insert an element into a dynamically resizable array property.
    /// `index == size` appends.
    pub fn array_insert(
        &self,
        object: &mut ObjectHandle,
        index: usize,
        value: Value,
    ) -> Result<(), Error> {
        let accessor = self.array_accessor()?;
        if !self.writable(object) {
            return Err(Error::ForbiddenWrite {
                class: self.owner.clone(),
                property: self.name.clone(),
            });
        }
        let Some(insert) = &accessor.insert else {
            return Err(Error::ForbiddenWrite {
                class: self.owner.clone(),
                property: self.name.clone(),
            });
        };
        let size = (accessor.size)(object)?;
        if index > size {
            return Err(Error::OutOfBounds { index, size });
        }
        insert(object, index, value)?;
        object.write_back()
    }

    /// Remove an element from a dynamically resizable array property.
    pub fn array_remove(&self, object: &mut ObjectHandle, index: usize) -> Result<(), Error> {
        let accessor = self.array_accessor()?;
        if !self.writable(object) {
            return Err(Error::ForbiddenWrite {
                class: self.owner.clone(),
                property: self.name.clone(),
            });
        }
        let Some(remove) = &accessor.remove else {
            return Err(Error::ForbiddenWrite {
                class: self.owner.clone(),
                property: self.name.clone(),
            });
        };
        let size = (accessor.size)(object)?;
        if index >= size {
            return Err(Error::OutOfBounds { index, size });
        }
        remove(object, index)?;
        object.write_back()
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}
