//! Type-erased object handles and their ownership strategies.
//!
//! An [`ObjectHandle`] is either the canonical empty sentinel or bound to
//! (storage, class); it is never partially valid. Exactly one [`Holder`]
//! strategy backs a bound handle:
//!
//! - **by-reference**: wraps caller-owned storage, no allocation; mutation
//!   through the handle is visible to the original.
//! - **by-copy**: owns a duplicate made at construction; mutation never
//!   affects the original; the duplicate is dropped with the handle.
//! - **by-parent-property**: holds no storage directly; every read re-derives
//!   the current value from a parent handle and a bound property, and every
//!   write goes back through the parent property's gated set.
//!
//! Switching strategies means constructing a new handle.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::class::Class;
use crate::error::Error;
use crate::kind::Kind;
use crate::property::Property;
use crate::reflect::Reflect;
use crate::value::Value;

/// Owned duplicate of an instance, with a stable pointer into its heap
/// storage and a monomorphized clone function for handle duplication.
pub(crate) struct OwnedStorage {
    object: Box<dyn Any>,
    ptr: NonNull<u8>,
    clone_fn: fn(&dyn Any) -> Box<dyn Any>,
}

fn clone_erased<T: Clone + 'static>(object: &dyn Any) -> Box<dyn Any> {
    let value = object
        .downcast_ref::<T>()
        .expect("owned storage holds the type it was created with");
    Box::new(value.clone())
}

impl OwnedStorage {
    pub(crate) fn new<T: Clone + 'static>(value: T) -> Self {
        let mut object: Box<T> = Box::new(value);
        let ptr = NonNull::from(&mut *object).cast::<u8>();
        Self {
            object,
            ptr,
            clone_fn: clone_erased::<T>,
        }
    }

    fn duplicate(&self) -> Self {
        let mut object = (self.clone_fn)(self.object.as_ref());
        let ptr = NonNull::from(&mut *object).cast::<u8>();
        Self {
            object,
            ptr,
            clone_fn: self.clone_fn,
        }
    }
}

/// Proxy storage re-derived from a parent handle and a bound property.
pub(crate) struct ParentHolder {
    parent: Box<ObjectHandle>,
    property: Arc<Property>,
    cache: RefCell<Box<ObjectHandle>>,
}

impl ParentHolder {
    /// Fetch the current value from the parent property as an owned handle.
    /// Safe to invoke repeatedly; nothing stale survives between reads.
    fn fetch(&self) -> Result<ObjectHandle, Error> {
        match self.property.get(&self.parent)? {
            Value::User(handle) => Ok(handle),
            other => Err(Error::BadType {
                held: other.kind(),
                requested: Kind::User,
            }),
        }
    }

    /// Re-fetch into the local write buffer and return a pointer into it.
    fn refresh(&self) -> Result<NonNull<u8>, Error> {
        let handle = self.fetch()?;
        let ptr = handle.data_ptr()?;
        *self.cache.borrow_mut() = Box::new(handle);
        Ok(ptr)
    }

    /// Push the locally buffered object back through the parent property.
    fn write_back(&mut self) -> Result<(), Error> {
        let snapshot = (**self.cache.borrow()).clone();
        self.property.set(&mut self.parent, Value::User(snapshot))
    }
}

/// The ownership strategy backing a bound handle.
pub(crate) enum Holder {
    Ref(NonNull<u8>),
    Copy(OwnedStorage),
    Parent(ParentHolder),
}

impl Holder {
    fn data_ptr(&self) -> Result<NonNull<u8>, Error> {
        match self {
            Holder::Ref(ptr) => Ok(*ptr),
            Holder::Copy(storage) => Ok(storage.ptr),
            Holder::Parent(parent) => parent.refresh(),
        }
    }
}

impl Clone for Holder {
    fn clone(&self) -> Self {
        match self {
            Holder::Ref(ptr) => Holder::Ref(*ptr),
            Holder::Copy(storage) => Holder::Copy(storage.duplicate()),
            Holder::Parent(parent) => Holder::Parent(ParentHolder {
                parent: parent.parent.clone(),
                property: parent.property.clone(),
                cache: RefCell::new(parent.cache.borrow().clone()),
            }),
        }
    }
}

struct BoundObject {
    class: Arc<Class>,
    holder: Holder,
}

/// Type-erased reference to an instance of a declared class.
#[derive(Clone)]
pub struct ObjectHandle {
    inner: Option<BoundObject>,
}

impl Clone for BoundObject {
    fn clone(&self) -> Self {
        Self {
            class: self.class.clone(),
            holder: self.holder.clone(),
        }
    }
}

impl ObjectHandle {
    /// The canonical empty sentinel.
    pub fn empty() -> Self {
        Self { inner: None }
    }

    /// Wrap caller-owned storage without copying.
    ///
    /// Mutation through the handle is visible through `object`, and dropping
    /// the handle leaves the storage untouched.
    ///
    /// Fails with [`Error::InvalidObject`] when `class` does not describe
    /// `T`.
    ///
    /// # Safety
    ///
    /// The handle keeps a raw pointer into `object` with no lifetime. The
    /// caller must keep the storage alive and unmoved for as long as the
    /// handle (or any clone of it) is used, and must not access the storage
    /// directly while a reference obtained through the handle is live.
    pub unsafe fn by_ref<T: Reflect>(class: &Arc<Class>, object: &mut T) -> Result<Self, Error> {
        if class.type_hash() != T::type_hash() {
            return Err(Error::InvalidObject {
                class: class.name().to_string(),
                requested: T::type_name().to_string(),
            });
        }
        Ok(Self::bound(
            class.clone(),
            Holder::Ref(NonNull::from(object).cast::<u8>()),
        ))
    }

    /// Duplicate `object` and own the duplicate.
    ///
    /// Mutation through the handle never affects the original; the duplicate
    /// is destroyed with the handle.
    pub fn by_copy<T: Reflect + Clone>(class: &Arc<Class>, object: &T) -> Result<Self, Error> {
        if class.type_hash() != T::type_hash() {
            return Err(Error::InvalidObject {
                class: class.name().to_string(),
                requested: T::type_name().to_string(),
            });
        }
        Ok(Self::bound(
            class.clone(),
            Holder::Copy(OwnedStorage::new(object.clone())),
        ))
    }

    /// Take ownership of a freshly built instance, without the extra
    /// duplicate [`by_copy`](Self::by_copy) makes. This is how constructor
    /// factories wrap their allocation.
    pub fn owned<T: Reflect + Clone>(class: &Arc<Class>, value: T) -> Result<Self, Error> {
        if class.type_hash() != T::type_hash() {
            return Err(Error::InvalidObject {
                class: class.name().to_string(),
                requested: T::type_name().to_string(),
            });
        }
        Ok(Self::bound(
            class.clone(),
            Holder::Copy(OwnedStorage::new(value)),
        ))
    }

    /// Build a proxy handle over `property` of `parent`.
    ///
    /// Reads re-derive the current value from the parent on every access;
    /// writes buffer locally and call the parent property's set. The property
    /// must be a user-kind property; the initial fetch runs eagerly so the
    /// handle is never partially valid.
    pub fn from_parent(parent: ObjectHandle, property: Arc<Property>) -> Result<Self, Error> {
        let class = property
            .user_class()
            .ok_or(Error::BadType {
                held: property.kind(),
                requested: Kind::User,
            })?
            .clone();
        let holder = ParentHolder {
            parent: Box::new(parent),
            property,
            cache: RefCell::new(Box::new(ObjectHandle::empty())),
        };
        holder.refresh()?;
        Ok(Self::bound(class, Holder::Parent(holder)))
    }

    pub(crate) fn bound(class: Arc<Class>, holder: Holder) -> Self {
        Self {
            inner: Some(BoundObject { class, holder }),
        }
    }

    /// Check if this is the empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// The metaclass this handle is bound to.
    ///
    /// Fails with [`Error::EmptyObject`] on the empty sentinel.
    pub fn get_class(&self) -> Result<&Arc<Class>, Error> {
        self.inner
            .as_ref()
            .map(|bound| &bound.class)
            .ok_or(Error::EmptyObject)
    }

    /// Typed extraction.
    ///
    /// Succeeds when the bound class is `T`'s class or derives from it,
    /// applying the accumulated base offsets; fails with
    /// [`Error::InvalidObject`] when the classes are unrelated.
    ///
    /// By-reference and by-copy handles lend a view into their own storage.
    /// A by-parent-property handle re-derives the value at call time and the
    /// returned [`TypedRef`] owns that snapshot, so the view stays valid even
    /// when the handle serves further reads while it is alive.
    pub fn get_as<T: Reflect>(&self) -> Result<TypedRef<'_, T>, Error> {
        let bound = self.inner.as_ref().ok_or(Error::EmptyObject)?;
        match &bound.holder {
            Holder::Parent(parent) => {
                let snapshot = parent.fetch()?;
                let ptr = offset_for::<T>(&bound.class, snapshot.data_ptr()?)?;
                Ok(TypedRef::snapshot(snapshot, ptr.cast::<T>()))
            }
            holder => {
                let ptr = offset_for::<T>(&bound.class, holder.data_ptr()?)?;
                Ok(TypedRef::borrowed(ptr.cast::<T>()))
            }
        }
    }

    /// Typed mutable extraction. Same relationship rules as
    /// [`get_as`](Self::get_as).
    ///
    /// For parent-property handles the mutation lands in the local buffer;
    /// it reaches the parent when a gated write triggers the write-back.
    pub fn get_as_mut<T: Reflect>(&mut self) -> Result<&mut T, Error> {
        let bound = self.inner.as_ref().ok_or(Error::EmptyObject)?;
        let ptr = offset_for::<T>(&bound.class, bound.holder.data_ptr()?)?;
        // The exclusive borrow of self keeps the holder's storage in place
        // (including a parent holder's refreshed buffer) for the lifetime of
        // the returned reference.
        unsafe { Ok(&mut *ptr.cast::<T>().as_ptr()) }
    }

    /// Read a property by name, through its gated getter.
    pub fn get(&self, property: &str) -> Result<Value, Error> {
        let property = self.get_class()?.property(property)?.clone();
        property.get(self)
    }

    /// Write a property through its gated setter.
    ///
    /// Writes always route through the owning property rather than mutating
    /// storage directly, so by-parent-property propagation stays uniform
    /// across all property kinds.
    pub fn set(&mut self, property: &str, value: Value) -> Result<(), Error> {
        let property = self.get_class()?.property(property)?.clone();
        property.set(self, value)
    }

    /// Call a function by name.
    ///
    /// On a by-parent-property handle the body runs against the locally
    /// refreshed buffer; any mutation it makes is not written back and is
    /// discarded by the next read. Persist changes on a proxy through a
    /// property write instead.
    pub fn call(&mut self, function: &str, args: &[Value]) -> Result<Value, Error> {
        let function = self.get_class()?.function(function)?.clone();
        function.call(self, args)
    }

    pub(crate) fn data_ptr(&self) -> Result<NonNull<u8>, Error> {
        self.inner
            .as_ref()
            .ok_or(Error::EmptyObject)?
            .holder
            .data_ptr()
    }

    /// Apply the property's raw setter, then propagate to the parent when
    /// this handle is a by-parent-property proxy.
    pub(crate) fn write_through(&mut self, property: &Property, value: Value) -> Result<(), Error> {
        property.raw_set(self, value)?;
        self.write_back()
    }

    pub(crate) fn write_back(&mut self) -> Result<(), Error> {
        if let Some(bound) = self.inner.as_mut()
            && let Holder::Parent(parent) = &mut bound.holder
        {
            parent.write_back()?;
        }
        Ok(())
    }

    fn address(&self) -> usize {
        self.data_ptr().map(|p| p.as_ptr() as usize).unwrap_or(0)
    }

    fn order_key(&self) -> (u64, usize) {
        match &self.inner {
            Some(bound) => (bound.class.type_hash().0, self.address()),
            None => (0, 0),
        }
    }
}

fn offset_for<T: Reflect>(class: &Class, ptr: NonNull<u8>) -> Result<NonNull<u8>, Error> {
    match class.offset_to(T::type_hash()) {
        Some(offset) => {
            // SAFETY: the offset was declared alongside the base edge and
            // stays inside the same allocation.
            Ok(unsafe { NonNull::new_unchecked(ptr.as_ptr().offset(offset)) })
        }
        None => Err(Error::InvalidObject {
            class: class.name().to_string(),
            requested: T::type_name().to_string(),
        }),
    }
}

/// Shared typed view produced by [`ObjectHandle::get_as`].
///
/// Dereferences to `T`. For by-reference and by-copy handles the view
/// borrows the handle's storage; for by-parent-property handles it owns the
/// handle fetched from the parent at read time, so it keeps its value even
/// when the proxy re-derives a newer one.
pub struct TypedRef<'a, T> {
    _snapshot: Option<ObjectHandle>,
    ptr: NonNull<T>,
    _handle: PhantomData<&'a ObjectHandle>,
}

impl<T> TypedRef<'_, T> {
    fn borrowed(ptr: NonNull<T>) -> Self {
        Self {
            _snapshot: None,
            ptr,
            _handle: PhantomData,
        }
    }

    fn snapshot(snapshot: ObjectHandle, ptr: NonNull<T>) -> Self {
        Self {
            _snapshot: Some(snapshot),
            ptr,
            _handle: PhantomData,
        }
    }
}

impl<T> Deref for TypedRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: ptr targets either the handle's storage, borrowed for 'a,
        // or the snapshot this view owns.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: fmt::Debug> fmt::Debug for TypedRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for ObjectHandle {}

impl PartialOrd for ObjectHandle {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectHandle {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(bound) => f
                .debug_struct("ObjectHandle")
                .field("class", &bound.class.name())
                .field("address", &format_args!("{:#x}", self.address()))
                .finish(),
            None => f.write_str("ObjectHandle(empty)"),
        }
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(bound) => write!(f, "<{} object>", bound.class.name()),
            None => f.write_str("<empty object>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        n: i64,
    }

    impl Reflect for Counter {
        fn type_name() -> &'static str {
            "Counter"
        }
    }

    fn counter_class() -> Arc<Class> {
        Arc::new(
            Class::new(
                "Counter",
                Counter::type_hash(),
                Vec::new(),
                Vec::new(),
                Vec::new(),
                Vec::new(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn by_ref_mutation_is_visible_to_the_original() {
        let class = counter_class();
        let mut counter = Counter { n: 1 };
        let mut handle = unsafe { ObjectHandle::by_ref(&class, &mut counter) }.unwrap();
        handle.get_as_mut::<Counter>().unwrap().n = 5;
        assert_eq!(counter.n, 5);
    }

    #[test]
    fn by_copy_mutation_is_isolated() {
        let class = counter_class();
        let counter = Counter { n: 1 };
        let mut handle = ObjectHandle::by_copy(&class, &counter).unwrap();
        handle.get_as_mut::<Counter>().unwrap().n = 5;
        assert_eq!(counter.n, 1);
        assert_eq!(handle.get_as::<Counter>().unwrap().n, 5);
    }

    #[test]
    fn cloned_copy_handles_do_not_share_storage() {
        let class = counter_class();
        let handle = ObjectHandle::by_copy(&class, &Counter { n: 1 }).unwrap();
        let mut dup = handle.clone();
        dup.get_as_mut::<Counter>().unwrap().n = 9;
        assert_eq!(handle.get_as::<Counter>().unwrap().n, 1);
    }

    #[test]
    fn empty_handle_rejects_access_and_sorts_first() {
        let empty = ObjectHandle::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.get_class().unwrap_err(), Error::EmptyObject);
        assert_eq!(empty.get_as::<Counter>().unwrap_err(), Error::EmptyObject);
        assert_eq!(empty, ObjectHandle::empty());

        let class = counter_class();
        let bound = ObjectHandle::by_copy(&class, &Counter { n: 0 }).unwrap();
        assert!(empty < bound);
    }

    #[test]
    fn display_names_the_bound_class() {
        let class = counter_class();
        let handle = ObjectHandle::by_copy(&class, &Counter { n: 0 }).unwrap();
        assert_eq!(handle.to_string(), "<Counter object>");
        assert_eq!(ObjectHandle::empty().to_string(), "<empty object>");
    }
}
