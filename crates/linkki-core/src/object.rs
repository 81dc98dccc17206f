//! Bindable objects.
//!
//! Presentation model objects (PMOs) and the model objects they delegate to
//! are both [`Bindable`]: they expose a [`MetaClass`] describing their
//! getters, setters, actions and annotations. Bindings hold them through an
//! [`ObjectRef`], a shared, lockable handle that erases the concrete type.
//!
//! # Key Types
//!
//! - [`Bindable`] - Object-safe trait every bound object implements
//! - [`BindableType`] - Static access to the meta class of a concrete type
//! - [`ObjectRef`] - Shared handle `Arc<RwLock<dyn Bindable>>`
//!
//! # Related Modules
//!
//! - [`crate::meta`] - The method table behind [`Bindable::meta_class`]
//! - [`crate::accessor`] - Property access on top of the method table

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::meta::MetaClass;

/// An object whose properties can be bound to UI components.
///
/// Usually implemented through the `#[bindable]` attribute macro on the
/// type's `impl` block, which also implements [`BindableType`].
pub trait Bindable: Any + Send + Sync {
    /// The method table of this object's type.
    fn meta_class(&self) -> &'static MetaClass;
}

/// Static access to the meta class of a bindable type.
pub trait BindableType: Bindable + Sized {
    /// The method table of this type.
    fn static_meta_class() -> &'static MetaClass;
}

/// A shared handle to a bindable object.
///
/// Cloning the handle shares the object. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<dyn Bindable>>);

impl ObjectRef {
    /// Wrap a new object.
    pub fn new<T: Bindable>(object: T) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    /// Share an object that is already held as `Arc<RwLock<T>>`.
    pub fn from_shared<T: Bindable>(object: Arc<RwLock<T>>) -> Self {
        Self(object)
    }

    /// Lock the object for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, dyn Bindable> {
        self.0.read()
    }

    /// Lock the object for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Bindable> {
        self.0.write()
    }

    /// The meta class of the referenced object.
    pub fn meta_class(&self) -> &'static MetaClass {
        self.0.read().meta_class()
    }

    /// The type name of the referenced object.
    pub fn type_name(&self) -> &'static str {
        self.meta_class().type_name()
    }

    /// Run `f` with the object downcast to `T`.
    ///
    /// Returns `None` if the object is not a `T`.
    pub fn with<T: Bindable, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.0.read();
        let any: &dyn Any = &*guard;
        any.downcast_ref::<T>().map(f)
    }

    /// Run `f` with the object downcast to `T`, mutably.
    pub fn with_mut<T: Bindable, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.0.write();
        let any: &mut dyn Any = &mut *guard;
        any.downcast_mut::<T>().map(f)
    }

    /// Whether both handles refer to the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    /// An identity key for the referenced object, stable while it lives.
    pub fn key(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug output may be requested while the object is locked.
        match self.0.try_read() {
            Some(guard) => write!(f, "{}@{:#x}", guard.meta_class().type_name(), self.key()),
            None => write!(f, "<locked>@{:#x}", self.key()),
        }
    }
}

impl<T: Bindable> From<Arc<RwLock<T>>> for ObjectRef {
    fn from(object: Arc<RwLock<T>>) -> Self {
        Self::from_shared(object)
    }
}
