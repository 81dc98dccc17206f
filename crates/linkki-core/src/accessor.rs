//! Property access by name.
//!
//! A [`PropertyAccessor`] resolves the getter, setter and action of one
//! property of a [`MetaClass`] lazily and keeps the result for the lifetime
//! of the process. Accessors are shared through the global
//! [`PropertyAccessorCache`].
//!
//! For a property `foo` the getter is the first getter named `foo`,
//! `get_foo` or `is_foo`; the setter is `set_foo`; the action is `foo`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::error::{BindingError, BindingResult};
use crate::logging::targets;
use crate::meta::{MetaClass, MetaMethod, MethodKind};
use crate::object::Bindable;
use crate::value::{Value, ValueType};

/// Cached access to one property of a type.
pub struct PropertyAccessor {
    class: &'static MetaClass,
    property: String,
    read: OnceLock<Option<&'static MetaMethod>>,
    write: OnceLock<Option<&'static MetaMethod>>,
    invoke: OnceLock<Option<&'static MetaMethod>>,
}

impl PropertyAccessor {
    /// Create an accessor. Methods are resolved on first use.
    pub fn new(class: &'static MetaClass, property: impl Into<String>) -> Self {
        Self {
            class,
            property: property.into(),
            read: OnceLock::new(),
            write: OnceLock::new(),
            invoke: OnceLock::new(),
        }
    }

    pub fn class(&self) -> &'static MetaClass {
        self.class
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    fn read_method(&self) -> Option<&'static MetaMethod> {
        *self.read.get_or_init(|| {
            let class = self.class;
            let method = [
                self.property.clone(),
                format!("get_{}", self.property),
                format!("is_{}", self.property),
            ]
            .iter()
            .find_map(|name| class.getter(name));
            tracing::trace!(
                target: targets::ACCESSOR,
                type_name = class.type_name(),
                property = %self.property,
                method = method.map(MetaMethod::name),
                "resolved read method"
            );
            method
        })
    }

    fn write_method(&self) -> Option<&'static MetaMethod> {
        *self.write.get_or_init(|| {
            let class = self.class;
            class.setter(&format!("set_{}", self.property))
        })
    }

    fn invoke_method(&self) -> Option<&'static MetaMethod> {
        *self.invoke.get_or_init(|| {
            let class = self.class;
            class.action(&self.property)
        })
    }

    pub fn can_read(&self) -> bool {
        self.read_method().is_some()
    }

    pub fn can_write(&self) -> bool {
        self.write_method().is_some()
    }

    pub fn can_invoke(&self) -> bool {
        self.invoke_method().is_some()
    }

    /// The declared type of the getter.
    pub fn value_type(&self) -> BindingResult<ValueType> {
        self.read_method()
            .and_then(MetaMethod::value_type)
            .ok_or_else(|| self.no_read_method())
    }

    /// Read the property of `target`.
    pub fn read_value(&self, target: &dyn Bindable) -> BindingResult<Value> {
        match self.read_method().map(MetaMethod::kind) {
            Some(MethodKind::Getter { call, .. }) => call(target),
            _ => Err(self.no_read_method()),
        }
    }

    /// Write the property of `target`.
    pub fn write_value(&self, target: &mut dyn Bindable, value: Value) -> BindingResult<()> {
        match self.write_method().map(MetaMethod::kind) {
            Some(MethodKind::Setter { call }) => call(target, value),
            _ => Err(BindingError::NoWriteMethod {
                type_name: self.class.type_name(),
                property: self.property.clone(),
            }),
        }
    }

    /// Invoke the action of `target`.
    pub fn invoke(&self, target: &mut dyn Bindable) -> BindingResult<()> {
        match self.invoke_method().map(MetaMethod::kind) {
            Some(MethodKind::Action { call }) => call(target),
            _ => Err(BindingError::NoInvokeMethod {
                type_name: self.class.type_name(),
                property: self.property.clone(),
            }),
        }
    }

    fn no_read_method(&self) -> BindingError {
        BindingError::NoReadMethod {
            type_name: self.class.type_name(),
            property: self.property.clone(),
        }
    }
}

impl fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("type_name", &self.class.type_name())
            .field("property", &self.property)
            .finish()
    }
}

/// Process-wide cache of property accessors, keyed by type name and
/// property name.
pub struct PropertyAccessorCache {
    accessors: RwLock<HashMap<&'static str, HashMap<String, Arc<PropertyAccessor>>>>,
}

impl PropertyAccessorCache {
    fn new() -> Self {
        Self {
            accessors: RwLock::new(HashMap::new()),
        }
    }

    /// The global cache.
    pub fn global() -> &'static PropertyAccessorCache {
        static CACHE: OnceLock<PropertyAccessorCache> = OnceLock::new();
        CACHE.get_or_init(PropertyAccessorCache::new)
    }

    /// The accessor of `property` in `class`, created on first request.
    ///
    /// Concurrent first requests receive the same accessor.
    pub fn accessor(&self, class: &'static MetaClass, property: &str) -> Arc<PropertyAccessor> {
        if let Some(accessor) = self
            .accessors
            .read()
            .get(class.type_name())
            .and_then(|properties| properties.get(property))
        {
            return accessor.clone();
        }

        let mut accessors = self.accessors.write();
        accessors
            .entry(class.type_name())
            .or_default()
            .entry(property.to_owned())
            .or_insert_with(|| {
                tracing::trace!(
                    target: targets::ACCESSOR,
                    type_name = class.type_name(),
                    property,
                    "caching property accessor"
                );
                Arc::new(PropertyAccessor::new(class, property))
            })
            .clone()
    }

    /// The number of cached accessors.
    pub fn len(&self) -> usize {
        self.accessors.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The cached accessor of `property` in `class`.
pub fn property_accessor(class: &'static MetaClass, property: &str) -> Arc<PropertyAccessor> {
    PropertyAccessorCache::global().accessor(class, property)
}
