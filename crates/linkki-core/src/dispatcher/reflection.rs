use std::collections::HashMap;
use std::sync::Arc;

use crate::accessor::{PropertyAccessor, property_accessor};
use crate::aspects::Aspect;
use crate::error::{BindingError, BindingResult};
use crate::message::MessageList;
use crate::object::ObjectRef;
use crate::value::{FromValue, Value, ValueType};

use super::{ObjectSupplier, PropertyDispatcher};

/// Reads and writes properties through the methods of a bound object.
///
/// The object is requested from the supplier on every call, so a PMO that
/// swaps its model object is never read stale. Requests the object cannot
/// answer, or any request while the supplier yields no object, go to the
/// wrapped dispatcher.
pub struct ReflectionPropertyDispatcher {
    supplier: ObjectSupplier,
    attribute_names: HashMap<String, String>,
    fallback: Box<dyn PropertyDispatcher>,
}

impl ReflectionPropertyDispatcher {
    pub fn new(supplier: ObjectSupplier, fallback: Box<dyn PropertyDispatcher>) -> Self {
        Self {
            supplier,
            attribute_names: HashMap::new(),
            fallback,
        }
    }

    /// A dispatcher bound to a fixed object.
    pub fn for_object(object: ObjectRef, fallback: Box<dyn PropertyDispatcher>) -> Self {
        let supplier: ObjectSupplier =
            Arc::new(move || -> BindingResult<Option<ObjectRef>> { Ok(Some(object.clone())) });
        Self::new(supplier, fallback)
    }

    /// Map property names to differently named attributes of the object.
    pub fn with_attribute_names(mut self, attribute_names: HashMap<String, String>) -> Self {
        self.attribute_names = attribute_names;
        self
    }

    fn attribute<'a>(&'a self, property: &'a str) -> &'a str {
        self.attribute_names
            .get(property)
            .map_or(property, String::as_str)
    }

    /// The bound object together with the accessor of `name`.
    fn resolve(&self, name: &str) -> BindingResult<Option<(ObjectRef, Arc<PropertyAccessor>)>> {
        Ok((self.supplier)()?.map(|object| {
            let accessor = property_accessor(object.meta_class(), name);
            (object, accessor)
        }))
    }

    /// The companion `<attribute>_<aspect>` of a property, or the aspect
    /// name alone for the empty property.
    fn companion(&self, property: &str, aspect: &str) -> String {
        let attribute = self.attribute(property);
        if attribute.is_empty() {
            aspect.to_owned()
        } else {
            format!("{attribute}_{aspect}")
        }
    }

    /// Read the companion of `aspect`, or `None` if the object has none.
    fn read_companion(&self, property: &str, aspect: &str) -> BindingResult<Option<Value>> {
        match self.resolve(&self.companion(property, aspect))? {
            Some((object, accessor)) if accessor.can_read() => {
                let guard = object.read();
                accessor.read_value(&*guard).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn read_flag(&self, property: &str, aspect: &str) -> BindingResult<Option<bool>> {
        self.read_companion(property, aspect)?
            .map(bool::from_value)
            .transpose()
    }
}

impl PropertyDispatcher for ReflectionPropertyDispatcher {
    fn value_type(&self, property: &str) -> BindingResult<ValueType> {
        match self.resolve(self.attribute(property))? {
            Some((_, accessor)) if accessor.can_read() => accessor.value_type(),
            _ => self.fallback.value_type(property),
        }
    }

    fn value(&self, property: &str) -> BindingResult<Value> {
        match self.resolve(self.attribute(property))? {
            Some((object, accessor)) if accessor.can_read() => {
                let guard = object.read();
                accessor.read_value(&*guard)
            }
            _ => self.fallback.value(property),
        }
    }

    fn set_value(&self, property: &str, value: Value) -> BindingResult<()> {
        match self.resolve(self.attribute(property))? {
            Some((object, accessor)) if accessor.can_write() => {
                let mut guard = object.write();
                accessor.write_value(&mut *guard, value)
            }
            _ => self.fallback.set_value(property, value),
        }
    }

    fn is_read_only(&self, property: &str) -> BindingResult<bool> {
        match self.resolve(self.attribute(property))? {
            Some((_, accessor)) if accessor.can_write() => Ok(false),
            Some((_, accessor)) if accessor.can_read() => Ok(true),
            _ => self.fallback.is_read_only(property),
        }
    }

    fn is_enabled(&self, property: &str) -> BindingResult<bool> {
        match self.read_flag(property, Aspect::ENABLED)? {
            Some(enabled) => Ok(enabled),
            None => self.fallback.is_enabled(property),
        }
    }

    fn is_visible(&self, property: &str) -> BindingResult<bool> {
        match self.read_flag(property, Aspect::VISIBLE)? {
            Some(visible) => Ok(visible),
            None => self.fallback.is_visible(property),
        }
    }

    fn is_required(&self, property: &str) -> BindingResult<bool> {
        match self.read_flag(property, Aspect::REQUIRED)? {
            Some(required) => Ok(required),
            None => self.fallback.is_required(property),
        }
    }

    fn available_values(&self, property: &str) -> BindingResult<Vec<Value>> {
        match self.read_companion(property, Aspect::AVAILABLE_VALUES)? {
            Some(Value::List(values)) => Ok(values),
            Some(Value::Null) => Ok(Vec::new()),
            Some(other) => Err(BindingError::type_mismatch("List", other.kind_name())),
            None => self.fallback.available_values(property),
        }
    }

    fn messages(&self, property: &str, messages: &MessageList) -> BindingResult<MessageList> {
        let Some(object) = (self.supplier)()? else {
            return self.fallback.messages(property, messages);
        };

        let mut result = messages.for_object_property(&object, self.attribute(property));
        if let Some(value) = self.read_companion(property, Aspect::MESSAGES)? {
            result.extend(MessageList::from_value(value)?);
        }
        result.extend(self.fallback.messages(property, messages)?);
        Ok(result)
    }

    fn invoke(&self, property: &str) -> BindingResult<()> {
        match self.resolve(self.attribute(property))? {
            Some((object, accessor)) if accessor.can_invoke() => {
                let mut guard = object.write();
                accessor.invoke(&mut *guard)
            }
            _ => self.fallback.invoke(property),
        }
    }

    fn pull(&self, property: &str, aspect: &Aspect) -> BindingResult<Value> {
        if aspect.is_value() {
            return self.value(property);
        }
        match self.read_companion(property, aspect.name())? {
            Some(value) => Ok(value),
            None => self.fallback.pull(property, aspect),
        }
    }

    fn bound_object(&self) -> Option<ObjectRef> {
        match (self.supplier)() {
            Ok(Some(object)) => Some(object),
            _ => self.fallback.bound_object(),
        }
    }
}
