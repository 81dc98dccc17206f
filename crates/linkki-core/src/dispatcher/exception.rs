use crate::aspects::Aspect;
use crate::error::{BindingError, BindingResult, Operation};
use crate::message::MessageList;
use crate::object::ObjectRef;
use crate::value::{Value, ValueType};

use super::{ObjectSupplier, PropertyDispatcher};

/// The last link of every chain.
///
/// Requests reaching it could not be answered by any other link, so they
/// fail with [`BindingError::IllegalArgument`]. Two requests have safe
/// answers instead: an unresolvable property is read-only and has no
/// messages.
pub struct ExceptionPropertyDispatcher {
    pmo: ObjectRef,
    model_object: Option<ObjectSupplier>,
}

impl ExceptionPropertyDispatcher {
    pub fn new(pmo: ObjectRef, model_object: Option<ObjectSupplier>) -> Self {
        Self { pmo, model_object }
    }

    fn error(&self, operation: Operation, property: &str) -> BindingError {
        let object = self
            .model_object
            .as_ref()
            .and_then(|supplier| supplier().ok().flatten())
            .unwrap_or_else(|| self.pmo.clone());
        BindingError::IllegalArgument {
            operation,
            property: property.to_owned(),
            object: object.type_name().to_owned(),
            pmo: self.pmo.type_name().to_owned(),
        }
    }
}

impl PropertyDispatcher for ExceptionPropertyDispatcher {
    fn value_type(&self, property: &str) -> BindingResult<ValueType> {
        Err(self.error(Operation::ReadValueType, property))
    }

    fn value(&self, property: &str) -> BindingResult<Value> {
        Err(self.error(Operation::ReadValue, property))
    }

    fn set_value(&self, property: &str, _value: Value) -> BindingResult<()> {
        Err(self.error(Operation::WriteValue, property))
    }

    fn is_read_only(&self, _property: &str) -> BindingResult<bool> {
        Ok(true)
    }

    fn is_enabled(&self, property: &str) -> BindingResult<bool> {
        Err(self.error(Operation::ReadEnabled, property))
    }

    fn is_visible(&self, property: &str) -> BindingResult<bool> {
        Err(self.error(Operation::ReadVisible, property))
    }

    fn is_required(&self, property: &str) -> BindingResult<bool> {
        Err(self.error(Operation::ReadRequired, property))
    }

    fn available_values(&self, property: &str) -> BindingResult<Vec<Value>> {
        Err(self.error(Operation::ReadAvailableValues, property))
    }

    fn messages(&self, _property: &str, _messages: &MessageList) -> BindingResult<MessageList> {
        Ok(MessageList::new())
    }

    fn invoke(&self, property: &str) -> BindingResult<()> {
        Err(self.error(Operation::Invoke, property))
    }

    fn pull(&self, property: &str, aspect: &Aspect) -> BindingResult<Value> {
        if aspect.is_value() {
            return self.value(property);
        }
        Err(self.error(Operation::Pull(aspect.name().to_owned()), property))
    }

    fn bound_object(&self) -> Option<ObjectRef> {
        Some(self.pmo.clone())
    }
}
