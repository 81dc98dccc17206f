use std::sync::Arc;

use crate::annotation::{AvailableValuesType, EnabledType, RequiredType, VisibleType};
use crate::aspects::{Aspect, available_values};
use crate::error::BindingResult;
use crate::message::MessageList;
use crate::object::ObjectRef;
use crate::reader::{ElementDescriptor, UiAnnotationReader};
use crate::value::{Value, ValueType};

use super::PropertyDispatcher;

/// Answers facets from the element annotation of a property.
///
/// Facets declared as dynamic, and every property without an element
/// annotation, go to the wrapped dispatcher.
pub struct StaticValueDispatcher {
    reader: Arc<UiAnnotationReader>,
    fallback: Box<dyn PropertyDispatcher>,
}

impl StaticValueDispatcher {
    pub fn new(reader: Arc<UiAnnotationReader>, fallback: Box<dyn PropertyDispatcher>) -> Self {
        Self { reader, fallback }
    }

    fn descriptor(&self, property: &str) -> BindingResult<Option<&ElementDescriptor>> {
        match self.reader.find(property) {
            Some(descriptors) => descriptors.descriptor(&*self.fallback).map(Some),
            None => Ok(None),
        }
    }
}

impl PropertyDispatcher for StaticValueDispatcher {
    fn value_type(&self, property: &str) -> BindingResult<ValueType> {
        self.fallback.value_type(property)
    }

    fn value(&self, property: &str) -> BindingResult<Value> {
        self.fallback.value(property)
    }

    fn set_value(&self, property: &str, value: Value) -> BindingResult<()> {
        self.fallback.set_value(property, value)
    }

    fn is_read_only(&self, property: &str) -> BindingResult<bool> {
        self.fallback.is_read_only(property)
    }

    fn is_enabled(&self, property: &str) -> BindingResult<bool> {
        match self.descriptor(property)?.map(|d| d.annotation().enabled) {
            Some(EnabledType::Enabled) => Ok(true),
            Some(EnabledType::Disabled) => Ok(false),
            Some(EnabledType::Dynamic) | None => self.fallback.is_enabled(property),
        }
    }

    fn is_visible(&self, property: &str) -> BindingResult<bool> {
        match self.descriptor(property)?.map(|d| d.annotation().visible) {
            Some(VisibleType::Visible) => Ok(true),
            Some(VisibleType::Invisible) => Ok(false),
            Some(VisibleType::Dynamic) | None => self.fallback.is_visible(property),
        }
    }

    fn is_required(&self, property: &str) -> BindingResult<bool> {
        match self.descriptor(property)?.map(|d| d.annotation().required) {
            Some(RequiredType::Required) => Ok(true),
            Some(RequiredType::NotRequired) => Ok(false),
            Some(RequiredType::RequiredIfEnabled) => self.is_enabled(property),
            Some(RequiredType::Dynamic) | None => self.fallback.is_required(property),
        }
    }

    fn available_values(&self, property: &str) -> BindingResult<Vec<Value>> {
        match self.descriptor(property)?.map(|d| d.annotation().available_values) {
            Some(AvailableValuesType::Dynamic) | None => self.fallback.available_values(property),
            Some(values_type) => {
                let value_type = self.fallback.value_type(property)?;
                available_values::static_values(values_type, &value_type)
            }
        }
    }

    fn messages(&self, property: &str, messages: &MessageList) -> BindingResult<MessageList> {
        self.fallback.messages(property, messages)
    }

    fn invoke(&self, property: &str) -> BindingResult<()> {
        self.fallback.invoke(property)
    }

    fn pull(&self, property: &str, aspect: &Aspect) -> BindingResult<Value> {
        match aspect.value_ref() {
            Some(value) => Ok(value.clone()),
            None => self.fallback.pull(property, aspect),
        }
    }

    fn bound_object(&self) -> Option<ObjectRef> {
        self.fallback.bound_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::test_support::{PersonPmo, Title, person_pmo};
    use crate::dispatcher::{ExceptionPropertyDispatcher, ReflectionPropertyDispatcher};
    use crate::value::BindableEnum;

    fn chain(pmo: &ObjectRef) -> StaticValueDispatcher {
        let reader = UiAnnotationReader::for_class(pmo.meta_class()).unwrap();
        let supplier = reader.model_object_supplier(pmo, "model_object").unwrap();
        let model = ReflectionPropertyDispatcher::new(
            supplier,
            Box::new(ExceptionPropertyDispatcher::new(pmo.clone(), None)),
        );
        let pmo_layer = ReflectionPropertyDispatcher::for_object(pmo.clone(), Box::new(model));
        StaticValueDispatcher::new(reader, Box::new(pmo_layer))
    }

    #[test]
    fn test_defaults_from_annotation() {
        let (pmo, _) = person_pmo();
        let dispatcher = chain(&pmo);

        assert!(dispatcher.is_enabled("notes").unwrap());
        assert!(dispatcher.is_visible("notes").unwrap());
        assert!(!dispatcher.is_required("notes").unwrap());
        assert!(dispatcher.available_values("notes").unwrap().is_empty());
    }

    #[test]
    fn test_dynamic_and_required_if_enabled() {
        let (pmo, _) = person_pmo();
        let dispatcher = chain(&pmo);

        assert!(!dispatcher.is_enabled("name").unwrap());
        assert!(!dispatcher.is_required("name").unwrap());

        pmo.with_mut(|p: &mut PersonPmo| p.editable = true);
        assert!(dispatcher.is_enabled("name").unwrap());
        assert!(dispatcher.is_required("name").unwrap());
    }

    #[test]
    fn test_enum_values_from_model_type() {
        let (pmo, _) = person_pmo();
        let dispatcher = chain(&pmo);

        let expected: Vec<_> = Title::CONSTANTS.iter().copied().map(Value::Enum).collect();
        assert_eq!(dispatcher.available_values("title").unwrap(), expected);
    }

    #[test]
    fn test_unannotated_property_is_delegated() {
        let (pmo, _) = person_pmo();
        let dispatcher = chain(&pmo);

        assert!(dispatcher.is_enabled("name_enabled").is_err());
        assert!(dispatcher.is_visible("unknown").is_err());
    }

    #[test]
    fn test_static_aspect_value_wins() {
        let (pmo, _) = person_pmo();
        let dispatcher = chain(&pmo);

        let label = Aspect::with_value(Aspect::LABEL, Value::Text("Name".into()));
        assert_eq!(
            dispatcher.pull("name", &label).unwrap(),
            Value::Text("Name".into())
        );
    }
}
