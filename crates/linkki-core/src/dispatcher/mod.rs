//! The property dispatcher chain.
//!
//! Every bound property of a PMO is read and written through a chain of
//! [`PropertyDispatcher`]s. Each link either answers a request or hands it to
//! the link it wraps. The chain built by [`PropertyDispatcherFactory`] is,
//! from the outside in:
//!
//! 1. [`BehaviorDependentDispatcher`] - applies [`PropertyBehavior`](crate::behavior::PropertyBehavior)s
//! 2. [`StaticValueDispatcher`] - answers from the element annotation
//! 3. [`ReflectionPropertyDispatcher`] on the PMO
//! 4. [`ReflectionPropertyDispatcher`] on the model object, if the PMO declares one
//! 5. [`ExceptionPropertyDispatcher`] - fails for everything that reached it
//!
//! Dynamic facets are read from companion getters: for a property `foo` the
//! enabled state comes from `foo_enabled`, the visibility from `foo_visible`
//! and so on, generally `foo_<aspect>`.

mod behavior;
mod exception;
mod reflection;
mod static_value;

pub use behavior::BehaviorDependentDispatcher;
pub use exception::ExceptionPropertyDispatcher;
pub use reflection::ReflectionPropertyDispatcher;
pub use static_value::StaticValueDispatcher;

use std::sync::Arc;

use crate::annotation::DEFAULT_MODEL_OBJECT;
use crate::aspects::Aspect;
use crate::behavior::PropertyBehaviorProvider;
use crate::error::BindingResult;
use crate::logging::targets;
use crate::message::MessageList;
use crate::object::ObjectRef;
use crate::reader::UiAnnotationReader;
use crate::value::{Value, ValueType};

/// Supplies the object a reflection dispatcher works on, on every call.
pub type ObjectSupplier = Arc<dyn Fn() -> BindingResult<Option<ObjectRef>> + Send + Sync>;

/// Read and write access to the properties of a PMO.
pub trait PropertyDispatcher: Send + Sync {
    /// The declared type of the property.
    fn value_type(&self, property: &str) -> BindingResult<ValueType>;

    fn value(&self, property: &str) -> BindingResult<Value>;

    fn set_value(&self, property: &str, value: Value) -> BindingResult<()>;

    fn is_read_only(&self, property: &str) -> BindingResult<bool>;

    fn is_enabled(&self, property: &str) -> BindingResult<bool>;

    fn is_visible(&self, property: &str) -> BindingResult<bool>;

    fn is_required(&self, property: &str) -> BindingResult<bool>;

    fn available_values(&self, property: &str) -> BindingResult<Vec<Value>>;

    /// The messages of `messages` that concern the property.
    fn messages(&self, property: &str, messages: &MessageList) -> BindingResult<MessageList>;

    /// Invoke a command-like property.
    fn invoke(&self, property: &str) -> BindingResult<()>;

    /// Read a named aspect. Aspects carrying a static value may be answered
    /// without consulting the bound object.
    fn pull(&self, property: &str, aspect: &Aspect) -> BindingResult<Value>;

    /// The object the properties are bound to.
    fn bound_object(&self) -> Option<ObjectRef>;
}

/// Builds dispatcher chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyDispatcherFactory;

impl PropertyDispatcherFactory {
    /// The chain for the default model object of `pmo`.
    pub fn default_dispatcher_chain(
        pmo: &ObjectRef,
        behavior_provider: Arc<dyn PropertyBehaviorProvider>,
    ) -> BindingResult<Box<dyn PropertyDispatcher>> {
        Self::dispatcher_chain(pmo, DEFAULT_MODEL_OBJECT, behavior_provider)
    }

    /// The chain for the model object `model_object_name` of `pmo`.
    ///
    /// The model object layer is left out if the PMO declares no such model
    /// object.
    pub fn dispatcher_chain(
        pmo: &ObjectRef,
        model_object_name: &str,
        behavior_provider: Arc<dyn PropertyBehaviorProvider>,
    ) -> BindingResult<Box<dyn PropertyDispatcher>> {
        let reader = UiAnnotationReader::for_class(pmo.meta_class())?;

        let model_object = if reader.has_model_object(model_object_name) {
            Some(reader.model_object_supplier(pmo, model_object_name)?)
        } else {
            None
        };

        let mut chain: Box<dyn PropertyDispatcher> = Box::new(ExceptionPropertyDispatcher::new(
            pmo.clone(),
            model_object.clone(),
        ));
        if let Some(supplier) = model_object {
            chain = Box::new(
                ReflectionPropertyDispatcher::new(supplier, chain)
                    .with_attribute_names(reader.model_attributes(model_object_name)),
            );
        }
        chain = Box::new(ReflectionPropertyDispatcher::for_object(pmo.clone(), chain));
        chain = Box::new(StaticValueDispatcher::new(reader.clone(), chain));
        chain = Box::new(BehaviorDependentDispatcher::new(behavior_provider, chain));

        tracing::trace!(
            target: targets::DISPATCHER,
            pmo = reader.class().type_name(),
            model_object = model_object_name,
            with_model_object = reader.has_model_object(model_object_name),
            "created dispatcher chain"
        );
        Ok(chain)
    }
}
