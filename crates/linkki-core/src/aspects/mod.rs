//! Aspects connect a property facet to a component.
//!
//! An [`Aspect`] names one facet of a property, such as its enabled state or
//! its label, and may carry a static value. An [`AspectDefinition`] knows how
//! to pull a facet from the dispatcher chain into a component
//! ([`create_ui_updater`](AspectDefinition::create_ui_updater)) and how to
//! push component edits back
//! ([`init_model_updater`](AspectDefinition::init_model_updater)).
//!
//! # Key Types
//!
//! - [`Aspect`] - A facet name and optional static value
//! - [`AspectDefinition`] - Pull/push behavior for one facet
//! - [`CompositeAspectDefinition`] - Several definitions applied in order
//! - [`AspectTarget`] - The property, dispatcher and component an aspect works on

pub mod available_values;
mod invoke;
mod standard;
mod value;

pub use available_values::AvailableValuesAspectDefinition;
pub use invoke::InvokeAspectDefinition;
pub use standard::{
    EnabledAspectDefinition, LabelAspectDefinition, RequiredAspectDefinition,
    VisibleAspectDefinition,
};
pub use value::ValueAspectDefinition;

use std::fmt;
use std::sync::Arc;

use crate::component::ComponentRef;
use crate::dispatcher::PropertyDispatcher;
use crate::error::BindingResult;
use crate::value::Value;

/// Applies pulled facets to a component.
pub type UiUpdater = Box<dyn Fn() -> BindingResult<()> + Send + Sync>;

/// Called after a component edit was pushed to the model.
pub type Handler = Arc<dyn Fn() -> BindingResult<()> + Send + Sync>;

/// A named facet of a property.
#[derive(Debug, Clone, PartialEq)]
pub struct Aspect {
    name: String,
    value: Option<Value>,
}

impl Aspect {
    /// The value of the property itself.
    pub const VALUE: &'static str = "";
    pub const ENABLED: &'static str = "enabled";
    pub const VISIBLE: &'static str = "visible";
    pub const REQUIRED: &'static str = "required";
    pub const AVAILABLE_VALUES: &'static str = "available_values";
    pub const MESSAGES: &'static str = "messages";
    pub const LABEL: &'static str = "label";
    /// Selects among several elements bound to one property.
    pub const COMPONENT_TYPE: &'static str = "component_type";

    /// An aspect without static value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// An aspect with a static value.
    pub fn with_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }

    /// The value aspect.
    pub fn value() -> Self {
        Self::new(Self::VALUE)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The static value, if any.
    pub fn value_ref(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Whether this is the value aspect.
    pub fn is_value(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_value() {
            f.write_str("value")
        } else {
            f.write_str(&self.name)
        }
    }
}

/// What an aspect definition is applied to.
#[derive(Clone)]
pub struct AspectTarget {
    pub property: String,
    pub dispatcher: Arc<dyn PropertyDispatcher>,
    pub component: ComponentRef,
}

impl AspectTarget {
    pub fn new(
        property: impl Into<String>,
        dispatcher: Arc<dyn PropertyDispatcher>,
        component: ComponentRef,
    ) -> Self {
        Self {
            property: property.into(),
            dispatcher,
            component,
        }
    }
}

/// Pull and push behavior of one facet.
pub trait AspectDefinition: Send + Sync {
    /// Create the function that pulls the facet into the component.
    fn create_ui_updater(&self, target: &AspectTarget) -> BindingResult<UiUpdater>;

    /// Register listeners that push component edits to the model and call
    /// `handler` afterwards.
    fn init_model_updater(&self, _target: &AspectTarget, _handler: Handler) -> BindingResult<()> {
        Ok(())
    }
}

/// An updater that does nothing.
pub fn no_op_updater() -> UiUpdater {
    Box::new(|| Ok(()))
}

/// Several aspect definitions applied in declaration order.
#[derive(Default)]
pub struct CompositeAspectDefinition {
    definitions: Vec<Box<dyn AspectDefinition>>,
}

impl CompositeAspectDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, definition: impl AspectDefinition + 'static) -> Self {
        self.definitions.push(Box::new(definition));
        self
    }

    pub fn push(&mut self, definition: Box<dyn AspectDefinition>) {
        self.definitions.push(definition);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl AspectDefinition for CompositeAspectDefinition {
    fn create_ui_updater(&self, target: &AspectTarget) -> BindingResult<UiUpdater> {
        let updaters = self
            .definitions
            .iter()
            .map(|definition| definition.create_ui_updater(target))
            .collect::<BindingResult<Vec<_>>>()?;
        Ok(Box::new(move || updaters.iter().try_for_each(|update| update())))
    }

    fn init_model_updater(&self, target: &AspectTarget, handler: Handler) -> BindingResult<()> {
        self.definitions
            .iter()
            .try_for_each(|definition| definition.init_model_updater(target, handler.clone()))
    }
}

impl fmt::Debug for CompositeAspectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeAspectDefinition")
            .field("definitions", &self.definitions.len())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::ElementKind;
    use crate::component::HeadlessComponent;
    use crate::dispatcher::test_support::PersonPmo;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_aspect_names() {
        assert!(Aspect::value().is_value());
        assert!(!Aspect::new(Aspect::ENABLED).is_value());
        assert_eq!(Aspect::value().to_string(), "value");
        assert_eq!(
            Aspect::with_value(Aspect::LABEL, Value::Text("x".into())).value_ref(),
            Some(&Value::Text("x".into()))
        );
    }

    #[test]
    fn test_composite_applies_in_order() {
        let (pmo, target) = test_support::target("name", ElementKind::TextField);
        let composite = CompositeAspectDefinition::new()
            .with(EnabledAspectDefinition)
            .with(ValueAspectDefinition);
        assert_eq!(composite.len(), 2);

        let update = composite.create_ui_updater(&target).unwrap();
        update().unwrap();
        target.component.with(|c: &HeadlessComponent| {
            assert!(!c.is_enabled());
            assert_eq!(c.value_ref(), &Value::Text("Ada".into()));
        });

        pmo.with_mut(|p: &mut PersonPmo| p.editable = true);
        update().unwrap();
        assert_eq!(target.component.with(|c: &HeadlessComponent| c.is_enabled()), Some(true));
    }

    #[test]
    fn test_composite_passes_handler_to_all() {
        let (_pmo, target) = test_support::target("name", ElementKind::TextField);
        let calls = Arc::new(AtomicUsize::new(0));
        let handler: Handler = {
            let calls = calls.clone();
            Arc::new(move || -> BindingResult<()> {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        };

        CompositeAspectDefinition::new()
            .with(ValueAspectDefinition)
            .init_model_updater(&target, handler)
            .unwrap();
        target.component.edit(Value::Text("Grace".into())).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
