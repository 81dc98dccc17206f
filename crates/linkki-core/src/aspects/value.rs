use std::sync::Arc;

use crate::error::BindingResult;
use crate::logging::targets;
use crate::value::Value;

use super::{AspectDefinition, AspectTarget, Handler, UiUpdater};

/// Binds the value of a property.
///
/// Pulling sets the component value and its read-only state. Pushing writes
/// an edited value through the dispatcher, unless the property is read-only,
/// and then calls the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueAspectDefinition;

impl AspectDefinition for ValueAspectDefinition {
    fn create_ui_updater(&self, target: &AspectTarget) -> BindingResult<UiUpdater> {
        let AspectTarget {
            property,
            dispatcher,
            component,
        } = target.clone();
        Ok(Box::new(move || {
            let value = dispatcher.value(&property)?;
            let read_only = dispatcher.is_read_only(&property)?;
            let mut component = component.write();
            component.set_value(value);
            component.set_read_only(read_only);
            Ok(())
        }))
    }

    fn init_model_updater(&self, target: &AspectTarget, handler: Handler) -> BindingResult<()> {
        let property = target.property.clone();
        let dispatcher = Arc::clone(&target.dispatcher);
        target.component.on_edit(move |value: &Value| {
            if dispatcher.is_read_only(&property)? {
                tracing::debug!(
                    target: targets::BINDING,
                    property = %property,
                    "ignored edit of read-only property"
                );
                return Ok(());
            }
            dispatcher.set_value(&property, value.clone())?;
            handler()
        });
        Ok(())
    }
}
