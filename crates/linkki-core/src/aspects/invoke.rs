use std::sync::Arc;

use crate::error::BindingResult;

use super::{AspectDefinition, AspectTarget, Handler, UiUpdater, no_op_updater};

/// Invokes a command-like property when the component is clicked.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvokeAspectDefinition;

impl AspectDefinition for InvokeAspectDefinition {
    fn create_ui_updater(&self, _target: &AspectTarget) -> BindingResult<UiUpdater> {
        Ok(no_op_updater())
    }

    fn init_model_updater(&self, target: &AspectTarget, handler: Handler) -> BindingResult<()> {
        let property = target.property.clone();
        let dispatcher = Arc::clone(&target.dispatcher);
        target.component.on_click(move || {
            dispatcher.invoke(&property)?;
            handler()
        });
        Ok(())
    }
}
