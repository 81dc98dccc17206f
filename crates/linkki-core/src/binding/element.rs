use std::fmt;
use std::sync::Arc;

use crate::aspects::{AspectDefinition, AspectTarget, Handler, UiUpdater};
use crate::component::ComponentRef;
use crate::dispatcher::PropertyDispatcher;
use crate::error::BindingResult;
use crate::message::MessageList;
use crate::object::ObjectRef;

use super::Binding;

/// One property of a PMO bound to one component.
pub struct ElementBinding {
    property: String,
    pmo: ObjectRef,
    component: ComponentRef,
    dispatcher: Arc<dyn PropertyDispatcher>,
    updater: UiUpdater,
}

impl ElementBinding {
    /// Bind `property` to `component`.
    ///
    /// The aspects register their push listeners on the component; every
    /// pushed edit ends with a call to `model_changed`. The component is not
    /// updated yet.
    pub fn new(
        pmo: ObjectRef,
        property: impl Into<String>,
        component: ComponentRef,
        dispatcher: Arc<dyn PropertyDispatcher>,
        aspects: &dyn AspectDefinition,
        model_changed: Handler,
    ) -> BindingResult<Self> {
        let property = property.into();
        let target = AspectTarget::new(property.clone(), dispatcher.clone(), component.clone());
        let updater = aspects.create_ui_updater(&target)?;
        aspects.init_model_updater(&target, model_changed)?;
        Ok(Self {
            property,
            pmo,
            component,
            dispatcher,
            updater,
        })
    }

    pub fn dispatcher(&self) -> &Arc<dyn PropertyDispatcher> {
        &self.dispatcher
    }
}

impl Binding for ElementBinding {
    fn update_from_pmo(&self) -> BindingResult<()> {
        (self.updater)()
    }

    fn display_messages(&self, messages: &MessageList) -> BindingResult<MessageList> {
        let relevant = self.dispatcher.messages(&self.property, messages)?;
        self.component.write().set_messages(relevant.clone());
        Ok(relevant)
    }

    fn component(&self) -> &ComponentRef {
        &self.component
    }

    fn property(&self) -> &str {
        &self.property
    }

    fn pmo(&self) -> &ObjectRef {
        &self.pmo
    }
}

impl fmt::Debug for ElementBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBinding")
            .field("property", &self.property)
            .field("pmo", &self.pmo)
            .field("component", &self.component)
            .finish()
    }
}
