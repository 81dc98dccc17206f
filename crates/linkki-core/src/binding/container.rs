use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::aspects::{AspectDefinition, AspectTarget, Handler, UiUpdater};
use crate::component::ComponentRef;
use crate::dispatcher::PropertyDispatcher;
use crate::error::BindingResult;
use crate::message::MessageList;
use crate::object::ObjectRef;

use super::Binding;

/// A PMO bound to a container component, such as a section.
///
/// The container's own aspects are bound to the empty property, so their
/// companions are named after the aspect alone (`visible`, `enabled`).
/// Updating the container updates its children afterwards.
pub struct ContainerBinding {
    pmo: ObjectRef,
    component: ComponentRef,
    dispatcher: Arc<dyn PropertyDispatcher>,
    updater: UiUpdater,
    children: RwLock<Vec<Arc<dyn Binding>>>,
}

impl ContainerBinding {
    pub fn new(
        pmo: ObjectRef,
        component: ComponentRef,
        dispatcher: Arc<dyn PropertyDispatcher>,
        aspects: &dyn AspectDefinition,
        model_changed: Handler,
    ) -> BindingResult<Self> {
        let target = AspectTarget::new(String::new(), dispatcher.clone(), component.clone());
        let updater = aspects.create_ui_updater(&target)?;
        aspects.init_model_updater(&target, model_changed)?;
        Ok(Self {
            pmo,
            component,
            dispatcher,
            updater,
            children: RwLock::new(Vec::new()),
        })
    }

    pub fn add_child(&self, child: Arc<dyn Binding>) {
        self.children.write().push(child);
    }

    pub fn dispatcher(&self) -> &Arc<dyn PropertyDispatcher> {
        &self.dispatcher
    }
}

impl Binding for ContainerBinding {
    fn update_from_pmo(&self) -> BindingResult<()> {
        (self.updater)()?;
        self.children()
            .iter()
            .try_for_each(|child| child.update_from_pmo())
    }

    fn display_messages(&self, messages: &MessageList) -> BindingResult<MessageList> {
        let mut shown = MessageList::new();
        for child in self.children() {
            shown.extend(child.display_messages(messages)?);
        }
        self.component.write().set_messages(shown.clone());
        Ok(shown)
    }

    fn component(&self) -> &ComponentRef {
        &self.component
    }

    fn property(&self) -> &str {
        ""
    }

    fn pmo(&self) -> &ObjectRef {
        &self.pmo
    }

    fn children(&self) -> Vec<Arc<dyn Binding>> {
        self.children.read().clone()
    }
}

impl fmt::Debug for ContainerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBinding")
            .field("pmo", &self.pmo)
            .field("component", &self.component)
            .field("children", &self.children.read().len())
            .finish()
    }
}
