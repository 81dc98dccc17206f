//! Bindings between PMO properties and components.
//!
//! A [`Binding`] owns the aspect updaters of one component. Bindings are
//! created and kept by a [`BindingContext`], which refreshes all of them on
//! [`update_ui`](BindingContext::update_ui). Component edits push through the
//! dispatcher chain and then call
//! [`model_changed`](BindingContext::model_changed) on the context, which
//! refreshes the UI and runs the context's after-update handler.
//!
//! [`BindingManager`] keeps named contexts and validates after every update,
//! distributing the resulting messages to all bindings.
//!
//! # Key Types
//!
//! - [`Binding`] - A bound component
//! - [`ElementBinding`] - One property bound to one component
//! - [`ContainerBinding`] - A PMO bound to a container component with child bindings
//! - [`BindingContext`] - A named collection of bindings
//! - [`BindingManager`] - A registry of contexts with validation

mod container;
mod context;
mod element;
mod manager;

pub use container::ContainerBinding;
pub use context::BindingContext;
pub use element::ElementBinding;
pub use manager::{BindingManager, NoValidation, ValidationService};

use std::sync::Arc;

use slotmap::new_key_type;

use crate::component::ComponentRef;
use crate::error::BindingResult;
use crate::message::MessageList;
use crate::object::ObjectRef;

new_key_type! {
    /// Identifies a binding within its [`BindingContext`].
    pub struct BindingId;
}

/// A component bound to a PMO.
pub trait Binding: Send + Sync {
    /// Pull all aspects from the PMO into the component.
    fn update_from_pmo(&self) -> BindingResult<()>;

    /// Show the messages of `messages` concerning this binding and return
    /// them.
    fn display_messages(&self, messages: &MessageList) -> BindingResult<MessageList>;

    fn component(&self) -> &ComponentRef;

    /// The bound property, empty for containers.
    fn property(&self) -> &str;

    fn pmo(&self) -> &ObjectRef;

    /// Nested bindings.
    fn children(&self) -> Vec<Arc<dyn Binding>> {
        Vec::new()
    }
}
