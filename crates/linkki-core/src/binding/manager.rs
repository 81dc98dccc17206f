use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::config::BindingConfig;
use crate::error::BindingResult;
use crate::logging::targets;
use crate::message::MessageList;

use super::BindingContext;

/// Validates the model and reports the result as messages.
pub trait ValidationService: Send + Sync {
    fn validate(&self) -> MessageList;
}

impl<F> ValidationService for F
where
    F: Fn() -> MessageList + Send + Sync,
{
    fn validate(&self) -> MessageList {
        self()
    }
}

/// A validation service that never reports anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl ValidationService for NoValidation {
    fn validate(&self) -> MessageList {
        MessageList::new()
    }
}

/// Keeps the binding contexts of one UI.
///
/// Whenever the model changed through one of its contexts the manager
/// validates and shows the resulting messages in every context.
pub struct BindingManager {
    config: BindingConfig,
    validation: Arc<dyn ValidationService>,
    contexts: RwLock<Vec<Arc<BindingContext>>>,
    messages: RwLock<MessageList>,
    this: Weak<BindingManager>,
}

impl BindingManager {
    pub fn new(config: BindingConfig, validation: impl ValidationService + 'static) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            config,
            validation: Arc::new(validation),
            contexts: RwLock::new(Vec::new()),
            messages: RwLock::new(MessageList::new()),
            this: this.clone(),
        })
    }

    /// A manager without validation.
    pub fn without_validation(config: BindingConfig) -> Arc<Self> {
        Self::new(config, NoValidation)
    }

    /// The context named `name`, created on first request.
    pub fn context(&self, name: &str) -> Arc<BindingContext> {
        if let Some(context) = self.existing_context(name) {
            return context;
        }

        let mut contexts = self.contexts.write();
        if let Some(context) = contexts.iter().find(|c| c.name() == name) {
            return context.clone();
        }
        let context = BindingContext::new(name, self.config.clone());
        let manager = self.this.clone();
        context.set_after_update_handler(move || match manager.upgrade() {
            Some(manager) => manager.after_update_ui(),
            None => Ok(()),
        });
        contexts.push(context.clone());
        tracing::trace!(target: targets::BINDING, context = name, "created binding context");
        context
    }

    pub fn existing_context(&self, name: &str) -> Option<Arc<BindingContext>> {
        self.contexts
            .read()
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }

    /// Remove the context named `name`. Its after-update handler is cleared.
    pub fn remove_context(&self, name: &str) -> Option<Arc<BindingContext>> {
        let removed = {
            let mut contexts = self.contexts.write();
            let index = contexts.iter().position(|c| c.name() == name)?;
            contexts.remove(index)
        };
        removed.clear_after_update_handler();
        Some(removed)
    }

    /// All contexts in creation order.
    pub fn contexts(&self) -> Vec<Arc<BindingContext>> {
        self.contexts.read().clone()
    }

    /// Validate and show the messages in every context.
    pub fn after_update_ui(&self) -> BindingResult<()> {
        let messages = self.validation.validate();
        tracing::debug!(
            target: targets::BINDING,
            messages = messages.len(),
            severity = ?messages.severity(),
            "validated"
        );
        for context in self.contexts() {
            context.display_messages(&messages)?;
        }
        *self.messages.write() = messages;
        Ok(())
    }

    /// Update every context, then validate.
    pub fn update_all(&self) -> BindingResult<()> {
        for context in self.contexts() {
            context.update_ui()?;
        }
        self.after_update_ui()
    }

    /// The messages of the last validation.
    pub fn messages(&self) -> MessageList {
        self.messages.read().clone()
    }
}

impl fmt::Debug for BindingManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingManager")
            .field(
                "contexts",
                &self
                    .contexts
                    .read()
                    .iter()
                    .map(|c| c.name().to_owned())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
