//! UI components as seen by bindings.
//!
//! Bindings talk to components only through the [`Component`] trait, so any
//! widget toolkit can be attached by implementing it together with a
//! [`ComponentFactory`]. [`HeadlessComponent`] is an in-memory
//! implementation that records everything applied to it.
//!
//! Components report user input through listeners registered on their
//! [`ComponentRef`]: [`ComponentRef::edit`] stores a new value and notifies
//! the edit listeners, [`ComponentRef::click`] notifies the click listeners.
//! Listeners run without any component lock held, so they may update the
//! component again.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use slotmap::{SlotMap, new_key_type};

use crate::annotation::ElementKind;
use crate::error::BindingResult;
use crate::logging::targets;
use crate::message::{MessageList, Severity};
use crate::reader::ElementDescriptor;
use crate::value::Value;

new_key_type! {
    /// Identifies a listener registered on a [`ComponentRef`].
    pub struct ListenerId;
}

/// A UI component.
///
/// All setters default to doing nothing, so components implement only what
/// they display.
pub trait Component: Any + Send + Sync {
    fn kind(&self) -> ElementKind;

    fn set_label(&mut self, _label: Option<&str>) {}

    fn set_enabled(&mut self, _enabled: bool) {}

    fn set_visible(&mut self, _visible: bool) {}

    fn set_required(&mut self, _required: bool) {}

    fn set_read_only(&mut self, _read_only: bool) {}

    fn set_value(&mut self, _value: Value) {}

    fn value(&self) -> Value {
        Value::Null
    }

    fn set_available_values(&mut self, _values: Vec<Value>) {}

    fn set_messages(&mut self, _messages: MessageList) {}
}

type EditListener = Arc<dyn Fn(&Value) -> BindingResult<()> + Send + Sync>;
type ClickListener = Arc<dyn Fn() -> BindingResult<()> + Send + Sync>;

#[derive(Default)]
struct Listeners {
    edit: SlotMap<ListenerId, EditListener>,
    click: SlotMap<ListenerId, ClickListener>,
}

/// A shared handle to a component and its listeners.
#[derive(Clone)]
pub struct ComponentRef {
    component: Arc<RwLock<dyn Component>>,
    listeners: Arc<RwLock<Listeners>>,
}

impl ComponentRef {
    pub fn new<C: Component>(component: C) -> Self {
        Self {
            component: Arc::new(RwLock::new(component)),
            listeners: Arc::new(RwLock::new(Listeners::default())),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, dyn Component> {
        self.component.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Component> {
        self.component.write()
    }

    pub fn kind(&self) -> ElementKind {
        self.component.read().kind()
    }

    /// Run `f` with the component downcast to `C`.
    pub fn with<C: Component, R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let guard = self.component.read();
        let any: &dyn Any = &*guard;
        any.downcast_ref::<C>().map(f)
    }

    /// Whether both handles refer to the same component.
    pub fn ptr_eq(&self, other: &ComponentRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.component), Arc::as_ptr(&other.component))
    }

    /// Register a listener for value edits.
    pub fn on_edit<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Value) -> BindingResult<()> + Send + Sync + 'static,
    {
        self.listeners.write().edit.insert(Arc::new(listener))
    }

    /// Register a listener for clicks.
    pub fn on_click<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() -> BindingResult<()> + Send + Sync + 'static,
    {
        self.listeners.write().click.insert(Arc::new(listener))
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        listeners.edit.remove(id).is_some() || listeners.click.remove(id).is_some()
    }

    /// Remove all listeners.
    pub fn clear_listeners(&self) {
        let mut listeners = self.listeners.write();
        listeners.edit.clear();
        listeners.click.clear();
    }

    /// Simulate user input: store `value` and notify the edit listeners.
    ///
    /// Stops at the first listener that fails.
    pub fn edit(&self, value: Value) -> BindingResult<()> {
        self.component.write().set_value(value.clone());
        let listeners: Vec<_> = self.listeners.read().edit.values().cloned().collect();
        tracing::trace!(
            target: targets::BINDING,
            kind = %self.kind(),
            listeners = listeners.len(),
            "component edited"
        );
        listeners.iter().try_for_each(|listener| listener(&value))
    }

    /// Simulate a click and notify the click listeners.
    pub fn click(&self) -> BindingResult<()> {
        let listeners: Vec<_> = self.listeners.read().click.values().cloned().collect();
        listeners.iter().try_for_each(|listener| listener())
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component.try_read() {
            Some(component) => write!(f, "ComponentRef({})", component.kind()),
            None => write!(f, "ComponentRef(<locked>)"),
        }
    }
}

/// Creates components for element descriptors.
pub trait ComponentFactory: Send + Sync {
    fn new_component(&self, descriptor: &ElementDescriptor) -> ComponentRef;
}

/// An in-memory component recording its state.
#[derive(Debug, Clone)]
pub struct HeadlessComponent {
    kind: ElementKind,
    label: Option<String>,
    enabled: bool,
    visible: bool,
    required: bool,
    read_only: bool,
    value: Value,
    available_values: Vec<Value>,
    messages: MessageList,
}

impl HeadlessComponent {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            label: None,
            enabled: true,
            visible: true,
            required: false,
            read_only: false,
            value: Value::Null,
            available_values: Vec::new(),
            messages: MessageList::new(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn value_ref(&self) -> &Value {
        &self.value
    }

    pub fn available_values(&self) -> &[Value] {
        &self.available_values
    }

    pub fn messages(&self) -> &MessageList {
        &self.messages
    }

    /// The highest severity among the displayed messages.
    pub fn severity(&self) -> Option<Severity> {
        self.messages.severity()
    }
}

impl Component for HeadlessComponent {
    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn set_label(&mut self, label: Option<&str>) {
        self.label = label.map(str::to_owned);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    fn value(&self) -> Value {
        self.value.clone()
    }

    fn set_available_values(&mut self, values: Vec<Value>) {
        self.available_values = values;
    }

    fn set_messages(&mut self, messages: MessageList) {
        self.messages = messages;
    }
}

/// Creates a [`HeadlessComponent`] of the descriptor's element kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessComponentFactory;

impl ComponentFactory for HeadlessComponentFactory {
    fn new_component(&self, descriptor: &ElementDescriptor) -> ComponentRef {
        ComponentRef::new(HeadlessComponent::new(descriptor.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_edit_stores_value_and_notifies() {
        let component = ComponentRef::new(HeadlessComponent::new(ElementKind::TextField));
        let seen = Arc::new(RwLock::new(Vec::new()));
        {
            let seen = seen.clone();
            component.on_edit(move |value: &Value| {
                seen.write().push(value.clone());
                Ok(())
            });
        }

        component.edit(Value::Text("a".into())).unwrap();
        assert_eq!(component.read().value(), Value::Text("a".into()));
        assert_eq!(*seen.read(), vec![Value::Text("a".into())]);
    }

    #[test]
    fn test_listener_may_update_component() {
        let component = ComponentRef::new(HeadlessComponent::new(ElementKind::TextField));
        let inner = component.clone();
        component.on_edit(move |_: &Value| {
            inner.write().set_value(Value::Text("normalized".into()));
            Ok(())
        });

        component.edit(Value::Text("raw".into())).unwrap();
        assert_eq!(
            component.with(|c: &HeadlessComponent| c.value_ref().clone()),
            Some(Value::Text("normalized".into()))
        );
    }

    #[test]
    fn test_remove_listener() {
        let component = ComponentRef::new(HeadlessComponent::new(ElementKind::Button));
        let clicks = Arc::new(AtomicUsize::new(0));
        let id = {
            let clicks = clicks.clone();
            component.on_click(move || {
                clicks.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        };

        component.click().unwrap();
        assert!(component.remove_listener(id));
        assert!(!component.remove_listener(id));
        component.click().unwrap();
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }
}
