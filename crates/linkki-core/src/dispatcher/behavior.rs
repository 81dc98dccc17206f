use std::sync::Arc;

use crate::aspects::Aspect;
use crate::behavior::{PropertyBehavior, PropertyBehaviorProvider};
use crate::error::BindingResult;
use crate::logging::targets;
use crate::message::MessageList;
use crate::object::ObjectRef;
use crate::value::{Value, ValueType};

use super::PropertyDispatcher;

/// Applies the behaviors of a [`PropertyBehaviorProvider`].
///
/// A property is read-only if any behavior denies writing, invisible if any
/// behavior hides it, and shows no messages if any behavior suppresses them.
/// Writes to properties a behavior denies are dropped.
pub struct BehaviorDependentDispatcher {
    provider: Arc<dyn PropertyBehaviorProvider>,
    fallback: Box<dyn PropertyDispatcher>,
}

impl BehaviorDependentDispatcher {
    pub fn new(
        provider: Arc<dyn PropertyBehaviorProvider>,
        fallback: Box<dyn PropertyDispatcher>,
    ) -> Self {
        Self { provider, fallback }
    }

    fn any_denies(
        &self,
        property: &str,
        allows: impl Fn(&dyn PropertyBehavior, Option<&ObjectRef>, &str) -> bool,
    ) -> bool {
        let behaviors = self.provider.behaviors();
        if behaviors.is_empty() {
            return false;
        }
        let object = self.fallback.bound_object();
        behaviors
            .iter()
            .any(|behavior| !allows(behavior.as_ref(), object.as_ref(), property))
    }

    fn is_writable(&self, property: &str) -> bool {
        !self.any_denies(property, |b, o, p| b.is_writable(o, p))
    }
}

impl PropertyDispatcher for BehaviorDependentDispatcher {
    fn value_type(&self, property: &str) -> BindingResult<ValueType> {
        self.fallback.value_type(property)
    }

    fn value(&self, property: &str) -> BindingResult<Value> {
        self.fallback.value(property)
    }

    fn set_value(&self, property: &str, value: Value) -> BindingResult<()> {
        if self.is_writable(property) {
            self.fallback.set_value(property, value)
        } else {
            tracing::debug!(
                target: targets::DISPATCHER,
                property,
                "dropped write to property denied by behavior"
            );
            Ok(())
        }
    }

    fn is_read_only(&self, property: &str) -> BindingResult<bool> {
        if self.is_writable(property) {
            self.fallback.is_read_only(property)
        } else {
            Ok(true)
        }
    }

    fn is_enabled(&self, property: &str) -> BindingResult<bool> {
        self.fallback.is_enabled(property)
    }

    fn is_visible(&self, property: &str) -> BindingResult<bool> {
        if self.any_denies(property, |b, o, p| b.is_visible(o, p)) {
            Ok(false)
        } else {
            self.fallback.is_visible(property)
        }
    }

    fn is_required(&self, property: &str) -> BindingResult<bool> {
        self.fallback.is_required(property)
    }

    fn available_values(&self, property: &str) -> BindingResult<Vec<Value>> {
        self.fallback.available_values(property)
    }

    fn messages(&self, property: &str, messages: &MessageList) -> BindingResult<MessageList> {
        if self.any_denies(property, |b, o, p| b.is_show_validation_messages(o, p)) {
            Ok(MessageList::new())
        } else {
            self.fallback.messages(property, messages)
        }
    }

    fn invoke(&self, property: &str) -> BindingResult<()> {
        self.fallback.invoke(property)
    }

    fn pull(&self, property: &str, aspect: &Aspect) -> BindingResult<Value> {
        self.fallback.pull(property, aspect)
    }

    fn bound_object(&self) -> Option<ObjectRef> {
        self.fallback.bound_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{BehaviorList, NoBehaviorProvider, ReadOnlyBehavior};
    use crate::dispatcher::test_support::{PersonPmo, person_pmo};
    use crate::dispatcher::{ExceptionPropertyDispatcher, ReflectionPropertyDispatcher};
    use crate::message::Message;

    struct HideAndMute;

    impl PropertyBehavior for HideAndMute {
        fn is_visible(&self, object: Option<&ObjectRef>, property: &str) -> bool {
            assert!(object.is_some());
            property != "notes"
        }

        fn is_show_validation_messages(&self, _object: Option<&ObjectRef>, _property: &str) -> bool {
            false
        }
    }

    fn dispatcher(pmo: &ObjectRef, provider: impl PropertyBehaviorProvider + 'static) -> BehaviorDependentDispatcher {
        let pmo_layer = ReflectionPropertyDispatcher::for_object(
            pmo.clone(),
            Box::new(ExceptionPropertyDispatcher::new(pmo.clone(), None)),
        );
        BehaviorDependentDispatcher::new(Arc::new(provider), Box::new(pmo_layer))
    }

    #[test]
    fn test_read_only_behavior_drops_writes() {
        let (pmo, _) = person_pmo();
        let read_only = Arc::new(ReadOnlyBehavior::new(true));
        let dispatcher = dispatcher(&pmo, BehaviorList::new().with_shared(read_only.clone()));

        assert!(dispatcher.is_read_only("notes").unwrap());
        dispatcher
            .set_value("notes", Value::Text("ignored".into()))
            .unwrap();
        assert_eq!(pmo.with(|p: &PersonPmo| p.notes.clone()), Some(String::new()));

        read_only.set_read_only(false);
        assert!(!dispatcher.is_read_only("notes").unwrap());
        dispatcher
            .set_value("notes", Value::Text("kept".into()))
            .unwrap();
        assert_eq!(pmo.with(|p: &PersonPmo| p.notes.clone()), Some("kept".to_owned()));
    }

    #[test]
    fn test_visibility_and_messages() {
        let (pmo, _) = person_pmo();
        let dispatcher = dispatcher(&pmo, BehaviorList::new().with(HideAndMute));

        assert!(!dispatcher.is_visible("notes").unwrap());

        let mut all = MessageList::new();
        all.add(Message::error("bad").with_invalid_property(&pmo, "notes"));
        assert!(dispatcher.messages("notes", &all).unwrap().is_empty());
    }

    #[test]
    fn test_without_behaviors_everything_is_delegated() {
        let (pmo, _) = person_pmo();
        let dispatcher = dispatcher(&pmo, NoBehaviorProvider);

        assert!(!dispatcher.is_read_only("notes").unwrap());
        assert!(dispatcher.is_visible("notes").is_err());
        let mut all = MessageList::new();
        all.add(Message::error("bad").with_invalid_property(&pmo, "notes"));
        assert_eq!(dispatcher.messages("notes", &all).unwrap().len(), 1);
    }
}
