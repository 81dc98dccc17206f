use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use slotmap::SlotMap;

use crate::annotation::DEFAULT_MODEL_OBJECT;
use crate::aspects::{AspectDefinition, Handler};
use crate::component::ComponentRef;
use crate::config::BindingConfig;
use crate::dispatcher::{PropertyDispatcher, PropertyDispatcherFactory};
use crate::error::{BindingError, BindingResult};
use crate::logging::targets;
use crate::message::MessageList;
use crate::object::ObjectRef;
use crate::reader::{ElementDescriptor, UiAnnotationReader};

use super::{Binding, BindingId, ContainerBinding, ElementBinding};

/// A named collection of bindings that are updated together.
///
/// Contexts are always shared: bindings call back into their context when a
/// component edit changed the model.
///
/// # Example
///
/// ```ignore
/// let context = BindingContext::new("person", BindingConfig::default());
/// let components = context.create_ui(&pmo)?;
/// // the user types into the first component
/// components[0].edit(Value::from("Grace"))?;
/// // all bindings of the context show the new state
/// ```
pub struct BindingContext {
    name: String,
    config: BindingConfig,
    bindings: RwLock<SlotMap<BindingId, Arc<dyn Binding>>>,
    dispatchers: RwLock<HashMap<(usize, String), Arc<dyn PropertyDispatcher>>>,
    after_update: RwLock<Option<Handler>>,
    this: Weak<BindingContext>,
}

impl BindingContext {
    pub fn new(name: impl Into<String>, config: BindingConfig) -> Arc<Self> {
        let name = name.into();
        Arc::new_cyclic(|this| Self {
            name,
            config,
            bindings: RwLock::new(SlotMap::with_key()),
            dispatchers: RwLock::new(HashMap::new()),
            after_update: RwLock::new(None),
            this: this.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Set the handler run after every [`model_changed`](Self::model_changed).
    pub fn set_after_update_handler<F>(&self, handler: F)
    where
        F: Fn() -> BindingResult<()> + Send + Sync + 'static,
    {
        *self.after_update.write() = Some(Arc::new(handler));
    }

    pub fn clear_after_update_handler(&self) {
        *self.after_update.write() = None;
    }

    /// The handler bindings call after pushing an edit.
    pub fn model_changed_handler(&self) -> Handler {
        let this = self.this.clone();
        Arc::new(move || -> BindingResult<()> {
            match this.upgrade() {
                Some(context) => context.model_changed(),
                None => Ok(()),
            }
        })
    }

    /// The dispatcher chain of `pmo` for the model object `model_object`,
    /// shared by all bindings of this context.
    pub fn dispatcher(
        &self,
        pmo: &ObjectRef,
        model_object: &str,
    ) -> BindingResult<Arc<dyn PropertyDispatcher>> {
        let key = (pmo.key(), model_object.to_owned());
        if let Some(dispatcher) = self.dispatchers.read().get(&key) {
            return Ok(dispatcher.clone());
        }
        let chain: Arc<dyn PropertyDispatcher> = Arc::from(PropertyDispatcherFactory::dispatcher_chain(
            pmo,
            model_object,
            self.config.behavior_provider.clone(),
        )?);
        Ok(self.dispatchers.write().entry(key).or_insert(chain).clone())
    }

    /// Register a binding.
    pub fn add(&self, binding: Arc<dyn Binding>) -> BindingId {
        let property = binding.property().to_owned();
        let id = self.bindings.write().insert(binding);
        tracing::trace!(target: targets::BINDING, context = %self.name, ?id, property = %property, "added binding");
        id
    }

    /// Bind the element `descriptor` of `pmo` to `component` and update it.
    pub fn bind(
        &self,
        pmo: &ObjectRef,
        descriptor: &ElementDescriptor,
        component: ComponentRef,
    ) -> BindingResult<BindingId> {
        let binding = self.element_binding(pmo, descriptor, component)?;
        Ok(self.add(binding))
    }

    /// Create and bind a component for every element of `pmo`.
    ///
    /// Returns the components sorted by position.
    pub fn create_ui(&self, pmo: &ObjectRef) -> BindingResult<Vec<ComponentRef>> {
        let bindings = self.element_bindings(pmo)?;
        let components = bindings.iter().map(|b| b.component().clone()).collect();
        for binding in bindings {
            self.add(binding);
        }
        Ok(components)
    }

    /// Bind `pmo` to a container component and create the bindings of its
    /// elements inside it.
    pub fn bind_container(
        &self,
        pmo: &ObjectRef,
        component: ComponentRef,
        aspects: &dyn AspectDefinition,
    ) -> BindingResult<BindingId> {
        let container = ContainerBinding::new(
            pmo.clone(),
            component,
            self.dispatcher(pmo, DEFAULT_MODEL_OBJECT)?,
            aspects,
            self.model_changed_handler(),
        )?;
        for child in self.element_bindings(pmo)? {
            container.add_child(child);
        }
        container.update_from_pmo()?;
        Ok(self.add(Arc::new(container)))
    }

    fn element_bindings(&self, pmo: &ObjectRef) -> BindingResult<Vec<Arc<dyn Binding>>> {
        let reader = UiAnnotationReader::for_class(pmo.meta_class())?;
        let selector = self.dispatcher(pmo, DEFAULT_MODEL_OBJECT)?;
        reader
            .ui_elements()
            .iter()
            .map(|group| {
                let descriptor = group.descriptor(selector.as_ref())?;
                let component = descriptor.new_component(self.config.component_factory.as_ref());
                self.element_binding(pmo, descriptor, component)
            })
            .collect()
    }

    fn element_binding(
        &self,
        pmo: &ObjectRef,
        descriptor: &ElementDescriptor,
        component: ComponentRef,
    ) -> BindingResult<Arc<dyn Binding>> {
        let reader = UiAnnotationReader::for_class(pmo.meta_class())?;
        let model_object = descriptor.model_object();
        let needs_model_object = descriptor.annotation().model_attribute.is_some()
            || model_object != DEFAULT_MODEL_OBJECT;
        if needs_model_object && !reader.has_model_object(model_object) {
            return Err(BindingError::MissingModelObject {
                pmo: reader.class().type_name(),
                name: model_object.to_owned(),
                property: descriptor.property().to_owned(),
            });
        }

        let aspects = descriptor.aspect_definitions(self.config.label_resolver.as_ref());
        let binding = ElementBinding::new(
            pmo.clone(),
            descriptor.property(),
            component,
            self.dispatcher(pmo, model_object)?,
            &aspects,
            self.model_changed_handler(),
        )?;
        binding.update_from_pmo()?;
        Ok(Arc::new(binding))
    }

    /// Pull the current PMO state into every component.
    #[tracing::instrument(level = "trace", skip_all, fields(context = %self.name))]
    pub fn update_ui(&self) -> BindingResult<()> {
        self.bindings()
            .iter()
            .try_for_each(|binding| binding.update_from_pmo())
    }

    /// Called when the model was changed through a binding: update the UI,
    /// then run the after-update handler.
    #[tracing::instrument(level = "trace", skip_all, fields(context = %self.name))]
    pub fn model_changed(&self) -> BindingResult<()> {
        self.update_ui()?;
        let handler = self.after_update.read().clone();
        match handler {
            Some(handler) => handler(),
            None => Ok(()),
        }
    }

    /// Show the relevant messages on every binding. Returns the messages
    /// shown.
    pub fn display_messages(&self, messages: &MessageList) -> BindingResult<MessageList> {
        let mut shown = MessageList::new();
        for binding in self.bindings() {
            shown.extend(binding.display_messages(messages)?);
        }
        Ok(shown)
    }

    /// Remove a binding and detach it from its component.
    ///
    /// The dispatchers of the binding's PMO are dropped with its last binding.
    pub fn remove(&self, id: BindingId) -> bool {
        let (removed, last_of_pmo) = {
            let mut bindings = self.bindings.write();
            let Some(binding) = bindings.remove(id) else {
                return false;
            };
            let last_of_pmo = !bindings.values().any(|b| b.pmo().ptr_eq(binding.pmo()));
            (binding, last_of_pmo)
        };
        if last_of_pmo {
            self.forget_dispatchers(removed.pmo());
        }
        detach(removed.as_ref());
        true
    }

    /// Remove all bindings of `pmo`. Returns how many were removed.
    pub fn remove_bindings_for_pmo(&self, pmo: &ObjectRef) -> usize {
        let removed: Vec<_> = {
            let mut bindings = self.bindings.write();
            let ids: Vec<_> = bindings
                .iter()
                .filter(|(_, binding)| binding.pmo().ptr_eq(pmo))
                .map(|(id, _)| id)
                .collect();
            ids.into_iter().filter_map(|id| bindings.remove(id)).collect()
        };
        self.forget_dispatchers(pmo);
        removed.iter().for_each(|binding| detach(binding.as_ref()));

        tracing::trace!(target: targets::BINDING, context = %self.name, removed = removed.len(), "removed bindings of pmo");
        removed.len()
    }

    fn forget_dispatchers(&self, pmo: &ObjectRef) {
        self.dispatchers.write().retain(|(key, _), _| *key != pmo.key());
    }

    pub fn binding(&self, id: BindingId) -> Option<Arc<dyn Binding>> {
        self.bindings.read().get(id).cloned()
    }

    /// The binding of `property` of `pmo`, searching containers too.
    pub fn find(&self, pmo: &ObjectRef, property: &str) -> Option<Arc<dyn Binding>> {
        fn search(
            bindings: Vec<Arc<dyn Binding>>,
            pmo: &ObjectRef,
            property: &str,
        ) -> Option<Arc<dyn Binding>> {
            bindings.into_iter().find_map(|binding| {
                if binding.pmo().ptr_eq(pmo) && binding.property() == property {
                    Some(binding)
                } else {
                    search(binding.children(), pmo, property)
                }
            })
        }
        search(self.bindings(), pmo, property)
    }

    /// A snapshot of the bindings.
    pub fn bindings(&self) -> Vec<Arc<dyn Binding>> {
        self.bindings.read().values().cloned().collect()
    }

    /// A snapshot of the bindings with their ids.
    pub fn entries(&self) -> Vec<(BindingId, Arc<dyn Binding>)> {
        self.bindings
            .read()
            .iter()
            .map(|(id, binding)| (id, binding.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }
}

fn detach(binding: &dyn Binding) {
    binding.component().clear_listeners();
    binding
        .children()
        .iter()
        .for_each(|child| detach(child.as_ref()));
}

impl fmt::Debug for BindingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingContext")
            .field("name", &self.name)
            .field("bindings", &self.bindings.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::annotation::{ElementAnnotation, ElementKind, VisibleType};
    use crate::aspects::{CompositeAspectDefinition, VisibleAspectDefinition};
    use crate::component::{HeadlessComponent, HeadlessComponentFactory};
    use crate::dispatcher::test_support::{PersonPmo, person_pmo};
    use crate::meta::MetaClass;
    use crate::object::Bindable;
    use crate::value::Value;

    fn component_state<R>(component: &ComponentRef, f: impl FnOnce(&HeadlessComponent) -> R) -> R {
        component.with(f).unwrap()
    }

    #[test]
    fn test_create_ui_in_position_order() {
        let (pmo, _) = person_pmo();
        let context = BindingContext::new("person", BindingConfig::default());
        let components = context.create_ui(&pmo).unwrap();

        let kinds: Vec<_> = components.iter().map(ComponentRef::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::TextField,
                ElementKind::ComboBox,
                ElementKind::TextField,
                ElementKind::Button,
                ElementKind::TextField,
            ]
        );
        assert_eq!(context.len(), 5);

        component_state(&components[0], |c| {
            assert_eq!(c.label(), Some("Name"));
            assert_eq!(c.value_ref(), &Value::Text("Ada".into()));
            assert!(!c.is_enabled());
            assert!(!c.is_required());
        });
        component_state(&components[1], |c| assert_eq!(c.available_values().len(), 3));
        component_state(&components[3], |c| assert_eq!(c.label(), Some("Save")));
    }

    #[test]
    fn test_edit_updates_all_bindings() {
        let (pmo, person) = person_pmo();
        let context = BindingContext::new("person", BindingConfig::default());
        let components = context.create_ui(&pmo).unwrap();

        pmo.with_mut(|p: &mut PersonPmo| p.editable = true);
        context.update_ui().unwrap();
        component_state(&components[0], |c| {
            assert!(c.is_enabled());
            assert!(c.is_required());
        });

        components[0].edit(Value::Text("Grace".into())).unwrap();
        assert_eq!(person.read().name, "Grace");
        // bound to the same model attribute through another property
        component_state(&components[4], |c| {
            assert_eq!(c.value_ref(), &Value::Text("Grace".into()));
        });
    }

    #[test]
    fn test_click_runs_after_update_handler() {
        let (pmo, _) = person_pmo();
        let context = BindingContext::new("person", BindingConfig::default());
        let components = context.create_ui(&pmo).unwrap();
        let updates = Arc::new(AtomicUsize::new(0));
        {
            let updates = updates.clone();
            context.set_after_update_handler(move || {
                updates.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        components[3].click().unwrap();
        assert_eq!(pmo.with(|p: &PersonPmo| p.saved), Some(1));
        assert_eq!(updates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_bindings_for_pmo_detaches_components() {
        let (pmo, person) = person_pmo();
        let context = BindingContext::new("person", BindingConfig::default());
        let components = context.create_ui(&pmo).unwrap();

        assert_eq!(context.remove_bindings_for_pmo(&pmo), 5);
        assert!(context.is_empty());
        components[0].edit(Value::Text("Grace".into())).unwrap();
        assert_eq!(person.read().name, "Ada");
    }

    #[test]
    fn test_remove_last_binding_releases_pmo() {
        let (_, person) = person_pmo();
        let shared = Arc::new(RwLock::new(PersonPmo {
            person,
            editable: false,
            saved: 0,
            notes: String::new(),
            messages: MessageList::new(),
        }));
        let pmo = ObjectRef::from_shared(shared.clone());
        let context = BindingContext::new("person", BindingConfig::default());
        context.create_ui(&pmo).unwrap();
        assert!(Arc::strong_count(&shared) > 2);

        let ids: Vec<_> = context.entries().into_iter().map(|(id, _)| id).collect();
        let (last, rest) = ids.split_last().unwrap();
        for id in rest {
            assert!(context.remove(*id));
        }
        // the remaining binding still needs the shared chain
        assert!(context.dispatcher(&pmo, DEFAULT_MODEL_OBJECT).is_ok());
        assert!(Arc::strong_count(&shared) > 2);

        assert!(context.remove(*last));
        assert!(!context.remove(*last));
        assert!(context.is_empty());
        assert_eq!(Arc::strong_count(&shared), 2);
        drop(pmo);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    struct Section {
        shown: bool,
        heading: String,
    }

    impl Bindable for Section {
        fn meta_class(&self) -> &'static MetaClass {
            static META: OnceLock<MetaClass> = OnceLock::new();
            META.get_or_init(|| {
                MetaClass::builder::<Section>()
                    .getter("visible", |s: &Section| s.shown)
                    .getter("get_heading", |s: &Section| s.heading.clone())
                    .annotate("get_heading", ElementAnnotation::label(1))
                    .build()
            })
        }
    }

    #[test]
    fn test_container_binding() {
        let pmo = ObjectRef::new(Section {
            shown: false,
            heading: "Address".into(),
        });
        let context = BindingContext::new("section", BindingConfig::default());
        let section = ComponentRef::new(HeadlessComponent::new(ElementKind::Custom("section")));
        let id = context
            .bind_container(
                &pmo,
                section.clone(),
                &CompositeAspectDefinition::new().with(VisibleAspectDefinition),
            )
            .unwrap();

        let container = context.binding(id).unwrap();
        assert_eq!(container.children().len(), 1);
        assert_eq!(context.len(), 1);
        assert!(!component_state(&section, HeadlessComponent::is_visible));

        let heading = context.find(&pmo, "heading").unwrap();
        assert_eq!(
            component_state(heading.component(), |c| c.value_ref().clone()),
            Value::Text("Address".into())
        );

        pmo.with_mut(|s: &mut Section| s.shown = true);
        context.update_ui().unwrap();
        assert!(component_state(&section, HeadlessComponent::is_visible));
    }

    struct Orphan;

    impl Bindable for Orphan {
        fn meta_class(&self) -> &'static MetaClass {
            static META: OnceLock<MetaClass> = OnceLock::new();
            META.get_or_init(|| {
                MetaClass::builder::<Orphan>()
                    .action("street", |_: &mut Orphan| {})
                    .annotate(
                        "street",
                        ElementAnnotation::text_field(1)
                            .with_model_attribute("street_name")
                            .with_visible(VisibleType::Invisible),
                    )
                    .build()
            })
        }
    }

    #[test]
    fn test_missing_model_object() {
        let pmo = ObjectRef::new(Orphan);
        let context = BindingContext::new("orphan", BindingConfig::default());
        let err = context.create_ui(&pmo).unwrap_err();
        assert!(matches!(
            err,
            BindingError::MissingModelObject { ref name, ref property, .. }
                if name == "model_object" && property == "street"
        ));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_dispatchers_shared_per_pmo() {
        let (pmo, _) = person_pmo();
        let context = BindingContext::new(
            "person",
            BindingConfig::default().with_component_factory(HeadlessComponentFactory),
        );
        let a = context.dispatcher(&pmo, DEFAULT_MODEL_OBJECT).unwrap();
        let b = context.dispatcher(&pmo, DEFAULT_MODEL_OBJECT).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
