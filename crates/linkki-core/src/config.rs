//! Configuration of binding contexts.

use std::fmt;
use std::sync::Arc;

use crate::behavior::{NoBehaviorProvider, PropertyBehaviorProvider};
use crate::component::{ComponentFactory, HeadlessComponentFactory};
use crate::meta::MetaClass;

/// Resolves the label of a bound property.
///
/// Implement this to translate labels. `fallback` is the label declared in
/// the element annotation.
pub trait LabelResolver: Send + Sync {
    fn label(&self, class: &MetaClass, property: &str, fallback: Option<&str>) -> Option<String>;
}

impl<F> LabelResolver for F
where
    F: Fn(&MetaClass, &str, Option<&str>) -> Option<String> + Send + Sync,
{
    fn label(&self, class: &MetaClass, property: &str, fallback: Option<&str>) -> Option<String> {
        self(class, property, fallback)
    }
}

/// Uses the label declared in the annotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationLabelResolver;

impl LabelResolver for AnnotationLabelResolver {
    fn label(&self, _class: &MetaClass, _property: &str, fallback: Option<&str>) -> Option<String> {
        fallback.map(str::to_owned)
    }
}

/// The services a binding context creates its bindings with.
#[derive(Clone)]
pub struct BindingConfig {
    /// Creates the components of bound elements.
    pub component_factory: Arc<dyn ComponentFactory>,
    /// Resolves labels.
    pub label_resolver: Arc<dyn LabelResolver>,
    /// Provides the behaviors of every dispatcher chain.
    pub behavior_provider: Arc<dyn PropertyBehaviorProvider>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            component_factory: Arc::new(HeadlessComponentFactory),
            label_resolver: Arc::new(AnnotationLabelResolver),
            behavior_provider: Arc::new(NoBehaviorProvider),
        }
    }
}

impl BindingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component_factory(mut self, factory: impl ComponentFactory + 'static) -> Self {
        self.component_factory = Arc::new(factory);
        self
    }

    pub fn with_label_resolver(mut self, resolver: impl LabelResolver + 'static) -> Self {
        self.label_resolver = Arc::new(resolver);
        self
    }

    pub fn with_behavior_provider(mut self, provider: impl PropertyBehaviorProvider + 'static) -> Self {
        self.behavior_provider = Arc::new(provider);
        self
    }

    /// Share a provider whose behaviors are changed from outside.
    pub fn with_shared_behavior_provider(mut self, provider: Arc<dyn PropertyBehaviorProvider>) -> Self {
        self.behavior_provider = provider;
        self
    }
}

impl fmt::Debug for BindingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingConfig").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::test_support::person_pmo;

    #[test]
    fn test_annotation_label_resolver() {
        let (pmo, _) = person_pmo();
        let class = pmo.meta_class();
        assert_eq!(
            AnnotationLabelResolver.label(class, "name", Some("Name")),
            Some("Name".to_owned())
        );
        assert_eq!(AnnotationLabelResolver.label(class, "name", None), None);
    }

    #[test]
    fn test_closure_label_resolver() {
        let (pmo, _) = person_pmo();
        let config = BindingConfig::new().with_label_resolver(
            |class: &MetaClass, property: &str, _: Option<&str>| {
                Some(format!("{}.{property}", class.simple_name()))
            },
        );
        assert_eq!(
            config.label_resolver.label(pmo.meta_class(), "name", None),
            Some("PersonPmo.name".to_owned())
        );
    }
}
