use crate::error::BindingResult;
use crate::value::Value;

use super::{Aspect, AspectDefinition, AspectTarget, UiUpdater, no_op_updater};

/// Pulls the enabled state.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnabledAspectDefinition;

impl AspectDefinition for EnabledAspectDefinition {
    fn create_ui_updater(&self, target: &AspectTarget) -> BindingResult<UiUpdater> {
        let AspectTarget {
            property,
            dispatcher,
            component,
        } = target.clone();
        Ok(Box::new(move || {
            let enabled = dispatcher.is_enabled(&property)?;
            component.write().set_enabled(enabled);
            Ok(())
        }))
    }
}

/// Pulls the visibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibleAspectDefinition;

impl AspectDefinition for VisibleAspectDefinition {
    fn create_ui_updater(&self, target: &AspectTarget) -> BindingResult<UiUpdater> {
        let AspectTarget {
            property,
            dispatcher,
            component,
        } = target.clone();
        Ok(Box::new(move || {
            let visible = dispatcher.is_visible(&property)?;
            component.write().set_visible(visible);
            Ok(())
        }))
    }
}

/// Pulls the required state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredAspectDefinition;

impl AspectDefinition for RequiredAspectDefinition {
    fn create_ui_updater(&self, target: &AspectTarget) -> BindingResult<UiUpdater> {
        let AspectTarget {
            property,
            dispatcher,
            component,
        } = target.clone();
        Ok(Box::new(move || {
            let required = dispatcher.is_required(&property)?;
            component.write().set_required(required);
            Ok(())
        }))
    }
}

/// Applies a static label.
///
/// The label is pulled once, when the updater is created. Without a label
/// the component is left untouched.
#[derive(Debug, Clone, Default)]
pub struct LabelAspectDefinition {
    label: Option<String>,
}

impl LabelAspectDefinition {
    pub fn new(label: Option<String>) -> Self {
        Self { label }
    }
}

impl AspectDefinition for LabelAspectDefinition {
    fn create_ui_updater(&self, target: &AspectTarget) -> BindingResult<UiUpdater> {
        let Some(label) = &self.label else {
            return Ok(no_op_updater());
        };
        let aspect = Aspect::with_value(Aspect::LABEL, Value::Text(label.clone()));
        let text = target.dispatcher.pull(&target.property, &aspect)?.to_string();
        target.component.write().set_label(Some(&text));
        Ok(no_op_updater())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::ElementKind;
    use crate::aspects::test_support::target as aspect_target;
    use crate::component::HeadlessComponent;
    use crate::dispatcher::test_support::PersonPmo;

    #[test]
    fn test_required_follows_enabled() {
        let (pmo, target) = aspect_target("name", ElementKind::TextField);
        let update = RequiredAspectDefinition.create_ui_updater(&target).unwrap();

        update().unwrap();
        assert_eq!(target.component.with(|c: &HeadlessComponent| c.is_required()), Some(false));

        pmo.with_mut(|p: &mut PersonPmo| p.editable = true);
        update().unwrap();
        assert_eq!(target.component.with(|c: &HeadlessComponent| c.is_required()), Some(true));
    }

    #[test]
    fn test_visible_from_annotation_default() {
        let (_pmo, target) = aspect_target("notes", ElementKind::TextField);
        VisibleAspectDefinition.create_ui_updater(&target).unwrap()().unwrap();
        assert_eq!(target.component.with(|c: &HeadlessComponent| c.is_visible()), Some(true));
    }

    #[test]
    fn test_label_is_applied_once() {
        let (_pmo, target) = aspect_target("save", ElementKind::Button);
        LabelAspectDefinition::new(Some("Save".into()))
            .create_ui_updater(&target)
            .unwrap();
        assert_eq!(
            target.component.with(|c: &HeadlessComponent| c.label().map(str::to_owned)),
            Some(Some("Save".to_owned()))
        );

        let (_pmo, unlabeled) = aspect_target("notes", ElementKind::TextField);
        LabelAspectDefinition::new(None)
            .create_ui_updater(&unlabeled)
            .unwrap();
        assert_eq!(unlabeled.component.with(|c: &HeadlessComponent| c.label().is_none()), Some(true));
    }

    #[test]
    fn test_unknown_property_fails_on_update() {
        let (_pmo, target) = aspect_target("unknown", ElementKind::TextField);
        let update = EnabledAspectDefinition.create_ui_updater(&target).unwrap();
        assert!(update().is_err());
    }
}
