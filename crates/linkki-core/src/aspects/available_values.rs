//! Available values of selection components.
//!
//! Statically declared available values are derived from the value type of
//! the property: the constants of an enum, or `true` and `false` for a
//! boolean. Dynamic available values come from the
//! `<property>_available_values` companion on every update.

use crate::annotation::AvailableValuesType;
use crate::error::{BindingError, BindingResult};
use crate::value::{Value, ValueKind, ValueType};

use super::{AspectDefinition, AspectTarget, UiUpdater, no_op_updater};

/// The statically declared available values of a property of type
/// `value_type`.
///
/// `EnumValuesInclNull` puts `Null` first, exactly once.
pub fn static_values(
    values_type: AvailableValuesType,
    value_type: &ValueType,
) -> BindingResult<Vec<Value>> {
    let include_null = match values_type {
        AvailableValuesType::NoValues => return Ok(Vec::new()),
        AvailableValuesType::Dynamic => {
            return Err(BindingError::illegal_state(format!(
                "dynamic available values of {} cannot be determined statically",
                value_type.type_name
            )));
        }
        AvailableValuesType::EnumValuesInclNull => true,
        AvailableValuesType::EnumValuesExclNull => false,
    };

    let constants = match value_type.kind {
        ValueKind::Enum(constants) => constants.iter().copied().map(Value::Enum).collect(),
        ValueKind::Bool => vec![Value::Bool(true), Value::Bool(false)],
        _ => {
            return Err(BindingError::illegal_state(format!(
                "cannot enumerate the values of {}; only enums and booleans have static available values",
                value_type.type_name
            )));
        }
    };

    Ok(with_null_first(constants, include_null))
}

fn with_null_first(mut values: Vec<Value>, include_null: bool) -> Vec<Value> {
    values.retain(|value| !value.is_null());
    if include_null {
        values.insert(0, Value::Null);
    }
    values
}

/// Pulls the available values into the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailableValuesAspectDefinition {
    values_type: AvailableValuesType,
}

impl AvailableValuesAspectDefinition {
    pub fn new(values_type: AvailableValuesType) -> Self {
        Self { values_type }
    }

    pub fn values_type(&self) -> AvailableValuesType {
        self.values_type
    }
}

impl AspectDefinition for AvailableValuesAspectDefinition {
    fn create_ui_updater(&self, target: &AspectTarget) -> BindingResult<UiUpdater> {
        if self.values_type == AvailableValuesType::NoValues {
            return Ok(no_op_updater());
        }
        let dynamic = self.values_type == AvailableValuesType::Dynamic;
        let AspectTarget {
            property,
            dispatcher,
            component,
        } = target.clone();
        Ok(Box::new(move || {
            let mut values = dispatcher.available_values(&property)?;
            // nullable properties always offer the empty selection
            if dynamic
                && !values.iter().any(Value::is_null)
                && dispatcher.value_type(&property)?.nullable
            {
                values.insert(0, Value::Null);
            }
            component.write().set_available_values(values);
            Ok(())
        }))
    }
}
