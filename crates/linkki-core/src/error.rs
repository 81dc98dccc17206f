//! Error types for linkki.

use std::fmt;

/// The operation a dispatcher was asked to perform when it failed.
///
/// Used by [`BindingError::IllegalArgument`] to describe what could not be
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Reading the value of a property.
    ReadValue,
    /// Writing the value of a property.
    WriteValue,
    /// Determining the declared value type of a property.
    ReadValueType,
    /// Reading the enabled state.
    ReadEnabled,
    /// Reading the visible state.
    ReadVisible,
    /// Reading the required state.
    ReadRequired,
    /// Reading the available values.
    ReadAvailableValues,
    /// Invoking a command-like property.
    Invoke,
    /// Pulling a named aspect.
    Pull(String),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadValue => write!(f, "read value of"),
            Self::WriteValue => write!(f, "write value of"),
            Self::ReadValueType => write!(f, "determine value type of"),
            Self::ReadEnabled => write!(f, "read enabled state of"),
            Self::ReadVisible => write!(f, "read visible state of"),
            Self::ReadRequired => write!(f, "read required state of"),
            Self::ReadAvailableValues => write!(f, "read available values of"),
            Self::Invoke => write!(f, "invoke"),
            Self::Pull(aspect) => write!(f, "read aspect '{aspect}' of"),
        }
    }
}

/// The main error type for binding operations.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// No link in the dispatcher chain could resolve the property.
    #[error("Cannot {operation} \"{property}\" in {object} (PMO {pmo})")]
    IllegalArgument {
        operation: Operation,
        property: String,
        object: String,
        pmo: String,
    },

    /// The property has no getter.
    #[error("{type_name} has no read method for property \"{property}\"")]
    NoReadMethod {
        type_name: &'static str,
        property: String,
    },

    /// The property has no setter.
    #[error("{type_name} has no write method for property \"{property}\"")]
    NoWriteMethod {
        type_name: &'static str,
        property: String,
    },

    /// The property has no invocable method.
    #[error("{type_name} has no method to invoke for \"{property}\"")]
    NoInvokeMethod {
        type_name: &'static str,
        property: String,
    },

    /// A value or object had an unexpected type.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },

    /// A bound method failed.
    #[error("Error invoking {type_name}::{method}: {source}")]
    Invocation {
        type_name: &'static str,
        method: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Two properties of one PMO declare the same position.
    #[error(
        "Duplicate position {position} in {pmo}: properties \"{first}\" and \"{second}\" share it"
    )]
    DuplicatePosition {
        pmo: &'static str,
        position: i32,
        first: String,
        second: String,
    },

    /// A PMO declaration is inconsistent.
    #[error("{0}")]
    IllegalState(String),

    /// A `#[model_object]` declaration is invalid.
    #[error("Invalid model object declaration in {pmo}: {message}")]
    ModelObjectAnnotation { pmo: &'static str, message: String },

    /// A property refers to a model object the PMO does not declare.
    #[error("{pmo} has no model object named \"{name}\" (required by property \"{property}\")")]
    MissingModelObject {
        pmo: &'static str,
        name: String,
        property: String,
    },
}

impl BindingError {
    /// Create a type mismatch error.
    pub fn type_mismatch(expected: &'static str, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.into(),
        }
    }

    /// Create an illegal state error.
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    /// Wrap the failure of a bound method.
    pub fn invocation(
        type_name: &'static str,
        method: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Invocation {
            type_name,
            method,
            source: source.into(),
        }
    }

    /// Whether this error stems from an inconsistent PMO declaration rather
    /// than from a runtime lookup.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicatePosition { .. }
                | Self::IllegalState(_)
                | Self::ModelObjectAnnotation { .. }
                | Self::MissingModelObject { .. }
        )
    }
}

/// A specialized Result type for binding operations.
pub type BindingResult<T> = std::result::Result<T, BindingError>;
