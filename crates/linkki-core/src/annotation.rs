//! Declarative UI annotations.
//!
//! Annotations are attached to methods of a [`MetaClass`](crate::meta::MetaClass),
//! either by the `#[ui_*]` attributes recognized by `#[bindable]` or through
//! [`MetaClassBuilder::annotate`](crate::meta::MetaClassBuilder::annotate).
//! [`ElementAnnotation`] marks a method as a bound UI element,
//! [`TableColumnAnnotation`] adds column settings to an element, and
//! [`ModelObjectAnnotation`] marks the getter of a model object.

use std::fmt;

/// The default name of a model object.
pub const DEFAULT_MODEL_OBJECT: &str = "model_object";

/// The kind of UI element an annotation creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    TextField,
    CheckBox,
    ComboBox,
    Button,
    Label,
    /// An element provided by a custom component factory.
    Custom(&'static str),
}

impl ElementKind {
    /// The name used to select among several elements of one property.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TextField => "text_field",
            Self::CheckBox => "check_box",
            Self::ComboBox => "combo_box",
            Self::Button => "button",
            Self::Label => "label",
            Self::Custom(name) => name,
        }
    }

    /// Look up a built-in kind by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text_field" => Some(Self::TextField),
            "check_box" => Some(Self::CheckBox),
            "combo_box" => Some(Self::ComboBox),
            "button" => Some(Self::Button),
            "label" => Some(Self::Label),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the enabled state of an element is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnabledType {
    #[default]
    Enabled,
    Disabled,
    /// Read from the `<property>_enabled` companion.
    Dynamic,
}

/// How the visibility of an element is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisibleType {
    #[default]
    Visible,
    Invisible,
    /// Read from the `<property>_visible` companion.
    Dynamic,
}

/// How the required state of an element is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequiredType {
    #[default]
    NotRequired,
    Required,
    /// Required whenever the element is enabled.
    RequiredIfEnabled,
    /// Read from the `<property>_required` companion.
    Dynamic,
}

/// How the available values of an element are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AvailableValuesType {
    /// All constants of the value type, preceded by `Null`.
    EnumValuesInclNull,
    /// All constants of the value type.
    EnumValuesExclNull,
    #[default]
    NoValues,
    /// Read from the `<property>_available_values` companion.
    Dynamic,
}

/// Marks a method as a bound UI element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementAnnotation {
    pub kind: ElementKind,
    /// The layout position, unique per PMO.
    pub position: i32,
    pub label: Option<String>,
    pub enabled: EnabledType,
    pub visible: VisibleType,
    pub required: RequiredType,
    pub available_values: AvailableValuesType,
    /// The model object the property delegates to.
    pub model_object: String,
    /// The property of the model object, if it differs from the PMO property.
    pub model_attribute: Option<String>,
}

impl ElementAnnotation {
    /// Create an annotation with default settings.
    pub fn new(kind: ElementKind, position: i32) -> Self {
        Self {
            kind,
            position,
            label: None,
            enabled: EnabledType::default(),
            visible: VisibleType::default(),
            required: RequiredType::default(),
            available_values: AvailableValuesType::default(),
            model_object: DEFAULT_MODEL_OBJECT.to_owned(),
            model_attribute: None,
        }
    }

    pub fn text_field(position: i32) -> Self {
        Self::new(ElementKind::TextField, position)
    }

    pub fn check_box(position: i32) -> Self {
        Self::new(ElementKind::CheckBox, position)
    }

    /// A combo box offering the constants of its value type, including `Null`.
    pub fn combo_box(position: i32) -> Self {
        Self::new(ElementKind::ComboBox, position)
            .with_available_values(AvailableValuesType::EnumValuesInclNull)
    }

    pub fn button(position: i32) -> Self {
        Self::new(ElementKind::Button, position)
    }

    pub fn label(position: i32) -> Self {
        Self::new(ElementKind::Label, position)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_enabled(mut self, enabled: EnabledType) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_visible(mut self, visible: VisibleType) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_required(mut self, required: RequiredType) -> Self {
        self.required = required;
        self
    }

    pub fn with_available_values(mut self, available_values: AvailableValuesType) -> Self {
        self.available_values = available_values;
        self
    }

    pub fn with_model_object(mut self, name: impl Into<String>) -> Self {
        self.model_object = name.into();
        self
    }

    pub fn with_model_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.model_attribute = Some(attribute.into());
        self
    }
}

/// Column settings of an element shown in a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableColumnAnnotation {
    /// Fixed width in pixels, if any.
    pub width: Option<u32>,
    pub expand_ratio: Option<f32>,
    pub collapsible: bool,
    pub collapsed: bool,
}

impl TableColumnAnnotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_expand_ratio(mut self, ratio: f32) -> Self {
        self.expand_ratio = Some(ratio);
        self
    }

    pub fn collapsible(mut self, collapsed: bool) -> Self {
        self.collapsible = true;
        self.collapsed = collapsed;
        self
    }
}

/// Marks the getter of a model object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelObjectAnnotation {
    pub name: String,
}

impl ModelObjectAnnotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ModelObjectAnnotation {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_OBJECT)
    }
}

/// Any annotation that can be attached to a method.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Element(ElementAnnotation),
    TableColumn(TableColumnAnnotation),
    ModelObject(ModelObjectAnnotation),
}

impl From<ElementAnnotation> for Annotation {
    fn from(annotation: ElementAnnotation) -> Self {
        Self::Element(annotation)
    }
}

impl From<TableColumnAnnotation> for Annotation {
    fn from(annotation: TableColumnAnnotation) -> Self {
        Self::TableColumn(annotation)
    }
}

impl From<ModelObjectAnnotation> for Annotation {
    fn from(annotation: ModelObjectAnnotation) -> Self {
        Self::ModelObject(annotation)
    }
}
