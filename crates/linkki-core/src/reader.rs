//! Reading the UI declaration of a PMO type.
//!
//! [`UiAnnotationReader`] scans the annotations of a [`MetaClass`] once and
//! keeps the result for the lifetime of the process:
//!
//! - element annotations are grouped by property into
//!   [`PropertyElementDescriptors`], sorted by position
//! - table column annotations are attached to the group of their property
//! - model object getters are collected by name
//!
//! The property name of an annotated method is derived from the method name
//! (see [`derive_property_name`]). A declaration in which two properties
//! share a position is rejected with [`BindingError::DuplicatePosition`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::annotation::{
    Annotation, AvailableValuesType, ElementAnnotation, ElementKind, TableColumnAnnotation,
};
use crate::aspects::{
    Aspect, AvailableValuesAspectDefinition, CompositeAspectDefinition, EnabledAspectDefinition,
    InvokeAspectDefinition, LabelAspectDefinition, RequiredAspectDefinition,
    ValueAspectDefinition, VisibleAspectDefinition,
};
use crate::component::{ComponentFactory, ComponentRef};
use crate::config::LabelResolver;
use crate::dispatcher::{ObjectSupplier, PropertyDispatcher};
use crate::error::{BindingError, BindingResult};
use crate::logging::targets;
use crate::meta::{GetterFn, MetaClass, MetaMethod, MethodKind};
use crate::object::ObjectRef;
use crate::value::{Value, ValueKind};

/// The property bound by a method.
///
/// Methods returning nothing bind a property of their own name. Otherwise a
/// `get_` or `is_` prefix is removed, unless nothing would remain.
///
/// ```
/// use linkki_core::reader::derive_property_name;
///
/// assert_eq!(derive_property_name("get_name", false), "name");
/// assert_eq!(derive_property_name("is_active", false), "active");
/// assert_eq!(derive_property_name("save", true), "save");
/// assert_eq!(derive_property_name("get_", false), "get_");
/// ```
pub fn derive_property_name(method: &str, returns_unit: bool) -> &str {
    if returns_unit {
        return method;
    }
    ["get_", "is_"]
        .iter()
        .find_map(|prefix| method.strip_prefix(prefix).filter(|rest| !rest.is_empty()))
        .unwrap_or(method)
}

/// One element annotation of a PMO.
#[derive(Debug, Clone)]
pub struct ElementDescriptor {
    pmo_class: &'static MetaClass,
    method: &'static str,
    property: String,
    annotation: ElementAnnotation,
}

impl ElementDescriptor {
    pub fn pmo_class(&self) -> &'static MetaClass {
        self.pmo_class
    }

    /// The annotated method.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The property of the PMO.
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn annotation(&self) -> &ElementAnnotation {
        &self.annotation
    }

    pub fn kind(&self) -> ElementKind {
        self.annotation.kind
    }

    pub fn position(&self) -> i32 {
        self.annotation.position
    }

    pub fn label(&self) -> Option<&str> {
        self.annotation.label.as_deref()
    }

    pub fn model_object(&self) -> &str {
        &self.annotation.model_object
    }

    /// The property of the model object; the PMO property unless declared.
    pub fn model_attribute(&self) -> &str {
        self.annotation
            .model_attribute
            .as_deref()
            .unwrap_or(&self.property)
    }

    /// The aspects bound for this element.
    pub fn aspect_definitions(&self, labels: &dyn LabelResolver) -> CompositeAspectDefinition {
        let label = labels.label(self.pmo_class, &self.property, self.label());
        let mut aspects = CompositeAspectDefinition::new()
            .with(LabelAspectDefinition::new(label))
            .with(EnabledAspectDefinition)
            .with(VisibleAspectDefinition);

        match self.kind() {
            ElementKind::Button => aspects = aspects.with(InvokeAspectDefinition),
            ElementKind::Label => aspects = aspects.with(ValueAspectDefinition),
            ElementKind::TextField
            | ElementKind::CheckBox
            | ElementKind::ComboBox
            | ElementKind::Custom(_) => {
                aspects = aspects
                    .with(ValueAspectDefinition)
                    .with(RequiredAspectDefinition);
            }
        }

        if self.annotation.available_values != AvailableValuesType::NoValues {
            aspects = aspects.with(AvailableValuesAspectDefinition::new(
                self.annotation.available_values,
            ));
        }
        aspects
    }

    /// Create the component of this element.
    pub fn new_component(&self, factory: &dyn ComponentFactory) -> ComponentRef {
        factory.new_component(self)
    }
}

/// A table column annotation of a PMO.
#[derive(Debug, Clone)]
pub struct TableColumnDescriptor {
    method: &'static str,
    property: String,
    annotation: TableColumnAnnotation,
}

impl TableColumnDescriptor {
    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn annotation(&self) -> &TableColumnAnnotation {
        &self.annotation
    }
}

/// All annotations of one property.
#[derive(Debug, Clone)]
pub struct PropertyElementDescriptors {
    property: String,
    position: i32,
    descriptors: Vec<ElementDescriptor>,
    column: Option<TableColumnDescriptor>,
}

impl PropertyElementDescriptors {
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    /// The element annotations, in declaration order.
    pub fn descriptors(&self) -> &[ElementDescriptor] {
        &self.descriptors
    }

    pub fn table_column(&self) -> Option<&TableColumnDescriptor> {
        self.column.as_ref()
    }

    /// The element to use for a PMO instance.
    ///
    /// With several elements the choice is made by the `component_type`
    /// aspect of the property, which must name one of their kinds.
    pub fn descriptor(&self, dispatcher: &dyn PropertyDispatcher) -> BindingResult<&ElementDescriptor> {
        if let [single] = self.descriptors.as_slice() {
            return Ok(single);
        }

        let selected = dispatcher.pull(&self.property, &Aspect::new(Aspect::COMPONENT_TYPE))?;
        let name = match &selected {
            Value::Text(name) => name.as_str(),
            Value::Enum(constant) => constant.name,
            other => {
                return Err(BindingError::type_mismatch("component type", other.kind_name()));
            }
        };
        self.descriptors
            .iter()
            .find(|d| d.kind().name() == name)
            .ok_or_else(|| {
                BindingError::illegal_state(format!(
                    "property \"{}\" has no element of component type \"{name}\"",
                    self.property
                ))
            })
    }
}

/// The scanned UI declaration of a PMO type.
pub struct UiAnnotationReader {
    class: &'static MetaClass,
    elements: Vec<PropertyElementDescriptors>,
    model_objects: HashMap<String, &'static MetaMethod>,
}

impl UiAnnotationReader {
    /// Scan `class`.
    ///
    /// Fails if the declaration is inconsistent: elements of one property at
    /// different positions, two properties at one position, a table column
    /// without element, or an invalid model object.
    pub fn new(class: &'static MetaClass) -> BindingResult<Self> {
        let mut elements: Vec<PropertyElementDescriptors> = Vec::new();
        let mut columns: Vec<TableColumnDescriptor> = Vec::new();
        let mut model_objects: HashMap<String, &'static MetaMethod> = HashMap::new();

        for annotated in class.annotations() {
            let method = class.method(annotated.method).ok_or_else(|| {
                BindingError::illegal_state(format!(
                    "{} annotates unknown method \"{}\"",
                    class.type_name(),
                    annotated.method
                ))
            })?;
            let property = derive_property_name(method.name(), method.returns_unit());

            match &annotated.annotation {
                Annotation::Element(annotation) => {
                    let descriptor = ElementDescriptor {
                        pmo_class: class,
                        method: method.name(),
                        property: property.to_owned(),
                        annotation: annotation.clone(),
                    };
                    match elements.iter_mut().find(|group| group.property == property) {
                        Some(group) if group.position != annotation.position => {
                            return Err(BindingError::illegal_state(format!(
                                "all elements of property \"{property}\" in {} must share one position, found {} and {}",
                                class.type_name(),
                                group.position,
                                annotation.position
                            )));
                        }
                        Some(group) => group.descriptors.push(descriptor),
                        None => elements.push(PropertyElementDescriptors {
                            property: property.to_owned(),
                            position: annotation.position,
                            descriptors: vec![descriptor],
                            column: None,
                        }),
                    }
                }
                Annotation::TableColumn(annotation) => columns.push(TableColumnDescriptor {
                    method: method.name(),
                    property: property.to_owned(),
                    annotation: annotation.clone(),
                }),
                Annotation::ModelObject(annotation) => {
                    let returns_object = matches!(
                        method.value_type().map(|t| t.kind),
                        Some(ValueKind::Object | ValueKind::Any)
                    );
                    if !returns_object {
                        return Err(BindingError::ModelObjectAnnotation {
                            pmo: class.type_name(),
                            message: format!(
                                "method \"{}\" must return the model object \"{}\"",
                                method.name(),
                                annotation.name
                            ),
                        });
                    }
                    if model_objects.insert(annotation.name.clone(), method).is_some() {
                        return Err(BindingError::ModelObjectAnnotation {
                            pmo: class.type_name(),
                            message: format!("duplicate model object \"{}\"", annotation.name),
                        });
                    }
                }
            }
        }

        for column in columns {
            let group = elements
                .iter_mut()
                .find(|group| group.property == column.property)
                .ok_or_else(|| {
                    BindingError::illegal_state(format!(
                        "table column \"{}\" in {} has no element annotation",
                        column.property,
                        class.type_name()
                    ))
                })?;
            if group.column.is_some() {
                return Err(BindingError::illegal_state(format!(
                    "property \"{}\" in {} has more than one table column",
                    column.property,
                    class.type_name()
                )));
            }
            group.column = Some(column);
        }

        elements.sort_by_key(PropertyElementDescriptors::position);
        if let Some(pair) = elements.windows(2).find(|pair| pair[0].position == pair[1].position) {
            return Err(BindingError::DuplicatePosition {
                pmo: class.type_name(),
                position: pair[0].position,
                first: pair[0].property.clone(),
                second: pair[1].property.clone(),
            });
        }

        tracing::trace!(
            target: targets::ANNOTATION,
            type_name = class.type_name(),
            elements = elements.len(),
            model_objects = model_objects.len(),
            "read ui annotations"
        );

        Ok(Self {
            class,
            elements,
            model_objects,
        })
    }

    /// The cached reader of `class`, scanning it on first request.
    ///
    /// Failed scans are not cached.
    pub fn for_class(class: &'static MetaClass) -> BindingResult<Arc<Self>> {
        static READERS: OnceLock<RwLock<HashMap<&'static str, Arc<UiAnnotationReader>>>> =
            OnceLock::new();
        let readers = READERS.get_or_init(|| RwLock::new(HashMap::new()));

        if let Some(reader) = readers.read().get(class.type_name()) {
            return Ok(reader.clone());
        }
        let reader = Arc::new(Self::new(class)?);
        Ok(readers
            .write()
            .entry(class.type_name())
            .or_insert(reader)
            .clone())
    }

    pub fn class(&self) -> &'static MetaClass {
        self.class
    }

    /// All bound properties, sorted by position.
    pub fn ui_elements(&self) -> &[PropertyElementDescriptors] {
        &self.elements
    }

    /// The annotations of `property`.
    pub fn find(&self, property: &str) -> Option<&PropertyElementDescriptors> {
        self.elements.iter().find(|group| group.property == property)
    }

    pub fn has_model_object(&self, name: &str) -> bool {
        self.model_objects.contains_key(name)
    }

    /// The declared model object names, sorted.
    pub fn model_object_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.model_objects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// A supplier calling the model object getter `name` of `pmo`.
    pub fn model_object_supplier(&self, pmo: &ObjectRef, name: &str) -> BindingResult<ObjectSupplier> {
        let call: GetterFn = match self.model_objects.get(name).map(|m| m.kind()) {
            Some(MethodKind::Getter { call, .. }) => call.clone(),
            _ => {
                return Err(BindingError::ModelObjectAnnotation {
                    pmo: self.class.type_name(),
                    message: format!("no model object \"{name}\" declared"),
                });
            }
        };
        let pmo = pmo.clone();
        Ok(Arc::new(move || -> BindingResult<Option<ObjectRef>> {
            let value = {
                let guard = pmo.read();
                call(&*guard)?
            };
            match value {
                Value::Object(object) => Ok(Some(object)),
                Value::Null => Ok(None),
                other => Err(BindingError::type_mismatch("ObjectRef", other.kind_name())),
            }
        }))
    }

    /// The model attributes of the properties bound to model object `name`
    /// that differ from the property name.
    pub fn model_attributes(&self, name: &str) -> HashMap<String, String> {
        self.elements
            .iter()
            .flat_map(|group| group.descriptors.iter())
            .filter(|d| d.model_object() == name && d.model_attribute() != d.property())
            .map(|d| (d.property().to_owned(), d.model_attribute().to_owned()))
            .collect()
    }
}

impl fmt::Debug for UiAnnotationReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiAnnotationReader")
            .field("type_name", &self.class.type_name())
            .field(
                "properties",
                &self.elements.iter().map(|g| g.property()).collect::<Vec<_>>(),
            )
            .field("model_objects", &self.model_object_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{ElementAnnotation, ModelObjectAnnotation};
    use crate::dispatcher::test_support::{Person, person_pmo};
    use crate::object::Bindable;

    macro_rules! pmo_type {
        ($name:ident, |$builder:ident| $body:expr) => {
            struct $name;

            impl Bindable for $name {
                fn meta_class(&self) -> &'static MetaClass {
                    static META: OnceLock<MetaClass> = OnceLock::new();
                    META.get_or_init(|| {
                        let $builder = MetaClass::builder::<$name>();
                        $body.build()
                    })
                }
            }
        };
    }

    pmo_type!(SharedPosition, |b| b
        .getter("get_first", |_: &SharedPosition| 1_i64)
        .annotate("get_first", ElementAnnotation::text_field(5))
        .getter("second", |_: &SharedPosition| 2_i64)
        .annotate("second", ElementAnnotation::text_field(5)));

    pmo_type!(SplitPosition, |b| b
        .getter("value", |_: &SplitPosition| 1_i64)
        .annotate("value", ElementAnnotation::text_field(1))
        .getter("is_value", |_: &SplitPosition| true)
        .annotate("is_value", ElementAnnotation::check_box(2)));

    pmo_type!(UnitModelObject, |b| b
        .action("model", |_: &mut UnitModelObject| {})
        .annotate("model", ModelObjectAnnotation::default()));

    pmo_type!(TwoModelObjects, |b| b
        .getter("a", |_: &TwoModelObjects| Value::Null)
        .annotate("a", ModelObjectAnnotation::new("m"))
        .getter("b", |_: &TwoModelObjects| Value::Null)
        .annotate("b", ModelObjectAnnotation::new("m")));

    pmo_type!(LonelyColumn, |b| b
        .getter("width", |_: &LonelyColumn| 1_i64)
        .annotate("width", TableColumnAnnotation::new()));

    pmo_type!(Switchable, |b| b
        .getter("value", |_: &Switchable| String::from("x"))
        .annotate("value", ElementAnnotation::text_field(1))
        .annotate("value", ElementAnnotation::label(1))
        .annotate("value", TableColumnAnnotation::new().with_width(80))
        .getter("value_component_type", |_: &Switchable| String::from("label")));

    fn class_of(object: impl Bindable) -> &'static MetaClass {
        object.meta_class()
    }

    #[test]
    fn test_property_names() {
        assert_eq!(derive_property_name("get_foo", false), "foo");
        assert_eq!(derive_property_name("is_foo", false), "foo");
        assert_eq!(derive_property_name("foo", true), "foo");
        assert_eq!(derive_property_name("get_foo", true), "get_foo");
        assert_eq!(derive_property_name("isolated", false), "isolated");
        assert_eq!(derive_property_name("is_", false), "is_");
    }

    #[test]
    fn test_duplicate_position_names_both_properties() {
        let err = UiAnnotationReader::new(class_of(SharedPosition)).unwrap_err();
        match err {
            BindingError::DuplicatePosition {
                position,
                first,
                second,
                ..
            } => {
                assert_eq!(position, 5);
                assert_eq!(first, "first");
                assert_eq!(second, "second");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(UiAnnotationReader::for_class(class_of(SharedPosition)).is_err());
    }

    #[test]
    fn test_elements_of_one_property_share_position() {
        let err = UiAnnotationReader::new(class_of(SplitPosition)).unwrap_err();
        assert!(matches!(err, BindingError::IllegalState(_)));
    }

    #[test]
    fn test_invalid_model_objects() {
        assert!(matches!(
            UiAnnotationReader::new(class_of(UnitModelObject)),
            Err(BindingError::ModelObjectAnnotation { .. })
        ));
        assert!(matches!(
            UiAnnotationReader::new(class_of(TwoModelObjects)),
            Err(BindingError::ModelObjectAnnotation { .. })
        ));
    }

    #[test]
    fn test_column_needs_element() {
        assert!(matches!(
            UiAnnotationReader::new(class_of(LonelyColumn)),
            Err(BindingError::IllegalState(_))
        ));
    }

    #[test]
    fn test_person_pmo_elements_sorted() {
        let (pmo, _) = person_pmo();
        let reader = UiAnnotationReader::for_class(pmo.meta_class()).unwrap();

        let properties: Vec<_> = reader.ui_elements().iter().map(|g| g.property()).collect();
        assert_eq!(properties, vec!["name", "title", "notes", "save", "first_name"]);
        assert!(reader.has_model_object("model_object"));
        assert!(!reader.has_model_object("other"));
        assert_eq!(
            reader.model_attributes("model_object"),
            HashMap::from([("first_name".to_owned(), "name".to_owned())])
        );

        let notes = reader.find("notes").unwrap();
        assert_eq!(notes.descriptors()[0].method(), "is_notes");
        assert!(Arc::ptr_eq(
            &reader,
            &UiAnnotationReader::for_class(pmo.meta_class()).unwrap()
        ));
    }

    #[test]
    fn test_model_object_supplier_reads_current_object() {
        let (pmo, person) = person_pmo();
        let reader = UiAnnotationReader::for_class(pmo.meta_class()).unwrap();
        let supplier = reader.model_object_supplier(&pmo, "model_object").unwrap();

        let object = supplier().unwrap().unwrap();
        assert!(object.ptr_eq(&ObjectRef::from_shared(person)));
        assert_eq!(object.with(|p: &Person| p.age), Some(36));
        assert!(reader.model_object_supplier(&pmo, "other").is_err());
    }

    #[test]
    fn test_component_type_selects_element() {
        let object = ObjectRef::new(Switchable);
        let reader = UiAnnotationReader::for_class(object.meta_class()).unwrap();
        let group = reader.find("value").unwrap();
        assert_eq!(group.descriptors().len(), 2);
        assert_eq!(group.table_column().unwrap().annotation().width, Some(80));

        let dispatcher = crate::dispatcher::PropertyDispatcherFactory::default_dispatcher_chain(
            &object,
            Arc::new(crate::behavior::NoBehaviorProvider),
        )
        .unwrap();
        assert_eq!(
            group.descriptor(dispatcher.as_ref()).unwrap().kind(),
            ElementKind::Label
        );
    }
}
