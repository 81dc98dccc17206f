//! Core systems for linkki.
//!
//! linkki binds UI components to presentation model objects (PMOs). A PMO
//! declares which of its properties are shown and how; linkki creates the
//! components, keeps them in sync with the PMO and writes user input back.
//!
//! - **Meta classes**: runtime method tables of bindable types ([`meta`])
//! - **Property accessors**: cached getter, setter and action lookup ([`accessor`])
//! - **Annotations**: the declared UI of a PMO ([`annotation`], [`reader`])
//! - **Dispatcher chain**: layered property resolution from behaviors over
//!   annotations and the PMO down to the model object ([`dispatcher`])
//! - **Aspects**: pull and push of single property facets ([`aspects`])
//! - **Bindings**: contexts that refresh all components after a change ([`binding`])
//!
//! # Example
//!
//! ```ignore
//! use linkki_core::{BindingConfig, BindingContext, ObjectRef, Value};
//! use linkki_macros::bindable;
//!
//! pub struct PersonPmo {
//!     name: String,
//! }
//!
//! #[bindable]
//! impl PersonPmo {
//!     #[ui_text_field(position = 10, label = "Name")]
//!     pub fn get_name(&self) -> String {
//!         self.name.clone()
//!     }
//!
//!     pub fn set_name(&mut self, name: String) {
//!         self.name = name;
//!     }
//! }
//!
//! let pmo = ObjectRef::new(PersonPmo { name: "Ada".into() });
//! let context = BindingContext::new("person", BindingConfig::default());
//! let components = context.create_ui(&pmo)?;
//! components[0].edit(Value::from("Grace"))?;
//! ```

pub mod accessor;
pub mod annotation;
pub mod aspects;
pub mod behavior;
pub mod binding;
pub mod component;
pub mod config;
pub mod dispatcher;
mod error;
pub mod logging;
pub mod message;
pub mod meta;
pub mod object;
pub mod reader;
pub mod value;

pub use accessor::{PropertyAccessor, PropertyAccessorCache, property_accessor};
pub use annotation::{
    Annotation, AvailableValuesType, DEFAULT_MODEL_OBJECT, ElementAnnotation, ElementKind,
    EnabledType, ModelObjectAnnotation, RequiredType, TableColumnAnnotation, VisibleType,
};
pub use aspects::{Aspect, AspectDefinition, CompositeAspectDefinition};
pub use behavior::{
    BehaviorList, NoBehaviorProvider, PropertyBehavior, PropertyBehaviorProvider, ReadOnlyBehavior,
};
pub use binding::{
    Binding, BindingContext, BindingId, BindingManager, ContainerBinding, ElementBinding,
    NoValidation, ValidationService,
};
pub use component::{
    Component, ComponentFactory, ComponentRef, HeadlessComponent, HeadlessComponentFactory,
    ListenerId,
};
pub use config::{AnnotationLabelResolver, BindingConfig, LabelResolver};
pub use dispatcher::{PropertyDispatcher, PropertyDispatcherFactory};
pub use error::{BindingError, BindingResult, Operation};
pub use logging::{BindingTreeDebug, TreeFormatOptions, TreeStyle};
pub use message::{Message, MessageList, ObjectProperty, Severity};
pub use meta::{MetaClass, MetaClassBuilder, MetaMethod, MethodKind};
pub use object::{Bindable, BindableType, ObjectRef};
pub use reader::{ElementDescriptor, PropertyElementDescriptors, UiAnnotationReader};
pub use value::{BindableEnum, EnumConstant, FromValue, IntoValue, Value, ValueKind, ValueType};

// Used by code generated by `#[bindable]`.
#[doc(hidden)]
pub use parking_lot::RwLock;

static_assertions::assert_impl_all!(ObjectRef: Send, Sync, Clone);
static_assertions::assert_impl_all!(ComponentRef: Send, Sync, Clone);
static_assertions::assert_impl_all!(Value: Send, Sync);
static_assertions::assert_impl_all!(BindingError: Send, Sync);
static_assertions::assert_impl_all!(BindingContext: Send, Sync);
static_assertions::assert_impl_all!(BindingManager: Send, Sync);
static_assertions::assert_impl_all!(PropertyAccessorCache: Send, Sync);
static_assertions::assert_impl_all!(UiAnnotationReader: Send, Sync);
