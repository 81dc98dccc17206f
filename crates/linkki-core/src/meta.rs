//! Runtime method tables for bindable types.
//!
//! A [`MetaClass`] lists the getters, setters and actions of a type as
//! type-erased closures, together with the annotations attached to them.
//! The `#[bindable]` attribute macro generates one per `impl` block; it can
//! also be assembled by hand with [`MetaClass::builder`].
//!
//! # Example
//!
//! ```
//! use std::sync::OnceLock;
//! use linkki_core::meta::MetaClass;
//! use linkki_core::object::{Bindable, ObjectRef};
//! use linkki_core::annotation::ElementAnnotation;
//!
//! struct Person {
//!     name: String,
//! }
//!
//! impl Bindable for Person {
//!     fn meta_class(&self) -> &'static MetaClass {
//!         static META: OnceLock<MetaClass> = OnceLock::new();
//!         META.get_or_init(|| {
//!             MetaClass::builder::<Person>()
//!                 .getter("name", |p: &Person| p.name.clone())
//!                 .setter("set_name", |p: &mut Person, name: String| p.name = name)
//!                 .annotate("name", ElementAnnotation::text_field(1))
//!                 .build()
//!         })
//!     }
//! }
//!
//! let person = ObjectRef::new(Person { name: "Ada".into() });
//! let meta = person.meta_class();
//! assert!(meta.getter("name").is_some());
//! assert!(meta.setter("set_name").is_some());
//! assert_eq!(meta.annotations().count(), 1);
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::annotation::Annotation;
use crate::error::{BindingError, BindingResult};
use crate::logging::targets;
use crate::object::Bindable;
use crate::value::{FromValue, IntoValue, Value, ValueType};

/// A type-erased getter.
pub type GetterFn = Arc<dyn Fn(&dyn Bindable) -> BindingResult<Value> + Send + Sync>;

/// A type-erased setter.
pub type SetterFn = Arc<dyn Fn(&mut dyn Bindable, Value) -> BindingResult<()> + Send + Sync>;

/// A type-erased action.
pub type ActionFn = Arc<dyn Fn(&mut dyn Bindable) -> BindingResult<()> + Send + Sync>;

/// The shape and implementation of a method.
#[derive(Clone)]
pub enum MethodKind {
    /// Takes no arguments and returns a value.
    Getter {
        /// The declared return type.
        value_type: ValueType,
        call: GetterFn,
    },
    /// Takes one argument and returns nothing.
    Setter { call: SetterFn },
    /// Takes no arguments and returns nothing.
    Action { call: ActionFn },
}

/// A method of a bindable type.
#[derive(Clone)]
pub struct MetaMethod {
    name: &'static str,
    kind: MethodKind,
}

impl MetaMethod {
    /// The method name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The shape and implementation.
    pub fn kind(&self) -> &MethodKind {
        &self.kind
    }

    /// Whether the method returns nothing (setters and actions).
    pub fn returns_unit(&self) -> bool {
        !matches!(self.kind, MethodKind::Getter { .. })
    }

    /// The declared return type of a getter.
    pub fn value_type(&self) -> Option<ValueType> {
        match &self.kind {
            MethodKind::Getter { value_type, .. } => Some(*value_type),
            _ => None,
        }
    }
}

impl fmt::Debug for MetaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            MethodKind::Getter { .. } => "getter",
            MethodKind::Setter { .. } => "setter",
            MethodKind::Action { .. } => "action",
        };
        f.debug_struct("MetaMethod")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

/// An annotation attached to a method.
#[derive(Debug, Clone)]
pub struct MethodAnnotation {
    /// The annotated method.
    pub method: &'static str,
    pub annotation: Annotation,
}

/// The method table of a bindable type.
pub struct MetaClass {
    type_name: &'static str,
    type_id: TypeId,
    methods: Vec<MetaMethod>,
    annotations: Vec<MethodAnnotation>,
}

impl MetaClass {
    /// Start building the meta class of `T`.
    pub fn builder<T: Bindable>() -> MetaClassBuilder<T> {
        MetaClassBuilder {
            methods: Vec::new(),
            annotations: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// The full type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The type name without its module path.
    pub fn simple_name(&self) -> &'static str {
        self.type_name
            .rsplit("::")
            .next()
            .unwrap_or(self.type_name)
    }

    /// The type id.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// All methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MetaMethod> {
        self.methods.iter()
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MetaMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Look up a getter by name.
    pub fn getter(&self, name: &str) -> Option<&MetaMethod> {
        self.method(name)
            .filter(|m| matches!(m.kind, MethodKind::Getter { .. }))
    }

    /// Look up a setter by name.
    pub fn setter(&self, name: &str) -> Option<&MetaMethod> {
        self.method(name)
            .filter(|m| matches!(m.kind, MethodKind::Setter { .. }))
    }

    /// Look up an action by name.
    pub fn action(&self, name: &str) -> Option<&MetaMethod> {
        self.method(name)
            .filter(|m| matches!(m.kind, MethodKind::Action { .. }))
    }

    /// All method annotations in declaration order.
    pub fn annotations(&self) -> impl Iterator<Item = &MethodAnnotation> {
        self.annotations.iter()
    }

    /// The annotations of one method.
    pub fn annotations_of<'a>(&'a self, method: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.annotations
            .iter()
            .filter(move |a| a.method == method)
            .map(|a| &a.annotation)
    }
}

impl fmt::Debug for MetaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaClass")
            .field("type_name", &self.type_name)
            .field("methods", &self.methods)
            .field("annotations", &self.annotations.len())
            .finish()
    }
}

/// Builder for a [`MetaClass`].
pub struct MetaClassBuilder<T> {
    methods: Vec<MetaMethod>,
    annotations: Vec<MethodAnnotation>,
    _marker: PhantomData<fn() -> T>,
}

fn downcast_ref<T: Bindable>(target: &dyn Bindable) -> BindingResult<&T> {
    let found = target.meta_class().type_name();
    let any: &dyn Any = target;
    any.downcast_ref::<T>()
        .ok_or_else(|| BindingError::type_mismatch(std::any::type_name::<T>(), found))
}

fn downcast_mut<T: Bindable>(target: &mut dyn Bindable) -> BindingResult<&mut T> {
    let found = target.meta_class().type_name();
    let any: &mut dyn Any = target;
    any.downcast_mut::<T>()
        .ok_or_else(|| BindingError::type_mismatch(std::any::type_name::<T>(), found))
}

impl<T: Bindable> MetaClassBuilder<T> {
    fn push(mut self, name: &'static str, kind: MethodKind) -> Self {
        self.methods.push(MetaMethod { name, kind });
        self
    }

    /// Register a getter.
    pub fn getter<R, F>(self, name: &'static str, f: F) -> Self
    where
        R: IntoValue,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        let call: GetterFn = Arc::new(move |target: &dyn Bindable| {
            Ok(f(downcast_ref::<T>(target)?).into_value())
        });
        self.push(
            name,
            MethodKind::Getter {
                value_type: R::value_type(),
                call,
            },
        )
    }

    /// Register a fallible getter. Errors are wrapped into
    /// [`BindingError::Invocation`].
    pub fn try_getter<R, E, F>(self, name: &'static str, f: F) -> Self
    where
        R: IntoValue,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: Fn(&T) -> Result<R, E> + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let call: GetterFn = Arc::new(move |target: &dyn Bindable| {
            f(downcast_ref::<T>(target)?)
                .map(IntoValue::into_value)
                .map_err(|e| BindingError::invocation(type_name, name, e))
        });
        self.push(
            name,
            MethodKind::Getter {
                value_type: R::value_type(),
                call,
            },
        )
    }

    /// Register a setter.
    pub fn setter<A, F>(self, name: &'static str, f: F) -> Self
    where
        A: FromValue,
        F: Fn(&mut T, A) + Send + Sync + 'static,
    {
        let call: SetterFn = Arc::new(move |target: &mut dyn Bindable, value: Value| {
            let this = downcast_mut::<T>(target)?;
            f(this, A::from_value(value)?);
            Ok(())
        });
        self.push(name, MethodKind::Setter { call })
    }

    /// Register a fallible setter.
    pub fn try_setter<A, E, F>(self, name: &'static str, f: F) -> Self
    where
        A: FromValue,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: Fn(&mut T, A) -> Result<(), E> + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let call: SetterFn = Arc::new(move |target: &mut dyn Bindable, value: Value| {
            let this = downcast_mut::<T>(target)?;
            f(this, A::from_value(value)?).map_err(|e| BindingError::invocation(type_name, name, e))
        });
        self.push(name, MethodKind::Setter { call })
    }

    /// Register an action.
    pub fn action<F>(self, name: &'static str, f: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        let call: ActionFn = Arc::new(move |target: &mut dyn Bindable| {
            f(downcast_mut::<T>(target)?);
            Ok(())
        });
        self.push(name, MethodKind::Action { call })
    }

    /// Register a fallible action.
    pub fn try_action<E, F>(self, name: &'static str, f: F) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: Fn(&mut T) -> Result<(), E> + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let call: ActionFn = Arc::new(move |target: &mut dyn Bindable| {
            f(downcast_mut::<T>(target)?).map_err(|e| BindingError::invocation(type_name, name, e))
        });
        self.push(name, MethodKind::Action { call })
    }

    /// Attach an annotation to a method.
    pub fn annotate(mut self, method: &'static str, annotation: impl Into<Annotation>) -> Self {
        self.annotations.push(MethodAnnotation {
            method,
            annotation: annotation.into(),
        });
        self
    }

    /// Finish the meta class.
    pub fn build(self) -> MetaClass {
        tracing::trace!(
            target: targets::ACCESSOR,
            type_name = std::any::type_name::<T>(),
            methods = self.methods.len(),
            annotations = self.annotations.len(),
            "built meta class"
        );
        MetaClass {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            methods: self.methods,
            annotations: self.annotations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectRef;
    use crate::value::ValueKind;
    use std::sync::OnceLock;

    struct Account {
        balance: i64,
    }

    impl Bindable for Account {
        fn meta_class(&self) -> &'static MetaClass {
            static META: OnceLock<MetaClass> = OnceLock::new();
            META.get_or_init(|| {
                MetaClass::builder::<Account>()
                    .getter("balance", |a: &Account| a.balance)
                    .try_setter("set_balance", |a: &mut Account, balance: i64| {
                        if balance < 0 {
                            return Err("balance must not be negative");
                        }
                        a.balance = balance;
                        Ok(())
                    })
                    .action("reset", |a: &mut Account| a.balance = 0)
                    .build()
            })
        }
    }

    fn call_getter(object: &ObjectRef, name: &str) -> BindingResult<Value> {
        let meta = object.meta_class();
        match meta.getter(name).map(MetaMethod::kind) {
            Some(MethodKind::Getter { call, .. }) => call(&*object.read()),
            _ => panic!("no getter {name}"),
        }
    }

    fn call_setter(object: &ObjectRef, name: &str, value: Value) -> BindingResult<()> {
        let meta = object.meta_class();
        match meta.setter(name).map(MetaMethod::kind) {
            Some(MethodKind::Setter { call }) => call(&mut *object.write(), value),
            _ => panic!("no setter {name}"),
        }
    }

    #[test]
    fn test_method_shapes() {
        let object = ObjectRef::new(Account { balance: 5 });
        let meta = object.meta_class();

        assert!(meta.getter("balance").is_some());
        assert!(meta.setter("balance").is_none());
        assert!(meta.action("reset").unwrap().returns_unit());
        assert_eq!(
            meta.getter("balance").unwrap().value_type().unwrap().kind,
            ValueKind::Int
        );
        assert!(meta.type_name().ends_with("Account"));
        assert_eq!(meta.simple_name(), "Account");
    }

    #[test]
    fn test_getter_and_setter() {
        let object = ObjectRef::new(Account { balance: 5 });
        assert_eq!(call_getter(&object, "balance").unwrap(), Value::Int(5));

        call_setter(&object, "set_balance", Value::Int(9)).unwrap();
        assert_eq!(call_getter(&object, "balance").unwrap(), Value::Int(9));
    }

    #[test]
    fn test_failing_setter_is_wrapped() {
        let object = ObjectRef::new(Account { balance: 5 });
        let err = call_setter(&object, "set_balance", Value::Int(-1)).unwrap_err();
        assert!(matches!(
            err,
            BindingError::Invocation {
                method: "set_balance",
                ..
            }
        ));
        assert_eq!(call_getter(&object, "balance").unwrap(), Value::Int(5));
    }

    #[test]
    fn test_setter_rejects_wrong_value() {
        let object = ObjectRef::new(Account { balance: 5 });
        let err = call_setter(&object, "set_balance", Value::Text("x".into())).unwrap_err();
        assert!(matches!(err, BindingError::TypeMismatch { .. }));
    }
}
