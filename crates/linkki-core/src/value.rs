//! Dynamic values exchanged between components and bound objects.
//!
//! Bound methods are type-erased behind [`Value`]. Getters convert their
//! result with [`IntoValue`], setters convert their argument back with
//! [`FromValue`]. [`ValueType`] describes what a getter declares to return,
//! which is what the available-values aspect uses to enumerate enum and
//! boolean constants.
//!
//! # Example
//!
//! ```
//! use linkki_core::value::{FromValue, IntoValue, Value, ValueKind};
//!
//! let value = Some(42_i32).into_value();
//! assert_eq!(value, Value::Int(42));
//! assert!(<Option<i32> as IntoValue>::value_type().nullable);
//! assert_eq!(<i32 as IntoValue>::value_type().kind, ValueKind::Int);
//!
//! let back: Option<i32> = FromValue::from_value(Value::Null).unwrap();
//! assert_eq!(back, None);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{BindingError, BindingResult};
use crate::message::MessageList;
use crate::object::{Bindable, ObjectRef};

/// One declared constant of a bindable enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumConstant {
    /// The name of the enum type.
    pub type_name: &'static str,
    /// The variant name.
    pub name: &'static str,
    /// Position in declaration order.
    pub ordinal: usize,
}

impl fmt::Display for EnumConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type-erased property value.
#[derive(Clone, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Enum(EnumConstant),
    List(Vec<Value>),
    Messages(MessageList),
    /// A bindable object, such as a model object.
    Object(ObjectRef),
}

impl Value {
    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// A short name of the variant, used in type mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::Text(_) => "Text",
            Self::Enum(_) => "Enum",
            Self::List(_) => "List",
            Self::Messages(_) => "Messages",
            Self::Object(_) => "Object",
        }
    }

    /// Interpret the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret the value as text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Interpret the value as an object reference.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Messages(a), Self::Messages(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(i) => write!(f, "Int({i})"),
            Self::Float(x) => write!(f, "Float({x})"),
            Self::Text(s) => write!(f, "Text({s:?})"),
            Self::Enum(c) => write!(f, "Enum({}::{})", c.type_name, c.name),
            Self::List(values) => f.debug_tuple("List").field(values).finish(),
            Self::Messages(messages) => write!(f, "Messages({} entries)", messages.len()),
            Self::Object(object) => write!(f, "Object({object:?})"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Enum(c) => f.write_str(c.name),
            Self::List(values) => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
            Self::Messages(messages) => write!(f, "{} messages", messages.len()),
            Self::Object(object) => f.write_str(object.type_name()),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    value.into_value()
                }
            }
        )*
    };
}

impl_from_for_value!(bool, i32, i64, f64, String, &'static str, ObjectRef, MessageList);

impl From<EnumConstant> for Value {
    fn from(constant: EnumConstant) -> Self {
        Self::Enum(constant)
    }
}

/// The shape of a declared value type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    /// An enum with its declared constants.
    Enum(&'static [EnumConstant]),
    List,
    Messages,
    Object,
    /// Anything, used for getters returning [`Value`] directly.
    Any,
}

/// The declared type of a getter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueType {
    /// The Rust type name.
    pub type_name: &'static str,
    /// The shape of the type.
    pub kind: ValueKind,
    /// Whether the type admits `Null` (an `Option`).
    pub nullable: bool,
}

impl ValueType {
    /// Create a non-nullable value type.
    pub const fn new(type_name: &'static str, kind: ValueKind) -> Self {
        Self {
            type_name,
            kind,
            nullable: false,
        }
    }

    /// The value type of a bindable enum.
    pub fn enumeration<E: BindableEnum>() -> Self {
        Self::new(std::any::type_name::<E>(), ValueKind::Enum(E::CONSTANTS))
    }

    /// The same type, admitting `Null`.
    pub const fn into_nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// The declared constants if this is an enum type.
    pub fn enum_constants(&self) -> Option<&'static [EnumConstant]> {
        match self.kind {
            ValueKind::Enum(constants) => Some(constants),
            _ => None,
        }
    }
}

/// Conversion of a getter result into a [`Value`].
pub trait IntoValue {
    /// The declared type, reported by `PropertyDispatcher::value_type`.
    fn value_type() -> ValueType
    where
        Self: Sized;

    /// Convert into a dynamic value.
    fn into_value(self) -> Value;
}

/// Conversion of a [`Value`] into a setter argument.
pub trait FromValue: Sized {
    /// Convert from a dynamic value, failing with
    /// [`BindingError::TypeMismatch`] if the value has the wrong shape.
    fn from_value(value: Value) -> BindingResult<Self>;
}

/// An enum whose constants can be offered as available values.
///
/// Usually implemented through `#[derive(BindableEnum)]`.
pub trait BindableEnum: Sized + 'static {
    /// All constants in declaration order.
    const CONSTANTS: &'static [EnumConstant];

    /// The constant of this variant.
    fn to_constant(&self) -> EnumConstant;

    /// The variant of a constant, if it belongs to this enum.
    fn from_constant(constant: &EnumConstant) -> Option<Self>;
}

/// Convert a value into a bindable enum. Used by `#[derive(BindableEnum)]`.
pub fn enum_from_value<E: BindableEnum>(value: Value) -> BindingResult<E> {
    match value {
        Value::Enum(constant) => E::from_constant(&constant).ok_or_else(|| {
            BindingError::type_mismatch(
                std::any::type_name::<E>(),
                format!("{}::{}", constant.type_name, constant.name),
            )
        }),
        other => Err(BindingError::type_mismatch(
            std::any::type_name::<E>(),
            other.kind_name(),
        )),
    }
}

impl IntoValue for Value {
    fn value_type() -> ValueType {
        ValueType::new("Value", ValueKind::Any).into_nullable()
    }

    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> BindingResult<Self> {
        Ok(value)
    }
}

impl IntoValue for bool {
    fn value_type() -> ValueType {
        ValueType::new("bool", ValueKind::Bool)
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> BindingResult<Self> {
        value
            .as_bool()
            .ok_or_else(|| BindingError::type_mismatch("bool", value.kind_name()))
    }
}

macro_rules! impl_integer_value {
    ($($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::new(stringify!($ty), ValueKind::Int)
                }

                fn into_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> BindingResult<Self> {
                    int_from_value(value, stringify!($ty))
                }
            }
        )*
    };
}

impl_integer_value!(i8, i16, i32, i64, u8, u16, u32);

fn int_from_value<T: TryFrom<i64>>(value: Value, type_name: &'static str) -> BindingResult<T> {
    match value {
        Value::Int(i) => T::try_from(i)
            .map_err(|_| BindingError::type_mismatch(type_name, format!("Int({i})"))),
        other => Err(BindingError::type_mismatch(type_name, other.kind_name())),
    }
}

/// Values above `i64::MAX` saturate to `i64::MAX`.
impl IntoValue for usize {
    fn value_type() -> ValueType {
        ValueType::new("usize", ValueKind::Int)
    }

    fn into_value(self) -> Value {
        Value::Int(i64::try_from(self).unwrap_or(i64::MAX))
    }
}

impl FromValue for usize {
    fn from_value(value: Value) -> BindingResult<Self> {
        int_from_value(value, "usize")
    }
}

impl IntoValue for f64 {
    fn value_type() -> ValueType {
        ValueType::new("f64", ValueKind::Float)
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> BindingResult<Self> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(i) => Ok(i as f64),
            other => Err(BindingError::type_mismatch("f64", other.kind_name())),
        }
    }
}

impl IntoValue for f32 {
    fn value_type() -> ValueType {
        ValueType::new("f32", ValueKind::Float)
    }

    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

/// Narrowing rounds to the nearest `f32`. Finite values outside the `f32`
/// range are rejected.
impl FromValue for f32 {
    fn from_value(value: Value) -> BindingResult<Self> {
        let x = f64::from_value(value)?;
        let narrowed = x as f32;
        if x.is_finite() && narrowed.is_infinite() {
            return Err(BindingError::type_mismatch("f32", format!("Float({x})")));
        }
        Ok(narrowed)
    }
}

impl IntoValue for String {
    fn value_type() -> ValueType {
        ValueType::new("String", ValueKind::Text)
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &'static str {
    fn value_type() -> ValueType {
        ValueType::new("&str", ValueKind::Text)
    }

    fn into_value(self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> BindingResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(BindingError::type_mismatch("String", other.kind_name())),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn value_type() -> ValueType {
        T::value_type().into_nullable()
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> BindingResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::new(std::any::type_name::<Self>(), ValueKind::List)
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> BindingResult<Self> {
        match value {
            Value::List(values) => values.into_iter().map(T::from_value).collect(),
            other => Err(BindingError::type_mismatch("Vec", other.kind_name())),
        }
    }
}

impl IntoValue for MessageList {
    fn value_type() -> ValueType {
        ValueType::new("MessageList", ValueKind::Messages)
    }

    fn into_value(self) -> Value {
        Value::Messages(self)
    }
}

impl FromValue for MessageList {
    fn from_value(value: Value) -> BindingResult<Self> {
        match value {
            Value::Messages(messages) => Ok(messages),
            Value::Null => Ok(MessageList::new()),
            other => Err(BindingError::type_mismatch("MessageList", other.kind_name())),
        }
    }
}

impl IntoValue for ObjectRef {
    fn value_type() -> ValueType {
        ValueType::new("ObjectRef", ValueKind::Object)
    }

    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: Value) -> BindingResult<Self> {
        match value {
            Value::Object(object) => Ok(object),
            other => Err(BindingError::type_mismatch("ObjectRef", other.kind_name())),
        }
    }
}

impl<T: Bindable> IntoValue for Arc<RwLock<T>> {
    fn value_type() -> ValueType {
        ValueType::new(std::any::type_name::<T>(), ValueKind::Object)
    }

    fn into_value(self) -> Value {
        Value::Object(ObjectRef::from_shared(self))
    }
}
