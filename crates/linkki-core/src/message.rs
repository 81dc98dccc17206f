//! Validation messages.
//!
//! A [`Message`] marks one or more object properties as invalid. Bindings
//! receive the complete [`MessageList`] of a validation run and pick the
//! messages that reference their own (object, property) pairs.

use std::fmt;

use crate::object::ObjectRef;

/// The severity of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A property of a specific object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    pub object: ObjectRef,
    pub property: String,
}

impl ObjectProperty {
    /// Create a new object property.
    pub fn new(object: ObjectRef, property: impl Into<String>) -> Self {
        Self {
            object,
            property: property.into(),
        }
    }
}

/// A validation message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    text: String,
    severity: Severity,
    code: Option<String>,
    invalid_properties: Vec<ObjectProperty>,
}

impl Message {
    /// Create a message without invalid properties.
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity,
            code: None,
            invalid_properties: Vec::new(),
        }
    }

    /// Create an error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }

    /// Create a warning message.
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, text)
    }

    /// Create an info message.
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    /// Set a machine-readable code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Mark a property of an object as invalid.
    pub fn with_invalid_property(mut self, object: &ObjectRef, property: impl Into<String>) -> Self {
        self.invalid_properties
            .push(ObjectProperty::new(object.clone(), property));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn invalid_properties(&self) -> &[ObjectProperty] {
        &self.invalid_properties
    }

    /// Whether this message marks `property` of `object` as invalid.
    pub fn references(&self, object: &ObjectRef, property: &str) -> bool {
        self.invalid_properties
            .iter()
            .any(|p| p.object.ptr_eq(object) && p.property == property)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.text)
    }
}

/// An ordered list of messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageList {
    messages: Vec<Message>,
}

impl MessageList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append all messages of `other`.
    pub fn extend(&mut self, other: MessageList) {
        self.messages.extend(other.messages);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// The highest severity in the list.
    pub fn severity(&self) -> Option<Severity> {
        self.messages.iter().map(Message::severity).max()
    }

    /// The first message with the highest severity.
    pub fn first_with_max_severity(&self) -> Option<&Message> {
        let severity = self.severity()?;
        self.messages.iter().find(|m| m.severity == severity)
    }

    /// The messages referencing `property` of `object`, in list order.
    pub fn for_object_property(&self, object: &ObjectRef, property: &str) -> MessageList {
        self.messages
            .iter()
            .filter(|m| m.references(object, property))
            .cloned()
            .collect()
    }
}

impl FromIterator<Message> for MessageList {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MessageList {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageList {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MetaClass;
    use crate::object::Bindable;
    use std::sync::OnceLock;

    struct Address;

    impl Bindable for Address {
        fn meta_class(&self) -> &'static MetaClass {
            static META: OnceLock<MetaClass> = OnceLock::new();
            META.get_or_init(|| MetaClass::builder::<Address>().build())
        }
    }

    #[test]
    fn test_filter_by_object_property() {
        let home = ObjectRef::new(Address);
        let work = ObjectRef::new(Address);

        let list: MessageList = [
            Message::error("street missing").with_invalid_property(&home, "street"),
            Message::warning("zip unusual").with_invalid_property(&home, "zip"),
            Message::error("street missing").with_invalid_property(&work, "street"),
            Message::info("unrelated"),
        ]
        .into_iter()
        .collect();

        let filtered = list.for_object_property(&home, "street");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.iter().next().unwrap().text(), "street missing");
        assert!(list.for_object_property(&work, "zip").is_empty());
    }

    #[test]
    fn test_severity() {
        let mut list = MessageList::new();
        assert_eq!(list.severity(), None);

        list.add(Message::info("a"));
        list.add(Message::error("b").with_code("E1"));
        list.add(Message::warning("c"));
        assert_eq!(list.severity(), Some(Severity::Error));
        assert_eq!(list.first_with_max_severity().unwrap().code(), Some("E1"));
        assert_eq!(list.first_with_max_severity().unwrap().to_string(), "[error] b");
    }
}
