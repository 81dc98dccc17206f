//! Property behaviors restrict what bound properties allow.
//!
//! A [`PropertyBehavior`] can deny writing, visibility or the display of
//! validation messages for any (object, property) pair. Behaviors come from a
//! [`PropertyBehaviorProvider`] and are consulted by the outermost link of
//! every dispatcher chain.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::object::ObjectRef;

/// A restriction on bound properties.
///
/// `object` is the object the property is bound to, if one could be
/// determined.
pub trait PropertyBehavior: Send + Sync {
    fn is_writable(&self, _object: Option<&ObjectRef>, _property: &str) -> bool {
        true
    }

    fn is_visible(&self, _object: Option<&ObjectRef>, _property: &str) -> bool {
        true
    }

    fn is_show_validation_messages(&self, _object: Option<&ObjectRef>, _property: &str) -> bool {
        true
    }
}

/// Supplies the behaviors of a binding context.
pub trait PropertyBehaviorProvider: Send + Sync {
    fn behaviors(&self) -> Vec<Arc<dyn PropertyBehavior>>;
}

/// A provider without behaviors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBehaviorProvider;

impl PropertyBehaviorProvider for NoBehaviorProvider {
    fn behaviors(&self) -> Vec<Arc<dyn PropertyBehavior>> {
        Vec::new()
    }
}

/// A provider returning a fixed list of behaviors.
#[derive(Clone, Default)]
pub struct BehaviorList {
    behaviors: Vec<Arc<dyn PropertyBehavior>>,
}

impl BehaviorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, behavior: impl PropertyBehavior + 'static) -> Self {
        self.behaviors.push(Arc::new(behavior));
        self
    }

    pub fn with_shared(mut self, behavior: Arc<dyn PropertyBehavior>) -> Self {
        self.behaviors.push(behavior);
        self
    }
}

impl PropertyBehaviorProvider for BehaviorList {
    fn behaviors(&self) -> Vec<Arc<dyn PropertyBehavior>> {
        self.behaviors.clone()
    }
}

impl fmt::Debug for BehaviorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorList")
            .field("behaviors", &self.behaviors.len())
            .finish()
    }
}

/// Makes every property read-only while switched on.
#[derive(Debug, Default)]
pub struct ReadOnlyBehavior {
    read_only: AtomicBool,
}

impl ReadOnlyBehavior {
    pub fn new(read_only: bool) -> Self {
        Self {
            read_only: AtomicBool::new(read_only),
        }
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::Relaxed);
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::Relaxed)
    }
}

impl PropertyBehavior for ReadOnlyBehavior {
    fn is_writable(&self, _object: Option<&ObjectRef>, _property: &str) -> bool {
        !self.is_read_only()
    }
}
