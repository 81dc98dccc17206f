//! linkki - presentation model data binding.
//!
//! This is the umbrella crate that re-exports the public APIs of
//! `linkki-core` and the `#[bindable]` macros.
//!
//! # Example
//!
//! ```
//! use linkki::prelude::*;
//!
//! pub struct GreetingPmo {
//!     name: String,
//! }
//!
//! #[bindable]
//! impl GreetingPmo {
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
//! fn main() -> Result<(), BindingError> {
//!     let pmo = ObjectRef::new(GreetingPmo { name: "Ada".into() });
//!     let context = BindingContext::new("greeting", BindingConfig::default());
//!     let components = context.create_ui(&pmo)?;
//!     components[0].edit(Value::from("Grace"))?;
//!     assert_eq!(pmo.with(|p: &GreetingPmo| p.name.clone()).as_deref(), Some("Grace"));
//!     Ok(())
//! }
//! ```

pub use linkki_core::*;
pub use linkki_macros::*;

// Path of the generated code when only this crate is a dependency.
#[doc(hidden)]
pub use linkki_core as __core;

/// The types needed to declare PMOs and bind them.
pub mod prelude {
    pub use linkki_core::{
        BindableEnum, BindingConfig, BindingContext, BindingError, BindingManager, BindingResult,
        ComponentRef, Message, MessageList, ObjectRef, Value,
    };
    pub use linkki_macros::{BindableEnum, bindable};
}
