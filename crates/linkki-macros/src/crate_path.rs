//! Path of `linkki-core` in generated code.
//!
//! Users may depend on `linkki-core` directly or only on the `linkki` facade,
//! possibly renamed in either case.

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Ident;

/// The path under which the calling crate reaches `linkki-core`.
pub(crate) fn core_path() -> TokenStream {
    resolve(crate_name("linkki-core").ok(), crate_name("linkki").ok())
}

/// Strategy:
///
/// 1. `linkki-core` is a dependency: `::<name>`
/// 2. `linkki` is a dependency: `::<name>::__core`
/// 3. Inside `linkki` itself, for its tests and doctests: `::linkki::__core`
/// 4. Fallback, including the tests of `linkki-core`: `::linkki_core`
fn resolve(core: Option<FoundCrate>, facade: Option<FoundCrate>) -> TokenStream {
    match (core, facade) {
        (Some(FoundCrate::Name(name)), _) => {
            let name = Ident::new(&name, Span::call_site());
            quote!(::#name)
        }
        (_, Some(FoundCrate::Name(name))) => {
            let name = Ident::new(&name, Span::call_site());
            quote!(::#name::__core)
        }
        (_, Some(FoundCrate::Itself)) => quote!(::linkki::__core),
        _ => quote!(::linkki_core),
    }
}
