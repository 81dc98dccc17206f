//! Procedural macros for the linkki meta-class system.
//!
//! This crate provides the `#[bindable]` attribute for `impl` blocks and the
//! `#[derive(BindableEnum)]` macro.
//!
//! # `#[bindable]`
//!
//! Registers the methods of an `impl` block in a static `MetaClass` and
//! implements `Bindable` and `BindableType` for the type. Methods are
//! registered by shape:
//!
//! - `fn foo(&self) -> T` is a getter
//! - `fn foo(&self)` or `fn foo(&mut self)` is an action
//! - `fn set_foo(&mut self, value: T)` is a setter
//!
//! Getters, setters and actions may return `Result`; errors are wrapped into
//! `BindingError::Invocation`. Associated functions and methods of any other
//! shape are left out.
//!
//! Methods are annotated with:
//!
//! ```ignore
//! #[bindable]
//! impl PersonPmo {
//!     #[model_object]
//!     pub fn person(&self) -> Arc<RwLock<Person>> {
//!         self.person.clone()
//!     }
//!
//!     #[ui_text_field(position = 10, label = "Name", enabled = Dynamic)]
//!     pub fn name(&self) {}
//!
//!     pub fn name_enabled(&self) -> bool {
//!         self.editable
//!     }
//!
//!     #[ui_combo_box(position = 20, available_values = EnumValuesExclNull)]
//!     #[ui_table_column(width = 120)]
//!     pub fn title(&self) {}
//!
//!     #[ui_button(position = 30, label = "Save")]
//!     pub fn save(&mut self) {
//!         self.saved = true;
//!     }
//! }
//! ```
//!
//! Element attributes: `ui_text_field`, `ui_check_box`, `ui_combo_box`,
//! `ui_button`, `ui_label` and `ui_element(kind = "...")` for custom
//! components. They take:
//! - `position = <int>` (required)
//! - `label = "..."`
//! - `enabled = Enabled | Disabled | Dynamic`
//! - `visible = Visible | Invisible | Dynamic`
//! - `required = NotRequired | Required | RequiredIfEnabled | Dynamic`
//! - `available_values = EnumValuesInclNull | EnumValuesExclNull | NoValues | Dynamic`
//! - `model_object = "..."`, `model_attribute = "..."`
//!
//! `ui_table_column` takes `width`, `expand_ratio`, `collapsible` and
//! `collapsed`. `model_object` takes an optional name, as in
//! `#[model_object("address")]` or `#[model_object(name = "address")]`.

mod crate_path;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl,
    LitStr, Meta, ReturnType, Type, parse_macro_input,
};

const ELEMENT_ATTRIBUTES: &[(&str, &str)] = &[
    ("ui_text_field", "text_field"),
    ("ui_check_box", "check_box"),
    ("ui_combo_box", "combo_box"),
    ("ui_button", "button"),
    ("ui_label", "label"),
    ("ui_element", "custom"),
];

const TABLE_COLUMN: &str = "ui_table_column";
const MODEL_OBJECT: &str = "model_object";

/// Register the methods of an `impl` block and implement `Bindable`.
///
/// See the [crate documentation](crate) for the recognized method shapes and
/// annotations.
#[proc_macro_attribute]
pub fn bindable(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    if !args.is_empty() {
        return syn::Error::new_spanned(args, "#[bindable] takes no arguments")
            .to_compile_error()
            .into();
    }
    let mut item = parse_macro_input!(input as ItemImpl);

    match impl_bindable(&mut item, &crate_path::core_path()) {
        Ok(tokens) => tokens.into(),
        Err(err) => {
            let err = err.to_compile_error();
            quote!(#item #err).into()
        }
    }
}

/// The shape of a registered method.
enum MethodShape {
    Getter { fallible: bool },
    Setter { fallible: bool, arg: Type },
    Action { fallible: bool },
}

/// A registered method with its annotations.
struct MethodInfo {
    name: Ident,
    shape: MethodShape,
    annotations: Vec<TokenStream2>,
}

/// Collect the errors of all methods so every annotation is stripped from
/// the re-emitted item.
fn push_error(errors: &mut Option<syn::Error>, error: syn::Error) {
    match errors {
        Some(errors) => errors.combine(error),
        None => *errors = Some(error),
    }
}

fn impl_bindable(item: &mut ItemImpl, core: &TokenStream2) -> syn::Result<TokenStream2> {
    if item.trait_.is_some() {
        return Err(syn::Error::new_spanned(
            &item.self_ty,
            "#[bindable] must be placed on an inherent impl block",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[bindable] does not support generic types",
        ));
    }

    let mut methods = Vec::new();
    let mut errors = None;
    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let annotations = match take_annotations(&mut method.attrs, core) {
            Ok(annotations) => annotations,
            Err(err) => {
                push_error(&mut errors, err);
                continue;
            }
        };

        match method_shape(method) {
            Some(shape) => {
                let is_model_object = annotations.iter().any(|a| a.is_model_object);
                if is_model_object && !matches!(shape, MethodShape::Getter { .. }) {
                    push_error(
                        &mut errors,
                        syn::Error::new_spanned(
                            &method.sig,
                            "#[model_object] must be placed on a getter returning the model object",
                        ),
                    );
                    continue;
                }
                if let (MethodShape::Setter { .. }, Some(_)) = (&shape, annotations.first()) {
                    push_error(
                        &mut errors,
                        syn::Error::new_spanned(
                            &method.sig,
                            "setters cannot carry UI annotations; annotate the getter or an action instead",
                        ),
                    );
                    continue;
                }
                methods.push(MethodInfo {
                    name: method.sig.ident.clone(),
                    shape,
                    annotations: annotations.into_iter().map(|a| a.tokens).collect(),
                });
            }
            None if !annotations.is_empty() => push_error(
                &mut errors,
                syn::Error::new_spanned(
                    &method.sig,
                    "annotated methods must be getters `fn(&self) -> T` or actions `fn(&self)`/`fn(&mut self)`",
                ),
            ),
            None => {}
        }
    }
    if let Some(errors) = errors {
        return Err(errors);
    }

    let self_ty = &item.self_ty;
    let registrations = methods.iter().map(|m| registration(self_ty, m));

    Ok(quote! {
        #item

        impl #core::object::BindableType for #self_ty {
            fn static_meta_class() -> &'static #core::meta::MetaClass {
                static META: ::std::sync::OnceLock<#core::meta::MetaClass> =
                    ::std::sync::OnceLock::new();
                META.get_or_init(|| {
                    #core::meta::MetaClass::builder::<#self_ty>()
                        #(#registrations)*
                        .build()
                })
            }
        }

        impl #core::object::Bindable for #self_ty {
            fn meta_class(&self) -> &'static #core::meta::MetaClass {
                <Self as #core::object::BindableType>::static_meta_class()
            }
        }
    })
}

/// The builder calls registering one method and its annotations.
fn registration(self_ty: &Type, method: &MethodInfo) -> TokenStream2 {
    let ident = &method.name;
    let name = ident.to_string();

    let register = match &method.shape {
        MethodShape::Getter { fallible: false } => quote! {
            .getter(#name, |target: &#self_ty| <#self_ty>::#ident(target))
        },
        MethodShape::Getter { fallible: true } => quote! {
            .try_getter(#name, |target: &#self_ty| <#self_ty>::#ident(target))
        },
        MethodShape::Setter {
            fallible: false,
            arg,
        } => quote! {
            .setter(#name, |target: &mut #self_ty, value: #arg| <#self_ty>::#ident(target, value))
        },
        MethodShape::Setter {
            fallible: true,
            arg,
        } => quote! {
            .try_setter(#name, |target: &mut #self_ty, value: #arg| <#self_ty>::#ident(target, value))
        },
        MethodShape::Action { fallible: false } => quote! {
            .action(#name, |target: &mut #self_ty| <#self_ty>::#ident(target))
        },
        MethodShape::Action { fallible: true } => quote! {
            .try_action(#name, |target: &mut #self_ty| <#self_ty>::#ident(target))
        },
    };

    let annotations = method.annotations.iter().map(|annotation| {
        quote! { .annotate(#name, #annotation) }
    });
    quote! {
        #register
        #(#annotations)*
    }
}

/// Classify a method by its signature.
fn method_shape(method: &ImplItemFn) -> Option<MethodShape> {
    let sig = &method.sig;
    if !sig.generics.params.is_empty() || sig.asyncness.is_some() {
        return None;
    }

    let mut inputs = sig.inputs.iter();
    let receiver = match inputs.next()? {
        FnArg::Receiver(receiver) if receiver.reference.is_some() => receiver,
        _ => return None,
    };
    let mutable = receiver.mutability.is_some();
    let args: Vec<_> = inputs.collect();
    let returns = ReturnKind::of(&sig.output);

    match (args.as_slice(), returns) {
        ([], ReturnKind::Unit { fallible }) => Some(MethodShape::Action { fallible }),
        ([], ReturnKind::Value { fallible }) if !mutable => Some(MethodShape::Getter { fallible }),
        ([FnArg::Typed(arg)], ReturnKind::Unit { fallible })
            if mutable && sig.ident.to_string().starts_with("set_") =>
        {
            Some(MethodShape::Setter {
                fallible,
                arg: (*arg.ty).clone(),
            })
        }
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum ReturnKind {
    Unit { fallible: bool },
    Value { fallible: bool },
}

impl ReturnKind {
    fn of(output: &ReturnType) -> Self {
        let ty = match output {
            ReturnType::Default => return Self::Unit { fallible: false },
            ReturnType::Type(_, ty) => ty.as_ref(),
        };
        if is_unit(ty) {
            return Self::Unit { fallible: false };
        }
        match result_ok_type(ty) {
            Some(ok) if is_unit(ok) => Self::Unit { fallible: true },
            Some(_) => Self::Value { fallible: true },
            None => Self::Value { fallible: false },
        }
    }
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

/// The success type of a `Result<T, E>` return type.
fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(ok) => Some(ok),
        _ => None,
    }
}

struct ParsedAnnotation {
    tokens: TokenStream2,
    is_model_object: bool,
}

/// Parse the recognized attributes of a method and remove them. All other
/// attributes stay, also when parsing fails.
fn take_annotations(
    attrs: &mut Vec<Attribute>,
    core: &TokenStream2,
) -> syn::Result<Vec<ParsedAnnotation>> {
    let mut annotations = Vec::new();
    let mut errors = None;
    for attr in attrs.iter() {
        match parse_annotation(attr, core) {
            Some(Ok(annotation)) => annotations.push(annotation),
            Some(Err(err)) => push_error(&mut errors, err),
            None => {}
        }
    }
    attrs.retain(|attr| !is_annotation(attr));

    match errors {
        Some(errors) => Err(errors),
        None => Ok(annotations),
    }
}

fn is_annotation(attr: &Attribute) -> bool {
    let path = attr.path();
    path.is_ident(TABLE_COLUMN)
        || path.is_ident(MODEL_OBJECT)
        || ELEMENT_ATTRIBUTES.iter().any(|(name, _)| path.is_ident(name))
}

fn parse_annotation(attr: &Attribute, core: &TokenStream2) -> Option<syn::Result<ParsedAnnotation>> {
    let element = ELEMENT_ATTRIBUTES
        .iter()
        .find(|(name, _)| attr.path().is_ident(name));
    let (tokens, is_model_object) = if let Some((_, kind)) = element {
        (parse_element(attr, kind, core), false)
    } else if attr.path().is_ident(TABLE_COLUMN) {
        (parse_table_column(attr, core), false)
    } else if attr.path().is_ident(MODEL_OBJECT) {
        (parse_model_object(attr, core), true)
    } else {
        return None;
    };
    Some(tokens.map(|tokens| ParsedAnnotation {
        tokens,
        is_model_object,
    }))
}

fn parse_element(attr: &Attribute, kind: &str, core: &TokenStream2) -> syn::Result<TokenStream2> {
    let mut position: Option<Expr> = None;
    let mut custom_kind: Option<LitStr> = None;
    let mut modifiers = Vec::new();

    attr.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .map(Ident::to_string)
            .unwrap_or_default();
        match key.as_str() {
            "position" => position = Some(meta.value()?.parse()?),
            "kind" if kind == "custom" => custom_kind = Some(meta.value()?.parse()?),
            "label" => {
                let label: LitStr = meta.value()?.parse()?;
                modifiers.push(quote!(.with_label(#label)));
            }
            "model_object" => {
                let name: LitStr = meta.value()?.parse()?;
                modifiers.push(quote!(.with_model_object(#name)));
            }
            "model_attribute" => {
                let name: LitStr = meta.value()?.parse()?;
                modifiers.push(quote!(.with_model_attribute(#name)));
            }
            "enabled" | "visible" | "required" | "available_values" => {
                let variant: Ident = meta.value()?.parse()?;
                let (setter, ty) = match key.as_str() {
                    "enabled" => (quote!(with_enabled), quote!(EnabledType)),
                    "visible" => (quote!(with_visible), quote!(VisibleType)),
                    "required" => (quote!(with_required), quote!(RequiredType)),
                    _ => (quote!(with_available_values), quote!(AvailableValuesType)),
                };
                modifiers.push(quote!(.#setter(#core::annotation::#ty::#variant)));
            }
            _ => return Err(meta.error(format!("unknown attribute `{key}`"))),
        }
        Ok(())
    })?;

    let position = position.ok_or_else(|| {
        syn::Error::new_spanned(attr, "UI elements require a `position`")
    })?;
    let annotation = match (kind, custom_kind) {
        ("custom", Some(name)) => quote! {
            #core::annotation::ElementAnnotation::new(
                #core::annotation::ElementKind::Custom(#name),
                #position,
            )
        },
        ("custom", None) => {
            return Err(syn::Error::new_spanned(attr, "`ui_element` requires a `kind`"));
        }
        (constructor, _) => {
            let constructor = Ident::new(constructor, proc_macro2::Span::call_site());
            quote!(#core::annotation::ElementAnnotation::#constructor(#position))
        }
    };

    Ok(quote!(#annotation #(#modifiers)*))
}

fn parse_table_column(attr: &Attribute, core: &TokenStream2) -> syn::Result<TokenStream2> {
    let mut modifiers = Vec::new();
    let mut collapsible = false;
    let mut collapsed = false;

    if let Meta::List(_) = &attr.meta {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("width") {
                let width: Expr = meta.value()?.parse()?;
                modifiers.push(quote!(.with_width(#width)));
            } else if meta.path.is_ident("expand_ratio") {
                let ratio: Expr = meta.value()?.parse()?;
                modifiers.push(quote!(.with_expand_ratio(#ratio)));
            } else if meta.path.is_ident("collapsible") {
                collapsible = true;
            } else if meta.path.is_ident("collapsed") {
                collapsed = true;
            } else {
                return Err(meta.error("expected `width`, `expand_ratio`, `collapsible` or `collapsed`"));
            }
            Ok(())
        })?;
    }
    if collapsible || collapsed {
        modifiers.push(quote!(.collapsible(#collapsed)));
    }

    Ok(quote! {
        #core::annotation::TableColumnAnnotation::new() #(#modifiers)*
    })
}

fn parse_model_object(attr: &Attribute, core: &TokenStream2) -> syn::Result<TokenStream2> {
    let name = match &attr.meta {
        Meta::Path(_) => None,
        Meta::List(list) => match syn::parse2::<LitStr>(list.tokens.clone()) {
            Ok(name) => Some(name),
            Err(_) => {
                let mut name = None;
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        name = Some(meta.value()?.parse::<LitStr>()?);
                        Ok(())
                    } else {
                        Err(meta.error("expected `name`"))
                    }
                })?;
                name
            }
        },
        Meta::NameValue(nv) => {
            return Err(syn::Error::new_spanned(
                nv,
                "use #[model_object(\"name\")] to name a model object",
            ));
        }
    };

    Ok(match name {
        Some(name) => quote!(#core::annotation::ModelObjectAnnotation::new(#name)),
        None => quote!(<#core::annotation::ModelObjectAnnotation as ::std::default::Default>::default()),
    })
}

/// Derive `BindableEnum`, `IntoValue` and `FromValue` for a fieldless enum.
///
/// The constants are the variants in declaration order.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, BindableEnum)]
/// enum Title {
///     Mr,
///     Ms,
///     Dr,
/// }
/// ```
#[proc_macro_derive(BindableEnum)]
pub fn derive_bindable_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_bindable_enum(&input, &crate_path::core_path()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn impl_bindable_enum(input: &DeriveInput, core: &TokenStream2) -> syn::Result<TokenStream2> {
    let enum_name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "BindableEnum derive does not support generic enums",
        ));
    }
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "BindableEnum derive only supports enums",
        ));
    };

    let mut variants = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "BindableEnum derive only supports variants without fields",
            ));
        }
        variants.push(&variant.ident);
    }

    let type_name = enum_name.to_string();
    let constants = variants.iter().enumerate().map(|(ordinal, variant)| {
        let name = variant.to_string();
        quote! {
            #core::value::EnumConstant {
                type_name: #type_name,
                name: #name,
                ordinal: #ordinal,
            }
        }
    });
    let to_constant = variants.iter().enumerate().map(|(ordinal, variant)| {
        quote!(Self::#variant => Self::CONSTANTS[#ordinal])
    });
    let from_constant = variants.iter().enumerate().map(|(ordinal, variant)| {
        quote!(#ordinal => ::std::option::Option::Some(Self::#variant))
    });

    let value = quote!(#core::value::Value);
    Ok(quote! {
        impl #core::value::BindableEnum for #enum_name {
            const CONSTANTS: &'static [#core::value::EnumConstant] = &[#(#constants),*];

            fn to_constant(&self) -> #core::value::EnumConstant {
                match self {
                    #(#to_constant,)*
                }
            }

            fn from_constant(
                constant: &#core::value::EnumConstant,
            ) -> ::std::option::Option<Self> {
                if constant.type_name != #type_name {
                    return ::std::option::Option::None;
                }
                match constant.ordinal {
                    #(#from_constant,)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl #core::value::IntoValue for #enum_name {
            fn value_type() -> #core::value::ValueType {
                #core::value::ValueType::enumeration::<Self>()
            }

            fn into_value(self) -> #value {
                #value::Enum(#core::value::BindableEnum::to_constant(&self))
            }
        }

        impl #core::value::FromValue for #enum_name {
            fn from_value(value: #value) -> #core::BindingResult<Self> {
                #core::value::enum_from_value(value)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn method(item: &ItemImpl, index: usize) -> &ImplItemFn {
        match &item.items[index] {
            ImplItem::Fn(method) => method,
            _ => panic!("expected a method"),
        }
    }

    fn attr_names(method: &ImplItemFn) -> Vec<String> {
        method
            .attrs
            .iter()
            .filter_map(|attr| attr.path().get_ident().map(Ident::to_string))
            .collect()
    }

    #[test]
    fn test_invalid_annotation_keeps_other_attributes() {
        let mut item: ItemImpl = parse_quote! {
            impl ContactPmo {
                /// The name.
                #[cfg(all())]
                #[ui_text_field(label = "Name")]
                pub fn name(&self) -> String {
                    String::new()
                }

                #[ui_button(position = 2)]
                #[inline]
                pub fn submit(&mut self) {}

                #[ui_label(position = 3, colour = "red")]
                #[allow(dead_code)]
                pub fn city(&self) -> String {
                    String::new()
                }
            }
        };

        let err = impl_bindable(&mut item, &quote!(::linkki_core)).unwrap_err();
        assert_eq!(err.into_iter().count(), 2);

        assert_eq!(attr_names(method(&item, 0)), ["doc", "cfg"]);
        assert_eq!(attr_names(method(&item, 1)), ["inline"]);
        assert_eq!(attr_names(method(&item, 2)), ["allow"]);
    }

    #[test]
    fn test_generated_paths_use_core_path() {
        let mut item: ItemImpl = parse_quote! {
            impl ContactPmo {
                #[ui_check_box(position = 1, enabled = Dynamic)]
                pub fn is_newsletter(&self) -> bool {
                    true
                }
            }
        };

        let tokens = impl_bindable(&mut item, &quote!(::linkki::__core))
            .unwrap()
            .to_string();
        assert!(tokens.contains(":: linkki :: __core :: annotation :: EnabledType :: Dynamic"));
        assert!(tokens.contains("impl :: linkki :: __core :: object :: Bindable for ContactPmo"));
        assert!(!tokens.contains("linkki_core"));
        assert!(attr_names(method(&item, 0)).is_empty());
    }
}
