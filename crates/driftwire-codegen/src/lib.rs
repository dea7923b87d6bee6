// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

mod attrs;
mod descriptor;

use attrs::{literal_value, FieldAttrs, StructAttrs, VariantAttrs};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// `#[derive(ThriftStruct)]`: generates `StructMetadata` for a struct with
/// named fields.
///
/// Every serialized field needs an id; the constructor is the struct
/// literal itself.
///
/// Field attributes (`#[thrift(...)]`):
/// - `id = N`: field id (required unless `skip`)
/// - `name = "..."`: wire name, defaults to the Rust name
/// - `required` / `optional`: requiredness; `Option<T>` fields are optional
///   unless marked `required`
/// - `enum`: the innermost type is a `ThriftEnum`
/// - `coerced`: the innermost type uses the catalog's registered coercion
/// - `skip`: not serialized, filled with `Default::default()` on read
///
/// Supported field types: `bool`, `i8`, `i16`, `i32`, `i64`, `f64`,
/// `String`, `Vec<u8>`, the unsigned integers, `f32`, `usize`, `char`,
/// `Box<str>`, `Arc<str>`, `Vec`/`VecDeque`, `HashSet`/`BTreeSet`,
/// `HashMap`/`BTreeMap`, `Box<T>`, `Arc<T>`, `Option<T>`, and other
/// structures deriving `ThriftStruct`.
///
/// Example:
/// ```ignore
/// use driftwire::ThriftStruct;
///
/// #[derive(ThriftStruct)]
/// struct Node {
///     #[thrift(id = 1)]
///     value: i32,
///     #[thrift(id = 2)]
///     next: Option<Box<Node>>,
/// }
/// ```
#[proc_macro_derive(ThriftStruct, attributes(thrift))]
pub fn derive_thrift_struct(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_struct(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `#[derive(ThriftEnum)]`: maps each unit variant to its i32 value.
///
/// Values come from `#[thrift(value = N)]`, else the explicit
/// discriminant, else the previous value plus one (starting at 0). The
/// enum must also derive `Clone` and `Copy`.
#[proc_macro_derive(ThriftEnum, attributes(thrift))]
pub fn derive_thrift_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_enum(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn reject_generics(input: &DeriveInput) -> syn::Result<()> {
    if input.generics.params.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            &input.generics,
            "generic types are not supported",
        ))
    }
}

fn expand_struct(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    reject_generics(input)?;
    let ident = &input.ident;
    let struct_attrs = StructAttrs::parse(&input.attrs)?;
    let wire_name = struct_attrs.name.unwrap_or_else(|| ident.to_string());

    let fields: Vec<&syn::Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "ThriftStruct requires named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "ThriftStruct can only be derived for structs",
            ))
        }
    };

    let mut getters = Vec::new();
    let mut field_metadata = Vec::new();
    let mut params = Vec::new();
    let mut initializers = Vec::new();

    for field in &fields {
        let Some(field_ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "field must have a name"));
        };
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            initializers.push(quote! { #field_ident: ::core::default::Default::default() });
            continue;
        }
        let Some(id) = attrs.id else {
            return Err(syn::Error::new_spanned(
                field,
                "missing #[thrift(id = ...)] on serialized field",
            ));
        };
        let field_name = attrs.name.clone().unwrap_or_else(|| field_ident.unraw().to_string());
        let inner = descriptor::option_inner(&field.ty);
        if attrs.optional && inner.is_none() {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "optional fields must be declared as Option<T>",
            ));
        }
        let value_ty = inner.unwrap_or(&field.ty);
        let descriptor = descriptor::expand(value_ty, attrs.leaf)?;

        let getter = format_ident!("__get_{}", field_ident.unraw());
        let requiredness = if attrs.required {
            quote! { ::driftwire::Requiredness::Required }
        } else if inner.is_some() {
            quote! { ::driftwire::Requiredness::Optional }
        } else {
            quote! { ::driftwire::Requiredness::Default }
        };
        let extraction = if inner.is_some() {
            getters.push(quote! {
                #[allow(clippy::borrowed_box)]
                fn #getter(value: &#ident) -> ::core::option::Option<&#value_ty> {
                    value.#field_ident.as_ref()
                }
            });
            initializers.push(quote! { #field_ident: values.take_optional(#id)? });
            quote! { ::driftwire::ExtractionPoint::optional_field(#field_name, #getter) }
        } else {
            getters.push(quote! {
                #[allow(clippy::borrowed_box, clippy::ptr_arg)]
                fn #getter(value: &#ident) -> &#value_ty {
                    &value.#field_ident
                }
            });
            initializers.push(quote! { #field_ident: values.take(#id)? });
            quote! { ::driftwire::ExtractionPoint::field(#field_name, #getter) }
        };
        let params_len = params.len();
        field_metadata.push(quote! {
            .field(
                ::driftwire::FieldMetadata::builder(#id, #field_name, #descriptor)
                    .requiredness(#requiredness)
                    .extraction(#extraction)
                    .injection(::driftwire::InjectionPoint::parameter(#params_len))
                    .build(),
            )
        });
        params.push(id);
    }

    let construct = if matches!(&input.data, Data::Struct(data) if matches!(data.fields, Fields::Unit)) {
        quote! { #ident }
    } else {
        quote! { #ident { #(#initializers),* } }
    };
    let constructor_name = ident.to_string();

    Ok(quote! {
        impl ::driftwire::ThriftStruct for #ident {
            fn struct_metadata(
                catalog: &::driftwire::ThriftCatalog,
            ) -> ::driftwire::Result<::driftwire::StructMetadata> {
                let _ = catalog;
                #(#getters)*
                let metadata = ::driftwire::StructMetadata::builder::<#ident>(#wire_name)
                    #(#field_metadata)*
                    .constructor(::driftwire::ConstructorInjection::new(
                        #constructor_name,
                        &[#(#params),*],
                        |values: &mut ::driftwire::FieldValues| -> ::core::result::Result<#ident, ::driftwire::BoxError> {
                            let _ = &values;
                            ::core::result::Result::Ok(#construct)
                        },
                    ))
                    .build()?;
                ::core::result::Result::Ok(metadata)
            }
        }
    })
}

fn expand_enum(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    reject_generics(input)?;
    let ident = &input.ident;
    let struct_attrs = StructAttrs::parse(&input.attrs)?;
    let wire_name = struct_attrs.name.unwrap_or_else(|| ident.to_string());

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "ThriftEnum can only be derived for enums",
        ));
    };

    let mut variants = Vec::new();
    let mut values = Vec::new();
    let mut names = Vec::new();
    let mut next: i64 = 0;
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "ThriftEnum variants cannot carry data",
            ));
        }
        let attrs = VariantAttrs::parse(&variant.attrs)?;
        let value = match (attrs.value, &variant.discriminant) {
            (Some(value), _) => value,
            (None, Some((_, expr))) => literal_value(expr).ok_or_else(|| {
                syn::Error::new_spanned(expr, "discriminant must be an integer literal")
            })?,
            (None, None) => next,
        };
        let value = i32::try_from(value)
            .map_err(|_| syn::Error::new_spanned(variant, "enum value does not fit in i32"))?;
        next = i64::from(value) + 1;
        let variant_ident = &variant.ident;
        variants.push(quote! { #ident::#variant_ident });
        values.push(value);
        names.push(attrs.name.unwrap_or_else(|| variant_ident.to_string()));
    }

    Ok(quote! {
        impl ::driftwire::ThriftEnum for #ident {
            const NAME: &'static str = #wire_name;

            fn variants() -> &'static [Self] {
                &[#(#variants),*]
            }

            fn value(self) -> i32 {
                match self {
                    #(#variants => #values,)*
                }
            }

            fn variant_name(self) -> &'static str {
                match self {
                    #(#variants => #names,)*
                }
            }
        }
    })
}
