// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rust field type -> catalog descriptor expression.

use crate::attrs::LeafOverride;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, PathSegment, Type};

fn last_segment(ty: &Type) -> Option<&PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        Type::Group(group) => last_segment(&group.elem),
        _ => None,
    }
}

fn type_args(segment: &PathSegment) -> Vec<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_named(ty: &Type, name: &str) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == name && segment.arguments.is_empty())
}

/// `T` when `ty` is `Option<T>`.
pub(crate) fn option_inner(ty: &Type) -> Option<&Type> {
    let segment = last_segment(ty)?;
    if segment.ident != "Option" {
        return None;
    }
    match type_args(segment).as_slice() {
        [inner] => Some(inner),
        _ => None,
    }
}

/// Expression evaluating to the `ThriftType` of `ty`, with `catalog` in scope.
pub(crate) fn expand(ty: &Type, leaf: LeafOverride) -> syn::Result<TokenStream> {
    if let Type::Tuple(tuple) = ty {
        if tuple.elems.is_empty() {
            return Ok(quote! { catalog.void_type() });
        }
    }
    let Some(segment) = last_segment(ty) else {
        return Err(unsupported(ty));
    };
    let args = type_args(segment);
    let name = segment.ident.to_string();

    if args.is_empty() {
        return Ok(match leaf {
            LeafOverride::Enum => quote! { catalog.enum_type::<#ty>()? },
            LeafOverride::Coerced => quote! { catalog.coerced_type::<#ty>()? },
            LeafOverride::Inferred => match name.as_str() {
                "bool" => quote! { catalog.bool_type() },
                "i8" => quote! { catalog.byte_type() },
                "i16" => quote! { catalog.i16_type() },
                "i32" => quote! { catalog.i32_type() },
                "i64" => quote! { catalog.i64_type() },
                "f64" => quote! { catalog.double_type() },
                "String" => quote! { catalog.string_type() },
                "u8" | "u16" | "u32" | "u64" | "usize" | "f32" | "char" => {
                    quote! { catalog.coerced_type::<#ty>()? }
                }
                _ => quote! { catalog.struct_type::<#ty>() },
            },
        });
    }

    match (name.as_str(), args.as_slice()) {
        ("Vec", [element]) if is_named(element, "u8") => Ok(quote! { catalog.binary_type() }),
        ("Vec" | "VecDeque", [element]) => {
            let element = expand(element, leaf)?;
            Ok(quote! { catalog.list_type::<#ty>(#element)? })
        }
        ("HashSet" | "BTreeSet", [element, ..]) => {
            let element = expand(element, leaf)?;
            Ok(quote! { catalog.set_type::<#ty>(#element)? })
        }
        ("HashMap" | "BTreeMap", [key, value, ..]) => {
            let key = expand(key, LeafOverride::Inferred)?;
            let value = expand(value, leaf)?;
            Ok(quote! { catalog.map_type::<#ty>(#key, #value)? })
        }
        ("Box" | "Arc", [inner]) if is_named(inner, "str") => {
            Ok(quote! { catalog.coerced_type::<#ty>()? })
        }
        ("Box", [inner]) => {
            let descriptor = expand(inner, leaf)?;
            Ok(quote! { catalog.boxed_type::<#inner>(#descriptor)? })
        }
        ("Arc", [inner]) => {
            let descriptor = expand(inner, leaf)?;
            Ok(quote! { catalog.arc_type::<#inner>(#descriptor)? })
        }
        _ => Err(unsupported(ty)),
    }
}

fn unsupported(ty: &Type) -> syn::Error {
    syn::Error::new_spanned(
        ty,
        "unsupported field type; write the metadata by hand or mark the field #[thrift(skip)]",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn render(ty: Type) -> String {
        expand(&ty, LeafOverride::Inferred)
            .map(|tokens| tokens.to_string())
            .unwrap_or_else(|err| err.to_string())
    }

    #[test]
    fn test_builtins_and_coerced_primitives() {
        assert_eq!(render(parse_quote!(i32)), "catalog . i32_type ()");
        assert_eq!(render(parse_quote!(Vec<u8>)), "catalog . binary_type ()");
        assert!(render(parse_quote!(u32)).contains("coerced_type :: < u32 >"));
        assert_eq!(render(parse_quote!(())), "catalog . void_type ()");
    }

    #[test]
    fn test_containers_nest() {
        let rendered = render(parse_quote!(HashMap<String, Vec<Point>>));
        assert!(rendered.contains("map_type :: < HashMap < String , Vec < Point > > >"));
        assert!(rendered.contains("list_type :: < Vec < Point > >"));
        assert!(rendered.contains("struct_type :: < Point >"));
    }

    #[test]
    fn test_box_and_option() {
        let rendered = render(parse_quote!(Box<Node>));
        assert!(rendered.contains("boxed_type :: < Node >"));
        let ty: Type = parse_quote!(Option<Box<Node>>);
        assert!(option_inner(&ty).is_some());
        assert!(option_inner(&parse_quote!(Vec<i32>)).is_none());
    }

    #[test]
    fn test_leaf_override_reaches_innermost_type() {
        let ty: Type = parse_quote!(Vec<Color>);
        let rendered = expand(&ty, LeafOverride::Enum).map(|t| t.to_string()).unwrap_or_default();
        assert!(rendered.contains("enum_type :: < Color >"));
    }

    #[test]
    fn test_unsupported_types_are_rejected() {
        assert!(expand(&parse_quote!(&'static str), LeafOverride::Inferred).is_err());
        assert!(expand(&parse_quote!(Rc<Node>), LeafOverride::Inferred).is_err());
    }
}
