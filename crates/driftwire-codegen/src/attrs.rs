// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `#[thrift(...)]` attribute parsing.

use syn::{Attribute, Expr, ExprLit, ExprUnary, Lit, LitInt, LitStr, UnOp};

/// How the innermost type of a field is described.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum LeafOverride {
    /// Builtin, collection or nested structure, chosen from the type.
    #[default]
    Inferred,
    /// `catalog.enum_type::<T>()`
    Enum,
    /// `catalog.coerced_type::<T>()`
    Coerced,
}

#[derive(Default)]
pub(crate) struct StructAttrs {
    pub name: Option<String>,
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub id: Option<i16>,
    pub name: Option<String>,
    pub required: bool,
    pub optional: bool,
    pub skip: bool,
    pub leaf: LeafOverride,
}

#[derive(Default)]
pub(crate) struct VariantAttrs {
    pub value: Option<i64>,
    pub name: Option<String>,
}

/// Value of an integer literal, possibly negated or parenthesized.
pub(crate) fn literal_value(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_parse().ok(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => literal_value(expr).map(|value| -value),
        Expr::Group(group) => literal_value(&group.expr),
        Expr::Paren(paren) => literal_value(&paren.expr),
        _ => None,
    }
}

fn thrift_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("thrift"))
}

impl StructAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in thrift_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    parsed.name = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported thrift attribute, expected `name`"))
                }
            })?;
        }
        Ok(parsed)
    }
}

impl FieldAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in thrift_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    parsed.id = Some(meta.value()?.parse::<LitInt>()?.base10_parse()?);
                } else if meta.path.is_ident("name") {
                    parsed.name = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("required") {
                    parsed.required = true;
                } else if meta.path.is_ident("optional") {
                    parsed.optional = true;
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else if meta.path.is_ident("enum") {
                    parsed.leaf = LeafOverride::Enum;
                } else if meta.path.is_ident("coerced") {
                    parsed.leaf = LeafOverride::Coerced;
                } else {
                    return Err(meta.error(
                        "unsupported thrift attribute, expected one of \
                         `id`, `name`, `required`, `optional`, `skip`, `enum`, `coerced`",
                    ));
                }
                Ok(())
            })?;
        }
        if parsed.required && parsed.optional {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                "a field cannot be both `required` and `optional`",
            ));
        }
        Ok(parsed)
    }
}

impl VariantAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in thrift_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("value") {
                    let expr = meta.value()?.parse::<Expr>()?;
                    let value = literal_value(&expr)
                        .ok_or_else(|| syn::Error::new_spanned(&expr, "expected an integer literal"))?;
                    parsed.value = Some(value);
                    Ok(())
                } else if meta.path.is_ident("name") {
                    parsed.name = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported thrift attribute, expected `value` or `name`"))
                }
            })?;
        }
        Ok(parsed)
    }
}
