// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bidirectional conversions between wire-native and application values.
//!
//! A [`TypeCoercion`] binds an application type `A` to a wire descriptor
//! whose values are `W`. Reading applies `W -> A`, writing applies `A -> W`.
//! The catalog registers a default set (unsigned integers, `f32`, `usize`,
//! `char`, shared strings) and pointer coercions for `Box<T>`/`Arc<T>`.

use crate::error::{BoxError, Error, MetadataError, Result};
use crate::types::{cloner_of, AppType, ThriftType, ValueCloner};
use crate::value::{unbox, ThriftValue, ValueRef};
use crate::ThriftCatalog;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type FromThrift = dyn Fn(ThriftValue) -> std::result::Result<ThriftValue, BoxError> + Send + Sync;
type ToThrift =
    dyn for<'a> Fn(&'a dyn Any) -> std::result::Result<ValueRef<'a>, BoxError> + Send + Sync;

// Forces higher-ranked inference for closures stored as `ToThrift`.
fn to_thrift_fn<F>(f: F) -> F
where
    F: for<'a> Fn(&'a dyn Any) -> std::result::Result<ValueRef<'a>, BoxError>,
{
    f
}

/// Conversion pair between an application type and a wire descriptor.
pub struct TypeCoercion {
    app: AppType,
    wire: ThriftType,
    from_thrift: Box<FromThrift>,
    to_thrift: Box<ToThrift>,
    cloner: Option<ValueCloner>,
    zero: Option<fn() -> ThriftValue>,
}

impl TypeCoercion {
    /// Coercion between `A` and the values `W` of `wire`.
    ///
    /// Fails when `wire` does not carry `W`.
    pub fn new<A, W, F, T>(wire: ThriftType, from: F, to: T) -> std::result::Result<Self, MetadataError>
    where
        A: Clone + Any + Send + Sync,
        W: Any + Send + Sync,
        F: Fn(W) -> std::result::Result<A, BoxError> + Send + Sync + 'static,
        T: Fn(&A) -> std::result::Result<W, BoxError> + Send + Sync + 'static,
    {
        if !wire.app_type().is::<W>() {
            return Err(MetadataError::CoercionWireMismatch {
                app_type: std::any::type_name::<A>(),
                expected: std::any::type_name::<W>(),
                found: wire.app_type().name().to_owned(),
            });
        }
        let from_thrift = move |value: ThriftValue| -> std::result::Result<ThriftValue, BoxError> {
            let wire_value = unbox::<W>(value).ok_or_else(|| Box::new(Error::mismatch::<W>()) as BoxError)?;
            Ok(Box::new(from(wire_value)?) as ThriftValue)
        };
        let to_thrift = to_thrift_fn(move |value: &dyn Any| {
            let app_value = value
                .downcast_ref::<A>()
                .ok_or_else(|| Box::new(Error::mismatch::<A>()) as BoxError)?;
            Ok(ValueRef::Owned(Box::new(to(app_value)?)))
        });
        Ok(Self {
            app: AppType::of::<A>(),
            wire,
            from_thrift: Box::new(from_thrift),
            to_thrift: Box::new(to_thrift),
            cloner: Some(cloner_of::<A>()),
            zero: None,
        })
    }

    /// Coercion whose conversions cannot fail.
    pub fn infallible<A, W>(wire: ThriftType, from: fn(W) -> A, to: fn(&A) -> W) -> std::result::Result<Self, MetadataError>
    where
        A: Clone + Any + Send + Sync,
        W: Any + Send + Sync,
    {
        Self::new(wire, move |value| Ok(from(value)), move |value| Ok(to(value)))
    }

    /// `Box<T>` over the descriptor of `T`; writes borrow the pointee.
    pub(crate) fn boxed<T: Any + Send + Sync>(inner: ThriftType) -> Self {
        let cloner = inner.cloner().cloned().map(|inner_cloner| {
            Arc::new(move |value: &dyn Any| {
                let boxed = value.downcast_ref::<Box<T>>()?;
                let copy = unbox::<T>(inner_cloner(&**boxed)?)?;
                Some(Box::new(Box::new(copy)) as ThriftValue)
            }) as ValueCloner
        });
        Self {
            app: AppType::of::<Box<T>>(),
            wire: inner,
            from_thrift: Box::new(|value: ThriftValue| -> std::result::Result<ThriftValue, BoxError> {
                let inner = unbox::<T>(value).ok_or_else(|| Box::new(Error::mismatch::<T>()) as BoxError)?;
                Ok(Box::new(Box::new(inner)) as ThriftValue)
            }),
            to_thrift: Box::new(to_thrift_fn(|value: &dyn Any| {
                let boxed = value
                    .downcast_ref::<Box<T>>()
                    .ok_or_else(|| Box::new(Error::mismatch::<Box<T>>()) as BoxError)?;
                Ok(ValueRef::Borrowed(&**boxed))
            })),
            cloner,
            zero: None,
        }
    }

    /// `Arc<T>` over the descriptor of `T`; always cloneable.
    pub(crate) fn shared<T: Any + Send + Sync>(inner: ThriftType) -> Self {
        let cloner: ValueCloner = Arc::new(|value: &dyn Any| {
            value
                .downcast_ref::<Arc<T>>()
                .map(|shared| Box::new(Arc::clone(shared)) as ThriftValue)
        });
        Self {
            app: AppType::of::<Arc<T>>(),
            wire: inner,
            from_thrift: Box::new(|value: ThriftValue| -> std::result::Result<ThriftValue, BoxError> {
                let inner = unbox::<T>(value).ok_or_else(|| Box::new(Error::mismatch::<T>()) as BoxError)?;
                Ok(Box::new(Arc::new(inner)) as ThriftValue)
            }),
            to_thrift: Box::new(to_thrift_fn(|value: &dyn Any| {
                let shared = value
                    .downcast_ref::<Arc<T>>()
                    .ok_or_else(|| Box::new(Error::mismatch::<Arc<T>>()) as BoxError)?;
                Ok(ValueRef::Borrowed(&**shared))
            })),
            cloner: Some(cloner),
            zero: None,
        }
    }

    /// Application type produced by reads.
    pub fn app(&self) -> AppType {
        self.app
    }

    /// Wire-native descriptor the coercion converts from.
    pub fn wire(&self) -> &ThriftType {
        &self.wire
    }

    pub fn cloner(&self) -> Option<&ValueCloner> {
        self.cloner.as_ref()
    }

    /// Value used when an absent field is zero-filled, for application
    /// types the wire zero does not convert to.
    #[must_use]
    pub fn with_zero(mut self, zero: fn() -> ThriftValue) -> Self {
        self.zero = Some(zero);
        self
    }

    /// Zero of the application type: the explicit one, else the wire zero
    /// converted.
    pub fn zero_value(&self) -> Option<ThriftValue> {
        if let Some(zero) = self.zero {
            return Some(zero());
        }
        let wire = self.wire.zero_value()?;
        self.from_thrift(wire).ok()
    }

    /// Convert a decoded wire value into the application type.
    pub fn from_thrift(&self, value: ThriftValue) -> std::result::Result<ThriftValue, BoxError> {
        (self.from_thrift)(value)
    }

    /// Convert an application value into the wire type, borrowing when possible.
    pub fn to_thrift<'a>(&self, value: &'a dyn Any) -> std::result::Result<ValueRef<'a>, BoxError> {
        (self.to_thrift)(value)
    }

    pub(crate) fn read(&self, value: ThriftValue) -> Result<ThriftValue> {
        self.from_thrift(value).map_err(|source| Error::Coercion {
            type_name: self.app.name(),
            source,
        })
    }

    pub(crate) fn write<'a>(&self, value: &'a dyn Any) -> Result<ValueRef<'a>> {
        self.to_thrift(value).map_err(|source| Error::Coercion {
            type_name: self.wire_name(),
            source,
        })
    }

    fn wire_name(&self) -> &'static str {
        self.wire.app_type().name()
    }
}

impl fmt::Debug for TypeCoercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCoercion")
            .field("app", &self.app.name())
            .field("wire", &self.wire.name())
            .finish()
    }
}

fn checked<A, W>(value: W) -> std::result::Result<A, BoxError>
where
    A: TryFrom<W>,
    A::Error: std::error::Error + Send + Sync + 'static,
{
    A::try_from(value).map_err(Into::into)
}

fn char_from_string(value: String) -> std::result::Result<char, BoxError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(format!("expected exactly one character, got {value:?}").into()),
    }
}

/// Coercions every catalog starts with.
pub(crate) fn default_coercions(catalog: &ThriftCatalog) -> Vec<TypeCoercion> {
    let byte = catalog.byte_type();
    let i16_type = catalog.i16_type();
    let i32_type = catalog.i32_type();
    let i64_type = catalog.i64_type();
    let double = catalog.double_type();
    let string = catalog.string_type();

    let coercions = [
        TypeCoercion::infallible::<u8, i8>(byte, |w| w as u8, |a| *a as i8),
        TypeCoercion::infallible::<u16, i16>(i16_type, |w| w as u16, |a| *a as i16),
        TypeCoercion::infallible::<u32, i32>(i32_type, |w| w as u32, |a| *a as i32),
        TypeCoercion::infallible::<u64, i64>(i64_type.clone(), |w| w as u64, |a| *a as i64),
        TypeCoercion::infallible::<f32, f64>(double, |w| w as f32, |a| f64::from(*a)),
        TypeCoercion::new::<usize, i64, _, _>(i64_type, checked::<usize, i64>, |a| checked::<i64, usize>(*a)),
        TypeCoercion::new::<char, String, _, _>(string.clone(), char_from_string, |a| Ok(a.to_string()))
            .map(|coercion| coercion.with_zero(|| Box::new('\0') as ThriftValue)),
        TypeCoercion::infallible::<Arc<str>, String>(string.clone(), Arc::from, |a| a.to_string()),
        TypeCoercion::infallible::<Box<str>, String>(string, String::into_boxed_str, |a| a.to_string()),
    ];
    coercions
        .into_iter()
        .filter_map(|coercion| match coercion {
            Ok(coercion) => Some(coercion),
            Err(err) => {
                log::warn!("[ThriftCatalog] dropping default coercion: {}", err);
                None
            }
        })
        .collect()
}
