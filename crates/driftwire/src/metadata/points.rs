// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Extraction and injection points.

use crate::error::{BoxError, Error};
use crate::types::AppType;
use crate::value::{unbox, ThriftValue, ValueRef};
use std::any::Any;
use std::fmt;

type Extractor =
    dyn for<'a> Fn(&'a dyn Any) -> Result<Option<ValueRef<'a>>, BoxError> + Send + Sync;
type Setter = dyn Fn(&mut dyn Any, ThriftValue) -> Result<(), BoxError> + Send + Sync;
type Chainer = dyn Fn(ThriftValue, ThriftValue) -> Result<ThriftValue, BoxError> + Send + Sync;

fn extractor<F>(f: F) -> F
where
    F: for<'a> Fn(&'a dyn Any) -> Result<Option<ValueRef<'a>>, BoxError>,
{
    f
}

fn target_error<T>() -> BoxError {
    Box::new(Error::mismatch::<T>())
}

/// How an extraction point reaches the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionKind {
    Field,
    Method,
}

/// Reads a field's current value out of an existing instance.
pub struct ExtractionPoint {
    kind: ExtractionKind,
    name: String,
    target: AppType,
    value: AppType,
    extract: Box<Extractor>,
}

impl ExtractionPoint {
    /// Direct access to a field that always holds a value.
    pub fn field<T, F>(name: &str, get: fn(&T) -> &F) -> Self
    where
        T: Any,
        F: Any,
    {
        Self {
            kind: ExtractionKind::Field,
            name: name.to_owned(),
            target: AppType::of::<T>(),
            value: AppType::of::<F>(),
            extract: Box::new(extractor(move |instance: &dyn Any| {
                let instance = instance.downcast_ref::<T>().ok_or_else(target_error::<T>)?;
                Ok(Some(ValueRef::Borrowed(get(instance))))
            })),
        }
    }

    /// Direct access to a field that may be unset, such as an `Option`.
    pub fn optional_field<T, F>(name: &str, get: fn(&T) -> Option<&F>) -> Self
    where
        T: Any,
        F: Any,
    {
        Self {
            kind: ExtractionKind::Field,
            name: name.to_owned(),
            target: AppType::of::<T>(),
            value: AppType::of::<F>(),
            extract: Box::new(extractor(move |instance: &dyn Any| {
                let instance = instance.downcast_ref::<T>().ok_or_else(target_error::<T>)?;
                Ok(get(instance).map(|value| ValueRef::Borrowed(value)))
            })),
        }
    }

    /// Accessor method computing the value; `Ok(None)` means absent.
    pub fn method<T, F, M>(name: &str, call: M) -> Self
    where
        T: Any,
        F: Any + Send + Sync,
        M: Fn(&T) -> Result<Option<F>, BoxError> + Send + Sync + 'static,
    {
        Self {
            kind: ExtractionKind::Method,
            name: name.to_owned(),
            target: AppType::of::<T>(),
            value: AppType::of::<F>(),
            extract: Box::new(extractor(move |instance: &dyn Any| {
                let instance = instance.downcast_ref::<T>().ok_or_else(target_error::<T>)?;
                Ok(call(instance)?.map(|value| ValueRef::Owned(Box::new(value))))
            })),
        }
    }

    pub fn kind(&self) -> ExtractionKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance type the point reads from.
    pub fn target(&self) -> AppType {
        self.target
    }

    /// Type of the extracted value.
    pub fn value_type(&self) -> AppType {
        self.value
    }

    pub(crate) fn extract<'a>(&self, instance: &'a dyn Any) -> Result<Option<ValueRef<'a>>, BoxError> {
        (self.extract)(instance)
    }
}

impl fmt::Debug for ExtractionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionPoint")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("value", &self.value.name())
            .finish()
    }
}

/// How an injection point supplies the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionKind {
    /// Parameter of the constructor (or builder constructor).
    Parameter,
    /// Direct assignment to a field.
    Field,
    /// Setter method call on the instance.
    Setter,
    /// Builder method consuming and returning the builder.
    BuilderMethod,
}

pub(crate) enum InjectAction {
    Parameter { index: usize },
    Set(Box<Setter>),
    Chain(Box<Chainer>),
}

/// Supplies a field's value into a new or in-progress instance.
pub struct InjectionPoint {
    kind: InjectionKind,
    name: String,
    target: Option<AppType>,
    value: Option<AppType>,
    pub(crate) action: InjectAction,
}

impl InjectionPoint {
    /// Position `index` in the construction strategy's parameter list.
    pub fn parameter(index: usize) -> Self {
        Self {
            kind: InjectionKind::Parameter,
            name: format!("arg{index}"),
            target: None,
            value: None,
            action: InjectAction::Parameter { index },
        }
    }

    /// Direct assignment after construction.
    pub fn field<T, F>(name: &str, set: fn(&mut T, F)) -> Self
    where
        T: Any,
        F: Any,
    {
        Self::setter_of(InjectionKind::Field, name, move |instance: &mut T, value: F| {
            set(instance, value);
            Ok(())
        })
    }

    /// Setter method call after construction.
    pub fn setter<T, F, S>(name: &str, set: S) -> Self
    where
        T: Any,
        F: Any,
        S: Fn(&mut T, F) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::setter_of(InjectionKind::Setter, name, set)
    }

    fn setter_of<T, F, S>(kind: InjectionKind, name: &str, set: S) -> Self
    where
        T: Any,
        F: Any,
        S: Fn(&mut T, F) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let apply = move |instance: &mut dyn Any, value: ThriftValue| -> Result<(), BoxError> {
            let instance = instance.downcast_mut::<T>().ok_or_else(target_error::<T>)?;
            let value = unbox::<F>(value).ok_or_else(target_error::<F>)?;
            set(instance, value)
        };
        Self {
            kind,
            name: name.to_owned(),
            target: Some(AppType::of::<T>()),
            value: Some(AppType::of::<F>()),
            action: InjectAction::Set(Box::new(apply)),
        }
    }

    /// Builder method `B -> B` taking the field value.
    pub fn builder_method<B, F, M>(name: &str, call: M) -> Self
    where
        B: Any + Send + Sync,
        F: Any,
        M: Fn(B, F) -> Result<B, BoxError> + Send + Sync + 'static,
    {
        let apply = move |builder: ThriftValue, value: ThriftValue| -> Result<ThriftValue, BoxError> {
            let builder = unbox::<B>(builder).ok_or_else(target_error::<B>)?;
            let value = unbox::<F>(value).ok_or_else(target_error::<F>)?;
            Ok(Box::new(call(builder, value)?))
        };
        Self {
            kind: InjectionKind::BuilderMethod,
            name: name.to_owned(),
            target: Some(AppType::of::<B>()),
            value: Some(AppType::of::<F>()),
            action: InjectAction::Chain(Box::new(apply)),
        }
    }

    pub fn kind(&self) -> InjectionKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance type the point writes into; `None` for parameters.
    pub fn target(&self) -> Option<AppType> {
        self.target
    }

    /// Type of the injected value; `None` for parameters, which are typed
    /// by the constructor itself.
    pub fn value_type(&self) -> Option<AppType> {
        self.value
    }

    pub fn parameter_index(&self) -> Option<usize> {
        match self.action {
            InjectAction::Parameter { index } => Some(index),
            _ => None,
        }
    }
}

impl fmt::Debug for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish()
    }
}
