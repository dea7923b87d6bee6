// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Construction strategies and post-construction method injections.

use crate::error::{BoxError, Error, FieldValueError};
use crate::types::AppType;
use crate::value::ThriftValue;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

type Construct = dyn Fn(&mut FieldValues) -> Result<ThriftValue, BoxError> + Send + Sync;
type Finish = dyn Fn(ThriftValue) -> Result<ThriftValue, BoxError> + Send + Sync;
type Apply = dyn Fn(&mut dyn Any, &mut FieldValues) -> Result<(), BoxError> + Send + Sync;

/// Decoded values handed to constructors and methods, keyed by field id.
///
/// Values are moved out; each id can be taken once.
#[derive(Default)]
pub struct FieldValues {
    values: BTreeMap<i16, ThriftValue>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: i16, value: ThriftValue) {
        self.values.insert(id, value);
    }

    pub fn contains(&self, id: i16) -> bool {
        self.values.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take the value of `id`, failing when it is absent or not a `T`.
    pub fn take<T: Any>(&mut self, id: i16) -> Result<T, FieldValueError> {
        self.take_optional(id)?.ok_or(FieldValueError::Missing(id))
    }

    /// Take the value of `id` if present.
    pub fn take_optional<T: Any>(&mut self, id: i16) -> Result<Option<T>, FieldValueError> {
        match self.values.remove(&id) {
            None => Ok(None),
            Some(value) => value
                .downcast::<T>()
                .map(|value| Some(*value))
                .map_err(|_| FieldValueError::WrongType {
                    id,
                    expected: std::any::type_name::<T>(),
                }),
        }
    }

    pub fn take_or_default<T: Any + Default>(&mut self, id: i16) -> Result<T, FieldValueError> {
        Ok(self.take_optional(id)?.unwrap_or_default())
    }
}

impl fmt::Debug for FieldValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// A constructor taking field values as parameters.
pub struct ConstructorInjection {
    name: String,
    target: AppType,
    params: Vec<i16>,
    construct: Box<Construct>,
}

impl ConstructorInjection {
    /// `params` lists the field id bound to each parameter position.
    pub fn new<T, C>(name: &str, params: &[i16], construct: C) -> Self
    where
        T: Any + Send + Sync,
        C: Fn(&mut FieldValues) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let construct = move |values: &mut FieldValues| -> Result<ThriftValue, BoxError> {
            Ok(Box::new(construct(values)?))
        };
        Self {
            name: name.to_owned(),
            target: AppType::of::<T>(),
            params: params.to_vec(),
            construct: Box::new(construct),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of the constructed instance.
    pub fn target(&self) -> AppType {
        self.target
    }

    pub fn params(&self) -> &[i16] {
        &self.params
    }

    pub(crate) fn invoke(&self, values: &mut FieldValues) -> Result<ThriftValue, BoxError> {
        (self.construct)(values)
    }
}

impl fmt::Debug for ConstructorInjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInjection")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// A builder type: its constructor, then a finishing method producing the
/// structure.
pub struct BuilderInjection {
    constructor: ConstructorInjection,
    build_method: String,
    result: AppType,
    build: Box<Finish>,
}

impl BuilderInjection {
    pub fn new<B, R, F>(constructor: ConstructorInjection, build_method: &str, build: F) -> Self
    where
        B: Any + Send + Sync,
        R: Any + Send + Sync,
        F: Fn(B) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        let build = move |builder: ThriftValue| -> Result<ThriftValue, BoxError> {
            let builder = builder
                .downcast::<B>()
                .map_err(|_| Box::new(Error::mismatch::<B>()) as BoxError)?;
            Ok(Box::new(build(*builder)?))
        };
        Self {
            constructor,
            build_method: build_method.to_owned(),
            result: AppType::of::<R>(),
            build: Box::new(build),
        }
    }

    pub fn constructor(&self) -> &ConstructorInjection {
        &self.constructor
    }

    pub fn builder_type(&self) -> AppType {
        self.constructor.target()
    }

    pub fn build_method(&self) -> &str {
        &self.build_method
    }

    /// Declared result of the finishing method.
    pub fn result_type(&self) -> AppType {
        self.result
    }

    pub(crate) fn finish(&self, builder: ThriftValue) -> Result<ThriftValue, BoxError> {
        (self.build)(builder)
    }
}

impl fmt::Debug for BuilderInjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderInjection")
            .field("constructor", &self.constructor)
            .field("build_method", &self.build_method)
            .finish()
    }
}

/// How a structure instance comes into existence.
#[derive(Debug)]
pub enum ConstructionStrategy {
    Constructor(ConstructorInjection),
    Builder(BuilderInjection),
}

impl ConstructionStrategy {
    /// Constructor invoked first: the structure's own, or the builder's.
    pub fn constructor(&self) -> &ConstructorInjection {
        match self {
            Self::Constructor(constructor) => constructor,
            Self::Builder(builder) => builder.constructor(),
        }
    }

    pub fn builder(&self) -> Option<&BuilderInjection> {
        match self {
            Self::Constructor(_) => None,
            Self::Builder(builder) => Some(builder),
        }
    }

    /// Type of the instance while injections are applied.
    pub fn instance_type(&self) -> AppType {
        self.constructor().target()
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Constructor(constructor) => format!("constructor {}", constructor.name()),
            Self::Builder(builder) => format!("builder constructor {}", builder.constructor().name()),
        }
    }
}

/// A method called on the instance after construction, receiving the
/// values of several fields at once.
pub struct MethodInjection {
    name: String,
    target: AppType,
    params: Vec<i16>,
    apply: Box<Apply>,
}

impl MethodInjection {
    pub fn new<T, M>(name: &str, params: &[i16], apply: M) -> Self
    where
        T: Any,
        M: Fn(&mut T, &mut FieldValues) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let apply = move |instance: &mut dyn Any, values: &mut FieldValues| -> Result<(), BoxError> {
            let instance = instance
                .downcast_mut::<T>()
                .ok_or_else(|| Box::new(Error::mismatch::<T>()) as BoxError)?;
            apply(instance, values)
        };
        Self {
            name: name.to_owned(),
            target: AppType::of::<T>(),
            params: params.to_vec(),
            apply: Box::new(apply),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> AppType {
        self.target
    }

    pub fn params(&self) -> &[i16] {
        &self.params
    }

    pub(crate) fn invoke(&self, instance: &mut dyn Any, values: &mut FieldValues) -> Result<(), BoxError> {
        (self.apply)(instance, values)
    }
}

impl fmt::Debug for MethodInjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInjection")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}
