// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::points::{ExtractionPoint, InjectionKind, InjectionPoint};
use crate::coercion::TypeCoercion;
use crate::error::FieldLocation;
use crate::types::{AppType, ThriftType};
use crate::value::ThriftValue;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Thrift field requiredness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requiredness {
    /// Must be present on write and on read.
    Required,
    /// May be absent; absent values stay absent.
    Optional,
    /// Written when present; zero-filled when absent on read.
    #[default]
    Default,
}

/// One field of a structure.
pub struct FieldMetadata {
    id: i16,
    name: String,
    thrift_type: ThriftType,
    requiredness: Requiredness,
    coercion: Option<Arc<TypeCoercion>>,
    extraction: Option<ExtractionPoint>,
    injections: Vec<InjectionPoint>,
}

impl FieldMetadata {
    pub fn builder(id: i16, name: &str, thrift_type: ThriftType) -> FieldBuilder {
        FieldBuilder {
            field: Self {
                id,
                name: name.to_owned(),
                thrift_type,
                requiredness: Requiredness::Default,
                coercion: None,
                extraction: None,
                injections: Vec::new(),
            },
        }
    }

    pub fn id(&self) -> i16 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared wire descriptor.
    pub fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    pub fn requiredness(&self) -> Requiredness {
        self.requiredness
    }

    pub fn coercion(&self) -> Option<&Arc<TypeCoercion>> {
        self.coercion.as_ref()
    }

    pub fn extraction(&self) -> Option<&ExtractionPoint> {
        self.extraction.as_ref()
    }

    pub fn injections(&self) -> &[InjectionPoint] {
        &self.injections
    }

    pub fn is_readable(&self) -> bool {
        self.extraction.is_some()
    }

    pub fn is_writable(&self) -> bool {
        !self.injections.is_empty()
    }

    pub fn is_read_only(&self) -> bool {
        self.injections.is_empty()
    }

    pub fn is_write_only(&self) -> bool {
        self.extraction.is_none()
    }

    /// Type of the values the instance holds: the coercion's application
    /// type when the field is coerced, the descriptor's type otherwise.
    pub fn value_type(&self) -> AppType {
        match &self.coercion {
            Some(coercion) => coercion.app(),
            None => self.thrift_type.app_type(),
        }
    }

    pub fn location(&self) -> FieldLocation {
        FieldLocation::new(self.id, self.name.clone())
    }

    pub(crate) fn parameter_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.injections.iter().filter_map(InjectionPoint::parameter_index)
    }

    /// Injections applied to an existing instance, in declaration order.
    pub(crate) fn instance_injections(&self) -> impl Iterator<Item = &InjectionPoint> {
        self.injections
            .iter()
            .filter(|injection| injection.kind() != InjectionKind::Parameter)
    }

    pub(crate) fn is_value_cloneable(&self) -> bool {
        match &self.coercion {
            Some(coercion) => coercion.cloner().is_some(),
            None => self.thrift_type.is_cloneable(),
        }
    }

    pub(crate) fn clone_value(&self, value: &dyn Any) -> Option<ThriftValue> {
        match &self.coercion {
            Some(coercion) => coercion.cloner().and_then(|cloner| cloner(value)),
            None => self.thrift_type.clone_value(value),
        }
    }

    pub(crate) fn zero_value(&self) -> Option<ThriftValue> {
        let zero = self.thrift_type.zero_value()?;
        match &self.coercion {
            Some(coercion) => coercion.from_thrift(zero).ok(),
            None => Some(zero),
        }
    }
}

impl fmt::Debug for FieldMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMetadata")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.thrift_type.name())
            .field("requiredness", &self.requiredness)
            .field("extraction", &self.extraction)
            .field("injections", &self.injections)
            .finish()
    }
}

/// Builder for [`FieldMetadata`].
pub struct FieldBuilder {
    field: FieldMetadata,
}

impl FieldBuilder {
    #[must_use]
    pub fn requiredness(mut self, requiredness: Requiredness) -> Self {
        self.field.requiredness = requiredness;
        self
    }

    #[must_use]
    pub fn required(self) -> Self {
        self.requiredness(Requiredness::Required)
    }

    #[must_use]
    pub fn optional(self) -> Self {
        self.requiredness(Requiredness::Optional)
    }

    /// Per-field coercion from the declared descriptor's values.
    #[must_use]
    pub fn coercion(mut self, coercion: Arc<TypeCoercion>) -> Self {
        self.field.coercion = Some(coercion);
        self
    }

    #[must_use]
    pub fn extraction(mut self, extraction: ExtractionPoint) -> Self {
        self.field.extraction = Some(extraction);
        self
    }

    #[must_use]
    pub fn injection(mut self, injection: InjectionPoint) -> Self {
        self.field.injections.push(injection);
        self
    }

    pub fn build(self) -> FieldMetadata {
        self.field
    }
}
