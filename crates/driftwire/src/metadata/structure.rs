// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structure metadata and its validating builder.

use super::construction::{BuilderInjection, ConstructionStrategy, ConstructorInjection, MethodInjection};
use super::field::FieldMetadata;
use super::points::InjectionKind;
use crate::error::MetadataError;
use crate::types::AppType;
use std::any::Any;
use std::fmt;

/// Validated description of one structure type.
pub struct StructMetadata {
    name: String,
    target: AppType,
    fields: Vec<FieldMetadata>,
    uses: Vec<usize>,
    strategy: ConstructionStrategy,
    methods: Vec<MethodInjection>,
}

impl StructMetadata {
    /// Start describing structure `T`, named `name` on the wire.
    pub fn builder<T: Any>(name: &str) -> StructMetadataBuilder {
        StructMetadataBuilder {
            name: name.to_owned(),
            target: AppType::of::<T>(),
            fields: Vec::new(),
            strategies: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> AppType {
        self.target
    }

    /// Fields in ascending id order.
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    pub fn field(&self, id: i16) -> Option<&FieldMetadata> {
        self.field_index(id).map(|index| &self.fields[index])
    }

    pub fn field_index(&self, id: i16) -> Option<usize> {
        self.fields.binary_search_by_key(&id, FieldMetadata::id).ok()
    }

    pub fn strategy(&self) -> &ConstructionStrategy {
        &self.strategy
    }

    pub fn methods(&self) -> &[MethodInjection] {
        &self.methods
    }

    /// How many times a decoded value of the field at `index` is consumed
    /// during construction. Zero means the field is never decoded.
    pub fn uses(&self, index: usize) -> usize {
        self.uses.get(index).copied().unwrap_or(0)
    }
}

impl fmt::Debug for StructMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructMetadata")
            .field("name", &self.name)
            .field("target", &self.target.name())
            .field("fields", &self.fields)
            .field("strategy", &self.strategy)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Collects fields and strategies, then validates them in [`build`](Self::build).
pub struct StructMetadataBuilder {
    name: String,
    target: AppType,
    fields: Vec<FieldMetadata>,
    strategies: Vec<ConstructionStrategy>,
    methods: Vec<MethodInjection>,
}

impl StructMetadataBuilder {
    #[must_use]
    pub fn field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn constructor(mut self, constructor: ConstructorInjection) -> Self {
        self.strategies.push(ConstructionStrategy::Constructor(constructor));
        self
    }

    #[must_use]
    pub fn builder(mut self, builder: BuilderInjection) -> Self {
        self.strategies.push(ConstructionStrategy::Builder(builder));
        self
    }

    /// Method applied after construction.
    #[must_use]
    pub fn method(mut self, method: MethodInjection) -> Self {
        self.methods.push(method);
        self
    }

    pub fn build(self) -> Result<StructMetadata, MetadataError> {
        let Self {
            name,
            target,
            mut fields,
            mut strategies,
            methods,
        } = self;

        fields.sort_by_key(FieldMetadata::id);
        for (index, field) in fields.iter().enumerate() {
            if field.id() < 0 {
                return Err(MetadataError::NegativeFieldId {
                    struct_name: name,
                    id: field.id(),
                });
            }
            if index > 0 && fields[index - 1].id() == field.id() {
                return Err(MetadataError::DuplicateFieldId {
                    struct_name: name,
                    id: field.id(),
                });
            }
        }

        let strategy = match strategies.len() {
            0 => return Err(MetadataError::MissingConstructor { struct_name: name }),
            1 => strategies.remove(0),
            _ => return Err(MetadataError::DuplicateConstructor { struct_name: name }),
        };
        let validator = Validator {
            name: &name,
            target,
            fields: &fields,
            strategy: &strategy,
        };
        validator.check_strategy()?;
        validator.check_parameters()?;
        for field in &fields {
            validator.check_points(field)?;
        }
        validator.check_methods(&methods)?;
        let uses = validator.count_uses(&methods)?;

        Ok(StructMetadata {
            name,
            target,
            fields,
            uses,
            strategy,
            methods,
        })
    }
}

struct Validator<'a> {
    name: &'a str,
    target: AppType,
    fields: &'a [FieldMetadata],
    strategy: &'a ConstructionStrategy,
}

impl Validator<'_> {
    fn target_mismatch(&self, point: String, expected: AppType, found: AppType) -> MetadataError {
        MetadataError::TargetMismatch {
            struct_name: self.name.to_owned(),
            point,
            expected: expected.name(),
            found: found.name(),
        }
    }

    fn check_strategy(&self) -> Result<(), MetadataError> {
        match self.strategy {
            ConstructionStrategy::Constructor(constructor) => {
                if constructor.target() != self.target {
                    return Err(self.target_mismatch(
                        format!("constructor {}", constructor.name()),
                        self.target,
                        constructor.target(),
                    ));
                }
            }
            ConstructionStrategy::Builder(builder) => {
                if builder.result_type() != self.target {
                    return Err(MetadataError::BuilderResultMismatch {
                        struct_name: self.name.to_owned(),
                        method: builder.build_method().to_owned(),
                        expected: self.target.name(),
                        found: builder.result_type().name(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_parameters(&self) -> Result<(), MetadataError> {
        let params = self.strategy.constructor().params();
        for field in self.fields {
            for index in field.parameter_indices() {
                if params.get(index) != Some(&field.id()) {
                    return Err(MetadataError::UnboundParameter {
                        struct_name: self.name.to_owned(),
                        field: field.location(),
                        index,
                        strategy: self.strategy.describe(),
                    });
                }
            }
        }
        for (index, &id) in params.iter().enumerate() {
            let bound = self
                .fields
                .iter()
                .any(|field| field.id() == id && field.parameter_indices().any(|i| i == index));
            if !bound {
                return Err(MetadataError::DanglingParameter {
                    struct_name: self.name.to_owned(),
                    strategy: self.strategy.describe(),
                    index,
                    id,
                });
            }
        }
        Ok(())
    }

    fn check_points(&self, field: &FieldMetadata) -> Result<(), MetadataError> {
        if let Some(coercion) = field.coercion() {
            if coercion.wire() != field.thrift_type() {
                return Err(MetadataError::CoercionMismatch {
                    struct_name: self.name.to_owned(),
                    field: field.location(),
                    expected: coercion.wire().name().to_owned(),
                    found: field.thrift_type().name().to_owned(),
                });
            }
        }

        let value_type = field.value_type();
        if let Some(extraction) = field.extraction() {
            if extraction.target() != self.target {
                return Err(self.target_mismatch(
                    format!("extraction {}", extraction.name()),
                    self.target,
                    extraction.target(),
                ));
            }
            if extraction.value_type() != value_type {
                return Err(self.value_mismatch(field, format!("extraction {}", extraction.name()), extraction.value_type()));
            }
        }

        let instance_type = self.strategy.instance_type();
        for injection in field.instance_injections() {
            if injection.kind() == InjectionKind::BuilderMethod && self.strategy.builder().is_none() {
                return Err(MetadataError::BuilderMethodWithoutBuilder {
                    struct_name: self.name.to_owned(),
                    field: field.location(),
                });
            }
            if let Some(target) = injection.target() {
                if target != instance_type {
                    return Err(self.target_mismatch(
                        format!("injection {}", injection.name()),
                        instance_type,
                        target,
                    ));
                }
            }
            if let Some(injected) = injection.value_type() {
                if injected != value_type {
                    return Err(self.value_mismatch(field, format!("injection {}", injection.name()), injected));
                }
            }
        }
        Ok(())
    }

    fn value_mismatch(&self, field: &FieldMetadata, point: String, found: AppType) -> MetadataError {
        MetadataError::ValueTypeMismatch {
            struct_name: self.name.to_owned(),
            field: field.location(),
            point,
            expected: field.value_type().name(),
            found: found.name(),
        }
    }

    fn check_methods(&self, methods: &[MethodInjection]) -> Result<(), MetadataError> {
        let instance_type = self.strategy.instance_type();
        for method in methods {
            if method.target() != instance_type {
                return Err(self.target_mismatch(
                    format!("method {}", method.name()),
                    instance_type,
                    method.target(),
                ));
            }
            if let Some(&id) = method
                .params()
                .iter()
                .find(|&&id| self.fields.iter().all(|field| field.id() != id))
            {
                return Err(MetadataError::UnknownMethodParameter {
                    struct_name: self.name.to_owned(),
                    method: method.name().to_owned(),
                    id,
                });
            }
        }
        Ok(())
    }

    fn count_uses(&self, methods: &[MethodInjection]) -> Result<Vec<usize>, MetadataError> {
        let params = self.strategy.constructor().params();
        let mut uses = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            let id = field.id();
            let count = params.iter().filter(|&&param| param == id).count()
                + field.instance_injections().count()
                + methods
                    .iter()
                    .map(|method| method.params().iter().filter(|&&param| param == id).count())
                    .sum::<usize>();

            if count == 0 && !field.is_readable() {
                return Err(MetadataError::InaccessibleField {
                    struct_name: self.name.to_owned(),
                    field: field.location(),
                });
            }
            if count > 1 && !field.is_value_cloneable() {
                return Err(MetadataError::UncloneableField {
                    struct_name: self.name.to_owned(),
                    field: field.location(),
                    uses: count,
                    type_name: field.value_type().name().to_owned(),
                });
            }
            uses.push(count);
        }
        Ok(uses)
    }
}
