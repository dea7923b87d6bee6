// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct codec: the field loop and instance construction.
//!
//! Writing walks fields in ascending id order and emits every present
//! value. Reading stages decoded values by field, skipping ids it does not
//! know and values whose wire type differs from the declaration, then
//! builds the instance:
//!
//! 1. fail if a required field is missing;
//! 2. call the constructor (or builder constructor) with the staged values
//!    of its parameters, zero-filling absent non-optional ones;
//! 3. apply field, setter and builder-method injections of present fields;
//! 4. call post-construction methods that have at least one value;
//! 5. finish the builder, if any, and check the result type.
//!
//! A value consumed by several injections is cloned for all but its last use.

use super::ThriftCodec;
use crate::error::{BoxError, Error, FieldValueError, Result};
use crate::metadata::{FieldMetadata, FieldValues, InjectAction, Requiredness, StructMetadata};
use crate::protocol::{TFieldHeader, TProtocolReader, TProtocolWriter};
use crate::types::ThriftType;
use crate::value::ThriftValue;
use std::any::Any;
use std::sync::Arc;

/// Metadata-driven codec for one structure type.
pub struct StructCodec {
    thrift_type: ThriftType,
    metadata: Arc<StructMetadata>,
    fields: Vec<Arc<dyn ThriftCodec>>,
}

/// Decoded values of one read, indexed like the metadata's fields.
struct Staged {
    values: Vec<Option<ThriftValue>>,
    remaining: Vec<usize>,
}

impl Staged {
    fn new(len: usize) -> Self {
        Self {
            values: (0..len).map(|_| None).collect(),
            remaining: vec![0; len],
        }
    }

    fn put(&mut self, index: usize, uses: usize, value: ThriftValue) {
        self.values[index] = Some(value);
        self.remaining[index] = uses;
    }

    fn has(&self, index: usize) -> bool {
        self.values[index].is_some()
    }

    /// Hand out the value for one use: a clone while further uses remain,
    /// the value itself on the last one.
    fn claim(&mut self, index: usize, field: &FieldMetadata) -> std::result::Result<Option<ThriftValue>, BoxError> {
        let Some(value) = self.values[index].as_ref() else {
            return Ok(None);
        };
        if self.remaining[index] > 1 {
            self.remaining[index] -= 1;
            let copy = field
                .clone_value(&**value)
                .ok_or_else(|| format!("{} values cannot be cloned", field.value_type()))?;
            return Ok(Some(copy));
        }
        self.remaining[index] = 0;
        Ok(self.values[index].take())
    }
}

impl StructCodec {
    pub(crate) fn new(
        thrift_type: ThriftType,
        metadata: Arc<StructMetadata>,
        fields: Vec<Arc<dyn ThriftCodec>>,
    ) -> Self {
        Self {
            thrift_type,
            metadata,
            fields,
        }
    }

    pub fn metadata(&self) -> &Arc<StructMetadata> {
        &self.metadata
    }

    /// Index of the field a header can be decoded into.
    fn decodable(&self, header: TFieldHeader) -> Option<usize> {
        let index = self.metadata.field_index(header.id)?;
        let declared = self.fields[index].thrift_type().ttype();
        (declared == header.ttype && self.metadata.uses(index) > 0).then_some(index)
    }

    fn field_failure(&self, field: &FieldMetadata, source: BoxError) -> Error {
        Error::construction(self.metadata.name(), Some(field.location()), source)
    }

    /// Attach field context to coercion and value-type failures; wire errors
    /// and nested construction errors pass through unchanged.
    fn localize(&self, field: &FieldMetadata, err: Error) -> Error {
        match err {
            Error::Coercion { .. } | Error::TypeMismatch { .. } => self.field_failure(field, Box::new(err)),
            other => other,
        }
    }

    /// Wrap a failure raised by a constructor or method, locating the field
    /// when it came from taking a staged value.
    fn application_failure(&self, source: BoxError) -> Error {
        let field = match source.downcast_ref::<FieldValueError>() {
            Some(FieldValueError::Missing(id) | FieldValueError::WrongType { id, .. }) => {
                self.metadata.field(*id).map(FieldMetadata::location)
            }
            None => None,
        };
        Error::construction(self.metadata.name(), field, source)
    }

    fn construct(&self, mut staged: Staged) -> Result<ThriftValue> {
        let metadata = &*self.metadata;
        let fields = metadata.fields();

        for (index, field) in fields.iter().enumerate() {
            if field.requiredness() == Requiredness::Required
                && metadata.uses(index) > 0
                && !staged.has(index)
            {
                return Err(Error::MissingRequiredField {
                    struct_name: metadata.name().to_owned(),
                    field: field.location(),
                });
            }
        }

        let strategy = metadata.strategy();
        let constructor = strategy.constructor();
        let mut args = FieldValues::new();
        for &id in constructor.params() {
            let Some(index) = metadata.field_index(id) else {
                continue;
            };
            let field = &fields[index];
            match staged.claim(index, field).map_err(|source| self.field_failure(field, source))? {
                Some(value) => args.insert(id, value),
                None if field.requiredness() != Requiredness::Optional => {
                    if let Some(zero) = field.zero_value() {
                        args.insert(id, zero);
                    }
                }
                None => {}
            }
        }
        let mut instance = constructor
            .invoke(&mut args)
            .map_err(|source| self.application_failure(source))?;

        for (index, field) in fields.iter().enumerate() {
            for injection in field.instance_injections() {
                let claimed = staged
                    .claim(index, field)
                    .map_err(|source| self.field_failure(field, source))?;
                let Some(value) = claimed else {
                    break;
                };
                match &injection.action {
                    InjectAction::Set(set) => {
                        set(&mut *instance, value).map_err(|source| self.field_failure(field, source))?;
                    }
                    InjectAction::Chain(chain) => {
                        instance = chain(instance, value).map_err(|source| self.field_failure(field, source))?;
                    }
                    InjectAction::Parameter { .. } => {}
                }
            }
        }

        for method in metadata.methods() {
            let indices: Vec<usize> = method
                .params()
                .iter()
                .filter_map(|&id| metadata.field_index(id))
                .collect();
            if !indices.iter().any(|&index| staged.has(index)) {
                continue;
            }
            let mut values = FieldValues::new();
            for index in indices {
                let field = &fields[index];
                let claimed = staged
                    .claim(index, field)
                    .map_err(|source| self.field_failure(field, source))?;
                if let Some(value) = claimed {
                    values.insert(field.id(), value);
                }
            }
            method
                .invoke(&mut *instance, &mut values)
                .map_err(|source| self.application_failure(source))?;
        }

        if let Some(builder) = strategy.builder() {
            instance = builder
                .finish(instance)
                .map_err(|source| Error::construction(metadata.name(), None, source))?;
        }
        if (*instance).type_id() != metadata.target().id() {
            return Err(Error::construction(
                metadata.name(),
                None,
                format!("construction did not produce a {}", metadata.target()).into(),
            ));
        }
        Ok(instance)
    }
}

impl ThriftCodec for StructCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        let metadata = &*self.metadata;
        reader.read_struct_begin()?;
        let mut staged = Staged::new(metadata.fields().len());
        loop {
            let header = reader.read_field_begin()?;
            if header.is_stop() {
                break;
            }
            match self.decodable(header) {
                Some(index) => {
                    let field = &metadata.fields()[index];
                    let value = self.fields[index]
                        .read(reader)
                        .map_err(|err| self.localize(field, err))?;
                    let value = match field.coercion() {
                        Some(coercion) => coercion.read(value).map_err(|err| self.localize(field, err))?,
                        None => value,
                    };
                    staged.put(index, metadata.uses(index), value);
                }
                None => {
                    log::trace!(
                        "[StructCodec] {}: skipping field {} ({})",
                        metadata.name(),
                        header.id,
                        header.ttype
                    );
                    reader.skip(header.ttype)?;
                }
            }
            reader.read_field_end()?;
        }
        reader.read_struct_end()?;
        self.construct(staged)
    }

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
        let metadata = &*self.metadata;
        if value.type_id() != metadata.target().id() {
            return Err(Error::TypeMismatch {
                expected: metadata.target().name(),
            });
        }
        writer.write_struct_begin(metadata.name())?;
        for (field, codec) in metadata.fields().iter().zip(&self.fields) {
            let Some(extraction) = field.extraction() else {
                continue;
            };
            let extracted = extraction
                .extract(value)
                .map_err(|source| self.field_failure(field, source))?;
            let Some(extracted) = extracted else {
                if field.requiredness() == Requiredness::Required {
                    return Err(Error::MissingRequiredField {
                        struct_name: metadata.name().to_owned(),
                        field: field.location(),
                    });
                }
                continue;
            };
            let wire = match field.coercion() {
                Some(coercion) => Some(
                    coercion
                        .write(extracted.as_any())
                        .map_err(|err| self.localize(field, err))?,
                ),
                None => None,
            };
            let wire_value = wire.as_ref().unwrap_or(&extracted).as_any();
            writer.write_field_begin(field.name(), codec.thrift_type().ttype(), field.id())?;
            codec
                .write(wire_value, writer)
                .map_err(|err| self.localize(field, err))?;
            writer.write_field_end()?;
        }
        writer.write_field_stop()?;
        writer.write_struct_end()
    }
}
