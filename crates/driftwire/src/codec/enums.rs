// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::ThriftCodec;
use crate::error::{Error, Result};
use crate::metadata::EnumMetadata;
use crate::protocol::{TProtocolReader, TProtocolWriter};
use crate::types::ThriftType;
use crate::value::ThriftValue;
use std::any::Any;
use std::sync::Arc;

/// Enum codec: the variant's i32 value on the wire.
pub struct EnumCodec {
    thrift_type: ThriftType,
    metadata: Arc<EnumMetadata>,
}

impl EnumCodec {
    pub fn new(thrift_type: ThriftType, metadata: Arc<EnumMetadata>) -> Self {
        Self {
            thrift_type,
            metadata,
        }
    }
}

impl ThriftCodec for EnumCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        let value = reader.read_i32()?;
        self.metadata
            .decode(value)
            .ok_or_else(|| Error::UnknownEnumValue {
                enum_name: self.metadata.name().to_owned(),
                value,
            })
    }

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
        let value = self.metadata.encode(value).ok_or(Error::TypeMismatch {
            expected: self.metadata.app_type().name(),
        })?;
        writer.write_i32(value)
    }
}
