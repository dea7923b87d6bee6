// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::ThriftCodec;
use crate::coercion::TypeCoercion;
use crate::error::Result;
use crate::protocol::{TProtocolReader, TProtocolWriter};
use crate::types::ThriftType;
use crate::value::ThriftValue;
use std::any::Any;
use std::sync::Arc;

/// Wraps the wire-native codec with a coercion.
pub struct CoercionCodec {
    thrift_type: ThriftType,
    inner: Arc<dyn ThriftCodec>,
    coercion: Arc<TypeCoercion>,
}

impl CoercionCodec {
    pub fn new(thrift_type: ThriftType, inner: Arc<dyn ThriftCodec>, coercion: Arc<TypeCoercion>) -> Self {
        Self {
            thrift_type,
            inner,
            coercion,
        }
    }
}

impl ThriftCodec for CoercionCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        let wire = self.inner.read(reader)?;
        self.coercion.read(wire)
    }

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
        let wire = self.coercion.write(value)?;
        self.inner.write(wire.as_any(), writer)
    }
}
