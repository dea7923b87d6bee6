// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! List, set and map codecs.
//!
//! Each owns the codec(s) of its element types. Reads collect boxed
//! elements and hand them to the descriptor's collection table; writes
//! visit the collection in place.

use super::ThriftCodec;
use crate::config::PREALLOC_LIMIT;
use crate::error::{ProtocolError, Result};
use crate::protocol::{TListHeader, TMapHeader, TProtocolReader, TProtocolWriter, TSetHeader};
use crate::types::{MapOps, SequenceOps, TType, ThriftType};
use crate::value::ThriftValue;
use std::any::Any;
use std::sync::Arc;

fn check_element_type(expected: TType, found: TType, size: usize) -> Result<()> {
    // Empty containers carry no elements, whatever type they announce.
    if size == 0 || expected == found {
        Ok(())
    } else {
        Err(ProtocolError::UnexpectedType { expected, found }.into())
    }
}

fn read_elements(
    reader: &mut dyn TProtocolReader,
    element: &dyn ThriftCodec,
    size: usize,
) -> Result<Vec<ThriftValue>> {
    let mut values = Vec::with_capacity(size.min(PREALLOC_LIMIT));
    for _ in 0..size {
        values.push(element.read(reader)?);
    }
    Ok(values)
}

/// `list<T>` codec.
pub struct ListCodec {
    thrift_type: ThriftType,
    element: Arc<dyn ThriftCodec>,
    ops: SequenceOps,
}

impl ListCodec {
    pub(crate) fn new(thrift_type: ThriftType, element: Arc<dyn ThriftCodec>, ops: SequenceOps) -> Self {
        Self {
            thrift_type,
            element,
            ops,
        }
    }

    pub fn element_codec(&self) -> &Arc<dyn ThriftCodec> {
        &self.element
    }
}

impl ThriftCodec for ListCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        let header = reader.read_list_begin()?;
        check_element_type(self.element.thrift_type().ttype(), header.element_type, header.size)?;
        let values = read_elements(reader, &*self.element, header.size)?;
        reader.read_list_end()?;
        (self.ops.collect)(values)
    }

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
        let size = (self.ops.len)(value)?;
        writer.write_list_begin(TListHeader {
            element_type: self.element.thrift_type().ttype(),
            size,
        })?;
        (self.ops.visit)(value, &mut |element| self.element.write(element, writer))?;
        writer.write_list_end()
    }
}

/// `set<T>` codec.
pub struct SetCodec {
    thrift_type: ThriftType,
    element: Arc<dyn ThriftCodec>,
    ops: SequenceOps,
}

impl SetCodec {
    pub(crate) fn new(thrift_type: ThriftType, element: Arc<dyn ThriftCodec>, ops: SequenceOps) -> Self {
        Self {
            thrift_type,
            element,
            ops,
        }
    }

    pub fn element_codec(&self) -> &Arc<dyn ThriftCodec> {
        &self.element
    }
}

impl ThriftCodec for SetCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        let header = reader.read_set_begin()?;
        check_element_type(self.element.thrift_type().ttype(), header.element_type, header.size)?;
        let values = read_elements(reader, &*self.element, header.size)?;
        reader.read_set_end()?;
        (self.ops.collect)(values)
    }

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
        let size = (self.ops.len)(value)?;
        writer.write_set_begin(TSetHeader {
            element_type: self.element.thrift_type().ttype(),
            size,
        })?;
        (self.ops.visit)(value, &mut |element| self.element.write(element, writer))?;
        writer.write_set_end()
    }
}

/// `map<K, V>` codec.
pub struct MapCodec {
    thrift_type: ThriftType,
    key: Arc<dyn ThriftCodec>,
    value: Arc<dyn ThriftCodec>,
    ops: MapOps,
}

impl MapCodec {
    pub(crate) fn new(
        thrift_type: ThriftType,
        key: Arc<dyn ThriftCodec>,
        value: Arc<dyn ThriftCodec>,
        ops: MapOps,
    ) -> Self {
        Self {
            thrift_type,
            key,
            value,
            ops,
        }
    }
}

impl ThriftCodec for MapCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        let header = reader.read_map_begin()?;
        check_element_type(self.key.thrift_type().ttype(), header.key_type, header.size)?;
        check_element_type(self.value.thrift_type().ttype(), header.value_type, header.size)?;
        let mut entries = Vec::with_capacity(header.size.min(PREALLOC_LIMIT));
        for _ in 0..header.size {
            let key = self.key.read(reader)?;
            let value = self.value.read(reader)?;
            entries.push((key, value));
        }
        reader.read_map_end()?;
        (self.ops.collect)(entries)
    }

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
        let size = (self.ops.len)(value)?;
        writer.write_map_begin(TMapHeader {
            key_type: self.key.thrift_type().ttype(),
            value_type: self.value.thrift_type().ttype(),
            size,
        })?;
        (self.ops.visit)(value, &mut |key, entry| {
            self.key.write(key, writer)?;
            self.value.write(entry, writer)
        })?;
        writer.write_map_end()
    }
}
