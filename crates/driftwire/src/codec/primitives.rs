// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builtin codecs for the primitive descriptors.

use super::{downcast, ThriftCodec};
use crate::error::Result;
use crate::protocol::{TProtocolReader, TProtocolWriter};
use crate::types::ThriftType;
use crate::value::ThriftValue;
use crate::ThriftCatalog;
use std::any::Any;
use std::sync::Arc;

macro_rules! primitive_codec {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $read:ident, $write:ident) => {
        $(#[$meta])*
        pub struct $name {
            thrift_type: ThriftType,
        }

        impl $name {
            pub fn new(thrift_type: ThriftType) -> Self {
                Self { thrift_type }
            }
        }

        impl ThriftCodec for $name {
            fn thrift_type(&self) -> &ThriftType {
                &self.thrift_type
            }

            fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
                Ok(Box::new(reader.$read()?))
            }

            fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
                writer.$write(*downcast::<$ty>(value)?)
            }
        }
    };
}

primitive_codec!(BoolCodec, bool, read_bool, write_bool);
primitive_codec!(
    /// `byte`, carried as `i8`.
    ByteCodec, i8, read_byte, write_byte
);
primitive_codec!(I16Codec, i16, read_i16, write_i16);
primitive_codec!(I32Codec, i32, read_i32, write_i32);
primitive_codec!(I64Codec, i64, read_i64, write_i64);
primitive_codec!(DoubleCodec, f64, read_double, write_double);

pub struct StringCodec {
    thrift_type: ThriftType,
}

impl StringCodec {
    pub fn new(thrift_type: ThriftType) -> Self {
        Self { thrift_type }
    }
}

impl ThriftCodec for StringCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        Ok(Box::new(reader.read_string()?))
    }

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
        writer.write_string(downcast::<String>(value)?)
    }
}

/// `binary`, carried as `Vec<u8>`.
pub struct BinaryCodec {
    thrift_type: ThriftType,
}

impl BinaryCodec {
    pub fn new(thrift_type: ThriftType) -> Self {
        Self { thrift_type }
    }
}

impl ThriftCodec for BinaryCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        Ok(Box::new(reader.read_binary()?))
    }

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
        writer.write_binary(downcast::<Vec<u8>>(value)?)
    }
}

/// `void` has no encoding.
pub struct VoidCodec {
    thrift_type: ThriftType,
}

impl VoidCodec {
    pub fn new(thrift_type: ThriftType) -> Self {
        Self { thrift_type }
    }
}

impl ThriftCodec for VoidCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, _reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        Ok(Box::new(()))
    }

    fn write(&self, value: &dyn Any, _writer: &mut dyn TProtocolWriter) -> Result<()> {
        downcast::<()>(value).map(|_| ())
    }
}

/// Singleton codecs for every builtin descriptor of `catalog`.
pub(crate) fn builtin_codecs(catalog: &ThriftCatalog) -> Vec<Arc<dyn ThriftCodec>> {
    vec![
        Arc::new(BoolCodec::new(catalog.bool_type())),
        Arc::new(ByteCodec::new(catalog.byte_type())),
        Arc::new(I16Codec::new(catalog.i16_type())),
        Arc::new(I32Codec::new(catalog.i32_type())),
        Arc::new(I64Codec::new(catalog.i64_type())),
        Arc::new(DoubleCodec::new(catalog.double_type())),
        Arc::new(StringCodec::new(catalog.string_type())),
        Arc::new(BinaryCodec::new(catalog.binary_type())),
        Arc::new(VoidCodec::new(catalog.void_type())),
    ]
}
