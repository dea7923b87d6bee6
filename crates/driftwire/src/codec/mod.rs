// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codecs and the codec registry.
//!
//! A codec reads and writes the values of one [`ThriftType`]. Codecs work on
//! type-erased values so that the registry can store and compose them freely;
//! [`TypedThriftCodec`] plus [`TypedCodecAdapter`] let a hand-written codec
//! be expressed against its concrete Rust type instead.

mod coercion;
mod collections;
mod delegate;
mod enums;
mod manager;
mod primitives;
mod structs;

pub use coercion::CoercionCodec;
pub use collections::{ListCodec, MapCodec, SetCodec};
pub use delegate::DelegateCodec;
pub use enums::EnumCodec;
pub use manager::{CodecManager, CodecStats};
pub use primitives::{
    BinaryCodec, BoolCodec, ByteCodec, DoubleCodec, I16Codec, I32Codec, I64Codec, StringCodec,
    VoidCodec,
};
pub use structs::StructCodec;

use crate::error::{Error, Result};
use crate::protocol::{TProtocolReader, TProtocolWriter};
use crate::types::ThriftType;
use crate::value::ThriftValue;
use std::any::Any;
use std::marker::PhantomData;

/// Reads and writes values of one descriptor.
///
/// `read` returns a value whose concrete type is the descriptor's
/// application type; `write` accepts only values of that type.
pub trait ThriftCodec: Send + Sync {
    fn thrift_type(&self) -> &ThriftType;

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue>;

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()>;
}

/// A codec written against a concrete type.
pub trait TypedThriftCodec<T: Any + Send + Sync>: Send + Sync {
    fn thrift_type(&self) -> &ThriftType;

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<T>;

    fn write(&self, value: &T, writer: &mut dyn TProtocolWriter) -> Result<()>;
}

/// Exposes a [`TypedThriftCodec`] as a [`ThriftCodec`].
pub struct TypedCodecAdapter<T, C> {
    inner: C,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C> TypedCodecAdapter<T, C>
where
    T: Any + Send + Sync,
    C: TypedThriftCodec<T>,
{
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<T, C> ThriftCodec for TypedCodecAdapter<T, C>
where
    T: Any + Send + Sync,
    C: TypedThriftCodec<T>,
{
    fn thrift_type(&self) -> &ThriftType {
        self.inner.thrift_type()
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        Ok(Box::new(self.inner.read(reader)?))
    }

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
        let value = value.downcast_ref::<T>().ok_or_else(Error::mismatch::<T>)?;
        self.inner.write(value, writer)
    }
}

#[inline]
pub(crate) fn downcast<'a, T: Any>(value: &'a dyn Any) -> Result<&'a T> {
    value.downcast_ref::<T>().ok_or_else(Error::mismatch::<T>)
}
