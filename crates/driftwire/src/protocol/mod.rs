// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Protocol reader/writer abstraction.
//!
//! Codecs drive a [`TProtocolReader`] or [`TProtocolWriter`]; the concrete
//! byte layout belongs to the implementation. [`binary`] provides the
//! classic Thrift binary layout over in-memory buffers.

pub mod binary;

pub use binary::{BinaryProtocolReader, BinaryProtocolWriter};

use crate::error::{ProtocolError, Result};
use crate::types::TType;

/// Field header. A header with `ttype == TType::Stop` ends the struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TFieldHeader {
    pub ttype: TType,
    pub id: i16,
}

impl TFieldHeader {
    pub const STOP: Self = Self {
        ttype: TType::Stop,
        id: 0,
    };

    pub fn new(ttype: TType, id: i16) -> Self {
        Self { ttype, id }
    }

    pub fn is_stop(&self) -> bool {
        self.ttype == TType::Stop
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TListHeader {
    pub element_type: TType,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TSetHeader {
    pub element_type: TType,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TMapHeader {
    pub key_type: TType,
    pub value_type: TType,
    pub size: usize,
}

/// Source of encoded values.
pub trait TProtocolReader {
    fn read_struct_begin(&mut self) -> Result<()>;
    fn read_struct_end(&mut self) -> Result<()>;
    fn read_field_begin(&mut self) -> Result<TFieldHeader>;
    fn read_field_end(&mut self) -> Result<()>;

    fn read_bool(&mut self) -> Result<bool>;
    fn read_byte(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_double(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;
    fn read_binary(&mut self) -> Result<Vec<u8>>;

    fn read_list_begin(&mut self) -> Result<TListHeader>;
    fn read_list_end(&mut self) -> Result<()>;
    fn read_set_begin(&mut self) -> Result<TSetHeader>;
    fn read_set_end(&mut self) -> Result<()>;
    fn read_map_begin(&mut self) -> Result<TMapHeader>;
    fn read_map_end(&mut self) -> Result<()>;

    /// Maximum nesting accepted by [`skip`](Self::skip).
    fn max_depth(&self) -> usize {
        crate::config::DEFAULT_MAX_DEPTH
    }

    /// Consume and discard one value of the given wire type.
    fn skip(&mut self, ttype: TType) -> Result<()> {
        skip_value(self, ttype, 0)
    }
}

/// Sink for encoded values.
pub trait TProtocolWriter {
    fn write_struct_begin(&mut self, name: &str) -> Result<()>;
    fn write_struct_end(&mut self) -> Result<()>;
    fn write_field_begin(&mut self, name: &str, ttype: TType, id: i16) -> Result<()>;
    fn write_field_end(&mut self) -> Result<()>;
    fn write_field_stop(&mut self) -> Result<()>;

    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_byte(&mut self, value: i8) -> Result<()>;
    fn write_i16(&mut self, value: i16) -> Result<()>;
    fn write_i32(&mut self, value: i32) -> Result<()>;
    fn write_i64(&mut self, value: i64) -> Result<()>;
    fn write_double(&mut self, value: f64) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
    fn write_binary(&mut self, value: &[u8]) -> Result<()>;

    fn write_list_begin(&mut self, header: TListHeader) -> Result<()>;
    fn write_list_end(&mut self) -> Result<()>;
    fn write_set_begin(&mut self, header: TSetHeader) -> Result<()>;
    fn write_set_end(&mut self) -> Result<()>;
    fn write_map_begin(&mut self, header: TMapHeader) -> Result<()>;
    fn write_map_end(&mut self) -> Result<()>;
}

/// Recursive skip shared by all readers.
pub fn skip_value<R: TProtocolReader + ?Sized>(reader: &mut R, ttype: TType, depth: usize) -> Result<()> {
    if depth > reader.max_depth() {
        return Err(ProtocolError::DepthLimit(reader.max_depth()).into());
    }
    match ttype {
        TType::Stop | TType::Void => return Err(ProtocolError::InvalidType(ttype.as_u8()).into()),
        TType::Bool => {
            reader.read_bool()?;
        }
        TType::Byte => {
            reader.read_byte()?;
        }
        TType::I16 => {
            reader.read_i16()?;
        }
        TType::I32 => {
            reader.read_i32()?;
        }
        TType::I64 => {
            reader.read_i64()?;
        }
        TType::Double => {
            reader.read_double()?;
        }
        TType::String => {
            reader.read_binary()?;
        }
        TType::Struct => {
            reader.read_struct_begin()?;
            loop {
                let header = reader.read_field_begin()?;
                if header.is_stop() {
                    break;
                }
                skip_value(reader, header.ttype, depth + 1)?;
                reader.read_field_end()?;
            }
            reader.read_struct_end()?;
        }
        TType::Map => {
            let header = reader.read_map_begin()?;
            for _ in 0..header.size {
                skip_value(reader, header.key_type, depth + 1)?;
                skip_value(reader, header.value_type, depth + 1)?;
            }
            reader.read_map_end()?;
        }
        TType::Set => {
            let header = reader.read_set_begin()?;
            for _ in 0..header.size {
                skip_value(reader, header.element_type, depth + 1)?;
            }
            reader.read_set_end()?;
        }
        TType::List => {
            let header = reader.read_list_begin()?;
            for _ in 0..header.size {
                skip_value(reader, header.element_type, depth + 1)?;
            }
            reader.read_list_end()?;
        }
    }
    Ok(())
}
