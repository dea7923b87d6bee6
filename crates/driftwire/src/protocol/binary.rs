// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Thrift binary protocol over in-memory buffers.
//!
//! Layout (all integers big-endian):
//!
//! | Item          | Encoding                                   |
//! |---------------|--------------------------------------------|
//! | field header  | type byte, i16 id                          |
//! | field stop    | single `0` byte                            |
//! | bool / byte   | one byte                                   |
//! | double        | IEEE 754 bits as i64                       |
//! | string/binary | i32 length, bytes                          |
//! | list / set    | element type byte, i32 size, elements      |
//! | map           | key type byte, value type byte, i32 size   |
//!
//! Struct begin/end, field end and container end markers carry no bytes.

use super::{TFieldHeader, TListHeader, TMapHeader, TProtocolReader, TProtocolWriter, TSetHeader};
use crate::config::CodecConfig;
use crate::error::{ProtocolError, Result};
use crate::types::TType;

/// Reads the binary protocol from a byte slice.
pub struct BinaryProtocolReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    depth: usize,
    config: CodecConfig,
}

impl<'a> BinaryProtocolReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_config(buffer, CodecConfig::default())
    }

    pub fn with_config(buffer: &'a [u8], config: CodecConfig) -> Self {
        Self {
            buffer,
            offset: 0,
            depth: 0,
            config,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(ProtocolError::UnexpectedEof {
                need: count,
                have: self.remaining(),
            }
            .into());
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn read_ttype(&mut self) -> Result<TType> {
        let [code] = self.read_array::<1>()?;
        TType::from_u8(code).ok_or_else(|| ProtocolError::InvalidType(code).into())
    }

    fn read_size(&mut self, limit: usize) -> Result<usize> {
        let size = self.read_i32()?;
        let size = usize::try_from(size).map_err(|_| ProtocolError::NegativeSize(size))?;
        if size > limit {
            return Err(ProtocolError::SizeLimit { size, limit }.into());
        }
        Ok(size)
    }

    fn read_sequence_header(&mut self) -> Result<(TType, usize)> {
        let element_type = self.read_ttype()?;
        let size = self.read_size(self.config.max_container_len)?;
        check_content_type(element_type, size)?;
        Ok((element_type, size))
    }
}

/// Elements of a non-empty container must occupy wire bytes; `stop` and
/// `void` elements would let a short header announce millions of values.
fn check_content_type(ttype: TType, size: usize) -> Result<()> {
    match ttype {
        TType::Stop | TType::Void if size > 0 => Err(ProtocolError::InvalidType(ttype.as_u8()).into()),
        _ => Ok(()),
    }
}

impl TProtocolReader for BinaryProtocolReader<'_> {
    fn read_struct_begin(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(ProtocolError::DepthLimit(self.config.max_depth).into());
        }
        self.depth += 1;
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<TFieldHeader> {
        let ttype = self.read_ttype()?;
        if ttype == TType::Stop {
            return Ok(TFieldHeader::STOP);
        }
        let id = self.read_i16()?;
        Ok(TFieldHeader::new(ttype, id))
    }

    fn read_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_array::<1>()?[0] != 0)
    }

    fn read_byte(&mut self) -> Result<i8> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(u64::from_be_bytes(self.read_array()?)))
    }

    fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_binary()?;
        String::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8.into())
    }

    fn read_binary(&mut self) -> Result<Vec<u8>> {
        let len = self.read_size(self.config.max_string_len)?;
        Ok(self.read_bytes(len)?.to_vec())
    }

    fn read_list_begin(&mut self) -> Result<TListHeader> {
        let (element_type, size) = self.read_sequence_header()?;
        Ok(TListHeader { element_type, size })
    }

    fn read_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<TSetHeader> {
        let (element_type, size) = self.read_sequence_header()?;
        Ok(TSetHeader { element_type, size })
    }

    fn read_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<TMapHeader> {
        let key_type = self.read_ttype()?;
        let value_type = self.read_ttype()?;
        let size = self.read_size(self.config.max_container_len)?;
        check_content_type(key_type, size)?;
        check_content_type(value_type, size)?;
        Ok(TMapHeader {
            key_type,
            value_type,
            size,
        })
    }

    fn read_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn max_depth(&self) -> usize {
        self.config.max_depth
    }
}

/// Writes the binary protocol into a growable buffer.
#[derive(Debug, Default)]
pub struct BinaryProtocolWriter {
    buffer: Vec<u8>,
}

impl BinaryProtocolWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn write_size(&mut self, size: usize) -> Result<()> {
        let size = i32::try_from(size).map_err(|_| ProtocolError::SizeLimit {
            size,
            limit: i32::MAX as usize,
        })?;
        self.write_i32(size)
    }
}

impl TProtocolWriter for BinaryProtocolWriter {
    fn write_struct_begin(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_begin(&mut self, _name: &str, ttype: TType, id: i16) -> Result<()> {
        self.buffer.push(ttype.as_u8());
        self.write_i16(id)
    }

    fn write_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<()> {
        self.buffer.push(TType::Stop.as_u8());
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.buffer.push(u8::from(value));
        Ok(())
    }

    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.buffer.extend_from_slice(&value.to_bits().to_be_bytes());
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_binary(value.as_bytes())
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<()> {
        self.write_size(value.len())?;
        self.buffer.extend_from_slice(value);
        Ok(())
    }

    fn write_list_begin(&mut self, header: TListHeader) -> Result<()> {
        self.buffer.push(header.element_type.as_u8());
        self.write_size(header.size)
    }

    fn write_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_set_begin(&mut self, header: TSetHeader) -> Result<()> {
        self.buffer.push(header.element_type.as_u8());
        self.write_size(header.size)
    }

    fn write_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_map_begin(&mut self, header: TMapHeader) -> Result<()> {
        self.buffer.push(header.key_type.as_u8());
        self.buffer.push(header.value_type.as_u8());
        self.write_size(header.size)
    }

    fn write_map_end(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_primitives_round_trip() {
        let mut writer = BinaryProtocolWriter::new();
        writer.write_bool(true).unwrap();
        writer.write_byte(-3).unwrap();
        writer.write_i16(-300).unwrap();
        writer.write_i32(70_000).unwrap();
        writer.write_i64(-5_000_000_000).unwrap();
        writer.write_double(2.5).unwrap();
        writer.write_string("héllo").unwrap();
        writer.write_binary(&[0, 255]).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = BinaryProtocolReader::new(&bytes);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_byte().unwrap(), -3);
        assert_eq!(reader.read_i16().unwrap(), -300);
        assert_eq!(reader.read_i32().unwrap(), 70_000);
        assert_eq!(reader.read_i64().unwrap(), -5_000_000_000);
        assert_eq!(reader.read_double().unwrap(), 2.5);
        assert_eq!(reader.read_string().unwrap(), "héllo");
        assert_eq!(reader.read_binary().unwrap(), vec![0, 255]);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_wire_layout() {
        let mut writer = BinaryProtocolWriter::new();
        writer.write_field_begin("count", TType::I32, 2).unwrap();
        writer.write_i32(5).unwrap();
        writer.write_field_begin("name", TType::String, 1).unwrap();
        writer.write_string("x").unwrap();
        writer.write_field_stop().unwrap();
        assert_eq!(
            writer.as_bytes(),
            &[8, 0, 2, 0, 0, 0, 5, 11, 0, 1, 0, 0, 0, 1, b'x', 0]
        );
    }

    #[test]
    fn test_truncated_input() {
        let mut reader = BinaryProtocolReader::new(&[0, 0, 1]);
        let err = reader.read_i32().unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::UnexpectedEof { need: 4, have: 3 })
        ));
    }

    #[test]
    fn test_negative_and_oversized_lengths() {
        let bytes = (-1i32).to_be_bytes();
        let mut reader = BinaryProtocolReader::new(&bytes);
        assert!(matches!(
            reader.read_string(),
            Err(Error::Protocol(ProtocolError::NegativeSize(-1)))
        ));

        let mut bytes = vec![TType::I32.as_u8()];
        bytes.extend_from_slice(&100i32.to_be_bytes());
        let config = CodecConfig::default().with_max_container_len(10);
        let mut reader = BinaryProtocolReader::with_config(&bytes, config);
        assert!(matches!(
            reader.read_list_begin(),
            Err(Error::Protocol(ProtocolError::SizeLimit { size: 100, limit: 10 }))
        ));
    }

    #[test]
    fn test_invalid_type_byte() {
        let mut reader = BinaryProtocolReader::new(&[9, 0, 1]);
        assert!(matches!(
            reader.read_field_begin(),
            Err(Error::Protocol(ProtocolError::InvalidType(9)))
        ));
    }

    #[test]
    fn test_skip_nested_values() {
        let mut writer = BinaryProtocolWriter::new();
        // struct { 1: list<string> ["a", "b"], 2: map<i16, bool> {7: true} }
        writer.write_field_begin("names", TType::List, 1).unwrap();
        writer
            .write_list_begin(TListHeader {
                element_type: TType::String,
                size: 2,
            })
            .unwrap();
        writer.write_string("a").unwrap();
        writer.write_string("b").unwrap();
        writer.write_field_begin("flags", TType::Map, 2).unwrap();
        writer
            .write_map_begin(TMapHeader {
                key_type: TType::I16,
                value_type: TType::Bool,
                size: 1,
            })
            .unwrap();
        writer.write_i16(7).unwrap();
        writer.write_bool(true).unwrap();
        writer.write_field_stop().unwrap();
        writer.write_i32(42).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = BinaryProtocolReader::new(&bytes);
        reader.skip(TType::Struct).unwrap();
        assert_eq!(reader.read_i32().unwrap(), 42);
    }

    #[test]
    fn test_zero_width_elements_are_rejected() {
        // struct { 9: list<list<void>> [16M voids] }
        let mut writer = BinaryProtocolWriter::new();
        writer.write_field_begin("blob", TType::List, 9).unwrap();
        writer
            .write_list_begin(TListHeader {
                element_type: TType::List,
                size: 1,
            })
            .unwrap();
        writer
            .write_list_begin(TListHeader {
                element_type: TType::Void,
                size: 1 << 24,
            })
            .unwrap();
        writer.write_field_stop().unwrap();
        let bytes = writer.into_bytes();
        let mut reader = BinaryProtocolReader::new(&bytes);
        assert!(matches!(
            reader.skip(TType::Struct),
            Err(Error::Protocol(ProtocolError::InvalidType(1)))
        ));

        let mut writer = BinaryProtocolWriter::new();
        writer
            .write_map_begin(TMapHeader {
                key_type: TType::I32,
                value_type: TType::Void,
                size: 3,
            })
            .unwrap();
        let bytes = writer.into_bytes();
        let mut reader = BinaryProtocolReader::new(&bytes);
        assert!(matches!(
            reader.read_map_begin(),
            Err(Error::Protocol(ProtocolError::InvalidType(1)))
        ));

        let mut reader = BinaryProtocolReader::new(&[]);
        assert!(matches!(
            reader.skip(TType::Void),
            Err(Error::Protocol(ProtocolError::InvalidType(1)))
        ));
    }

    #[test]
    fn test_empty_container_of_any_type() {
        let mut writer = BinaryProtocolWriter::new();
        writer
            .write_set_begin(TSetHeader {
                element_type: TType::Void,
                size: 0,
            })
            .unwrap();
        let bytes = writer.into_bytes();
        let mut reader = BinaryProtocolReader::new(&bytes);
        let header = reader.read_set_begin().unwrap();
        assert_eq!(header.size, 0);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_struct_depth_limit() {
        let config = CodecConfig::default().with_max_depth(2);
        let mut reader = BinaryProtocolReader::with_config(&[], config);
        reader.read_struct_begin().unwrap();
        reader.read_struct_begin().unwrap();
        assert!(matches!(
            reader.read_struct_begin(),
            Err(Error::Protocol(ProtocolError::DepthLimit(2)))
        ));
        reader.read_struct_end().unwrap();
        reader.read_struct_begin().unwrap();
    }
}
