// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire kinds and interned type descriptors.
//!
//! [`TType`] is the byte tag carried on the wire. [`ProtocolType`] is the
//! richer kind a descriptor is declared with (it distinguishes `string` from
//! `binary` and `enum` from `i32`, which share a wire tag).

mod catalog;
mod collections;
mod descriptor;

pub use catalog::ThriftCatalog;
pub use collections::{ThriftCollection, ThriftList, ThriftMap, ThriftSet};
pub use descriptor::{AppType, ThriftType, ValueCloner};

pub(crate) use collections::{MapOps, SequenceOps};
pub(crate) use descriptor::{cloner_of, TypeParams};

use std::fmt;

/// Wire type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TType {
    Stop = 0,
    Void = 1,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl TType {
    /// Decode a wire tag, `None` for unassigned values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Stop),
            1 => Some(Self::Void),
            2 => Some(Self::Bool),
            3 => Some(Self::Byte),
            4 => Some(Self::Double),
            6 => Some(Self::I16),
            8 => Some(Self::I32),
            10 => Some(Self::I64),
            11 => Some(Self::String),
            12 => Some(Self::Struct),
            13 => Some(Self::Map),
            14 => Some(Self::Set),
            15 => Some(Self::List),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Double => "double",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::String => "string",
            Self::Struct => "struct",
            Self::Map => "map",
            Self::Set => "set",
            Self::List => "list",
        }
    }
}

impl fmt::Display for TType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared kind of a type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolType {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    Binary,
    String,
    Struct,
    Map,
    Set,
    List,
    Enum,
    Void,
}

impl ProtocolType {
    /// Wire tag used for values of this kind.
    pub fn ttype(self) -> TType {
        match self {
            Self::Bool => TType::Bool,
            Self::Byte => TType::Byte,
            Self::I16 => TType::I16,
            Self::I32 | Self::Enum => TType::I32,
            Self::I64 => TType::I64,
            Self::Double => TType::Double,
            Self::Binary | Self::String => TType::String,
            Self::Struct => TType::Struct,
            Self::Map => TType::Map,
            Self::Set => TType::Set,
            Self::List => TType::List,
            Self::Void => TType::Void,
        }
    }

    /// Kinds served by the builtin singleton codecs.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Byte
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::Double
                | Self::Binary
                | Self::String
                | Self::Void
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Double => "double",
            Self::Binary => "binary",
            Self::String => "string",
            Self::Struct => "struct",
            Self::Map => "map",
            Self::Set => "set",
            Self::List => "list",
            Self::Enum => "enum",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
