// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # driftwire - metadata-driven Thrift codecs
//!
//! Encodes and decodes Rust values with the Thrift binary protocol, driven
//! by type descriptors and structure metadata instead of generated
//! per-struct serializers.
//!
//! ## Quick Start
//!
//! ```rust
//! use driftwire::{CodecManager, ThriftStruct};
//!
//! #[derive(Debug, PartialEq, ThriftStruct)]
//! struct Bonk {
//!     #[thrift(id = 1)]
//!     message: String,
//!     #[thrift(id = 2)]
//!     count: i32,
//! }
//!
//! let manager = CodecManager::new();
//! let bytes = manager
//!     .serialize(&Bonk { message: "hi".into(), count: 3 })
//!     .unwrap();
//! let back: Bonk = manager.deserialize(&bytes).unwrap();
//! assert_eq!(back, Bonk { message: "hi".into(), count: 3 });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  ThriftStruct / ThriftEnum (derive or hand-written metadata)  |
//! +---------------------------------------------------------------+
//! |  ThriftCatalog: interned ThriftType descriptors + coercions   |
//! +---------------------------------------------------------------+
//! |  CodecManager: lazy, recursion-safe codec registry            |
//! |    StructCodec | List/Set/MapCodec | EnumCodec | Coercion...  |
//! +---------------------------------------------------------------+
//! |  TProtocolReader / TProtocolWriter (binary protocol)          |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ThriftType`] | Interned descriptor: wire kind, Rust type, parameters |
//! | [`StructMetadata`] | Fields, extraction/injection points, construction strategy |
//! | [`TypeCoercion`] | Conversion between an application type and a wire type |
//! | [`CodecManager`] | Builds and caches one codec per descriptor |
//! | [`ThriftCodec`] | Reads and writes the values of one descriptor |

extern crate self as driftwire;

pub mod codec;
pub mod coercion;
pub mod config;
pub mod error;
pub mod metadata;
pub mod protocol;
pub mod types;
pub mod value;

pub use codec::{
    CodecManager, CodecStats, ThriftCodec, TypedCodecAdapter, TypedThriftCodec,
};
pub use coercion::TypeCoercion;
pub use config::CodecConfig;
pub use error::{
    BoxError, Error, ErrorCategory, FieldLocation, FieldValueError, MetadataError, ProtocolError,
    Result,
};
pub use metadata::{
    BuilderInjection, ConstructionStrategy, ConstructorInjection, EnumMetadata, ExtractionKind,
    ExtractionPoint, FieldMetadata, FieldValues, InjectionKind, InjectionPoint, MethodInjection,
    Requiredness, StructMetadata, ThriftEnum, ThriftStruct,
};
pub use protocol::{
    BinaryProtocolReader, BinaryProtocolWriter, TFieldHeader, TListHeader, TMapHeader,
    TProtocolReader, TProtocolWriter, TSetHeader,
};
pub use types::{
    AppType, ProtocolType, TType, ThriftCatalog, ThriftCollection, ThriftList, ThriftMap,
    ThriftSet, ThriftType,
};
pub use value::{ThriftValue, ValueRef};

#[cfg(feature = "derive")]
pub use driftwire_codegen::{ThriftEnum, ThriftStruct};
