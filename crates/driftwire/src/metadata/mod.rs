// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structure and enum metadata.
//!
//! A [`StructMetadata`] describes how values move in and out of one Rust
//! type: its fields (id, name, descriptor, requiredness), how each field is
//! read from an instance ([`ExtractionPoint`]), how it is supplied to a new
//! instance ([`InjectionPoint`]), and how the instance is created
//! ([`ConstructionStrategy`]).
//!
//! Metadata is usually generated by `#[derive(ThriftStruct)]`, but it can be
//! assembled by hand for types that need setters, builders or methods:
//!
//! ```
//! use driftwire::{
//!     ConstructorInjection, ExtractionPoint, FieldMetadata, InjectionPoint, StructMetadata,
//!     ThriftCatalog, ThriftStruct,
//! };
//!
//! struct Ping {
//!     seq: i32,
//! }
//!
//! impl ThriftStruct for Ping {
//!     fn struct_metadata(catalog: &ThriftCatalog) -> driftwire::Result<StructMetadata> {
//!         fn seq(ping: &Ping) -> &i32 {
//!             &ping.seq
//!         }
//!         Ok(StructMetadata::builder::<Ping>("Ping")
//!             .field(
//!                 FieldMetadata::builder(1, "seq", catalog.i32_type())
//!                     .extraction(ExtractionPoint::field("seq", seq))
//!                     .injection(InjectionPoint::parameter(0))
//!                     .build(),
//!             )
//!             .constructor(ConstructorInjection::new("new", &[1], |values| {
//!                 Ok(Ping { seq: values.take(1)? })
//!             }))
//!             .build()?)
//!     }
//! }
//!
//! let catalog = ThriftCatalog::new();
//! let metadata = catalog.metadata_of::<Ping>().unwrap();
//! assert_eq!(metadata.fields().len(), 1);
//! ```

mod construction;
mod enums;
mod field;
mod points;
mod structure;

pub use construction::{
    BuilderInjection, ConstructionStrategy, ConstructorInjection, FieldValues, MethodInjection,
};
pub use enums::{EnumMetadata, ThriftEnum};
pub use field::{FieldBuilder, FieldMetadata, Requiredness};
pub use points::{ExtractionKind, ExtractionPoint, InjectionKind, InjectionPoint};
pub use structure::{StructMetadata, StructMetadataBuilder};

pub(crate) use points::InjectAction;

use crate::error::Result;
use crate::ThriftCatalog;
use std::any::Any;

/// Schema source for a structure type.
///
/// Implementations describe the type with the catalog's descriptors. The
/// catalog calls this at most once per type and caches the result.
pub trait ThriftStruct: Any + Send + Sync + Sized {
    fn struct_metadata(catalog: &ThriftCatalog) -> Result<StructMetadata>;
}

#[cfg(test)]
mod tests;
