// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors.
//!
//! A [`ThriftType`] pairs a declared [`ProtocolType`] with the Rust type
//! values of that descriptor have at runtime. Descriptors are only created
//! through a [`ThriftCatalog`](super::ThriftCatalog), which interns them:
//! equality and hashing are by identity, so two descriptors compare equal
//! exactly when they are the same interned instance.

use super::{MapOps, ProtocolType, SequenceOps, TType};
use crate::coercion::TypeCoercion;
use crate::error::Result;
use crate::metadata::{EnumMetadata, StructMetadata};
use crate::value::ThriftValue;
use crate::ThriftCatalog;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Clones a type-erased value, `None` when the value has another type.
pub type ValueCloner = Arc<dyn Fn(&dyn Any) -> Option<ThriftValue> + Send + Sync>;

pub(crate) fn cloner_of<T: Clone + Any + Send + Sync>() -> ValueCloner {
    Arc::new(|value: &dyn Any| {
        value
            .downcast_ref::<T>()
            .map(|value| Box::new(value.clone()) as ThriftValue)
    })
}

/// Runtime identity of an application type.
#[derive(Debug, Clone, Copy)]
pub struct AppType {
    id: TypeId,
    name: &'static str,
}

impl AppType {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for AppType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AppType {}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Struct descriptors resolve their metadata lazily so that recursive
/// structures can name each other before either is built.
pub(crate) struct StructRef {
    pub(crate) build: fn(&ThriftCatalog) -> Result<StructMetadata>,
    pub(crate) metadata: OnceLock<Arc<StructMetadata>>,
}

pub(crate) enum TypeParams {
    /// Builtin primitives and custom descriptors.
    None,
    List {
        element: ThriftType,
        ops: SequenceOps,
    },
    Set {
        element: ThriftType,
        ops: SequenceOps,
    },
    Map {
        key: ThriftType,
        value: ThriftType,
        ops: MapOps,
    },
    Struct(StructRef),
    Enum(Arc<EnumMetadata>),
    Coerced(Arc<TypeCoercion>),
}

pub(crate) struct TypeInner {
    pub(crate) protocol_type: ProtocolType,
    pub(crate) app: AppType,
    pub(crate) name: String,
    pub(crate) params: TypeParams,
    pub(crate) zero: Option<fn() -> ThriftValue>,
    pub(crate) cloner: Option<ValueCloner>,
}

/// Interned type descriptor.
#[derive(Clone)]
pub struct ThriftType(pub(crate) Arc<TypeInner>);

impl ThriftType {
    pub(crate) fn from_inner(inner: TypeInner) -> Self {
        Self(Arc::new(inner))
    }

    pub fn protocol_type(&self) -> ProtocolType {
        self.0.protocol_type
    }

    /// Wire tag written in field and container headers.
    pub fn ttype(&self) -> TType {
        self.0.protocol_type.ttype()
    }

    pub fn app_type(&self) -> AppType {
        self.0.app
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub(crate) fn params(&self) -> &TypeParams {
        &self.0.params
    }

    /// Whether values of this descriptor pass through a coercion before
    /// reaching the wire-native codec.
    pub fn is_coerced(&self) -> bool {
        matches!(self.0.params, TypeParams::Coerced(_))
    }

    pub fn coercion(&self) -> Option<&Arc<TypeCoercion>> {
        match &self.0.params {
            TypeParams::Coerced(coercion) => Some(coercion),
            _ => None,
        }
    }

    /// Follow coercions down to the wire-native descriptor.
    pub fn uncoerced_type(&self) -> ThriftType {
        let mut current = self.clone();
        while let Some(coercion) = current.coercion() {
            let wire = coercion.wire().clone();
            current = wire;
        }
        current
    }

    /// Element descriptor of a list or set.
    pub fn element_type(&self) -> Option<&ThriftType> {
        match &self.0.params {
            TypeParams::List { element, .. } | TypeParams::Set { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn key_type(&self) -> Option<&ThriftType> {
        match &self.0.params {
            TypeParams::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn value_type(&self) -> Option<&ThriftType> {
        match &self.0.params {
            TypeParams::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Struct metadata, if it has already been built by the catalog.
    pub fn struct_metadata(&self) -> Option<&Arc<StructMetadata>> {
        match &self.0.params {
            TypeParams::Struct(reference) => reference.metadata.get(),
            _ => None,
        }
    }

    pub fn enum_metadata(&self) -> Option<&Arc<EnumMetadata>> {
        match &self.0.params {
            TypeParams::Enum(metadata) => Some(metadata),
            _ => None,
        }
    }

    /// Value used for a constructor parameter whose field is absent on the
    /// wire: the zero value of the wire kind, carried through coercions.
    pub fn zero_value(&self) -> Option<ThriftValue> {
        if let Some(zero) = self.0.zero {
            return Some(zero());
        }
        match &self.0.params {
            TypeParams::Enum(metadata) => metadata.decode(0),
            TypeParams::Coerced(coercion) => coercion.zero_value(),
            _ => None,
        }
    }

    pub fn is_cloneable(&self) -> bool {
        self.0.cloner.is_some()
    }

    pub fn cloner(&self) -> Option<&ValueCloner> {
        self.0.cloner.as_ref()
    }

    pub fn clone_value(&self, value: &dyn Any) -> Option<ThriftValue> {
        self.0.cloner.as_ref().and_then(|cloner| cloner(value))
    }
}

impl PartialEq for ThriftType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ThriftType {}

impl Hash for ThriftType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for ThriftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThriftType")
            .field("name", &self.0.name)
            .field("protocol_type", &self.0.protocol_type)
            .field("app", &self.0.app.name)
            .finish()
    }
}

impl fmt::Display for ThriftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Short display name of a Rust type: `alloc::vec::Vec<my::Node>` -> `Vec<Node>`.
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        match ch {
            ':' => segment.clear(),
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' => {
                out.push_str(&segment);
                segment.clear();
                out.push(ch);
            }
            _ => segment.push(ch),
        }
    }
    out.push_str(&segment);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("i32"), "i32");
        assert_eq!(
            short_type_name("alloc::vec::Vec<app::model::Node>"),
            "Vec<Node>"
        );
        assert_eq!(
            short_type_name("std::collections::hash::map::HashMap<alloc::string::String, i64>"),
            "HashMap<String, i64>"
        );
    }

    #[test]
    fn test_app_type_identity() {
        let a = AppType::of::<Vec<u8>>();
        assert_eq!(a, AppType::of::<Vec<u8>>());
        assert_ne!(a, AppType::of::<Vec<i8>>());
        assert!(a.is::<Vec<u8>>());
    }

    #[test]
    fn test_cloner_of() {
        let cloner = cloner_of::<String>();
        let original = String::from("copy me");
        let copy = cloner(&original).and_then(|value| value.downcast::<String>().ok());
        assert_eq!(copy.as_deref().map(String::as_str), Some("copy me"));
        assert!(cloner(&5i32).is_none());
    }
}
