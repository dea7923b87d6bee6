// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor catalog.
//!
//! Interns every [`ThriftType`] so that equal (kind, application type,
//! parameters) triples yield the same instance, and owns the coercion table.
//! Interned descriptors are never evicted: parameter identities are part of
//! the intern key, so descriptors must stay alive for the catalog lifetime.
//!
//! # Example
//!
//! ```
//! use driftwire::ThriftCatalog;
//!
//! let catalog = ThriftCatalog::new();
//! let a = catalog.list_type::<Vec<i32>>(catalog.i32_type()).unwrap();
//! let b = catalog.list_type::<Vec<i32>>(catalog.i32_type()).unwrap();
//! assert_eq!(a, b);
//! ```

use super::collections::{MapOps, SequenceOps, ThriftList, ThriftMap, ThriftSet};
use super::descriptor::{cloner_of, short_type_name, AppType, StructRef, TypeInner, TypeParams};
use super::{ProtocolType, ThriftType, ValueCloner};
use crate::coercion::{default_coercions, TypeCoercion};
use crate::error::{Error, MetadataError, Result};
use crate::metadata::{EnumMetadata, StructMetadata, ThriftEnum, ThriftStruct};
use crate::value::ThriftValue;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum KeyVariant {
    Plain,
    Custom,
    Params(usize, usize),
    Coerced(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TypeKey {
    protocol_type: ProtocolType,
    app: TypeId,
    variant: KeyVariant,
}

impl TypeKey {
    fn new(protocol_type: ProtocolType, app: TypeId, variant: KeyVariant) -> Self {
        Self {
            protocol_type,
            app,
            variant,
        }
    }
}

fn identity(ty: &ThriftType) -> usize {
    Arc::as_ptr(&ty.0) as usize
}

struct Builtins {
    bool_type: ThriftType,
    byte_type: ThriftType,
    i16_type: ThriftType,
    i32_type: ThriftType,
    i64_type: ThriftType,
    double_type: ThriftType,
    string_type: ThriftType,
    binary_type: ThriftType,
    void_type: ThriftType,
}

fn zero_of<T: Default + Any + Send + Sync>() -> ThriftValue {
    Box::new(T::default())
}

fn builtin<T: Default + Clone + Any + Send + Sync>(protocol_type: ProtocolType) -> ThriftType {
    ThriftType::from_inner(TypeInner {
        protocol_type,
        app: AppType::of::<T>(),
        name: protocol_type.name().to_owned(),
        params: TypeParams::None,
        zero: Some(zero_of::<T>),
        cloner: Some(cloner_of::<T>()),
    })
}

/// Interning store for type descriptors and coercions.
pub struct ThriftCatalog {
    types: DashMap<TypeKey, ThriftType>,
    coercions: DashMap<TypeId, Arc<TypeCoercion>>,
    builtins: Builtins,
}

impl Default for ThriftCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ThriftCatalog {
    /// Catalog with the builtin primitives and default coercions registered.
    pub fn new() -> Self {
        let builtins = Builtins {
            bool_type: builtin::<bool>(ProtocolType::Bool),
            byte_type: builtin::<i8>(ProtocolType::Byte),
            i16_type: builtin::<i16>(ProtocolType::I16),
            i32_type: builtin::<i32>(ProtocolType::I32),
            i64_type: builtin::<i64>(ProtocolType::I64),
            double_type: builtin::<f64>(ProtocolType::Double),
            string_type: builtin::<String>(ProtocolType::String),
            binary_type: builtin::<Vec<u8>>(ProtocolType::Binary),
            void_type: builtin::<()>(ProtocolType::Void),
        };
        let catalog = Self {
            types: DashMap::new(),
            coercions: DashMap::new(),
            builtins,
        };
        for ty in catalog.builtin_types() {
            let key = TypeKey::new(ty.protocol_type(), ty.app_type().id(), KeyVariant::Plain);
            catalog.types.insert(key, ty);
        }
        for coercion in default_coercions(&catalog) {
            catalog.add_coercion(coercion);
        }
        catalog
    }

    pub fn bool_type(&self) -> ThriftType {
        self.builtins.bool_type.clone()
    }

    pub fn byte_type(&self) -> ThriftType {
        self.builtins.byte_type.clone()
    }

    pub fn i16_type(&self) -> ThriftType {
        self.builtins.i16_type.clone()
    }

    pub fn i32_type(&self) -> ThriftType {
        self.builtins.i32_type.clone()
    }

    pub fn i64_type(&self) -> ThriftType {
        self.builtins.i64_type.clone()
    }

    pub fn double_type(&self) -> ThriftType {
        self.builtins.double_type.clone()
    }

    pub fn string_type(&self) -> ThriftType {
        self.builtins.string_type.clone()
    }

    /// `binary`, carried as `Vec<u8>`.
    pub fn binary_type(&self) -> ThriftType {
        self.builtins.binary_type.clone()
    }

    pub fn void_type(&self) -> ThriftType {
        self.builtins.void_type.clone()
    }

    /// All builtin primitive descriptors.
    pub fn builtin_types(&self) -> [ThriftType; 9] {
        [
            self.bool_type(),
            self.byte_type(),
            self.i16_type(),
            self.i32_type(),
            self.i64_type(),
            self.double_type(),
            self.string_type(),
            self.binary_type(),
            self.void_type(),
        ]
    }

    pub fn is_builtin(&self, ty: &ThriftType) -> bool {
        self.builtin_types().iter().any(|builtin| builtin == ty)
    }

    /// Number of interned descriptors.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    fn intern(&self, key: TypeKey, make: impl FnOnce() -> TypeInner) -> ThriftType {
        if let Some(existing) = self.types.get(&key) {
            return existing.clone();
        }
        // Build outside the map lock; a racing insert wins and ours is dropped.
        let candidate = ThriftType::from_inner(make());
        self.types.entry(key).or_insert(candidate).clone()
    }

    /// `list<T>` carried as `L`.
    pub fn list_type<L: ThriftList>(&self, element: ThriftType) -> Result<ThriftType> {
        check_element::<L::Elem>("list", &element)?;
        let key = TypeKey::new(
            ProtocolType::List,
            TypeId::of::<L>(),
            KeyVariant::Params(identity(&element), 0),
        );
        Ok(self.intern(key, || {
            let ops = SequenceOps::of::<L>();
            TypeInner {
                protocol_type: ProtocolType::List,
                app: AppType::of::<L>(),
                name: format!("list<{}>", element.name()),
                zero: Some(ops.empty),
                cloner: sequence_cloner(&element, ops),
                params: TypeParams::List { element, ops },
            }
        }))
    }

    /// `set<T>` carried as `S`.
    pub fn set_type<S: ThriftSet>(&self, element: ThriftType) -> Result<ThriftType> {
        check_element::<S::Elem>("set", &element)?;
        let key = TypeKey::new(
            ProtocolType::Set,
            TypeId::of::<S>(),
            KeyVariant::Params(identity(&element), 0),
        );
        Ok(self.intern(key, || {
            let ops = SequenceOps::of::<S>();
            TypeInner {
                protocol_type: ProtocolType::Set,
                app: AppType::of::<S>(),
                name: format!("set<{}>", element.name()),
                zero: Some(ops.empty),
                cloner: sequence_cloner(&element, ops),
                params: TypeParams::Set { element, ops },
            }
        }))
    }

    /// `map<K, V>` carried as `M`.
    pub fn map_type<M: ThriftMap>(&self, key: ThriftType, value: ThriftType) -> Result<ThriftType> {
        check_element::<M::Key>("map key", &key)?;
        check_element::<M::Value>("map value", &value)?;
        let intern_key = TypeKey::new(
            ProtocolType::Map,
            TypeId::of::<M>(),
            KeyVariant::Params(identity(&key), identity(&value)),
        );
        Ok(self.intern(intern_key, || {
            let ops = MapOps::of::<M>();
            TypeInner {
                protocol_type: ProtocolType::Map,
                app: AppType::of::<M>(),
                name: format!("map<{}, {}>", key.name(), value.name()),
                zero: Some(ops.empty),
                cloner: map_cloner(&key, &value, ops),
                params: TypeParams::Map { key, value, ops },
            }
        }))
    }

    /// Descriptor of a structure. Its metadata is built on first use, so
    /// structures may refer to themselves or to each other.
    pub fn struct_type<T: ThriftStruct>(&self) -> ThriftType {
        let key = TypeKey::new(ProtocolType::Struct, TypeId::of::<T>(), KeyVariant::Plain);
        self.intern(key, || TypeInner {
            protocol_type: ProtocolType::Struct,
            app: AppType::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
            params: TypeParams::Struct(StructRef {
                build: T::struct_metadata,
                metadata: OnceLock::new(),
            }),
            zero: None,
            cloner: None,
        })
    }

    /// Metadata behind a struct descriptor, built and validated once.
    pub fn struct_metadata(&self, ty: &ThriftType) -> Result<Arc<StructMetadata>> {
        let TypeParams::Struct(reference) = ty.params() else {
            return Err(Error::UnsupportedType(ty.name().to_owned()));
        };
        if let Some(metadata) = reference.metadata.get() {
            return Ok(Arc::clone(metadata));
        }
        let metadata = (reference.build)(self)?;
        if metadata.target() != ty.app_type() {
            return Err(MetadataError::TargetMismatch {
                struct_name: metadata.name().to_owned(),
                point: "struct metadata".to_owned(),
                expected: ty.app_type().name(),
                found: metadata.target().name(),
            }
            .into());
        }
        log::debug!(
            "[ThriftCatalog] built metadata for {} ({} fields)",
            metadata.name(),
            metadata.fields().len()
        );
        Ok(Arc::clone(reference.metadata.get_or_init(|| Arc::new(metadata))))
    }

    pub fn metadata_of<T: ThriftStruct>(&self) -> Result<Arc<StructMetadata>> {
        self.struct_metadata(&self.struct_type::<T>())
    }

    /// Descriptor of an enumeration, encoded as its i32 value.
    pub fn enum_type<E: ThriftEnum>(&self) -> Result<ThriftType> {
        let key = TypeKey::new(ProtocolType::Enum, TypeId::of::<E>(), KeyVariant::Plain);
        if let Some(existing) = self.types.get(&key) {
            return Ok(existing.clone());
        }
        let metadata = Arc::new(EnumMetadata::of::<E>()?);
        Ok(self.intern(key, || TypeInner {
            protocol_type: ProtocolType::Enum,
            app: AppType::of::<E>(),
            name: E::NAME.to_owned(),
            params: TypeParams::Enum(metadata),
            zero: None,
            cloner: Some(cloner_of::<E>()),
        }))
    }

    /// Register a coercion as the default for its application type,
    /// replacing any earlier one.
    pub fn add_coercion(&self, coercion: TypeCoercion) -> Arc<TypeCoercion> {
        let coercion = Arc::new(coercion);
        self.coercions
            .insert(coercion.app().id(), Arc::clone(&coercion));
        coercion
    }

    pub fn coercion_for<A: Any>(&self) -> Option<Arc<TypeCoercion>> {
        self.coercions
            .get(&TypeId::of::<A>())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Descriptor for `A` through its registered coercion.
    pub fn coerced_type<A: Any>(&self) -> Result<ThriftType> {
        let coercion = self
            .coercion_for::<A>()
            .ok_or(Error::UnknownCoercion(std::any::type_name::<A>()))?;
        Ok(self.coerced_with(&coercion))
    }

    /// Descriptor for a specific coercion, registered or not.
    pub fn coerced_with(&self, coercion: &Arc<TypeCoercion>) -> ThriftType {
        let wire = coercion.wire();
        let key = TypeKey::new(
            wire.protocol_type(),
            coercion.app().id(),
            KeyVariant::Coerced(Arc::as_ptr(coercion) as *const () as usize),
        );
        self.intern(key, || TypeInner {
            protocol_type: wire.protocol_type(),
            app: coercion.app(),
            name: short_type_name(coercion.app().name()),
            zero: None,
            cloner: coercion.cloner().cloned(),
            params: TypeParams::Coerced(Arc::clone(coercion)),
        })
    }

    /// `Box<T>` written through to the pointee's descriptor.
    pub fn boxed_type<T: Any + Send + Sync>(&self, inner: ThriftType) -> Result<ThriftType> {
        check_element::<T>("Box", &inner)?;
        let key = TypeKey::new(
            inner.protocol_type(),
            TypeId::of::<Box<T>>(),
            KeyVariant::Params(identity(&inner), 0),
        );
        Ok(self.intern(key, || pointer_inner(TypeCoercion::boxed::<T>(inner))))
    }

    /// `Arc<T>` written through to the pointee's descriptor.
    pub fn arc_type<T: Any + Send + Sync>(&self, inner: ThriftType) -> Result<ThriftType> {
        check_element::<T>("Arc", &inner)?;
        let key = TypeKey::new(
            inner.protocol_type(),
            TypeId::of::<Arc<T>>(),
            KeyVariant::Params(identity(&inner), 0),
        );
        Ok(self.intern(key, || pointer_inner(TypeCoercion::shared::<T>(inner))))
    }

    /// Descriptor with no generated codec strategy. It resolves only after a
    /// hand-written codec is registered for it.
    pub fn custom_type<T: Any>(&self, protocol_type: ProtocolType) -> ThriftType {
        let key = TypeKey::new(protocol_type, TypeId::of::<T>(), KeyVariant::Custom);
        self.intern(key, || TypeInner {
            protocol_type,
            app: AppType::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
            params: TypeParams::None,
            zero: None,
            cloner: None,
        })
    }
}

fn pointer_inner(coercion: TypeCoercion) -> TypeInner {
    TypeInner {
        protocol_type: coercion.wire().protocol_type(),
        app: coercion.app(),
        name: short_type_name(coercion.app().name()),
        zero: None,
        cloner: coercion.cloner().cloned(),
        params: TypeParams::Coerced(Arc::new(coercion)),
    }
}

fn check_element<E: Any>(container: &'static str, element: &ThriftType) -> Result<()> {
    if element.app_type().is::<E>() {
        Ok(())
    } else {
        Err(MetadataError::ElementTypeMismatch {
            container,
            expected: std::any::type_name::<E>(),
            found: element.app_type().name().to_owned(),
        }
        .into())
    }
}

fn sequence_cloner(element: &ThriftType, ops: SequenceOps) -> Option<ValueCloner> {
    let element = element.cloner()?.clone();
    Some(Arc::new(move |value: &dyn Any| {
        let mut copies = Vec::new();
        (ops.visit)(value, &mut |item| {
            copies.push(element(item).ok_or_else(Error::mismatch::<ThriftValue>)?);
            Ok(())
        })
        .ok()?;
        (ops.collect)(copies).ok()
    }))
}

fn map_cloner(key: &ThriftType, value: &ThriftType, ops: MapOps) -> Option<ValueCloner> {
    let key = key.cloner()?.clone();
    let value = value.cloner()?.clone();
    Some(Arc::new(move |map: &dyn Any| {
        let mut copies = Vec::new();
        (ops.visit)(map, &mut |k, v| {
            let k = key(k).ok_or_else(Error::mismatch::<ThriftValue>)?;
            let v = value(v).ok_or_else(Error::mismatch::<ThriftValue>)?;
            copies.push((k, v));
            Ok(())
        })
        .ok()?;
        (ops.collect)(copies).ok()
    }))
}
