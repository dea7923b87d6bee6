// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec registry.
//!
//! [`CodecManager`] turns descriptors into codecs, lazily and at most once
//! per descriptor. Resolution of a missing descriptor proceeds as follows:
//!
//! 1. Claim the slot by installing a pending entry that carries a
//!    [`DelegateCodec`]. This happens before any nested resolution.
//! 2. Build the codec. Nested `resolve` calls made by the building thread
//!    that hit a pending slot (its own, for a recursive type, or one claimed
//!    by another building thread) get that slot's delegate and carry on.
//! 3. Publish: fill the delegate, replace the pending entry with the codec,
//!    wake threads waiting on the slot.
//!
//! Threads that are not building anything wait for a pending slot instead
//! of taking its delegate, so top-level callers always receive the real
//! codec or the build error. A failed build removes its pending entry; the
//! next caller retries. No lock is held while a codec is built.

use super::coercion::CoercionCodec;
use super::collections::{ListCodec, MapCodec, SetCodec};
use super::delegate::DelegateCodec;
use super::enums::EnumCodec;
use super::primitives::builtin_codecs;
use super::structs::StructCodec;
use super::{ThriftCodec, TypedCodecAdapter, TypedThriftCodec};
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::metadata::ThriftStruct;
use crate::protocol::{BinaryProtocolReader, BinaryProtocolWriter, TProtocolReader, TProtocolWriter};
use crate::types::{ProtocolType, ThriftType, TypeParams};
use crate::value::unbox;
use crate::ThriftCatalog;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

thread_local! {
    static ACTIVE_BUILDS: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as building a codec.
struct BuildScope;

impl BuildScope {
    fn enter() -> Self {
        ACTIVE_BUILDS.with(|active| active.set(active.get() + 1));
        Self
    }

    fn is_active() -> bool {
        ACTIVE_BUILDS.with(|active| active.get() > 0)
    }
}

impl Drop for BuildScope {
    fn drop(&mut self) {
        ACTIVE_BUILDS.with(|active| active.set(active.get().saturating_sub(1)));
    }
}

enum BuildState {
    Building,
    Done(Option<Arc<dyn ThriftCodec>>),
}

struct PendingBuild {
    delegate: Arc<DelegateCodec>,
    state: Mutex<BuildState>,
    done: Condvar,
}

impl PendingBuild {
    fn finish(&self, codec: Option<Arc<dyn ThriftCodec>>) {
        *self.state.lock() = BuildState::Done(codec);
        self.done.notify_all();
    }

    /// Block until the build completes; `None` if it failed.
    fn wait(&self) -> Option<Arc<dyn ThriftCodec>> {
        let mut state = self.state.lock();
        loop {
            if let BuildState::Done(codec) = &*state {
                return codec.clone();
            }
            self.done.wait(&mut state);
        }
    }
}

#[derive(Clone)]
enum Slot {
    Ready(Arc<dyn ThriftCodec>),
    Pending(Arc<PendingBuild>),
}

impl Slot {
    fn is_pending(&self, pending: &Arc<PendingBuild>) -> bool {
        matches!(self, Self::Pending(own) if Arc::ptr_eq(own, pending))
    }
}

/// Withdraws a claim whose build did not complete, including on panic.
struct Claim<'a> {
    registry: &'a ManagerInner,
    thrift_type: &'a ThriftType,
    pending: Arc<PendingBuild>,
    published: bool,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.published {
            self.registry
                .slots
                .remove_if(self.thrift_type, |_, slot| slot.is_pending(&self.pending));
            self.pending.finish(None);
        }
    }
}

#[derive(Default)]
struct RegistryStats {
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    failures: AtomicU64,
}

/// Snapshot of registry counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecStats {
    /// Lookups answered by a ready codec.
    pub hits: u64,
    /// Lookups that claimed a slot and started a build.
    pub misses: u64,
    /// Builds that completed.
    pub builds: u64,
    /// Builds that failed.
    pub failures: u64,
}

pub(crate) struct ManagerInner {
    catalog: ThriftCatalog,
    config: CodecConfig,
    builtins: Vec<Arc<dyn ThriftCodec>>,
    slots: DashMap<ThriftType, Slot>,
    stats: RegistryStats,
}

impl ManagerInner {
    pub(crate) fn resolve(self: &Arc<Self>, thrift_type: &ThriftType) -> Result<Arc<dyn ThriftCodec>> {
        loop {
            let slot = self.slots.get(thrift_type).map(|slot| slot.value().clone());
            let pending = match slot {
                Some(Slot::Ready(codec)) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(codec);
                }
                Some(Slot::Pending(pending)) => pending,
                None => match self.claim(thrift_type) {
                    Some(pending) => return self.build_claimed(thrift_type, pending),
                    None => continue,
                },
            };
            if BuildScope::is_active() {
                return Ok(Arc::clone(&pending.delegate) as Arc<dyn ThriftCodec>);
            }
            if let Some(codec) = pending.wait() {
                return Ok(codec);
            }
            log::debug!("[CodecManager] retrying {} after a failed build", thrift_type);
        }
    }

    fn claim(self: &Arc<Self>, thrift_type: &ThriftType) -> Option<Arc<PendingBuild>> {
        match self.slots.entry(thrift_type.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                let pending = Arc::new(PendingBuild {
                    delegate: Arc::new(DelegateCodec::new(thrift_type.clone(), Arc::downgrade(self))),
                    state: Mutex::new(BuildState::Building),
                    done: Condvar::new(),
                });
                vacant.insert(Slot::Pending(Arc::clone(&pending)));
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Some(pending)
            }
        }
    }

    fn build_claimed(
        self: &Arc<Self>,
        thrift_type: &ThriftType,
        pending: Arc<PendingBuild>,
    ) -> Result<Arc<dyn ThriftCodec>> {
        let mut claim = Claim {
            registry: self,
            thrift_type,
            pending,
            published: false,
        };
        let built = {
            let _scope = BuildScope::enter();
            self.build(thrift_type)
        };
        match built {
            Ok(codec) => {
                claim.pending.delegate.fill(Arc::clone(&codec));
                if let Some(mut slot) = self.slots.get_mut(thrift_type) {
                    if slot.is_pending(&claim.pending) {
                        *slot = Slot::Ready(Arc::clone(&codec));
                    }
                }
                claim.pending.finish(Some(Arc::clone(&codec)));
                claim.published = true;
                self.stats.builds.fetch_add(1, Ordering::Relaxed);
                log::debug!("[CodecManager] built codec for {}", thrift_type);
                Ok(codec)
            }
            Err(err) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                log::warn!("[CodecManager] failed to build codec for {}: {}", thrift_type, err);
                Err(err)
            }
        }
    }

    fn build(self: &Arc<Self>, thrift_type: &ThriftType) -> Result<Arc<dyn ThriftCodec>> {
        if let Some(coercion) = thrift_type.coercion() {
            let inner = self.resolve(coercion.wire())?;
            return Ok(Arc::new(CoercionCodec::new(
                thrift_type.clone(),
                inner,
                Arc::clone(coercion),
            )));
        }
        let unsupported = || Error::UnsupportedType(thrift_type.name().to_owned());
        let codec: Arc<dyn ThriftCodec> = match (thrift_type.protocol_type(), thrift_type.params()) {
            (
                ProtocolType::Bool
                | ProtocolType::Byte
                | ProtocolType::I16
                | ProtocolType::I32
                | ProtocolType::I64
                | ProtocolType::Double
                | ProtocolType::Binary
                | ProtocolType::String
                | ProtocolType::Void,
                _,
            ) => self
                .builtins
                .iter()
                .find(|codec| codec.thrift_type() == thrift_type)
                .cloned()
                .ok_or_else(unsupported)?,
            (ProtocolType::Struct, TypeParams::Struct(_)) => {
                let metadata = self.catalog.struct_metadata(thrift_type)?;
                let mut fields = Vec::with_capacity(metadata.fields().len());
                for field in metadata.fields() {
                    fields.push(self.resolve(field.thrift_type())?);
                }
                Arc::new(StructCodec::new(thrift_type.clone(), metadata, fields))
            }
            (ProtocolType::List, TypeParams::List { element, ops }) => {
                Arc::new(ListCodec::new(thrift_type.clone(), self.resolve(element)?, *ops))
            }
            (ProtocolType::Set, TypeParams::Set { element, ops }) => {
                Arc::new(SetCodec::new(thrift_type.clone(), self.resolve(element)?, *ops))
            }
            (ProtocolType::Map, TypeParams::Map { key, value, ops }) => Arc::new(MapCodec::new(
                thrift_type.clone(),
                self.resolve(key)?,
                self.resolve(value)?,
                *ops,
            )),
            (ProtocolType::Enum, TypeParams::Enum(metadata)) => {
                Arc::new(EnumCodec::new(thrift_type.clone(), Arc::clone(metadata)))
            }
            (
                ProtocolType::Struct
                | ProtocolType::List
                | ProtocolType::Set
                | ProtocolType::Map
                | ProtocolType::Enum,
                _,
            ) => return Err(unsupported()),
        };
        Ok(codec)
    }
}

/// Thread-safe codec registry, cheap to clone.
///
/// # Example
///
/// ```
/// use driftwire::CodecManager;
///
/// let manager = CodecManager::new();
/// let list = manager
///     .catalog()
///     .list_type::<Vec<String>>(manager.catalog().string_type())
///     .unwrap();
/// let codec = manager.resolve(&list).unwrap();
/// assert_eq!(codec.thrift_type(), &list);
/// ```
#[derive(Clone)]
pub struct CodecManager {
    inner: Arc<ManagerInner>,
}

impl Default for CodecManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecManager {
    pub fn new() -> Self {
        Self::with_catalog(ThriftCatalog::new(), CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self::with_catalog(ThriftCatalog::new(), config)
    }

    /// Registry over an existing catalog, seeded with the builtin codecs.
    pub fn with_catalog(catalog: ThriftCatalog, config: CodecConfig) -> Self {
        let builtins = builtin_codecs(&catalog);
        let slots = DashMap::new();
        for codec in &builtins {
            slots.insert(codec.thrift_type().clone(), Slot::Ready(Arc::clone(codec)));
        }
        Self {
            inner: Arc::new(ManagerInner {
                catalog,
                config,
                builtins,
                slots,
                stats: RegistryStats::default(),
            }),
        }
    }

    pub fn catalog(&self) -> &ThriftCatalog {
        &self.inner.catalog
    }

    pub fn config(&self) -> &CodecConfig {
        &self.inner.config
    }

    /// Codec for `thrift_type`, built on first request.
    pub fn resolve(&self, thrift_type: &ThriftType) -> Result<Arc<dyn ThriftCodec>> {
        self.inner.resolve(thrift_type)
    }

    pub fn struct_codec<T: ThriftStruct>(&self) -> Result<Arc<dyn ThriftCodec>> {
        self.resolve(&self.catalog().struct_type::<T>())
    }

    /// Register a hand-written codec, replacing whatever the registry holds
    /// for its descriptor.
    pub fn add_codec(&self, codec: Arc<dyn ThriftCodec>) {
        log::debug!("[CodecManager] registered codec for {}", codec.thrift_type());
        self.inner
            .slots
            .insert(codec.thrift_type().clone(), Slot::Ready(codec));
    }

    pub fn add_typed_codec<T, C>(&self, codec: C)
    where
        T: Any + Send + Sync,
        C: TypedThriftCodec<T> + 'static,
    {
        self.add_codec(Arc::new(TypedCodecAdapter::new(codec)));
    }

    /// Whether a finished codec is cached for `thrift_type`.
    pub fn is_cached(&self, thrift_type: &ThriftType) -> bool {
        matches!(
            self.inner.slots.get(thrift_type).as_deref(),
            Some(Slot::Ready(_))
        )
    }

    pub fn stats(&self) -> CodecStats {
        let stats = &self.inner.stats;
        CodecStats {
            hits: stats.hits.load(Ordering::Relaxed),
            misses: stats.misses.load(Ordering::Relaxed),
            builds: stats.builds.load(Ordering::Relaxed),
            failures: stats.failures.load(Ordering::Relaxed),
        }
    }

    /// Read one value of `thrift_type` as a `T`.
    pub fn read<T: Any>(&self, thrift_type: &ThriftType, reader: &mut dyn TProtocolReader) -> Result<T> {
        let value = self.resolve(thrift_type)?.read(reader)?;
        unbox::<T>(value).ok_or_else(Error::mismatch::<T>)
    }

    pub fn write(
        &self,
        thrift_type: &ThriftType,
        value: &dyn Any,
        writer: &mut dyn TProtocolWriter,
    ) -> Result<()> {
        self.resolve(thrift_type)?.write(value, writer)
    }

    pub fn read_struct<T: ThriftStruct>(&self, reader: &mut dyn TProtocolReader) -> Result<T> {
        self.read(&self.catalog().struct_type::<T>(), reader)
    }

    pub fn write_struct<T: ThriftStruct>(&self, value: &T, writer: &mut dyn TProtocolWriter) -> Result<()> {
        self.write(&self.catalog().struct_type::<T>(), value, writer)
    }

    /// Encode a structure with the binary protocol.
    pub fn serialize<T: ThriftStruct>(&self, value: &T) -> Result<Vec<u8>> {
        let mut writer = BinaryProtocolWriter::with_capacity(self.config().write_capacity);
        self.write_struct(value, &mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decode a structure encoded with the binary protocol.
    pub fn deserialize<T: ThriftStruct>(&self, bytes: &[u8]) -> Result<T> {
        let mut reader = self.reader(bytes);
        self.read_struct(&mut reader)
    }

    /// Binary protocol reader honoring this registry's limits.
    pub fn reader<'a>(&self, bytes: &'a [u8]) -> BinaryProtocolReader<'a> {
        BinaryProtocolReader::with_config(bytes, *self.config())
    }
}

impl fmt::Debug for CodecManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecManager")
            .field("codecs", &self.inner.slots.len())
            .field("types", &self.inner.catalog.type_count())
            .field("stats", &self.stats())
            .finish()
    }
}
