// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Forward-reference codec used while a recursive type is being built.

use super::manager::ManagerInner;
use super::ThriftCodec;
use crate::error::{Error, Result};
use crate::protocol::{TProtocolReader, TProtocolWriter};
use crate::types::ThriftType;
use crate::value::ThriftValue;
use std::any::Any;
use std::sync::{Arc, OnceLock, Weak};

/// Placeholder installed in the registry before a codec is built.
///
/// Codecs built meanwhile (the fields of a self-referential struct, say)
/// capture the delegate instead of the codec under construction. The
/// registry fills the cell once the real codec exists; from then on calls
/// go straight through. If the build that installed the delegate failed,
/// the first call resolves the type again.
pub struct DelegateCodec {
    thrift_type: ThriftType,
    target: OnceLock<Arc<dyn ThriftCodec>>,
    registry: Weak<ManagerInner>,
}

impl DelegateCodec {
    pub(crate) fn new(thrift_type: ThriftType, registry: Weak<ManagerInner>) -> Self {
        Self {
            thrift_type,
            target: OnceLock::new(),
            registry,
        }
    }

    pub(crate) fn fill(&self, codec: Arc<dyn ThriftCodec>) {
        // First fill wins; a later one carries an equivalent codec.
        let _ = self.target.set(codec);
    }

    pub fn is_resolved(&self) -> bool {
        self.target.get().is_some()
    }

    fn target(&self) -> Result<&Arc<dyn ThriftCodec>> {
        if let Some(codec) = self.target.get() {
            return Ok(codec);
        }
        let unresolved = || Error::UnresolvedCodec(self.thrift_type.name().to_owned());
        let registry = self.registry.upgrade().ok_or_else(unresolved)?;
        let codec = registry.resolve(&self.thrift_type)?;
        if std::ptr::eq(Arc::as_ptr(&codec) as *const u8, (self as *const Self).cast::<u8>()) {
            return Err(unresolved());
        }
        Ok(self.target.get_or_init(|| codec))
    }
}

impl ThriftCodec for DelegateCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<ThriftValue> {
        self.target()?.read(reader)
    }

    fn write(&self, value: &dyn Any, writer: &mut dyn TProtocolWriter) -> Result<()> {
        self.target()?.write(value, writer)
    }
}
