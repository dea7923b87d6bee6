// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::error::MetadataError;
use crate::types::AppType;
use crate::value::ThriftValue;
use std::any::Any;
use std::collections::HashSet;
use std::fmt;

/// A Rust enum encoded as a Thrift `enum` (its i32 value).
pub trait ThriftEnum: Copy + Any + Send + Sync {
    const NAME: &'static str;

    fn variants() -> &'static [Self];

    fn value(self) -> i32;

    fn variant_name(self) -> &'static str;
}

/// Value table of one enum.
pub struct EnumMetadata {
    name: String,
    app: AppType,
    entries: Vec<(i32, &'static str)>,
    decode: fn(i32) -> Option<ThriftValue>,
    encode: fn(&dyn Any) -> Option<i32>,
}

fn decode_variant<E: ThriftEnum>(value: i32) -> Option<ThriftValue> {
    E::variants()
        .iter()
        .copied()
        .find(|variant| variant.value() == value)
        .map(|variant| Box::new(variant) as ThriftValue)
}

fn encode_variant<E: ThriftEnum>(value: &dyn Any) -> Option<i32> {
    value.downcast_ref::<E>().map(|variant| variant.value())
}

impl EnumMetadata {
    pub fn of<E: ThriftEnum>() -> Result<Self, MetadataError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(E::variants().len());
        for &variant in E::variants() {
            if !seen.insert(variant.value()) {
                return Err(MetadataError::DuplicateEnumValue {
                    enum_name: E::NAME.to_owned(),
                    value: variant.value(),
                });
            }
            entries.push((variant.value(), variant.variant_name()));
        }
        Ok(Self {
            name: E::NAME.to_owned(),
            app: AppType::of::<E>(),
            entries,
            decode: decode_variant::<E>,
            encode: encode_variant::<E>,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn app_type(&self) -> AppType {
        self.app
    }

    /// `(value, variant name)` pairs in declaration order.
    pub fn entries(&self) -> &[(i32, &'static str)] {
        &self.entries
    }

    pub fn variant_name(&self, value: i32) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(known, _)| *known == value)
            .map(|(_, name)| *name)
    }

    /// Variant with the given wire value.
    pub fn decode(&self, value: i32) -> Option<ThriftValue> {
        (self.decode)(value)
    }

    /// Wire value of a variant, `None` when `value` is not this enum.
    pub fn encode(&self, value: &dyn Any) -> Option<i32> {
        (self.encode)(value)
    }
}

impl fmt::Debug for EnumMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumMetadata")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .finish()
    }
}
