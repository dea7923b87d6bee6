// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-erased values exchanged between codecs and application structures.

use std::any::Any;
use std::fmt;

/// An owned, type-erased value produced by a codec.
///
/// The concrete type is the descriptor's application type: `i32` for an
/// `i32` descriptor, `Vec<Node>` for a `list<Node>` over `Vec`, etc.
pub type ThriftValue = Box<dyn Any + Send + Sync>;

/// A value handed to a codec for writing: borrowed straight out of the
/// instance when possible, owned when an accessor or coercion computed it.
pub enum ValueRef<'a> {
    Borrowed(&'a dyn Any),
    Owned(ThriftValue),
}

impl ValueRef<'_> {
    pub fn as_any(&self) -> &dyn Any {
        match self {
            Self::Borrowed(value) => *value,
            Self::Owned(value) => &**value,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Borrowed(_) => f.write_str("ValueRef::Borrowed(..)"),
            Self::Owned(_) => f.write_str("ValueRef::Owned(..)"),
        }
    }
}

/// Unbox a [`ThriftValue`] into its concrete type.
pub(crate) fn unbox<T: Any>(value: ThriftValue) -> Option<T> {
    value.downcast::<T>().ok().map(|boxed| *boxed)
}
