// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collection shapes understood by list, set and map descriptors.
//!
//! The traits describe how to walk and rebuild a concrete Rust collection.
//! The catalog erases them into [`SequenceOps`]/[`MapOps`] function tables
//! when it interns a collection descriptor, so codecs never see the generic
//! type again.

use crate::error::{Error, Result};
use crate::value::{unbox, ThriftValue};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};

/// A collection of elements that can be walked and rebuilt.
pub trait ThriftCollection: Any + Send + Sync + Sized {
    type Elem: Any + Send + Sync;

    fn element_count(&self) -> usize;

    fn elements(&self) -> impl Iterator<Item = &Self::Elem>;

    fn from_elements(elements: Vec<Self::Elem>) -> Self;
}

/// Collections encoded as `list<T>`.
pub trait ThriftList: ThriftCollection {}

/// Collections encoded as `set<T>`.
pub trait ThriftSet: ThriftCollection {}

/// Collections encoded as `map<K, V>`.
pub trait ThriftMap: Any + Send + Sync + Sized {
    type Key: Any + Send + Sync;
    type Value: Any + Send + Sync;

    fn entry_count(&self) -> usize;

    fn entries(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;

    fn from_entries(entries: Vec<(Self::Key, Self::Value)>) -> Self;
}

impl<T: Any + Send + Sync> ThriftCollection for Vec<T> {
    type Elem = T;

    fn element_count(&self) -> usize {
        self.len()
    }

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn from_elements(elements: Vec<T>) -> Self {
        elements
    }
}

impl<T: Any + Send + Sync> ThriftList for Vec<T> {}

impl<T: Any + Send + Sync> ThriftCollection for VecDeque<T> {
    type Elem = T;

    fn element_count(&self) -> usize {
        self.len()
    }

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn from_elements(elements: Vec<T>) -> Self {
        elements.into()
    }
}

impl<T: Any + Send + Sync> ThriftList for VecDeque<T> {}

impl<T, S> ThriftCollection for HashSet<T, S>
where
    T: Any + Send + Sync + Eq + Hash,
    S: BuildHasher + Default + Any + Send + Sync,
{
    type Elem = T;

    fn element_count(&self) -> usize {
        self.len()
    }

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn from_elements(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }
}

impl<T, S> ThriftSet for HashSet<T, S>
where
    T: Any + Send + Sync + Eq + Hash,
    S: BuildHasher + Default + Any + Send + Sync,
{
}

impl<T: Any + Send + Sync + Ord> ThriftCollection for BTreeSet<T> {
    type Elem = T;

    fn element_count(&self) -> usize {
        self.len()
    }

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn from_elements(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }
}

impl<T: Any + Send + Sync + Ord> ThriftSet for BTreeSet<T> {}

impl<K, V, S> ThriftMap for HashMap<K, V, S>
where
    K: Any + Send + Sync + Eq + Hash,
    V: Any + Send + Sync,
    S: BuildHasher + Default + Any + Send + Sync,
{
    type Key = K;
    type Value = V;

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    fn from_entries(entries: Vec<(K, V)>) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V> ThriftMap for BTreeMap<K, V>
where
    K: Any + Send + Sync + Ord,
    V: Any + Send + Sync,
{
    type Key = K;
    type Value = V;

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    fn from_entries(entries: Vec<(K, V)>) -> Self {
        entries.into_iter().collect()
    }
}

/// Type-erased view of a [`ThriftCollection`].
#[derive(Clone, Copy)]
pub(crate) struct SequenceOps {
    pub(crate) len: fn(&dyn Any) -> Result<usize>,
    pub(crate) visit: fn(&dyn Any, &mut dyn FnMut(&dyn Any) -> Result<()>) -> Result<()>,
    pub(crate) collect: fn(Vec<ThriftValue>) -> Result<ThriftValue>,
    pub(crate) empty: fn() -> ThriftValue,
}

impl SequenceOps {
    pub(crate) fn of<C: ThriftCollection>() -> Self {
        Self {
            len: sequence_len::<C>,
            visit: sequence_visit::<C>,
            collect: sequence_collect::<C>,
            empty: sequence_empty::<C>,
        }
    }
}

fn sequence_len<C: ThriftCollection>(value: &dyn Any) -> Result<usize> {
    value
        .downcast_ref::<C>()
        .map(C::element_count)
        .ok_or_else(Error::mismatch::<C>)
}

fn sequence_visit<C: ThriftCollection>(
    value: &dyn Any,
    visit: &mut dyn FnMut(&dyn Any) -> Result<()>,
) -> Result<()> {
    let collection = value.downcast_ref::<C>().ok_or_else(Error::mismatch::<C>)?;
    for element in collection.elements() {
        visit(element)?;
    }
    Ok(())
}

fn sequence_collect<C: ThriftCollection>(values: Vec<ThriftValue>) -> Result<ThriftValue> {
    let mut elements = Vec::with_capacity(values.len());
    for value in values {
        elements.push(unbox::<C::Elem>(value).ok_or_else(Error::mismatch::<C::Elem>)?);
    }
    Ok(Box::new(C::from_elements(elements)))
}

fn sequence_empty<C: ThriftCollection>() -> ThriftValue {
    Box::new(C::from_elements(Vec::new()))
}

/// Type-erased view of a [`ThriftMap`].
#[derive(Clone, Copy)]
pub(crate) struct MapOps {
    pub(crate) len: fn(&dyn Any) -> Result<usize>,
    pub(crate) visit: fn(&dyn Any, &mut dyn FnMut(&dyn Any, &dyn Any) -> Result<()>) -> Result<()>,
    pub(crate) collect: fn(Vec<(ThriftValue, ThriftValue)>) -> Result<ThriftValue>,
    pub(crate) empty: fn() -> ThriftValue,
}

impl MapOps {
    pub(crate) fn of<M: ThriftMap>() -> Self {
        Self {
            len: map_len::<M>,
            visit: map_visit::<M>,
            collect: map_collect::<M>,
            empty: map_empty::<M>,
        }
    }
}

fn map_len<M: ThriftMap>(value: &dyn Any) -> Result<usize> {
    value
        .downcast_ref::<M>()
        .map(M::entry_count)
        .ok_or_else(Error::mismatch::<M>)
}

fn map_visit<M: ThriftMap>(
    value: &dyn Any,
    visit: &mut dyn FnMut(&dyn Any, &dyn Any) -> Result<()>,
) -> Result<()> {
    let map = value.downcast_ref::<M>().ok_or_else(Error::mismatch::<M>)?;
    for (key, value) in map.entries() {
        visit(key, value)?;
    }
    Ok(())
}

fn map_collect<M: ThriftMap>(values: Vec<(ThriftValue, ThriftValue)>) -> Result<ThriftValue> {
    let mut entries = Vec::with_capacity(values.len());
    for (key, value) in values {
        let key = unbox::<M::Key>(key).ok_or_else(Error::mismatch::<M::Key>)?;
        let value = unbox::<M::Value>(value).ok_or_else(Error::mismatch::<M::Value>)?;
        entries.push((key, value));
    }
    Ok(Box::new(M::from_entries(entries)))
}

fn map_empty<M: ThriftMap>() -> ThriftValue {
    Box::new(M::from_entries(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_ops_walk_and_rebuild() {
        let ops = SequenceOps::of::<VecDeque<i16>>();
        let source: VecDeque<i16> = VecDeque::from(vec![3, 1, 2]);

        assert_eq!((ops.len)(&source).ok(), Some(3));
        let mut seen = Vec::new();
        (ops.visit)(&source, &mut |element| {
            seen.push(*element.downcast_ref::<i16>().ok_or_else(Error::mismatch::<i16>)?);
            Ok(())
        })
        .ok();
        assert_eq!(seen, vec![3, 1, 2]);

        let rebuilt = (ops.collect)(vec![Box::new(9i16), Box::new(8i16)])
            .ok()
            .and_then(|value| value.downcast::<VecDeque<i16>>().ok());
        assert_eq!(rebuilt.map(|deque| deque.into_iter().collect::<Vec<_>>()), Some(vec![9, 8]));
    }

    #[test]
    fn test_sequence_ops_reject_foreign_values() {
        let ops = SequenceOps::of::<Vec<i32>>();
        assert!((ops.len)(&"not a vec").is_err());
        assert!((ops.collect)(vec![Box::new(1i64)]).is_err());
    }

    #[test]
    fn test_map_ops_rebuild_btree() {
        let ops = MapOps::of::<BTreeMap<String, i64>>();
        let empty = (ops.empty)();
        assert_eq!((ops.len)(&*empty).ok(), Some(0));

        let rebuilt = (ops.collect)(vec![
            (Box::new(String::from("b")), Box::new(2i64)),
            (Box::new(String::from("a")), Box::new(1i64)),
        ])
        .ok()
        .and_then(|value| value.downcast::<BTreeMap<String, i64>>().ok());
        let rebuilt = rebuilt.map(|map| map.into_iter().collect::<Vec<_>>());
        assert_eq!(
            rebuilt,
            Some(vec![(String::from("a"), 1), (String::from("b"), 2)])
        );
    }

    #[test]
    fn test_set_collapses_duplicates() {
        let set = HashSet::<i32>::from_elements(vec![1, 1, 2]);
        assert_eq!(set.element_count(), 2);
    }
}
