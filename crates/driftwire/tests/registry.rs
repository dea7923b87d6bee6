// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::items_after_statements)] // Test helpers
#![allow(clippy::similar_names)] // Test variable naming
#![allow(clippy::redundant_closure_for_method_calls)] // Test code clarity

//! Codec registry: caching, recursive types, concurrent resolution and
//! failed builds.

use driftwire::{
    BinaryProtocolWriter, CodecConfig, CodecManager, ConstructorInjection, Error, ErrorCategory,
    ExtractionPoint, FieldMetadata, InjectionPoint, ProtocolError, ProtocolType, Result,
    StructMetadata, TProtocolReader, TProtocolWriter, TType, ThriftCatalog, ThriftStruct,
    ThriftType, TypedThriftCodec,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// Singly linked list: `next` refers back to `Node` itself.
#[derive(Debug, Clone, PartialEq)]
struct Node {
    value: i32,
    next: Option<Box<Node>>,
}

impl ThriftStruct for Node {
    fn struct_metadata(catalog: &ThriftCatalog) -> Result<StructMetadata> {
        fn value(node: &Node) -> &i32 {
            &node.value
        }
        #[allow(clippy::borrowed_box)]
        fn next(node: &Node) -> Option<&Box<Node>> {
            node.next.as_ref()
        }
        let next_type = catalog.boxed_type::<Node>(catalog.struct_type::<Node>())?;
        Ok(StructMetadata::builder::<Node>("Node")
            .field(
                FieldMetadata::builder(1, "value", catalog.i32_type())
                    .extraction(ExtractionPoint::field("value", value))
                    .injection(InjectionPoint::parameter(0))
                    .build(),
            )
            .field(
                FieldMetadata::builder(2, "next", next_type)
                    .optional()
                    .extraction(ExtractionPoint::optional_field("next", next))
                    .injection(InjectionPoint::parameter(1))
                    .build(),
            )
            .constructor(ConstructorInjection::new("Node", &[1, 2], |values| {
                Ok(Node {
                    value: values.take(1)?,
                    next: values.take_optional(2)?,
                })
            }))
            .build()?)
    }
}

fn chain(len: i32) -> Node {
    let mut node = Node {
        value: len,
        next: None,
    };
    for value in (1..len).rev() {
        node = Node {
            value,
            next: Some(Box::new(node)),
        };
    }
    node
}

/// `Ping` and `Pong` refer to each other.
#[derive(Debug, PartialEq)]
struct Ping {
    pong: Option<Box<Pong>>,
}

#[derive(Debug, PartialEq)]
struct Pong {
    ping: Option<Box<Ping>>,
    label: String,
}

impl ThriftStruct for Ping {
    fn struct_metadata(catalog: &ThriftCatalog) -> Result<StructMetadata> {
        #[allow(clippy::borrowed_box)]
        fn pong(ping: &Ping) -> Option<&Box<Pong>> {
            ping.pong.as_ref()
        }
        Ok(StructMetadata::builder::<Ping>("Ping")
            .field(
                FieldMetadata::builder(1, "pong", catalog.boxed_type::<Pong>(catalog.struct_type::<Pong>())?)
                    .optional()
                    .extraction(ExtractionPoint::optional_field("pong", pong))
                    .injection(InjectionPoint::parameter(0))
                    .build(),
            )
            .constructor(ConstructorInjection::new("Ping", &[1], |values| {
                Ok(Ping {
                    pong: values.take_optional(1)?,
                })
            }))
            .build()?)
    }
}

impl ThriftStruct for Pong {
    fn struct_metadata(catalog: &ThriftCatalog) -> Result<StructMetadata> {
        #[allow(clippy::borrowed_box)]
        fn ping(pong: &Pong) -> Option<&Box<Ping>> {
            pong.ping.as_ref()
        }
        fn label(pong: &Pong) -> &String {
            &pong.label
        }
        Ok(StructMetadata::builder::<Pong>("Pong")
            .field(
                FieldMetadata::builder(1, "ping", catalog.boxed_type::<Ping>(catalog.struct_type::<Ping>())?)
                    .optional()
                    .extraction(ExtractionPoint::optional_field("ping", ping))
                    .injection(InjectionPoint::parameter(0))
                    .build(),
            )
            .field(
                FieldMetadata::builder(2, "label", catalog.string_type())
                    .extraction(ExtractionPoint::field("label", label))
                    .injection(InjectionPoint::parameter(1))
                    .build(),
            )
            .constructor(ConstructorInjection::new("Pong", &[1, 2], |values| {
                Ok(Pong {
                    ping: values.take_optional(1)?,
                    label: values.take(2)?,
                })
            }))
            .build()?)
    }
}

static FLAKY_FAIL: AtomicBool = AtomicBool::new(true);

/// Metadata fails on its first build only.
#[derive(Debug, PartialEq)]
struct Flaky {
    value: i64,
}

impl ThriftStruct for Flaky {
    fn struct_metadata(catalog: &ThriftCatalog) -> Result<StructMetadata> {
        fn value(flaky: &Flaky) -> &i64 {
            &flaky.value
        }
        let mut builder = StructMetadata::builder::<Flaky>("Flaky").field(
            FieldMetadata::builder(1, "value", catalog.i64_type())
                .extraction(ExtractionPoint::field("value", value))
                .injection(InjectionPoint::parameter(0))
                .build(),
        );
        if !FLAKY_FAIL.swap(false, Ordering::SeqCst) {
            builder = builder.constructor(ConstructorInjection::new("Flaky", &[1], |values| {
                Ok(Flaky {
                    value: values.take(1)?,
                })
            }));
        }
        Ok(builder.build()?)
    }
}

static GATE_STARTED: AtomicBool = AtomicBool::new(false);
static GATE_FAIL: AtomicBool = AtomicBool::new(true);

/// First build is slow and fails, so other threads pile up behind it.
#[derive(Debug, PartialEq)]
struct Gate {
    open: bool,
}

impl ThriftStruct for Gate {
    fn struct_metadata(catalog: &ThriftCatalog) -> Result<StructMetadata> {
        fn open(gate: &Gate) -> &bool {
            &gate.open
        }
        let mut builder = StructMetadata::builder::<Gate>("Gate").field(
            FieldMetadata::builder(1, "open", catalog.bool_type())
                .extraction(ExtractionPoint::field("open", open))
                .injection(InjectionPoint::parameter(0))
                .build(),
        );
        if GATE_FAIL.swap(false, Ordering::SeqCst) {
            GATE_STARTED.store(true, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(200));
        } else {
            builder = builder.constructor(ConstructorInjection::new("Gate", &[1], |values| {
                Ok(Gate {
                    open: values.take(1)?,
                })
            }));
        }
        Ok(builder.build()?)
    }
}

#[test]
fn test_resolution_is_cached() {
    let manager = CodecManager::new();
    let catalog = manager.catalog();
    assert!(manager.is_cached(&catalog.i32_type()));

    let list = catalog.list_type::<Vec<i32>>(catalog.i32_type()).unwrap();
    assert!(!manager.is_cached(&list));
    let first = manager.resolve(&list).unwrap();
    let second = manager.resolve(&list).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(manager.is_cached(&list));

    let stats = manager.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.builds, 1);
    assert!(stats.hits >= 2);
}

#[test]
fn test_self_referential_struct() {
    let manager = CodecManager::new();
    let list = chain(40);
    let bytes = manager.serialize(&list).unwrap();
    let back: Node = manager.deserialize(&bytes).unwrap();
    assert_eq!(back, list);

    let codec = manager.struct_codec::<Node>().unwrap();
    assert_eq!(codec.thrift_type(), &manager.catalog().struct_type::<Node>());
    assert_eq!(manager.stats().failures, 0);
}

#[test]
fn test_mutually_recursive_structs() {
    let manager = CodecManager::new();
    let value = Ping {
        pong: Some(Box::new(Pong {
            ping: Some(Box::new(Ping { pong: None })),
            label: "middle".into(),
        })),
    };
    let bytes = manager.serialize(&value).unwrap();
    assert_eq!(manager.deserialize::<Ping>(&bytes).unwrap(), value);

    // Both directions are served by the codecs built above.
    let builds = manager.stats().builds;
    manager.struct_codec::<Pong>().unwrap();
    assert_eq!(manager.stats().builds, builds);
}

#[test]
fn test_concurrent_resolution_builds_once() {
    let manager = CodecManager::new();
    let node_type = manager.catalog().struct_type::<Node>();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = manager.clone();
            let node_type = node_type.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let codec = manager.resolve(&node_type).unwrap();
                let bytes = manager.serialize(&chain(5)).unwrap();
                (codec, bytes)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
    let (first, bytes) = &results[0];
    for (codec, other) in &results[1..] {
        assert!(Arc::ptr_eq(first, codec));
        assert_eq!(bytes, other);
    }
    // Node itself plus its Box<Node> field.
    assert_eq!(manager.stats().builds, 2);
    assert_eq!(manager.stats().failures, 0);
}

#[test]
fn test_failed_build_is_retried() {
    let manager = CodecManager::new();
    let err = manager.struct_codec::<Flaky>().err().unwrap();
    assert_eq!(err.category(), ErrorCategory::Metadata);
    assert_eq!(manager.stats().failures, 1);

    let bytes = manager.serialize(&Flaky { value: -9 }).unwrap();
    assert_eq!(manager.deserialize::<Flaky>(&bytes).unwrap(), Flaky { value: -9 });
}

#[test]
fn test_concurrent_mutual_recursion() {
    let value = Ping {
        pong: Some(Box::new(Pong {
            ping: None,
            label: "far".into(),
        })),
    };
    for _ in 0..50 {
        let manager = CodecManager::new();
        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let manager = manager.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    // Half the threads enter the cycle through Pong, half through Ping.
                    if i % 2 == 0 {
                        manager.struct_codec::<Pong>().map(|_| Vec::new())
                    } else {
                        manager.serialize(&Ping {
                            pong: Some(Box::new(Pong {
                                ping: None,
                                label: "far".into(),
                            })),
                        })
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let pong = manager.struct_codec::<Pong>().unwrap();
        assert!(Arc::ptr_eq(&pong, &manager.struct_codec::<Pong>().unwrap()));
        let bytes = manager.serialize(&value).unwrap();
        assert_eq!(manager.deserialize::<Ping>(&bytes).unwrap(), value);
        assert_eq!(manager.stats().failures, 0);
    }
}

#[test]
fn test_waiters_retry_after_failed_build() {
    let manager = CodecManager::new();
    let first = {
        let manager = manager.clone();
        thread::spawn(move || manager.struct_codec::<Gate>().map(|_| ()))
    };
    while !GATE_STARTED.load(Ordering::SeqCst) {
        thread::yield_now();
    }

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            thread::spawn(move || manager.serialize(&Gate { open: true }))
        })
        .collect();

    let err = first.join().unwrap().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Metadata);
    let results: Vec<Vec<u8>> = waiters
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();
    for bytes in &results {
        assert_eq!(bytes, &vec![2, 0, 1, 1, 0]);
    }
    assert_eq!(manager.stats().failures, 1);
    assert_eq!(manager.deserialize::<Gate>(&results[0]).unwrap(), Gate { open: true });
}

/// Opaque handle written as its raw i64.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Handle(u64);

struct HandleCodec {
    thrift_type: ThriftType,
}

impl TypedThriftCodec<Handle> for HandleCodec {
    fn thrift_type(&self) -> &ThriftType {
        &self.thrift_type
    }

    fn read(&self, reader: &mut dyn TProtocolReader) -> Result<Handle> {
        Ok(Handle(reader.read_i64()? as u64))
    }

    fn write(&self, value: &Handle, writer: &mut dyn TProtocolWriter) -> Result<()> {
        writer.write_i64(value.0 as i64)
    }
}

#[test]
fn test_custom_codec_registration() {
    let manager = CodecManager::new();
    let handle_type = manager.catalog().custom_type::<Handle>(ProtocolType::I64);
    let err = manager.resolve(&handle_type).err().unwrap();
    assert!(matches!(err, Error::UnsupportedType(_)));

    manager.add_typed_codec(HandleCodec {
        thrift_type: handle_type.clone(),
    });
    assert!(manager.is_cached(&handle_type));

    let mut writer = BinaryProtocolWriter::new();
    manager.write(&handle_type, &Handle(u64::MAX), &mut writer).unwrap();
    let bytes = writer.into_bytes();
    assert_eq!(bytes, vec![0xff; 8]);
    let mut reader = manager.reader(&bytes);
    let back: Handle = manager.read(&handle_type, &mut reader).unwrap();
    assert_eq!(back, Handle(u64::MAX));
}

#[test]
fn test_depth_limit() {
    let manager = CodecManager::with_config(CodecConfig::default().with_max_depth(8));
    let shallow = manager.serialize(&chain(8)).unwrap();
    assert_eq!(manager.deserialize::<Node>(&shallow).unwrap(), chain(8));

    let deep = manager.serialize(&chain(9)).unwrap();
    let err = manager.deserialize::<Node>(&deep).unwrap_err();
    assert!(matches!(err, Error::Protocol(ProtocolError::DepthLimit(8))));
}

#[test]
fn test_wire_type_of_recursive_field() {
    let manager = CodecManager::new();
    let bytes = manager.serialize(&chain(2)).unwrap();
    // value, then `next` as a nested struct.
    assert_eq!(bytes[0], TType::I32.as_u8());
    assert_eq!(bytes[7], TType::Struct.as_u8());
}
