// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use driftwire::{CodecManager, ThriftStruct};
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(ThriftStruct)]
struct Node {
    #[thrift(id = 1)]
    label: String,
    #[thrift(id = 2)]
    weight: Option<u32>,
    #[thrift(id = 3)]
    children: Vec<Node>,
    #[thrift(id = 4)]
    attrs: BTreeMap<String, Vec<u8>>,
}

fn manager() -> &'static CodecManager {
    static MANAGER: OnceLock<CodecManager> = OnceLock::new();
    MANAGER.get_or_init(CodecManager::new)
}

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must decode or fail cleanly, never panic
    if let Ok(node) = manager().deserialize::<Node>(data) {
        // Whatever decoded must encode again
        let _ = manager().serialize(&node);
    }
});
